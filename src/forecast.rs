use std::collections::BTreeSet;
use std::fmt;
use std::fmt::Formatter;
use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use serde::Serialize;
use crate::models::weather::HourlyRecord;

/// Number of hourly slots in a forecast window
pub const FORECAST_HOURS: usize = 6;

const HIGH_WIND_SPEED: f64 = 50.0;
const HEAVY_RAIN: f64 = 10.0;
const HEAVY_SNOWFALL: f64 = 5.0;
const EXTREME_HEAT: f64 = 35.0;
const EXTREME_COLD: f64 = -10.0;

/// Weather alerts derivable from a single hour
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum AlertKind {
    HighWind,
    HeavyRain,
    Snowfall,
    ExtremeTemp,
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            AlertKind::HighWind    => write!(f, "High Wind Alert"),
            AlertKind::HeavyRain   => write!(f, "Heavy Rain Alert"),
            AlertKind::Snowfall    => write!(f, "Snowfall Alert"),
            AlertKind::ExtremeTemp => write!(f, "Extreme Temp Alert"),
        }
    }
}

/// One hour of the forecast window. `record` is `None` for padding slots,
/// those carry a time but no weather data.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ForecastSlot {
    pub time: DateTime<Utc>,
    pub record: Option<HourlyRecord>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ForecastWindow {
    pub slots: [ForecastSlot; FORECAST_HOURS],
}

/// Returns the window of the next `FORECAST_HOURS` hourly records starting at the
/// reference time floored to the hour.
///
/// Records before that hour are ignored. If fewer records remain, the window is padded
/// with empty slots one hour apart following the last real slot. If no record remains
/// at all, every slot is empty and the window starts at the floored reference hour.
///
/// # Arguments
///
/// * 'records' - hourly records in any order
/// * 'reference_time' - the time the window is anchored at
pub fn forecast_window(records: &[HourlyRecord], reference_time: DateTime<Utc>) -> ForecastWindow {
    let start = reference_time
        .duration_trunc(TimeDelta::hours(1))
        .unwrap_or(reference_time);

    let mut upcoming = records
        .iter()
        .filter(|r| r.timestamp >= start)
        .collect::<Vec<&HourlyRecord>>();
    upcoming.sort_by_key(|r| r.timestamp);
    upcoming.truncate(FORECAST_HOURS);

    let mut slots: Vec<ForecastSlot> = upcoming
        .into_iter()
        .map(|r| ForecastSlot { time: r.timestamp, record: Some(r.clone()) })
        .collect();

    let mut last_time = slots.last().map(|s| s.time);
    while slots.len() < FORECAST_HOURS {
        let time = last_time.map_or(start, |t| t + TimeDelta::hours(1));
        slots.push(ForecastSlot { time, record: None });
        last_time = Some(time);
    }

    ForecastWindow {
        slots: std::array::from_fn(|i| slots[i].clone()),
    }
}

/// Returns the alerts raised by an hour of weather. Absent values raise nothing.
///
/// # Arguments
///
/// * 'record' - the hour to check
pub fn alert_flags(record: &HourlyRecord) -> BTreeSet<AlertKind> {
    let mut alerts = BTreeSet::new();

    if record.wind_speed.is_some_and(|w| w > HIGH_WIND_SPEED) {
        alerts.insert(AlertKind::HighWind);
    }
    if record.precipitation.is_some_and(|p| p > HEAVY_RAIN) {
        alerts.insert(AlertKind::HeavyRain);
    }
    if record.snowfall.is_some_and(|s| s > HEAVY_SNOWFALL) {
        alerts.insert(AlertKind::Snowfall);
    }
    if record.temperature.is_some_and(|t| t > EXTREME_HEAT || t < EXTREME_COLD) {
        alerts.insert(AlertKind::ExtremeTemp);
    }

    alerts
}
