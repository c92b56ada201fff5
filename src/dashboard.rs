use std::collections::VecDeque;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use log::{debug, info};
use serde::Serialize;
use crate::aggregation::{group_by_day, select_forecast_days, summarize_days};
use crate::assets::{weather_code_to_asset, AssetTracker, WeatherAsset};
use crate::config::DisplayParameters;
use crate::errors::AggregationError;
use crate::forecast::{alert_flags, forecast_window, ForecastSlot};
use crate::models::weather::{DailySummary, HourlyRecord, LAYERS};
use crate::polar::{polar_intensity, wind_to_polar_cell, PolarGrid};

/// Shown wherever a value is not available
pub const MISSING: &str = "-";

pub const SOIL_LAYERS: [&str; LAYERS] = ["0 to 7", "7 to 28", "28 to 100", "100 to 255"];
pub const CLOUD_LAYERS: [&str; LAYERS] = ["Total", "Low", "Mid", "High"];

/// One day column of the dashboard
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct DayView {
    pub weekday: String,
    pub asset: WeatherAsset,
    pub summary: DailySummary,
}

/// One hour column of the forecast row, every label is `MISSING` when there is no data
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct SlotView {
    pub time: String,
    pub asset: Option<WeatherAsset>,
    pub temperature: String,
    pub humidity: String,
    pub pressure: String,
    pub alerts: String,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

/// Everything the forecast part of the dashboard shows after one fetch
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct DashboardSnapshot {
    pub generated_at: DateTime<Utc>,
    pub location_name: String,
    pub today: NaiveDate,
    pub days: Vec<DayView>,
    pub today_high: Option<f64>,
    pub today_low: Option<f64>,
    pub humidity: Vec<SeriesPoint>,
    pub pressure: Vec<SeriesPoint>,
    pub precipitation: Vec<SeriesPoint>,
    pub next_hours: Vec<SlotView>,
}

/// One time-stamped point of the live line series
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct LinePoint {
    pub timestamp: DateTime<Utc>,
    pub wind_speed: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub precipitation: Option<f64>,
}

/// Live line series, the oldest point is dropped once capacity is reached
#[derive(Clone, Debug)]
pub struct LineHistory {
    points: VecDeque<LinePoint>,
    capacity: usize,
}

impl LineHistory {
    pub fn new(capacity: usize) -> LineHistory {
        LineHistory { points: VecDeque::with_capacity(capacity.max(1)), capacity: capacity.max(1) }
    }

    /// Appends the line values of a record
    ///
    /// # Arguments
    ///
    /// * 'record' - current conditions or a replayed hour
    pub fn push(&mut self, record: &HourlyRecord) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(LinePoint {
            timestamp: record.timestamp,
            wind_speed: record.wind_speed,
            humidity: record.humidity,
            pressure: record.pressure,
            precipitation: record.precipitation,
        });
    }

    pub fn points(&self) -> Vec<LinePoint> {
        self.points.iter().cloned().collect()
    }
}

/// Current conditions panel
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct CurrentView {
    pub time: String,
    pub temperature: Option<f64>,
    pub wind_speed: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub precipitation: Option<f64>,
    pub soil_temperature: Vec<(String, Option<f64>)>,
    pub soil_moisture: Vec<(String, Option<f64>)>,
    pub cloud_cover: Vec<(String, Option<f64>)>,
    pub wind_cell: Option<(usize, usize)>,
    pub wind_intensity: Vec<Vec<f64>>,
    /// Set only when the weather code changed since the previous update
    pub new_asset: Option<WeatherAsset>,
    /// Line series including this update
    pub history: Vec<LinePoint>,
}

/// A past hour played back before going live, shown as if it was the current hour
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ReplayFrame {
    pub current: CurrentView,
    pub next_hours: Vec<SlotView>,
}

/// The presentation layer receiving dashboard updates
pub trait Presenter {
    fn show_forecast(&self, snapshot: &DashboardSnapshot);
    fn show_current(&self, view: &CurrentView);
    fn show_replay(&self, frame: &ReplayFrame);
}

/// Presenter writing dashboard updates to the log
pub struct LogPresenter;

impl Presenter for LogPresenter {
    fn show_forecast(&self, snapshot: &DashboardSnapshot) {
        info!("forecast for {} on {}", snapshot.location_name, snapshot.today);
        for d in &snapshot.days {
            info!("{:<9} {} {:>5.1}°C wind {:>3.0}° {}",
                  d.weekday, d.summary.date, d.summary.avg_temperature,
                  d.summary.avg_wind_direction, d.asset);
        }
        for s in &snapshot.next_hours {
            info!("{} {:>8} {:>7} {:>11} {}", s.time, s.temperature, s.humidity, s.pressure, s.alerts);
        }
        if let Ok(json) = serde_json::to_string(snapshot) {
            debug!("{}", json);
        }
    }

    fn show_current(&self, view: &CurrentView) {
        info!("current at {}: {}", view.time, format_value(view.temperature, "°C"));
        if let Some(asset) = view.new_asset {
            info!("weather changed, showing {}", asset);
        }
        if let Ok(json) = serde_json::to_string(view) {
            debug!("{}", json);
        }
    }

    fn show_replay(&self, frame: &ReplayFrame) {
        info!("replaying {}", frame.current.time);
        self.show_current(&frame.current);
        let next = frame.next_hours
            .iter()
            .map(|s| format!("{} {}", s.time, s.temperature))
            .collect::<Vec<String>>();
        info!("next hours: {}", next.join(" | "));
    }
}

/// Builds the forecast part of the dashboard from an hourly series
///
/// # Arguments
///
/// * 'records' - the hourly series
/// * 'now' - current time, anchors "today" and the forecast window
/// * 'display' - display parameters
pub fn build_snapshot(records: &[HourlyRecord], now: DateTime<Utc>, display: &DisplayParameters)
    -> Result<DashboardSnapshot, AggregationError> {

    if records.is_empty() {
        return Err(AggregationError::EmptyInput);
    }

    let tz = &display.timezone;
    let today = now.with_timezone(tz).date_naive();

    let summaries = summarize_days(&group_by_day(records, tz));
    let selected = select_forecast_days(&summaries, today, display.max_future_days);

    let days: Vec<DayView> = selected
        .iter()
        .map(|s| DayView {
            weekday: s.date.format("%A").to_string(),
            asset: weather_code_to_asset(s.dominant_weather_code),
            summary: s.clone(),
        })
        .collect();

    let series = |value: fn(&DailySummary) -> Option<f64>| -> Vec<SeriesPoint> {
        summaries
            .iter()
            .filter_map(|s| value(s).map(|v| SeriesPoint { label: s.date.format("%A").to_string(), value: v }))
            .collect()
    };

    let window = forecast_window(records, now);

    Ok(DashboardSnapshot {
        generated_at: now,
        location_name: display.location_name.clone(),
        today,
        today_high: selected.first().map(|s| s.max_temperature),
        today_low: selected.first().map(|s| s.min_temperature),
        humidity: series(|s| Some(s.avg_humidity)),
        pressure: series(|s| s.avg_pressure),
        precipitation: series(|s| Some(s.total_precipitation)),
        days,
        next_hours: window.slots.iter().map(|s| slot_view(s, tz)).collect(),
    })
}

/// Renders a forecast slot. Without a temperature the whole slot shows `MISSING`.
///
/// # Arguments
///
/// * 'slot' - the forecast slot
/// * 'tz' - zone to show the time in
pub fn slot_view<Tz: TimeZone>(slot: &ForecastSlot, tz: &Tz) -> SlotView
where
    Tz::Offset: std::fmt::Display,
{
    let time = slot.time.with_timezone(tz).format("%H:%M").to_string();

    match slot.record.as_ref().filter(|r| r.temperature.is_some()) {
        Some(r) => {
            let alerts = alert_flags(r)
                .iter()
                .map(|a| a.to_string())
                .collect::<Vec<String>>();

            SlotView {
                time,
                asset: r.weather_code.map(weather_code_to_asset),
                temperature: format_value(r.temperature, "°C"),
                humidity: format_value(r.humidity, "%"),
                pressure: format_value(r.pressure, " hPa"),
                alerts: if alerts.is_empty() { MISSING.to_string() } else { alerts.join(", ") },
            }
        }
        None => SlotView {
            time,
            asset: slot.record.as_ref().and_then(|r| r.weather_code).map(weather_code_to_asset),
            temperature: MISSING.to_string(),
            humidity: MISSING.to_string(),
            pressure: MISSING.to_string(),
            alerts: MISSING.to_string(),
        },
    }
}

/// Builds the current conditions panel
///
/// # Arguments
///
/// * 'record' - current conditions
/// * 'display' - display parameters
/// * 'grid' - polar heatmap geometry
/// * 'tracker' - remembers the weather code shown last
/// * 'history' - live line series, the record is appended to it
pub fn build_current_view(
    record: &HourlyRecord,
    display: &DisplayParameters,
    grid: &PolarGrid,
    tracker: &mut AssetTracker,
    history: &mut LineHistory) -> CurrentView {

    let labelled = |labels: [&str; LAYERS], values: [Option<f64>; LAYERS]| -> Vec<(String, Option<f64>)> {
        labels.iter().zip(values).map(|(l, v)| (l.to_string(), v)).collect()
    };

    let (wind_cell, wind_intensity) = match (record.wind_direction, record.wind_speed) {
        (Some(direction), Some(speed)) => (
            Some(wind_to_polar_cell(direction, speed, grid.sectors, grid.rings, grid.ring_width)),
            polar_intensity(direction, speed, grid),
        ),
        _ => (None, vec![vec![0.0; grid.sectors.max(1)]; grid.rings.max(1)]),
    };

    history.push(record);

    CurrentView {
        time: record.timestamp.with_timezone(&display.timezone).format("%Y-%m-%d %H:%M").to_string(),
        temperature: record.temperature,
        wind_speed: record.wind_speed,
        humidity: record.humidity,
        pressure: record.pressure,
        precipitation: record.precipitation,
        soil_temperature: labelled(SOIL_LAYERS, record.soil_temperature),
        soil_moisture: labelled(SOIL_LAYERS, record.soil_moisture),
        cloud_cover: labelled(CLOUD_LAYERS, record.cloud_cover),
        wind_cell,
        wind_intensity,
        new_asset: record.weather_code.and_then(|c| tracker.update(c)),
        history: history.points(),
    }
}

fn format_value(value: Option<f64>, unit: &str) -> String {
    value.map_or(MISSING.to_string(), |v| format!("{:.1}{}", v, unit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use chrono_tz::Europe::Helsinki;

    fn display() -> DisplayParameters {
        DisplayParameters {
            location_name: "Helsinki, Finland".to_string(),
            timezone: Helsinki,
            max_future_days: 6,
            history_points: 3,
        }
    }

    /// Eight days of hourly data starting at local midnight 2025-01-13 (a Monday),
    /// which is 22:00 UTC the day before
    fn week() -> Vec<HourlyRecord> {
        let start = Utc.with_ymd_and_hms(2025, 1, 12, 22, 0, 0).unwrap();
        (0..24 * 8)
            .map(|h| HourlyRecord {
                timestamp: start + TimeDelta::hours(h),
                weather_code: Some(if h % 24 < 14 { 71 } else { 3 }),
                temperature: Some((h % 24) as f64 - 10.0),
                humidity: Some(85.0),
                pressure: Some(1005.0),
                wind_speed: Some(12.0),
                wind_direction: Some(200.0),
                precipitation: Some(0.1),
                snowfall: Some(0.2),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn test_snapshot_days_start_at_local_today() {
        // 2025-01-15 23:30 UTC is already Thursday the 16th in Helsinki
        let now = Utc.with_ymd_and_hms(2025, 1, 15, 23, 30, 0).unwrap();
        let snapshot = build_snapshot(&week(), now, &display()).unwrap();

        assert_eq!(snapshot.today, NaiveDate::from_ymd_opt(2025, 1, 16).unwrap());
        assert_eq!(snapshot.days[0].weekday, "Thursday");
        assert_eq!(snapshot.days.len(), 5, "Thursday to Monday");
        assert_eq!(snapshot.days[0].asset, WeatherAsset::Snow);
        assert_eq!(snapshot.today_high, Some(13.0));
        assert_eq!(snapshot.today_low, Some(-10.0));
        assert_eq!(snapshot.humidity.len(), 8);
        assert_eq!(snapshot.humidity[0].label, "Monday");
    }

    #[test]
    fn test_snapshot_has_six_hour_labels_in_local_time() {
        let now = Utc.with_ymd_and_hms(2025, 1, 14, 8, 20, 0).unwrap();
        let snapshot = build_snapshot(&week(), now, &display()).unwrap();

        let times: Vec<&str> = snapshot.next_hours.iter().map(|s| s.time.as_str()).collect();
        assert_eq!(times, vec!["10:00", "11:00", "12:00", "13:00", "14:00", "15:00"]);
        assert_eq!(snapshot.next_hours[0].temperature, "0.0°C");
        assert_eq!(snapshot.next_hours[0].pressure, "1005.0 hPa");
        assert_eq!(snapshot.next_hours[0].alerts, MISSING);
    }

    #[test]
    fn test_snapshot_of_nothing_is_an_error() {
        let now = Utc.with_ymd_and_hms(2025, 1, 14, 8, 0, 0).unwrap();
        assert_eq!(build_snapshot(&[], now, &display()), Err(AggregationError::EmptyInput));
    }

    #[test]
    fn test_padding_and_missing_temperature_render_as_missing() {
        let time = Utc.with_ymd_and_hms(2025, 1, 14, 8, 0, 0).unwrap();
        let padded = ForecastSlot { time, record: None };
        let view = slot_view(&padded, &Utc);
        assert_eq!(view.time, "08:00");
        assert_eq!(view.temperature, MISSING);
        assert_eq!(view.alerts, MISSING);

        let no_temp = ForecastSlot {
            time,
            record: Some(HourlyRecord { timestamp: time, humidity: Some(50.0), ..Default::default() }),
        };
        assert_eq!(slot_view(&no_temp, &Utc).humidity, MISSING);
    }

    #[test]
    fn test_slot_lists_alerts() {
        let time = Utc.with_ymd_and_hms(2025, 1, 14, 8, 0, 0).unwrap();
        let slot = ForecastSlot {
            time,
            record: Some(HourlyRecord {
                timestamp: time,
                temperature: Some(-12.0),
                wind_speed: Some(60.0),
                ..Default::default()
            }),
        };
        let view = slot_view(&slot, &Utc);
        assert_eq!(view.alerts, "High Wind Alert, Extreme Temp Alert");
        assert_eq!(view.humidity, MISSING);
    }

    #[test]
    fn test_current_view_reports_asset_only_on_change() {
        let record = HourlyRecord {
            timestamp: Utc.with_ymd_and_hms(2025, 1, 14, 8, 0, 0).unwrap(),
            weather_code: Some(95),
            temperature: Some(3.0),
            wind_speed: Some(5.0),
            wind_direction: Some(370.0),
            soil_moisture: [Some(0.3), None, None, None],
            ..Default::default()
        };
        let mut tracker = AssetTracker::new();
        let mut history = LineHistory::new(3);
        let grid = PolarGrid::default();

        let first = build_current_view(&record, &display(), &grid, &mut tracker, &mut history);
        assert_eq!(first.new_asset, Some(WeatherAsset::Thunderstorm));
        assert_eq!(first.wind_cell, Some((0, 1)));
        assert_eq!(first.wind_intensity[1][0], 5.0);
        assert_eq!(first.soil_moisture[0], ("0 to 7".to_string(), Some(0.3)));
        assert_eq!(first.time, "2025-01-14 10:00");

        let second = build_current_view(&record, &display(), &grid, &mut tracker, &mut history);
        assert_eq!(second.new_asset, None);
    }

    #[test]
    fn test_current_view_grows_bounded_history() {
        let mut tracker = AssetTracker::new();
        let mut history = LineHistory::new(3);
        let grid = PolarGrid::default();
        let start = Utc.with_ymd_and_hms(2025, 1, 14, 8, 0, 0).unwrap();

        let views: Vec<CurrentView> = (0..5)
            .map(|i| {
                let record = HourlyRecord {
                    timestamp: start + TimeDelta::minutes(10 * i),
                    wind_speed: Some(i as f64),
                    humidity: Some(80.0),
                    pressure: Some(1010.0 + i as f64),
                    precipitation: Some(0.5),
                    ..Default::default()
                };
                build_current_view(&record, &display(), &grid, &mut tracker, &mut history)
            })
            .collect();

        let lengths: Vec<usize> = views.iter().map(|v| v.history.len()).collect();
        assert_eq!(lengths, vec![1, 2, 3, 3, 3]);

        let last = &views[4];
        assert_eq!(last.wind_speed, Some(4.0));
        assert_eq!(last.pressure, Some(1014.0));
        let speeds: Vec<Option<f64>> = last.history.iter().map(|p| p.wind_speed).collect();
        assert_eq!(speeds, vec![Some(2.0), Some(3.0), Some(4.0)]);
        assert_eq!(last.history[2].timestamp, start + TimeDelta::minutes(40));
        assert_eq!(last.history[0].humidity, Some(80.0));
    }
}
