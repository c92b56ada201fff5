use std::collections::BTreeMap;
use chrono::{NaiveDate, TimeZone};
use log::warn;
use crate::errors::AggregationError;
use crate::models::weather::{DailySummary, HourlyRecord};

/// Partitions records by calendar date as seen in the given time zone.
///
/// Dates come out ascending and each day keeps the input order of its records.
///
/// # Arguments
///
/// * 'records' - hourly records to partition
/// * 'tz' - time zone whose calendar decides which day a record belongs to
pub fn group_by_day<Tz: TimeZone>(records: &[HourlyRecord], tz: &Tz) -> BTreeMap<NaiveDate, Vec<HourlyRecord>> {
    let mut days: BTreeMap<NaiveDate, Vec<HourlyRecord>> = BTreeMap::new();

    for r in records {
        let date = r.timestamp.with_timezone(tz).date_naive();
        days.entry(date).or_default().push(r.clone());
    }

    days
}

/// Summarizes one day of records.
///
/// The dominant weather code is the most frequent one, on equal counts the code
/// that reached that count first in input order wins.
///
/// # Arguments
///
/// * 'date' - the date the records belong to
/// * 'records' - the day's records, must not be empty
pub fn daily_summary(date: NaiveDate, records: &[HourlyRecord]) -> Result<DailySummary, AggregationError> {
    if records.is_empty() {
        return Err(AggregationError::EmptyInput);
    }

    let mut codes: Vec<u16> = Vec::with_capacity(records.len());
    let mut temperatures: Vec<f64> = Vec::with_capacity(records.len());
    let mut humidity = 0.0;
    let mut wind_direction = 0.0;
    let mut precipitation = 0.0;
    let mut pressures: Vec<f64> = Vec::new();

    for r in records {
        codes.push(require(r.weather_code, "weather_code", r)?);
        temperatures.push(require(r.temperature, "temperature", r)?);
        humidity += require(r.humidity, "humidity", r)?;
        wind_direction += require(r.wind_direction, "wind_direction", r)?;
        precipitation += require(r.precipitation, "precipitation", r)?;
        if let Some(p) = r.pressure {
            pressures.push(p);
        }
    }

    let count = records.len() as f64;
    let avg_pressure = if pressures.is_empty() {
        None
    } else {
        Some(pressures.iter().sum::<f64>() / pressures.len() as f64)
    };

    Ok(DailySummary {
        date,
        dominant_weather_code: dominant_code(&codes),
        avg_temperature: temperatures.iter().sum::<f64>() / count,
        min_temperature: temperatures.iter().copied().fold(f64::INFINITY, f64::min),
        max_temperature: temperatures.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        avg_wind_direction: wind_direction / count,
        avg_humidity: humidity / count,
        avg_pressure,
        total_precipitation: precipitation,
    })
}

/// Summarizes every day of a grouping, skipping days that cannot be summarized.
///
/// # Arguments
///
/// * 'days' - records grouped by date, see `group_by_day`
pub fn summarize_days(days: &BTreeMap<NaiveDate, Vec<HourlyRecord>>) -> Vec<DailySummary> {
    days.iter()
        .filter_map(|(date, records)| {
            daily_summary(*date, records)
                .map_err(|e| warn!("skipping {}: {}", date, e))
                .ok()
        })
        .collect()
}

/// Returns today's summary followed by up to `max_future_days` later days.
/// Without a summary for today, up to `max_future_days + 1` later days are returned instead.
/// Never pads, fewer days are returned if fewer exist.
///
/// # Arguments
///
/// * 'summaries' - daily summaries in any order
/// * 'today' - the current date in the display time zone
/// * 'max_future_days' - number of days after today to include
pub fn select_forecast_days(summaries: &[DailySummary], today: NaiveDate, max_future_days: usize) -> Vec<DailySummary> {
    let mut sorted = summaries.to_vec();
    sorted.sort_by_key(|s| s.date);

    let today_summary = sorted.iter().find(|s| s.date == today).cloned();
    let future = sorted.into_iter().filter(|s| s.date > today);

    match today_summary {
        Some(t) => std::iter::once(t).chain(future.take(max_future_days)).collect(),
        None => future.take(max_future_days.saturating_add(1)).collect(),
    }
}

/// Most frequent code, first to reach the top count wins ties
fn dominant_code(codes: &[u16]) -> u16 {
    let mut counts: BTreeMap<u16, usize> = BTreeMap::new();
    let mut best = codes[0];
    let mut best_count = 0;

    for &c in codes {
        let count = counts.entry(c).or_insert(0);
        *count += 1;
        if *count > best_count {
            best = c;
            best_count = *count;
        }
    }

    best
}

fn require<T>(value: Option<T>, field: &'static str, record: &HourlyRecord) -> Result<T, AggregationError> {
    value.ok_or(AggregationError::MissingData { field, timestamp: record.timestamp })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, FixedOffset, Utc};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap()
    }

    fn record(timestamp: DateTime<Utc>, code: u16, temp: f64) -> HourlyRecord {
        HourlyRecord {
            timestamp,
            weather_code: Some(code),
            temperature: Some(temp),
            humidity: Some(80.0),
            pressure: Some(1010.0),
            wind_speed: Some(4.0),
            wind_direction: Some(180.0),
            precipitation: Some(0.5),
            snowfall: Some(0.0),
            ..Default::default()
        }
    }

    fn summary(date: NaiveDate) -> DailySummary {
        DailySummary {
            date,
            dominant_weather_code: 0,
            avg_temperature: 0.0,
            min_temperature: 0.0,
            max_temperature: 0.0,
            avg_wind_direction: 0.0,
            avg_humidity: 0.0,
            avg_pressure: None,
            total_precipitation: 0.0,
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    // --- group_by_day -------------------------------------------------------

    #[test]
    fn test_grouping_uses_display_zone_date_near_midnight() {
        // 22:30 UTC on the 3rd is already the 4th at UTC+2
        let late = Utc.with_ymd_and_hms(2025, 3, 3, 22, 30, 0).unwrap();
        let records = vec![record(late, 1, 5.0)];

        let utc_days = group_by_day(&records, &Utc);
        assert!(utc_days.contains_key(&date(3)));

        let helsinki = FixedOffset::east_opt(2 * 3600).unwrap();
        let local_days = group_by_day(&records, &helsinki);
        assert!(local_days.contains_key(&date(4)));
        assert!(!local_days.contains_key(&date(3)));
    }

    #[test]
    fn test_grouping_keeps_every_record_once() {
        let start = at(1, 0);
        let records: Vec<HourlyRecord> = (0..72)
            .map(|h| record(start + Duration::hours(h), (h % 3) as u16, h as f64))
            .collect();

        let days = group_by_day(&records, &Utc);
        assert_eq!(days.len(), 3);

        let mut flattened: Vec<HourlyRecord> = days.into_values().flatten().collect();
        flattened.sort_by_key(|r| r.timestamp);
        assert_eq!(flattened, records);
    }

    #[test]
    fn test_grouping_dates_are_ascending() {
        let records = vec![record(at(5, 1), 0, 1.0), record(at(2, 1), 0, 1.0), record(at(3, 1), 0, 1.0)];
        let dates: Vec<NaiveDate> = group_by_day(&records, &Utc).into_keys().collect();
        assert_eq!(dates, vec![date(2), date(3), date(5)]);
    }

    // --- daily_summary ------------------------------------------------------

    #[test]
    fn test_average_temperature_is_mean_regardless_of_order() {
        let mut records = vec![
            record(at(1, 0), 0, 2.0),
            record(at(1, 1), 0, 4.0),
            record(at(1, 2), 0, 9.0),
        ];
        let forward = daily_summary(date(1), &records).unwrap();
        records.reverse();
        let backward = daily_summary(date(1), &records).unwrap();

        assert!((forward.avg_temperature - 5.0).abs() < 1e-9);
        assert!((backward.avg_temperature - forward.avg_temperature).abs() < 1e-9);
        assert_eq!(forward.min_temperature, 2.0);
        assert_eq!(forward.max_temperature, 9.0);
    }

    #[test]
    fn test_dominant_code_tie_goes_to_first_reaching_max() {
        let codes = [1, 2, 1, 2, 1, 2];
        let records: Vec<HourlyRecord> = codes
            .iter()
            .enumerate()
            .map(|(h, c)| record(at(1, h as u32), *c, 0.0))
            .collect();

        let s = daily_summary(date(1), &records).unwrap();
        assert_eq!(s.dominant_weather_code, 1);
    }

    #[test]
    fn test_dominant_code_picks_true_mode() {
        assert_eq!(dominant_code(&[3, 61, 61, 3, 61]), 61);
        assert_eq!(dominant_code(&[2, 1, 1, 2]), 1);
        assert_eq!(dominant_code(&[95]), 95);
    }

    #[test]
    fn test_totals_and_averages() {
        let mut a = record(at(1, 0), 0, 0.0);
        a.precipitation = Some(1.5);
        a.humidity = Some(60.0);
        a.wind_direction = Some(90.0);
        a.pressure = None;
        let mut b = record(at(1, 1), 0, 0.0);
        b.precipitation = Some(2.0);
        b.humidity = Some(70.0);
        b.wind_direction = Some(270.0);
        b.pressure = Some(1000.0);

        let s = daily_summary(date(1), &[a, b]).unwrap();
        assert!((s.total_precipitation - 3.5).abs() < 1e-9);
        assert!((s.avg_humidity - 65.0).abs() < 1e-9);
        assert!((s.avg_wind_direction - 180.0).abs() < 1e-9);
        assert_eq!(s.avg_pressure, Some(1000.0));
    }

    #[test]
    fn test_empty_day_is_an_error() {
        assert_eq!(daily_summary(date(1), &[]), Err(AggregationError::EmptyInput));
    }

    #[test]
    fn test_missing_temperature_fails_the_day() {
        let mut r = record(at(1, 4), 0, 0.0);
        r.temperature = None;
        let result = daily_summary(date(1), &[record(at(1, 3), 0, 1.0), r]);
        assert_eq!(
            result,
            Err(AggregationError::MissingData { field: "temperature", timestamp: at(1, 4) })
        );
    }

    #[test]
    fn test_summarize_days_skips_broken_day() {
        let mut broken = record(at(2, 0), 0, 0.0);
        broken.humidity = None;
        let records = vec![record(at(1, 0), 0, 1.0), broken, record(at(3, 0), 0, 1.0)];

        let summaries = summarize_days(&group_by_day(&records, &Utc));
        let dates: Vec<NaiveDate> = summaries.iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![date(1), date(3)]);
    }

    // --- select_forecast_days -----------------------------------------------

    #[test]
    fn test_select_from_wednesday_returns_what_exists() {
        // 2025-03-03 is a Monday
        let week: Vec<DailySummary> = (3..=9).map(|d| summary(date(d))).collect();
        let selected = select_forecast_days(&week, date(5), 6);
        let dates: Vec<NaiveDate> = selected.iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![date(5), date(6), date(7), date(8), date(9)]);
    }

    #[test]
    fn test_select_limits_future_days() {
        let days: Vec<DailySummary> = (1..=10).map(|d| summary(date(d))).collect();
        let selected = select_forecast_days(&days, date(2), 3);
        let dates: Vec<NaiveDate> = selected.iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![date(2), date(3), date(4), date(5)]);
    }

    #[test]
    fn test_select_without_today_takes_one_extra_future_day() {
        let days: Vec<DailySummary> = vec![10, 3, 4, 5, 6, 7, 8, 9].into_iter().map(|d| summary(date(d))).collect();
        let selected = select_forecast_days(&days, date(2), 6);
        let dates: Vec<NaiveDate> = selected.iter().map(|s| s.date).collect();
        assert_eq!(dates, (3..=9).map(date).collect::<Vec<_>>());
    }

    #[test]
    fn test_select_ignores_past_days() {
        let days: Vec<DailySummary> = (1..=4).map(|d| summary(date(d))).collect();
        let selected = select_forecast_days(&days, date(3), 6);
        let dates: Vec<NaiveDate> = selected.iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![date(3), date(4)]);
    }

    #[test]
    fn test_select_with_unbounded_future_days() {
        let days: Vec<DailySummary> = (3..=5).map(|d| summary(date(d))).collect();
        assert!(select_forecast_days(&[], date(2), usize::MAX).is_empty());

        let selected = select_forecast_days(&days, date(2), usize::MAX);
        let dates: Vec<NaiveDate> = selected.iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![date(3), date(4), date(5)]);
    }
}
