use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// Number of soil layers and cloud layers reported per hour
pub const LAYERS: usize = 4;

/// One hour of weather measurements as fetched.
///
/// Any measured value may be absent, the API reports `null` for hours it has
/// no data for.
#[derive(Serialize, Clone, Debug, PartialEq, Default)]
pub struct HourlyRecord {
    pub timestamp: DateTime<Utc>,
    pub weather_code: Option<u16>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub precipitation: Option<f64>,
    pub snowfall: Option<f64>,
    /// 0-7, 7-28, 28-100 and 100-255 cm
    pub soil_temperature: [Option<f64>; LAYERS],
    pub soil_moisture: [Option<f64>; LAYERS],
    /// Total, low, mid and high
    pub cloud_cover: [Option<f64>; LAYERS],
}

/// Aggregated values for one calendar day in the display time zone
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub dominant_weather_code: u16,
    pub avg_temperature: f64,
    pub min_temperature: f64,
    pub max_temperature: f64,
    pub avg_wind_direction: f64,
    pub avg_humidity: f64,
    pub avg_pressure: Option<f64>,
    pub total_precipitation: f64,
}
