use serde::Deserialize;

/// Hourly block of an Open-Meteo forecast response, requested with
/// `timeformat=unixtime` so that `time` holds UTC epoch seconds.
///
/// Columns the API did not return are left empty.
#[derive(Deserialize, Default)]
pub struct HourlyColumns {
    pub time: Vec<i64>,
    #[serde(default)]
    pub weather_code: Vec<Option<u16>>,
    #[serde(default)]
    pub temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub relative_humidity_2m: Vec<Option<f64>>,
    #[serde(default)]
    pub pressure_msl: Vec<Option<f64>>,
    #[serde(default)]
    pub wind_speed_10m: Vec<Option<f64>>,
    #[serde(default)]
    pub wind_direction_10m: Vec<Option<f64>>,
    #[serde(default)]
    pub precipitation: Vec<Option<f64>>,
    #[serde(default)]
    pub snowfall: Vec<Option<f64>>,
    #[serde(default)]
    pub soil_temperature_0_to_7cm: Vec<Option<f64>>,
    #[serde(default)]
    pub soil_temperature_7_to_28cm: Vec<Option<f64>>,
    #[serde(default)]
    pub soil_temperature_28_to_100cm: Vec<Option<f64>>,
    #[serde(default)]
    pub soil_temperature_100_to_255cm: Vec<Option<f64>>,
    #[serde(default)]
    pub soil_moisture_0_to_7cm: Vec<Option<f64>>,
    #[serde(default)]
    pub soil_moisture_7_to_28cm: Vec<Option<f64>>,
    #[serde(default)]
    pub soil_moisture_28_to_100cm: Vec<Option<f64>>,
    #[serde(default)]
    pub soil_moisture_100_to_255cm: Vec<Option<f64>>,
    #[serde(default)]
    pub cloud_cover: Vec<Option<f64>>,
    #[serde(default)]
    pub cloud_cover_low: Vec<Option<f64>>,
    #[serde(default)]
    pub cloud_cover_mid: Vec<Option<f64>>,
    #[serde(default)]
    pub cloud_cover_high: Vec<Option<f64>>,
}

#[derive(Deserialize)]
pub struct CurrentValues {
    pub time: i64,
    pub weather_code: Option<u16>,
    pub temperature_2m: Option<f64>,
    pub relative_humidity_2m: Option<f64>,
    pub pressure_msl: Option<f64>,
    pub wind_speed_10m: Option<f64>,
    pub wind_direction_10m: Option<f64>,
    pub precipitation: Option<f64>,
    pub snowfall: Option<f64>,
    pub soil_temperature_0_to_7cm: Option<f64>,
    pub soil_temperature_7_to_28cm: Option<f64>,
    pub soil_temperature_28_to_100cm: Option<f64>,
    pub soil_temperature_100_to_255cm: Option<f64>,
    pub soil_moisture_0_to_7cm: Option<f64>,
    pub soil_moisture_7_to_28cm: Option<f64>,
    pub soil_moisture_28_to_100cm: Option<f64>,
    pub soil_moisture_100_to_255cm: Option<f64>,
    pub cloud_cover: Option<f64>,
    pub cloud_cover_low: Option<f64>,
    pub cloud_cover_mid: Option<f64>,
    pub cloud_cover_high: Option<f64>,
}

#[derive(Deserialize)]
pub struct HourlyForecast {
    #[serde(default)]
    pub utc_offset_seconds: i32,
    pub hourly: HourlyColumns,
}

#[derive(Deserialize)]
pub struct CurrentForecast {
    #[serde(default)]
    pub utc_offset_seconds: i32,
    pub current: CurrentValues,
}
