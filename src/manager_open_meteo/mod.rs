use std::time::Duration;
use chrono::{DateTime, Utc};
use log::debug;
use ureq::Agent;
use crate::config::{GeoRef, OpenMeteoParameters};
use crate::errors::OpenMeteoError;
use crate::models::open_meteo::{CurrentForecast, CurrentValues, HourlyColumns, HourlyForecast};
use crate::models::weather::HourlyRecord;

const FIELDS: &str = "temperature_2m,weather_code,relative_humidity_2m,pressure_msl,\
    wind_speed_10m,wind_direction_10m,precipitation,snowfall,\
    soil_temperature_0_to_7cm,soil_temperature_7_to_28cm,soil_temperature_28_to_100cm,soil_temperature_100_to_255cm,\
    soil_moisture_0_to_7cm,soil_moisture_7_to_28cm,soil_moisture_28_to_100cm,soil_moisture_100_to_255cm,\
    cloud_cover,cloud_cover_low,cloud_cover_mid,cloud_cover_high";

/// A source of hourly weather records and current conditions
pub trait WeatherSource {
    /// Returns the hourly series, ordered as the source delivers it
    fn hourly(&self) -> Result<Vec<HourlyRecord>, OpenMeteoError>;

    /// Returns the current conditions
    fn current(&self) -> Result<HourlyRecord, OpenMeteoError>;
}

/// Struct for fetching forecasts and current conditions from Open-Meteo
#[derive(Clone)]
pub struct OpenMeteo {
    agent: Agent,
    base_url: String,
    lat: String,
    long: String,
    forecast_days: String,
    past_days: String,
}

impl OpenMeteo {
    /// Returns an OpenMeteo struct ready for fetching weather data for one location
    ///
    /// # Arguments
    ///
    /// * 'geo_ref' - the point to get weather for
    /// * 'params' - request parameters
    pub fn new(geo_ref: &GeoRef, params: &OpenMeteoParameters) -> OpenMeteo {
        let config = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(30)))
            .build();

        let agent = config.into();

        Self {
            agent,
            base_url: params.base_url.clone(),
            lat: format!("{:0.4}", geo_ref.lat),
            long: format!("{:0.4}", geo_ref.long),
            forecast_days: params.forecast_days.to_string(),
            past_days: params.past_days.to_string(),
        }
    }

    /// Sends a request with the given data block parameter and returns the raw json.
    /// Times are requested as unix seconds in GMT, so every timestamp is a UTC instant.
    ///
    /// # Arguments
    ///
    /// * 'block' - either "hourly" or "current"
    /// * 'extra' - any additional query parameters
    fn request(&self, block: &str, extra: &[(&str, &str)]) -> Result<String, OpenMeteoError> {
        debug!("requesting {} weather from {}", block, self.base_url);

        let mut request = self.agent
            .get(self.base_url.as_str())
            .query("latitude", &self.lat)
            .query("longitude", &self.long)
            .query(block, FIELDS)
            .query("timeformat", "unixtime")
            .query("timezone", "GMT");

        for (k, v) in extra {
            request = request.query(*k, *v);
        }

        let json = request
            .call()?
            .body_mut()
            .read_to_string()?;

        Ok(json)
    }
}

impl WeatherSource for OpenMeteo {
    fn hourly(&self) -> Result<Vec<HourlyRecord>, OpenMeteoError> {
        let json = self.request("hourly", &[
            ("forecast_days", self.forecast_days.as_str()),
            ("past_days", self.past_days.as_str()),
        ])?;

        parse_hourly(&json)
    }

    fn current(&self) -> Result<HourlyRecord, OpenMeteoError> {
        let json = self.request("current", &[])?;

        parse_current(&json)
    }
}

/// Parses an hourly forecast document into records
///
/// # Arguments
///
/// * 'json' - the response body
pub fn parse_hourly(json: &str) -> Result<Vec<HourlyRecord>, OpenMeteoError> {
    let forecast: HourlyForecast = serde_json::from_str(json)?;
    check_offset(forecast.utc_offset_seconds)?;

    columns_to_records(forecast.hourly)
}

/// Parses a current conditions document into a record
///
/// # Arguments
///
/// * 'json' - the response body
pub fn parse_current(json: &str) -> Result<HourlyRecord, OpenMeteoError> {
    let forecast: CurrentForecast = serde_json::from_str(json)?;
    check_offset(forecast.utc_offset_seconds)?;

    current_to_record(forecast.current)
}

fn check_offset(utc_offset_seconds: i32) -> Result<(), OpenMeteoError> {
    if utc_offset_seconds != 0 {
        return Err(OpenMeteoError::Document(
            format!("expected GMT times, got utc offset of {} seconds", utc_offset_seconds)));
    }
    Ok(())
}

fn to_utc(secs: i64) -> Result<DateTime<Utc>, OpenMeteoError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or(OpenMeteoError::Document(format!("invalid timestamp {}", secs)))
}

/// Zips the column arrays of an hourly block into records.
/// A column the API left out yields `None` for every hour.
///
/// # Arguments
///
/// * 'c' - the hourly columns
fn columns_to_records(c: HourlyColumns) -> Result<Vec<HourlyRecord>, OpenMeteoError> {
    let len = c.time.len();

    let floats = [
        ("temperature_2m", &c.temperature_2m),
        ("relative_humidity_2m", &c.relative_humidity_2m),
        ("pressure_msl", &c.pressure_msl),
        ("wind_speed_10m", &c.wind_speed_10m),
        ("wind_direction_10m", &c.wind_direction_10m),
        ("precipitation", &c.precipitation),
        ("snowfall", &c.snowfall),
        ("soil_temperature_0_to_7cm", &c.soil_temperature_0_to_7cm),
        ("soil_temperature_7_to_28cm", &c.soil_temperature_7_to_28cm),
        ("soil_temperature_28_to_100cm", &c.soil_temperature_28_to_100cm),
        ("soil_temperature_100_to_255cm", &c.soil_temperature_100_to_255cm),
        ("soil_moisture_0_to_7cm", &c.soil_moisture_0_to_7cm),
        ("soil_moisture_7_to_28cm", &c.soil_moisture_7_to_28cm),
        ("soil_moisture_28_to_100cm", &c.soil_moisture_28_to_100cm),
        ("soil_moisture_100_to_255cm", &c.soil_moisture_100_to_255cm),
        ("cloud_cover", &c.cloud_cover),
        ("cloud_cover_low", &c.cloud_cover_low),
        ("cloud_cover_mid", &c.cloud_cover_mid),
        ("cloud_cover_high", &c.cloud_cover_high),
    ];
    for (name, column) in floats {
        if !column.is_empty() && column.len() != len {
            return Err(OpenMeteoError::Document(
                format!("column {} has {} values, expected {}", name, column.len(), len)));
        }
    }
    if !c.weather_code.is_empty() && c.weather_code.len() != len {
        return Err(OpenMeteoError::Document(
            format!("column weather_code has {} values, expected {}", c.weather_code.len(), len)));
    }

    let at = |column: &Vec<Option<f64>>, i: usize| column.get(i).copied().flatten();

    let mut records: Vec<HourlyRecord> = Vec::with_capacity(len);
    for (i, secs) in c.time.iter().enumerate() {
        records.push(HourlyRecord {
            timestamp: to_utc(*secs)?,
            weather_code: c.weather_code.get(i).copied().flatten(),
            temperature: at(&c.temperature_2m, i),
            humidity: at(&c.relative_humidity_2m, i),
            pressure: at(&c.pressure_msl, i),
            wind_speed: at(&c.wind_speed_10m, i),
            wind_direction: at(&c.wind_direction_10m, i),
            precipitation: at(&c.precipitation, i),
            snowfall: at(&c.snowfall, i),
            soil_temperature: [
                at(&c.soil_temperature_0_to_7cm, i),
                at(&c.soil_temperature_7_to_28cm, i),
                at(&c.soil_temperature_28_to_100cm, i),
                at(&c.soil_temperature_100_to_255cm, i),
            ],
            soil_moisture: [
                at(&c.soil_moisture_0_to_7cm, i),
                at(&c.soil_moisture_7_to_28cm, i),
                at(&c.soil_moisture_28_to_100cm, i),
                at(&c.soil_moisture_100_to_255cm, i),
            ],
            cloud_cover: [
                at(&c.cloud_cover, i),
                at(&c.cloud_cover_low, i),
                at(&c.cloud_cover_mid, i),
                at(&c.cloud_cover_high, i),
            ],
        });
    }

    Ok(records)
}

fn current_to_record(c: CurrentValues) -> Result<HourlyRecord, OpenMeteoError> {
    Ok(HourlyRecord {
        timestamp: to_utc(c.time)?,
        weather_code: c.weather_code,
        temperature: c.temperature_2m,
        humidity: c.relative_humidity_2m,
        pressure: c.pressure_msl,
        wind_speed: c.wind_speed_10m,
        wind_direction: c.wind_direction_10m,
        precipitation: c.precipitation,
        snowfall: c.snowfall,
        soil_temperature: [
            c.soil_temperature_0_to_7cm,
            c.soil_temperature_7_to_28cm,
            c.soil_temperature_28_to_100cm,
            c.soil_temperature_100_to_255cm,
        ],
        soil_moisture: [
            c.soil_moisture_0_to_7cm,
            c.soil_moisture_7_to_28cm,
            c.soil_moisture_28_to_100cm,
            c.soil_moisture_100_to_255cm,
        ],
        cloud_cover: [c.cloud_cover, c.cloud_cover_low, c.cloud_cover_mid, c.cloud_cover_high],
    })
}
