use std::fs;
use chrono_tz::Tz;
use log::LevelFilter;
use serde::Deserialize;
use crate::errors::ConfigError;
use crate::polar::PolarGrid;

#[derive(Deserialize, Clone)]
pub struct GeoRef {
    pub lat: f64,
    pub long: f64,
}

#[derive(Deserialize, Clone)]
pub struct OpenMeteoParameters {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u8,
    #[serde(default)]
    pub past_days: u8,
}

#[derive(Deserialize, Clone)]
pub struct DisplayParameters {
    pub location_name: String,
    /// Zone deciding calendar days and "today", e.g. "Europe/Helsinki"
    pub timezone: Tz,
    #[serde(default = "default_max_future_days")]
    pub max_future_days: usize,
    /// Number of points kept in the live line series
    #[serde(default = "default_history_points")]
    pub history_points: usize,
}

#[derive(Deserialize, Clone)]
pub struct PollParameters {
    pub forecast_interval_secs: u64,
    pub current_interval_secs: u64,
    /// Pause between replayed past hours
    #[serde(default = "default_replay_step_millis")]
    pub replay_step_millis: u64,
    /// Stops after this many forecast ticks, runs until stopped if not given
    pub max_ticks: Option<usize>,
}

#[derive(Deserialize, Clone)]
pub struct General {
    pub log_path: String,
    pub log_level: LevelFilter,
    pub log_to_stdout: bool,
}

#[derive(Deserialize, Clone)]
pub struct Config {
    pub geo_ref: GeoRef,
    pub open_meteo: OpenMeteoParameters,
    pub display: DisplayParameters,
    #[serde(default)]
    pub polar: PolarGrid,
    pub poll: PollParameters,
    pub general: General,
}

fn default_base_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_forecast_days() -> u8 {
    7
}

fn default_max_future_days() -> usize {
    6
}

fn default_history_points() -> usize {
    240
}

fn default_replay_step_millis() -> u64 {
    1000
}

/// Loads the configuration file and returns a struct with all configuration items
///
/// # Arguments
///
/// * 'config_path' - path to the configuration file
pub fn load_config(config_path: &str) -> Result<Config, ConfigError> {
    let toml = fs::read_to_string(config_path)?;

    parse_config(&toml)
}

/// Parses and validates configuration from a toml document
///
/// # Arguments
///
/// * 'toml' - the configuration document
pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(toml)?;

    if !(-90.0..=90.0).contains(&config.geo_ref.lat) || !(-180.0..=180.0).contains(&config.geo_ref.long) {
        return Err(ConfigError::from("geo_ref out of range"));
    }
    if config.poll.forecast_interval_secs == 0 || config.poll.current_interval_secs == 0 {
        return Err(ConfigError::from("poll intervals must be greater than zero"));
    }
    if config.display.history_points == 0 {
        return Err(ConfigError::from("history_points must be greater than zero"));
    }
    if config.polar.sectors == 0 || config.polar.rings == 0 || config.polar.ring_width <= 0.0 {
        return Err(ConfigError::from("polar grid must have sectors, rings and a positive ring width"));
    }

    Ok(config)
}
