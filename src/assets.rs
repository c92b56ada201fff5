use std::fmt;
use std::fmt::Formatter;
use serde::Serialize;

/// Weather icon models available to the dashboard
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeatherAsset {
    ClearSky,
    MainlyClear,
    PartlyCloudy,
    Overcast,
    Drizzle,
    Rainy,
    Snow,
    Thunderstorm,
}

impl WeatherAsset {
    /// File name of the icon model
    pub fn file_name(&self) -> &'static str {
        match self {
            WeatherAsset::ClearSky     => "Clear sky.obj",
            WeatherAsset::MainlyClear  => "Mainly clear.obj",
            WeatherAsset::PartlyCloudy => "Partly cloudy.obj",
            WeatherAsset::Overcast     => "Overcast.obj",
            WeatherAsset::Drizzle      => "drizzle.obj",
            WeatherAsset::Rainy        => "rainy.obj",
            WeatherAsset::Snow         => "snow.obj",
            WeatherAsset::Thunderstorm => "thunderstorm.obj",
        }
    }
}

impl fmt::Display for WeatherAsset {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.file_name())
    }
}

/// Maps a WMO weather code to its icon model.
/// Fog is shown as overcast, and any code not in the table falls back to `Overcast`.
///
/// # Arguments
///
/// * 'code' - WMO weather interpretation code
pub fn weather_code_to_asset(code: u16) -> WeatherAsset {
    match code {
        0 => WeatherAsset::ClearSky,
        1 => WeatherAsset::MainlyClear,
        2 => WeatherAsset::PartlyCloudy,
        3 | 45 | 48 => WeatherAsset::Overcast,
        51 | 53 | 55 | 56 | 57 => WeatherAsset::Drizzle,
        61 | 63 | 65 | 66 | 67 | 80 | 81 | 82 => WeatherAsset::Rainy,
        71 | 73 | 75 | 77 | 85 | 86 => WeatherAsset::Snow,
        95 | 96 | 99 => WeatherAsset::Thunderstorm,
        _ => WeatherAsset::Overcast,
    }
}

/// Keeps track of the weather code currently shown so the icon is only
/// swapped when the code changes
#[derive(Default)]
pub struct AssetTracker {
    current: Option<u16>,
}

impl AssetTracker {
    pub fn new() -> AssetTracker {
        AssetTracker { current: None }
    }

    /// Returns the asset to show if the code differs from the one shown, otherwise None
    ///
    /// # Arguments
    ///
    /// * 'code' - the latest weather code
    pub fn update(&mut self, code: u16) -> Option<WeatherAsset> {
        if self.current == Some(code) {
            None
        } else {
            self.current = Some(code);
            Some(weather_code_to_asset(code))
        }
    }
}
