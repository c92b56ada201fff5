use std::sync::Arc;
use log::info;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config as LogConfig, Root};
use log4rs::encode::pattern::PatternEncoder;
use crate::config::{Config, General};
use crate::dashboard::{LogPresenter, Presenter};
use crate::errors::LogSetupError;
use crate::manager_open_meteo::{OpenMeteo, WeatherSource};

const LOG_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l:<5} {t} - {m}{n}";

/// Weather source and presenter shared by the worker loops
pub struct Mgr<W: WeatherSource = OpenMeteo> {
    pub source: W,
    pub presenter: Arc<dyn Presenter + Send + Sync>,
}

/// Sets up logging and returns the managers the worker needs
///
/// # Arguments
///
/// * 'config' - configuration
pub fn init(config: &Config) -> Result<Mgr, LogSetupError> {
    setup_logger(&config.general)?;

    info!("weatherdash version: {}", env!("CARGO_PKG_VERSION"));
    info!("dashboard for {} ({}, {}), days in {}",
          config.display.location_name, config.geo_ref.lat, config.geo_ref.long, config.display.timezone);

    Ok(Mgr {
        source: OpenMeteo::new(&config.geo_ref, &config.open_meteo),
        presenter: Arc::new(LogPresenter),
    })
}

/// Configures log4rs with a file appender and optionally a console appender
///
/// # Arguments
///
/// * 'general' - general configuration
fn setup_logger(general: &General) -> Result<(), LogSetupError> {
    let file = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
        .build(&general.log_path)
        .map_err(|e| LogSetupError(format!("log file {}: {}", general.log_path, e)))?;

    let mut builder = LogConfig::builder()
        .appender(Appender::builder().build("file", Box::new(file)));
    let mut root = Root::builder().appender("file");

    if general.log_to_stdout {
        let stdout = ConsoleAppender::builder()
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build();
        builder = builder.appender(Appender::builder().build("stdout", Box::new(stdout)));
        root = root.appender("stdout");
    }

    let log_config = builder
        .build(root.build(general.log_level))
        .map_err(|e| LogSetupError(e.to_string()))?;

    log4rs::init_config(log_config).map_err(|e| LogSetupError(e.to_string()))?;

    Ok(())
}
