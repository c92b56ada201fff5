use std::env;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use anyhow::Context;
use log::error;
use crate::config::load_config;
use crate::initialization::init;

mod aggregation;
mod assets;
mod config;
mod dashboard;
mod errors;
mod forecast;
mod initialization;
mod manager_open_meteo;
mod models;
mod polar;
mod scheduler;
mod worker;

fn main() -> anyhow::Result<()> {
    let config_path = env::var("WEATHERDASH_CONFIG").unwrap_or("config.toml".to_string());
    let config = load_config(&config_path)
        .with_context(|| format!("loading configuration from {}", config_path))?;

    let mgr = init(&config).context("initializing")?;

    let stop = Arc::new(AtomicBool::new(false));
    if let Err(e) = worker::run(config, mgr, stop) {
        error!("{}", e);
        return Err(e.into());
    }

    Ok(())
}
