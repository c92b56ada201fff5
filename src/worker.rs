use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use chrono::{DateTime, Utc};
use log::{error, info};
use crate::assets::AssetTracker;
use crate::config::{Config, DisplayParameters};
use crate::dashboard::{build_current_view, build_snapshot, slot_view, CurrentView, DashboardSnapshot, LineHistory, Presenter, ReplayFrame};
use crate::errors::WorkerError;
use crate::forecast::forecast_window;
use crate::initialization::Mgr;
use crate::manager_open_meteo::WeatherSource;
use crate::models::weather::HourlyRecord;
use crate::polar::PolarGrid;
use crate::scheduler::{Scheduler, Sleeper, SystemClock, ThreadSleeper};

/// Forecast part of the dashboard, refreshed from the hourly series
pub struct Dashboard<W: WeatherSource> {
    source: W,
    display: DisplayParameters,
    presenter: Arc<dyn Presenter + Send + Sync>,
}

impl<W: WeatherSource> Dashboard<W> {
    pub fn new(source: W, display: DisplayParameters, presenter: Arc<dyn Presenter + Send + Sync>) -> Dashboard<W> {
        Dashboard { source, display, presenter }
    }

    /// Fetches the hourly series, builds a snapshot and hands it to the presenter
    ///
    /// # Arguments
    ///
    /// * 'now' - tick time
    pub fn refresh(&self, now: DateTime<Utc>) -> Result<DashboardSnapshot, WorkerError> {
        let records = self.source.hourly()?;
        let snapshot = build_snapshot(&records, now, &self.display)?;
        self.presenter.show_forecast(&snapshot);

        Ok(snapshot)
    }
}

/// Current conditions panel
pub struct CurrentPanel<W: WeatherSource> {
    source: W,
    display: DisplayParameters,
    grid: PolarGrid,
    tracker: AssetTracker,
    history: LineHistory,
    presenter: Arc<dyn Presenter + Send + Sync>,
}

impl<W: WeatherSource> CurrentPanel<W> {
    pub fn new(source: W, display: DisplayParameters, grid: PolarGrid, presenter: Arc<dyn Presenter + Send + Sync>) -> CurrentPanel<W> {
        let history = LineHistory::new(display.history_points);
        CurrentPanel { source, display, grid, tracker: AssetTracker::new(), history, presenter }
    }

    /// Fetches current conditions and hands the panel to the presenter
    pub fn refresh(&mut self) -> Result<CurrentView, WorkerError> {
        let record = self.source.current()?;
        let view = build_current_view(&record, &self.display, &self.grid, &mut self.tracker, &mut self.history);
        self.presenter.show_current(&view);

        Ok(view)
    }

    /// Plays back the hours of the fetched series that fall before today, oldest first.
    /// Every hour is shown as current conditions together with the forecast window
    /// anchored at that hour. Returns the number of hours played.
    ///
    /// # Arguments
    ///
    /// * 'now' - current time, decides what "today" is
    /// * 'sleeper' - waits between played hours
    /// * 'step' - pause between played hours
    /// * 'stop' - playback ends early once this is set
    pub fn replay<S: Sleeper>(&mut self, now: DateTime<Utc>, sleeper: &S, step: Duration, stop: &AtomicBool)
        -> Result<usize, WorkerError> {

        let records = self.source.hourly()?;
        let tz = self.display.timezone;
        let today = now.with_timezone(&tz).date_naive();

        let mut past: Vec<&HourlyRecord> = records
            .iter()
            .filter(|r| r.timestamp.with_timezone(&tz).date_naive() < today)
            .collect();
        past.sort_by_key(|r| r.timestamp);
        info!("replaying {} past hours", past.len());

        let mut played = 0;
        for record in past {
            if stop.load(Ordering::Relaxed) {
                break;
            }
            if played > 0 {
                sleeper.sleep(step);
            }

            let current = build_current_view(record, &self.display, &self.grid, &mut self.tracker, &mut self.history);
            let next_hours = forecast_window(&records, record.timestamp)
                .slots
                .iter()
                .map(|s| slot_view(s, &tz))
                .collect();

            self.presenter.show_replay(&ReplayFrame { current, next_hours });
            played += 1;
        }

        Ok(played)
    }
}

/// Runs the dashboard. When past days are fetched they are played back first, then current
/// conditions are polled on a thread of their own while the forecast is polled on the
/// calling thread.
///
/// # Arguments
///
/// * 'config' - configuration
/// * 'mgr' - weather source and presenter
/// * 'stop' - both loops return once this is set, it is set when the forecast loop returns
pub fn run<W>(config: Config, mgr: Mgr<W>, stop: Arc<AtomicBool>) -> Result<(), WorkerError>
where
    W: WeatherSource + Clone + Send + 'static,
{
    let mut panel = CurrentPanel::new(
        mgr.source.clone(),
        config.display.clone(),
        config.polar,
        Arc::clone(&mgr.presenter),
    );

    if config.open_meteo.past_days > 0 {
        let step = Duration::from_millis(config.poll.replay_step_millis);
        match panel.replay(Utc::now(), &ThreadSleeper, step, &stop) {
            Ok(played) => info!("replay done, {} hours played", played),
            Err(e) => error!("replay skipped: {}", e),
        }
    }

    let current_stop = Arc::clone(&stop);
    let current_interval = Duration::from_secs(config.poll.current_interval_secs);

    let handle = thread::Builder::new()
        .name("current".to_string())
        .spawn(move || {
            Scheduler::new("current", current_interval, SystemClock, ThreadSleeper)
                .with_stop_flag(current_stop)
                .run(|_| panel.refresh().map(|_| ()))
        })
        .map_err(|e| WorkerError::Thread(e.to_string()))?;

    let dashboard = Dashboard::new(mgr.source, config.display, mgr.presenter);
    let mut forecast = Scheduler::new("forecast", Duration::from_secs(config.poll.forecast_interval_secs), SystemClock, ThreadSleeper)
        .with_stop_flag(Arc::clone(&stop));
    if let Some(max_ticks) = config.poll.max_ticks {
        forecast = forecast.with_max_ticks(max_ticks);
    }
    let forecast_stats = forecast.run(|now| dashboard.refresh(now).map(|_| ()));

    stop.store(true, Ordering::Relaxed);
    let current_stats = handle.join()
        .map_err(|_| WorkerError::Thread("current conditions thread panicked".to_string()))?;

    info!("forecast ticks: {:?}, current ticks: {:?}", forecast_stats, current_stats);
    Ok(())
}
