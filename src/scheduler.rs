use std::fmt::Display;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use chrono::{DateTime, TimeDelta, Utc};
use log::{error, info};

/// Source of the current time
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Blocks the calling thread between ticks
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Counts of ticks run by a scheduler
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickStats {
    pub completed: usize,
    pub skipped: usize,
}

/// Runs a task periodically.
///
/// Every tick reads the clock, runs the task and then sleeps until the next tick is due.
/// A failing task only skips its own tick, the error is logged and the schedule goes on.
pub struct Scheduler<C: Clock, S: Sleeper> {
    name: String,
    interval: TimeDelta,
    clock: C,
    sleeper: S,
    max_ticks: Option<usize>,
    stop: Arc<AtomicBool>,
}

impl<C: Clock, S: Sleeper> Scheduler<C, S> {
    /// Returns a scheduler that runs until stopped
    ///
    /// # Arguments
    ///
    /// * 'name' - name used when logging
    /// * 'interval' - time between the start of two ticks
    /// * 'clock' - the clock to read
    /// * 'sleeper' - the sleeper to wait with
    pub fn new(name: &str, interval: Duration, clock: C, sleeper: S) -> Scheduler<C, S> {
        Scheduler {
            name: name.to_string(),
            interval: TimeDelta::from_std(interval).unwrap_or(TimeDelta::days(1)),
            clock,
            sleeper,
            max_ticks: None,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Limits the number of ticks to run
    pub fn with_max_ticks(mut self, max_ticks: usize) -> Self {
        self.max_ticks = Some(max_ticks);
        self
    }

    /// Shares a stop flag, the scheduler returns once it is set
    pub fn with_stop_flag(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    /// Runs the task on every tick until stopped or the tick limit is reached
    ///
    /// # Arguments
    ///
    /// * 'task' - called with the tick time
    pub fn run<F, E>(&self, mut task: F) -> TickStats
    where
        F: FnMut(DateTime<Utc>) -> Result<(), E>,
        E: Display,
    {
        let mut stats = TickStats::default();
        info!("{} scheduler started, interval {}s", self.name, self.interval.num_seconds());

        while !self.stop.load(Ordering::Relaxed) && self.max_ticks.is_none_or(|m| stats.completed + stats.skipped < m) {
            let tick = self.clock.now();

            match task(tick) {
                Ok(()) => stats.completed += 1,
                Err(e) => {
                    error!("{} tick at {} skipped: {}", self.name, tick.format("%Y-%m-%d %H:%M:%S"), e);
                    stats.skipped += 1;
                }
            }

            if self.max_ticks.is_some_and(|m| stats.completed + stats.skipped >= m) || self.stop.load(Ordering::Relaxed) {
                break;
            }

            let due = tick.checked_add_signed(self.interval).unwrap_or(tick);
            if let Ok(wait) = (due - self.clock.now()).to_std() {
                self.sleeper.sleep(wait);
            }
        }

        info!("{} scheduler stopped: {} completed, {} skipped", self.name, stats.completed, stats.skipped);
        stats
    }
}
