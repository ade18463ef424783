//! dirwatch-daemon - Polling loop around the scan engine
//!
//! This crate drives a [`ScanEngine`] for the lifetime of the process:
//! - Runs one tick per poll interval until cancelled
//! - Backs off after the watched directory could not be read
//! - Keeps polling when a single tick panics
//! - Forwards every event to an [`EventSink`]

pub mod signal;
pub mod sink;

pub use sink::{EventSink, JsonSink, LogSink};

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use dirwatch_core::{DirwatchError, ScanEngine, ScanEvent, WatchConfig};
use tokio_util::sync::CancellationToken;

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("Invalid watch settings: {0}")]
    InvalidConfig(#[from] DirwatchError),
}

/// Totals for one run of the polling loop
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub started_at: DateTime<Local>,
    pub uptime: Duration,
    pub ticks: u64,
    pub matches: u64,
    pub errors: u64,
    pub panics: u64,
}

/// Owns the scan engine and schedules its ticks
pub struct Daemon {
    config: WatchConfig,
    engine: ScanEngine,
}

impl Daemon {
    pub fn new(config: WatchConfig) -> Result<Self, DaemonError> {
        config.validate()?;
        Ok(Self {
            config,
            engine: ScanEngine::new(),
        })
    }

    pub fn engine(&self) -> &ScanEngine {
        &self.engine
    }

    /// Run a single tick
    pub fn run_once(&mut self) -> Vec<ScanEvent> {
        self.engine.tick(&self.config)
    }

    /// Poll until `shutdown` is cancelled.
    ///
    /// The first tick runs immediately. After each tick the loop sleeps for
    /// the poll interval (or the error delay after a directory error), so
    /// ticks never overlap and a slow tick pushes the next one back.
    /// Cancellation is only observed between ticks, never while one is in
    /// progress. Ticks run on the calling task.
    pub async fn run(
        mut self,
        shutdown: CancellationToken,
        sink: &mut dyn EventSink,
    ) -> RunSummary {
        let started_at = Local::now();
        let clock = Instant::now();
        let mut summary = RunSummary {
            started_at,
            uptime: Duration::ZERO,
            ticks: 0,
            matches: 0,
            errors: 0,
            panics: 0,
        };

        while !shutdown.is_cancelled() {
            let config = &self.config;
            let engine = &mut self.engine;
            let outcome = catch_unwind(AssertUnwindSafe(|| engine.tick(config)));
            summary.ticks += 1;

            let delay = match outcome {
                Ok(events) => {
                    let mut directory_failed = false;
                    for event in &events {
                        match event {
                            ScanEvent::MatchFound { .. } => summary.matches += 1,
                            ScanEvent::ScanError { .. } => {
                                summary.errors += 1;
                                directory_failed |= event.is_directory_error();
                            }
                            _ => {}
                        }
                        if let Err(e) = sink.emit(event) {
                            tracing::error!("Failed to report event: {}", e);
                        }
                    }

                    if directory_failed {
                        let delay = self.config.error_delay();
                        tracing::debug!("Backing off for {:.1}s", delay.as_secs_f64());
                        delay
                    } else {
                        self.config.poll_interval()
                    }
                }
                Err(payload) => {
                    summary.panics += 1;
                    tracing::error!(
                        "Unhandled panic during tick: {}",
                        panic_message(&*payload)
                    );
                    self.config.poll_interval()
                }
            };

            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        summary.uptime = clock.elapsed();
        summary
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
