//! Tracking loop.
//!
//! One background task re-runs the search on a fixed interval and publishes a
//! [`TrackerState`] snapshot after every transition:
//!
//! ```text
//!   idle ──► searching ──┬─► found ──────┐
//!     ▲                  ├─► not-found ──┤ wait refresh_interval
//!     │                  └─► error ──────┤ (interruptible)
//!     └──────────────────────────────────┘
//! ```
//!
//! Consumers read snapshots through a `tokio::sync::watch` receiver. Only the
//! loop writes, so the planner's offset memory and the published state need
//! no locking.
//!
//! ## Example
//!
//! ```ignore
//! use ladder_core::{TrackerConfig, start_tracking};
//!
//! let handle = start_tracking("Zizaran", "Standard", TrackerConfig::default())?;
//! let mut updates = handle.subscribe();
//! while updates.changed().await.is_ok() {
//!     println!("{:?}", updates.borrow().status);
//! }
//! handle.stop().await;
//! ```

mod state;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::TrackerConfig;
use crate::error::Result;
use crate::network::{HttpClient, LadderApi, PageSource};
use crate::search::SearchPlanner;
use crate::shutdown::ShutdownSignal;

pub use state::{TrackerState, TrackerStatus};

pub struct Tracker<S: PageSource> {
    planner: SearchPlanner<S>,
    refresh_interval: Duration,
    state: watch::Sender<TrackerState>,
}

impl<S: PageSource + 'static> Tracker<S> {
    pub fn new(planner: SearchPlanner<S>, config: &TrackerConfig) -> Self {
        Self {
            planner,
            refresh_interval: config.refresh_interval,
            state: watch::Sender::new(TrackerState::default()),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<TrackerState> {
        self.state.subscribe()
    }

    pub fn planner(&self) -> &SearchPlanner<S> {
        &self.planner
    }

    /// Run cycles until shutdown is triggered
    ///
    /// Cycle errors are published and the loop carries on. Nothing is
    /// published once shutdown has been observed.
    pub async fn run(&mut self, shutdown: Arc<ShutdownSignal>) {
        info!("Tracking '{}'", self.planner.target());

        while !shutdown.is_shutdown() {
            self.run_cycle(&shutdown).await;
            if shutdown.is_shutdown() {
                break;
            }

            if shutdown.wait(self.refresh_interval).await {
                break;
            }
        }

        info!("Tracker for '{}' stopped", self.planner.target());
    }

    /// Execute one search cycle and publish its outcome
    pub async fn run_cycle(&mut self, shutdown: &Arc<ShutdownSignal>) {
        let searching = self.state.borrow().begin_search(Utc::now());
        self.state.send_replace(searching);

        let outcome = self.planner.search(shutdown).await;
        if shutdown.is_shutdown() {
            debug!("Shutdown during cycle, discarding outcome");
            return;
        }

        let next = match outcome {
            Ok(Some(result)) => {
                debug!(
                    "'{}' at rank {} (offset {:?})",
                    result.target.name,
                    result.target.rank,
                    self.planner.last_known_offset()
                );
                TrackerState::found(result, Utc::now())
            }
            Ok(None) => {
                info!("'{}' not found on the ladder", self.planner.target());
                TrackerState::not_found(Utc::now())
            }
            Err(e) if e.is_cancelled() => return,
            Err(e) => {
                warn!("Search cycle failed: {}", e);
                self.state.borrow().failed(e.to_string(), Utc::now())
            }
        };
        self.state.send_replace(next);
    }

    /// Move the loop onto a background task
    pub fn spawn(mut self, shutdown: Arc<ShutdownSignal>) -> TrackerHandle {
        let state = self.subscribe();
        let task_shutdown = Arc::clone(&shutdown);
        let task = tokio::spawn(async move {
            self.run(task_shutdown).await;
        });

        TrackerHandle {
            state,
            shutdown,
            task,
        }
    }
}

/// Control surface for a running tracker
pub struct TrackerHandle {
    state: watch::Receiver<TrackerState>,
    shutdown: Arc<ShutdownSignal>,
    task: JoinHandle<()>,
}

impl TrackerHandle {
    /// Latest published snapshot
    pub fn state(&self) -> TrackerState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<TrackerState> {
        self.state.clone()
    }

    /// Trigger shutdown and wait for the loop to exit
    pub async fn stop(self) {
        self.shutdown.trigger();
        self.join().await;
    }

    /// Wait for the loop to exit on its own shutdown signal
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            error!("Tracker task failed: {}", e);
        }
    }
}

/// Start tracking `character` on `league` against the live ladder service
///
/// Must be called from within a Tokio runtime.
pub fn start_tracking(
    character: &str,
    league: &str,
    config: TrackerConfig,
) -> Result<TrackerHandle> {
    start_tracking_with_shutdown(character, league, config, Arc::new(ShutdownSignal::new()))
}

/// Like [`start_tracking`], with a caller-owned shutdown signal
pub fn start_tracking_with_shutdown(
    character: &str,
    league: &str,
    config: TrackerConfig,
    shutdown: Arc<ShutdownSignal>,
) -> Result<TrackerHandle> {
    config.validate()?;
    let client = HttpClient::new(&config)?;
    let api = Arc::new(LadderApi::new(client, &config, league)?);
    let planner = SearchPlanner::new(api, character, &config);
    let tracker = Tracker::new(planner, &config);
    debug!(
        "Starting tracker: league={}, page_size={}, interval={}s",
        league,
        config.page_size,
        config.refresh_interval.as_secs()
    );
    Ok(tracker.spawn(shutdown))
}
