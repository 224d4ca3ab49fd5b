//! # ladder-core
//!
//! Core library for the ladder tracker.
//!
//! This crate provides:
//! - Ladder entries and the in-page matcher
//! - Paginated HTTP access with rate-limit retry
//! - The search planner (locality probe with full-scan fallback)
//! - The tracking loop and its published state
//! - Experience rate tracking
//!
//! Presentation is left to the caller: consumers subscribe to
//! [`TrackerState`] snapshots through a [`TrackerHandle`].

pub mod config;
pub mod entry;
pub mod error;
pub mod network;
pub mod rate;
pub mod search;
pub mod shutdown;
pub mod tracker;

pub use config::{TrackerConfig, TrackerConfigBuilder};
pub use entry::{Entry, SearchResult, find_in_page};
pub use error::{Error, Result};
pub use network::{
    HttpClient, LadderApi, PageSource, RetryPolicy, fetch_leagues, parse_league_names,
    retry_delay,
};
pub use rate::{XpRate, format_xp_rate};
pub use search::SearchPlanner;
pub use shutdown::ShutdownSignal;
pub use tracker::{
    Tracker, TrackerHandle, TrackerState, TrackerStatus, start_tracking,
    start_tracking_with_shutdown,
};
