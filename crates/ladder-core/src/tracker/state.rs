use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::Display;

use crate::entry::SearchResult;

/// Which outcome currently dominates the published state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum TrackerStatus {
    /// No cycle has completed yet
    #[default]
    Idle,
    Searching,
    Found,
    NotFound,
    Error,
}

/// Snapshot published after every transition of the tracking loop
///
/// Snapshots are replaced wholesale, never patched in place, so readers never
/// observe a half-applied update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TrackerState {
    pub status: TrackerStatus,
    /// Last successful result; kept as history while an error is shown
    pub result: Option<SearchResult>,
    pub not_found: bool,
    pub last_error: Option<String>,
    pub searching: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TrackerState {
    /// A cycle has started
    pub fn begin_search(&self, now: DateTime<Utc>) -> Self {
        Self {
            status: TrackerStatus::Searching,
            result: self.result.clone(),
            not_found: self.not_found,
            last_error: None,
            searching: true,
            updated_at: Some(now),
        }
    }

    /// A cycle located the target
    pub fn found(result: SearchResult, now: DateTime<Utc>) -> Self {
        Self {
            status: TrackerStatus::Found,
            result: Some(result),
            not_found: false,
            last_error: None,
            searching: false,
            updated_at: Some(now),
        }
    }

    /// A cycle scanned the whole ladder without a match
    pub fn not_found(now: DateTime<Utc>) -> Self {
        Self {
            status: TrackerStatus::NotFound,
            result: None,
            not_found: true,
            last_error: None,
            searching: false,
            updated_at: Some(now),
        }
    }

    /// A cycle failed; the previous result stays as history
    pub fn failed(&self, message: String, now: DateTime<Utc>) -> Self {
        Self {
            status: TrackerStatus::Error,
            result: self.result.clone(),
            not_found: false,
            last_error: Some(message),
            searching: false,
            updated_at: Some(now),
        }
    }

    /// Current result, unless an error or a miss dominates
    pub fn current_result(&self) -> Option<&SearchResult> {
        match self.status {
            TrackerStatus::Found | TrackerStatus::Searching => self.result.as_ref(),
            _ => None,
        }
    }
}
