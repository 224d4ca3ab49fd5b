//! Search planner for locating the target on the ladder
//!
//! # Search Strategy
//!
//! Each cycle runs one of two strategies:
//!
//! 1. **Locality probe**: when the target was found before, the pages at
//!    `remembered - page`, `remembered` and `remembered + page` are fetched one
//!    after another. Ranks move slowly, so this usually costs one or two requests.
//! 2. **Full scan**: the whole offset space is walked in batches of
//!    `concurrent_batch_size` pages fetched in parallel, with a fixed pause
//!    between batches to stay under the service's rate limit.
//!
//! ```text
//!  remembered = 400, page = 200
//!
//!  probe:   [200] -> [400] -> [600]            sequential, stop on match
//!  scan:    [0 200 400 600] ~600ms~ [800 1000 1200 1400] ~600ms~ ...
//!                 batch 0                    batch 1
//! ```
//!
//! The offset where the target was last seen is the only state kept across
//! cycles. It is cleared when a full scan finds nothing.

#[cfg(test)]
pub mod mock;

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::TrackerConfig;
use crate::entry::{Entry, SearchResult, find_in_page};
use crate::error::{Error, Result};
use crate::network::PageSource;
use crate::shutdown::ShutdownSignal;

/// Offsets probed around a remembered offset, clamped at zero
pub fn probe_offsets(remembered: u32, page_size: u32) -> Vec<u32> {
    let start = remembered.saturating_sub(page_size);
    let end = remembered.saturating_add(page_size);
    (start..=end).step_by(page_size.max(1) as usize).collect()
}

/// Page offsets of the full-scan batch starting at `batch_start`
pub fn batch_offsets(batch_start: u32, page_size: u32, batch_size: u32, total: u32) -> Vec<u32> {
    (0..batch_size)
        .filter_map(|i| batch_start.checked_add(i.checked_mul(page_size)?))
        .take_while(|&offset| offset < total)
        .collect()
}

type PageTask = (u32, JoinHandle<Result<Vec<Entry>>>);

pub struct SearchPlanner<S: PageSource> {
    source: Arc<S>,
    target: String,
    page_size: u32,
    batch_size: u32,
    batch_span: u32,
    batch_delay: Duration,
    last_known_offset: Option<u32>,
}

impl<S: PageSource + 'static> SearchPlanner<S> {
    pub fn new(source: Arc<S>, target: &str, config: &TrackerConfig) -> Self {
        Self {
            source,
            target: target.to_string(),
            page_size: config.page_size.max(1),
            batch_size: config.concurrent_batch_size.max(1),
            batch_span: config.batch_span(),
            batch_delay: config.batch_delay,
            last_known_offset: None,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Offset of the page where the target was last found
    pub fn last_known_offset(&self) -> Option<u32> {
        self.last_known_offset
    }

    /// Run one search cycle
    ///
    /// Returns `Ok(None)` when the whole ladder was scanned without a match.
    pub async fn search(
        &mut self,
        shutdown: &Arc<ShutdownSignal>,
    ) -> Result<Option<SearchResult>> {
        if let Some(remembered) = self.last_known_offset {
            if let Some(result) = self.probe_around(remembered, shutdown).await? {
                return Ok(Some(result));
            }
            debug!(
                "'{}' not near offset {}, falling back to full scan",
                self.target, remembered
            );
        }

        self.full_scan(shutdown).await
    }

    async fn probe_around(
        &mut self,
        remembered: u32,
        shutdown: &ShutdownSignal,
    ) -> Result<Option<SearchResult>> {
        for offset in probe_offsets(remembered, self.page_size) {
            shutdown.check()?;
            let entries = self
                .source
                .fetch_page(offset, self.page_size, shutdown)
                .await?;
            if entries.is_empty() {
                debug!("Probe at offset {} returned no entries, stopping probe", offset);
                break;
            }

            if let Some(result) = find_in_page(&entries, &self.target) {
                debug!("Found '{}' by probe at offset {}", self.target, offset);
                self.last_known_offset = Some(offset);
                return Ok(Some(result));
            }
        }

        Ok(None)
    }

    async fn full_scan(
        &mut self,
        shutdown: &Arc<ShutdownSignal>,
    ) -> Result<Option<SearchResult>> {
        shutdown.check()?;
        let total = self.source.fetch_total(shutdown).await?;
        debug!("Full scan for '{}' over {} entries", self.target, total);

        let mut batch_start = 0u32;
        let mut batch_index = 0u32;
        while batch_start < total {
            if batch_index > 0 {
                shutdown.sleep(self.batch_delay).await?;
            }
            shutdown.check()?;

            let offsets = batch_offsets(batch_start, self.page_size, self.batch_size, total);
            let tasks = self.spawn_batch(&offsets, shutdown);
            let pages = shutdown.guard(join_batch(tasks)).await?;

            // Pages are in submission order, so the lowest offset wins a tie
            for (offset, entries) in &pages {
                if let Some(result) = find_in_page(entries, &self.target) {
                    info!(
                        "Found '{}' at rank {} (offset {}, batch {})",
                        self.target, result.target.rank, offset, batch_index
                    );
                    self.last_known_offset = Some(*offset);
                    return Ok(Some(result));
                }
            }

            batch_index += 1;
            match batch_start.checked_add(self.batch_span) {
                Some(next) => batch_start = next,
                None => break,
            }
        }

        info!("'{}' not found in {} entries", self.target, total);
        self.last_known_offset = None;
        Ok(None)
    }

    fn spawn_batch(&self, offsets: &[u32], shutdown: &Arc<ShutdownSignal>) -> Vec<PageTask> {
        offsets
            .iter()
            .map(|&offset| {
                let source = Arc::clone(&self.source);
                let shutdown = Arc::clone(shutdown);
                let limit = self.page_size;
                let task =
                    tokio::spawn(async move { source.fetch_page(offset, limit, &shutdown).await });
                (offset, task)
            })
            .collect()
    }
}

/// Wait for every page of a batch, keeping submission order
///
/// All fetches are awaited before the first error is reported.
async fn join_batch(tasks: Vec<PageTask>) -> Result<Vec<(u32, Vec<Entry>)>> {
    let mut pages = Vec::with_capacity(tasks.len());
    let mut first_error = None;

    for (offset, task) in tasks {
        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(e) => Err(Error::RequestFailed(format!(
                "page fetch at offset {} aborted: {}",
                offset, e
            ))),
        };
        match outcome {
            Ok(entries) => pages.push((offset, entries)),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(pages),
    }
}
