//! In-memory ladder for planner and tracker tests

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::network::PageSource;
use crate::shutdown::ShutdownSignal;

const LATENCY: Duration = Duration::from_millis(10);

/// A recorded request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Total,
    Page(u32),
}

pub struct MockLadder {
    entries: Mutex<Vec<Entry>>,
    reported_total: Mutex<Option<u32>>,
    failing_offsets: Mutex<Vec<u32>>,
    calls: Mutex<Vec<Call>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockLadder {
    /// Ladder of `count` entries named `player{rank}`
    pub fn new(count: u32) -> Self {
        let entries = (1..=count)
            .map(|rank| Entry {
                rank,
                name: format!("player{}", rank),
                class: "Marauder".to_string(),
                level: 90,
                experience: u64::from(count - rank + 1) * 1_000,
            })
            .collect();

        Self {
            entries: Mutex::new(entries),
            reported_total: Mutex::new(None),
            failing_offsets: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Rename the entry at `index` to `name`
    pub fn place(&self, name: &str, index: usize) {
        self.entries.lock().unwrap()[index].name = name.to_string();
    }

    /// Remove `name` from wherever it is and put it at `index`
    pub fn move_to(&self, name: &str, index: usize) {
        self.remove(name);
        self.place(name, index);
    }

    /// Give every entry named `name` its default name back
    pub fn remove(&self, name: &str) {
        for entry in self.entries.lock().unwrap().iter_mut() {
            if entry.name == name {
                entry.name = format!("player{}", entry.rank);
            }
        }
    }

    pub fn set_experience(&self, index: usize, experience: u64) {
        self.entries.lock().unwrap()[index].experience = experience;
    }

    /// Report `total` instead of the real entry count
    pub fn report_total(&self, total: u32) {
        *self.reported_total.lock().unwrap() = Some(total);
    }

    /// Fail every page request at `offset`
    pub fn fail_at(&self, offset: u32) {
        self.failing_offsets.lock().unwrap().push(offset);
    }

    pub fn clear_failures(&self) {
        self.failing_offsets.lock().unwrap().clear();
    }

    pub fn latency(&self) -> Duration {
        LATENCY
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
        self.max_in_flight.store(0, Ordering::SeqCst);
    }

    pub fn total_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| **call == Call::Total)
            .count()
    }

    pub fn page_offsets_sorted(&self) -> Vec<u32> {
        let mut offsets: Vec<u32> = self
            .calls()
            .iter()
            .filter_map(|call| match call {
                Call::Page(offset) => Some(*offset),
                Call::Total => None,
            })
            .collect();
        offsets.sort_unstable();
        offsets
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn simulate_request(&self, call: Call, shutdown: &ShutdownSignal) -> Result<()> {
        shutdown.check()?;
        self.calls.lock().unwrap().push(call);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let waited = shutdown.sleep(LATENCY).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        waited
    }
}

#[async_trait]
impl PageSource for MockLadder {
    async fn fetch_total(&self, shutdown: &ShutdownSignal) -> Result<u32> {
        self.simulate_request(Call::Total, shutdown).await?;
        let reported = *self.reported_total.lock().unwrap();
        Ok(reported.unwrap_or(self.entries.lock().unwrap().len() as u32))
    }

    async fn fetch_page(
        &self,
        offset: u32,
        limit: u32,
        shutdown: &ShutdownSignal,
    ) -> Result<Vec<Entry>> {
        self.simulate_request(Call::Page(offset), shutdown).await?;

        if self.failing_offsets.lock().unwrap().contains(&offset) {
            return Err(Error::RequestFailed(format!("HTTP 500 at offset {}", offset)));
        }

        let entries = self.entries.lock().unwrap();
        let start = (offset as usize).min(entries.len());
        let end = (start + limit as usize).min(entries.len());
        Ok(entries[start..end].to_vec())
    }
}
