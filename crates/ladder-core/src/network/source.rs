use async_trait::async_trait;

use crate::entry::Entry;
use crate::error::Result;
use crate::shutdown::ShutdownSignal;

/// Paginated access to a ranked ladder
///
/// Implementations must observe `shutdown` before issuing a request and
/// return [`Error::Cancelled`](crate::Error::Cancelled) once it fires.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Total number of entries on the ladder
    async fn fetch_total(&self, shutdown: &ShutdownSignal) -> Result<u32>;

    /// Entries starting at `offset`; empty once past the end of the ladder
    async fn fetch_page(
        &self,
        offset: u32,
        limit: u32,
        shutdown: &ShutdownSignal,
    ) -> Result<Vec<Entry>>;
}
