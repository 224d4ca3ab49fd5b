use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;

use crate::error::{Error, Result};

/// A shutdown signal that supports interruptible async waits.
///
/// Unlike `tokio::time::sleep()`, waits on this signal return as soon as
/// shutdown is triggered. Triggering is synchronous so it can be called from
/// a Ctrl+C handler or a plain thread.
#[derive(Debug)]
pub struct ShutdownSignal {
    sender: watch::Sender<bool>,
}

impl ShutdownSignal {
    /// Create a new shutdown signal in the non-shutdown state.
    pub fn new() -> Self {
        Self {
            sender: watch::Sender::new(false),
        }
    }

    /// Trigger the shutdown signal, waking all waiting tasks.
    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }

    /// Check if shutdown has been triggered.
    pub fn is_shutdown(&self) -> bool {
        *self.sender.borrow()
    }

    /// Fail with [`Error::Cancelled`] if shutdown has been triggered.
    pub fn check(&self) -> Result<()> {
        if self.is_shutdown() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Resolve once shutdown is triggered.
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = receiver.wait_for(|shutdown| *shutdown).await;
    }

    /// Wait for the specified duration or until shutdown is triggered.
    ///
    /// Returns `true` if shutdown was triggered, `false` if the wait completed normally.
    pub async fn wait(&self, duration: Duration) -> bool {
        if self.is_shutdown() {
            return true;
        }

        tokio::select! {
            _ = self.cancelled() => true,
            _ = tokio::time::sleep(duration) => self.is_shutdown(),
        }
    }

    /// Like [`wait`](Self::wait), but maps shutdown to [`Error::Cancelled`].
    pub async fn sleep(&self, duration: Duration) -> Result<()> {
        if self.wait(duration).await {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Drive `future` to completion unless shutdown is triggered first.
    ///
    /// On shutdown the future is dropped and [`Error::Cancelled`] is returned.
    pub async fn guard<F, T>(&self, future: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check()?;
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(Error::Cancelled),
            result = future => result,
        }
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}
