//! HTTP access to the ladder service.
//!
//! - [`HttpClient`]: shared client with AJAX headers and 429 retry
//! - [`LadderApi`]: page fetcher implementing [`PageSource`]
//! - [`fetch_leagues`]: league discovery from the ladder index page

mod api;
mod client;
mod leagues;
mod retry;
mod source;

#[cfg(test)]
pub mod mock;

pub use api::{LadderApi, parse_entries, parse_total};
pub use client::HttpClient;
pub use leagues::{fetch_leagues, parse_league_names};
pub use retry::{RetryPolicy, parse_retry_after, retry_delay};
pub use source::PageSource;
