//! League discovery from the public ladder index page

use memchr::memmem;
use tracing::debug;

use crate::config::TrackerConfig;
use crate::error::Result;
use crate::network::client::HttpClient;
use crate::shutdown::ShutdownSignal;

const LADDER_VIEW_MARKER: &str = "<div class=\"ladderView\">";
const HEADING_OPEN: &str = "<h2>";
const HEADING_CLOSE: &str = "</h2>";

/// Extract league names from the ladder index HTML
///
/// Each `ladderView` block contributes the text of its first `<h2>`.
/// Blocks without a heading are skipped.
pub fn parse_league_names(html: &str) -> Vec<String> {
    let bytes = html.as_bytes();
    let starts: Vec<usize> = memmem::find_iter(bytes, LADDER_VIEW_MARKER.as_bytes()).collect();

    starts
        .iter()
        .enumerate()
        .filter_map(|(i, &start)| {
            let block_start = start + LADDER_VIEW_MARKER.len();
            let block_end = starts.get(i + 1).copied().unwrap_or(bytes.len());
            let block = &html[block_start..block_end];

            let open = memmem::find(block.as_bytes(), HEADING_OPEN.as_bytes())?;
            let text = &block[open + HEADING_OPEN.len()..];
            let close =
                memmem::find(text.as_bytes(), HEADING_CLOSE.as_bytes()).unwrap_or(text.len());
            Some(text[..close].trim().to_string())
        })
        .filter(|name| !name.is_empty())
        .collect()
}

/// Fetch the ladder index page and list the leagues it shows
pub async fn fetch_leagues(
    client: &HttpClient,
    config: &TrackerConfig,
    shutdown: &ShutdownSignal,
) -> Result<Vec<String>> {
    let url = format!("{}/ladders", config.base_url.trim_end_matches('/'));
    let html = client.get_text(&url, shutdown).await?;
    let leagues = parse_league_names(&html);
    debug!("Discovered {} leagues", leagues.len());
    Ok(leagues)
}
