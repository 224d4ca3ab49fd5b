use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use tracing::debug;

use crate::config::TrackerConfig;
use crate::entry::Entry;
use crate::error::{Error, Result};
use crate::network::client::{HttpClient, cache_buster};
use crate::network::source::PageSource;
use crate::shutdown::ShutdownSignal;

/// Ladder page envelope as served by the API
///
/// Every field is optional on the wire; absent values decode to zero or empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LadderPage {
    total: Option<u32>,
    entries: Option<Vec<LadderRow>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LadderRow {
    rank: Option<u32>,
    character: Option<CharacterInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CharacterInfo {
    name: Option<String>,
    class: Option<String>,
    level: Option<u32>,
    experience: Option<u64>,
}

impl LadderRow {
    /// Rows without a `character` object carry nothing to match and are skipped
    fn into_entry(self) -> Option<Entry> {
        let character = self.character?;
        Some(Entry {
            rank: self.rank.unwrap_or(0),
            name: character.name.unwrap_or_default(),
            class: character.class.unwrap_or_default(),
            level: character.level.unwrap_or(0),
            experience: character.experience.unwrap_or(0),
        })
    }
}

/// Decode a page body into entries
pub fn parse_entries(body: &str) -> Result<Vec<Entry>> {
    let page: LadderPage = serde_json::from_str(body)?;
    Ok(page
        .entries
        .unwrap_or_default()
        .into_iter()
        .filter_map(LadderRow::into_entry)
        .collect())
}

/// Decode the `total` field of a page body, if present
pub fn parse_total(body: &str) -> Result<Option<u32>> {
    let page: LadderPage = serde_json::from_str(body)?;
    Ok(page.total)
}

/// Percent-encode everything except RFC 3986 unreserved characters
fn escape_data(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

/// Page fetcher for one league's ladder
pub struct LadderApi {
    client: HttpClient,
    endpoint: Url,
    league: String,
    realm: String,
    page_size: u32,
    fallback_total: u32,
}

impl LadderApi {
    pub fn new(client: HttpClient, config: &TrackerConfig, league: &str) -> Result<Self> {
        let endpoint = Url::parse(&format!(
            "{}/api/ladders",
            config.base_url.trim_end_matches('/')
        ))
        .map_err(|e| Error::Config(format!("invalid base_url {}: {}", config.base_url, e)))?;

        Ok(Self {
            client,
            endpoint,
            league: league.to_string(),
            realm: config.realm.clone(),
            page_size: config.page_size,
            fallback_total: config.fallback_total,
        })
    }

    /// Build the page URL with a fresh cache-busting timestamp
    ///
    /// Values are percent-encoded (`%20` for spaces, never `+`).
    pub fn page_url(&self, offset: u32, limit: u32) -> Url {
        let query = format!(
            "offset={}&limit={}&id={}&type=league&realm={}&_={}",
            offset,
            limit,
            escape_data(&self.league),
            escape_data(&self.realm),
            cache_buster()
        );
        let mut url = self.endpoint.clone();
        url.set_query(Some(&query));
        url
    }

    /// Fetch one full page at `offset`
    pub async fn page(&self, offset: u32, shutdown: &ShutdownSignal) -> Result<Vec<Entry>> {
        self.fetch_page(offset, self.page_size, shutdown).await
    }
}

#[async_trait]
impl PageSource for LadderApi {
    async fn fetch_total(&self, shutdown: &ShutdownSignal) -> Result<u32> {
        let url = self.page_url(0, 1);
        let body = self.client.get_text(url.as_str(), shutdown).await?;
        match parse_total(&body)? {
            Some(total) => Ok(total),
            None => {
                debug!(
                    "Ladder response has no total, assuming {}",
                    self.fallback_total
                );
                Ok(self.fallback_total)
            }
        }
    }

    async fn fetch_page(
        &self,
        offset: u32,
        limit: u32,
        shutdown: &ShutdownSignal,
    ) -> Result<Vec<Entry>> {
        let url = self.page_url(offset, limit);
        let body = self.client.get_text(url.as_str(), shutdown).await?;
        let entries = parse_entries(&body)?;
        debug!("Fetched {} entries at offset {}", entries.len(), offset);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::mock::{MockResponse, MockServer};
    use std::time::Duration;

    fn make_api(base_url: &str) -> LadderApi {
        let config = TrackerConfig::builder()
            .base_url(base_url)
            .retry_base_delay(Duration::from_millis(5))
            .build();
        let client = HttpClient::new(&config).unwrap();
        LadderApi::new(client, &config, "Settlers of Kalguur").unwrap()
    }

    #[test]
    fn test_parse_entries_full() {
        let body = r#"{
            "total": 15000,
            "entries": [
                {"rank": 1, "character": {"name": "Alpha", "class": "Witch", "level": 100, "experience": 4250334444}},
                {"rank": 2, "character": {"name": "Beta", "class": "Ranger", "level": 99, "experience": 4000000000}}
            ]
        }"#;
        let entries = parse_entries(body).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "Alpha");
        assert_eq!(entries[0].experience, 4_250_334_444);
        assert_eq!(entries[1].rank, 2);
        assert_eq!(entries[1].class, "Ranger");
    }

    #[test]
    fn test_parse_entries_missing_fields_default() {
        let body = r#"{"entries": [{"character": {"name": "Solo"}}, {"rank": 5}]}"#;
        let entries = parse_entries(body).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].rank, 0);
        assert_eq!(entries[0].name, "Solo");
        assert_eq!(entries[0].class, "");
        assert_eq!(entries[0].level, 0);
        assert_eq!(entries[0].experience, 0);
    }

    #[test]
    fn test_parse_entries_no_entries_is_empty() {
        assert!(parse_entries("{}").unwrap().is_empty());
        assert!(parse_entries(r#"{"entries": null}"#).unwrap().is_empty());
        assert!(parse_entries(r#"{"entries": []}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_invalid_envelope_fails() {
        assert!(matches!(parse_entries("<html>"), Err(Error::Json(_))));
    }

    #[test]
    fn test_parse_total() {
        assert_eq!(parse_total(r#"{"total": 600}"#).unwrap(), Some(600));
        assert_eq!(parse_total(r#"{"entries": []}"#).unwrap(), None);
    }

    #[test]
    fn test_page_url_query() {
        let api = make_api("https://ladder.example");
        let url = api.page_url(400, 200);
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert_eq!(url.path(), "/api/ladders");
        assert_eq!(pairs[0], ("offset".into(), "400".into()));
        assert_eq!(pairs[1], ("limit".into(), "200".into()));
        assert_eq!(pairs[2], ("id".into(), "Settlers of Kalguur".into()));
        assert_eq!(pairs[3], ("type".into(), "league".into()));
        assert_eq!(pairs[4], ("realm".into(), "pc".into()));
        assert_eq!(pairs[5].0, "_");
        assert!(pairs[5].1.parse::<i64>().unwrap() > 0);
    }

    #[test]
    fn test_page_url_percent_encodes_league() {
        let api = make_api("https://ladder.example");
        let query = api.page_url(0, 200).query().unwrap().to_string();

        assert!(query.contains("&id=Settlers%20of%20Kalguur&"), "{}", query);
        assert!(!query.contains('+'));
        assert_eq!(escape_data("Hardcore (PL123)"), "Hardcore%20%28PL123%29");
        assert_eq!(escape_data("Ünique~1.0_x-y"), "%C3%9Cnique~1.0_x-y");
    }

    #[tokio::test]
    async fn test_fetch_total_uses_fallback() {
        let server = MockServer::start(vec![MockResponse::ok(r#"{"entries": []}"#)]).await;
        let api = make_api(&server.url());

        let total = api.fetch_total(&ShutdownSignal::new()).await.unwrap();
        assert_eq!(total, 15000);
        assert!(server.requests()[0].contains("limit=1"));
    }

    #[tokio::test]
    async fn test_fetch_total_reads_field() {
        let server = MockServer::start(vec![MockResponse::ok(r#"{"total": 600}"#)]).await;
        let api = make_api(&server.url());

        assert_eq!(api.fetch_total(&ShutdownSignal::new()).await.unwrap(), 600);
    }

    #[tokio::test]
    async fn test_fetch_page_after_rate_limit() {
        let server = MockServer::start(vec![
            MockResponse::status(429),
            MockResponse::ok(
                r#"{"entries": [{"rank": 201, "character": {"name": "Zizaran", "class": "Juggernaut", "level": 95, "experience": 100}}]}"#,
            ),
        ])
        .await;
        let api = make_api(&server.url());

        let entries = api.page(200, &ShutdownSignal::new()).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Zizaran");
        assert_eq!(server.request_count(), 2);
        assert!(server.requests()[1].contains("offset=200&limit=200"));
    }
}
