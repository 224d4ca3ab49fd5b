use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::config::TrackerConfig;
use crate::error::{Error, Result};
use crate::network::retry::{RetryPolicy, parse_retry_after};
use crate::shutdown::ShutdownSignal;

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko)";

/// HTTP client shared by every page fetch
///
/// Requests carry the headers of an AJAX call made by a browser. Cloning is
/// cheap and clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    policy: RetryPolicy,
}

impl HttpClient {
    pub fn new(config: &TrackerConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/javascript, */*; q=0.01"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(
            HeaderName::from_static("x-requested-with"),
            HeaderValue::from_static("XMLHttpRequest"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

        let client = Client::builder()
            .timeout(config.request_timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::RequestFailed(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            policy: RetryPolicy::from_config(config),
        })
    }

    /// GET `url` and return the body, retrying rate-limited responses
    ///
    /// Only HTTP 429 is retried. Any other non-success status fails at once.
    /// Shutdown is observed before every request and during every delay.
    pub async fn get_text(&self, url: &str, shutdown: &ShutdownSignal) -> Result<String> {
        let mut retries = 0u32;

        loop {
            shutdown.check()?;
            let response = shutdown
                .guard(async { Ok(self.client.get(url).send().await?) })
                .await?;
            let status = response.status();

            if status.is_success() {
                return shutdown.guard(async { Ok(response.text().await?) }).await;
            }

            if status != StatusCode::TOO_MANY_REQUESTS {
                return Err(Error::RequestFailed(format!("HTTP {} for {}", status, url)));
            }

            if retries >= self.policy.max_retries {
                return Err(Error::RateLimited { attempts: retries });
            }
            retries += 1;

            let hint = parse_retry_after(response.headers());
            let delay = self.policy.delay(retries, hint);
            warn!(
                "Rate limited (retry {}/{}), waiting {}ms",
                retries,
                self.policy.max_retries,
                delay.as_millis()
            );
            shutdown.sleep(delay).await?;
            debug!("Retrying {}", url);
        }
    }
}

/// Milliseconds since the Unix epoch, used as a cache-busting query value
pub(crate) fn cache_buster() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
