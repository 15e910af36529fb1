//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building an HTTP client with the configured identity headers
//! - GET requests with retry on transient failures
//! - Linear backoff between attempts
//! - Politeness jitter before requests

use crate::config::HttpConfig;
use crate::{HarvestError, Result};
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, CACHE_CONTROL};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// The client carries the configured User-Agent and Accept-Language on
/// every request, plus `Cache-Control: no-cache` so listing pages are not
/// served from intermediary caches.
pub fn build_http_client(config: &HttpConfig) -> std::result::Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&config.accept_language) {
        headers.insert(ACCEPT_LANGUAGE, value);
    }
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

    Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and returns the response body as a string
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | 2xx | Return body |
/// | HTTP 429 / 502 / 503 | Retry with linear backoff |
/// | Timeout | Retry with linear backoff |
/// | Other HTTP error | Immediate failure |
/// | Other network error | Immediate failure |
///
/// Attempt N waits `backoff-ms * N` before retrying; after `max-retries`
/// attempts the fetch fails with `RetriesExhausted`.
pub async fn fetch_html(client: &Client, url: &str, config: &HttpConfig) -> Result<String> {
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;

        match client.get(url).send().await {
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    return response.text().await.map_err(|e| HarvestError::Http {
                        url: url.to_string(),
                        source: e,
                    });
                }

                if is_transient(status) {
                    if attempt >= config.max_retries {
                        return Err(HarvestError::RetriesExhausted {
                            url: url.to_string(),
                            attempts: attempt,
                        });
                    }
                    let delay = Duration::from_millis(config.backoff_ms * attempt as u64);
                    tracing::warn!(
                        "HTTP {} for {}, retrying in {:?} (attempt {}/{})",
                        status.as_u16(),
                        url,
                        delay,
                        attempt,
                        config.max_retries
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }

                return Err(HarvestError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }
            Err(e) if e.is_timeout() => {
                if attempt >= config.max_retries {
                    return Err(HarvestError::RetriesExhausted {
                        url: url.to_string(),
                        attempts: attempt,
                    });
                }
                let delay = Duration::from_millis(config.backoff_ms * attempt as u64);
                tracing::warn!(
                    "Timeout for {}, retrying in {:?} (attempt {}/{})",
                    url,
                    delay,
                    attempt,
                    config.max_retries
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                return Err(HarvestError::Http {
                    url: url.to_string(),
                    source: e,
                });
            }
        }
    }
}

/// Sleeps for `base_ms` plus up to half of `base_ms` of random jitter
///
/// Keeps request timing slightly irregular so the harvester is not
/// hammering the site on a fixed cadence.
pub async fn jitter_sleep(base_ms: u64) {
    if base_ms == 0 {
        return;
    }
    let jitter = rand::thread_rng().gen_range(0..=base_ms / 2);
    tokio::time::sleep(Duration::from_millis(base_ms + jitter)).await;
}

fn is_transient(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS | StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let config = HttpConfig::default();
        assert!(build_http_client(&config).is_ok());
    }

    #[test]
    fn test_transient_statuses() {
        assert!(is_transient(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_transient(StatusCode::BAD_GATEWAY));
        assert!(is_transient(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!is_transient(StatusCode::NOT_FOUND));
        assert!(!is_transient(StatusCode::INTERNAL_SERVER_ERROR));
    }

    // Retry behavior against live responses is covered by the wiremock
    // integration tests.
}
