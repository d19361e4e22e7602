use anyhow::{Context, Result};
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::settings::FetchSettings;
use crate::errors::fetch_context;
use crate::fetchers::PageFetcher;
use crate::rate_limiter::{backoff_delay, RateLimiter};

/// HTTP client with rate limiting and retry on transient failures
pub struct RateLimitedClient {
    client: Client,
    rate_limiter: RateLimiter,
    max_retries: u32,
    backoff_factor: f64,
}

impl RateLimitedClient {
    pub fn new(settings: &FetchSettings) -> Result<Self> {
        let client = Self::build_client(settings)?;
        let rate_limiter = RateLimiter::new(settings.rate_limit_ms);

        Ok(Self {
            client,
            rate_limiter,
            max_retries: settings.max_retries,
            backoff_factor: settings.backoff_factor,
        })
    }

    pub async fn get(&mut self, url: &str) -> Result<reqwest::Response> {
        self.rate_limiter.wait().await;
        debug!("GET #{} {}", self.rate_limiter.request_count(), url);

        let mut attempt = 0;
        loop {
            let result = self.send_get_request(url).await;
            let retryable = match &result {
                Ok(response) => is_retryable_status(response.status()),
                Err(_) => true,
            };

            if !retryable || attempt >= self.max_retries {
                return result;
            }

            attempt += 1;
            let delay = backoff_delay(self.backoff_factor, attempt);
            debug!("Retrying {} (attempt {}) in {:?}", url, attempt, delay);
            sleep(delay).await;
        }
    }

    fn build_client(settings: &FetchSettings) -> Result<Client> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static(settings.accept_language),
        );

        Client::builder()
            .user_agent(settings.user_agent)
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to build HTTP client")
    }

    async fn send_get_request(&self, url: &str) -> Result<reqwest::Response> {
        self.client
            .get(url)
            .send()
            .await
            .context("Failed to send GET request")
    }
}

impl PageFetcher for RateLimitedClient {
    async fn fetch_text(&mut self, url: &str) -> Result<String> {
        let response = self.get(url).await.with_context(|| fetch_context(url))?;

        if !response.status().is_success() {
            anyhow::bail!("HTTP error {} for {}", response.status(), url);
        }

        response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable_status(StatusCode::BAD_GATEWAY));
        assert!(!is_retryable_status(StatusCode::NOT_FOUND));
        assert!(!is_retryable_status(StatusCode::OK));
    }

    #[test]
    fn test_client_builds_from_default_settings() {
        assert!(RateLimitedClient::new(&FetchSettings::default()).is_ok());
    }
}
