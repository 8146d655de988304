//! HTTP client for the suggestion service
//!
//! POSTs the suggest-mapping request as JSON. Failures the error type marks
//! retryable are sent again after an exponential backoff, or after the wait
//! the service asked for when it rate limits.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use super::{ServiceError, SuggestMappingRequest, SuggestMappingResponse, SuggestionService};
use crate::config::ServiceConfig;

/// Initial backoff delay for retries
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Upper bound for any wait between attempts
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Wait assumed when a 429 carries no usable `retry-after`
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Suggestion service reached over HTTP
pub struct HttpSuggestionClient {
    url: String,
    api_key: Option<String>,
    http: Client,
    max_retries: u32,
    timeout: Duration,
    initial_backoff: Duration,
}

impl HttpSuggestionClient {
    /// Create a new client from configuration
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ServiceError> {
        debug!(?config, "from_config: called");
        let timeout = Duration::from_millis(config.timeout_ms);
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            url: config.url(),
            api_key: config.get_api_key(),
            http,
            max_retries: config.max_retries,
            timeout,
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
        })
    }

    /// Override the initial retry backoff
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    /// Backoff before retry number `attempt` (1-based), capped at [`MAX_BACKOFF`]
    fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .checked_mul(factor)
            .map_or(MAX_BACKOFF, |d| d.min(MAX_BACKOFF))
    }

    fn map_send_error(&self, e: reqwest::Error) -> ServiceError {
        if e.is_timeout() {
            ServiceError::Timeout(self.timeout)
        } else {
            ServiceError::Network(e)
        }
    }

    async fn send_once(&self, request: &SuggestMappingRequest) -> Result<SuggestMappingResponse, ServiceError> {
        let mut http_request = self.http.post(self.url.as_str()).json(request);
        if let Some(key) = &self.api_key {
            http_request = http_request.bearer_auth(key);
        }

        let response = http_request.send().await.map_err(|e| self.map_send_error(e))?;
        let status = response.status().as_u16();

        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            debug!(retry_after, "send_once: rate limited (429)");
            return Err(ServiceError::RateLimited {
                retry_after: Duration::from_secs(retry_after),
            });
        }

        if !response.status().is_success() {
            let message = response.text().await.unwrap_or_default();
            debug!(status, "send_once: service error");
            return Err(ServiceError::Status { status, message });
        }

        let body = response.text().await.map_err(|e| self.map_send_error(e))?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl SuggestionService for HttpSuggestionClient {
    async fn suggest_mapping(&self, request: SuggestMappingRequest) -> Result<SuggestMappingResponse, ServiceError> {
        debug!(
            url = %self.url,
            source = %request.source_attribute.name,
            target = %request.target_attribute.name,
            examples = request.example.len(),
            "suggest_mapping: called"
        );

        let mut attempt: u32 = 0;
        loop {
            match self.send_once(&request).await {
                Ok(response) => {
                    debug!(
                        attempt,
                        has_script = response.transformation_script.is_some(),
                        "suggest_mapping: success"
                    );
                    return Ok(response);
                }
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let wait = e.retry_after().unwrap_or_else(|| self.backoff(attempt)).min(MAX_BACKOFF);
                    warn!(
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        error = %e,
                        "suggest_mapping: retrying after transient error"
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(e) => {
                    debug!(attempt, error = %e, "suggest_mapping: giving up");
                    return Err(e);
                }
            }
        }
    }
}
