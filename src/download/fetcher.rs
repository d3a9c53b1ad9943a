//! Document fetcher with transport-level retry
//!
//! Documents can be large and the remote service is slow, so requests use the
//! long download timeout and retry throttling, server errors and transport
//! failures with a linear backoff (`factor * attempt`).

use crate::config::{DownloadConfig, HttpConfig};
use crate::crawler::{
    build_http_client, describe_transport_error, is_retryable_status, UserAgentPool,
};
use async_trait::async_trait;
use reqwest::{header::USER_AGENT, Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Why a document could not be fetched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownloadError {
    #[error("HTTP {0}")]
    Status(u16),

    #[error("gave up after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },
}

/// Fetches document bodies
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, DownloadError>;
}

/// Retry schedule for one document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub backoff_factor: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &DownloadConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff_factor: Duration::from_millis(config.backoff_factor_ms),
        }
    }

    /// Pause before retry number `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_factor * attempt
    }
}

/// `DocumentFetcher` backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpDocumentFetcher {
    client: Client,
    agents: UserAgentPool,
    timeout: Duration,
    policy: RetryPolicy,
}

impl HttpDocumentFetcher {
    pub fn new(
        client: Client,
        agents: UserAgentPool,
        timeout: Duration,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            client,
            agents,
            timeout,
            policy,
        }
    }

    pub fn from_config(
        http: &HttpConfig,
        download: &DownloadConfig,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            build_http_client(http)?,
            UserAgentPool::new(http.user_agents.clone()),
            http.download_timeout(),
            RetryPolicy::from_config(download),
        ))
    }

    /// One request; `Ok(Err(reason))` means the attempt may be retried
    async fn attempt(&self, url: &str) -> Result<Result<Vec<u8>, String>, DownloadError> {
        let response = match self
            .client
            .get(url)
            .header(USER_AGENT, self.agents.pick())
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return Ok(Err(describe_transport_error(&e))),
        };

        let status = response.status();
        if status != StatusCode::OK {
            if is_retryable_status(status) {
                return Ok(Err(format!("HTTP {}", status.as_u16())));
            }
            return Err(DownloadError::Status(status.as_u16()));
        }

        Ok(match response.bytes().await {
            Ok(body) => Ok(body.to_vec()),
            Err(e) => Err(format!("Failed to read body: {}", describe_transport_error(&e))),
        })
    }
}

#[async_trait]
impl DocumentFetcher for HttpDocumentFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let last = match self.attempt(url).await? {
                Ok(body) => return Ok(body),
                Err(reason) => reason,
            };

            if attempt > self.policy.max_retries {
                return Err(DownloadError::RetriesExhausted {
                    attempts: attempt,
                    last,
                });
            }

            let delay = self.policy.backoff(attempt);
            tracing::debug!(
                "Download of {} failed ({}), retry {}/{} in {:?}",
                url,
                last,
                attempt,
                self.policy.max_retries,
                delay
            );
            tokio::time::sleep(delay).await;
        }
    }
}
