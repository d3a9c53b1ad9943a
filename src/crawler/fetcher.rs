//! HTTP fetcher implementation
//!
//! This module handles every listing and detail page request, including:
//! - Building the HTTP client
//! - Rotating the User-Agent header per request
//! - Classifying responses into success, retryable and fatal results

use crate::config::HttpConfig;
use async_trait::async_trait;
use rand::Rng;
use reqwest::{header::USER_AGENT, Client, StatusCode};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Result of a page fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    /// HTTP 200 with the page body
    Ok(String),

    /// Worth retrying later: throttling, server errors, transport failures
    Retryable(RetryCause),

    /// Any other status; the page will not be retried
    Fatal(u16),
}

/// Why a fetch is considered retryable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryCause {
    Status(u16),
    Transport(String),
}

impl fmt::Display for RetryCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "HTTP {}", code),
            Self::Transport(error) => write!(f, "{}", error),
        }
    }
}

/// Statuses that signal a temporary condition on the remote side
pub fn is_retryable_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504)
}

/// Maps a status to a fetch classification; `None` means success
pub fn classify_status(status: StatusCode) -> Option<FetchResult> {
    if status == StatusCode::OK {
        None
    } else if is_retryable_status(status) {
        Some(FetchResult::Retryable(RetryCause::Status(status.as_u16())))
    } else {
        Some(FetchResult::Fatal(status.as_u16()))
    }
}

/// Short description of a transport-level reqwest error
pub fn describe_transport_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else {
        error.to_string()
    }
}

/// Issues page requests
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url`, giving up on the request after `timeout`
    async fn fetch(&self, url: &str, timeout: Duration) -> FetchResult;
}

/// Read-only pool of User-Agent strings, sampled per request
#[derive(Debug, Clone)]
pub struct UserAgentPool {
    agents: Arc<[String]>,
}

impl UserAgentPool {
    pub fn new(agents: Vec<String>) -> Self {
        Self {
            agents: agents.into(),
        }
    }

    /// Picks one identity at random
    pub fn pick(&self) -> &str {
        match self.agents.len() {
            0 => "",
            1 => &self.agents[0],
            len => &self.agents[rand::rng().random_range(0..len)],
        }
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

/// Builds an HTTP client with proper configuration
///
/// No default User-Agent is set; every request carries one from the pool.
/// Per-request timeouts are applied by the callers, since page and
/// document requests use very different limits.
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(config.connect_timeout())
        .gzip(true)
        .brotli(true)
        .build()
}

/// `PageFetcher` backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    agents: UserAgentPool,
}

impl HttpFetcher {
    pub fn new(client: Client, agents: UserAgentPool) -> Self {
        Self { client, agents }
    }

    pub fn from_config(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            build_http_client(config)?,
            UserAgentPool::new(config.user_agents.clone()),
        ))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> FetchResult {
        let request = self
            .client
            .get(url)
            .header(USER_AGENT, self.agents.pick())
            .timeout(timeout);

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                return FetchResult::Retryable(RetryCause::Transport(describe_transport_error(
                    &e,
                )))
            }
        };

        if let Some(failure) = classify_status(response.status()) {
            return failure;
        }

        match response.text().await {
            Ok(body) => FetchResult::Ok(body),
            Err(e) => FetchResult::Retryable(RetryCause::Transport(format!(
                "Failed to read body: {}",
                describe_transport_error(&e)
            ))),
        }
    }
}
