//! Single-attempt HTTP GET
//!
//! The façade only sees the [`Fetcher`] trait so tests can stand in for the
//! network.

use crate::{FplError, Result};
use thiserror::Error;

/// Failure of one GET, before it is tagged with the cache key
#[derive(Debug, Error)]
pub enum FetchError {
    /// DNS, connect, timeout or send failure
    #[error("{0}")]
    Transport(String),

    /// Any response other than 200
    #[error("Status {status}, Reason {reason}")]
    Status { status: u16, reason: String },

    /// Anything else: malformed URL, body read failure
    #[error("{0}")]
    Other(String),
}

impl FetchError {
    /// Attach the cache key and URL, producing the caller-facing error
    pub fn tagged(self, cache_key: &str, url: &str) -> FplError {
        let cache_key = cache_key.to_string();
        let url = url.to_string();
        match self {
            FetchError::Transport(reason) => FplError::Network {
                cache_key,
                url,
                reason,
            },
            FetchError::Status { status, reason } => FplError::Api {
                cache_key,
                url,
                status,
                reason,
            },
            FetchError::Other(detail) => FplError::Unexpected {
                cache_key,
                url,
                detail,
            },
        }
    }
}

/// Source of raw response bodies
pub trait Fetcher {
    /// GET `url` once and return the body of a 200 response
    fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, FetchError>;
}

/// Blocking reqwest client
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Client with reqwest defaults and no extra headers
    pub fn new() -> Result<Self> {
        Self::with_user_agent(None)
    }

    pub fn with_user_agent(user_agent: Option<&str>) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(agent) = user_agent {
            builder = builder.user_agent(agent.to_string());
        }
        let client = builder
            .build()
            .map_err(|e| FplError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(HttpFetcher { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, FetchError> {
        log::info!("Fetching {}", url);

        let response = self.client.get(url).send().map_err(classify)?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(FetchError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response.bytes().map_err(classify)?;
        log::debug!("Received {} bytes from {}", body.len(), url);
        Ok(body.to_vec())
    }
}

/// Sort a reqwest error into the transport / other split
fn classify(e: reqwest::Error) -> FetchError {
    let detail = error_chain(&e);
    if e.is_connect() || e.is_timeout() || e.is_request() || e.is_builder() {
        FetchError::Transport(detail)
    } else {
        FetchError::Other(detail)
    }
}

/// Render an error with its sources, outermost first
fn error_chain(e: &(dyn std::error::Error + 'static)) -> String {
    let mut parts = vec![e.to_string()];
    let mut source = e.source();
    while let Some(inner) = source {
        parts.push(inner.to_string());
        source = inner.source();
    }
    parts.join(": ")
}
