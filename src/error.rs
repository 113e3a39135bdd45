use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Failure taxonomy for the Jira REST endpoints.
///
/// Only `Transient` is retryable; everything else surfaces immediately.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("authentication rejected (HTTP {status})")]
    Auth { status: StatusCode },

    #[error("transient server error (HTTP {status})")]
    Transient {
        status: StatusCode,
        retry_after: Option<Duration>,
    },

    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response (HTTP {status}): {body}")]
    Fatal { status: StatusCode, body: String },

    #[error("retries exhausted after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<FetchError>,
    },
}

impl FetchError {
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Transient { .. })
    }

    /// Server-supplied backoff override, if the response carried one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            FetchError::Transient { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum LeadtimeError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

pub type LeadtimeResult<T> = Result<T, LeadtimeError>;
