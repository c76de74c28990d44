use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures talking to the ticketing service.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} responded with {status}: {body}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    /// Whether another attempt may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Transport { source, .. } => {
                source.is_timeout() || source.is_connect() || source.is_request()
            }
            ApiError::Status { status, .. } => {
                *status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            ApiError::Decode { .. } => false,
        }
    }
}

/// Fatal errors that end a run. Each maps to its own process exit status.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("invalid date {value:?}: expected yyyy-MM-dd")]
    InvalidDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("start date {start} is after end date {end}")]
    InvertedRange { start: String, end: String },
    #[error("cannot build ticketing client: {0}")]
    ClientBuild(String),
    #[error("cannot write output file {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl ReportError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ReportError::ClientBuild(_) => 1,
            ReportError::Api(_) => 3,
            ReportError::Output { .. } => 4,
            ReportError::InvalidDate { .. } | ReportError::InvertedRange { .. } => 6,
        }
    }
}

pub type ReportResult<T> = Result<T, ReportError>;
