//! Error types for the rest client and its assembly layer.

use bytes::Bytes;
use http::StatusCode;
use thiserror::Error;

use crate::converter::PayloadKind;

pub type Result<T> = std::result::Result<T, RestClientError>;

#[derive(Debug, Error)]
pub enum RestClientError {
    /// A required builder input or target client was absent
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Unsupported URL scheme for {transport} transport: {scheme}")]
    UnsupportedScheme {
        transport: &'static str,
        scheme: String,
    },

    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("No converter can {action} {kind:?} with content type {content_type:?}")]
    NoConverter {
        action: &'static str,
        kind: PayloadKind,
        content_type: Option<String>,
    },

    #[error("Conversion failed: {0}")]
    Conversion(String),

    #[error("Client error {status}")]
    HttpClientError { status: StatusCode, body: Bytes },

    #[error("Server error {status}")]
    HttpServerError { status: StatusCode, body: Bytes },

    /// A mock expectation was violated
    #[error("Assertion failed: {0}")]
    Assertion(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] http::Error),

    #[error(transparent)]
    Hyper(#[from] hyper::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "reqwest")]
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
}

impl RestClientError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        RestClientError::InvalidArgument(message.into())
    }

    /// Status code of an HTTP error response, if this error carries one
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RestClientError::HttpClientError { status, .. }
            | RestClientError::HttpServerError { status, .. } => Some(*status),
            _ => None,
        }
    }
}
