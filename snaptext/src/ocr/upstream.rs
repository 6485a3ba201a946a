use async_trait::async_trait;
use axum::http::StatusCode;
use thiserror::Error;

use super::retry::Retryable;
use super::validation::ImagePayload;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamErrorKind {
    /// No response was received: connect failure, timeout, reset.
    Transport,
    /// The API answered with a non-success status.
    Status,
    /// The exchange itself was invalid: unparseable body, blocked prompt,
    /// request that could not be built.
    Invalid,
}

/// Failure of a single upstream call. `retryable` is decided when the error
/// is constructed and never re-derived afterwards.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct UpstreamError {
    pub kind: UpstreamErrorKind,
    pub status: Option<u16>,
    pub message: String,
    pub retryable: bool,
}

impl UpstreamError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: UpstreamErrorKind::Transport,
            status: None,
            message: message.into(),
            retryable: true,
        }
    }

    /// Server-side statuses (>= 500) are retryable, everything else is not.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: UpstreamErrorKind::Status,
            status: Some(status),
            message: message.into(),
            retryable: status >= 500,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            kind: UpstreamErrorKind::Invalid,
            status: None,
            message: message.into(),
            retryable: false,
        }
    }

    /// Status to surface to our own caller: the upstream status when it is an
    /// error status, otherwise 500.
    pub fn propagated_status(&self) -> StatusCode {
        self.status
            .filter(|code| (400..=599).contains(code))
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl Retryable for UpstreamError {
    fn is_retryable(&self) -> bool {
        self.retryable
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            UpstreamError::from_status(status.as_u16(), error.to_string())
        } else if error.is_builder() || error.is_decode() {
            UpstreamError::invalid(error.to_string())
        } else {
            UpstreamError::transport(error.to_string())
        }
    }
}

/// One call to a text-extraction API. Implementations must not retry.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Provider/model label, e.g. `gemini/gemini-1.5-flash`.
    fn name(&self) -> &str;

    async fn extract_raw(
        &self,
        image: &ImagePayload,
        prompt: &str,
    ) -> Result<String, UpstreamError>;
}
