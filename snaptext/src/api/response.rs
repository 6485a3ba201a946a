//! # Response normalization
//!
//! Maps an [`ExtractionOutcome`] onto the outward HTTP contract:
//!
//! | Outcome                  | Status                          | Body                                   |
//! |--------------------------|---------------------------------|----------------------------------------|
//! | `Success`                | 200                             | `{success, text, timestamp}`           |
//! | `NoTextFound`            | 404                             | `{error}`                              |
//! | `ValidationError`        | 400                             | `{error, details}`                     |
//! | `Transient`/`FatalFailure` | upstream 4xx/5xx, otherwise 500 | `{error, details, attempts, retryable}` |
//!
//! Failure bodies carry a `debug` field outside production.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::Environment;
use crate::error::SnaptextError;
use crate::ocr::{ExtractionOutcome, UpstreamFailure};

pub const NO_TEXT_MESSAGE: &str = "No text found in image";
pub const UPSTREAM_FAILURE_MESSAGE: &str = "Failed to process image";

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct OcrSuccessBody {
    pub success: bool,
    pub text: String,
    /// RFC 3339 time the response was produced.
    pub timestamp: String,
}

/// `{error}` or `{error, details}` error body.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UpstreamFailureBody {
    pub error: String,
    pub details: String,
    /// Upstream calls made before giving up.
    pub attempts: u32,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<String>,
}

pub struct OcrResponse {
    outcome: ExtractionOutcome,
    expose_debug: bool,
}

impl OcrResponse {
    pub fn new(outcome: ExtractionOutcome, environment: Environment) -> Self {
        Self {
            outcome,
            expose_debug: !environment.is_production(),
        }
    }
}

fn upstream_failure_response(failure: UpstreamFailure, expose_debug: bool) -> Response {
    let status = failure.error.propagated_status();
    let body = UpstreamFailureBody {
        error: UPSTREAM_FAILURE_MESSAGE.to_string(),
        details: failure.error.message.clone(),
        attempts: failure.attempts,
        retryable: failure.error.retryable,
        debug: expose_debug.then(|| format!("{:?}", failure.error)),
    };

    (status, Json(body)).into_response()
}

impl IntoResponse for OcrResponse {
    fn into_response(self) -> Response {
        match self.outcome {
            ExtractionOutcome::Success(text) => Json(OcrSuccessBody {
                success: true,
                text,
                timestamp: Utc::now().to_rfc3339(),
            })
            .into_response(),
            ExtractionOutcome::NoTextFound => {
                SnaptextError::NotFound(NO_TEXT_MESSAGE.to_string()).into_response()
            }
            ExtractionOutcome::ValidationError(reason) => {
                SnaptextError::Validation(reason).into_response()
            }
            ExtractionOutcome::TransientFailure(failure)
            | ExtractionOutcome::FatalFailure(failure) => {
                upstream_failure_response(failure, self.expose_debug)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::{RetryExhausted, UpstreamError};
    use axum::http::StatusCode;

    async fn render(outcome: ExtractionOutcome, environment: Environment) -> (StatusCode, serde_json::Value) {
        let response = OcrResponse::new(outcome, environment).into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_success_has_flag_text_and_timestamp() {
        let (status, json) = render(
            ExtractionOutcome::Success("Total: $42.00".into()),
            Environment::Production,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["text"], "Total: $42.00");
        let timestamp = json["timestamp"].as_str().expect("timestamp string");
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }

    #[tokio::test]
    async fn test_no_text_is_404() {
        let (status, json) = render(ExtractionOutcome::NoTextFound, Environment::Development).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], NO_TEXT_MESSAGE);
    }

    #[tokio::test]
    async fn test_validation_error_is_400_with_details() {
        let (status, json) = render(
            ExtractionOutcome::ValidationError("Invalid base64 format".into()),
            Environment::Development,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["details"], "Invalid base64 format");
    }

    #[tokio::test]
    async fn test_fatal_failure_propagates_upstream_status() {
        let failure = RetryExhausted {
            error: UpstreamError::from_status(403, "API key not valid"),
            attempts: 1,
        };
        let (status, json) =
            render(ExtractionOutcome::FatalFailure(failure), Environment::Development).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["error"], UPSTREAM_FAILURE_MESSAGE);
        assert_eq!(json["details"], "API key not valid");
        assert_eq!(json["attempts"], 1);
        assert_eq!(json["retryable"], false);
        assert!(json["debug"].is_string());
    }

    #[tokio::test]
    async fn test_exhausted_transport_failure_is_500_without_debug_in_production() {
        let failure = RetryExhausted {
            error: UpstreamError::transport("connection refused"),
            attempts: 3,
        };
        let (status, json) =
            render(ExtractionOutcome::TransientFailure(failure), Environment::Production).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["attempts"], 3);
        assert_eq!(json["retryable"], true);
        assert!(json.get("debug").is_none());
    }
}
