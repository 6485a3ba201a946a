use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SnaptextError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),
}

impl SnaptextError {
    pub fn status(&self) -> StatusCode {
        match self {
            SnaptextError::Validation(_) => StatusCode::BAD_REQUEST,
            SnaptextError::NotFound(_) => StatusCode::NOT_FOUND,
            SnaptextError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            SnaptextError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for SnaptextError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            SnaptextError::Validation(details) => json!({
                "error": "Invalid request",
                "details": details,
            }),
            SnaptextError::NotFound(msg) => json!({ "error": msg }),
            SnaptextError::PayloadTooLarge(details) => json!({
                "error": "Payload too large",
                "details": details,
            }),
            SnaptextError::Config(_) => {
                tracing::error!(error = %self, "Configuration error mapped to response");
                json!({ "error": "Internal server error" })
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, SnaptextError>;
