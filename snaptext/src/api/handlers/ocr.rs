use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::api::response::{ErrorBody, OcrResponse, OcrSuccessBody, UpstreamFailureBody};
use crate::api::state::AppState;
use crate::error::SnaptextError;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, utoipa::ToSchema)]
pub struct ImageRequest {
    /// Base64 image, bare or as `data:image/<type>;base64,<data>`.
    #[serde(default)]
    #[validate(length(min = 1, message = "Image is required"))]
    pub image: String,
}

/// First human-readable message out of a validator error set.
fn validation_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|err| err.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| errors.to_string())
}

/// `POST /api/ocr`
#[utoipa::path(
    post,
    path = "/api/ocr",
    tag = "ocr",
    request_body = ImageRequest,
    responses(
        (status = 200, description = "Text extracted", body = OcrSuccessBody),
        (status = 400, description = "Missing or malformed image", body = ErrorBody),
        (status = 404, description = "No text detected in the image", body = ErrorBody),
        (status = 413, description = "Request body too large", body = ErrorBody),
        (status = 500, description = "Upstream failure; upstream 4xx/5xx statuses are propagated", body = UpstreamFailureBody),
    )
)]
pub async fn extract_text(
    State(state): State<AppState>,
    payload: Result<Json<ImageRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return SnaptextError::PayloadTooLarge(rejection.body_text()).into_response();
        }
        Err(rejection) => {
            return SnaptextError::Validation(rejection.body_text()).into_response();
        }
    };

    if let Err(errors) = request.validate() {
        return SnaptextError::Validation(validation_message(&errors)).into_response();
    }

    let outcome = state.ocr.process(&request.image).await;
    OcrResponse::new(outcome, state.config.server.environment).into_response()
}
