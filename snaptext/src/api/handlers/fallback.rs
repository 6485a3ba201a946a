use axum::{http::StatusCode, Json};
use serde::Serialize;

use crate::api::routes::AVAILABLE_ENDPOINTS;

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotFoundBody {
    pub error: String,
    pub available_endpoints: Vec<String>,
}

/// Fallback for unmatched routes.
pub async fn not_found() -> (StatusCode, Json<NotFoundBody>) {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundBody {
            error: "Endpoint not found".to_string(),
            available_endpoints: AVAILABLE_ENDPOINTS.iter().map(|e| e.to_string()).collect(),
        }),
    )
}
