use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::routes::AVAILABLE_ENDPOINTS;
use crate::api::state::AppState;

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub environment: String,
    /// Upstream provider/model, e.g. `gemini/gemini-1.5-flash`.
    pub provider: String,
    pub endpoints: Vec<String>,
}

/// `GET /`
#[utoipa::path(
    get,
    path = "/",
    tag = "meta",
    responses(
        (status = 200, description = "Service metadata and endpoint listing", body = ServiceInfo),
    )
)]
pub async fn service_info(State(state): State<AppState>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: env!("CARGO_PKG_DESCRIPTION").to_string(),
        environment: state.config.server.environment.to_string(),
        provider: state.ocr.name().to_string(),
        endpoints: AVAILABLE_ENDPOINTS.iter().map(|e| e.to_string()).collect(),
    })
}
