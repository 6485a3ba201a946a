use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{Environment, ServerConfig};

use super::handlers;
use super::openapi;
use super::AppState;

/// Every route the router serves, as listed by `GET /` and the 404 fallback.
pub const AVAILABLE_ENDPOINTS: &[&str] = &[
    "GET /",
    "GET /health",
    "POST /api/ocr",
    "GET /openapi.json",
    "GET /docs",
];

/// Development accepts any origin. Production only accepts `cors_origins`.
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    match server.environment {
        Environment::Development => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        Environment::Production => {
            let origins: Vec<HeaderValue> = server
                .cors_origins
                .iter()
                .filter(|origin| origin.as_str() != "*")
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(e) => {
                        tracing::warn!("Ignoring invalid CORS origin '{}': {}", origin, e);
                        None
                    }
                })
                .collect();

            if origins.is_empty() {
                tracing::warn!("CORS_ORIGINS is empty in production; cross-origin requests will be refused");
            }

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE])
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server);
    let body_limit = DefaultBodyLimit::max(state.config.server.max_body_bytes);

    Router::new()
        .route("/", get(handlers::service_info))
        .route("/health", get(handlers::health_check))
        .route("/api/ocr", post(handlers::extract_text))
        .route("/openapi.json", get(openapi::openapi_json))
        .merge(openapi::redoc_router())
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::not_found)
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
