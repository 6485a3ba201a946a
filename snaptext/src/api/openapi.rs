use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::handlers;
use super::response;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Snaptext API",
        version = "1.0.0",
        description = "Extract text from base64-encoded images through a generative vision API.",
    ),
    paths(
        handlers::info::service_info,
        handlers::health::health_check,
        handlers::ocr::extract_text,
    ),
    components(schemas(
        handlers::ocr::ImageRequest,
        handlers::health::HealthData,
        handlers::info::ServiceInfo,
        handlers::fallback::NotFoundBody,
        response::OcrSuccessBody,
        response::ErrorBody,
        response::UpstreamFailureBody,
    )),
    tags(
        (name = "meta", description = "Service metadata"),
        (name = "health", description = "Health check"),
        (name = "ocr", description = "Image text extraction"),
    ),
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
