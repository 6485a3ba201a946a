// Shared helpers for integration tests
#![allow(dead_code)]

use std::sync::Once;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;

use snaptext::config::{Config, Environment, OcrConfig, ServerConfig};

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// PNG signature followed by padding, enough for MIME sniffing.
pub const PNG_BASE64: &str = "iVBORw0KGgoAAAAA";

/// Config pointing the OCR provider at a mock upstream.
pub fn test_config(model: &str, base_url: String) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: Environment::Development,
            cors_origins: Vec::new(),
            max_body_bytes: 1024 * 1024,
        },
        ocr: OcrConfig {
            model: model.to_string(),
            api_key: Some("test-key".to_string()),
            base_url: Some(base_url),
            timeout_secs: 5,
            retry_base_delay_ms: 10,
            ..OcrConfig::default()
        },
    }
}

pub fn post_ocr(image: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/ocr")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::json!({ "image": image }).to_string()))
        .unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
