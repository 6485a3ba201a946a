mod handlers;
mod openapi;
mod response;
mod routes;
mod state;

pub use handlers::ocr::ImageRequest;
pub use response::{OcrResponse, OcrSuccessBody, UpstreamFailureBody};
pub use routes::{create_router, AVAILABLE_ENDPOINTS};
pub use state::AppState;
