use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::ocr::OcrProvider;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub ocr: OcrProvider,
    /// Process start, for `/health` uptime.
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Config, ocr: OcrProvider) -> Self {
        Self {
            config: Arc::new(config),
            ocr,
            started_at: Instant::now(),
        }
    }
}
