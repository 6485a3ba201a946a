pub(crate) mod fallback;
pub(crate) mod health;
pub(crate) mod info;
pub(crate) mod ocr;

pub use fallback::not_found;
pub use health::health_check;
pub use info::service_info;
pub use ocr::extract_text;
