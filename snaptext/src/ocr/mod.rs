//! OCR (Optical Character Recognition) Module
//!
//! Text extraction is delegated to a generative vision API. This module owns
//! everything around that single call.
//!
//! # Architecture
//!
//! - `validation`: structural base64 / data-URI checks, run before any
//!   network traffic
//! - `TextExtractor` trait: exactly one upstream call per invocation
//! - `GeminiOcrClient` / `OpenAiVisionClient`: the HTTP implementations
//! - `retry`: bounded linear backoff around the extractor
//! - `outcome`: sentinel handling and the per-request `ExtractionOutcome`
//! - `OcrProvider`: wires the above together from `OcrConfig`
//!
//! # Usage
//!
//! ```rust,ignore
//! let ocr = OcrProvider::new(&config.ocr)?;
//! match ocr.process(&request.image).await {
//!     ExtractionOutcome::Success(text) => println!("{text}"),
//!     other => eprintln!("{}", other.label()),
//! }
//! ```

mod api;
mod outcome;
mod prompts;
mod provider;
mod retry;
mod upstream;
mod validation;

pub use api::{GeminiOcrClient, OpenAiVisionClient};
pub use outcome::{
    normalize_text, ExtractionOutcome, SentinelMode, UpstreamFailure, NO_TEXT_SENTINEL,
};
pub use prompts::EXTRACTION_PROMPT;
pub use provider::OcrProvider;
pub use retry::{with_retry, LinearBackoff, Retried, RetryExhausted, RetryPolicy, Retryable};
pub use upstream::{TextExtractor, UpstreamError, UpstreamErrorKind};
pub use validation::{parse_image, validate, ImagePayload, InvalidImage, ValidationOptions};
