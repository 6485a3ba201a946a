use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{parse_ocr_provider_model, OcrConfig};
use crate::error::{Result, SnaptextError};

use super::api::{GeminiOcrClient, OpenAiVisionClient};
use super::outcome::{normalize_text, ExtractionOutcome, SentinelMode};
use super::prompts::EXTRACTION_PROMPT;
use super::retry::{with_retry, RetryPolicy};
use super::upstream::TextExtractor;
use super::validation::{parse_image, ImagePayload, ValidationOptions};

/// Request-scoped OCR pipeline: validate, call upstream with retries,
/// normalize the model output. Cheap to clone.
#[derive(Clone)]
pub struct OcrProvider {
    extractor: Arc<dyn TextExtractor>,
    retry: RetryPolicy,
    sentinel_mode: SentinelMode,
    validation: ValidationOptions,
}

impl OcrProvider {
    pub fn new(config: &OcrConfig) -> Result<Self> {
        let (provider, model) = parse_ocr_provider_model(&config.model);

        let extractor: Arc<dyn TextExtractor> = match provider.to_lowercase().as_str() {
            "openai" => Arc::new(OpenAiVisionClient::new(config, model)?),
            "gemini" => Arc::new(GeminiOcrClient::new(config, model)?),
            other => {
                return Err(SnaptextError::Config(format!(
                    "Unsupported OCR provider '{other}'"
                )))
            }
        };

        info!(
            provider = extractor.name(),
            max_attempts = config.max_attempts,
            sentinel_mode = %config.sentinel_mode,
            "OCR provider initialized"
        );

        Ok(Self::with_extractor(extractor, config))
    }

    /// Build around an existing extractor, taking retry, sentinel and
    /// validation settings from `config`.
    pub fn with_extractor(extractor: Arc<dyn TextExtractor>, config: &OcrConfig) -> Self {
        Self {
            extractor,
            retry: RetryPolicy::new(config.max_attempts, config.retry_base_delay()),
            sentinel_mode: config.sentinel_mode,
            validation: ValidationOptions {
                require_data_uri: config.require_data_uri,
            },
        }
    }

    pub fn name(&self) -> &str {
        self.extractor.name()
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Full pipeline for a raw request payload.
    pub async fn process(&self, payload: &str) -> ExtractionOutcome {
        match parse_image(payload, self.validation) {
            Ok(image) => self.extract_text(&image).await,
            Err(reason) => ExtractionOutcome::ValidationError(reason.to_string()),
        }
    }

    pub async fn extract_text(&self, image: &ImagePayload) -> ExtractionOutcome {
        let result = with_retry(&self.retry, |_attempt| {
            self.extractor.extract_raw(image, EXTRACTION_PROMPT)
        })
        .await;

        let outcome = match result {
            Ok(retried) => normalize_text(&retried.value, self.sentinel_mode),
            Err(failure) => {
                warn!(
                    provider = self.name(),
                    attempts = failure.attempts,
                    status = ?failure.error.status,
                    retryable = failure.error.retryable,
                    error = %failure.error,
                    "OCR request failed"
                );
                ExtractionOutcome::from_failure(failure)
            }
        };

        if let ExtractionOutcome::Success(text) = &outcome {
            info!(provider = self.name(), chars = text.chars().count(), "Text extracted");
        } else {
            info!(provider = self.name(), outcome = outcome.label(), "OCR finished");
        }

        outcome
    }
}
