use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::OcrConfig;
use crate::error::{Result, SnaptextError};

use super::upstream::{TextExtractor, UpstreamError};
use super::validation::ImagePayload;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Gemini finish reasons that mean the output was withheld, not that the
/// image was empty.
const BLOCKING_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "RECITATION",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
    "IMAGE_SAFETY",
];

fn build_http_client(config: &OcrConfig) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| SnaptextError::Config(format!("Failed to create HTTP client: {e}")))
}

fn require_api_key(config: &OcrConfig, provider: &str) -> Result<String> {
    config
        .api_key
        .clone()
        .filter(|key| !key.is_empty())
        .ok_or_else(|| SnaptextError::Config(format!("API key required for {provider} OCR")))
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Best human-readable message from an error body. Both Gemini and
/// OpenAI-compatible APIs use `{"error": {"message": ...}}`.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().chars().take(500).collect(),
    }
}

/// Send a prepared request once and return the success body.
async fn execute(request: RequestBuilder) -> std::result::Result<String, UpstreamError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        Ok(body)
    } else {
        Err(UpstreamError::from_status(
            status.as_u16(),
            format!("API request failed: {status} - {}", error_message(&body)),
        ))
    }
}

fn parse_body<T: for<'de> Deserialize<'de>>(body: &str) -> std::result::Result<T, UpstreamError> {
    serde_json::from_str(body)
        .map_err(|e| UpstreamError::invalid(format!("Failed to parse response: {e}")))
}

// ---------------------------------------------------------------------------
// Gemini generateContent
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct GeminiOcrClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    name: String,
    max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Blob {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    fn into_text(self) -> std::result::Result<String, UpstreamError> {
        if self.candidates.is_empty() {
            if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
                return Err(UpstreamError::invalid(format!("Request blocked: {reason}")));
            }
        }

        let Some(candidate) = self.candidates.into_iter().next() else {
            return Ok(String::new());
        };

        let text: String = candidate
            .content
            .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
            .unwrap_or_default();

        match candidate.finish_reason.as_deref() {
            Some(reason) if text.is_empty() && BLOCKING_FINISH_REASONS.contains(&reason) => Err(
                UpstreamError::invalid(format!("Response withheld by upstream: {reason}")),
            ),
            _ => Ok(text),
        }
    }
}

impl GeminiOcrClient {
    pub fn new(config: &OcrConfig, model: &str) -> Result<Self> {
        let api_key = require_api_key(config, "Gemini")?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| GEMINI_BASE_URL.to_string());

        Ok(Self {
            client: build_http_client(config)?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            name: format!("gemini/{model}"),
            max_output_tokens: config.max_output_tokens,
        })
    }
}

#[async_trait]
impl TextExtractor for GeminiOcrClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn extract_raw(
        &self,
        image: &ImagePayload,
        prompt: &str,
    ) -> std::result::Result<String, UpstreamError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: prompt.to_string(),
                    },
                    Part::InlineData {
                        inline_data: Blob {
                            mime_type: image.mime_type.clone(),
                            data: image.data.clone(),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                max_output_tokens: self.max_output_tokens,
            },
        };

        let body = execute(
            self.client
                .post(format!(
                    "{}/models/{}:generateContent",
                    self.base_url, self.model
                ))
                .header("x-goog-api-key", &self.api_key)
                .json(&request),
        )
        .await?;

        parse_body::<GenerateContentResponse>(&body)?.into_text()
    }
}

// ---------------------------------------------------------------------------
// OpenAI-compatible chat/completions with image_url parts
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct OpenAiVisionClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    name: String,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

impl OpenAiVisionClient {
    pub fn new(config: &OcrConfig, model: &str) -> Result<Self> {
        let api_key = require_api_key(config, "OpenAI Vision")?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| OPENAI_BASE_URL.to_string());

        Ok(Self {
            client: build_http_client(config)?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            name: format!("openai/{model}"),
            max_tokens: config.max_output_tokens,
        })
    }
}

#[async_trait]
impl TextExtractor for OpenAiVisionClient {
    fn name(&self) -> &str {
        &self.name
    }

    async fn extract_raw(
        &self,
        image: &ImagePayload,
        prompt: &str,
    ) -> std::result::Result<String, UpstreamError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ContentPart::Text {
                        text: prompt.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image.data_uri(),
                        },
                    },
                ],
            }],
            max_tokens: self.max_tokens,
            temperature: 0.0,
        };

        let body = execute(
            self.client
                .post(format!("{}/chat/completions", self.base_url))
                .bearer_auth(&self.api_key)
                .json(&request),
        )
        .await?;

        let chat_response: ChatResponse = parse_body(&body)?;
        chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or_else(|| UpstreamError::invalid("No choices in API response"))
    }
}
