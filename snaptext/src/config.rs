use serde::Deserialize;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Result, SnaptextError};
use crate::ocr::SentinelMode;

fn parse_env_or<T: FromStr>(var: &str, default: T) -> T
where
    T::Err: fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_opt<T: FromStr>(var: &str) -> Option<T>
where
    T::Err: fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Ignoring.", val, var, e);
                None
            }
        },
        Err(_) => None,
    }
}

/// Non-empty value of the first variable in `vars` that is set.
fn first_non_empty(vars: &[&str]) -> Option<String> {
    vars.iter()
        .filter_map(|var| env::var(var).ok())
        .map(|val| val.trim().to_string())
        .find(|val| !val.is_empty())
}

/// Parse `CORS_ORIGINS`: comma-separated origins, e.g. `https://app.example.com,https://admin.example.com`
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

/// Deployment mode. Controls the CORS allow-list and how much error detail is
/// returned to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "development" | "dev" | "test" => Ok(Environment::Development),
            other => Err(format!(
                "unknown environment '{other}', expected 'development' or 'production'"
            )),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub ocr: OcrConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    /// Origins allowed in production. Development allows any origin.
    pub cors_origins: Vec<String>,
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    /// Provider/model selection, e.g. "gemini/gemini-1.5-flash" or "openai/gpt-4o".
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub sentinel_mode: SentinelMode,
    pub require_data_uri: bool,
    pub max_output_tokens: u32,
}

impl OcrConfig {
    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            environment: Environment::Development,
            cors_origins: Vec::new(),
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model: "gemini/gemini-1.5-flash".to_string(),
            api_key: None,
            base_url: None,
            timeout_secs: 60,
            max_attempts: 3,
            retry_base_delay_ms: 1000,
            sentinel_mode: SentinelMode::Strip,
            require_data_uri: false,
            max_output_tokens: 4096,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_env_or("PORT", defaults.port),
            environment: parse_env_or("APP_ENV", defaults.environment),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or(defaults.cors_origins),
            max_body_bytes: parse_env_or("MAX_BODY_BYTES", defaults.max_body_bytes),
        }
    }
}

impl OcrConfig {
    /// Reads OCR settings from the environment. The API key is mandatory.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let api_key = first_non_empty(&["OCR_API_KEY", "GEMINI_API_KEY"]).ok_or_else(|| {
            SnaptextError::Config(
                "OCR_API_KEY (or GEMINI_API_KEY) must be set to reach the vision API".to_string(),
            )
        })?;

        Ok(Self {
            model: env::var("OCR_MODEL").unwrap_or(defaults.model),
            api_key: Some(api_key),
            base_url: parse_env_opt("OCR_BASE_URL"),
            timeout_secs: parse_env_or("OCR_TIMEOUT", defaults.timeout_secs),
            max_attempts: parse_env_or("OCR_MAX_ATTEMPTS", defaults.max_attempts),
            retry_base_delay_ms: parse_env_or(
                "OCR_RETRY_BASE_DELAY_MS",
                defaults.retry_base_delay_ms,
            ),
            sentinel_mode: parse_env_or("OCR_SENTINEL_MODE", defaults.sentinel_mode),
            require_data_uri: parse_env_or("OCR_REQUIRE_DATA_URI", defaults.require_data_uri),
            max_output_tokens: parse_env_or("OCR_MAX_OUTPUT_TOKENS", defaults.max_output_tokens),
        })
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            server: ServerConfig::from_env(),
            ocr: OcrConfig::from_env()?,
        })
    }
}

/// Known OCR providers.
pub const KNOWN_OCR_PROVIDERS: &[&str] = &["gemini", "openai"];

/// Parse an OCR model name into (provider, model) tuple.
pub fn parse_ocr_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_OCR_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    // Bare model names go to Gemini
    ("gemini", model)
}
