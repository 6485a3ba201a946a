use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use super::retry::RetryExhausted;
use super::upstream::UpstreamError;

/// Marker the model is instructed to return when an image contains no text.
pub const NO_TEXT_SENTINEL: &str = "NO_TEXT_DETECTED";

/// Upstream error annotated with the number of attempts consumed.
pub type UpstreamFailure = RetryExhausted<UpstreamError>;

/// Result of one OCR request, from validation through the upstream call.
#[derive(Debug, Clone)]
pub enum ExtractionOutcome {
    Success(String),
    NoTextFound,
    ValidationError(String),
    /// Retryable upstream failure that outlasted every attempt.
    TransientFailure(UpstreamFailure),
    /// Non-retryable upstream failure.
    FatalFailure(UpstreamFailure),
}

impl ExtractionOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ExtractionOutcome::Success(_) => "success",
            ExtractionOutcome::NoTextFound => "no_text_found",
            ExtractionOutcome::ValidationError(_) => "validation_error",
            ExtractionOutcome::TransientFailure(_) => "transient_failure",
            ExtractionOutcome::FatalFailure(_) => "fatal_failure",
        }
    }

    pub fn from_failure(failure: UpstreamFailure) -> Self {
        if failure.error.retryable {
            ExtractionOutcome::TransientFailure(failure)
        } else {
            ExtractionOutcome::FatalFailure(failure)
        }
    }
}

/// How the sentinel is handled in model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentinelMode {
    /// Remove every sentinel occurrence, even inside other text.
    #[default]
    Strip,
    /// Only a response that is exactly the sentinel means "no text".
    Exact,
}

impl FromStr for SentinelMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strip" => Ok(SentinelMode::Strip),
            "exact" => Ok(SentinelMode::Exact),
            other => Err(format!(
                "unknown sentinel mode '{other}', expected 'strip' or 'exact'"
            )),
        }
    }
}

impl fmt::Display for SentinelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentinelMode::Strip => write!(f, "strip"),
            SentinelMode::Exact => write!(f, "exact"),
        }
    }
}

/// Turn raw model output into `Success` or `NoTextFound`.
pub fn normalize_text(raw: &str, mode: SentinelMode) -> ExtractionOutcome {
    let text = match mode {
        SentinelMode::Strip => raw.replace(NO_TEXT_SENTINEL, "").trim().to_string(),
        SentinelMode::Exact => {
            let trimmed = raw.trim();
            if trimmed == NO_TEXT_SENTINEL {
                String::new()
            } else {
                trimmed.to_string()
            }
        }
    };

    if text.is_empty() {
        ExtractionOutcome::NoTextFound
    } else {
        ExtractionOutcome::Success(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn success_text(outcome: ExtractionOutcome) -> String {
        match outcome {
            ExtractionOutcome::Success(text) => text,
            other => panic!("expected success, got {}", other.label()),
        }
    }

    #[test]
    fn test_sentinel_only_is_no_text_in_both_modes() {
        for mode in [SentinelMode::Strip, SentinelMode::Exact] {
            assert!(matches!(
                normalize_text("NO_TEXT_DETECTED", mode),
                ExtractionOutcome::NoTextFound
            ));
            assert!(matches!(
                normalize_text("  NO_TEXT_DETECTED\n", mode),
                ExtractionOutcome::NoTextFound
            ));
        }
    }

    #[test]
    fn test_empty_output_is_no_text() {
        assert!(matches!(
            normalize_text("   \n\t", SentinelMode::Strip),
            ExtractionOutcome::NoTextFound
        ));
        assert!(matches!(
            normalize_text("", SentinelMode::Exact),
            ExtractionOutcome::NoTextFound
        ));
    }

    #[test]
    fn test_strip_mode_removes_embedded_sentinel() {
        let text = success_text(normalize_text(
            "Hello NO_TEXT_DETECTED World",
            SentinelMode::Strip,
        ));
        assert_eq!(text, "Hello  World");
    }

    #[test]
    fn test_strip_mode_repeated_sentinel_is_no_text() {
        assert!(matches!(
            normalize_text("NO_TEXT_DETECTED NO_TEXT_DETECTED", SentinelMode::Strip),
            ExtractionOutcome::NoTextFound
        ));
    }

    #[test]
    fn test_exact_mode_keeps_embedded_sentinel() {
        let text = success_text(normalize_text(
            "Hello NO_TEXT_DETECTED World",
            SentinelMode::Exact,
        ));
        assert_eq!(text, "Hello NO_TEXT_DETECTED World");
    }

    #[test]
    fn test_success_is_trimmed() {
        let text = success_text(normalize_text("\n  Total: $42.00 \n", SentinelMode::Strip));
        assert_eq!(text, "Total: $42.00");
    }

    #[test]
    fn test_failure_classification_follows_retryable_flag() {
        let transient = RetryExhausted {
            error: UpstreamError::transport("connection reset"),
            attempts: 3,
        };
        assert!(matches!(
            ExtractionOutcome::from_failure(transient),
            ExtractionOutcome::TransientFailure(_)
        ));

        let fatal = RetryExhausted {
            error: UpstreamError::from_status(400, "bad request"),
            attempts: 1,
        };
        assert!(matches!(
            ExtractionOutcome::from_failure(fatal),
            ExtractionOutcome::FatalFailure(_)
        ));
    }

    #[test]
    fn test_sentinel_mode_parsing() {
        assert_eq!("STRIP".parse::<SentinelMode>().unwrap(), SentinelMode::Strip);
        assert_eq!(" exact ".parse::<SentinelMode>().unwrap(), SentinelMode::Exact);
        assert!("sometimes".parse::<SentinelMode>().is_err());
    }
}
