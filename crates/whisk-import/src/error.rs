//! Error types for the import pipeline.

use thiserror::Error;

/// Failure to set up the page fetcher.
///
/// Fetch attempts themselves never fail; they report a blocked outcome.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to create HTTP client: {0}")]
    Client(String),

    #[error("Invalid fetch configuration: {0}")]
    Config(String),
}

/// Failure of a single normalization attempt.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// Input text below the minimum length.
    #[error("Insufficient content to parse recipe")]
    InsufficientContent,

    /// The model reply had no parseable JSON object.
    #[error("AI returned invalid JSON format")]
    InvalidJson,

    /// The generation backend call failed.
    #[error("{0}")]
    Generation(String),
}

/// Terminal import failures surfaced to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// The page could not be fetched or looked like a bot challenge.
    #[error("{reason}")]
    Blocked { reason: String },

    /// No usable recipe content could be extracted.
    #[error("{details}")]
    ExtractionFailed { details: String },

    /// The assembled recipe failed the validation gate.
    #[error("{}", .0.join(", "))]
    Validation(Vec<String>),
}

impl ImportError {
    pub fn extraction_failed(details: impl Into<String>) -> Self {
        Self::ExtractionFailed {
            details: details.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_error_messages() {
        assert_eq!(
            NormalizeError::InsufficientContent.to_string(),
            "Insufficient content to parse recipe"
        );
        assert_eq!(
            NormalizeError::InvalidJson.to_string(),
            "AI returned invalid JSON format"
        );
    }

    #[test]
    fn test_validation_display_joins_messages() {
        let err = ImportError::Validation(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(err.to_string(), "a, b");
    }
}
