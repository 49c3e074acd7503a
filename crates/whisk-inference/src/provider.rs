//! Backend selection from configuration.

use std::str::FromStr;
use std::sync::Arc;

use tracing::info;
use whisk_core::{Error, GenerationBackend, Result};

/// Which text-completion service to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InferenceProvider {
    /// Local Ollama server.
    Ollama,
    /// Any OpenAI-compatible `/chat/completions` endpoint.
    #[default]
    OpenAi,
}

impl InferenceProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
            Self::OpenAi => "openai",
        }
    }

    /// Read `INFERENCE_PROVIDER`, defaulting to OpenAI-compatible.
    pub fn from_env() -> Result<Self> {
        match std::env::var("INFERENCE_PROVIDER") {
            Ok(value) if !value.trim().is_empty() => value.parse(),
            _ => Ok(Self::default()),
        }
    }
}

impl FromStr for InferenceProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "openai" | "gemini" => Ok(Self::OpenAi),
            other => Err(Error::Config(format!(
                "Unknown INFERENCE_PROVIDER '{}' (expected 'ollama' or 'openai')",
                other
            ))),
        }
    }
}

/// Build the configured backend from environment variables.
pub fn backend_from_env(provider: InferenceProvider) -> Result<Arc<dyn GenerationBackend>> {
    info!(
        subsystem = "inference",
        provider = provider.as_str(),
        "Selecting generation backend"
    );
    match provider {
        #[cfg(feature = "ollama")]
        InferenceProvider::Ollama => Ok(Arc::new(crate::ollama::OllamaBackend::from_env()?)),
        #[cfg(feature = "openai")]
        InferenceProvider::OpenAi => Ok(Arc::new(crate::openai::OpenAIBackend::from_env()?)),
        #[allow(unreachable_patterns)]
        other => Err(Error::Config(format!(
            "Provider '{}' is not compiled in",
            other.as_str()
        ))),
    }
}
