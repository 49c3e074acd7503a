//! Mock generation backend for deterministic testing.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use whisk_inference::mock::MockGenerationBackend;
//! use whisk_core::GenerationBackend;
//!
//! #[tokio::test]
//! async fn test_with_mock_backend() {
//!     let backend = MockGenerationBackend::new()
//!         .with_fixed_response(r#"{"name":"Soup"}"#)
//!         .with_response_when("ENHANCE", r#"{"name":"Better Soup"}"#);
//!
//!     let reply = backend.generate("please ENHANCE this").await.unwrap();
//!     assert_eq!(reply, r#"{"name":"Better Soup"}"#);
//!     assert_eq!(backend.generate_call_count(), 1);
//! }
//! ```

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

use whisk_core::{Error, GenerationBackend, GenerationOptions, Result};

/// Mock generation backend for testing.
#[derive(Clone)]
pub struct MockGenerationBackend {
    config: Arc<MockConfig>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Debug, Clone)]
struct MockConfig {
    /// `(prompt fragment, response)` pairs, checked in insertion order.
    mapped_responses: Vec<(String, String)>,
    default_response: String,
    fail_all: bool,
    failing_fragments: Vec<String>,
}

/// A recorded generation request.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub prompt: String,
    pub options: GenerationOptions,
    pub timestamp: std::time::Instant,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            mapped_responses: Vec::new(),
            default_response: "Mock response".to_string(),
            fail_all: false,
            failing_fragments: Vec::new(),
        }
    }
}

impl MockGenerationBackend {
    /// Create a new mock backend with default configuration.
    pub fn new() -> Self {
        Self {
            config: Arc::new(MockConfig::default()),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Response returned when no mapping matches.
    pub fn with_fixed_response(mut self, response: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config).default_response = response.into();
        self
    }

    /// Return `output` for any prompt containing `fragment`.
    pub fn with_response_when(
        mut self,
        fragment: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.config)
            .mapped_responses
            .push((fragment.into(), output.into()));
        self
    }

    /// Fail every request.
    pub fn with_failure(mut self) -> Self {
        Arc::make_mut(&mut self.config).fail_all = true;
        self
    }

    /// Fail requests whose prompt contains `fragment`.
    pub fn with_failure_when(mut self, fragment: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.config)
            .failing_fragments
            .push(fragment.into());
        self
    }

    /// Get all logged calls for assertion.
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.log().clone()
    }

    /// Clear the call log.
    pub fn clear_calls(&self) {
        self.log().clear()
    }

    /// Get number of generation calls.
    pub fn generate_call_count(&self) -> usize {
        self.log().len()
    }

    fn log(&self) -> MutexGuard<'_, Vec<MockCall>> {
        self.call_log
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn should_fail(&self, prompt: &str) -> bool {
        self.config.fail_all
            || self
                .config
                .failing_fragments
                .iter()
                .any(|f| prompt.contains(f.as_str()))
    }
}

impl Default for MockGenerationBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationBackend for MockGenerationBackend {
    async fn generate_with_options(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String> {
        self.log().push(MockCall {
            prompt: prompt.to_string(),
            options: *options,
            timestamp: std::time::Instant::now(),
        });

        if self.should_fail(prompt) {
            return Err(Error::Inference("Simulated failure".to_string()));
        }

        let response = self
            .config
            .mapped_responses
            .iter()
            .find(|(fragment, _)| prompt.contains(fragment.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_else(|| self.config.default_response.clone());
        Ok(response)
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_response() {
        let backend = MockGenerationBackend::new();
        assert_eq!(backend.generate("anything").await.unwrap(), "Mock response");
    }

    #[tokio::test]
    async fn test_first_matching_fragment_wins() {
        let backend = MockGenerationBackend::new()
            .with_fixed_response("fallback")
            .with_response_when("alpha", "A")
            .with_response_when("beta", "B");

        assert_eq!(backend.generate("alpha and beta").await.unwrap(), "A");
        assert_eq!(backend.generate("just beta").await.unwrap(), "B");
        assert_eq!(backend.generate("gamma").await.unwrap(), "fallback");
    }

    #[tokio::test]
    async fn test_failure_modes() {
        let always = MockGenerationBackend::new().with_failure();
        assert!(matches!(
            always.generate("x").await,
            Err(Error::Inference(_))
        ));

        let selective = MockGenerationBackend::new().with_failure_when("boom");
        assert!(selective.generate("boom here").await.is_err());
        assert!(selective.generate("calm").await.is_ok());
    }

    #[tokio::test]
    async fn test_call_log_records_options() {
        let backend = MockGenerationBackend::new();
        backend
            .generate_with_options("p", &GenerationOptions::new().temperature(0.2).json())
            .await
            .unwrap();
        let clone = backend.clone();
        clone.generate("q").await.unwrap();

        let calls = backend.get_calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].options.json);
        assert_eq!(calls[0].options.temperature, Some(0.2));
        assert!(!calls[1].options.json);

        backend.clear_calls();
        assert_eq!(backend.generate_call_count(), 0);
    }
}
