//! OpenAI-compatible generation backend.
//!
//! Works with any endpoint that speaks the `/chat/completions` protocol:
//!
//! - OpenAI cloud API
//! - Google Gemini (OpenAI compatibility endpoint)
//! - Ollama (in OpenAI compatibility mode)
//! - vLLM, LocalAI, LM Studio
//!
//! # Example
//!
//! ```rust,no_run
//! use whisk_inference::openai::{OpenAIBackend, OpenAIConfig};
//! use whisk_core::GenerationBackend;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = OpenAIConfig {
//!         base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
//!         api_key: std::env::var("OPENAI_API_KEY").ok(),
//!         gen_model: "gemini-2.0-flash".to_string(),
//!         timeout_seconds: 60,
//!     };
//!     let backend = OpenAIBackend::new(config).unwrap();
//!     let reply = backend.generate("Suggest a substitute for buttermilk").await.unwrap();
//!     println!("{reply}");
//! }
//! ```

mod backend;
mod error;
mod types;

pub use backend::{
    OpenAIBackend, OpenAIConfig, DEFAULT_GEN_MODEL, DEFAULT_OPENAI_URL, DEFAULT_TIMEOUT_SECS,
};
pub use error::{to_whisk_error, OpenAIErrorCode};
pub use types::*;
