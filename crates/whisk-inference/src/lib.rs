//! # whisk-inference
//!
//! Text-completion backends for Whisk.
//!
//! This crate provides:
//! - Ollama implementation (`/api/chat`)
//! - OpenAI-compatible implementation (`/chat/completions`, also Gemini's OpenAI endpoint)
//! - Provider selection from `INFERENCE_PROVIDER`
//! - The recipe chat assistant
//! - A deterministic mock backend (feature `mock`)
//!
//! # Feature Flags
//!
//! - `ollama` (default): Enable Ollama backend
//! - `openai` (default): Enable OpenAI-compatible backend
//! - `mock`: Expose `mock::MockGenerationBackend` to dependent crates' tests
//!
//! # Example
//!
//! ```rust,no_run
//! use whisk_inference::{backend_from_env, GenerationBackend, InferenceProvider};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = backend_from_env(InferenceProvider::from_env().unwrap()).unwrap();
//!     let reply = backend.generate("How long do I rest a steak?").await.unwrap();
//! }
//! ```

pub mod chat;
pub mod json;
pub mod provider;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export core types
pub use whisk_core::{Error, GenerationBackend, GenerationOptions, Result};

pub use chat::{ChatReply, RecipeChatAssistant, Suggestion};
pub use json::{extract_json_object, parse_json_object, strip_code_fences};
pub use provider::{backend_from_env, InferenceProvider};

#[cfg(feature = "ollama")]
pub use ollama::OllamaBackend;

#[cfg(feature = "openai")]
pub use openai::{OpenAIBackend, OpenAIConfig};
