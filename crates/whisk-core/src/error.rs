//! Error types shared by the Whisk crates.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Query or connection failure in the recipe store.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The text-completion service failed or answered with an error.
    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Missing or malformed environment setting.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller-supplied value that cannot be accepted (unknown note type, bad id).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Outbound HTTP failure (introspection endpoint, model API).
    #[error("Request error: {0}")]
    Request(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
