//! HTTP error mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use whisk_import::ImportError;

const BLOCKED_SUGGESTION: &str = "This website uses anti-bot protection. You can manually copy and paste the recipe content, or try a different recipe URL.";
const EXTRACTION_MESSAGE: &str = "Could not extract recipe content from this webpage. The page might not contain a recipe, or the content is not accessible.";
const EXTRACTION_SUGGESTION: &str = "Try a different recipe URL or manually input the recipe.";
const VALIDATION_MESSAGE: &str = "The recipe data is missing required fields.";

#[derive(Debug)]
pub enum ApiError {
    Internal(whisk_core::Error),
    Unauthorized(String),
    NotFound(String),
    BadRequest(String),
    /// The source site refused the fetch.
    Blocked { reason: String, url: String },
    /// No recipe could be extracted from the input.
    ExtractionFailed(String),
    /// The recipe failed the validation gate.
    Validation(Vec<String>),
}

impl ApiError {
    pub fn recipe_not_found() -> Self {
        ApiError::NotFound("Recipe not found".to_string())
    }

    /// Map a pipeline failure for an import of `url`.
    pub fn from_import(err: ImportError, url: &str) -> Self {
        match err {
            ImportError::Blocked { reason } => ApiError::Blocked {
                reason,
                url: url.to_string(),
            },
            ImportError::ExtractionFailed { details } => ApiError::ExtractionFailed(details),
            ImportError::Validation(errors) => ApiError::Validation(errors),
        }
    }
}

impl From<whisk_core::Error> for ApiError {
    fn from(err: whisk_core::Error) -> Self {
        match err {
            whisk_core::Error::NotFound(msg) => ApiError::NotFound(msg),
            whisk_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            whisk_core::Error::Unauthorized(msg) => ApiError::Unauthorized(msg),
            other => ApiError::Internal(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Internal(err) => {
                error!(error = %err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": err.to_string() }),
                )
            }
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::Blocked { reason, url } => (
                StatusCode::FORBIDDEN,
                json!({
                    "error": "Website Access Blocked",
                    "message": reason,
                    "suggestion": BLOCKED_SUGGESTION,
                    "blockedUrl": url,
                    "code": "BLOCKED_BY_FIREWALL",
                }),
            ),
            ApiError::ExtractionFailed(details) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "error": "Recipe Extraction Failed",
                    "message": EXTRACTION_MESSAGE,
                    "details": details,
                    "suggestion": EXTRACTION_SUGGESTION,
                    "code": "EXTRACTION_FAILED",
                }),
            ),
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "error": "Incomplete Recipe Data",
                    "message": VALIDATION_MESSAGE,
                    "details": errors.join(", "),
                    "errors": errors,
                    "code": "VALIDATION_ERROR",
                }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
