//! Bearer-token authentication.
//!
//! Tokens are issued by an external identity provider. The server only
//! verifies them, through a [`TokenVerifier`], and scopes every request to
//! the verified user id.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use whisk_core::{Error, Result};

use crate::config::AuthConfig;
use crate::error::ApiError;
use crate::AppState;

const INTROSPECTION_TIMEOUT_SECS: u64 = 10;

/// Resolves a bearer token to the id of the user it was issued to.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// `Ok(None)` for a token that is unknown, expired or inactive.
    async fn verify(&self, token: &str) -> Result<Option<String>>;
}

/// Fixed token-to-user map for local development and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, String>,
}

impl StaticTokenVerifier {
    pub fn new<I, T, U>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (T, U)>,
        T: Into<String>,
        U: Into<String>,
    {
        Self {
            tokens: pairs
                .into_iter()
                .map(|(t, u)| (t.into(), u.into()))
                .collect(),
        }
    }

    /// Parse `token:user` pairs separated by commas.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut tokens = HashMap::new();
        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            match entry.split_once(':') {
                Some((token, user)) if !token.trim().is_empty() && !user.trim().is_empty() => {
                    tokens.insert(token.trim().to_string(), user.trim().to_string());
                }
                _ => {
                    return Err(Error::Config(format!(
                        "Invalid AUTH_STATIC_TOKENS entry '{}', expected token:user",
                        entry
                    )))
                }
            }
        }
        Ok(Self { tokens })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Option<String>> {
        Ok(self.tokens.get(token).cloned())
    }
}

/// RFC 7662 introspection response; only the fields we use.
#[derive(Debug, Deserialize)]
struct IntrospectionResponse {
    active: bool,
    #[serde(default)]
    sub: Option<String>,
}

/// Verifies tokens against the identity provider's introspection endpoint.
#[derive(Clone)]
pub struct IntrospectionVerifier {
    client: reqwest::Client,
    endpoint: String,
    credentials: Option<(String, String)>,
}

impl IntrospectionVerifier {
    pub fn new(
        endpoint: impl Into<String>,
        client_id: Option<String>,
        client_secret: Option<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(INTROSPECTION_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            credentials: client_id.map(|id| (id, client_secret.unwrap_or_default())),
        })
    }
}

#[async_trait]
impl TokenVerifier for IntrospectionVerifier {
    #[instrument(skip(self, token), fields(subsystem = "api", component = "auth", op = "introspect"))]
    async fn verify(&self, token: &str) -> Result<Option<String>> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .form(&[("token", token), ("token_type_hint", "access_token")]);
        if let Some((id, secret)) = &self.credentials {
            request = request.basic_auth(id, Some(secret));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Request(format!(
                "Introspection endpoint returned HTTP {}",
                status.as_u16()
            )));
        }

        let body: IntrospectionResponse = response.json().await?;
        if !body.active {
            debug!("Token inactive");
            return Ok(None);
        }
        Ok(body.sub.filter(|s| !s.trim().is_empty()))
    }
}

/// Pick the verifier the configuration asks for.
///
/// Introspection wins when both are configured.
pub fn verifier_from_config(config: &AuthConfig) -> Result<Arc<dyn TokenVerifier>> {
    if let Some(url) = &config.introspection_url {
        info!(endpoint = %url, "Using token introspection");
        return Ok(Arc::new(IntrospectionVerifier::new(
            url.clone(),
            config.client_id.clone(),
            config.client_secret.clone(),
        )?));
    }
    if let Some(raw) = &config.static_tokens {
        let verifier = StaticTokenVerifier::parse(raw)?;
        warn!(
            tokens = verifier.len(),
            "Using static bearer tokens; not for production"
        );
        return Ok(Arc::new(verifier));
    }
    Err(Error::Config(
        "No token verifier configured: set AUTH_INTROSPECTION_URL or AUTH_STATIC_TOKENS"
            .to_string(),
    ))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

/// Extractor that requires a verified bearer token.
#[derive(Debug, Clone)]
pub struct RequireAuth {
    pub user_id: String,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::Unauthorized("Authentication required".to_string()))?;

        match state.verifier.verify(token).await {
            Ok(Some(user_id)) => Ok(RequireAuth { user_id }),
            Ok(None) => Err(ApiError::Unauthorized("Invalid token".to_string())),
            Err(e) => {
                warn!(error = %e, "Token verification failed");
                Err(ApiError::Unauthorized("Invalid token".to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&headers("Bearer abc123")), Some("abc123"));
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers("Bearer   ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_static_token_pairs() {
        let verifier = StaticTokenVerifier::parse("tok-a:alice, tok-b:bob,").unwrap();
        assert_eq!(verifier.len(), 2);
        assert!(StaticTokenVerifier::parse("no-separator").is_err());
        assert!(StaticTokenVerifier::parse("tok:").is_err());
    }

    #[tokio::test]
    async fn test_static_verifier_lookup() {
        let verifier = StaticTokenVerifier::new([("tok-a", "alice")]);
        assert_eq!(verifier.verify("tok-a").await.unwrap().as_deref(), Some("alice"));
        assert_eq!(verifier.verify("tok-z").await.unwrap(), None);
    }

    #[test]
    fn test_verifier_selection_requires_config() {
        assert!(verifier_from_config(&AuthConfig::default()).is_err());
        let config = AuthConfig {
            static_tokens: Some("tok:alice".to_string()),
            ..Default::default()
        };
        assert!(verifier_from_config(&config).is_ok());
    }
}
