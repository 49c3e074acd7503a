//! Server configuration loaded from the environment.

use std::str::FromStr;

use axum::http::HeaderValue;
use tracing::warn;

use whisk_core::{Error, Result};

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/whisk";
pub const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173";
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Database URL value that selects the in-memory store.
pub const MEMORY_DATABASE_URL: &str = "memory";

/// Global request quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub requests: u32,
    pub period_secs: u64,
}

/// Token verification settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthConfig {
    /// RFC 7662 introspection endpoint of the identity provider.
    pub introspection_url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// `token:user` pairs, comma-separated.
    pub static_tokens: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub max_body_bytes: usize,
    /// `None` when rate limiting is disabled.
    pub rate_limit: Option<RateLimitConfig>,
    pub auth: AuthConfig,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let rate_limit_enabled = var("RATE_LIMIT_ENABLED")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(true);
        let rate_limit = if rate_limit_enabled {
            let requests: u32 = parse_or(var("RATE_LIMIT_REQUESTS"), "RATE_LIMIT_REQUESTS", 100);
            let period_secs: u64 =
                parse_or(var("RATE_LIMIT_PERIOD_SECS"), "RATE_LIMIT_PERIOD_SECS", 60);
            if requests == 0 || period_secs == 0 {
                return Err(Error::Config(
                    "RATE_LIMIT_REQUESTS and RATE_LIMIT_PERIOD_SECS must be non-zero".to_string(),
                ));
            }
            Some(RateLimitConfig {
                requests,
                period_secs,
            })
        } else {
            None
        };

        let origins = var("ALLOWED_ORIGINS").unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string());

        Ok(Self {
            database_url: var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(var("PORT"), "PORT", 3001),
            allowed_origins: split_list(&origins),
            max_body_bytes: parse_or(var("MAX_BODY_BYTES"), "MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES),
            rate_limit,
            auth: AuthConfig {
                introspection_url: var("AUTH_INTROSPECTION_URL"),
                client_id: var("AUTH_CLIENT_ID"),
                client_secret: var("AUTH_CLIENT_SECRET"),
                static_tokens: var("AUTH_STATIC_TOKENS"),
            },
        })
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url == MEMORY_DATABASE_URL
    }

    /// `ALLOWED_ORIGINS` contains `*`.
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|origin| origin == "*")
    }

    /// CORS whitelist; invalid entries are logged and skipped.
    pub fn cors_origins(&self) -> Vec<HeaderValue> {
        self.allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!("Invalid CORS origin '{}': {}", origin, e);
                    None
                }
            })
            .collect()
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &str, default: T) -> T {
    match raw {
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %value, "Invalid configuration value, using default");
            default
        }),
        None => default,
    }
}
