//! Configuration module
//!
//! The risk API credential is held here and injected into
//! `RiskQueryService` at construction; nothing reads it from a global.
//! Key is NEVER logged.

use std::time::Duration;
use tracing::info;

use crate::utils::constants::{
    API_KEY_ENV, API_KEY_ENV_LEGACY, BASE_URL_ENV, DEFAULT_BASE_URL, DEFAULT_HOST, DEFAULT_PORT,
    DEFAULT_TIMEOUT_SECS, HOST_ENV, PLACEHOLDER_API_KEY, PORT_ENV, PORT_ENV_FALLBACK,
    TIMEOUT_ENV, TRUST_FORWARDED_ENV,
};

/// Configuration for the risk API client
#[derive(Clone)]
pub struct RiskApiConfig {
    /// `x-api-key` credential; `None` means queries cannot run at all
    pub api_key: Option<String>,
    /// Base URL without trailing slash
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl RiskApiConfig {
    /// Build from environment variables
    pub fn from_env() -> Self {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .or_else(|| std::env::var(API_KEY_ENV_LEGACY).ok())
            .and_then(normalize_key);

        if api_key.is_some() {
            info!("🔑 {} configured (key hidden for security)", API_KEY_ENV);
        }

        let base_url = std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout = std::env::var(TIMEOUT_ENV)
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        Self::default()
            .with_optional_api_key(api_key)
            .with_base_url(base_url)
            .with_timeout(timeout)
    }

    pub fn with_api_key(self, key: impl Into<String>) -> Self {
        self.with_optional_api_key(normalize_key(key.into()))
    }

    pub fn without_api_key(mut self) -> Self {
        self.api_key = None;
        self
    }

    fn with_optional_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key;
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for RiskApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl std::fmt::Debug for RiskApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskApiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Empty and placeholder keys count as absent
fn normalize_key(key: String) -> Option<String> {
    let key = key.trim().to_string();
    if key.is_empty() || key == PLACEHOLDER_API_KEY {
        None
    } else {
        Some(key)
    }
}

/// Fixed-window rate limit for the API server
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Requests per window
    pub requests_per_window: u32,
    /// Window duration
    pub window_duration: Duration,
    /// Key clients on `X-Forwarded-For` / `X-Real-IP` instead of the peer
    /// address. Only safe behind a proxy that sets those headers itself.
    pub trust_forwarded_headers: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_window: 60,
            window_duration: Duration::from_secs(60),
            trust_forwarded_headers: false,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub rate_limit: RateLimitConfig,
}

impl ServerConfig {
    /// `PORT` wins over `RISK_PORT` so hosted platforms can inject it
    pub fn from_env() -> Self {
        let host = std::env::var(HOST_ENV).unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = std::env::var(PORT_ENV)
            .or_else(|_| std::env::var(PORT_ENV_FALLBACK))
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let trust_forwarded_headers = std::env::var(TRUST_FORWARDED_ENV)
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            host,
            port,
            rate_limit: RateLimitConfig {
                trust_forwarded_headers,
                ..RateLimitConfig::default()
            },
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            rate_limit: RateLimitConfig::default(),
        }
    }
}
