//! Centralized Error Handling Module
//!
//! Every failure carries a unique error code so API clients, CLI output and
//! logs all agree on what went wrong.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - ADDR_xxx: Address validation errors
//! - CFG_xxx: Configuration errors
//! - UPSTREAM_xxx: Risk API (Webacy) errors
//! - API_xxx: Errors raised by our own HTTP surface

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// HTTP status returned by the upstream risk API, if any
    pub upstream_status: Option<u16>,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            upstream_status: None,
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            upstream_status: None,
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    /// The single message shown to an end user, without the code prefix.
    pub fn user_message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Address Errors
    // ============================================
    /// Neither the EVM nor the Solana pattern matches
    InvalidAddressFormat,

    // ============================================
    // Configuration Errors
    // ============================================
    /// Risk API credential not configured
    MissingCredential,
    /// Invalid configuration value
    ConfigInvalidValue,

    // ============================================
    // Upstream (Risk API) Errors
    // ============================================
    /// Upstream answered with a non-success status
    UpstreamHttpError,
    /// Upstream request timed out
    UpstreamTimeout,
    /// Could not connect to upstream
    UpstreamConnectionFailed,
    /// Upstream body was not JSON
    UpstreamInvalidResponse,

    // ============================================
    // API Errors
    // ============================================
    /// Invalid request format
    ApiBadRequest,
    /// Rate limit exceeded
    ApiRateLimited,
    /// A query for the same address is still running
    ApiQueryInFlight,
    /// Internal server error
    ApiInternalError,

    // ============================================
    // Generic Errors
    // ============================================
    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidAddressFormat => "ADDR_INVALID_FORMAT",

            Self::MissingCredential => "CFG_MISSING_API_KEY",
            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",

            Self::UpstreamHttpError => "UPSTREAM_HTTP_ERROR",
            Self::UpstreamTimeout => "UPSTREAM_TIMEOUT",
            Self::UpstreamConnectionFailed => "UPSTREAM_CONNECTION_FAILED",
            Self::UpstreamInvalidResponse => "UPSTREAM_INVALID_RESPONSE",

            Self::ApiBadRequest => "API_BAD_REQUEST",
            Self::ApiRateLimited => "API_RATE_LIMITED",
            Self::ApiQueryInFlight => "API_QUERY_IN_FLIGHT",
            Self::ApiInternalError => "API_INTERNAL_ERROR",

            Self::Unknown => "UNKNOWN",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidAddressFormat | Self::ApiBadRequest => 400,
            Self::ApiQueryInFlight => 409,
            Self::ApiRateLimited => 429,
            Self::UpstreamHttpError
            | Self::UpstreamConnectionFailed
            | Self::UpstreamInvalidResponse => 502,
            Self::UpstreamTimeout => 504,
            _ => 500,
        }
    }

    /// Whether a caller may reasonably try again later.
    /// Nothing in this crate retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::UpstreamTimeout
                | Self::UpstreamConnectionFailed
                | Self::ApiRateLimited
                | Self::ApiQueryInFlight
        )
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Address is neither EVM nor Solana
    pub fn invalid_address() -> Self {
        Self::new(
            ErrorCode::InvalidAddressFormat,
            "Invalid address format. Please provide a valid Solana or EVM address.",
        )
    }

    /// Risk API credential is missing
    pub fn missing_credential(key_name: &str) -> Self {
        Self::new(
            ErrorCode::MissingCredential,
            format!("API key not configured. Please set {} in your environment.", key_name),
        )
    }

    /// Upstream answered with a non-success status; body is kept verbatim
    pub fn upstream_http(status: u16, body: impl Into<String>) -> Self {
        let mut err = Self::new(
            ErrorCode::UpstreamHttpError,
            format!("API error: {} - {}", status, body.into()),
        );
        err.upstream_status = Some(status);
        err
    }

    /// Invalid configuration value
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalidValue, msg)
    }

    /// API bad request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiBadRequest, msg)
    }

    /// Same address already being queried
    pub fn query_in_flight(address: &str) -> Self {
        Self::new(
            ErrorCode::ApiQueryInFlight,
            format!("A risk query for {} is already in progress", address),
        )
    }

    /// API internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiInternalError, msg)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Unknown, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::Unknown, "IO error", err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(ErrorCode::UpstreamTimeout, "Request timeout")
        } else if err.is_connect() {
            Self::new(ErrorCode::UpstreamConnectionFailed, "Connection failed")
        } else if err.is_decode() {
            Self::with_source(ErrorCode::UpstreamInvalidResponse, "Invalid response body", err)
        } else {
            Self::new(ErrorCode::Unknown, err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::UpstreamInvalidResponse, "JSON parse error", err)
    }
}
