//! API Request/Response Types

use serde::{Deserialize, Serialize};

use crate::models::{AppError, ChainFamily};
use crate::utils::telemetry::QueryStats;

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub latency_ms: f64,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, latency_ms: f64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(error: ApiError, latency_ms: f64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// API Error
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Whether the same request may succeed later
    pub retryable: bool,
}

impl ApiError {
    pub fn rate_limited(retry_after: u64) -> Self {
        Self {
            code: crate::models::ErrorCode::ApiRateLimited.as_str().to_string(),
            message: format!("Rate limit exceeded. Retry after {} seconds", retry_after),
            details: Some(format!("retry_after: {}", retry_after)),
            retryable: true,
        }
    }
}

impl From<&AppError> for ApiError {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code_str().to_string(),
            message: err.user_message().to_string(),
            details: err
                .upstream_status
                .map(|status| format!("upstream_status: {}", status)),
            retryable: err.code.is_retryable(),
        }
    }
}

// ============================================
// Address Analysis
// ============================================

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub address: String,
}

#[derive(Debug, Serialize)]
pub struct ClassifyData {
    pub address: String,
    pub chain: ChainFamily,
    pub valid: bool,
}

// ============================================
// Stats / Telemetry
// ============================================

#[derive(Debug, Serialize)]
pub struct StatsData {
    #[serde(flatten)]
    pub queries: QueryStats,
    pub uptime_seconds: u64,
    pub api_version: String,
}

// ============================================
// Health Check
// ============================================

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    /// Whether the risk API credential is configured
    pub credential_configured: bool,
}
