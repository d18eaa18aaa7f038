//! API Middleware (Rate Limiting, Logging)

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use super::handlers::AppState;
use super::types::{ApiError, ApiResponse};
use crate::models::RateLimitConfig;

/// In-memory fixed-window rate limiter
pub struct RateLimiter {
    /// Request counts per client key
    requests: DashMap<String, (u32, Instant)>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            requests: DashMap::new(),
            config,
        }
    }

    /// Check if request is allowed, returns (allowed, remaining, reset_seconds)
    pub fn check(&self, key: &str) -> (bool, u32, u64) {
        let now = Instant::now();

        let mut entry = self.requests.entry(key.to_string()).or_insert((0, now));

        // Reset window if expired
        if now.duration_since(entry.1) > self.config.window_duration {
            entry.0 = 0;
            entry.1 = now;
        }

        let remaining = self.config.requests_per_window.saturating_sub(entry.0);
        let reset_secs = self
            .config
            .window_duration
            .saturating_sub(now.duration_since(entry.1))
            .as_secs();

        if entry.0 >= self.config.requests_per_window {
            return (false, 0, reset_secs);
        }

        entry.0 += 1;
        (true, remaining - 1, reset_secs)
    }

    /// Drop windows that ended long ago
    pub fn cleanup(&self) -> usize {
        let now = Instant::now();
        let before = self.requests.len();
        let window = self.config.window_duration;
        self.requests
            .retain(|_, (_, started)| now.duration_since(*started) < window * 2);
        before.saturating_sub(self.requests.len())
    }

    pub fn tracked_clients(&self) -> usize {
        self.requests.len()
    }

    pub fn trusts_forwarded_headers(&self) -> bool {
        self.config.trust_forwarded_headers
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

/// Periodically purge stale rate-limit windows
pub fn start_cleanup_task(state: Arc<AppState>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            let removed = state.rate_limiter.cleanup();
            if removed > 0 {
                info!("🧹 Rate limiter cleanup: {} stale clients removed", removed);
            }
        }
    });
}

fn is_health_check(request: &Request) -> bool {
    matches!(request.uri().path(), "/health" | "/v1/health")
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("X-Forwarded-For")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Client key: forwarded IP when trusted, else the peer IP, else "unknown"
fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>, trust_forwarded: bool) -> String {
    trust_forwarded
        .then(|| forwarded_ip(headers))
        .flatten()
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    if is_health_check(&request) {
        return next.run(request).await;
    }

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let rate_key = client_key(&headers, peer, state.rate_limiter.trusts_forwarded_headers());
    let (allowed, remaining, reset) = state.rate_limiter.check(&rate_key);

    if !allowed {
        warn!(key = %rate_key, "Rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ApiResponse::error(ApiError::rate_limited(reset), 0.0)),
        )
            .into_response();
    }

    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert("X-RateLimit-Remaining", remaining.into());
    headers.insert("X-RateLimit-Reset", reset.into());

    response
}

/// Request logging middleware
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    info!(
        method = %method,
        uri = %uri,
        status = %status.as_u16(),
        latency_ms = %latency.as_millis(),
        "Request completed"
    );

    response
}
