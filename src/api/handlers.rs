//! API Request Handlers

use axum::{
    extract::{rejection::JsonRejection, Json, Path, State},
    http::StatusCode,
};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::middleware::RateLimiter;
use super::types::*;
use crate::core::classifier::{classify, ClassifiedAddress};
use crate::core::report::AddressReport;
use crate::models::{AppError, ChainFamily, RateLimitConfig};
use crate::providers::RiskQueryService;
use crate::utils::telemetry::TelemetryCollector;

type ErrorResponse = (StatusCode, Json<ApiResponse<()>>);

/// Shared application state
pub struct AppState {
    pub service: RiskQueryService,
    pub telemetry: Arc<TelemetryCollector>,
    pub rate_limiter: RateLimiter,
    /// Addresses with a query currently outstanding
    in_flight: DashMap<String, Instant>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        service: RiskQueryService,
        telemetry: Arc<TelemetryCollector>,
        rate_limit: RateLimitConfig,
    ) -> Self {
        Self {
            service,
            telemetry,
            rate_limiter: RateLimiter::new(rate_limit),
            in_flight: DashMap::new(),
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Claim `address` for one query; `None` if a query for it is outstanding
    pub fn begin_query(&self, address: &ClassifiedAddress) -> Option<InFlightGuard<'_>> {
        use dashmap::mapref::entry::Entry;

        let key = claim_key(address);
        match self.in_flight.entry(key.clone()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(Instant::now());
                Some(InFlightGuard {
                    in_flight: &self.in_flight,
                    address: key,
                })
            }
        }
    }

    pub fn queries_in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

/// EVM hex is case-insensitive; Base58 is not
fn claim_key(address: &ClassifiedAddress) -> String {
    match address.chain {
        ChainFamily::Evm => address.as_str().to_ascii_lowercase(),
        _ => address.as_str().to_string(),
    }
}

/// Releases the in-flight claim when the query ends, whatever its outcome
pub struct InFlightGuard<'a> {
    in_flight: &'a DashMap<String, Instant>,
    address: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.remove(&self.address);
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn error_response(err: &AppError, start: Instant) -> ErrorResponse {
    let status =
        StatusCode::from_u16(err.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ApiResponse::error(ApiError::from(err), elapsed_ms(start))),
    )
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        credential_configured: state.service.config().has_api_key(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

// ============================================
// Address Analysis
// ============================================

pub async fn analyze_address(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> Result<Json<ApiResponse<AddressReport>>, ErrorResponse> {
    run_query(&state, address.trim()).await
}

pub async fn analyze(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<AddressReport>>, ErrorResponse> {
    let Json(req) = body.map_err(|rejection| {
        let err = AppError::bad_request(rejection.body_text());
        state.telemetry.record_failure(&err);
        error_response(&err, Instant::now())
    })?;
    run_query(&state, req.address.trim()).await
}

async fn run_query(
    state: &AppState,
    address: &str,
) -> Result<Json<ApiResponse<AddressReport>>, ErrorResponse> {
    let start = Instant::now();

    let fail = |err: AppError| {
        state.telemetry.record_failure(&err);
        error_response(&err, start)
    };

    // Precondition failures are reported before any claim or request
    let (classified, _) = state.service.prepare(address).map_err(fail)?;

    let _guard = state.begin_query(&classified).ok_or_else(|| {
        warn!(address = %address, "Duplicate query rejected");
        fail(AppError::query_in_flight(address))
    })?;

    let report = state.service.fetch_report(address).await.map_err(|err| {
        warn!(address = %address, code = err.code_str(), "Risk query failed: {}", err);
        fail(err)
    })?;

    let latency = elapsed_ms(start);
    state.telemetry.record_report(&report, latency as u64);

    info!(
        address = %report.address,
        chain = %report.chain,
        bucket = report.classification.bucket.as_str(),
        latency_ms = latency as u64,
        "✅ Address analyzed"
    );

    Ok(Json(ApiResponse::success(report, latency)))
}

// ============================================
// Classification
// ============================================

pub async fn classify_address(Path(address): Path<String>) -> Json<ApiResponse<ClassifyData>> {
    let start = Instant::now();
    let address = address.trim().to_string();
    let chain = classify(&address);

    Json(ApiResponse::success(
        ClassifyData {
            address,
            chain,
            valid: chain.is_valid(),
        },
        elapsed_ms(start),
    ))
}

// ============================================
// Stats
// ============================================

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StatsData>> {
    let start = Instant::now();

    let data = StatsData {
        queries: state.telemetry.get_stats(),
        uptime_seconds: state.uptime_seconds(),
        api_version: env!("CARGO_PKG_VERSION").to_string(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}
