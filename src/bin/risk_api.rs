//! Address Risk API Server
//!
//! REST API over the address risk query service
//!
//! Usage:
//!   cargo run --bin risk_api
//!
//! Environment:
//!   WEBACY_API_KEY - Risk API credential (queries are rejected without it)
//!   PORT / RISK_PORT - Server port (default: 8080)
//!   RISK_HOST   - Server host (default: 0.0.0.0)
//!   RISK_TRUST_FORWARDED_FOR - Rate-limit on X-Forwarded-For (default: false)
//!   RUST_LOG    - Log level (default: info)

use address_risk::api::{create_router, start_cleanup_task, AppState};
use address_risk::{AppError, RiskQueryService, ServerConfig, TelemetryCollector};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = ServerConfig::from_env();
    let service = RiskQueryService::from_env()?;

    let telemetry = Arc::new(TelemetryCollector::new());
    let telemetry_for_shutdown = telemetry.clone();

    let state = Arc::new(AppState::new(service, telemetry, config.rate_limit.clone()));

    // Start background cleanup task for rate limiter
    start_cleanup_task(state.clone());

    let app = create_router(state);

    let addr: SocketAddr = config.bind_addr().parse().map_err(|_| {
        AppError::invalid_config(format!("Invalid bind address: {}", config.bind_addr()))
    })?;

    info!("🚀 Address Risk API starting on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /v1/address/:address  - Full address risk report");
    info!("  POST /v1/analyze           - Same, address in JSON body");
    info!("  GET  /v1/classify/:address - Chain family of an address");
    info!("  GET  /v1/stats             - Query statistics");
    info!("  GET  /v1/health            - Health check");
    info!("Press Ctrl+C for graceful shutdown");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    // Peer addresses key the rate limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal)
    .await?;

    info!("🛑 Shutdown signal received");
    let stats = telemetry_for_shutdown.get_stats();
    info!("   Queries served: {}", stats.total_queries);
    info!("   Queries failed: {}", stats.failed_queries);
    info!("   Flagged addresses: {}", stats.flagged_addresses);
    info!("👋 Address Risk API shutdown complete");

    Ok(())
}
