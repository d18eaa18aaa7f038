//! HTTP API tests (router driven in-process with `oneshot`)

mod common;

use address_risk::api::{create_router, AppState};
use address_risk::models::RateLimitConfig;
use address_risk::{RiskApiConfig, RiskQueryService, TelemetryCollector};
use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{Request, StatusCode},
    Router,
};
use common::*;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn app_with(config: RiskApiConfig, rate_limit: RateLimitConfig) -> Router {
    let service = RiskQueryService::new(config).unwrap();
    let state = AppState::new(service, Arc::new(TelemetryCollector::new()), rate_limit);
    create_router(Arc::new(state))
}

fn app(config: RiskApiConfig) -> Router {
    app_with(config, RateLimitConfig::default())
}

async fn upstream_app() -> Router {
    let base = spawn_mock_upstream().await;
    app(RiskApiConfig::default()
        .with_base_url(base)
        .with_api_key(MOCK_API_KEY))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health_reports_missing_credential() {
    let (status, body) = send(app(RiskApiConfig::default()), get("/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["credential_configured"], false);

    let (status, _) = send(app(RiskApiConfig::default()), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_missing_credential_rejected_before_address_check() {
    let config = RiskApiConfig::default().with_api_key("k").without_api_key();
    let (status, body) = send(app(config), get("/v1/address/garbage")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "CFG_MISSING_API_KEY");
}

#[tokio::test]
async fn test_invalid_address_is_bad_request() {
    let config = RiskApiConfig::default().with_api_key("k");
    let (status, body) = send(app(config), get("/v1/address/0x1234")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "ADDR_INVALID_FORMAT");
    assert_eq!(
        body["error"]["message"],
        "Invalid address format. Please provide a valid Solana or EVM address."
    );
}

#[tokio::test]
async fn test_classify_endpoint() {
    let app = app(RiskApiConfig::default());

    let (status, body) = send(app.clone(), get(&format!("/v1/classify/{}", SOLANA_ADDRESS))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["chain"], "Solana");
    assert_eq!(body["data"]["valid"], true);

    let (_, body) = send(app, get("/v1/classify/hello")).await;
    assert_eq!(body["data"]["chain"], "Invalid");
    assert_eq!(body["data"]["valid"], false);
}

#[tokio::test]
async fn test_address_report_via_get_and_post() {
    let app = upstream_app().await;

    let (status, body) = send(app.clone(), get(&format!("/v1/address/{}", EVM_ADDRESS))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["chain"], "EVM");
    assert_eq!(body["data"]["classification"]["bucket"], "HIGH");
    assert_eq!(body["data"]["classification"]["flags"]["flags"], json!(["ofac"]));
    assert_eq!(body["data"]["graph"]["nodes"][1]["label"], "Poloniex");

    let (status, body) = send(
        app.clone(),
        post_json("/v1/analyze", json!({ "address": SOLANA_ADDRESS })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["chain"], "Solana");

    let (_, stats) = send(app, get("/v1/stats")).await;
    assert_eq!(stats["data"]["total_queries"], 2);
    assert_eq!(stats["data"]["flagged_addresses"], 2);
    assert_eq!(stats["data"]["by_chain"]["EVM"], 1);
    assert_eq!(stats["data"]["by_chain"]["Solana"], 1);
}

#[tokio::test]
async fn test_upstream_rejection_passed_through() {
    let base = spawn_mock_upstream().await;
    let app = app(RiskApiConfig::default()
        .with_base_url(base)
        .with_api_key("wrong-key"));

    let (status, body) = send(app.clone(), get(&format!("/v1/address/{}", EVM_ADDRESS))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "UPSTREAM_HTTP_ERROR");
    assert_eq!(
        body["error"]["message"],
        format!("API error: 403 - {}", FORBIDDEN_BODY)
    );
    assert_eq!(body["error"]["details"], "upstream_status: 403");

    let (_, stats) = send(app, get("/v1/stats")).await;
    assert_eq!(stats["data"]["failed_queries"], 1);
    assert_eq!(stats["data"]["failures_by_code"]["UPSTREAM_HTTP_ERROR"], 1);
}

#[tokio::test]
async fn test_concurrent_query_for_same_address_conflicts() {
    let app = upstream_app().await;
    let uri = format!("/v1/address/{}", SLOW_ADDRESS);

    let (first, second) = tokio::join!(send(app.clone(), get(&uri)), send(app.clone(), get(&uri)));
    let mut statuses = vec![first.0, second.0];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::CONFLICT]);

    // The claim is released once the first query finishes
    let (status, _) = send(app, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_hex_case_variants_share_one_claim() {
    let app = upstream_app().await;
    let checksummed = format!("/v1/address/{}", SLOW_ADDRESS);
    let lowercase = format!("/v1/address/{}", SLOW_ADDRESS.to_lowercase());

    let (first, second) = tokio::join!(
        send(app.clone(), get(&checksummed)),
        send(app.clone(), get(&lowercase))
    );
    let mut statuses = vec![first.0, second.0];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::OK, StatusCode::CONFLICT]);
}

fn get_from(uri: &str, peer: &str, forwarded_for: Option<&str>) -> Request<Body> {
    let peer: SocketAddr = peer.parse().unwrap();
    let mut builder = Request::builder().uri(uri).extension(ConnectInfo(peer));
    if let Some(ip) = forwarded_for {
        builder = builder.header("X-Forwarded-For", ip);
    }
    builder.body(Body::empty()).unwrap()
}

fn one_per_window() -> RateLimitConfig {
    RateLimitConfig {
        requests_per_window: 1,
        window_duration: Duration::from_secs(60),
        ..RateLimitConfig::default()
    }
}

#[tokio::test]
async fn test_rate_limit_windows_are_per_peer() {
    let app = app_with(RiskApiConfig::default(), one_per_window());
    let uri = "/v1/classify/hello";

    let (a, _) = send(app.clone(), get_from(uri, "192.0.2.1:40000", None)).await;
    let (b, _) = send(app.clone(), get_from(uri, "192.0.2.2:40000", None)).await;
    assert_eq!(a, StatusCode::OK);
    assert_eq!(b, StatusCode::OK);

    // Same peer again, a new source port does not reset the window
    let (again, _) = send(app, get_from(uri, "192.0.2.1:40001", None)).await;
    assert_eq!(again, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_untrusted_forwarded_header_cannot_reset_window() {
    let app = app_with(RiskApiConfig::default(), one_per_window());
    let uri = "/v1/classify/hello";
    let peer = "192.0.2.9:40000";

    let (first, _) = send(app.clone(), get_from(uri, peer, Some("10.0.0.1"))).await;
    let (second, _) = send(app, get_from(uri, peer, Some("10.0.0.2"))).await;
    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_trusted_forwarded_header_keys_clients() {
    let limit = RateLimitConfig {
        trust_forwarded_headers: true,
        ..one_per_window()
    };
    let app = app_with(RiskApiConfig::default(), limit);
    let uri = "/v1/classify/hello";
    let proxy = "127.0.0.1:40000";

    let (first, _) = send(app.clone(), get_from(uri, proxy, Some("10.0.0.1"))).await;
    let (second, _) = send(app.clone(), get_from(uri, proxy, Some("10.0.0.2"))).await;
    let (repeat, _) = send(app, get_from(uri, proxy, Some("10.0.0.1"))).await;
    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::OK);
    assert_eq!(repeat, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_rate_limit_returns_429() {
    let limit = one_per_window();
    let app = app_with(RiskApiConfig::default(), limit);

    let response = app
        .clone()
        .oneshot(get("/v1/classify/hello"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["X-RateLimit-Remaining"], "0");

    let (status, body) = send(app.clone(), get("/v1/classify/hello")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], "API_RATE_LIMITED");

    // Health checks are never limited
    let (status, _) = send(app, get("/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_analyze_body_is_bad_request() {
    let config = RiskApiConfig::default().with_api_key("k");
    let (status, body) = send(app(config), post_json("/v1/analyze", json!({ "addr": "x" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "API_BAD_REQUEST");
    assert_eq!(body["error"]["retryable"], false);
}
