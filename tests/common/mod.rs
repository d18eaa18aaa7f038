//! Local stand-in for the upstream risk API

#![allow(dead_code)]

use axum::{
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use tokio::net::TcpListener;

pub const SAMPLE: &str = include_str!("../fixtures/sample_payload.json");

pub const MOCK_API_KEY: &str = "test-key";
pub const FORBIDDEN_BODY: &str = r#"{"message":"Forbidden"}"#;

pub const EVM_ADDRESS: &str = "0x8576aCC5C05D6Ce88f4e49bf65BdF0C62F91353C";
pub const SOLANA_ADDRESS: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";
/// Answered after a delay, in any hex case
pub const SLOW_ADDRESS: &str = "0x00000000000000000000000000000000000000Aa";
/// Answered with a body that is not JSON
pub const GARBLED_ADDRESS: &str = "0x0000000000000000000000000000000000000002";

/// Serve the mock on an ephemeral port, returning its base URL
pub async fn spawn_mock_upstream() -> String {
    let app = Router::new().route("/addresses/:address", get(mock_address));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Sample payload, with the label rewritten to echo what the mock received
async fn mock_address(
    Path(address): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let key = headers.get("x-api-key").and_then(|v| v.to_str().ok());
    if key != Some(MOCK_API_KEY) {
        return (StatusCode::FORBIDDEN, FORBIDDEN_BODY).into_response();
    }

    if address.eq_ignore_ascii_case(SLOW_ADDRESS) {
        tokio::time::sleep(Duration::from_millis(300)).await;
    }
    if address == GARBLED_ADDRESS {
        return (StatusCode::OK, "<html>maintenance</html>").into_response();
    }

    let chain = params.get("chain").map(String::as_str).unwrap_or("default");
    let mut body: Value = serde_json::from_str(SAMPLE).unwrap();
    body["details"]["fund_flows"]["label"] = json!(format!("{} chain={}", address, chain));
    Json(body).into_response()
}
