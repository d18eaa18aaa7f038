//! Risk API Client - Webacy address risk endpoint
//!
//! API: `GET {base_url}/addresses/{address}` (+ `?chain=sol` for Solana)
//! Auth: `x-api-key` header
//!
//! This is the only place in the crate that performs I/O. It validates the
//! preconditions (credential, then address shape) before touching the
//! network, and never retries; a failed query is reported once.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::core::classifier::ClassifiedAddress;
use crate::core::report::AddressReport;
use crate::models::{AppError, AppResult, RiskApiConfig, RiskPayload};
use crate::utils::constants::{
    API_KEY_ENV, API_KEY_HEADER, CHAIN_QUERY_PARAM, USER_AGENT as USER_AGENT_CONST,
};

/// Risk query service
pub struct RiskQueryService {
    client: reqwest::Client,
    config: RiskApiConfig,
}

impl RiskQueryService {
    /// Create a client. A missing credential is not an error here; it is
    /// reported by every query instead, before any request is made.
    pub fn new(config: RiskApiConfig) -> AppResult<Self> {
        let client = Self::build_client(&config)?;
        if !config.has_api_key() {
            warn!("⚠️ {} not set - risk queries will be rejected", API_KEY_ENV);
        }
        Ok(Self { client, config })
    }

    /// Build from environment variables
    pub fn from_env() -> AppResult<Self> {
        Self::new(RiskApiConfig::from_env())
    }

    fn build_client(config: &RiskApiConfig) -> AppResult<reqwest::Client> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .gzip(true)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {}", e)))
    }

    pub fn config(&self) -> &RiskApiConfig {
        &self.config
    }

    /// Request URL for an address; Solana needs an explicit chain qualifier
    pub fn request_url(&self, address: &ClassifiedAddress) -> String {
        let mut url = format!("{}/addresses/{}", self.config.base_url, address.as_str());
        if let Some(chain) = address.chain.query_chain() {
            url.push_str(&format!("?{}={}", CHAIN_QUERY_PARAM, chain));
        }
        url
    }

    /// Check both preconditions, credential first
    pub fn prepare(&self, address: &str) -> AppResult<(ClassifiedAddress, &str)> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::missing_credential(API_KEY_ENV))?;
        let classified = ClassifiedAddress::parse(address)?;
        Ok((classified, api_key))
    }

    /// Fetch the raw JSON body for an address
    pub async fn fetch_raw(&self, address: &str) -> AppResult<(ClassifiedAddress, Value)> {
        let (classified, api_key) = self.prepare(address)?;
        let url = self.request_url(&classified);
        let start = Instant::now();

        info!(address = %classified.address, chain = %classified.chain, "🔍 Fetching risk data");
        debug!(url = %url, "Risk API request");

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "Risk API error");
            return Err(AppError::upstream_http(status.as_u16(), body));
        }

        let body = response.text().await?;
        let value: Value = serde_json::from_str(&body)?;

        info!(
            address = %classified.address,
            latency_ms = start.elapsed().as_millis() as u64,
            "📊 Risk data received"
        );

        Ok((classified, value))
    }

    /// Fetch and decode the payload (lenient: never fails on shape)
    pub async fn fetch_payload(&self, address: &str) -> AppResult<(ClassifiedAddress, RiskPayload)> {
        let (classified, value) = self.fetch_raw(address).await?;
        Ok((classified, RiskPayload::from_value(&value)))
    }

    /// Fetch and derive the full report
    pub async fn fetch_report(&self, address: &str) -> AppResult<AddressReport> {
        let (classified, payload) = self.fetch_payload(address).await?;
        Ok(AddressReport::build(&classified, &payload))
    }
}
