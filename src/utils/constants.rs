//! Constants Module - Single Source of Truth
//!
//! Every threshold, endpoint and environment variable name used across the
//! crate is defined here. No hardcoded values in other modules.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "AddressRisk";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent for outgoing HTTP requests
pub const USER_AGENT: &str = concat!("AddressRisk/", env!("CARGO_PKG_VERSION"));

// ============================================
// RISK API (Webacy)
// ============================================

/// Production endpoint of the address risk API
pub const DEFAULT_BASE_URL: &str = "https://api.webacy.com";

/// Default timeout for risk API requests (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Header carrying the credential
pub const API_KEY_HEADER: &str = "x-api-key";

/// Query parameter selecting a non-default chain
pub const CHAIN_QUERY_PARAM: &str = "chain";

// ============================================
// ENVIRONMENT VARIABLES
// ============================================

pub const API_KEY_ENV: &str = "WEBACY_API_KEY";
/// Name used by the web dashboard build
pub const API_KEY_ENV_LEGACY: &str = "VITE_WEBACY_API_KEY";
pub const BASE_URL_ENV: &str = "RISK_API_BASE_URL";
pub const TIMEOUT_ENV: &str = "RISK_API_TIMEOUT_SECS";
pub const HOST_ENV: &str = "RISK_HOST";
pub const PORT_ENV: &str = "PORT";
pub const PORT_ENV_FALLBACK: &str = "RISK_PORT";
/// Set to `true` only behind a reverse proxy that overwrites `X-Forwarded-For`
pub const TRUST_FORWARDED_ENV: &str = "RISK_TRUST_FORWARDED_FOR";

/// Value shipped in sample env files; treated as "not configured"
pub const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY";

// ============================================
// SERVER
// ============================================

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

// ============================================
// RISK THRESHOLDS
// ============================================

/// Scores at or below this are Low risk
pub const LOW_RISK_MAX_SCORE: f64 = 23.0;

/// Scores above LOW_RISK_MAX_SCORE and at or below this are Medium risk
pub const MEDIUM_RISK_MAX_SCORE: f64 = 50.0;

/// Overall scores above this switch recommendations to elevated mode
pub const ELEVATED_SCORE_THRESHOLD: f64 = LOW_RISK_MAX_SCORE;

/// Tag severity at or above this is labelled high
pub const HIGH_SEVERITY_MIN: f64 = 7.0;

/// Tag severity at or below this is labelled low
pub const LOW_SEVERITY_MAX: f64 = 3.0;

/// Tags above this severity appear in the narrative block
pub const NARRATIVE_SEVERITY_MIN: f64 = 2.0;

/// Tag severities are on a 0-10 scale
pub const MAX_TAG_SEVERITY: f64 = 10.0;

// ============================================
// DISPLAY
// ============================================

/// Characters of an address kept in synthesized "Unknown (...)" labels
pub const UNKNOWN_LABEL_PREFIX_CHARS: usize = 6;

/// Label of the queried address when the payload carries none
pub const DEFAULT_ADDRESS_LABEL: &str = "Unknown";

/// Account type of addresses with no metadata
pub const UNKNOWN_ACCOUNT_TYPE: &str = "unknown";

/// Number of transfers shown in the recent transfers table
pub const RECENT_TRANSFERS_LIMIT: usize = 3;

/// Characters of an address kept in the transfers table
pub const TRANSFER_ADDRESS_PREFIX_CHARS: usize = 8;

// ============================================
// TAG KEYS WITH EXTRA "WHY FLAGGED" REASONS
// ============================================

pub const TAG_KEY_STEALING_ATTACK: &str = "stealing_attack";
pub const TAG_KEY_CLOSED_SOURCE: &str = "is_closed_source";

/// Keep the first `n` characters of an address for display
pub fn short_address(address: &str, n: usize) -> String {
    address.chars().take(n).collect()
}
