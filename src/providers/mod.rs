//! Providers Module - External Data Sources
//!
//! The risk API client. Core modules never call it; they only consume its
//! decoded payload.

pub mod risk_api;

pub use risk_api::*;
