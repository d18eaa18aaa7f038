//! Address Risk Library
//!
//! Risk assessment for blockchain addresses:
//! - Chain family classification (EVM / Solana) from address shape
//! - Risk aggregation: score buckets, tag severity labels, fund-flow flags
//! - Fund-flow graph building with account label resolution
//! - A client for the upstream address risk API, plus a small REST surface

pub mod api;
pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use crate::core::{
    aggregate, build_flow_graph, classify, AccountResolver, AddressReport, ClassifiedAddress,
    FlagStatus, FlowEdge, FlowGraph, FlowNode, RecommendationMode, RiskBucket,
    RiskClassification, SeverityLabel,
};
pub use models::{
    AccountBook, AccountInfo, AppError, AppResult, ChainFamily, ErrorCode, FundFlow,
    RiskApiConfig, RiskFlag, RiskFlagSet, RiskPayload, RiskTag, ServerConfig,
};
pub use providers::RiskQueryService;
pub use utils::telemetry::{QueryStats, TelemetryCollector};
