//! Core Module - Business Logic
//!
//! Address classification, risk aggregation and fund-flow graphs.
//! Everything here is pure and synchronous; no I/O.

pub mod aggregator;
pub mod classifier;
pub mod fund_flow;
pub mod report;
pub mod thresholds;

pub use aggregator::*;
pub use classifier::*;
pub use fund_flow::{build as build_flow_graph, unknown_label, AccountResolver, FlowEdge, FlowGraph, FlowNode};
pub use report::*;
pub use thresholds::*;
