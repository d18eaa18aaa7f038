//! Query Telemetry
//!
//! In-memory counters about risk queries served by this process. Nothing is
//! written to disk and no addresses are stored.

use dashmap::DashMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::report::AddressReport;
use crate::models::AppError;

/// Snapshot of the counters
#[derive(Debug, Clone, Serialize, Default)]
pub struct QueryStats {
    /// Queries that produced a report
    pub total_queries: u64,
    /// Queries rejected or failed
    pub failed_queries: u64,
    /// Reports with at least one active fund-flow flag
    pub flagged_addresses: u64,
    /// Reports per bucket (LOW / MEDIUM / HIGH)
    pub by_bucket: BTreeMap<String, u64>,
    /// Reports per chain family
    pub by_chain: BTreeMap<String, u64>,
    /// Failures per error code
    pub failures_by_code: BTreeMap<String, u64>,
    /// Average latency of successful queries
    pub avg_latency_ms: f64,
    /// Session start (unix seconds)
    pub period_start: i64,
}

/// Thread-safe collector shared by API handlers
pub struct TelemetryCollector {
    total_queries: AtomicU64,
    failed_queries: AtomicU64,
    flagged_addresses: AtomicU64,
    total_latency_ms: AtomicU64,
    by_bucket: DashMap<&'static str, u64>,
    by_chain: DashMap<&'static str, u64>,
    failures_by_code: DashMap<&'static str, u64>,
    session_start: i64,
}

impl TelemetryCollector {
    pub fn new() -> Self {
        Self {
            total_queries: AtomicU64::new(0),
            failed_queries: AtomicU64::new(0),
            flagged_addresses: AtomicU64::new(0),
            total_latency_ms: AtomicU64::new(0),
            by_bucket: DashMap::new(),
            by_chain: DashMap::new(),
            failures_by_code: DashMap::new(),
            session_start: chrono::Utc::now().timestamp(),
        }
    }

    /// Record a successful query
    pub fn record_report(&self, report: &AddressReport, latency_ms: u64) {
        self.total_queries.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);

        if !report.classification.is_clean() {
            self.flagged_addresses.fetch_add(1, Ordering::Relaxed);
        }

        *self
            .by_bucket
            .entry(report.classification.bucket.as_str())
            .or_insert(0) += 1;
        *self.by_chain.entry(report.chain.as_str()).or_insert(0) += 1;
    }

    /// Record a failed query
    pub fn record_failure(&self, err: &AppError) {
        self.failed_queries.fetch_add(1, Ordering::Relaxed);
        *self.failures_by_code.entry(err.code_str()).or_insert(0) += 1;
    }

    /// Get current statistics
    pub fn get_stats(&self) -> QueryStats {
        let total_queries = self.total_queries.load(Ordering::Relaxed);
        let total_latency = self.total_latency_ms.load(Ordering::Relaxed);

        let avg_latency_ms = if total_queries > 0 {
            total_latency as f64 / total_queries as f64
        } else {
            0.0
        };

        let snapshot = |map: &DashMap<&'static str, u64>| -> BTreeMap<String, u64> {
            map.iter()
                .map(|entry| (entry.key().to_string(), *entry.value()))
                .collect()
        };

        QueryStats {
            total_queries,
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            flagged_addresses: self.flagged_addresses.load(Ordering::Relaxed),
            by_bucket: snapshot(&self.by_bucket),
            by_chain: snapshot(&self.by_chain),
            failures_by_code: snapshot(&self.failures_by_code),
            avg_latency_ms,
            period_start: self.session_start,
        }
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}
