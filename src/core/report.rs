//! Address Report
//!
//! Everything the dashboard shows for one queried address, derived in one
//! pass from the risk payload. Presentation never re-derives buckets or flag
//! booleans from the raw payload.

use serde::Serialize;

use super::aggregator::{aggregate, RiskClassification};
use super::classifier::ClassifiedAddress;
use super::fund_flow::{build, FlowGraph};
use crate::models::{ChainFamily, FundFlow, RiskPayload};
use crate::utils::constants::{
    short_address, DEFAULT_ADDRESS_LABEL, RECENT_TRANSFERS_LIMIT, TRANSFER_ADDRESS_PREFIX_CHARS,
};

/// Row of the recent transfers table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferRow {
    pub from: String,
    pub to: String,
    pub from_short: String,
    pub to_short: String,
    pub amount: f64,
    pub token: String,
    pub txhash: String,
    pub risk_score: f64,
}

impl From<&FundFlow> for TransferRow {
    fn from(flow: &FundFlow) -> Self {
        Self {
            from: flow.from.clone(),
            to: flow.to.clone(),
            from_short: format!("{}...", short_address(&flow.from, TRANSFER_ADDRESS_PREFIX_CHARS)),
            to_short: format!("{}...", short_address(&flow.to, TRANSFER_ADDRESS_PREFIX_CHARS)),
            amount: flow.amount,
            token: flow.token.clone(),
            txhash: flow.txhash.clone(),
            risk_score: flow.risk_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressReport {
    pub address: String,
    pub chain: ChainFamily,
    /// Upstream label of the address, "Unknown" when absent
    pub label: String,
    pub transaction_count: u64,
    pub classification: RiskClassification,
    pub graph: FlowGraph,
    pub recent_transfers: Vec<TransferRow>,
}

impl AddressReport {
    pub fn build(address: &ClassifiedAddress, payload: &RiskPayload) -> Self {
        Self {
            address: address.address.clone(),
            chain: address.chain,
            label: payload
                .label
                .clone()
                .unwrap_or_else(|| DEFAULT_ADDRESS_LABEL.to_string()),
            transaction_count: payload.transaction_count,
            classification: aggregate(payload),
            graph: build(&payload.flows, &payload.accounts),
            recent_transfers: payload
                .flows
                .iter()
                .take(RECENT_TRANSFERS_LIMIT)
                .map(TransferRow::from)
                .collect(),
        }
    }

    /// Pretty print the report
    pub fn summary(&self) -> String {
        let c = &self.classification;
        let mut output = format!(
            "\n{} {} | Score: {} | {}...\n",
            c.bucket.emoji(),
            c.bucket.badge(),
            format_score(c.overall_score),
            short_address(&self.address, 10),
        );
        output.push_str(&format!("   Address: {} ({})\n", self.address, self.chain));
        output.push_str(&format!("   Label: {}\n", self.label));
        output.push_str(&format!("   Transactions: {}\n", self.transaction_count));

        if c.has_tags() {
            output.push_str("   Tags:\n");
            for tagged in &c.ranked_tags {
                output.push_str(&format!(
                    "     - [{}] {} (severity {})\n",
                    tagged.label.as_str(),
                    tagged.tag.name,
                    tagged.tag.severity
                ));
            }
            for tag in &c.narrative_tags {
                output.push_str(&format!("     • {}\n", tag.description));
            }
        } else {
            output.push_str("   No risk issues detected\n");
        }

        if c.is_clean() {
            output.push_str("   No risk flags detected for this address\n");
        } else {
            output.push_str("   Why is this address flagged?\n");
            for reason in &c.flag_reasons {
                output.push_str(&format!("     - {}\n", reason));
            }
        }

        output.push_str("   Recommendations:\n");
        for line in c.recommendations() {
            output.push_str(&format!("     → {}\n", line));
        }

        if self.graph.is_empty() {
            output.push_str("   No fund flow data available\n");
        } else {
            output.push_str("   Fund flow:\n");
            for node in &self.graph.nodes {
                output.push_str(&format!(
                    "     {} {}...\n",
                    node.label,
                    short_address(&node.address, 6)
                ));
            }
        }

        if !self.recent_transfers.is_empty() {
            output.push_str("   Transactions:\n");
            for row in &self.recent_transfers {
                output.push_str(&format!(
                    "     {} → {} | risk {}\n",
                    row.from_short, row.to_short, row.risk_score
                ));
            }
        }

        output
    }
}

/// At most two decimals, no trailing zeros
pub fn format_score(score: f64) -> String {
    let rounded = (score * 100.0).round() / 100.0;
    let text = format!("{:.2}", rounded);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classifier::ClassifiedAddress;
    use serde_json::json;

    const ADDR: &str = "0x8576aCC5C05D6Ce88f4e49bf65BdF0C62F91353C";

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(100.0), "100");
        assert_eq!(format_score(23.1), "23.1");
        assert_eq!(format_score(67.891), "67.89");
        assert_eq!(format_score(0.0), "0");
    }

    #[test]
    fn test_defaults_for_bare_payload() {
        let address = ClassifiedAddress::parse(ADDR).unwrap();
        let report = AddressReport::build(&address, &RiskPayload::default());
        assert_eq!(report.label, "Unknown");
        assert_eq!(report.transaction_count, 0);
        assert!(report.graph.is_empty());
        assert!(report.recent_transfers.is_empty());
        let summary = report.summary();
        assert!(summary.contains("Low Risk"));
        assert!(summary.contains("No fund flow data available"));
        assert!(summary.contains("No risk flags detected"));
    }

    #[test]
    fn test_recent_transfers_capped_at_three() {
        let flows: Vec<_> = (0..5)
            .map(|i| json!({ "from": format!("0xfrom{}", i), "to": "0x209c4784AB1E8183Cf58cA33cb740efbF3FC18EF", "risk_score": i }))
            .collect();
        let payload = RiskPayload::from_value(&json!({ "details": { "fund_flows": { "flows": flows } } }));
        let address = ClassifiedAddress::parse(ADDR).unwrap();
        let report = AddressReport::build(&address, &payload);
        assert_eq!(report.recent_transfers.len(), 3);
        assert_eq!(report.recent_transfers[0].to_short, "0x209c47...");
        assert_eq!(report.graph.nodes.len(), 6);
    }
}
