//! Risk API payload
//!
//! The upstream response shape is not guaranteed field by field, so decoding
//! never fails: every missing or mistyped level falls back to an empty/zero
//! default. Only the fields listed below are read; the rest is ignored.
//!
//! - `overallRisk`
//! - `issues[0].tags`
//! - `details.fund_flows.{risk, flows, accounts, label}`
//! - `details.address_info.transaction_count`

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::types::{number_field, number_value, AccountBook, FundFlow, RiskFlagSet, RiskTag};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RiskPayload {
    /// Upstream overall score, `None` when absent or not numeric
    pub overall_risk: Option<f64>,
    pub tags: Vec<RiskTag>,
    pub flags: RiskFlagSet,
    pub flows: Vec<FundFlow>,
    pub accounts: AccountBook,
    /// Display label of the queried address
    pub label: Option<String>,
    pub transaction_count: u64,
}

impl RiskPayload {
    pub fn from_value(value: &Value) -> Self {
        let fund_flows = value.pointer("/details/fund_flows");

        let tags = value
            .pointer("/issues/0/tags")
            .and_then(Value::as_array)
            .map(|tags| tags.iter().filter_map(RiskTag::from_value).collect())
            .unwrap_or_default();

        let flows = fund_flows
            .and_then(|ff| ff.get("flows"))
            .and_then(Value::as_array)
            .map(|flows| flows.iter().filter_map(FundFlow::from_value).collect())
            .unwrap_or_default();

        let label = fund_flows
            .and_then(|ff| ff.get("label"))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(String::from);

        let transaction_count = value
            .pointer("/details/address_info/transaction_count")
            .map(|v| number_field(Some(v)))
            .filter(|n| n.is_finite() && *n > 0.0)
            .map(|n| n as u64)
            .unwrap_or(0);

        Self {
            overall_risk: value.get("overallRisk").and_then(number_value),
            tags,
            flags: RiskFlagSet::from_value(fund_flows.and_then(|ff| ff.get("risk"))),
            flows,
            accounts: AccountBook::from_value(fund_flows.and_then(|ff| ff.get("accounts"))),
            label,
            transaction_count,
        }
    }

    pub fn from_json_str(raw: &str) -> serde_json::Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        Ok(Self::from_value(&value))
    }
}

impl<'de> Deserialize<'de> for RiskPayload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer).map(|value| Self::from_value(&value))
    }
}
