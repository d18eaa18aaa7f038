//! Type definitions for address risk analysis
//! Raw records as reported by the risk API plus the chain families we support

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Blockchain family an address string belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChainFamily {
    #[serde(rename = "EVM")]
    Evm,
    Solana,
    Invalid,
}

impl ChainFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainFamily::Evm => "EVM",
            ChainFamily::Solana => "Solana",
            ChainFamily::Invalid => "Invalid",
        }
    }

    /// Chain qualifier the risk API expects in the query string.
    /// EVM is the API default and takes none.
    pub fn query_chain(&self) -> Option<&'static str> {
        match self {
            ChainFamily::Solana => Some("sol"),
            ChainFamily::Evm | ChainFamily::Invalid => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, ChainFamily::Invalid)
    }
}

impl fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single risk tag from `issues[0].tags`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskTag {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub tag_type: String,
    /// Ordinal 0-10, not a probability
    pub severity: f64,
    pub key: String,
}

impl RiskTag {
    /// Lenient decode: missing or mistyped fields become empty/zero.
    /// Returns `None` only when the value is not an object at all.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            name: string_field(obj.get("name")),
            description: string_field(obj.get("description")),
            tag_type: string_field(obj.get("type")),
            severity: number_field(obj.get("severity")),
            key: string_field(obj.get("key")),
        })
    }
}

/// Well-known fund-flow risk flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskFlag {
    Ofac,
    Hacker,
    Mixers,
    Drainer,
    FbiIc3,
    Tornado,
}

impl RiskFlag {
    pub const ALL: [RiskFlag; 6] = [
        RiskFlag::Ofac,
        RiskFlag::Hacker,
        RiskFlag::Mixers,
        RiskFlag::Drainer,
        RiskFlag::FbiIc3,
        RiskFlag::Tornado,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            RiskFlag::Ofac => "ofac",
            RiskFlag::Hacker => "hacker",
            RiskFlag::Mixers => "mixers",
            RiskFlag::Drainer => "drainer",
            RiskFlag::FbiIc3 => "fbi_ic3",
            RiskFlag::Tornado => "tornado",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|flag| flag.key() == key)
    }

    pub fn description(&self) -> &'static str {
        match self {
            RiskFlag::Ofac => "Listed in OFAC-sanctions list",
            RiskFlag::Hacker => "Connected to known hacker activities",
            RiskFlag::Mixers => "Used crypto mixing services",
            RiskFlag::Drainer => "Associated with wallet drainer attacks",
            RiskFlag::FbiIc3 => "Reported in FBI's Internet Crime Complaint Center",
            RiskFlag::Tornado => "Used Tornado Cash mixer",
        }
    }
}

/// `details.fund_flows.risk`, in payload order.
///
/// Only a JSON `true` counts as set; `false`, `null`, strings and absent
/// keys all read as not set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RiskFlagSet {
    entries: Vec<(String, bool)>,
}

impl RiskFlagSet {
    pub fn from_value(value: Option<&Value>) -> Self {
        let entries = value
            .and_then(Value::as_object)
            .map(|obj| {
                obj.iter()
                    .map(|(key, v)| (key.clone(), matches!(v, Value::Bool(true))))
                    .collect()
            })
            .unwrap_or_default();
        Self { entries }
    }

    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, bool)>,
        K: Into<String>,
    {
        Self {
            entries: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn is_set(&self, flag: RiskFlag) -> bool {
        self.entries
            .iter()
            .any(|(key, set)| *set && key == flag.key())
    }

    /// Keys whose value is strictly true, in payload order
    pub fn active_keys(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, set)| *set)
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One fund movement from `details.fund_flows.flows`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundFlow {
    pub from: String,
    pub to: String,
    pub amount: f64,
    pub token: String,
    pub txhash: String,
    pub risk_score: f64,
    #[serde(rename = "type")]
    pub flow_type: String,
}

impl FundFlow {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount: 0.0,
            token: String::new(),
            txhash: String::new(),
            risk_score: 0.0,
            flow_type: String::new(),
        }
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            from: string_field(obj.get("from")),
            to: string_field(obj.get("to")),
            amount: number_field(obj.get("amount")),
            token: string_field(obj.get("token")),
            txhash: string_field(obj.get("txhash")),
            risk_score: number_field(obj.get("risk_score")),
            flow_type: string_field(obj.get("type")),
        })
    }
}

/// Account metadata from `details.fund_flows.accounts`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub address: String,
    pub label: String,
    #[serde(rename = "type")]
    pub account_type: String,
    pub risk_score: f64,
}

impl AccountInfo {
    pub fn new(address: impl Into<String>, label: impl Into<String>, account_type: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            label: label.into(),
            account_type: account_type.into(),
            risk_score: 0.0,
        }
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            address: string_field(obj.get("address")),
            label: string_field(obj.get("label")),
            account_type: string_field(obj.get("type")),
            risk_score: number_field(obj.get("risk_score")),
        })
    }
}

/// Account map as delivered by the API, keyed by the map key.
///
/// Usually key == inner `address`, but legacy payloads key accounts by
/// something else; see `core::fund_flow::AccountResolver`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountBook {
    entries: Vec<(String, AccountInfo)>,
    by_key: HashMap<String, usize>,
}

impl AccountBook {
    pub fn from_value(value: Option<&Value>) -> Self {
        let mut book = Self::default();
        if let Some(obj) = value.and_then(Value::as_object) {
            for (key, raw) in obj {
                if let Some(info) = AccountInfo::from_value(raw) {
                    book.insert(key.clone(), info);
                }
            }
        }
        book
    }

    /// Later inserts under an existing key replace the earlier entry.
    pub fn insert(&mut self, key: impl Into<String>, info: AccountInfo) {
        let key = key.into();
        match self.by_key.get(&key) {
            Some(&idx) => self.entries[idx].1 = info,
            None => {
                self.by_key.insert(key.clone(), self.entries.len());
                self.entries.push((key, info));
            }
        }
    }

    /// Direct key lookup
    pub fn get(&self, key: &str) -> Option<&AccountInfo> {
        self.by_key.get(key).map(|&idx| &self.entries[idx].1)
    }

    /// Entries in payload order
    pub fn values(&self) -> impl Iterator<Item = &AccountInfo> {
        self.entries.iter().map(|(_, info)| info)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, AccountInfo)> for AccountBook {
    fn from_iter<T: IntoIterator<Item = (K, AccountInfo)>>(iter: T) -> Self {
        let mut book = Self::default();
        for (key, info) in iter {
            book.insert(key, info);
        }
        book
    }
}

pub(crate) fn string_field(value: Option<&Value>) -> String {
    value.and_then(Value::as_str).unwrap_or_default().to_string()
}

/// Numbers may arrive as JSON numbers or numeric strings
/// JSON number or numeric string
pub(crate) fn number_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn number_field(value: Option<&Value>) -> f64 {
    value.and_then(number_value).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flag_set_only_strict_true() {
        let raw = json!({ "ofac": true, "hacker": "true", "mixers": null, "drainer": false, "custom": true });
        let flags = RiskFlagSet::from_value(Some(&raw));
        assert_eq!(flags.len(), 5);
        assert_eq!(flags.active_keys(), vec!["ofac".to_string(), "custom".to_string()]);
        assert!(flags.is_set(RiskFlag::Ofac));
        assert!(!flags.is_set(RiskFlag::Hacker));
        assert!(!flags.is_set(RiskFlag::Tornado));
    }

    #[test]
    fn test_flag_keys_round_trip() {
        for flag in RiskFlag::ALL {
            assert_eq!(RiskFlag::from_key(flag.key()), Some(flag));
        }
        assert_eq!(RiskFlag::from_key("sanctioned"), None);
    }

    #[test]
    fn test_tag_decode_is_lenient() {
        let tag = RiskTag::from_value(&json!({ "name": "Theft", "severity": "10" })).unwrap();
        assert_eq!(tag.name, "Theft");
        assert_eq!(tag.severity, 10.0);
        assert_eq!(tag.key, "");
        assert!(RiskTag::from_value(&json!("not a tag")).is_none());
    }

    #[test]
    fn test_account_book_keeps_payload_order() {
        let raw = json!({
            "b": { "address": "0xb", "label": "B", "type": "eoa" },
            "a": { "address": "0xa", "label": "A", "type": "contract" },
            "junk": 42
        });
        let book = AccountBook::from_value(Some(&raw));
        assert_eq!(book.len(), 2);
        let labels: Vec<_> = book.values().map(|a| a.label.as_str()).collect();
        assert_eq!(labels, vec!["B", "A"]);
        assert_eq!(book.get("a").map(|a| a.account_type.as_str()), Some("contract"));
    }

    #[test]
    fn test_chain_query_qualifier() {
        assert_eq!(ChainFamily::Solana.query_chain(), Some("sol"));
        assert_eq!(ChainFamily::Evm.query_chain(), None);
    }
}
