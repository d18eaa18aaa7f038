//! Fund Flow Graph Builder
//!
//! Collapses a flat list of transfers into a deduplicated node/edge graph.
//! Nodes keep first-seen order (`from` before `to` within one flow); the
//! renderer spaces them evenly, so no layout is computed here.

use serde::Serialize;
use std::collections::HashMap;

use crate::models::{AccountBook, AccountInfo, FundFlow};
use crate::utils::constants::{short_address, UNKNOWN_ACCOUNT_TYPE, UNKNOWN_LABEL_PREFIX_CHARS};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowNode {
    pub address: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: String,
    /// False when the label was synthesized
    pub resolved: bool,
}

/// All transfers between one ordered pair of nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowEdge {
    /// Index into `FlowGraph::nodes`
    pub from: usize,
    pub to: usize,
    pub transfers: usize,
    pub total_amount: f64,
    /// Distinct tokens, first-seen order
    pub tokens: Vec<String>,
    pub max_risk_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

impl FlowGraph {
    /// No flows at all; callers show "no data" rather than an error
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, address: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.address == address)
    }
}

/// Two-stage account lookup.
///
/// Stage one is the payload's own key. Stage two covers legacy payloads
/// whose map key differs from the account's inner `address`: a secondary
/// index by inner address, built once, first entry wins.
pub struct AccountResolver<'a> {
    accounts: &'a AccountBook,
    by_inner_address: HashMap<&'a str, &'a AccountInfo>,
}

impl<'a> AccountResolver<'a> {
    pub fn new(accounts: &'a AccountBook) -> Self {
        let mut by_inner_address = HashMap::with_capacity(accounts.len());
        for info in accounts.values() {
            if !info.address.is_empty() {
                by_inner_address.entry(info.address.as_str()).or_insert(info);
            }
        }
        Self {
            accounts,
            by_inner_address,
        }
    }

    pub fn lookup(&self, address: &str) -> Option<&'a AccountInfo> {
        self.accounts
            .get(address)
            .or_else(|| self.by_inner_address.get(address).copied())
    }

    pub fn resolve(&self, address: &str) -> FlowNode {
        let account = self.lookup(address);
        let label = account.map(|a| a.label.as_str()).filter(|l| !l.is_empty());
        let node_type = account
            .map(|a| a.account_type.as_str())
            .filter(|t| !t.is_empty());

        FlowNode {
            address: address.to_string(),
            label: label
                .map(String::from)
                .unwrap_or_else(|| unknown_label(address)),
            node_type: node_type.unwrap_or(UNKNOWN_ACCOUNT_TYPE).to_string(),
            resolved: label.is_some(),
        }
    }
}

/// `Unknown (0x1234...)`
pub fn unknown_label(address: &str) -> String {
    format!(
        "Unknown ({}...)",
        short_address(address, UNKNOWN_LABEL_PREFIX_CHARS)
    )
}

pub fn build(flows: &[FundFlow], accounts: &AccountBook) -> FlowGraph {
    let resolver = AccountResolver::new(accounts);
    let mut graph = FlowGraph::default();
    let mut node_index: HashMap<&str, usize> = HashMap::new();
    let mut edge_index: HashMap<(usize, usize), usize> = HashMap::new();

    for flow in flows {
        let from = intern(&flow.from, &mut node_index, &mut graph.nodes, &resolver);
        let to = intern(&flow.to, &mut node_index, &mut graph.nodes, &resolver);
        let (Some(from), Some(to)) = (from, to) else {
            continue;
        };

        let idx = *edge_index.entry((from, to)).or_insert_with(|| {
            graph.edges.push(FlowEdge::new(from, to));
            graph.edges.len() - 1
        });
        graph.edges[idx].record(flow);
    }

    graph
}

/// Node index of `address`, resolving and appending it on first sight.
/// Empty endpoints are skipped.
fn intern<'f>(
    address: &'f str,
    index: &mut HashMap<&'f str, usize>,
    nodes: &mut Vec<FlowNode>,
    resolver: &AccountResolver<'_>,
) -> Option<usize> {
    if address.is_empty() {
        return None;
    }
    let idx = *index.entry(address).or_insert_with(|| {
        nodes.push(resolver.resolve(address));
        nodes.len() - 1
    });
    Some(idx)
}

impl FlowEdge {
    fn new(from: usize, to: usize) -> Self {
        Self {
            from,
            to,
            transfers: 0,
            total_amount: 0.0,
            tokens: Vec::new(),
            max_risk_score: 0.0,
        }
    }

    fn record(&mut self, flow: &FundFlow) {
        self.transfers += 1;
        self.total_amount += flow.amount;
        self.max_risk_score = self.max_risk_score.max(flow.risk_score);
        if !flow.token.is_empty() && !self.tokens.contains(&flow.token) {
            self.tokens.push(flow.token.clone());
        }
    }
}
