//! Risk Aggregator
//!
//! Turns the raw risk payload into the classification every display surface
//! consumes. The overall score is passed through untouched: the upstream
//! service is the source of truth, this module only buckets and labels it.

use serde::Serialize;

use super::thresholds::{score_is_elevated, RiskBucket, SeverityLabel};
use crate::models::{RiskFlag, RiskPayload, RiskTag};
use crate::utils::constants::{
    MAX_TAG_SEVERITY, NARRATIVE_SEVERITY_MIN, TAG_KEY_CLOSED_SOURCE, TAG_KEY_STEALING_ATTACK,
};

/// Fund-flow flag state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "flags", rename_all = "lowercase")]
pub enum FlagStatus {
    /// No flag is strictly true
    Clean,
    /// Active flag keys, in payload order. Never empty.
    Flagged(Vec<String>),
}

impl FlagStatus {
    pub fn is_clean(&self) -> bool {
        matches!(self, FlagStatus::Clean)
    }

    pub fn active(&self) -> &[String] {
        match self {
            FlagStatus::Clean => &[],
            FlagStatus::Flagged(keys) => keys,
        }
    }
}

/// Which advice block to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationMode {
    Safe,
    Elevated,
}

impl RecommendationMode {
    pub fn recommendations(&self) -> &'static [&'static str] {
        match self {
            RecommendationMode::Elevated => &[
                "Avoid sending assets",
                "Use protocol risk scoring before transacting",
                "Consider wallet isolation/quarantine if interaction occurred",
            ],
            RecommendationMode::Safe => &[
                "Low risk address - safe for normal transactions",
                "Continue to monitor for changes in risk profile",
            ],
        }
    }
}

/// A tag with its display label resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelledTag {
    #[serde(flatten)]
    pub tag: RiskTag,
    pub label: SeverityLabel,
}

/// One bar of the risk breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagBar {
    pub name: String,
    pub severity: f64,
    /// `severity / 10`, clamped to 0..=1
    pub fill_ratio: f64,
    pub bucket: RiskBucket,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskClassification {
    pub overall_score: f64,
    pub bucket: RiskBucket,
    pub flags: FlagStatus,
    /// All tags in upstream order
    pub ranked_tags: Vec<LabelledTag>,
    /// Tags with severity > 2, upstream order
    pub narrative_tags: Vec<RiskTag>,
    pub tag_breakdown: Vec<TagBar>,
    /// "Why is this address flagged?" lines; empty when clean
    pub flag_reasons: Vec<String>,
    pub recommendation: RecommendationMode,
}

impl RiskClassification {
    pub fn is_clean(&self) -> bool {
        self.flags.is_clean()
    }

    pub fn has_tags(&self) -> bool {
        !self.ranked_tags.is_empty()
    }

    pub fn recommendations(&self) -> &'static [&'static str] {
        self.recommendation.recommendations()
    }
}

pub fn aggregate(payload: &RiskPayload) -> RiskClassification {
    let overall_score = payload
        .overall_risk
        .filter(|score| score.is_finite())
        .unwrap_or(0.0);

    let active = payload.flags.active_keys();
    let flags = if active.is_empty() {
        FlagStatus::Clean
    } else {
        FlagStatus::Flagged(active)
    };

    let ranked_tags = payload
        .tags
        .iter()
        .map(|tag| LabelledTag {
            tag: tag.clone(),
            label: SeverityLabel::from_severity(tag.severity),
        })
        .collect();

    let narrative_tags = payload
        .tags
        .iter()
        .filter(|tag| tag.severity > NARRATIVE_SEVERITY_MIN)
        .cloned()
        .collect();

    let tag_breakdown = payload.tags.iter().map(tag_bar).collect();

    let flag_reasons = flag_reasons(&flags, &payload.tags);

    let recommendation = if !flags.is_clean() || score_is_elevated(overall_score) {
        RecommendationMode::Elevated
    } else {
        RecommendationMode::Safe
    };

    RiskClassification {
        overall_score,
        bucket: RiskBucket::from_score(overall_score),
        flags,
        ranked_tags,
        narrative_tags,
        tag_breakdown,
        flag_reasons,
        recommendation,
    }
}

fn tag_bar(tag: &RiskTag) -> TagBar {
    TagBar {
        name: tag.name.clone(),
        severity: tag.severity,
        fill_ratio: (tag.severity / MAX_TAG_SEVERITY).clamp(0.0, 1.0),
        bucket: RiskBucket::from_ratio(tag.severity, MAX_TAG_SEVERITY),
    }
}

fn flag_reasons(flags: &FlagStatus, tags: &[RiskTag]) -> Vec<String> {
    let FlagStatus::Flagged(keys) = flags else {
        return Vec::new();
    };

    let mut reasons: Vec<String> = keys
        .iter()
        .map(|key| match RiskFlag::from_key(key) {
            Some(flag) => flag.description().to_string(),
            None => key.clone(),
        })
        .collect();

    let has_tag = |key: &str| tags.iter().any(|tag| tag.key == key);
    if has_tag(TAG_KEY_STEALING_ATTACK) {
        reasons.push("Connected to reported theft".to_string());
    }
    if has_tag(TAG_KEY_CLOSED_SOURCE) {
        reasons.push("Hosting an unverified smart contract".to_string());
    }

    reasons
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskFlagSet;

    fn tag(name: &str, severity: f64, key: &str) -> RiskTag {
        RiskTag {
            name: name.to_string(),
            description: format!("{} description", name),
            tag_type: "addressRisk".to_string(),
            severity,
            key: key.to_string(),
        }
    }

    #[test]
    fn test_clean_state_for_all_false_flags() {
        let payload = RiskPayload {
            flags: RiskFlagSet::from_pairs([("ofac", false), ("hacker", false)]),
            ..Default::default()
        };
        let result = aggregate(&payload);
        assert_eq!(result.flags, FlagStatus::Clean);
        assert!(result.flag_reasons.is_empty());
        assert!(!result.has_tags());
        assert_eq!(result.recommendation, RecommendationMode::Safe);
    }

    #[test]
    fn test_clean_state_for_empty_payload() {
        let result = aggregate(&RiskPayload::default());
        assert_eq!(result.overall_score, 0.0);
        assert_eq!(result.bucket, RiskBucket::Low);
        assert!(result.is_clean());
    }

    #[test]
    fn test_active_flags_keep_payload_order() {
        let payload = RiskPayload {
            flags: RiskFlagSet::from_pairs([("tornado", true), ("ofac", false), ("hacker", true)]),
            ..Default::default()
        };
        let result = aggregate(&payload);
        assert_eq!(result.flags.active(), ["tornado".to_string(), "hacker".to_string()]);
        assert_eq!(
            result.flag_reasons,
            vec!["Used Tornado Cash mixer", "Connected to known hacker activities"]
        );
    }

    #[test]
    fn test_unknown_flag_reported_by_key() {
        let payload = RiskPayload {
            flags: RiskFlagSet::from_pairs([("bridge_exploit", true)]),
            ..Default::default()
        };
        assert_eq!(aggregate(&payload).flag_reasons, vec!["bridge_exploit"]);
    }

    #[test]
    fn test_tag_reasons_only_when_flagged() {
        let tags = vec![tag("Theft", 10.0, "stealing_attack"), tag("Unverified", 2.0, "is_closed_source")];
        let flagged = RiskPayload {
            flags: RiskFlagSet::from_pairs([("ofac", true)]),
            tags: tags.clone(),
            ..Default::default()
        };
        assert_eq!(
            aggregate(&flagged).flag_reasons,
            vec![
                "Listed in OFAC-sanctions list",
                "Connected to reported theft",
                "Hosting an unverified smart contract"
            ]
        );

        let clean = RiskPayload { tags, ..Default::default() };
        assert!(aggregate(&clean).flag_reasons.is_empty());
    }

    #[test]
    fn test_narrative_filters_without_reordering() {
        let payload = RiskPayload {
            tags: vec![
                tag("A", 2.0, "a"),
                tag("B", 10.0, "b"),
                tag("C", 0.1, "c"),
                tag("D", 3.0, "d"),
                tag("E", 2.01, "e"),
            ],
            ..Default::default()
        };
        let result = aggregate(&payload);
        let ranked: Vec<_> = result.ranked_tags.iter().map(|t| t.tag.name.as_str()).collect();
        assert_eq!(ranked, vec!["A", "B", "C", "D", "E"]);
        let narrative: Vec<_> = result.narrative_tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(narrative, vec!["B", "D", "E"]);
    }

    #[test]
    fn test_tag_labels_and_bars() {
        let payload = RiskPayload {
            tags: vec![tag("Low", 3.0, "l"), tag("Mid", 5.0, "m"), tag("High", 7.0, "h")],
            ..Default::default()
        };
        let result = aggregate(&payload);
        let labels: Vec<_> = result.ranked_tags.iter().map(|t| t.label).collect();
        assert_eq!(labels, vec![SeverityLabel::Low, SeverityLabel::Default, SeverityLabel::High]);

        let bars = &result.tag_breakdown;
        assert_eq!(bars[0].bucket, RiskBucket::Medium);
        assert_eq!(bars[1].bucket, RiskBucket::Medium);
        assert_eq!(bars[2].bucket, RiskBucket::High);
        assert!((bars[1].fill_ratio - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_recommendation_gate() {
        let score_only = RiskPayload { overall_risk: Some(23.5), ..Default::default() };
        assert_eq!(aggregate(&score_only).recommendation, RecommendationMode::Elevated);

        let at_boundary = RiskPayload { overall_risk: Some(23.0), ..Default::default() };
        assert_eq!(aggregate(&at_boundary).recommendation, RecommendationMode::Safe);

        let flag_only = RiskPayload {
            overall_risk: Some(1.0),
            flags: RiskFlagSet::from_pairs([("mixers", true)]),
            ..Default::default()
        };
        let result = aggregate(&flag_only);
        assert_eq!(result.bucket, RiskBucket::Low);
        assert_eq!(result.recommendation, RecommendationMode::Elevated);
        assert_eq!(result.recommendations().len(), 3);
    }

    #[test]
    fn test_score_passed_through() {
        let payload = RiskPayload { overall_risk: Some(67.891), ..Default::default() };
        let result = aggregate(&payload);
        assert_eq!(result.overall_score, 67.891);
        assert_eq!(result.bucket, RiskBucket::High);
    }
}
