//! Risk thresholds
//!
//! The only place scores are bucketed and tag severities are labelled.
//! The score circle, the badge, the breakdown bars and the recommendation
//! gate all go through these functions.

use serde::{Deserialize, Serialize};

use crate::utils::constants::{
    ELEVATED_SCORE_THRESHOLD, HIGH_SEVERITY_MIN, LOW_RISK_MAX_SCORE, LOW_SEVERITY_MAX,
    MEDIUM_RISK_MAX_SCORE,
};

/// Overall risk bucket
///
/// - score <= 23: Low
/// - 23 < score <= 50: Medium
/// - score > 50: High
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskBucket {
    Low,
    Medium,
    High,
}

impl RiskBucket {
    pub fn from_score(score: f64) -> Self {
        if score <= LOW_RISK_MAX_SCORE {
            RiskBucket::Low
        } else if score <= MEDIUM_RISK_MAX_SCORE {
            RiskBucket::Medium
        } else {
            RiskBucket::High
        }
    }

    /// Bucket of `value` expressed as a percentage of `max`.
    /// A non-positive `max` is treated as an empty gauge.
    pub fn from_ratio(value: f64, max: f64) -> Self {
        if max <= 0.0 {
            return RiskBucket::Low;
        }
        Self::from_score(value / max * 100.0)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskBucket::Low => "LOW",
            RiskBucket::Medium => "MEDIUM",
            RiskBucket::High => "HIGH",
        }
    }

    /// Badge text
    pub fn badge(&self) -> &'static str {
        match self {
            RiskBucket::Low => "Low Risk",
            RiskBucket::Medium => "Medium Risk",
            RiskBucket::High => "High Risk",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            RiskBucket::Low => "🟢",
            RiskBucket::Medium => "🟡",
            RiskBucket::High => "🔴",
        }
    }
}

/// Display label of a single tag's severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLabel {
    High,
    Low,
    Default,
}

impl SeverityLabel {
    /// `>= 7` high, `<= 3` low, everything strictly between is default
    pub fn from_severity(severity: f64) -> Self {
        if severity >= HIGH_SEVERITY_MIN {
            SeverityLabel::High
        } else if severity <= LOW_SEVERITY_MAX {
            SeverityLabel::Low
        } else {
            SeverityLabel::Default
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityLabel::High => "high",
            SeverityLabel::Low => "low",
            SeverityLabel::Default => "default",
        }
    }
}

/// Whether an overall score alone is enough to switch to elevated advice
pub fn score_is_elevated(score: f64) -> bool {
    score > ELEVATED_SCORE_THRESHOLD
}
