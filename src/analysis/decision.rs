// MatchDecision - threshold policy over the calibrated score
//
// Only the accept/reject split at the acceptance threshold grants access.
// The four labels are informational. Capture clients may also show interim
// feedback against their own, independently configured bands; those bands
// are not required to agree with the authoritative thresholds.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::{DecisionConfig, ProvisionalConfig};

/// Authoritative outcome of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Accept,
    Reject,
}

impl Verdict {
    pub fn is_accept(self) -> bool {
        matches!(self, Verdict::Accept)
    }
}

/// Informational confidence tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    VeryDifferent,
    SimilarButInsufficient,
    Acceptable,
    Excellent,
}

impl ConfidenceTier {
    pub fn label(self) -> &'static str {
        match self {
            ConfidenceTier::VeryDifferent => "very different",
            ConfidenceTier::SimilarButInsufficient => "similar but insufficient",
            ConfidenceTier::Acceptable => "acceptable match",
            ConfidenceTier::Excellent => "excellent match",
        }
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Interim feedback band for capture UIs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisionalFeedback {
    Pass,
    Warn,
    Fail,
}

/// Verdict plus tier for one score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub verdict: Verdict,
    pub tier: ConfidenceTier,
}

/// Threshold policy
#[derive(Debug, Clone)]
pub struct MatchDecision {
    acceptance_threshold: f64,
    excellence_threshold: f64,
    secondary_threshold: f64,
    provisional: ProvisionalConfig,
}

impl MatchDecision {
    pub fn new(config: &DecisionConfig) -> Self {
        if config.provisional.pass_threshold != config.acceptance_threshold {
            tracing::debug!(
                "[MatchDecision] Provisional pass threshold {} differs from acceptance threshold {}",
                config.provisional.pass_threshold,
                config.acceptance_threshold
            );
        }
        Self {
            acceptance_threshold: config.acceptance_threshold,
            excellence_threshold: config.excellence_threshold,
            secondary_threshold: config.secondary_threshold,
            provisional: config.provisional.clone(),
        }
    }

    pub fn acceptance_threshold(&self) -> f64 {
        self.acceptance_threshold
    }

    /// Classify a calibrated score; non-finite scores are rejected
    pub fn decide(&self, score: f64) -> Decision {
        if !score.is_finite() {
            tracing::warn!("[MatchDecision] Non-finite score {}, rejecting", score);
            return Decision {
                verdict: Verdict::Reject,
                tier: ConfidenceTier::VeryDifferent,
            };
        }

        let tier = if score < self.secondary_threshold {
            ConfidenceTier::VeryDifferent
        } else if score < self.acceptance_threshold {
            ConfidenceTier::SimilarButInsufficient
        } else if score < self.excellence_threshold {
            ConfidenceTier::Acceptable
        } else {
            ConfidenceTier::Excellent
        };

        let verdict = if score >= self.acceptance_threshold {
            Verdict::Accept
        } else {
            Verdict::Reject
        };

        Decision { verdict, tier }
    }

    /// Interim feedback band; never used to grant access
    pub fn provisional_feedback(&self, score: f64) -> ProvisionalFeedback {
        if score >= self.provisional.pass_threshold {
            ProvisionalFeedback::Pass
        } else if score >= self.provisional.warn_threshold {
            ProvisionalFeedback::Warn
        } else {
            ProvisionalFeedback::Fail
        }
    }
}

impl Default for MatchDecision {
    fn default() -> Self {
        Self::new(&DecisionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiers_and_verdicts() {
        let policy = MatchDecision::default();

        let d = policy.decide(10.0);
        assert_eq!(d.verdict, Verdict::Reject);
        assert_eq!(d.tier.label(), "very different");

        let d = policy.decide(60.0);
        assert_eq!(d.verdict, Verdict::Reject);
        assert_eq!(d.tier.label(), "similar but insufficient");

        let d = policy.decide(84.999);
        assert_eq!(d.verdict, Verdict::Reject);

        let d = policy.decide(85.0);
        assert_eq!(d.verdict, Verdict::Accept);
        assert_eq!(d.tier.label(), "acceptable match");

        let d = policy.decide(90.0);
        assert_eq!(d.verdict, Verdict::Accept);
        assert_eq!(d.tier.label(), "excellent match");
    }

    #[test]
    fn test_non_finite_score_rejected_as_very_different() {
        let policy = MatchDecision::default();
        for score in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let d = policy.decide(score);
            assert_eq!(d.verdict, Verdict::Reject);
            assert_eq!(d.tier, ConfidenceTier::VeryDifferent);
        }
    }

    #[test]
    fn test_provisional_bands_are_independent() {
        let policy = MatchDecision::default();
        // 80 passes the interim check but is rejected authoritatively
        assert_eq!(policy.provisional_feedback(80.0), ProvisionalFeedback::Pass);
        assert_eq!(policy.decide(80.0).verdict, Verdict::Reject);

        assert_eq!(policy.provisional_feedback(72.0), ProvisionalFeedback::Warn);
        assert_eq!(policy.provisional_feedback(10.0), ProvisionalFeedback::Fail);
    }

    #[test]
    fn test_custom_thresholds() {
        let config = DecisionConfig {
            acceptance_threshold: 70.0,
            excellence_threshold: 80.0,
            secondary_threshold: 40.0,
            provisional: ProvisionalConfig::default(),
        };
        let policy = MatchDecision::new(&config);
        assert!(policy.decide(71.0).verdict.is_accept());
        assert_eq!(policy.decide(45.0).tier, ConfidenceTier::SimilarButInsufficient);
        assert_eq!(policy.decide(80.0).tier, ConfidenceTier::Excellent);
    }
}
