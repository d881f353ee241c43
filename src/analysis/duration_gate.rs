// DurationGate - cheap pre-filter on recording lengths
//
// Recordings whose lengths differ by more than the tolerance cannot be the
// same passphrase spoken at a similar pace. The gate reports a fixed policy
// score and the matcher skips feature extraction entirely.

use crate::audio::AudioSample;
use crate::config::ScoringConfig;

/// Outcome of the duration pre-filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GateOutcome {
    /// Lengths are comparable; run the full pipeline
    Proceed { duration_diff: f64 },
    /// Lengths differ too much; report `score` without further analysis
    Mismatch { duration_diff: f64, score: f64 },
}

/// `|lenA - lenB| / max(lenA, lenB)` over sample counts (0 when both are empty)
pub fn duration_diff(len_a: usize, len_b: usize) -> f64 {
    let longest = len_a.max(len_b);
    if longest == 0 {
        return 0.0;
    }
    len_a.abs_diff(len_b) as f64 / longest as f64
}

/// Length comparison policy
#[derive(Debug, Clone, PartialEq)]
pub struct DurationGate {
    tolerance: f64,
    mismatch_score: f64,
}

impl DurationGate {
    pub fn new(tolerance: f64, mismatch_score: f64) -> Self {
        Self {
            tolerance,
            mismatch_score,
        }
    }

    pub fn from_config(config: &ScoringConfig) -> Self {
        Self::new(config.duration_tolerance, config.duration_mismatch_score)
    }

    /// Compare two recordings; the boundary value itself still proceeds
    pub fn check(&self, reference: &AudioSample, probe: &AudioSample) -> GateOutcome {
        let diff = duration_diff(reference.len(), probe.len());
        if diff > self.tolerance {
            tracing::info!(
                "[DurationGate] Duration mismatch {:.3} > {:.3} ({} vs {} samples)",
                diff,
                self.tolerance,
                reference.len(),
                probe.len()
            );
            GateOutcome::Mismatch {
                duration_diff: diff,
                score: self.mismatch_score,
            }
        } else {
            GateOutcome::Proceed {
                duration_diff: diff,
            }
        }
    }
}

impl Default for DurationGate {
    fn default() -> Self {
        Self::from_config(&ScoringConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(len: usize) -> AudioSample {
        AudioSample::new(vec![0.1; len], 16_000).unwrap()
    }

    #[test]
    fn test_duration_diff() {
        assert_eq!(duration_diff(100, 100), 0.0);
        assert!((duration_diff(100, 80) - 0.2).abs() < 1e-12);
        assert!((duration_diff(80, 100) - 0.2).abs() < 1e-12);
        assert_eq!(duration_diff(0, 0), 0.0);
        assert_eq!(duration_diff(0, 10), 1.0);
    }

    #[test]
    fn test_similar_lengths_proceed() {
        let gate = DurationGate::default();
        let outcome = gate.check(&sample(32_000), &sample(30_000));
        assert!(matches!(outcome, GateOutcome::Proceed { .. }));
    }

    #[test]
    fn test_exact_tolerance_proceeds() {
        let gate = DurationGate::default();
        let outcome = gate.check(&sample(10_000), &sample(8_000));
        assert!(matches!(outcome, GateOutcome::Proceed { .. }));
    }

    #[test]
    fn test_mismatch_reports_policy_score() {
        let gate = DurationGate::default();
        match gate.check(&sample(32_000), &sample(16_000)) {
            GateOutcome::Mismatch {
                duration_diff,
                score,
            } => {
                assert!((duration_diff - 0.5).abs() < 1e-12);
                assert_eq!(score, 30.0);
            }
            other => panic!("expected mismatch, got {:?}", other),
        }
    }
}
