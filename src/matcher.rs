//! VoiceMatcher: single-match orchestration.
//!
//! Runs one comparison end to end:
//! passphrase check → decode (both) → DurationGate → FrameAnalyzer (both)
//! → SimilarityScorer → MatchDecision.
//!
//! The matcher holds only immutable configuration and the analyzer, so one
//! instance can serve concurrent matches from any number of threads.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::{
    DurationGate, FeatureExtractor, FrameAnalyzer, GateOutcome, MatchDecision, SimilarityScorer,
    Verdict,
};
use crate::audio::{decode_wav, AudioSample};
use crate::config::AppConfig;
use crate::error::{log_match_error, MatchError, RecordingRole};

/// Which path produced the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    /// Full feature comparison ran
    Compared,
    /// Lengths differed beyond tolerance; the policy score was reported
    DurationMismatch,
    /// The analyzer produced no frame pairs to compare
    NoComparableFrames,
}

/// Result of one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub raw_score: f64,
    pub calibrated_score: f64,
    pub verdict: Verdict,
    pub label: String,
    pub outcome: MatchOutcome,
    pub frames_compared: usize,
    pub duration_diff: f64,
}

impl SimilarityResult {
    pub fn is_accept(&self) -> bool {
        self.verdict.is_accept()
    }
}

/// Compares a probe recording against an enrolled reference
pub struct VoiceMatcher {
    analyzer: Arc<dyn FrameAnalyzer>,
    gate: DurationGate,
    scorer: SimilarityScorer,
    decision: MatchDecision,
}

impl VoiceMatcher {
    /// Build a matcher with the default feature extractor
    ///
    /// # Errors
    /// `MatchError::InvalidConfig` when the configuration is inconsistent.
    pub fn new(config: AppConfig) -> Result<Self, MatchError> {
        config.validate()?;
        let analyzer = Arc::new(FeatureExtractor::new(config.analysis.clone()));
        Ok(Self::assemble(&config, analyzer))
    }

    /// Build a matcher around a custom analyzer
    pub fn with_analyzer(
        config: AppConfig,
        analyzer: Arc<dyn FrameAnalyzer>,
    ) -> Result<Self, MatchError> {
        config.validate()?;
        Ok(Self::assemble(&config, analyzer))
    }

    fn assemble(config: &AppConfig, analyzer: Arc<dyn FrameAnalyzer>) -> Self {
        Self {
            analyzer,
            gate: DurationGate::from_config(&config.scoring),
            scorer: SimilarityScorer::new(&config.scoring),
            decision: MatchDecision::new(&config.decision),
        }
    }

    pub fn decision(&self) -> &MatchDecision {
        &self.decision
    }

    /// Compare two encoded recordings spoken with the given passphrases
    ///
    /// Differing passphrases are rejected before any audio is decoded.
    pub fn match_audio(
        &self,
        reference_audio: &[u8],
        reference_passphrase: &str,
        probe_audio: &[u8],
        probe_passphrase: &str,
    ) -> Result<SimilarityResult, MatchError> {
        let result = self.run_audio(
            reference_audio,
            reference_passphrase,
            probe_audio,
            probe_passphrase,
        );
        if let Err(err) = &result {
            log_match_error(err, "match_audio");
        }
        result
    }

    fn run_audio(
        &self,
        reference_audio: &[u8],
        reference_passphrase: &str,
        probe_audio: &[u8],
        probe_passphrase: &str,
    ) -> Result<SimilarityResult, MatchError> {
        if reference_passphrase != probe_passphrase {
            return Err(MatchError::PassphraseMismatch);
        }

        let reference = decode_wav(reference_audio).map_err(|source| MatchError::Decode {
            role: RecordingRole::Reference,
            source,
        })?;
        let probe = decode_wav(probe_audio).map_err(|source| MatchError::Decode {
            role: RecordingRole::Probe,
            source,
        })?;

        self.compare(&reference, &probe)
    }

    /// Compare two already-decoded recordings
    pub fn match_samples(
        &self,
        reference: &AudioSample,
        probe: &AudioSample,
    ) -> Result<SimilarityResult, MatchError> {
        let result = self.compare(reference, probe);
        if let Err(err) = &result {
            log_match_error(err, "match_samples");
        }
        result
    }

    fn compare(
        &self,
        reference: &AudioSample,
        probe: &AudioSample,
    ) -> Result<SimilarityResult, MatchError> {
        let duration_diff = match self.gate.check(reference, probe) {
            GateOutcome::Mismatch {
                duration_diff,
                score,
            } => {
                return Ok(self.finish(
                    score,
                    score,
                    MatchOutcome::DurationMismatch,
                    0,
                    duration_diff,
                ));
            }
            GateOutcome::Proceed { duration_diff } => duration_diff,
        };

        let window = self.analyzer.window_size();
        for (role, sample) in [
            (RecordingRole::Reference, reference),
            (RecordingRole::Probe, probe),
        ] {
            if sample.len() < window {
                return Err(MatchError::InsufficientAudio {
                    role,
                    samples: sample.len(),
                    required: window,
                });
            }
        }

        let reference_features = self.analyzer.analyze(reference);
        let probe_features = self.analyzer.analyze(probe);

        let breakdown = self.scorer.score(&reference_features, &probe_features);
        let outcome = if breakdown.frames_compared == 0 {
            tracing::warn!(
                "[VoiceMatcher] No comparable frames ({} reference, {} probe)",
                reference_features.len(),
                probe_features.len()
            );
            MatchOutcome::NoComparableFrames
        } else {
            MatchOutcome::Compared
        };

        Ok(self.finish(
            breakdown.raw_score,
            breakdown.calibrated_score,
            outcome,
            breakdown.frames_compared,
            duration_diff,
        ))
    }

    fn finish(
        &self,
        raw_score: f64,
        calibrated_score: f64,
        outcome: MatchOutcome,
        frames_compared: usize,
        duration_diff: f64,
    ) -> SimilarityResult {
        let decision = self.decision.decide(calibrated_score);

        tracing::info!(
            "[VoiceMatcher] {:?}: raw={:.2} calibrated={:.2} → {:?} ({})",
            outcome,
            raw_score,
            calibrated_score,
            decision.verdict,
            decision.tier
        );

        SimilarityResult {
            raw_score,
            calibrated_score,
            verdict: decision.verdict,
            label: decision.tier.label().to_string(),
            outcome,
            frames_compared,
            duration_diff,
        }
    }
}
