// SimilarityScorer - frame-aligned multi-feature comparison
//
// Two feature sequences are compared frame by frame over their common
// prefix (truncated, never padded). Each frame pair yields a weighted sum of
// six sub-scores in [0, 1]; the mean over frames is scaled to [0, 100] and
// passed through a sigmoid calibration curve that sharpens the separation
// around the midpoint.
//
// Numeric edge cases never raise:
// - cosine similarity is clamped into [0, 1] (negative correlation counts as 0)
// - scalar ratios with max(a, b) == 0 count as identical (1.0)
// - no comparable frames scores 0

use crate::analysis::features::{FeatureSequence, FeatureVector};
use crate::config::{CalibrationCurve, FeatureWeights, LowScorePenalty, ScoringConfig};

/// Scores produced by [`SimilarityScorer::score`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    /// Mean frame similarity × 100, in [0, 100]
    pub raw_score: f64,
    /// Calibrated (and possibly penalised) score, in [0, 100]
    pub calibrated_score: f64,
    /// Number of frame pairs compared
    pub frames_compared: usize,
    /// Whether the low-score penalty changed the calibrated score
    pub penalty_applied: bool,
}

/// Raw cosine similarity in [-1, 1]
///
/// Returns None when either vector has zero norm. Extra trailing elements
/// of the longer vector are ignored.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a <= 0.0 || norm_b <= 0.0 {
        return None;
    }
    Some((dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0))
}

/// MFCC sub-score: cosine similarity clamped into [0, 1]
///
/// Two all-zero vectors count as identical; one all-zero vector as unrelated.
pub fn mfcc_subscore(a: &[f32], b: &[f32]) -> f64 {
    match cosine_similarity(a, b) {
        Some(cos) => cos.clamp(0.0, 1.0),
        None => {
            let zero_a = a.iter().all(|&x| x == 0.0);
            let zero_b = b.iter().all(|&x| x == 0.0);
            if zero_a && zero_b {
                1.0
            } else {
                0.0
            }
        }
    }
}

/// Scalar sub-score: `1 - |a - b| / max(a, b)` clamped into [0, 1]
///
/// `max(a, b) <= 0` (identical silence) scores 1.
pub fn ratio_subscore(a: f32, b: f32) -> f64 {
    let (a, b) = (a as f64, b as f64);
    let max = a.max(b);
    if max <= 0.0 {
        return 1.0;
    }
    (1.0 - (a - b).abs() / max).clamp(0.0, 1.0)
}

/// Weighted similarity of one frame pair, in [0, 1] for normalised weights
pub fn frame_similarity(a: &FeatureVector, b: &FeatureVector, weights: &FeatureWeights) -> f64 {
    weights.mfcc * mfcc_subscore(&a.mfcc, &b.mfcc)
        + weights.rms * ratio_subscore(a.rms, b.rms)
        + weights.spectral_centroid * ratio_subscore(a.spectral_centroid, b.spectral_centroid)
        + weights.spectral_rolloff * ratio_subscore(a.spectral_rolloff, b.spectral_rolloff)
        + weights.spectral_flatness * ratio_subscore(a.spectral_flatness, b.spectral_flatness)
        + weights.zcr * ratio_subscore(a.zcr, b.zcr)
}

/// Sigmoid calibration: `100 / (1 + exp(-slope * (raw - midpoint)))`, clamped
pub fn calibrate(raw_score: f64, curve: &CalibrationCurve) -> f64 {
    let calibrated = 100.0 / (1.0 + (-curve.slope * (raw_score - curve.midpoint)).exp());
    calibrated.clamp(0.0, 100.0)
}

/// Compares feature sequences and produces calibrated scores
#[derive(Debug, Clone, Default)]
pub struct SimilarityScorer {
    weights: FeatureWeights,
    calibration: CalibrationCurve,
    penalty: Option<LowScorePenalty>,
}

impl SimilarityScorer {
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            weights: config.weights.clone(),
            calibration: config.calibration.clone(),
            penalty: config.low_score_penalty.clone(),
        }
    }

    pub fn calibrate(&self, raw_score: f64) -> f64 {
        calibrate(raw_score, &self.calibration)
    }

    /// Compare the common prefix of `a` and `b`
    pub fn score(&self, a: &FeatureSequence, b: &FeatureSequence) -> ScoreBreakdown {
        let min_frames = a.len().min(b.len());
        if min_frames == 0 {
            return ScoreBreakdown {
                raw_score: 0.0,
                calibrated_score: 0.0,
                frames_compared: 0,
                penalty_applied: false,
            };
        }

        let total: f64 = a
            .frames()
            .iter()
            .zip(b.frames().iter())
            .map(|(fa, fb)| frame_similarity(fa, fb, &self.weights))
            .sum();
        let raw_score = (100.0 * total / min_frames as f64).clamp(0.0, 100.0);

        let mut calibrated_score = self.calibrate(raw_score);
        let mut penalty_applied = false;
        if let Some(penalty) = &self.penalty {
            if calibrated_score < penalty.below {
                calibrated_score = (calibrated_score * penalty.factor).clamp(0.0, 100.0);
                penalty_applied = true;
            }
        }

        tracing::debug!(
            "[SimilarityScorer] {} frames: raw={:.2} calibrated={:.2} (lengths {} / {})",
            min_frames,
            raw_score,
            calibrated_score,
            a.len(),
            b.len()
        );

        ScoreBreakdown {
            raw_score,
            calibrated_score,
            frames_compared: min_frames,
            penalty_applied,
        }
    }
}
