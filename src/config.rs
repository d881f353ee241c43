//! Configuration management for matcher tuning
//!
//! This module provides runtime configuration loading from JSON files, so
//! thresholds and analysis parameters can be adjusted per deployment
//! without recompilation. Every section has defaults matching the reference
//! policy (window 2048 / hop 512, acceptance 85, secondary 60, excellence 90).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::MatchError;

/// Default location of the JSON config file for non-embedded deployments
pub const DEFAULT_CONFIG_PATH: &str = "config/voiceauth.json";

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub decision: DecisionConfig,
    #[serde(default)]
    pub service: ServiceConfig,
}

/// Framing and feature-extraction parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Frame length in samples (also the FFT size)
    pub window_size: usize,
    /// Stride between frame starts in samples
    pub hop_size: usize,
    pub mfcc: MfccConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_size: 2048,
            hop_size: 512,
            mfcc: MfccConfig::default(),
        }
    }
}

/// Mel filterbank layout used for MFCC extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MfccConfig {
    /// Number of triangular mel filters
    pub num_filters: usize,
    /// Number of cepstral coefficients kept after the DCT
    pub num_coefficients: usize,
    /// Lower edge of the filterbank in Hz
    pub min_hz: f32,
    /// Upper edge of the filterbank in Hz (Nyquist when absent)
    pub max_hz: Option<f32>,
}

impl Default for MfccConfig {
    fn default() -> Self {
        Self {
            num_filters: 26,
            num_coefficients: 13,
            min_hz: 0.0,
            max_hz: None,
        }
    }
}

/// Relative weight of each per-frame sub-score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureWeights {
    pub mfcc: f64,
    pub rms: f64,
    pub spectral_centroid: f64,
    pub spectral_rolloff: f64,
    pub spectral_flatness: f64,
    pub zcr: f64,
}

impl Default for FeatureWeights {
    fn default() -> Self {
        Self {
            mfcc: 0.5,
            rms: 0.1,
            spectral_centroid: 0.1,
            spectral_rolloff: 0.1,
            spectral_flatness: 0.1,
            zcr: 0.1,
        }
    }
}

impl FeatureWeights {
    pub fn total(&self) -> f64 {
        self.mfcc
            + self.rms
            + self.spectral_centroid
            + self.spectral_rolloff
            + self.spectral_flatness
            + self.zcr
    }
}

/// Sigmoid applied to the raw score: `100 / (1 + exp(-slope * (raw - midpoint)))`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationCurve {
    pub midpoint: f64,
    pub slope: f64,
}

impl Default for CalibrationCurve {
    fn default() -> Self {
        Self {
            midpoint: 75.0,
            slope: 0.1,
        }
    }
}

/// Extra penalty for already-low calibrated scores
///
/// Scores below `below` are multiplied by `factor`. Disabled unless set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LowScorePenalty {
    pub below: f64,
    pub factor: f64,
}

impl Default for LowScorePenalty {
    fn default() -> Self {
        Self {
            below: 75.0,
            factor: 0.8,
        }
    }
}

/// Similarity scoring parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Maximum relative length difference before the duration gate trips
    pub duration_tolerance: f64,
    /// Score reported when the duration gate trips
    pub duration_mismatch_score: f64,
    pub weights: FeatureWeights,
    pub calibration: CalibrationCurve,
    pub low_score_penalty: Option<LowScorePenalty>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            duration_tolerance: 0.2,
            duration_mismatch_score: 30.0,
            weights: FeatureWeights::default(),
            calibration: CalibrationCurve::default(),
            low_score_penalty: None,
        }
    }
}

/// Authoritative accept/reject thresholds plus the provisional UI bands
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Scores at or above this are accepted
    pub acceptance_threshold: f64,
    /// Scores at or above this are labelled "excellent match"
    pub excellence_threshold: f64,
    /// Scores below this are labelled "very different"
    pub secondary_threshold: f64,
    /// Interim feedback bands; intentionally independent of the above
    pub provisional: ProvisionalConfig,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: 85.0,
            excellence_threshold: 90.0,
            secondary_threshold: 60.0,
            provisional: ProvisionalConfig::default(),
        }
    }
}

/// Bands used by capture clients for preliminary feedback
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionalConfig {
    /// Scores at or above this show as passing
    pub pass_threshold: f64,
    /// Scores at or above this (but below pass) show as a warning
    pub warn_threshold: f64,
}

impl Default for ProvisionalConfig {
    fn default() -> Self {
        Self {
            pass_threshold: 75.0,
            warn_threshold: 70.0,
        }
    }
}

/// Boundary worker-pool parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Upper bound on matches running at the same time
    pub max_concurrent_matches: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_concurrent_matches: 4,
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The parsed configuration, or defaults if the file is missing or the
    /// JSON is invalid (a warning is logged either way).
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration from the default location
    pub fn load() -> Self {
        Self::load_from_file(DEFAULT_CONFIG_PATH)
    }

    /// Check internal consistency
    ///
    /// The provisional bands are deliberately not compared with the
    /// authoritative thresholds.
    pub fn validate(&self) -> Result<(), MatchError> {
        let invalid = |reason: String| Err(MatchError::InvalidConfig { reason });

        let analysis = &self.analysis;
        if analysis.window_size < 2 {
            return invalid(format!("window_size must be >= 2 (got {})", analysis.window_size));
        }
        if analysis.hop_size == 0 {
            return invalid("hop_size must be > 0".to_string());
        }
        if analysis.mfcc.num_filters == 0 {
            return invalid("mfcc.num_filters must be > 0".to_string());
        }
        if analysis.mfcc.num_coefficients == 0
            || analysis.mfcc.num_coefficients > analysis.mfcc.num_filters
        {
            return invalid(format!(
                "mfcc.num_coefficients must be in 1..={} (got {})",
                analysis.mfcc.num_filters, analysis.mfcc.num_coefficients
            ));
        }
        if !analysis.mfcc.min_hz.is_finite() || analysis.mfcc.min_hz < 0.0 {
            return invalid(format!(
                "mfcc.min_hz must be a finite value >= 0 (got {})",
                analysis.mfcc.min_hz
            ));
        }
        if let Some(max_hz) = analysis.mfcc.max_hz {
            if !max_hz.is_finite() || max_hz <= 0.0 {
                return invalid(format!(
                    "mfcc.max_hz must be a finite value > 0 (got {})",
                    max_hz
                ));
            }
            if max_hz <= analysis.mfcc.min_hz {
                return invalid(format!(
                    "mfcc.max_hz ({}) must exceed mfcc.min_hz ({})",
                    max_hz, analysis.mfcc.min_hz
                ));
            }
        }

        let scoring = &self.scoring;
        if !(0.0..=1.0).contains(&scoring.duration_tolerance) {
            return invalid(format!(
                "duration_tolerance must be in [0, 1] (got {})",
                scoring.duration_tolerance
            ));
        }
        if (scoring.weights.total() - 1.0).abs() > 1e-6 {
            return invalid(format!(
                "feature weights must sum to 1.0 (got {})",
                scoring.weights.total()
            ));
        }
        if scoring.calibration.slope <= 0.0 {
            return invalid("calibration.slope must be > 0".to_string());
        }

        let decision = &self.decision;
        if !(decision.secondary_threshold <= decision.acceptance_threshold
            && decision.acceptance_threshold <= decision.excellence_threshold)
        {
            return invalid(format!(
                "thresholds must satisfy secondary ({}) <= acceptance ({}) <= excellence ({})",
                decision.secondary_threshold,
                decision.acceptance_threshold,
                decision.excellence_threshold
            ));
        }
        if decision.provisional.warn_threshold > decision.provisional.pass_threshold {
            return invalid("provisional.warn_threshold must not exceed pass_threshold".to_string());
        }

        if self.service.max_concurrent_matches == 0 {
            return invalid("service.max_concurrent_matches must be > 0".to_string());
        }

        Ok(())
    }
}
