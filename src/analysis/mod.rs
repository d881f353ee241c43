// Analysis module - voice comparison pipeline stages
//
// Pipeline (per match, strictly sequential):
//   DurationGate → FeatureExtractor (both recordings) → SimilarityScorer → MatchDecision
//
// Every stage is a pure function of its inputs. The orchestration lives in
// `crate::matcher`.

pub mod decision;
pub mod duration_gate;
pub mod features;
pub mod similarity;

pub use decision::{ConfidenceTier, Decision, MatchDecision, ProvisionalFeedback, Verdict};
pub use duration_gate::{duration_diff, DurationGate, GateOutcome};
pub use features::{FeatureExtractor, FeatureSequence, FeatureVector, FrameAnalyzer};
pub use similarity::{calibrate, ScoreBreakdown, SimilarityScorer};
