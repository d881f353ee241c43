// Match error types and constants

use crate::error::{DecodeError, ErrorCode};
use log::error;
use std::fmt;

/// Match error code constants
///
/// Error code range: 3001-3005. Decode failures keep their own 2xxx code
/// when wrapped in [`MatchError::Decode`].
pub struct MatchErrorCodes {}

impl MatchErrorCodes {
    /// Recording too short to yield a single analysis frame
    pub const INSUFFICIENT_AUDIO: i32 = 3001;

    /// Transcribed passphrases differ
    pub const PASSPHRASE_MISMATCH: i32 = 3002;

    /// Matcher configuration is inconsistent
    pub const INVALID_CONFIG: i32 = 3003;

    /// Invalid sample handed to the matcher (empty or 0 Hz)
    pub const INVALID_SAMPLE: i32 = 3004;

    /// Background worker failed before producing a result
    pub const WORKER_FAILED: i32 = 3005;
}

/// Which side of a comparison a failure refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordingRole {
    /// Enrolment recording stored at registration
    Reference,
    /// Recording captured at login
    Probe,
}

impl fmt::Display for RecordingRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingRole::Reference => write!(f, "reference"),
            RecordingRole::Probe => write!(f, "probe"),
        }
    }
}

/// Log a match error with structured context
pub fn log_match_error(err: &MatchError, context: &str) {
    error!(
        "Match error in {}: code={}, component=VoiceMatcher, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors surfaced by the matching pipeline
///
/// Degenerate scores (duration mismatch, nothing to compare) are NOT errors;
/// they come back as low-scoring `SimilarityResult`s.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchError {
    /// One of the recordings could not be decoded
    Decode {
        role: RecordingRole,
        source: DecodeError,
    },

    /// Recording shorter than one analysis window
    InsufficientAudio {
        role: RecordingRole,
        samples: usize,
        required: usize,
    },

    /// Transcribed passphrases differ
    PassphraseMismatch,

    /// Matcher configuration is inconsistent
    InvalidConfig { reason: String },

    /// Invalid sample handed to the matcher
    InvalidSample { reason: String },

    /// Background worker failed before producing a result
    WorkerFailed { reason: String },
}

impl MatchError {
    /// Short user-facing text, independent of internal details
    pub fn user_message(&self) -> &'static str {
        match self {
            MatchError::Decode { .. } | MatchError::InvalidSample { .. } => {
                "could not process audio"
            }
            MatchError::InsufficientAudio { .. } => "recording too short",
            MatchError::PassphraseMismatch => "incorrect voice passphrase",
            MatchError::InvalidConfig { .. } | MatchError::WorkerFailed { .. } => {
                "voice verification unavailable"
            }
        }
    }
}

impl ErrorCode for MatchError {
    fn code(&self) -> i32 {
        match self {
            MatchError::Decode { source, .. } => source.code(),
            MatchError::InsufficientAudio { .. } => MatchErrorCodes::INSUFFICIENT_AUDIO,
            MatchError::PassphraseMismatch => MatchErrorCodes::PASSPHRASE_MISMATCH,
            MatchError::InvalidConfig { .. } => MatchErrorCodes::INVALID_CONFIG,
            MatchError::InvalidSample { .. } => MatchErrorCodes::INVALID_SAMPLE,
            MatchError::WorkerFailed { .. } => MatchErrorCodes::WORKER_FAILED,
        }
    }

    fn message(&self) -> String {
        match self {
            MatchError::Decode { role, source } => {
                format!("Could not decode {} recording: {}", role, source.message())
            }
            MatchError::InsufficientAudio {
                role,
                samples,
                required,
            } => format!(
                "Recording too short: {} has {} samples, need at least {}",
                role, samples, required
            ),
            MatchError::PassphraseMismatch => {
                "Passphrase does not match the enrolled passphrase".to_string()
            }
            MatchError::InvalidConfig { reason } => {
                format!("Invalid matcher configuration: {}", reason)
            }
            MatchError::InvalidSample { reason } => format!("Invalid audio sample: {}", reason),
            MatchError::WorkerFailed { reason } => format!("Match worker failed: {}", reason),
        }
    }
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MatchError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for MatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MatchError::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeErrorCodes;

    #[test]
    fn test_match_error_codes() {
        assert_eq!(
            MatchError::InsufficientAudio {
                role: RecordingRole::Probe,
                samples: 100,
                required: 2048
            }
            .code(),
            MatchErrorCodes::INSUFFICIENT_AUDIO
        );
        assert_eq!(
            MatchError::PassphraseMismatch.code(),
            MatchErrorCodes::PASSPHRASE_MISMATCH
        );
        assert_eq!(
            MatchError::InvalidConfig {
                reason: "test".to_string()
            }
            .code(),
            MatchErrorCodes::INVALID_CONFIG
        );
        assert_eq!(
            MatchError::WorkerFailed {
                reason: "test".to_string()
            }
            .code(),
            MatchErrorCodes::WORKER_FAILED
        );
    }

    #[test]
    fn test_decode_variant_keeps_decode_code() {
        let err = MatchError::Decode {
            role: RecordingRole::Reference,
            source: DecodeError::EmptyPayload,
        };
        assert_eq!(err.code(), DecodeErrorCodes::EMPTY_PAYLOAD);
        assert!(err.message().contains("reference"));
        assert_eq!(err.user_message(), "could not process audio");
    }

    #[test]
    fn test_match_error_messages() {
        let err = MatchError::InsufficientAudio {
            role: RecordingRole::Probe,
            samples: 100,
            required: 2048,
        };
        assert_eq!(
            err.message(),
            "Recording too short: probe has 100 samples, need at least 2048"
        );
        assert_eq!(err.user_message(), "recording too short");
    }

    #[test]
    fn test_match_error_display() {
        let err = MatchError::PassphraseMismatch;
        let display = format!("{}", err);
        assert!(display.contains("MatchError"));
        assert!(display.contains(&err.code().to_string()));
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error;

        let err = MatchError::Decode {
            role: RecordingRole::Probe,
            source: DecodeError::NoChannels,
        };
        assert!(err.source().is_some());
        assert!(MatchError::PassphraseMismatch.source().is_none());
    }
}
