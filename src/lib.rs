// Voiceauth Core - voice-passphrase matching engine
// Compares a login recording against an enrolled reference recording

// Module declarations
pub mod analysis;
pub mod audio;
pub mod config;
pub mod error;
pub mod matcher;
pub mod service;
pub mod testing;

// Re-exports for convenience
pub use analysis::{ConfidenceTier, ProvisionalFeedback, Verdict};
pub use audio::{decode_file, decode_wav, AudioSample};
pub use config::AppConfig;
pub use error::{DecodeError, ErrorCode, MatchError};
pub use matcher::{MatchOutcome, SimilarityResult, VoiceMatcher};
pub use service::{MatchRequest, MatchService};

use once_cell::sync::OnceCell;

static LOGGING: OnceCell<()> = OnceCell::new();

/// Install the fmt subscriber once per process
///
/// Honors `RUST_LOG`; defaults to `info`. Later calls are no-ops, and an
/// already-installed global subscriber is left in place.
pub fn init_logging() {
    LOGGING.get_or_init(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
        if tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok()
        {
            tracing::debug!("[Logging] Subscriber installed");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging();
        init_logging();
        assert!(LOGGING.get().is_some());
    }
}
