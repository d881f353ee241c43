// Error types for the voice authentication engine
//
// This module defines custom error types for audio decoding and voice
// matching, providing structured error handling with stable error codes
// that outer layers (HTTP adapters, CLI) can map onto user-facing failures.

mod decode;
mod matching;

pub use decode::{log_decode_error, DecodeError, DecodeErrorCodes};
pub use matching::{log_match_error, MatchError, MatchErrorCodes, RecordingRole};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the library boundary.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
