// Decode error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Decode error code constants
///
/// A single source of truth for the numeric codes reported to callers
/// (HTTP adapters map these onto "could not process audio").
///
/// Error code range: 2001-2008
pub struct DecodeErrorCodes {}

impl DecodeErrorCodes {
    /// RIFF/WAVE header could not be parsed
    pub const MALFORMED_CONTAINER: i32 = 2001;

    /// Codec or bit depth is not supported
    pub const UNSUPPORTED_FORMAT: i32 = 2002;

    /// Header declares zero channels
    pub const NO_CHANNELS: i32 = 2003;

    /// Header declares a zero sample rate
    pub const INVALID_SAMPLE_RATE: i32 = 2004;

    /// Container holds no audio samples
    pub const EMPTY_PAYLOAD: i32 = 2005;

    /// Sample data ended mid-frame or could not be read
    pub const TRUNCATED_DATA: i32 = 2006;

    /// Recording could not be read from storage
    pub const UNREADABLE: i32 = 2007;

    /// Sample data contains NaN or infinite values
    pub const NON_FINITE_SAMPLE: i32 = 2008;
}

/// Log a decode error with structured context
///
/// Same layout as the other error loggers: error code, component and
/// message, prefixed with the caller-supplied context.
pub fn log_decode_error(err: &DecodeError, context: &str) {
    error!(
        "Decode error in {}: code={}, component=AudioDecoder, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors raised while turning raw container bytes into an `AudioSample`
///
/// Error code range: 2001-2008
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// RIFF/WAVE header could not be parsed
    MalformedContainer { reason: String },

    /// Codec or bit depth is not supported
    UnsupportedFormat { details: String },

    /// Header declares zero channels
    NoChannels,

    /// Header declares a zero sample rate
    InvalidSampleRate,

    /// Container holds no audio samples
    EmptyPayload,

    /// Sample data ended mid-frame or could not be read
    TruncatedData { reason: String },

    /// Recording could not be read from storage
    Unreadable { reason: String },

    /// Sample data contains NaN or infinite values (first offending frame)
    NonFiniteSample { index: usize },
}

impl ErrorCode for DecodeError {
    fn code(&self) -> i32 {
        match self {
            DecodeError::MalformedContainer { .. } => DecodeErrorCodes::MALFORMED_CONTAINER,
            DecodeError::UnsupportedFormat { .. } => DecodeErrorCodes::UNSUPPORTED_FORMAT,
            DecodeError::NoChannels => DecodeErrorCodes::NO_CHANNELS,
            DecodeError::InvalidSampleRate => DecodeErrorCodes::INVALID_SAMPLE_RATE,
            DecodeError::EmptyPayload => DecodeErrorCodes::EMPTY_PAYLOAD,
            DecodeError::TruncatedData { .. } => DecodeErrorCodes::TRUNCATED_DATA,
            DecodeError::Unreadable { .. } => DecodeErrorCodes::UNREADABLE,
            DecodeError::NonFiniteSample { .. } => DecodeErrorCodes::NON_FINITE_SAMPLE,
        }
    }

    fn message(&self) -> String {
        match self {
            DecodeError::MalformedContainer { reason } => {
                format!("Malformed audio container: {}", reason)
            }
            DecodeError::UnsupportedFormat { details } => {
                format!("Unsupported audio format: {}", details)
            }
            DecodeError::NoChannels => "Audio container declares zero channels".to_string(),
            DecodeError::InvalidSampleRate => {
                "Audio container declares a sample rate of 0 Hz".to_string()
            }
            DecodeError::EmptyPayload => "Audio container holds no samples".to_string(),
            DecodeError::TruncatedData { reason } => {
                format!("Audio data truncated: {}", reason)
            }
            DecodeError::Unreadable { reason } => {
                format!("Could not read recording: {}", reason)
            }
            DecodeError::NonFiniteSample { index } => {
                format!("Non-finite sample value at frame {}", index)
            }
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DecodeError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for DecodeError {}

impl From<hound::Error> for DecodeError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::FormatError(reason) => DecodeError::MalformedContainer {
                reason: reason.to_string(),
            },
            hound::Error::Unsupported => DecodeError::UnsupportedFormat {
                details: "codec not supported by WAV reader".to_string(),
            },
            hound::Error::InvalidSampleFormat => DecodeError::UnsupportedFormat {
                details: "sample format does not match declared bit depth".to_string(),
            },
            hound::Error::IoError(io) => DecodeError::TruncatedData {
                reason: io.to_string(),
            },
            other => DecodeError::MalformedContainer {
                reason: other.to_string(),
            },
        }
    }
}
