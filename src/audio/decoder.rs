// AudioDecoder - WAV container bytes → mono AudioSample
//
// Recordings arrive fully materialised (multipart upload or enrolment store),
// so decoding works on an in-memory byte slice. Multi-channel input is
// reduced to channel 0 because every downstream stage assumes mono.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use crate::audio::AudioSample;
use crate::error::{log_decode_error, DecodeError};

/// Nominal capture profile produced by the browser recorder
pub const NOMINAL_SAMPLE_RATE: u32 = 16_000;

/// Decode an uncompressed PCM (or 32-bit float) WAV container
///
/// Integer formats are normalised by their full-scale value so the result
/// lies in [-1, 1]. Only channel 0 is kept.
///
/// # Errors
/// `DecodeError` for malformed headers, unsupported codecs or bit depths,
/// zero channels, a 0 Hz sample rate, an empty payload, or truncated data.
pub fn decode_wav(bytes: &[u8]) -> Result<AudioSample, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::EmptyPayload);
    }

    let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();

    if spec.channels == 0 {
        return Err(DecodeError::NoChannels);
    }
    if spec.sample_rate == 0 {
        return Err(DecodeError::InvalidSampleRate);
    }
    if reader.len() == 0 {
        return Err(DecodeError::EmptyPayload);
    }

    let channels = spec.channels as usize;
    let samples = match spec.sample_format {
        hound::SampleFormat::Float => {
            if spec.bits_per_sample != 32 {
                return Err(DecodeError::UnsupportedFormat {
                    details: format!("{}-bit float samples", spec.bits_per_sample),
                });
            }
            first_channel(reader.samples::<f32>(), channels, |v| v)?
        }
        hound::SampleFormat::Int => match spec.bits_per_sample {
            8 | 16 | 24 | 32 => {
                let full_scale = (1u64 << (spec.bits_per_sample - 1)) as f32;
                first_channel(reader.samples::<i32>(), channels, |v| v as f32 / full_scale)?
            }
            bits => {
                return Err(DecodeError::UnsupportedFormat {
                    details: format!("{}-bit integer samples", bits),
                })
            }
        },
    };

    if samples.is_empty() {
        return Err(DecodeError::EmptyPayload);
    }

    if spec.sample_rate != NOMINAL_SAMPLE_RATE || channels != 1 || spec.bits_per_sample != 16 {
        tracing::debug!(
            "[AudioDecoder] Non-nominal recording: {} Hz, {} ch, {}-bit (using channel 0)",
            spec.sample_rate,
            channels,
            spec.bits_per_sample
        );
    }

    AudioSample::new(samples, spec.sample_rate).map_err(|err| DecodeError::MalformedContainer {
        reason: err.to_string(),
    })
}

/// Read a recording from disk and decode it
///
/// The matching core itself only sees bytes; this helper exists for the CLI
/// and for callers that keep enrolment recordings as files.
pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<AudioSample, DecodeError> {
    let result = fs::read(&path)
        .map_err(|err| DecodeError::Unreadable {
            reason: format!("{}: {err}", path.as_ref().display()),
        })
        .and_then(|bytes| decode_wav(&bytes));
    if let Err(err) = &result {
        log_decode_error(err, "decode_file");
    }
    result
}

/// Keep every `channels`-th sample starting at index 0, converting to f32
fn first_channel<S, I, F>(samples: I, channels: usize, convert: F) -> Result<Vec<f32>, DecodeError>
where
    I: Iterator<Item = hound::Result<S>>,
    F: Fn(S) -> f32,
{
    let mut mono = Vec::new();
    for (idx, sample) in samples.enumerate() {
        let value = sample?;
        if idx % channels == 0 {
            let converted = convert(value);
            if !converted.is_finite() {
                return Err(DecodeError::NonFiniteSample {
                    index: idx / channels,
                });
            }
            mono.push(converted.clamp(-1.0, 1.0));
        }
    }
    Ok(mono)
}
