// AudioSample - decoded mono recording handed between pipeline stages

use crate::error::MatchError;

/// A decoded single-channel recording
///
/// Samples are normalised amplitudes in [-1, 1]. The buffer is never empty
/// and the sample rate is never zero; both are checked at construction and
/// the value is immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSample {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioSample {
    /// Wrap an already-decoded mono buffer
    ///
    /// # Errors
    /// `MatchError::InvalidSample` when `samples` is empty, `sample_rate` is 0,
    /// or any sample is NaN or infinite.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self, MatchError> {
        if sample_rate == 0 {
            return Err(MatchError::InvalidSample {
                reason: "sample rate must be > 0".to_string(),
            });
        }
        if samples.is_empty() {
            return Err(MatchError::InvalidSample {
                reason: "sample buffer is empty".to_string(),
            });
        }
        if let Some(index) = samples.iter().position(|s| !s.is_finite()) {
            return Err(MatchError::InvalidSample {
                reason: format!("non-finite sample at index {}", index),
            });
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds (`len / sample_rate`)
    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}
