// Types module - Data structures for per-frame voice features

use serde::{Deserialize, Serialize};

/// Features extracted from one analysis frame
///
/// Produced once per frame and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Mel-frequency cepstral coefficients (13 with the default layout)
    ///
    /// Compact description of the spectral envelope; carries most of the
    /// speaker timbre.
    pub mfcc: Vec<f32>,

    /// Root-mean-square amplitude of the raw frame (>= 0)
    pub rms: f32,

    /// Spectral centroid in Hz (>= 0, 0 for silence)
    pub spectral_centroid: f32,

    /// Frequency in Hz below which 85% of the spectral energy lies
    pub spectral_rolloff: f32,

    /// Spectral flatness in [0, 1]
    ///
    /// 0.0 = pure tone, 1.0 = white noise
    pub spectral_flatness: f32,

    /// Zero crossings per sample
    pub zcr: f32,
}

/// Ordered per-frame features of one recording
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSequence {
    frames: Vec<FeatureVector>,
}

impl FeatureSequence {
    pub fn new(frames: Vec<FeatureVector>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[FeatureVector] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Element-wise mean over all frames (None when empty)
    ///
    /// Used for reporting; matching always compares frame by frame.
    pub fn mean(&self) -> Option<FeatureVector> {
        let first = self.frames.first()?;
        let n = self.frames.len() as f32;
        let mut mfcc = vec![0.0f32; first.mfcc.len()];
        let (mut rms, mut centroid, mut rolloff, mut flatness, mut zcr) =
            (0.0f32, 0.0f32, 0.0f32, 0.0f32, 0.0f32);

        for frame in &self.frames {
            for (acc, &c) in mfcc.iter_mut().zip(frame.mfcc.iter()) {
                *acc += c;
            }
            rms += frame.rms;
            centroid += frame.spectral_centroid;
            rolloff += frame.spectral_rolloff;
            flatness += frame.spectral_flatness;
            zcr += frame.zcr;
        }

        mfcc.iter_mut().for_each(|c| *c /= n);
        Some(FeatureVector {
            mfcc,
            rms: rms / n,
            spectral_centroid: centroid / n,
            spectral_rolloff: rolloff / n,
            spectral_flatness: flatness / n,
            zcr: zcr / n,
        })
    }
}

impl From<Vec<FeatureVector>> for FeatureSequence {
    fn from(frames: Vec<FeatureVector>) -> Self {
        Self::new(frames)
    }
}
