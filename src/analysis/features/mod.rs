// FeatureExtractor - per-frame voice feature extraction
//
// This module slides a fixed window across a recording and describes every
// complete frame with an MFCC vector plus five scalar descriptors.
//
// Module organization:
// - types: Data structures (FeatureVector, FeatureSequence)
// - fft: FFT computation with windowing
// - mel: Mel filterbank + DCT (MFCC)
// - spectral: Frequency-domain features (centroid, flatness, rolloff)
// - temporal: Time-domain features (ZCR, RMS)
// - mod.rs: Coordinator (FeatureExtractor)
//
// Frame count = floor((n - window) / hop) + 1 for n >= window, else 0. The
// trailing partial frame is dropped, never padded.
//
// References:
// - Davis, S. & Mermelstein, P. (1980). Comparison of parametric representations
//   for monosyllabic word recognition in continuously spoken sentences
// - Peeters, G. (2004). A large set of audio features for sound description

mod fft;
mod mel;
mod spectral;
mod temporal;
mod types;

pub use mel::{hz_to_mel, mel_to_hz, MFCC_LAYOUT_VERSION};
pub use temporal::{compute_rms, compute_zcr};
pub use types::{FeatureSequence, FeatureVector};

use fft::FftProcessor;
use mel::MelFilterbank;
use spectral::SpectralFeatures;

use crate::audio::AudioSample;
use crate::config::AnalysisConfig;

/// Seam between the matcher and feature extraction
///
/// The matcher only depends on this trait, which lets tests observe whether
/// extraction ran at all (the duration gate must bypass it).
pub trait FrameAnalyzer: Send + Sync {
    /// Frame length in samples; recordings shorter than this yield no frames
    fn window_size(&self) -> usize;

    /// Describe every complete frame of `sample`
    fn analyze(&self, sample: &AudioSample) -> FeatureSequence;
}

/// Number of complete frames for a recording of `num_samples`
pub fn frame_count(num_samples: usize, window_size: usize, hop_size: usize) -> usize {
    if window_size == 0 || hop_size == 0 || num_samples < window_size {
        return 0;
    }
    (num_samples - window_size) / hop_size + 1
}

/// FeatureExtractor coordinates the DSP feature extraction pipeline
///
/// Combines FFT processing, MFCC, spectral and temporal descriptors. The FFT
/// plan is built once; the filterbank depends on the sample rate and is
/// built per recording.
pub struct FeatureExtractor {
    config: AnalysisConfig,
    fft_processor: FftProcessor,
}

impl FeatureExtractor {
    /// Create a new FeatureExtractor
    ///
    /// The FFT size equals `config.window_size`.
    pub fn new(config: AnalysisConfig) -> Self {
        let fft_processor = FftProcessor::new(config.window_size);
        Self {
            config,
            fft_processor,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Extract the feature sequence of a whole recording
    pub fn extract(&self, sample: &AudioSample) -> FeatureSequence {
        let window = self.config.window_size;
        let hop = self.config.hop_size;
        let samples = sample.samples();
        let frames = frame_count(samples.len(), window, hop);

        let mel_bank = MelFilterbank::new(&self.config.mfcc, sample.sample_rate(), window);
        let spectral = SpectralFeatures::new(sample.sample_rate(), window);

        let vectors: Vec<FeatureVector> = (0..frames)
            .map(|i| {
                let start = i * hop;
                self.extract_frame(&samples[start..start + window], &mel_bank, &spectral)
            })
            .collect();

        tracing::debug!(
            "[FeatureExtractor] {} frames from {} samples @ {} Hz",
            vectors.len(),
            samples.len(),
            sample.sample_rate()
        );

        FeatureSequence::new(vectors)
    }

    /// Extract all features from a single frame
    ///
    /// 1. Compute magnitude spectrum via FFT
    /// 2. MFCC and spectral descriptors from the spectrum
    /// 3. Temporal descriptors from the raw samples
    fn extract_frame(
        &self,
        frame: &[f32],
        mel_bank: &MelFilterbank,
        spectral: &SpectralFeatures,
    ) -> FeatureVector {
        let spectrum = self.fft_processor.compute_magnitude_spectrum(frame);

        FeatureVector {
            mfcc: mel_bank.compute(&spectrum),
            rms: compute_rms(frame),
            spectral_centroid: spectral.compute_centroid(&spectrum),
            spectral_rolloff: spectral.compute_rolloff(&spectrum),
            spectral_flatness: spectral.compute_flatness(&spectrum),
            zcr: compute_zcr(frame),
        }
    }
}

impl FrameAnalyzer for FeatureExtractor {
    fn window_size(&self) -> usize {
        self.config.window_size
    }

    fn analyze(&self, sample: &AudioSample) -> FeatureSequence {
        self.extract(sample)
    }
}
