// FFT module - Fast Fourier Transform computation
//
// This module handles FFT computation with Hann windowing to reduce
// spectral leakage. The magnitude spectrum feeds both the spectral
// descriptors and the mel filterbank.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// FFT processor that computes magnitude spectra from analysis frames
///
/// The FFT size equals the frame length, so frames are transformed without
/// zero-padding. The plan is built once and shared; `Fft` is `Send + Sync`.
pub struct FftProcessor {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    /// Hann window for FFT (pre-computed)
    window: Vec<f32>,
}

impl FftProcessor {
    /// Create a new FFT processor
    ///
    /// # Arguments
    /// * `fft_size` - FFT window size (2048 for the default analysis config)
    pub fn new(fft_size: usize) -> Self {
        let denom = (fft_size.max(2) - 1) as f32;
        let window = (0..fft_size)
            .map(|i| 0.5 * (1.0 - ((2.0 * std::f32::consts::PI * i as f32) / denom).cos()))
            .collect();

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);

        Self {
            fft,
            fft_size,
            window,
        }
    }

    /// Number of bins returned by [`Self::compute_magnitude_spectrum`]
    pub fn num_bins(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// Compute magnitude spectrum using FFT
    ///
    /// Applies Hann windowing, performs FFT, and returns magnitude spectrum
    /// for positive frequencies only (exploiting symmetry of real-valued FFT).
    /// The extractor always passes frames of exactly `fft_size` samples; a
    /// shorter slice is zero-padded and only the first `fft_size` samples of
    /// a longer one are used.
    ///
    /// # Returns
    /// Magnitude spectrum (size = fft_size / 2 + 1)
    pub fn compute_magnitude_spectrum(&self, frame: &[f32]) -> Vec<f32> {
        let mut buffer: Vec<Complex<f32>> = frame
            .iter()
            .take(self.fft_size)
            .zip(self.window.iter())
            .map(|(&sample, &w)| Complex::new(sample * w, 0.0))
            .collect();
        buffer.resize(self.fft_size, Complex::new(0.0, 0.0));

        self.fft.process(&mut buffer);

        buffer[..self.num_bins()].iter().map(|c| c.norm()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spectrum_length() {
        let processor = FftProcessor::new(2048);
        let spectrum = processor.compute_magnitude_spectrum(&vec![0.1; 2048]);
        assert_eq!(spectrum.len(), 1025);
        assert_eq!(processor.num_bins(), 1025);
    }

    #[test]
    fn test_sine_peak_lands_in_expected_bin() {
        let fft_size = 2048;
        let sample_rate = 16_000.0;
        let processor = FftProcessor::new(fft_size);
        // Bin-centred tone: bin 128 at 16 kHz / 2048 = 1000 Hz
        let frame: Vec<f32> = (0..fft_size)
            .map(|i| (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / sample_rate).sin())
            .collect();
        let spectrum = processor.compute_magnitude_spectrum(&frame);

        let (peak_bin, _) = spectrum
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .unwrap();
        assert_eq!(peak_bin, 128);
    }

    #[test]
    fn test_silence_has_zero_spectrum() {
        let processor = FftProcessor::new(512);
        let spectrum = processor.compute_magnitude_spectrum(&vec![0.0; 512]);
        assert!(spectrum.iter().all(|&m| m == 0.0));
    }

    #[test]
    fn test_short_frame_is_zero_padded() {
        let processor = FftProcessor::new(1024);
        let spectrum = processor.compute_magnitude_spectrum(&vec![0.5; 100]);
        assert_eq!(spectrum.len(), 513);
    }

    #[test]
    fn test_long_frame_uses_leading_samples() {
        let processor = FftProcessor::new(256);
        let frame: Vec<f32> = (0..512).map(|i| (i as f32 * 0.1).sin()).collect();
        let full = processor.compute_magnitude_spectrum(&frame);
        let leading = processor.compute_magnitude_spectrum(&frame[..256]);
        assert_eq!(full, leading);
    }
}
