// Mel module - MFCC computation from a magnitude spectrum
//
// Fixed layout (version 1): power spectrum → triangular filters evenly spaced
// on the HTK mel scale between `min_hz` and `max_hz` (Nyquist by default) →
// natural log with a 1e-10 floor → unnormalised DCT-II → first N
// coefficients. Stored feature sets should carry MFCC_LAYOUT_VERSION so a
// layout change can be detected.

use crate::config::MfccConfig;

/// Version tag of the filterbank/DCT layout implemented here
pub const MFCC_LAYOUT_VERSION: u32 = 1;

/// Floor applied before the log to keep silent bands finite
const LOG_FLOOR: f32 = 1e-10;

/// HTK mel scale
pub fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

pub fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10.0_f32.powf(mel / 2595.0) - 1.0)
}

/// One triangular filter, stored sparsely as (first bin, weights)
struct MelFilter {
    start_bin: usize,
    weights: Vec<f32>,
}

/// Mel filterbank + DCT for one (sample rate, FFT size) pair
pub struct MelFilterbank {
    filters: Vec<MelFilter>,
    num_coefficients: usize,
    /// cos(π k (n + 0.5) / N), row-major [k][n]
    dct_basis: Vec<f32>,
}

impl MelFilterbank {
    /// Build the filterbank
    ///
    /// # Arguments
    /// * `config` - Filter count, coefficient count and frequency range
    /// * `sample_rate` - Audio sample rate in Hz
    /// * `fft_size` - FFT size the spectra were computed with
    pub fn new(config: &MfccConfig, sample_rate: u32, fft_size: usize) -> Self {
        let num_filters = config.num_filters;
        let nyquist = sample_rate as f32 / 2.0;
        let max_hz = config.max_hz.unwrap_or(nyquist).min(nyquist).max(0.0);
        let min_hz = config.min_hz.max(0.0).min(max_hz);

        let mel_low = hz_to_mel(min_hz);
        let mel_high = hz_to_mel(max_hz);
        let edges_hz: Vec<f32> = (0..num_filters + 2)
            .map(|i| mel_to_hz(mel_low + (mel_high - mel_low) * i as f32 / (num_filters + 1) as f32))
            .collect();

        let bin_hz = sample_rate as f32 / fft_size as f32;
        let num_bins = fft_size / 2 + 1;

        let filters = edges_hz
            .windows(3)
            .map(|edge| {
                let (lo, centre, hi) = (edge[0], edge[1], edge[2]);
                let start_bin = (lo / bin_hz).ceil() as usize;
                let end_bin = ((hi / bin_hz).floor() as usize).min(num_bins.saturating_sub(1));
                let weights = (start_bin..=end_bin)
                    .map(|bin| {
                        let freq = bin as f32 * bin_hz;
                        let w = if freq <= centre {
                            if centre > lo {
                                (freq - lo) / (centre - lo)
                            } else {
                                1.0
                            }
                        } else if hi > centre {
                            (hi - freq) / (hi - centre)
                        } else {
                            1.0
                        };
                        w.max(0.0)
                    })
                    .collect();
                MelFilter { start_bin, weights }
            })
            .collect();

        let num_coefficients = config.num_coefficients.min(num_filters);
        let dct_basis = (0..num_coefficients)
            .flat_map(|k| {
                (0..num_filters).map(move |n| {
                    (std::f32::consts::PI * k as f32 * (n as f32 + 0.5) / num_filters as f32).cos()
                })
            })
            .collect();

        Self {
            filters,
            num_coefficients,
            dct_basis,
        }
    }

    /// Log mel-band energies of a magnitude spectrum
    pub fn log_energies(&self, magnitude: &[f32]) -> Vec<f32> {
        self.filters
            .iter()
            .map(|filter| {
                let energy: f32 = filter
                    .weights
                    .iter()
                    .enumerate()
                    .filter_map(|(i, &w)| magnitude.get(filter.start_bin + i).map(|&m| w * m * m))
                    .sum();
                energy.max(LOG_FLOOR).ln()
            })
            .collect()
    }

    /// MFCC vector (length = configured coefficient count)
    pub fn compute(&self, magnitude: &[f32]) -> Vec<f32> {
        let log_energies = self.log_energies(magnitude);
        let n = log_energies.len();
        (0..self.num_coefficients)
            .map(|k| {
                self.dct_basis[k * n..(k + 1) * n]
                    .iter()
                    .zip(log_energies.iter())
                    .map(|(b, e)| b * e)
                    .sum()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mel_scale_roundtrip_points() {
        assert!(hz_to_mel(0.0).abs() < 1e-6);
        assert!((hz_to_mel(1000.0) - 999.99).abs() < 0.5);
        assert!((mel_to_hz(hz_to_mel(4000.0)) - 4000.0).abs() < 0.5);
    }

    #[test]
    fn test_default_layout_dimensions() {
        let bank = MelFilterbank::new(&MfccConfig::default(), 16_000, 2048);
        assert_eq!(bank.filters.len(), 26);
        let mfcc = bank.compute(&vec![1.0; 1025]);
        assert_eq!(mfcc.len(), 13);
    }

    #[test]
    fn test_every_filter_covers_a_bin() {
        let bank = MelFilterbank::new(&MfccConfig::default(), 16_000, 2048);
        for (i, filter) in bank.filters.iter().enumerate() {
            assert!(
                filter.weights.iter().any(|&w| w > 0.0),
                "filter {} has no positive weight",
                i
            );
        }
    }

    #[test]
    fn test_negative_range_builds_finite_bank() {
        let config = MfccConfig {
            min_hz: -20.0,
            max_hz: Some(-10.0),
            ..MfccConfig::default()
        };
        let bank = MelFilterbank::new(&config, 16_000, 2048);
        assert_eq!(bank.filters.len(), 26);
        let mfcc = bank.compute(&vec![1.0; 1025]);
        assert!(mfcc.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_flat_spectrum_has_small_higher_coefficients() {
        // Constant log energies would give zero for k > 0; a flat magnitude
        // spectrum gives energies proportional to filter width, so only check
        // that c0 dominates.
        let bank = MelFilterbank::new(&MfccConfig::default(), 16_000, 2048);
        let mfcc = bank.compute(&vec![1.0; 1025]);
        let c0 = mfcc[0].abs();
        assert!(mfcc[1..].iter().all(|c| c.abs() < c0));
    }

    #[test]
    fn test_silence_is_finite() {
        let bank = MelFilterbank::new(&MfccConfig::default(), 16_000, 2048);
        let mfcc = bank.compute(&vec![0.0; 1025]);
        assert!(mfcc.iter().all(|c| c.is_finite()));
        // DCT of a constant vector: only c0 is non-zero
        let expected_c0 = 26.0 * LOG_FLOOR.ln();
        assert!((mfcc[0] - expected_c0).abs() < 1e-2);
        assert!(mfcc[1..].iter().all(|c| c.abs() < 1e-2));
    }
}
