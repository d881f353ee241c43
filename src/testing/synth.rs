//! Deterministic synthetic voices for tests, demos and the CLI `synth` command.
//!
//! A "voice" here is a harmonic source (fundamental + overtones) whose
//! overtone amplitudes are shaped by three formant resonances, modulated by a
//! slow syllable envelope and a little vibrato, with seeded breath noise on
//! top. Two renders of the same [`VoiceProfile`] with different seeds behave
//! like two takes of one speaker; profiles with different pitch/formants
//! behave like different speakers.

use std::f32::consts::PI;
use std::io::Cursor;
use std::path::Path;

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Upper bound on rendered overtones per sample
const MAX_HARMONICS: usize = 40;

/// Syllable rate of the amplitude envelope (syllables per second)
const SYLLABLE_RATE_HZ: f32 = 3.0;

/// Fade applied at both ends of a render
const FADE_SECONDS: f32 = 0.02;

/// Parameters describing one synthetic speaker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    /// Fundamental frequency in Hz
    pub pitch_hz: f32,
    /// Centre frequencies of the first three formants in Hz
    pub formants_hz: [f32; 3],
    /// Formant bandwidth in Hz
    #[serde(default = "default_bandwidth")]
    pub bandwidth_hz: f32,
    /// Breath noise level relative to the voiced part
    #[serde(default = "default_breathiness")]
    pub breathiness: f32,
    /// Output gain (peak amplitude before clipping)
    #[serde(default = "default_gain")]
    pub gain: f32,
    /// Vibrato depth as a fraction of the fundamental
    #[serde(default = "default_vibrato_depth")]
    pub vibrato_depth: f32,
}

fn default_bandwidth() -> f32 {
    180.0
}

fn default_breathiness() -> f32 {
    0.01
}

fn default_gain() -> f32 {
    0.5
}

fn default_vibrato_depth() -> f32 {
    0.01
}

impl VoiceProfile {
    /// Low-pitched speaker with dark formants
    pub fn low_voice() -> Self {
        Self {
            pitch_hz: 110.0,
            formants_hz: [600.0, 1_100.0, 2_400.0],
            bandwidth_hz: default_bandwidth(),
            breathiness: default_breathiness(),
            gain: default_gain(),
            vibrato_depth: default_vibrato_depth(),
        }
    }

    /// High-pitched, breathier speaker with bright formants
    pub fn high_voice() -> Self {
        Self {
            pitch_hz: 260.0,
            formants_hz: [900.0, 2_300.0, 3_600.0],
            bandwidth_hz: 260.0,
            breathiness: 0.25,
            gain: 0.25,
            vibrato_depth: 0.02,
        }
    }

    /// Same speaker, slightly different delivery (pitch ratio and gain)
    pub fn retake(&self, pitch_ratio: f32, gain_ratio: f32) -> Self {
        Self {
            pitch_hz: self.pitch_hz * pitch_ratio,
            gain: self.gain * gain_ratio,
            ..self.clone()
        }
    }

    fn harmonic_weight(&self, freq_hz: f32) -> f32 {
        let resonance: f32 = self
            .formants_hz
            .iter()
            .map(|&formant| {
                let x = (freq_hz - formant) / self.bandwidth_hz;
                (-x * x).exp()
            })
            .sum();
        // Glottal roll-off keeps some energy between formants
        resonance + 0.05 / (1.0 + freq_hz / 500.0)
    }
}

/// Render `seconds` of speech-like audio for `profile`
///
/// Output is deterministic for a given (profile, seconds, sample_rate, seed).
pub fn render_voice(profile: &VoiceProfile, seconds: f32, sample_rate: u32, seed: u64) -> Vec<f32> {
    let total = (seconds * sample_rate as f32).round() as usize;
    let sr = sample_rate as f32;
    let nyquist = sr / 2.0;

    let harmonics: Vec<(usize, f32)> = (1..=MAX_HARMONICS)
        .map(|k| (k, profile.harmonic_weight(k as f32 * profile.pitch_hz)))
        .filter(|&(k, _)| (k as f32 * profile.pitch_hz) < nyquist * 0.9)
        .collect();
    let norm: f32 = harmonics.iter().map(|&(_, w)| w).sum::<f32>().max(1e-6);

    let mut rng = StdRng::seed_from_u64(seed);
    let fade = (FADE_SECONDS * sr) as usize;
    let mut phase = 0.0f32;
    let mut out = Vec::with_capacity(total);

    for n in 0..total {
        let t = n as f32 / sr;
        let vibrato = 1.0 + profile.vibrato_depth * (2.0 * PI * 5.0 * t).sin();
        phase += 2.0 * PI * profile.pitch_hz * vibrato / sr;
        if phase > 2.0 * PI {
            phase -= 2.0 * PI;
        }

        let voiced: f32 = harmonics
            .iter()
            .map(|&(k, weight)| weight * (k as f32 * phase).sin())
            .sum::<f32>()
            / norm;

        let syllable = (PI * SYLLABLE_RATE_HZ * t).sin();
        let envelope = 0.55 + 0.45 * syllable * syllable;
        let edge = if n < fade {
            n as f32 / fade as f32
        } else if total - n <= fade {
            (total - n) as f32 / fade as f32
        } else {
            1.0
        };

        let noise = profile.breathiness * rng.gen_range(-1.0f32..1.0);
        let value = profile.gain * edge * envelope * (voiced + noise);
        out.push(value.clamp(-1.0, 1.0));
    }

    out
}

/// Pure tone, used for spectral feature checks
pub fn sine(frequency_hz: f32, seconds: f32, sample_rate: u32, amplitude: f32) -> Vec<f32> {
    let total = (seconds * sample_rate as f32).round() as usize;
    (0..total)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            amplitude * (2.0 * PI * frequency_hz * t).sin()
        })
        .collect()
}

/// Uniform white noise in [-amplitude, amplitude]
pub fn white_noise(samples: usize, amplitude: f32, seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..samples)
        .map(|_| amplitude * rng.gen_range(-1.0f32..1.0))
        .collect()
}

/// All-zero recording
pub fn silence(seconds: f32, sample_rate: u32) -> Vec<f32> {
    vec![0.0; (seconds * sample_rate as f32).round() as usize]
}

/// Encode mono samples as a 16-bit PCM WAV container in memory
pub fn encode_wav_i16(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, hound::Error> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            writer.write_sample(to_i16(sample))?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// Write mono samples as a 16-bit PCM WAV file
pub fn write_wav_i16<P: AsRef<Path>>(
    path: P,
    samples: &[f32],
    sample_rate: u32,
) -> Result<(), hound::Error> {
    let bytes = encode_wav_i16(samples, sample_rate)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

fn to_i16(sample: f32) -> i16 {
    let clamped = sample.clamp(-1.0, 1.0);
    if clamped < 0.0 {
        (clamped * 32_768.0) as i16
    } else {
        (clamped * 32_767.0) as i16
    }
}
