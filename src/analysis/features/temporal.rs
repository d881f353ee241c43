// Temporal module - Time-domain feature extraction
//
// Features computed directly on the raw (unwindowed) frame samples.

/// Compute zero-crossing rate (ZCR)
///
/// Counts sign changes between consecutive samples and normalises by the
/// frame length. Zero is treated as positive, so silence has no crossings.
///
/// # Returns
/// Crossings per sample, in [0, 1)
pub fn compute_zcr(frame: &[f32]) -> f32 {
    if frame.len() < 2 {
        return 0.0;
    }

    let crossings = frame
        .windows(2)
        .filter(|pair| (pair[0] >= 0.0) != (pair[1] >= 0.0))
        .count();

    crossings as f32 / frame.len() as f32
}

/// Compute root-mean-square energy of the frame
pub fn compute_rms(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = frame.iter().map(|&x| (x as f64) * (x as f64)).sum();
    (sum_squares / frame.len() as f64).sqrt() as f32
}
