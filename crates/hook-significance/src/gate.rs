//! Threshold gate.

/// Minimum score for a session to be queued. Inclusive.
pub const SIGNIFICANCE_THRESHOLD: f64 = 5.0;

/// Whether a score clears the default threshold.
pub fn passes(score: f64) -> bool {
    passes_threshold(score, SIGNIFICANCE_THRESHOLD)
}

pub fn passes_threshold(score: f64, threshold: f64) -> bool {
    score >= threshold
}
