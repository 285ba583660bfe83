//! Confidence over a set of post scores
//!
//! Not a probability. It measures how strongly and how consistently a set
//! of scores leans one way, blending:
//! - the mean absolute score
//! - the share of strong posts
//! - one minus the sample standard deviation

use crate::config::ConfidenceConfig;
use crate::{Result, StanceError};

/// Confidence in `[0, 1]`, rounded to three decimals.
///
/// No scores gives 0.0 and a single score gives 1.0, since spread is
/// undefined below two samples.
pub fn compute_confidence(scores: &[f64], config: &ConfidenceConfig) -> f64 {
    match scores {
        [] => 0.0,
        [_] => 1.0,
        [_, _, ..] => {
            let n = scores.len();
            let abs_mean = scores.iter().map(|s| s.abs()).sum::<f64>() / n as f64;
            let strong = scores
                .iter()
                .filter(|s| s.abs() > config.strong_post_threshold)
                .count();
            let strong_ratio = strong as f64 / n as f64;
            let spread = std_dev_of(scores);

            let confidence = config.magnitude_weight * abs_mean
                + config.strong_ratio_weight * strong_ratio
                + config.consistency_weight * (1.0 - spread);

            round3(confidence.clamp(0.0, 1.0))
        }
    }
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation (n - 1 denominator)
pub fn sample_std_dev(values: &[f64]) -> Result<f64> {
    let n = values.len();
    if n < 2 {
        return Err(StanceError::InsufficientSamples { needed: 2, got: n });
    }
    Ok(std_dev_of(values))
}

// Callers guarantee at least two values
fn std_dev_of(values: &[f64]) -> f64 {
    let n = values.len();
    let m = values.iter().sum::<f64>() / n as f64;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}

/// Round half away from zero to three decimals
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
