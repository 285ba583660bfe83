//! Sentiment polarity provider seam
//!
//! The engine treats polarity as an opaque collaborator returning a value
//! in `[-1, 1]`. Providers are shared read-only across calls.

use std::sync::Arc;
use thiserror::Error;

/// Errors from a polarity provider
#[derive(Debug, Error)]
pub enum PolarityError {
    #[error("Polarity provider failed: {0}")]
    Provider(String),

    #[error("Polarity out of range: {0}")]
    OutOfRange(f64),
}

/// Returns a polarity in `[-1, 1]` for a piece of text
pub trait PolarityProvider: Send + Sync {
    /// Provider name for diagnostics
    fn name(&self) -> &str;

    /// Polarity of `text`; negative is unfavourable, positive favourable
    fn polarity(&self, text: &str) -> Result<f64, PolarityError>;
}

/// Thread-safe reference to a polarity provider
pub type SharedPolarity = Arc<dyn PolarityProvider>;

/// Provider that reports every text as neutral
#[derive(Debug, Clone, Copy, Default)]
pub struct NeutralPolarity;

impl PolarityProvider for NeutralPolarity {
    fn name(&self) -> &str {
        "neutral"
    }

    fn polarity(&self, _text: &str) -> Result<f64, PolarityError> {
        Ok(0.0)
    }
}

/// Reject values a provider should never return
pub(crate) fn checked_polarity(value: f64) -> Result<f64, PolarityError> {
    if value.is_finite() && (-1.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(PolarityError::OutOfRange(value))
    }
}
