//! Error types for the stance engine

use thiserror::Error;

/// Errors raised while building or running the stance engine
#[derive(Debug, Error)]
pub enum StanceError {
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Keyword '{0}' is listed for both sides")]
    OverlappingKeyword(String),

    #[error("Empty keyword in {0} lexicon")]
    EmptyKeyword(&'static str),

    #[error("Invalid keyword pattern '{keyword}': {source}")]
    Pattern {
        keyword: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid weight for {component}: {value}")]
    InvalidWeight { component: String, value: f64 },

    #[error("Invalid threshold {name}: {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("Need at least {needed} samples, got {got}")]
    InsufficientSamples { needed: usize, got: usize },
}

pub type Result<T> = std::result::Result<T, StanceError>;
