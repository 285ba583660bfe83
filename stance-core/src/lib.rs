//! Stance Core - heuristic stance scoring engine
//!
//! Classifies social media posts as leaning toward one of two sides or
//! neutral, then aggregates the verdicts per user:
//! - Keyword lexicon with whole-word and symbol matching
//! - Keyword and sentiment sub-scores per post
//! - Weighted combination with a neutral deadband
//! - Confidence over a set of post scores
//! - Per-user stance distribution and overall stance
//! - Keyword highlighting for display
//!
//! All configuration is an immutable [`StanceConfig`] passed to
//! [`StanceAnalyzer::new`]. The engine performs no I/O.

pub mod aggregate;
pub mod analyzer;
pub mod classifier;
pub mod confidence;
pub mod config;
pub mod error;
pub mod features;
pub mod highlight;
pub mod lexicon;
pub mod polarity;
pub mod scorer;

pub use aggregate::*;
pub use analyzer::*;
pub use classifier::*;
pub use confidence::*;
pub use config::*;
pub use error::*;
pub use features::*;
pub use highlight::*;
pub use lexicon::*;
pub use polarity::*;
pub use scorer::*;

/// Half-width of the neutral band around a zero score
pub const DEFAULT_DEADBAND: f64 = 0.2;

/// Absolute score above which a post counts as strong for confidence
pub const DEFAULT_STRONG_POST_THRESHOLD: f64 = 0.4;

/// Slope of the `tanh` compression of raw polarity
pub const DEFAULT_COMPRESSION: f64 = 2.5;
