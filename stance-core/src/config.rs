//! Immutable engine configuration
//!
//! Loaded from TOML. Every section falls back to the built-in defaults, so
//! a custom file only needs the keys it overrides. The `[lexicon]` section is
//! the exception: when present it must define both sides.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use crate::lexicon::MatchMode;
use crate::{Result, StanceError};

static EMBEDDED_LEXICON: LazyLock<LexiconConfig> = LazyLock::new(|| {
    toml::from_str(include_str!("../config/lexicon.toml")).expect("embedded lexicon is valid TOML")
});

/// Full configuration for a [`crate::StanceAnalyzer`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StanceConfig {
    pub lexicon: LexiconConfig,
    pub weights: StanceWeights,
    pub thresholds: Thresholds,
    pub confidence: ConfidenceConfig,
    pub sentiment: SentimentConfig,
    pub highlight: HighlightConfig,
}

impl StanceConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        self.lexicon.validate()?;
        self.weights.validate()?;
        self.thresholds.validate()?;
        self.confidence.validate()?;
        self.sentiment.validate()
    }
}

/// Keyword sets for both sides
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconConfig {
    pub side_a: SideLexicon,
    pub side_b: SideLexicon,
}

impl LexiconConfig {
    pub fn new(side_a: SideLexicon, side_b: SideLexicon) -> Self {
        Self { side_a, side_b }
    }
}

impl Default for LexiconConfig {
    fn default() -> Self {
        EMBEDDED_LEXICON.clone()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SideLexicon {
    pub label: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl SideLexicon {
    pub fn new(label: &str, keywords: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Named sub-signals that may contribute to a post score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    KeywordRatio,
    Sentiment,
    HashtagUsage,
    Engagement,
    MentionPatterns,
    ContentLength,
}

impl Component {
    pub const ALL: [Component; 6] = [
        Component::KeywordRatio,
        Component::Sentiment,
        Component::HashtagUsage,
        Component::Engagement,
        Component::MentionPatterns,
        Component::ContentLength,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Component::KeywordRatio => "keyword_ratio",
            Component::Sentiment => "sentiment",
            Component::HashtagUsage => "hashtag_usage",
            Component::Engagement => "engagement",
            Component::MentionPatterns => "mention_patterns",
            Component::ContentLength => "content_length",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-component weights. They need not sum to 1; the combined score is clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StanceWeights {
    pub keyword_ratio: f64,
    pub sentiment: f64,
    pub hashtag_usage: f64,
    pub engagement: f64,
    pub mention_patterns: f64,
    pub content_length: f64,
}

impl Default for StanceWeights {
    fn default() -> Self {
        Self {
            keyword_ratio: 0.7,
            sentiment: 0.3,
            hashtag_usage: 0.0,
            engagement: 0.0,
            mention_patterns: 0.0,
            content_length: 0.0,
        }
    }
}

impl StanceWeights {
    pub fn get(&self, component: Component) -> f64 {
        match component {
            Component::KeywordRatio => self.keyword_ratio,
            Component::Sentiment => self.sentiment,
            Component::HashtagUsage => self.hashtag_usage,
            Component::Engagement => self.engagement,
            Component::MentionPatterns => self.mention_patterns,
            Component::ContentLength => self.content_length,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for component in Component::ALL {
            let value = self.get(component);
            if !value.is_finite() || value < 0.0 {
                return Err(StanceError::InvalidWeight {
                    component: component.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Label thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Scores within `[-deadband, deadband]` are labelled neutral
    pub deadband: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            deadband: crate::DEFAULT_DEADBAND,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<()> {
        check_range("deadband", self.deadband, 0.0, 1.0, false)
    }
}

/// Blend of the three confidence signals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    /// Weight of the mean absolute score
    pub magnitude_weight: f64,
    /// Weight of the share of strong posts
    pub strong_ratio_weight: f64,
    /// Weight of `1 - stdev`
    pub consistency_weight: f64,
    /// Absolute score above which a post counts as strong
    pub strong_post_threshold: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            magnitude_weight: 0.5,
            strong_ratio_weight: 0.3,
            consistency_weight: 0.2,
            strong_post_threshold: crate::DEFAULT_STRONG_POST_THRESHOLD,
        }
    }
}

impl ConfidenceConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("magnitude_weight", self.magnitude_weight),
            ("strong_ratio_weight", self.strong_ratio_weight),
            ("consistency_weight", self.consistency_weight),
        ] {
            check_non_negative(name, value)?;
        }
        check_range("strong_post_threshold", self.strong_post_threshold, 0.0, 1.0, true)
    }
}

/// Sentiment sub-score tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    /// Slope of the `tanh` compression applied to raw polarity
    pub compression: f64,
    /// Matching rule used when counting lexicon hits for the sentiment context
    pub match_mode: MatchMode,
    pub symbol_boost: f64,
    pub emotion_boost: f64,
    pub symbols: Vec<String>,
    pub emotion_terms: Vec<String>,
    /// Below this compressed sentiment the fallback nudge may apply
    pub fallback_sentiment_floor: f64,
    /// Below this base score the fallback nudge may apply
    pub fallback_base_floor: f64,
    pub fallback_nudge: f64,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        let strings = |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
        Self {
            compression: crate::DEFAULT_COMPRESSION,
            match_mode: MatchMode::Substring,
            symbol_boost: 0.15,
            emotion_boost: 0.25,
            symbols: strings(&["🕎", "🇮🇱", "🇵🇸", "✡️", "💔", "🙏🏼", "🕯️"]),
            emotion_terms: strings(&[
                "terrorist",
                "hostage",
                "massacre",
                "slaughter",
                "freedom",
                "genocide",
            ]),
            fallback_sentiment_floor: 0.1,
            fallback_base_floor: 0.2,
            fallback_nudge: 0.25,
        }
    }
}

impl SentimentConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("compression", self.compression),
            ("symbol_boost", self.symbol_boost),
            ("emotion_boost", self.emotion_boost),
            ("fallback_sentiment_floor", self.fallback_sentiment_floor),
            ("fallback_base_floor", self.fallback_base_floor),
            ("fallback_nudge", self.fallback_nudge),
        ] {
            check_non_negative(name, value)?;
        }
        Ok(())
    }
}

/// Colours used by the HTML highlighter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub side_a_color: String,
    pub side_b_color: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            side_a_color: "#1f77b4".to_string(),
            side_b_color: "#ff7f0e".to_string(),
        }
    }
}

fn check_non_negative(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(StanceError::InvalidThreshold { name, value })
    }
}

fn check_range(name: &'static str, value: f64, min: f64, max: f64, inclusive: bool) -> Result<()> {
    let below_max = if inclusive { value <= max } else { value < max };
    if value.is_finite() && value >= min && below_max {
        Ok(())
    } else {
        Err(StanceError::InvalidThreshold { name, value })
    }
}
