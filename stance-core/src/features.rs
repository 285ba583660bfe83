//! Post features handed to the scorer
//!
//! Collaborator data enters the engine here. Deserialization is lenient:
//! missing or `null` fields take their defaults, a `text` that is not a
//! string reads as empty and negative counters are clamped to zero, so a
//! malformed record degrades to a neutral post instead of failing the
//! whole batch.

use serde::{Deserialize, Serialize};

/// Entities attached to a post
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entities {
    #[serde(default, deserialize_with = "null_as_default")]
    pub mentions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hashtags: Vec<String>,
}

/// Engagement counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawMetrics")]
pub struct Metrics {
    pub repost_count: u64,
    pub like_count: u64,
    pub reply_count: u64,
}

#[derive(Deserialize)]
struct RawMetrics {
    #[serde(default)]
    repost_count: Option<i64>,
    #[serde(default)]
    like_count: Option<i64>,
    #[serde(default)]
    reply_count: Option<i64>,
}

impl From<RawMetrics> for Metrics {
    fn from(raw: RawMetrics) -> Self {
        let count = |v: Option<i64>| v.unwrap_or(0).max(0) as u64;
        Self {
            repost_count: count(raw.repost_count),
            like_count: count(raw.like_count),
            reply_count: count(raw.reply_count),
        }
    }
}

/// Everything the scorer knows about a single post
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawPostFeatures")]
pub struct PostFeatures {
    pub text: String,
    pub entities: Entities,
    pub metrics: Metrics,
    /// Length of `text` in characters
    pub text_length: usize,
}

#[derive(Deserialize)]
struct RawPostFeatures {
    #[serde(default, deserialize_with = "lenient_text")]
    text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    entities: Entities,
    #[serde(default, deserialize_with = "null_as_default")]
    metrics: Metrics,
}

impl From<RawPostFeatures> for PostFeatures {
    fn from(raw: RawPostFeatures) -> Self {
        Self::new(raw.text)
            .with_entities(raw.entities)
            .with_metrics(raw.metrics)
    }
}

impl PostFeatures {
    /// Features for a bare text with no entities or engagement
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let text_length = text.chars().count();
        Self {
            text,
            entities: Entities::default(),
            metrics: Metrics::default(),
            text_length,
        }
    }

    pub fn with_entities(mut self, entities: Entities) -> Self {
        self.entities = entities;
        self
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// True when the text carries no characters besides whitespace
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

impl From<&str> for PostFeatures {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Read a post text, taking `null` or any non-string value as `""`
pub fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Text {
        Str(String),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Text::deserialize(deserializer)? {
        Text::Str(text) => text,
        Text::Other(_) => String::new(),
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
