//! Per-post stance classification
//!
//! Combines the component scores with the configured weights, clamps the
//! result to `[-1, 1]` and maps it to a label through the neutral deadband.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::config::{Component, StanceWeights, Thresholds};
use crate::lexicon::KeywordMatches;
use crate::scorer::FeatureScorer;
use crate::PostFeatures;

/// Score of each computed component, keyed by component
pub type ComponentScores = BTreeMap<Component, f64>;

/// Stance label of a post or a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stance {
    SideA,
    SideB,
    Neutral,
    /// Only used for users with no posts
    Unknown,
}

impl Stance {
    /// Label for a combined score
    pub fn from_score(score: f64, deadband: f64) -> Self {
        if score > deadband {
            Stance::SideA
        } else if score < -deadband {
            Stance::SideB
        } else {
            Stance::Neutral
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stance::SideA => "side_a",
            Stance::SideB => "side_b",
            Stance::Neutral => "neutral",
            Stance::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Stance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a single post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StanceVerdict {
    pub stance: Stance,
    /// Weighted score clamped to `[-1, 1]`
    pub score: f64,
    pub component_scores: ComponentScores,
    pub matched_keywords: KeywordMatches,
}

/// Turns post features into a labelled, signed score
#[derive(Clone)]
pub struct StanceClassifier {
    scorer: FeatureScorer,
    weights: StanceWeights,
    thresholds: Thresholds,
}

impl StanceClassifier {
    pub fn new(scorer: FeatureScorer, weights: StanceWeights, thresholds: Thresholds) -> Self {
        Self {
            scorer,
            weights,
            thresholds,
        }
    }

    pub fn scorer(&self) -> &FeatureScorer {
        &self.scorer
    }

    /// Classify one post
    pub fn analyze_stance(&self, post: &PostFeatures) -> StanceVerdict {
        let matched_keywords = self.scorer.keyword_matches(post);

        let mut component_scores = ComponentScores::new();
        component_scores.insert(
            Component::KeywordRatio,
            self.scorer.keyword_score_from(&matched_keywords),
        );
        component_scores.insert(Component::Sentiment, self.scorer.sentiment_score(post));

        let score = self.combine(&component_scores);

        StanceVerdict {
            stance: self.label(score),
            score,
            component_scores,
            matched_keywords,
        }
    }

    /// Weighted sum of the computed components, clamped to `[-1, 1]`
    pub fn combine(&self, scores: &ComponentScores) -> f64 {
        scores
            .iter()
            .map(|(component, score)| score * self.weights.get(*component))
            .sum::<f64>()
            .clamp(-1.0, 1.0)
    }

    pub fn label(&self, score: f64) -> Stance {
        Stance::from_score(score, self.thresholds.deadband)
    }
}
