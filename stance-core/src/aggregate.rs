//! Per-user aggregation of post verdicts

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::classifier::{ComponentScores, Stance, StanceVerdict};
use crate::confidence::{compute_confidence, mean, round3};
use crate::config::ConfidenceConfig;
use crate::lexicon::KeywordMatches;

/// Analysis of one post, as stored in a [`UserAnalysis`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostAnalysis {
    pub stance: Stance,
    pub score: f64,
    pub component_scores: ComponentScores,
    pub text: String,
    pub highlighted_text: String,
    #[serde(default)]
    pub matched_keywords: KeywordMatches,
}

impl PostAnalysis {
    pub fn new(verdict: StanceVerdict, text: String, highlighted_text: String) -> Self {
        Self {
            stance: verdict.stance,
            score: verdict.score,
            component_scores: verdict.component_scores,
            text,
            highlighted_text,
            matched_keywords: verdict.matched_keywords,
        }
    }
}

/// Share of posts per label. Only labels that occurred are present.
pub type StanceDistribution = BTreeMap<Stance, f64>;

/// Overall stance of a user across their posts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAnalysis {
    pub stance: Stance,
    pub confidence: f64,
    pub average_score: f64,
    pub stance_distribution: StanceDistribution,
    pub post_analyses: Vec<PostAnalysis>,
}

impl UserAnalysis {
    /// Result for a user with no posts
    pub fn unknown() -> Self {
        Self {
            stance: Stance::Unknown,
            confidence: 0.0,
            average_score: 0.0,
            stance_distribution: StanceDistribution::new(),
            post_analyses: Vec::new(),
        }
    }

    pub fn post_count(&self) -> usize {
        self.post_analyses.len()
    }
}

/// Fold post analyses into a user analysis.
///
/// Aggregate values do not depend on the order of `post_analyses`; the
/// order is kept as given in the output.
pub fn aggregate(post_analyses: Vec<PostAnalysis>, config: &ConfidenceConfig) -> UserAnalysis {
    let total = post_analyses.len();
    if total == 0 {
        return UserAnalysis::unknown();
    }

    let mut counts: BTreeMap<Stance, usize> = BTreeMap::new();
    for analysis in &post_analyses {
        *counts.entry(analysis.stance).or_insert(0) += 1;
    }

    let stance_distribution = counts
        .iter()
        .map(|(stance, count)| (*stance, round3(*count as f64 / total as f64)))
        .collect();

    let scores: Vec<f64> = post_analyses.iter().map(|a| a.score).collect();

    UserAnalysis {
        stance: majority_stance(&counts),
        confidence: compute_confidence(&scores, config),
        average_score: round3(mean(&scores).unwrap_or(0.0)),
        stance_distribution,
        post_analyses,
    }
}

/// Label with strictly the highest count; any tie at the top is neutral
fn majority_stance(counts: &BTreeMap<Stance, usize>) -> Stance {
    let top = counts.values().copied().max().unwrap_or(0);
    let mut leaders = counts.iter().filter(|(_, c)| **c == top).map(|(s, _)| *s);
    match (leaders.next(), leaders.next()) {
        (Some(stance), None) => stance,
        _ => Stance::Neutral,
    }
}
