//! Stance analyzer
//!
//! Entry point of the engine. Owns the compiled lexicon and configuration,
//! both read-only after construction, and exposes per-post and per-user
//! analysis.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, trace};

use crate::aggregate::{aggregate, PostAnalysis, UserAnalysis};
use crate::classifier::{ComponentScores, Stance, StanceClassifier, StanceVerdict};
use crate::config::{ConfidenceConfig, StanceConfig};
use crate::confidence::compute_confidence;
use crate::highlight::{highlight_keywords, Markers};
use crate::lexicon::{Lexicon, Side};
use crate::polarity::SharedPolarity;
use crate::scorer::FeatureScorer;
use crate::{PostFeatures, Result};

/// Result of analyzing a single free-standing text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostVerdict {
    pub stance: Stance,
    pub score: f64,
    /// Always 1.0: a single score has no spread
    pub confidence: f64,
    pub details: ComponentScores,
}

/// Heuristic stance analyzer over a fixed lexicon and weights
#[derive(Clone)]
pub struct StanceAnalyzer {
    classifier: StanceClassifier,
    lexicon: Arc<Lexicon>,
    confidence: ConfidenceConfig,
    markers: Markers,
}

impl StanceAnalyzer {
    /// Validate `config`, compile the lexicon and wire the scorer
    pub fn new(config: StanceConfig, polarity: SharedPolarity) -> Result<Self> {
        config.validate()?;

        let lexicon = Arc::new(Lexicon::from_config(&config.lexicon)?);
        let markers = Markers::from(&config.highlight);
        let scorer = FeatureScorer::new(lexicon.clone(), config.sentiment, polarity);
        let classifier = StanceClassifier::new(scorer, config.weights, config.thresholds);

        debug!(
            "Stance analyzer ready: {} keywords ({} / {})",
            lexicon.len(),
            lexicon.label(Side::A),
            lexicon.label(Side::B)
        );

        Ok(Self {
            classifier,
            lexicon,
            confidence: config.confidence,
            markers,
        })
    }

    /// Use different markers for `highlighted_text`
    pub fn with_markers(mut self, markers: Markers) -> Self {
        self.markers = markers;
        self
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn classifier(&self) -> &StanceClassifier {
        &self.classifier
    }

    /// Display label for a stance
    pub fn label(&self, stance: Stance) -> &str {
        match stance {
            Stance::SideA => self.lexicon.label(Side::A),
            Stance::SideB => self.lexicon.label(Side::B),
            Stance::Neutral => "neutral/unclear",
            Stance::Unknown => "unknown",
        }
    }

    pub fn keyword_score(&self, post: &PostFeatures) -> f64 {
        self.classifier.scorer().keyword_score(post)
    }

    pub fn sentiment_score(&self, post: &PostFeatures) -> f64 {
        self.classifier.scorer().sentiment_score(post)
    }

    /// Classify one post
    pub fn analyze_stance(&self, post: &PostFeatures) -> StanceVerdict {
        self.classifier.analyze_stance(post)
    }

    /// Classify a raw text with no entities or engagement data
    pub fn analyze_post(&self, text: &str) -> PostVerdict {
        let verdict = self.analyze_stance(&PostFeatures::new(text));
        PostVerdict {
            stance: verdict.stance,
            score: verdict.score,
            confidence: 1.0,
            details: verdict.component_scores,
        }
    }

    /// Confidence over a set of post scores
    pub fn compute_confidence(&self, scores: &[f64]) -> f64 {
        compute_confidence(scores, &self.confidence)
    }

    /// Classify every post in order and aggregate per user
    pub fn analyze_user(&self, posts: &[PostFeatures]) -> UserAnalysis {
        let post_analyses: Vec<PostAnalysis> = posts
            .iter()
            .map(|post| {
                let verdict = self.analyze_stance(post);
                if !verdict.matched_keywords.is_empty() {
                    trace!(
                        "Keywords a={:?} b={:?} -> {} ({:.3})",
                        verdict.matched_keywords.side_a,
                        verdict.matched_keywords.side_b,
                        verdict.stance,
                        verdict.score
                    );
                }
                let highlighted = self.highlight(&post.text);
                PostAnalysis::new(verdict, post.text.clone(), highlighted)
            })
            .collect();

        let analysis = aggregate(post_analyses, &self.confidence);
        debug!(
            "Analyzed {} posts: {} (confidence {:.3}, average {:.3})",
            analysis.post_count(),
            analysis.stance,
            analysis.confidence,
            analysis.average_score
        );
        analysis
    }

    /// Mark lexicon matches in `text` for display
    pub fn highlight(&self, text: &str) -> String {
        highlight_keywords(&self.lexicon, text, &self.markers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Component;
    use crate::polarity::{NeutralPolarity, PolarityError, PolarityProvider};

    struct FixedPolarity(f64);

    impl PolarityProvider for FixedPolarity {
        fn name(&self) -> &str {
            "fixed"
        }

        fn polarity(&self, _text: &str) -> std::result::Result<f64, PolarityError> {
            Ok(self.0)
        }
    }

    /// Fails on texts containing "boom"
    struct FlakyPolarity;

    impl PolarityProvider for FlakyPolarity {
        fn name(&self) -> &str {
            "flaky"
        }

        fn polarity(&self, text: &str) -> std::result::Result<f64, PolarityError> {
            if text.contains("boom") {
                Err(PolarityError::Provider("boom".to_string()))
            } else {
                Ok(0.5)
            }
        }
    }

    fn analyzer(polarity: SharedPolarity) -> StanceAnalyzer {
        StanceAnalyzer::new(StanceConfig::default(), polarity).unwrap()
    }

    #[test]
    fn test_reference_example() {
        let analyzer = analyzer(Arc::new(NeutralPolarity));
        let post = PostFeatures::new("Stand with Israel against Hamas terrorism");

        // a: israel, stand with israel, terrorism; b: hamas
        assert!((analyzer.keyword_score(&post) - 0.5).abs() < 1e-9);
        // flat polarity falls back to a quarter of the context balance
        assert!((analyzer.sentiment_score(&post) - 0.125).abs() < 1e-9);

        let verdict = analyzer.analyze_stance(&post);
        assert!((verdict.score - (0.7 * 0.5 + 0.3 * 0.125)).abs() < 1e-9);
        assert_eq!(verdict.stance, Stance::SideA);
        assert_eq!(verdict.matched_keywords.side_b, vec!["hamas"]);
    }

    #[test]
    fn test_empty_text_post() {
        let verdict = analyzer(Arc::new(FixedPolarity(0.9))).analyze_post("");
        assert_eq!(verdict.stance, Stance::Neutral);
        assert_eq!(verdict.score, 0.0);
        assert_eq!(verdict.confidence, 1.0);
        assert_eq!(verdict.details[&Component::KeywordRatio], 0.0);
        assert_eq!(verdict.details[&Component::Sentiment], 0.0);
    }

    #[test]
    fn test_no_keywords_means_no_signal() {
        let analyzer = analyzer(Arc::new(FixedPolarity(-1.0)));
        let post = PostFeatures::new("Had a great lunch today");
        assert_eq!(analyzer.keyword_score(&post), 0.0);
        assert_eq!(analyzer.sentiment_score(&post), 0.0);
    }

    #[test]
    fn test_analyze_user_empty() {
        let analysis = analyzer(Arc::new(NeutralPolarity)).analyze_user(&[]);
        assert_eq!(analysis.stance, Stance::Unknown);
        assert_eq!(analysis.confidence, 0.0);
        assert_eq!(analysis.average_score, 0.0);
        assert!(analysis.stance_distribution.is_empty());
        assert!(analysis.post_analyses.is_empty());
    }

    #[test]
    fn test_analyze_user_preserves_order_and_text() {
        let analyzer = analyzer(Arc::new(FixedPolarity(0.3)));
        let posts = vec![
            PostFeatures::new("Ceasefire now! Free Palestine 🇵🇸"),
            PostFeatures::new("Thinking of the hostages,\nbring them home 🇮🇱"),
            PostFeatures::new("Had a great lunch today"),
        ];
        let analysis = analyzer.analyze_user(&posts);

        assert_eq!(analysis.post_count(), 3);
        assert_eq!(analysis.post_analyses[0].stance, Stance::SideB);
        assert_eq!(analysis.post_analyses[1].stance, Stance::SideA);
        assert_eq!(analysis.post_analyses[2].stance, Stance::Neutral);
        assert_eq!(analysis.post_analyses[1].text, posts[1].text);
        assert!(!analysis.post_analyses[1].highlighted_text.contains('\n'));
        assert!(analysis.post_analyses[1].highlighted_text.contains("<span"));
        assert_eq!(analysis.stance, Stance::Neutral);
        assert_eq!(analysis.stance_distribution.len(), 3);
    }

    #[test]
    fn test_order_invariant_aggregates() {
        let analyzer = analyzer(Arc::new(FixedPolarity(0.3)));
        let posts = vec![
            PostFeatures::new("Free Palestine"),
            PostFeatures::new("Gaza ceasefire now"),
            PostFeatures::new("Stand with Israel"),
            PostFeatures::new("nothing to see"),
        ];
        let mut reversed = posts.clone();
        reversed.reverse();

        let a = analyzer.analyze_user(&posts);
        let b = analyzer.analyze_user(&reversed);
        assert_eq!(a.stance, b.stance);
        assert_eq!(a.stance_distribution, b.stance_distribution);
        assert_eq!(a.average_score, b.average_score);
        assert_eq!(a.confidence, b.confidence);
        assert_eq!(a.post_analyses[0].text, "Free Palestine");
        assert_eq!(b.post_analyses[0].text, "nothing to see");
    }

    #[test]
    fn test_provider_failure_isolated_per_post() {
        let analyzer = analyzer(Arc::new(FlakyPolarity));
        let posts = vec![
            PostFeatures::new("israel boom"),
            PostFeatures::new("israel"),
        ];
        let analysis = analyzer.analyze_user(&posts);

        assert_eq!(analysis.post_count(), 2);
        let failed = &analysis.post_analyses[0].component_scores;
        let ok = &analysis.post_analyses[1].component_scores;
        // flat fallback is skipped because the provider never produced a value
        assert_eq!(failed[&Component::Sentiment], 0.0);
        assert!(ok[&Component::Sentiment] > 0.0);
    }

    #[test]
    fn test_labels() {
        let analyzer = analyzer(Arc::new(NeutralPolarity));
        assert_eq!(analyzer.label(Stance::SideA), "pro-Israeli");
        assert_eq!(analyzer.label(Stance::SideB), "pro-Palestinian");
        assert_eq!(analyzer.label(Stance::Neutral), "neutral/unclear");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = StanceConfig::default();
        config.weights.sentiment = f64::NAN;
        assert!(StanceAnalyzer::new(config, Arc::new(NeutralPolarity)).is_err());
    }

    #[test]
    fn test_compute_confidence_uses_config() {
        let analyzer = analyzer(Arc::new(NeutralPolarity));
        assert_eq!(analyzer.compute_confidence(&[]), 0.0);
        assert_eq!(analyzer.compute_confidence(&[0.4]), 1.0);
    }
}
