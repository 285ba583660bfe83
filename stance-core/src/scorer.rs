//! Per-post feature scoring
//!
//! Two directional sub-scores in `[-1, 1]` (positive leans to side A):
//! - **keyword_ratio**: balance of distinct whole-word lexicon hits
//! - **sentiment**: compressed polarity, signed by the keyword context
//!
//! Sentiment never creates a direction on its own. Without lexicon hits
//! it is zero regardless of polarity.

use std::sync::Arc;
use tracing::warn;

use crate::config::SentimentConfig;
use crate::lexicon::{KeywordMatches, Lexicon, MatchMode};
use crate::polarity::{checked_polarity, SharedPolarity};
use crate::PostFeatures;

/// Computes the component scores of a single post
#[derive(Clone)]
pub struct FeatureScorer {
    lexicon: Arc<Lexicon>,
    sentiment: SentimentConfig,
    polarity: SharedPolarity,
}

impl FeatureScorer {
    pub fn new(lexicon: Arc<Lexicon>, sentiment: SentimentConfig, polarity: SharedPolarity) -> Self {
        let sentiment = SentimentConfig {
            symbols: lowercase_all(&sentiment.symbols),
            emotion_terms: lowercase_all(&sentiment.emotion_terms),
            ..sentiment
        };
        Self {
            lexicon,
            sentiment,
            polarity,
        }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Distinct whole-word lexicon hits, per side
    pub fn keyword_matches(&self, post: &PostFeatures) -> KeywordMatches {
        self.lexicon.find_matches(&post.text, MatchMode::WordBoundary)
    }

    /// `(a - b) / (a + b)` over distinct hits, 0.0 when nothing matched
    pub fn keyword_score(&self, post: &PostFeatures) -> f64 {
        self.keyword_score_from(&self.keyword_matches(post))
    }

    pub(crate) fn keyword_score_from(&self, matches: &KeywordMatches) -> f64 {
        matches.balance().unwrap_or(0.0).clamp(-1.0, 1.0)
    }

    /// Polarity scaled by `tanh`, boosted by charged symbols and terms, and
    /// signed by the keyword balance of the post
    pub fn sentiment_score(&self, post: &PostFeatures) -> f64 {
        let text = post.text.trim().to_lowercase();
        if text.is_empty() {
            return 0.0;
        }

        let Some(context_balance) = self
            .lexicon
            .find_matches(&text, self.sentiment.match_mode)
            .balance()
        else {
            return 0.0;
        };

        let raw = match self.polarity.polarity(&text).and_then(checked_polarity) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Polarity provider {} failed, sentiment set to 0: {}", self.polarity.name(), e);
                return 0.0;
            }
        };
        let scaled = (self.sentiment.compression * raw).tanh();

        let symbol_boost = if contains_any(&text, &self.sentiment.symbols) {
            self.sentiment.symbol_boost
        } else {
            0.0
        };
        let emotion_boost = if contains_any(&text, &self.sentiment.emotion_terms) {
            self.sentiment.emotion_boost
        } else {
            0.0
        };

        let mut score = context_balance * (scaled + symbol_boost + emotion_boost);

        // Keep a directional lean for keyword-bearing posts with flat sentiment
        if scaled.abs() < self.sentiment.fallback_sentiment_floor
            && score.abs() < self.sentiment.fallback_base_floor
        {
            score += context_balance * self.sentiment.fallback_nudge;
        }

        score.clamp(-1.0, 1.0)
    }
}

fn lowercase_all(items: &[String]) -> Vec<String> {
    items.iter().map(|s| s.to_lowercase()).collect()
}

fn contains_any(text: &str, needles: &[String]) -> bool {
    needles.iter().any(|n| !n.is_empty() && text.contains(n.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LexiconConfig, SideLexicon};
    use crate::polarity::{PolarityError, PolarityProvider};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedPolarity(f64);

    impl PolarityProvider for FixedPolarity {
        fn name(&self) -> &str {
            "fixed"
        }

        fn polarity(&self, _text: &str) -> Result<f64, PolarityError> {
            Ok(self.0)
        }
    }

    #[derive(Default)]
    struct FailingPolarity {
        calls: AtomicUsize,
    }

    impl PolarityProvider for FailingPolarity {
        fn name(&self) -> &str {
            "failing"
        }

        fn polarity(&self, _text: &str) -> Result<f64, PolarityError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Err(PolarityError::Provider("offline".to_string()))
        }
    }

    fn test_lexicon() -> Arc<Lexicon> {
        let config = LexiconConfig::new(
            SideLexicon::new("a", &["israel", "stand with israel", "🕎"]),
            SideLexicon::new("b", &["gaza", "free palestine", "arab"]),
        );
        Arc::new(Lexicon::from_config(&config).unwrap())
    }

    fn scorer(polarity: f64) -> FeatureScorer {
        FeatureScorer::new(
            test_lexicon(),
            SentimentConfig::default(),
            Arc::new(FixedPolarity(polarity)),
        )
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-9, "expected {expected}, got {actual}");
    }

    #[test]
    fn test_keyword_score_no_matches() {
        let scorer = scorer(0.8);
        let post = PostFeatures::new("Lovely weather for a walk today");
        assert_eq!(scorer.keyword_score(&post), 0.0);
        assert_eq!(scorer.sentiment_score(&post), 0.0);
    }

    #[test]
    fn test_keyword_score_ratio() {
        let scorer = scorer(0.0);
        let post = PostFeatures::new("Stand with Israel, not with Gaza");
        // a: israel, stand with israel; b: gaza
        assert_close(scorer.keyword_score(&post), 1.0 / 3.0);

        let post = PostFeatures::new("Free Palestine from Gaza");
        assert_close(scorer.keyword_score(&post), -1.0);
    }

    #[test]
    fn test_keyword_score_exact_tie_is_zero() {
        let scorer = scorer(0.0);
        let post = PostFeatures::new("Israel and Gaza");
        assert_eq!(scorer.keyword_score(&post), 0.0);
    }

    #[test]
    fn test_keyword_score_ignores_partial_words() {
        let scorer = scorer(0.0);
        let post = PostFeatures::new("Arabic calligraphy class");
        assert_eq!(scorer.keyword_score(&post), 0.0);
    }

    #[test]
    fn test_sentiment_empty_text() {
        let scorer = scorer(1.0);
        assert_eq!(scorer.sentiment_score(&PostFeatures::new("   \n ")), 0.0);
        assert_eq!(scorer.sentiment_score(&PostFeatures::default()), 0.0);
    }

    #[test]
    fn test_sentiment_signed_by_context() {
        let raw: f64 = 0.2;
        let scaled = (2.5 * raw).tanh();

        let pro_a = scorer(raw).sentiment_score(&PostFeatures::new("israel"));
        assert_close(pro_a, scaled);

        let pro_b = scorer(raw).sentiment_score(&PostFeatures::new("gaza"));
        assert_close(pro_b, -scaled);
    }

    #[test]
    fn test_sentiment_boosts_apply_once() {
        let raw: f64 = 0.1;
        let scaled = (2.5 * raw).tanh();
        let post = PostFeatures::new("israel 🕎🕎 terrorist massacre");
        // two a-side hits (israel, 🕎), both boosts present
        let score = scorer(raw).sentiment_score(&post);
        assert_close(score, scaled + 0.15 + 0.25);
    }

    #[test]
    fn test_sentiment_fallback_nudge() {
        // flat sentiment, tied context except one extra a-side hit
        let post = PostFeatures::new("israel stand with israel gaza");
        let balance = (2.0 - 1.0) / 3.0;
        let score = scorer(0.0).sentiment_score(&post);
        assert_close(score, balance * 0.25);
    }

    #[test]
    fn test_sentiment_no_nudge_when_polarity_strong() {
        let raw: f64 = -0.6;
        let scaled = (2.5 * raw).tanh();
        let score = scorer(raw).sentiment_score(&PostFeatures::new("israel"));
        assert_close(score, scaled);
        assert!(score < -0.9);
    }

    #[test]
    fn test_sentiment_uses_substring_context_by_default() {
        // "arabic" only counts as a b-side hit under substring matching
        let post = PostFeatures::new("arabic");
        assert_eq!(scorer(0.0).keyword_score(&post), 0.0);
        assert_close(scorer(0.0).sentiment_score(&post), -0.25);

        let word_boundary = FeatureScorer::new(
            test_lexicon(),
            SentimentConfig {
                match_mode: MatchMode::WordBoundary,
                ..SentimentConfig::default()
            },
            Arc::new(FixedPolarity(0.0)),
        );
        assert_eq!(word_boundary.sentiment_score(&post), 0.0);
    }

    #[test]
    fn test_provider_failure_isolated() {
        let failing = Arc::new(FailingPolarity::default());
        let scorer = FeatureScorer::new(test_lexicon(), SentimentConfig::default(), failing.clone());

        assert_eq!(scorer.sentiment_score(&PostFeatures::new("israel")), 0.0);
        assert_eq!(failing.calls.load(Ordering::Relaxed), 1);

        // no lexicon hits means the provider is never consulted
        assert_eq!(scorer.sentiment_score(&PostFeatures::new("hello")), 0.0);
        assert_eq!(failing.calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_out_of_range_polarity_treated_as_failure() {
        assert_eq!(scorer(3.0).sentiment_score(&PostFeatures::new("israel")), 0.0);
    }

    #[test]
    fn test_scores_bounded() {
        let scorer = scorer(1.0);
        let post = PostFeatures::new("israel 🕎 terrorist genocide freedom");
        let s = scorer.sentiment_score(&post);
        assert!((-1.0..=1.0).contains(&s));
        assert_eq!(s, 1.0);
    }
}
