//! Lexicon-based polarity provider

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

use stance_core::{PolarityError, PolarityProvider};

use crate::lexicon::{LexiconError, PolarityLexicon};

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\p{L}\p{N}_]+(?:'[\p{L}]+)?").expect("valid token regex"));

/// Tokens after a negation that it still applies to
pub const NEGATION_WINDOW: usize = 3;

/// A negated word keeps half its strength with the opposite sign
pub const NEGATION_FACTOR: f64 = -0.5;

/// Averages the polarity of known sentiment words in a text.
///
/// An intensifier multiplies the sentiment word right after it. A negation
/// flips and dampens any sentiment word within [`NEGATION_WINDOW`] tokens
/// after it. Texts with no sentiment word score 0.0.
#[derive(Debug, Clone)]
pub struct LexiconPolarity {
    lexicon: PolarityLexicon,
}

impl LexiconPolarity {
    pub fn new(lexicon: PolarityLexicon) -> Self {
        Self { lexicon }
    }

    /// Built-in lists extended with a TOML file
    pub fn with_extension<P: AsRef<Path>>(path: P) -> Result<Self, LexiconError> {
        let mut lexicon = PolarityLexicon::embedded();
        lexicon.extend_from_file(path)?;
        Ok(Self::new(lexicon))
    }

    pub fn lexicon(&self) -> &PolarityLexicon {
        &self.lexicon
    }

    /// Per-word polarities in text order
    pub fn scored_words(&self, text: &str) -> Vec<f64> {
        let lowered = text.to_lowercase().replace('\u{2019}', "'");

        let mut scored = Vec::new();
        let mut negated_at: Option<usize> = None;
        let mut intensified: Option<(usize, f64)> = None;

        for (i, token) in TOKEN.find_iter(&lowered).map(|m| m.as_str()).enumerate() {
            if self.lexicon.is_negation(token) {
                negated_at = Some(i);
                continue;
            }
            if let Some(multiplier) = self.lexicon.intensifier(token) {
                intensified = Some((i, multiplier));
                continue;
            }
            let Some(mut value) = self.lexicon.polarity(token) else {
                continue;
            };

            if let Some((at, multiplier)) = intensified {
                if at + 1 == i {
                    value *= multiplier;
                }
            }
            if let Some(at) = negated_at {
                if i - at <= NEGATION_WINDOW {
                    value *= NEGATION_FACTOR;
                }
            }
            scored.push(value.clamp(-1.0, 1.0));
        }

        scored
    }
}

impl Default for LexiconPolarity {
    fn default() -> Self {
        Self::new(PolarityLexicon::embedded())
    }
}

impl PolarityProvider for LexiconPolarity {
    fn name(&self) -> &str {
        "lexicon"
    }

    fn polarity(&self, text: &str) -> Result<f64, PolarityError> {
        let scored = self.scored_words(text);
        if scored.is_empty() {
            return Ok(0.0);
        }
        let mean = scored.iter().sum::<f64>() / scored.len() as f64;
        if !mean.is_finite() {
            return Err(PolarityError::Provider(format!("non-finite polarity {}", mean)));
        }
        Ok(mean.clamp(-1.0, 1.0))
    }
}
