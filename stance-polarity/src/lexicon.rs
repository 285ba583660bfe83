//! Polarity word lists
//!
//! Loads word polarities, intensifiers and negations from TOML. The built-in
//! lists are compiled in; a user file can add words or override scores.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

static EMBEDDED: LazyLock<PolarityLexicon> = LazyLock::new(|| {
    PolarityLexicon::from_toml_str(include_str!("../config/polarity.toml"))
        .expect("embedded polarity lexicon is valid")
});

/// Errors while loading a polarity lexicon
#[derive(Debug, Error)]
pub enum LexiconError {
    #[error("Polarity lexicon parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to read polarity lexicon: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polarity for '{word}' must be within [-1, 1], got {value}")]
    InvalidPolarity { word: String, value: f64 },

    #[error("Intensifier '{word}' must be a positive multiplier, got {value}")]
    InvalidIntensifier { word: String, value: f64 },
}

/// On-disk shape of a lexicon file
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LexiconFile {
    words: HashMap<String, f64>,
    intensifiers: HashMap<String, f64>,
    negations: Vec<String>,
}

/// Lowercased word lists used by [`crate::LexiconPolarity`]
#[derive(Debug, Clone, Default)]
pub struct PolarityLexicon {
    words: HashMap<String, f64>,
    intensifiers: HashMap<String, f64>,
    negations: HashSet<String>,
}

impl PolarityLexicon {
    /// Built-in English lists
    pub fn embedded() -> Self {
        EMBEDDED.clone()
    }

    /// Parse a lexicon from TOML, starting from empty lists
    pub fn from_toml_str(source: &str) -> Result<Self, LexiconError> {
        let mut lexicon = Self::default();
        lexicon.extend_from_toml_str(source)?;
        Ok(lexicon)
    }

    /// Merge a TOML document into this lexicon; later scores win
    pub fn extend_from_toml_str(&mut self, source: &str) -> Result<(), LexiconError> {
        let file: LexiconFile = toml::from_str(source)?;

        for (word, value) in &file.words {
            if !value.is_finite() || !(-1.0..=1.0).contains(value) {
                return Err(LexiconError::InvalidPolarity {
                    word: word.clone(),
                    value: *value,
                });
            }
        }
        for (word, value) in &file.intensifiers {
            if !value.is_finite() || *value <= 0.0 {
                return Err(LexiconError::InvalidIntensifier {
                    word: word.clone(),
                    value: *value,
                });
            }
        }

        debug!(
            "Polarity lexicon: +{} words, +{} intensifiers, +{} negations",
            file.words.len(),
            file.intensifiers.len(),
            file.negations.len()
        );

        self.words
            .extend(file.words.into_iter().map(|(w, v)| (normalize(&w), v)));
        self.intensifiers
            .extend(file.intensifiers.into_iter().map(|(w, v)| (normalize(&w), v)));
        self.negations
            .extend(file.negations.iter().map(|w| normalize(w)));
        Ok(())
    }

    /// Merge a TOML file into this lexicon
    pub fn extend_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), LexiconError> {
        let content = std::fs::read_to_string(path)?;
        self.extend_from_toml_str(&content)
    }

    pub fn polarity(&self, word: &str) -> Option<f64> {
        self.words.get(word).copied()
    }

    pub fn intensifier(&self, word: &str) -> Option<f64> {
        self.intensifiers.get(word).copied()
    }

    pub fn is_negation(&self, word: &str) -> bool {
        self.negations.contains(word)
    }

    /// Number of scored words
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

fn normalize(word: &str) -> String {
    word.trim().to_lowercase()
}
