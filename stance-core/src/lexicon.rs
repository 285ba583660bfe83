//! Keyword lexicon for the two opposing sides
//!
//! Entries are lowercased and trimmed at load time. Alphanumeric phrases
//! match on whole words only; symbols and emoji match anywhere in the text.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::config::{LexiconConfig, SideLexicon};
use crate::{Result, StanceError};

/// One of the two sides a keyword belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    A,
    B,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::A, Side::B];

    fn config_name(self) -> &'static str {
        match self {
            Side::A => "side_a",
            Side::B => "side_b",
        }
    }
}

/// How lexicon entries are matched against post text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Plain case-insensitive containment
    #[default]
    Substring,
    /// Whole-word match for alphanumeric entries, containment for symbols
    WordBoundary,
}

/// A single normalized lexicon entry
#[derive(Debug, Clone)]
pub struct Keyword {
    phrase: String,
    pattern: Regex,
}

impl Keyword {
    fn new(raw: &str) -> Result<Self> {
        let phrase = normalize(raw);
        let escaped = regex::escape(&phrase);
        let source = if is_word_like(&phrase) {
            format!(r"(?i)\b{}\b", escaped)
        } else {
            format!("(?i){}", escaped)
        };
        let pattern = Regex::new(&source).map_err(|source| StanceError::Pattern {
            keyword: phrase.clone(),
            source,
        })?;
        Ok(Self { phrase, pattern })
    }

    /// The normalized phrase
    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    /// Case-insensitive pattern honoring word boundaries where applicable
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Test against text that has already been lowercased
    pub fn matches(&self, lowered: &str, mode: MatchMode) -> bool {
        match mode {
            MatchMode::Substring => lowered.contains(&self.phrase),
            MatchMode::WordBoundary => self.pattern.is_match(lowered),
        }
    }
}

/// Distinct keywords matched in a single post, per side
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordMatches {
    pub side_a: Vec<String>,
    pub side_b: Vec<String>,
}

impl KeywordMatches {
    pub fn count(&self, side: Side) -> usize {
        match side {
            Side::A => self.side_a.len(),
            Side::B => self.side_b.len(),
        }
    }

    pub fn total(&self) -> usize {
        self.side_a.len() + self.side_b.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// `(a - b) / (a + b)`, or `None` when nothing matched
    pub fn balance(&self) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        let a = self.side_a.len() as f64;
        let b = self.side_b.len() as f64;
        Some((a - b) / total as f64)
    }
}

/// Two disjoint keyword sets with their display labels
#[derive(Debug, Clone)]
pub struct Lexicon {
    side_a: Vec<Keyword>,
    side_b: Vec<Keyword>,
    label_a: String,
    label_b: String,
}

impl Lexicon {
    /// Build a lexicon, rejecting empty entries and keywords shared by both sides
    pub fn from_config(config: &LexiconConfig) -> Result<Self> {
        let a = normalized_set(&config.side_a, Side::A)?;
        let b = normalized_set(&config.side_b, Side::B)?;

        if let Some(shared) = a.intersection(&b).next() {
            return Err(StanceError::OverlappingKeyword(shared.clone()));
        }

        Ok(Self {
            side_a: a.iter().map(|k| Keyword::new(k)).collect::<Result<_>>()?,
            side_b: b.iter().map(|k| Keyword::new(k)).collect::<Result<_>>()?,
            label_a: config.side_a.label.clone(),
            label_b: config.side_b.label.clone(),
        })
    }

    /// Keywords of one side, in lexicographic order
    pub fn keywords(&self, side: Side) -> &[Keyword] {
        match side {
            Side::A => &self.side_a,
            Side::B => &self.side_b,
        }
    }

    /// Display label of one side
    pub fn label(&self, side: Side) -> &str {
        match side {
            Side::A => &self.label_a,
            Side::B => &self.label_b,
        }
    }

    /// Find the distinct entries of both sides present in `text`
    pub fn find_matches(&self, text: &str, mode: MatchMode) -> KeywordMatches {
        let lowered = text.to_lowercase();
        let collect = |keywords: &[Keyword]| -> Vec<String> {
            keywords
                .iter()
                .filter(|k| k.matches(&lowered, mode))
                .map(|k| k.phrase.clone())
                .collect()
        };

        KeywordMatches {
            side_a: collect(&self.side_a),
            side_b: collect(&self.side_b),
        }
    }

    /// Total number of entries across both sides
    pub fn len(&self) -> usize {
        self.side_a.len() + self.side_b.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LexiconConfig {
    /// Check the load-time invariants without compiling patterns
    pub fn validate(&self) -> Result<()> {
        let a = normalized_set(&self.side_a, Side::A)?;
        let b = normalized_set(&self.side_b, Side::B)?;
        match a.intersection(&b).next() {
            Some(shared) => Err(StanceError::OverlappingKeyword(shared.clone())),
            None => Ok(()),
        }
    }
}

fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn normalized_set(side: &SideLexicon, which: Side) -> Result<BTreeSet<String>> {
    side.keywords
        .iter()
        .map(|raw| {
            let keyword = normalize(raw);
            if keyword.is_empty() {
                Err(StanceError::EmptyKeyword(which.config_name()))
            } else {
                Ok(keyword)
            }
        })
        .collect()
}

/// `\b` only anchors next to word characters, so symbols fall back to containment
fn is_word_like(phrase: &str) -> bool {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    matches!(
        (phrase.chars().next(), phrase.chars().last()),
        (Some(first), Some(last)) if is_word(first) && is_word(last)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexicon(a: &[&str], b: &[&str]) -> Lexicon {
        Lexicon::from_config(&LexiconConfig::new(
            SideLexicon::new("side a", a),
            SideLexicon::new("side b", b),
        ))
        .unwrap()
    }

    #[test]
    fn test_word_boundary_rejects_partial_words() {
        let lex = lexicon(&["gaza"], &["arab"]);
        let matches = lex.find_matches("Arabic lessons in Gazan schools", MatchMode::WordBoundary);
        assert!(matches.is_empty());

        let matches = lex.find_matches("Arabic lessons in Gazan schools", MatchMode::Substring);
        assert_eq!(matches.side_a, vec!["gaza"]);
        assert_eq!(matches.side_b, vec!["arab"]);
    }

    #[test]
    fn test_symbols_match_without_boundaries() {
        let lex = lexicon(&["🕎"], &["🍉"]);
        let matches = lex.find_matches("lights🕎tonight and 🍉🍉", MatchMode::WordBoundary);
        assert_eq!(matches.side_a, vec!["🕎"]);
        assert_eq!(matches.side_b, vec!["🍉"]);
    }

    #[test]
    fn test_matching_is_case_insensitive_and_distinct() {
        let lex = lexicon(&["stand with israel", "israel"], &["hamas"]);
        let matches = lex.find_matches("ISRAEL israel Stand With Israel", MatchMode::WordBoundary);
        assert_eq!(matches.count(Side::A), 2);
        assert_eq!(matches.count(Side::B), 0);
        assert_eq!(matches.balance(), Some(1.0));
    }

    #[test]
    fn test_overlap_rejected_after_normalization() {
        let config = LexiconConfig::new(
            SideLexicon::new("a", &["Ceasefire "]),
            SideLexicon::new("b", &["ceasefire"]),
        );
        let err = Lexicon::from_config(&config).unwrap_err();
        assert!(matches!(err, StanceError::OverlappingKeyword(k) if k == "ceasefire"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_keyword_rejected() {
        let config = LexiconConfig::new(SideLexicon::new("a", &["  "]), SideLexicon::new("b", &[]));
        assert!(matches!(
            Lexicon::from_config(&config),
            Err(StanceError::EmptyKeyword("side_a"))
        ));
    }

    #[test]
    fn test_default_lexicon_is_disjoint() {
        let config = LexiconConfig::default();
        let lex = Lexicon::from_config(&config).unwrap();
        assert!(lex.keywords(Side::A).len() > 50);
        assert!(lex.keywords(Side::B).len() > 50);
        assert_eq!(lex.label(Side::A), "pro-Israeli");
        assert_eq!(lex.label(Side::B), "pro-Palestinian");
    }

    #[test]
    fn test_balance_none_without_matches() {
        assert_eq!(KeywordMatches::default().balance(), None);
    }
}
