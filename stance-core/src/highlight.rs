//! Keyword highlighting for display
//!
//! Purely presentational; nothing here feeds back into scoring.

use crate::config::HighlightConfig;
use crate::lexicon::{Lexicon, Side};

/// Opening and closing text placed around a match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub open: String,
    pub close: String,
}

impl Marker {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }
}

/// Side-specific markers and output escaping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    pub side_a: Marker,
    pub side_b: Marker,
    /// Escape HTML special characters in the text around and inside markers
    pub escape_html: bool,
}

impl Markers {
    /// Bold coloured `<span>` elements
    pub fn html(side_a_color: &str, side_b_color: &str) -> Self {
        let span = |color: &str| {
            Marker::new(
                format!("<span style='color:{}; font-weight:bold;'>", color),
                "</span>",
            )
        };
        Self {
            side_a: span(side_a_color),
            side_b: span(side_b_color),
            escape_html: true,
        }
    }

    /// Bold blue for side A, bold yellow for side B
    pub fn ansi() -> Self {
        Self {
            side_a: Marker::new("\x1b[1;34m", "\x1b[0m"),
            side_b: Marker::new("\x1b[1;33m", "\x1b[0m"),
            escape_html: false,
        }
    }

    fn for_side(&self, side: Side) -> &Marker {
        match side {
            Side::A => &self.side_a,
            Side::B => &self.side_b,
        }
    }
}

impl From<&HighlightConfig> for Markers {
    fn from(config: &HighlightConfig) -> Self {
        Self::html(&config.side_a_color, &config.side_b_color)
    }
}

#[derive(Debug, Clone, Copy)]
struct Span {
    start: usize,
    end: usize,
    side: Side,
}

impl Span {
    fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Wrap every lexicon match in `text` with the marker of its side.
///
/// Newlines become spaces first. Longer keywords win over shorter ones
/// they overlap with, side A wins ties of equal length, and a span is
/// never matched twice.
pub fn highlight_keywords(lexicon: &Lexicon, text: &str, markers: &Markers) -> String {
    let text = text.replace('\n', " ");

    let mut keywords: Vec<_> = Side::BOTH
        .iter()
        .flat_map(|&side| lexicon.keywords(side).iter().map(move |k| (side, k)))
        .collect();
    keywords.sort_by(|(sa, a), (sb, b)| {
        b.phrase()
            .chars()
            .count()
            .cmp(&a.phrase().chars().count())
            .then(sa.cmp(sb))
    });

    let mut accepted: Vec<Span> = Vec::new();
    for (side, keyword) in keywords {
        for m in keyword.pattern().find_iter(&text) {
            let span = Span {
                start: m.start(),
                end: m.end(),
                side,
            };
            if !accepted.iter().any(|a| a.overlaps(&span)) {
                accepted.push(span);
            }
        }
    }
    accepted.sort_by_key(|s| s.start);

    let escape = |s: &str| {
        if markers.escape_html {
            escape_html(s)
        } else {
            s.to_string()
        }
    };

    let mut out = String::with_capacity(text.len() + accepted.len() * 48);
    let mut cursor = 0;
    for span in accepted {
        let marker = markers.for_side(span.side);
        out.push_str(&escape(&text[cursor..span.start]));
        out.push_str(&marker.open);
        out.push_str(&escape(&text[span.start..span.end]));
        out.push_str(&marker.close);
        cursor = span.end;
    }
    out.push_str(&escape(&text[cursor..]));
    out
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
