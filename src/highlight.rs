//! Search-result highlighting.
//!
//! Splits a chunk's text into spans, marking every case-insensitive
//! occurrence of the active query for visual emphasis. Matching is
//! substring-based, not tokenized: a query that is a substring of a larger
//! word still matches.
//!
//! The query is escaped before the pattern is built, so metacharacters in
//! user input match themselves instead of being interpreted.

use regex::RegexBuilder;

/// A run of text, either plain or matched by the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub matched: bool,
}

impl Span {
    fn plain(text: &str) -> Span {
        Span {
            text: text.to_string(),
            matched: false,
        }
    }

    fn hit(text: &str) -> Span {
        Span {
            text: text.to_string(),
            matched: true,
        }
    }
}

/// Mark every case-insensitive occurrence of `query` in `text`.
///
/// Returns the text split into ordered spans whose concatenation equals
/// the input. An empty query (nothing to emphasize) yields the whole text
/// as one unmatched span; empty text yields no spans.
pub fn highlight(text: &str, query: &str) -> Vec<Span> {
    if text.is_empty() {
        return Vec::new();
    }
    if query.is_empty() {
        return vec![Span::plain(text)];
    }

    // An escaped literal always compiles.
    let pattern = RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
        .expect("escaped literal pattern");

    let mut spans = Vec::new();
    let mut cursor = 0;
    for m in pattern.find_iter(text) {
        if m.start() > cursor {
            spans.push(Span::plain(&text[cursor..m.start()]));
        }
        spans.push(Span::hit(m.as_str()));
        cursor = m.end();
    }
    if cursor < text.len() {
        spans.push(Span::plain(&text[cursor..]));
    }
    spans
}

/// Render spans with visible emphasis markers, for terminal output.
pub fn mark(spans: &[Span]) -> String {
    let mut out = String::new();
    for span in spans {
        if span.matched {
            out.push_str(">>>");
            out.push_str(&span.text);
            out.push_str("<<<");
        } else {
            out.push_str(&span.text);
        }
    }
    out
}
