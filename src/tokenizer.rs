//! Shorthand tokenizer with sign, direction, and comparison detection.
//!
//! Decomposes free-form clinician shorthand into typed tokens:
//!
//! ```text
//! +Dyspnea -Murmur Ferritin↓ MCV<80
//! ```
//!
//! Detection runs as an explicit two-stage scan — sign prefix first, then
//! directional suffix or trailing-digit-anchored comparison — so each edge
//! case (empty clean text, competing suffix candidates) is auditable in
//! isolation. Pure and deterministic; never suspends, never fails.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unicode arrows recognized as directional suffixes, compared by codepoint.
const GLYPH_UP: char = '\u{2191}'; // ↑
const GLYPH_DOWN: char = '\u{2193}'; // ↓

// ---------------------------------------------------------------------------
// Token model
// ---------------------------------------------------------------------------

/// Comparison operator in a `<word><op><digits>` fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CmpOp {
    Lt,
    Lte,
    Gt,
    Gte,
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CmpOp::Lt => "<",
            CmpOp::Lte => "<=",
            CmpOp::Gt => ">",
            CmpOp::Gte => ">=",
        })
    }
}

/// Value qualifier carried by a token.
///
/// Exactly one state holds per token: no modifier, a directional arrow, or a
/// comparison with its numeric bound. The comparison value lives inside the
/// variant so a comparison without a number is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueModifier {
    None,
    Up,
    Down,
    Cmp { op: CmpOp, value: u32 },
}

impl ValueModifier {
    pub fn is_none(&self) -> bool {
        matches!(self, ValueModifier::None)
    }

    /// Numeric bound, present only for comparison modifiers.
    pub fn numeric_value(&self) -> Option<u32> {
        match self {
            ValueModifier::Cmp { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Render the modifier back as display text (`"↓"`, `"<80"`), the form
    /// stored on an attached feature. Empty when there is no modifier.
    pub fn display_value(&self) -> String {
        match self {
            ValueModifier::None => String::new(),
            ValueModifier::Up => GLYPH_UP.to_string(),
            ValueModifier::Down => GLYPH_DOWN.to_string(),
            ValueModifier::Cmp { op, value } => format!("{op}{value}"),
        }
    }
}

/// One whitespace-delimited unit of raw shorthand input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Exact substring as typed. Immutable; kept for audit and undo.
    pub original_text: String,
    /// `original_text` with sign prefix and modifier suffix stripped. May be
    /// empty for sign-only or glyph-only fragments; the workflow treats an
    /// empty clean text as unresolved rather than failing the parse.
    pub clean_text: String,
    /// `false` only when the fragment was prefixed with `-`.
    pub is_present: bool,
    pub modifier: ValueModifier,
}

impl Token {
    /// Display rendering of the modifier, empty when none.
    pub fn display_value(&self) -> String {
        self.modifier.display_value()
    }
}

// ---------------------------------------------------------------------------
// tokenize
// ---------------------------------------------------------------------------

/// Split raw shorthand into typed tokens. Empty fragments are discarded;
/// whitespace-only input yields an empty vec.
pub fn tokenize(input: &str) -> Vec<Token> {
    input.split_whitespace().map(parse_fragment).collect()
}

fn parse_fragment(raw: &str) -> Token {
    // Stage 1: sign prefix. At most one character is consumed.
    let (is_present, rest) = match raw.strip_prefix('+') {
        Some(stripped) => (true, stripped),
        None => match raw.strip_prefix('-') {
            Some(stripped) => (false, stripped),
            None => (true, raw),
        },
    };

    // Stage 2a: directional suffix, one trailing codepoint.
    if let Some(stripped) = rest.strip_suffix(GLYPH_UP) {
        return token(raw, stripped, is_present, ValueModifier::Up);
    }
    if let Some(stripped) = rest.strip_suffix(GLYPH_DOWN) {
        return token(raw, stripped, is_present, ValueModifier::Down);
    }

    // Stage 2b: comparison, anchored on the trailing digit run.
    if let Some((word, op, value)) = split_comparison(rest) {
        return token(raw, word, is_present, ValueModifier::Cmp { op, value });
    }

    token(raw, rest, is_present, ValueModifier::None)
}

/// Match `<word><op><digits>` where `<op>` is one of `<`, `<=`, `>`, `>=`.
///
/// The longest ASCII digit run at the end anchors the operator, so the word
/// part may itself be empty (`"<80"`). Returns `None` when there is no
/// trailing digit run, no operator directly before it, or the run overflows
/// `u32` — in all three cases the fragment stays plain clean text.
fn split_comparison(rest: &str) -> Option<(&str, CmpOp, u32)> {
    let bytes = rest.as_bytes();
    let mut start = bytes.len();
    while start > 0 && bytes[start - 1].is_ascii_digit() {
        start -= 1;
    }
    if start == bytes.len() {
        return None;
    }

    let digits = &rest[start..];
    let head = &rest[..start];
    let (word, op) = if let Some(word) = head.strip_suffix("<=") {
        (word, CmpOp::Lte)
    } else if let Some(word) = head.strip_suffix(">=") {
        (word, CmpOp::Gte)
    } else if let Some(word) = head.strip_suffix('<') {
        (word, CmpOp::Lt)
    } else if let Some(word) = head.strip_suffix('>') {
        (word, CmpOp::Gt)
    } else {
        return None;
    };

    let value = digits.parse().ok()?;
    Some((word, op, value))
}

fn token(raw: &str, clean: &str, is_present: bool, modifier: ValueModifier) -> Token {
    Token {
        original_text: raw.to_string(),
        clean_text: clean.to_string(),
        is_present,
        modifier,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
