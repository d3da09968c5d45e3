//! Target/decoy text classifier.
//!
//! Decides whether free text names the target ("Sonnet 5") while rejecting
//! older point releases ("3.5", "4.5") that share most of its spelling.
//! Exclusions are always evaluated first: a decoy such as
//! `claude-3.5-sonnet` contains the bare short form `5-sonnet`.
//!
//! Underscores are folded to hyphens before matching. Both are one byte,
//! so match offsets in the folded text index the original text too.

use std::sync::LazyLock;

use regex::Regex;

/// Decoy spellings, in either token order. Separators between the version
/// digits may be hyphen, dot or space (underscores are folded beforehand).
const EXCLUSION_PATTERNS: &[&str] = &[
    r"(?i)\bsonnet[-. ]?[34][-. ]5\b",
    r"(?i)\b[34][-. ]5[-. ]?sonnet\b",
];

/// Target spellings, longest first so token extraction keeps the prefix.
const INCLUSION_PATTERNS: &[&str] = &[
    r"(?i)\bclaude[- ]?sonnet[- ]?5\b",
    r"(?i)\bclaude[- ]?5[- ]?sonnet\b",
    r"(?i)\bsonnet[- ]?5\b",
    r"(?i)\b5[- ]?sonnet\b",
];

static EXCLUSIONS: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(EXCLUSION_PATTERNS));
static INCLUSIONS: LazyLock<Vec<Regex>> = LazyLock::new(|| compile(INCLUSION_PATTERNS));

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("classifier patterns are valid"))
        .collect()
}

/// Three-way classification of one piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Names the target; carries the matched token as written in the text.
    Target(String),
    /// Names a decoy version. Wins over any target token in the same text.
    Decoy,
    NoMatch,
}

impl Classification {
    pub const fn is_target(&self) -> bool {
        matches!(self, Self::Target(_))
    }
}

pub fn evaluate(text: &str) -> Classification {
    let folded = text.replace('_', "-");

    if EXCLUSIONS.iter().any(|re| re.is_match(&folded)) {
        return Classification::Decoy;
    }

    INCLUSIONS
        .iter()
        .find_map(|re| re.find(&folded))
        .map_or(Classification::NoMatch, |m| {
            Classification::Target(text[m.range()].to_string())
        })
}

/// True when `text` names the target and no decoy.
pub fn classify(text: &str) -> bool {
    evaluate(text).is_target()
}

/// The matched target token, as written in `text`.
pub fn extract_model_token(text: &str) -> Option<String> {
    match evaluate(text) {
        Classification::Target(token) => Some(token),
        Classification::Decoy | Classification::NoMatch => None,
    }
}
