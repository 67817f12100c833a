//! Declaration annotation
//!
//! An `Annotator` turns the source text of one declaration into a short
//! natural-language explanation. Every call is independent: implementations
//! receive only the declaration they are asked about, never the history of
//! earlier requests, so the cost of a call does not grow with the size of the
//! scanned tree.
//!
//! Closures of the right shape are annotators too, which keeps tests and
//! offline use free of network access:
//!
//! ```
//! use pystruct::annotate::Annotator;
//! use pystruct::error::AnnotationError;
//!
//! let mut annotator = |code: &str| -> Result<String, AnnotationError> {
//!     Ok(format!("{} bytes of code", code.len()))
//! };
//! assert_eq!(annotator.explain("def f(): pass").unwrap(), "13 bytes of code");
//! ```

mod openai;

pub use openai::{
    DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS, OpenAiAnnotator, OpenAiConfig,
};

use crate::error::AnnotationError;

/// Explanation shown when the annotator fails for a declaration.
pub const PLACEHOLDER_EXPLANATION: &str = "(explanation unavailable)";

/// Explanations longer than this are cut and end with an ellipsis.
pub const MAX_EXPLANATION_CHARS: usize = 120;

pub trait Annotator {
    /// Explain one declaration, given its exact source text.
    fn explain(&mut self, source: &str) -> Result<String, AnnotationError>;
}

impl<F> Annotator for F
where
    F: FnMut(&str) -> Result<String, AnnotationError>,
{
    fn explain(&mut self, source: &str) -> Result<String, AnnotationError> {
        self(source)
    }
}

/// Reduce a raw explanation to one bounded line.
///
/// Takes the first non-blank line, collapses runs of whitespace, and truncates
/// to `MAX_EXPLANATION_CHARS`. Returns `None` when nothing printable is left.
pub fn normalize_explanation(raw: &str) -> Option<String> {
    let line = raw.lines().map(str::trim).find(|l| !l.is_empty())?;
    let collapsed = line.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= MAX_EXPLANATION_CHARS {
        return Some(collapsed);
    }
    let mut truncated: String = collapsed.chars().take(MAX_EXPLANATION_CHARS - 1).collect();
    truncated.push('…');
    Some(truncated)
}
