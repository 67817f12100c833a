//! Declaration extraction
//!
//! Turns the text of one Python source file into the ordered list of
//! declarations shown beneath it in the tree: top-level functions and classes,
//! and the methods declared directly inside each class.
//!
//! # Ordering
//!
//! Declarations come out in source order. Each class is followed immediately
//! by its methods (one nesting level deeper) before the next top-level
//! declaration.
//!
//! # Annotation
//!
//! [`extract_annotated`] additionally asks an [`Annotator`] to explain each
//! declaration. The annotator receives the exact source text of that
//! declaration only. A failed call never aborts extraction: the declaration
//! gets [`PLACEHOLDER_EXPLANATION`] and the failure is returned alongside the
//! declarations so the caller can report it.

mod python;

use std::fmt;

use tracing::debug;

use crate::annotate::{Annotator, PLACEHOLDER_EXPLANATION, normalize_explanation};
use crate::error::{AnnotationError, ParseError};

use python::{Definition, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Function,
    Class,
    Method,
}

impl DeclarationKind {
    /// Nesting level relative to the enclosing file.
    pub fn nesting_level(&self) -> usize {
        match self {
            DeclarationKind::Function | DeclarationKind::Class => 1,
            DeclarationKind::Method => 2,
        }
    }
}

/// A function, class, or method found in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub name: String,
    /// 1 for top-level declarations, 2 for methods.
    pub level: usize,
    /// 1-based line of the `def`/`class` header.
    pub line: usize,
    pub explanation: Option<String>,
}

impl Declaration {
    fn from_span(kind: DeclarationKind, span: &Span) -> Self {
        Self {
            kind,
            name: span.name.clone(),
            level: kind.nesting_level(),
            line: span.line,
            explanation: None,
        }
    }

    /// `Function: name()`, `Class: name` or `Method: name()`.
    pub fn label(&self) -> String {
        match self.kind {
            DeclarationKind::Function => format!("Function: {}()", self.name),
            DeclarationKind::Class => format!("Class: {}", self.name),
            DeclarationKind::Method => format!("Method: {}()", self.name),
        }
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())?;
        if let Some(ref explanation) = self.explanation {
            write!(f, " - {}", explanation)?;
        }
        Ok(())
    }
}

/// An annotator call that failed; the declaration carries the placeholder instead.
#[derive(Debug)]
pub struct AnnotationFailure {
    pub name: String,
    pub error: AnnotationError,
}

/// Result of annotated extraction.
#[derive(Debug, Default)]
pub struct Extraction {
    pub declarations: Vec<Declaration>,
    pub failures: Vec<AnnotationFailure>,
}

/// Extract declarations from Python source.
///
/// A syntax error anywhere in the file fails the whole extraction.
pub fn extract(source: &str) -> Result<Vec<Declaration>, ParseError> {
    let extraction = extract_with::<dyn Annotator>(source, None)?;
    Ok(extraction.declarations)
}

/// Extract declarations and explain each one with `annotator`, in output order.
pub fn extract_annotated<A>(source: &str, annotator: &mut A) -> Result<Extraction, ParseError>
where
    A: Annotator + ?Sized,
{
    extract_with(source, Some(annotator))
}

/// Shared by the plain and annotated paths.
pub fn extract_with<A>(source: &str, mut annotator: Option<&mut A>) -> Result<Extraction, ParseError>
where
    A: Annotator + ?Sized,
{
    let definitions = python::top_level_definitions(source)?;
    let mut extraction = Extraction::default();

    for definition in &definitions {
        match definition {
            Definition::Function(span) => {
                extraction.push(DeclarationKind::Function, span, source, annotator.as_deref_mut());
            }
            Definition::Class { span, methods } => {
                extraction.push(DeclarationKind::Class, span, source, annotator.as_deref_mut());
                for method in methods {
                    extraction.push(DeclarationKind::Method, method, source, annotator.as_deref_mut());
                }
            }
        }
    }

    debug!(
        declarations = extraction.declarations.len(),
        failures = extraction.failures.len(),
        "extracted declarations"
    );
    Ok(extraction)
}

impl Extraction {
    fn push<A>(&mut self, kind: DeclarationKind, span: &Span, source: &str, annotator: Option<&mut A>)
    where
        A: Annotator + ?Sized,
    {
        let mut declaration = Declaration::from_span(kind, span);

        if let Some(annotator) = annotator {
            let text = source.get(span.bytes.clone()).unwrap_or_default();
            let explanation = annotator
                .explain(text)
                .and_then(|raw| normalize_explanation(&raw).ok_or(AnnotationError::EmptyResponse));

            declaration.explanation = Some(match explanation {
                Ok(explanation) => explanation,
                Err(error) => {
                    self.failures.push(AnnotationFailure {
                        name: span.name.clone(),
                        error,
                    });
                    PLACEHOLDER_EXPLANATION.to_string()
                }
            });
        }

        self.declarations.push(declaration);
    }
}
