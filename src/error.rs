//! Error types
//!
//! `Error` is the crate-wide error. Only `Error::Access` is fatal to a scan;
//! every other variant is recorded as a warning by the renderer and the
//! remaining tree is still rendered.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The scan root is missing, unreadable, or not a directory.
    #[error("cannot access '{}': {source}", .path.display())]
    Access {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("skipping '{}': {size} bytes exceeds the {limit} byte limit", .path.display())]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("cannot parse '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("cannot explain '{name}' in '{}': {source}", .path.display())]
    Annotation {
        path: PathBuf,
        name: String,
        #[source]
        source: AnnotationError,
    },

    #[error("error walking directory tree: {0}")]
    Walk(#[from] ignore::Error),
}

impl Error {
    /// Short category name used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Access { .. } => "access",
            Error::Read { .. } => "read",
            Error::FileTooLarge { .. } => "too_large",
            Error::Parse { .. } => "parse",
            Error::Annotation { .. } => "annotation",
            Error::Walk(_) => "walk",
        }
    }
}

/// Failure to turn a source file into a syntax tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The source contains a syntax error. Positions are 1-based.
    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("failed to load the Python grammar: {0}")]
    Grammar(String),

    /// The parser gave up without producing a tree.
    #[error("parser produced no syntax tree")]
    NoTree,
}

/// Failure of a single explanation request.
#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("no API key configured (set OPENAI_API_KEY or pass --api-key)")]
    MissingApiKey,

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("service returned an empty explanation")]
    EmptyResponse,

    #[error("{0}")]
    Other(String),
}
