//! pystruct - Print a Python project's directory tree with the functions,
//! classes and methods declared in each source file

pub mod annotate;
pub mod error;
pub mod extractors;
pub mod file_utils;
pub mod output;
pub mod render;
pub mod tree;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use annotate::{Annotator, OpenAiAnnotator, OpenAiConfig};
pub use error::{AnnotationError, Error, ParseError, Result};
pub use extractors::{Declaration, DeclarationKind, extract, extract_annotated};
pub use output::{OutputConfig, StreamingFormatter};
pub use render::{RenderLines, RenderSummary, RenderedLine, Renderer, StreamingOutput, render};
pub use tree::{DEFAULT_IGNORED_NAMES, PathFilter, TreeWalker, WalkerConfig, is_excluded};
