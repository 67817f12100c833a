//! Rendering of the walked tree as indented lines
//!
//! `RenderLines` is a lazy iterator: each filesystem entry is only visited,
//! and each source file only parsed, when the consumer asks for the next line.
//!
//! Errors other than an inaccessible root never stop the iteration. They are
//! logged when they happen and collected, so the caller can inspect them with
//! [`RenderLines::warnings`] once the lines have been consumed.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::io;
use std::path::Path;

use tracing::warn;

use crate::annotate::Annotator;
use crate::error::{Error, Result};
use crate::extractors::{Declaration, DeclarationKind, extract_annotated, extract_with};
use crate::file_utils::read_source_file;
use crate::tree::{Entries, EntryKind, FileSystemEntry, TreeWalker, WalkerConfig};

/// One level of indentation.
pub const INDENT_UNIT: &str = "    ";

pub fn indent(levels: usize) -> String {
    INDENT_UNIT.repeat(levels)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Directory,
    File,
    Declaration(DeclarationKind),
}

/// A line of output before indentation is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub kind: LineKind,
    /// Number of indent units in front of `text`.
    pub indent: usize,
    pub text: String,
    pub explanation: Option<String>,
}

impl RenderedLine {
    fn entry(entry: &FileSystemEntry) -> Self {
        let (kind, text) = match entry.kind {
            EntryKind::Directory => (LineKind::Directory, format!("{}/", entry.name)),
            EntryKind::File => (LineKind::File, entry.name.clone()),
        };
        Self {
            kind,
            indent: entry.depth,
            text,
            explanation: None,
        }
    }

    fn declaration(depth: usize, declaration: Declaration) -> Self {
        Self {
            kind: LineKind::Declaration(declaration.kind),
            indent: depth + declaration.level,
            text: declaration.label(),
            explanation: declaration.explanation,
        }
    }
}

impl fmt::Display for RenderedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", indent(self.indent), self.text)?;
        if let Some(ref explanation) = self.explanation {
            write!(f, " - {}", explanation)?;
        }
        Ok(())
    }
}

/// Counts of what was emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub directories: usize,
    pub files: usize,
    pub declarations: usize,
    pub warnings: usize,
}

/// Receives rendered lines, one at a time.
pub trait StreamingOutput {
    fn output_line(&mut self, line: &RenderedLine) -> io::Result<()>;

    fn finish(&mut self, summary: &RenderSummary) -> io::Result<()>;
}

/// Composes the tree walker and the declaration extractor.
pub struct Renderer {
    walker: TreeWalker,
    annotator: Option<Box<dyn Annotator>>,
}

impl Renderer {
    pub fn new(config: WalkerConfig) -> Self {
        Self {
            walker: TreeWalker::new(config),
            annotator: None,
        }
    }

    /// Explain every declaration with `annotator`.
    pub fn with_annotator(mut self, annotator: Box<dyn Annotator>) -> Self {
        self.annotator = Some(annotator);
        self
    }

    /// Start rendering `root`. Fails only when the root cannot be read.
    pub fn render(&mut self, root: &Path) -> Result<RenderLines<'_>> {
        RenderLines::new(&self.walker, root, self.annotator.as_mut())
    }
}

/// Render `root` without annotation, ignoring folders named in `ignored_names`.
pub fn render(root: &Path, ignored_names: &BTreeSet<String>) -> Result<RenderLines<'static>> {
    let walker = TreeWalker::new(WalkerConfig {
        ignored_names: ignored_names.clone(),
        ..Default::default()
    });
    RenderLines::new(&walker, root, None)
}

/// Lazy sequence of rendered lines.
pub struct RenderLines<'a> {
    entries: Entries,
    annotator: Option<&'a mut Box<dyn Annotator>>,
    show_all_files: bool,
    max_file_size: u64,
    pending: VecDeque<RenderedLine>,
    warnings: Vec<Error>,
    summary: RenderSummary,
}

impl<'a> RenderLines<'a> {
    fn new(
        walker: &TreeWalker,
        root: &Path,
        annotator: Option<&'a mut Box<dyn Annotator>>,
    ) -> Result<Self> {
        Ok(Self {
            entries: walker.walk(root)?,
            annotator,
            show_all_files: walker.config().show_all_files,
            max_file_size: walker.config().max_file_size,
            pending: VecDeque::new(),
            warnings: Vec::new(),
            summary: RenderSummary::default(),
        })
    }

    /// Errors recorded so far.
    pub fn warnings(&self) -> &[Error] {
        &self.warnings
    }

    pub fn summary(&self) -> RenderSummary {
        RenderSummary {
            warnings: self.warnings.len(),
            ..self.summary
        }
    }

    /// Send every remaining line to `output`, then the summary.
    pub fn stream<O: StreamingOutput>(&mut self, output: &mut O) -> io::Result<RenderSummary> {
        for line in self.by_ref() {
            output.output_line(&line)?;
        }
        let summary = self.summary();
        output.finish(&summary)?;
        Ok(summary)
    }

    fn record(&mut self, error: Error) {
        warn!(kind = error.kind(), "{}", error);
        self.warnings.push(error);
    }

    /// Parse a source file and queue its declaration lines.
    fn queue_declarations(&mut self, entry: &FileSystemEntry) {
        let source = match read_source_file(&entry.path, self.max_file_size) {
            Ok(source) => source,
            Err(e) => {
                self.record(e);
                return;
            }
        };

        let extracted = match self.annotator.as_deref_mut() {
            Some(annotator) => extract_annotated(&source, &mut **annotator),
            None => extract_with::<dyn Annotator>(&source, None),
        };

        let extraction = match extracted {
            Ok(extraction) => extraction,
            Err(source) => {
                self.record(Error::Parse {
                    path: entry.relative_path.clone(),
                    source,
                });
                return;
            }
        };

        for failure in extraction.failures {
            self.record(Error::Annotation {
                path: entry.relative_path.clone(),
                name: failure.name,
                source: failure.error,
            });
        }

        self.summary.declarations += extraction.declarations.len();
        self.pending.extend(
            extraction
                .declarations
                .into_iter()
                .map(|d| RenderedLine::declaration(entry.depth, d)),
        );
    }
}

impl Iterator for RenderLines<'_> {
    type Item = RenderedLine;

    fn next(&mut self) -> Option<RenderedLine> {
        loop {
            if let Some(line) = self.pending.pop_front() {
                return Some(line);
            }

            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    self.record(e);
                    continue;
                }
            };

            match entry.kind {
                EntryKind::Directory => {
                    self.summary.directories += 1;
                }
                EntryKind::File if entry.is_source_file() => {
                    self.summary.files += 1;
                    self.queue_declarations(&entry);
                }
                EntryKind::File if self.show_all_files => {
                    self.summary.files += 1;
                }
                EntryKind::File => continue,
            }
            return Some(RenderedLine::entry(&entry));
        }
    }
}
