//! Streaming output formatter
//!
//! `StreamingFormatter` writes each rendered line as soon as it arrives, so a
//! large tree starts printing before the walk is over.

use std::io;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::extractors::DeclarationKind;
use crate::render::{LineKind, RenderSummary, RenderedLine, StreamingOutput, indent};

use super::config::OutputConfig;

/// Streaming output formatter. Writes to stdout unless built with
/// [`StreamingFormatter::with_writer`].
pub struct StreamingFormatter<W: WriteColor = StandardStream> {
    config: OutputConfig,
    out: W,
}

impl StreamingFormatter {
    pub fn new(config: OutputConfig) -> Self {
        let choice = if config.use_color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self {
            config,
            out: StandardStream::stdout(choice),
        }
    }
}

impl<W: WriteColor> StreamingFormatter<W> {
    pub fn with_writer(config: OutputConfig, out: W) -> Self {
        Self { config, out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn style_for(kind: LineKind) -> ColorSpec {
    let mut spec = ColorSpec::new();
    match kind {
        LineKind::Directory => {
            spec.set_fg(Some(Color::Blue)).set_bold(true);
        }
        LineKind::File => {
            spec.set_fg(Some(Color::White));
        }
        LineKind::Declaration(DeclarationKind::Class) => {
            spec.set_fg(Some(Color::Yellow));
        }
        LineKind::Declaration(DeclarationKind::Function | DeclarationKind::Method) => {
            spec.set_fg(Some(Color::Green));
        }
    }
    spec
}

impl<W: WriteColor> StreamingOutput for StreamingFormatter<W> {
    fn output_line(&mut self, line: &RenderedLine) -> io::Result<()> {
        write!(self.out, "{}", indent(line.indent))?;
        self.out.set_color(&style_for(line.kind))?;
        write!(self.out, "{}", line.text)?;
        self.out.reset()?;

        if let Some(ref explanation) = line.explanation {
            write!(self.out, " - ")?;
            // Dim, like comments
            self.out
                .set_color(ColorSpec::new().set_fg(Some(Color::Black)).set_intense(true))?;
            write!(self.out, "{}", explanation)?;
            self.out.reset()?;
        }
        writeln!(self.out)
    }

    fn finish(&mut self, summary: &RenderSummary) -> io::Result<()> {
        if self.config.show_summary {
            writeln!(self.out)?;
            writeln!(
                self.out,
                "{} directories, {} files, {} declarations",
                summary.directories, summary.files, summary.declarations
            )?;
        }
        self.out.flush()
    }
}
