pub mod error;
pub mod marker;

pub use error::{ParseError, ParseErrorKind};

use std::ops::Range;

use crate::Document;
use crate::cell::{Assembler, AssemblerOptions, Cell};
use crate::document::template::Templates;
use crate::parser::marker::Line;

/// Forward conversion entry point: annotated script in, [`Document`] out.
pub struct Parser<'t> {
    source: String,
    file_id: usize,
    options: AssemblerOptions,
    templates: &'t Templates,
}

impl Parser<'static> {
    pub fn new(source: String, file_id: usize) -> Self {
        Parser {
            source,
            file_id,
            options: AssemblerOptions::default(),
            templates: Templates::builtin(),
        }
    }
}

impl<'t> Parser<'t> {
    pub fn with_options(mut self, options: AssemblerOptions) -> Self {
        self.options = options;
        self
    }

    /// Use `templates` for the document metadata instead of the built-ins.
    pub fn with_templates<'u>(self, templates: &'u Templates) -> Parser<'u> {
        Parser {
            source: self.source,
            file_id: self.file_id,
            options: self.options,
            templates,
        }
    }

    /// Parse the source script into a complete Document.
    ///
    /// Aborts at the first malformed marker; no partial document is produced.
    pub fn parse(&self) -> Result<Document, ParseError> {
        let cells = assemble(source_lines(&self.source), self.file_id, self.options)?;
        Ok(Document::new(cells, self.templates.metadata().clone()))
    }
}

/// Forward conversion over lines that are already split, with line
/// terminators removed. Uses the built-in templates and default options.
pub fn parse_lines<S: AsRef<str>>(lines: &[S]) -> Result<Document, ParseError> {
    parse_lines_with(lines, AssemblerOptions::default())
}

pub fn parse_lines_with<S: AsRef<str>>(
    lines: &[S],
    options: AssemblerOptions,
) -> Result<Document, ParseError> {
    let mut offset = 0;
    let spanned = lines.iter().map(|line| {
        let line: &str = line.as_ref();
        let span = offset..offset + line.len();
        offset = span.end + 1;
        (span, line)
    });
    let cells = assemble(spanned, 0, options)?;
    Ok(Document::new(cells, Templates::builtin().metadata().clone()))
}

/// Run the marker grammar and the assembler over spanned lines.
fn assemble<'a>(
    lines: impl Iterator<Item = (Range<usize>, &'a str)>,
    file_id: usize,
    options: AssemblerOptions,
) -> Result<Vec<Cell>, ParseError> {
    let mut assembler = Assembler::new(options);

    for (index, (span, line)) in lines.enumerate() {
        match marker::classify(line) {
            Ok(Line::Marker(kind)) => assembler.switch(kind),
            Ok(Line::Content(text)) => {
                if let Some(encoded) = marker::encode(assembler.mode(), text) {
                    assembler.push(encoded);
                }
            }
            Err(malformed) => {
                let error =
                    ParseError::invalid_marker(malformed.line, index + 1, span, file_id);
                return Err(if malformed.keyword.is_empty() {
                    error.with_note("the marker has no keyword")
                } else {
                    error.with_note(format!("found keyword `{}`", malformed.keyword))
                });
            }
        }
    }

    Ok(assembler.finish())
}

/// Split source text into lines with their byte spans, excluding `\n` and
/// `\r\n` terminators.
fn source_lines(source: &str) -> impl Iterator<Item = (Range<usize>, &str)> {
    let mut offset = 0;
    source.split_inclusive('\n').map(move |raw| {
        let start = offset;
        offset += raw.len();
        let line = raw.strip_suffix('\n').unwrap_or(raw);
        let line = line.strip_suffix('\r').unwrap_or(line);
        (start..start + line.len(), line)
    })
}
