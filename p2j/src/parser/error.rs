use std::fmt;
use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A line begins with `##` but its keyword is neither `m...` nor `c...`.
    InvalidMarker { line: String },
}

/// Parse errors with source location information.
#[derive(Debug, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Range<usize>,
    pub file_id: usize,
    /// 1-based line number of the offending line.
    pub line_number: usize,
    pub notes: Vec<String>,
}

impl ParseError {
    pub fn invalid_marker(
        line: impl Into<String>,
        line_number: usize,
        span: Range<usize>,
        file_id: usize,
    ) -> Self {
        ParseError {
            kind: ParseErrorKind::InvalidMarker { line: line.into() },
            span,
            file_id,
            line_number,
            notes: Vec::new(),
        }
        .with_note("cell markers are `## m` for markdown cells or `## c` for code cells")
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// The raw text of the offending line.
    pub fn line(&self) -> &str {
        match &self.kind {
            ParseErrorKind::InvalidMarker { line } => line,
        }
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self) -> Diagnostic<usize> {
        Diagnostic::error()
            .with_message(self.to_string())
            .with_labels(vec![
                Label::primary(self.file_id, self.span.clone()).with_message("unknown marker"),
            ])
            .with_notes(self.notes.clone())
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ParseErrorKind::InvalidMarker { line } => {
                write!(f, "invalid cell marker on line {}: {}", self.line_number, line)
            }
        }
    }
}

impl std::error::Error for ParseError {}
