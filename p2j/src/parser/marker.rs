//! Line classification for annotated scripts.
//!
//! A script line is either a cell marker (`## c`, `## m`) or content. Content
//! is encoded differently depending on the kind of cell it lands in: code is
//! stored verbatim, prose has its comment or docstring syntax stripped.

use crate::cell::{CellKind, LINE_BREAK};

const MARKER_PREFIX: &str = "##";
const TRIPLE_QUOTES: [&str; 2] = ["\"\"\"", "'''"];

/// A classified script line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// A marker switching the scanner to the given kind.
    Marker(CellKind),
    /// Anything else, to be encoded for the current cell.
    Content(&'a str),
}

/// A line starting with `##` whose keyword selects neither kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MalformedMarker<'a> {
    pub line: &'a str,
    pub keyword: &'a str,
}

/// Classify a single line.
pub fn classify(line: &str) -> Result<Line<'_>, MalformedMarker<'_>> {
    let Some(keyword) = marker_keyword(line) else {
        return Ok(Line::Content(line));
    };

    if keyword.starts_with('m') {
        Ok(Line::Marker(CellKind::Prose))
    } else if keyword.starts_with('c') {
        Ok(Line::Marker(CellKind::Code))
    } else {
        Err(MalformedMarker { line, keyword })
    }
}

/// The keyword of a candidate marker line, or `None` if the line is not one.
///
/// `## c` and `##c` both yield `c`: one whitespace character after the prefix
/// is skipped.
pub fn marker_keyword(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(MARKER_PREFIX)?;
    Some(strip_one_whitespace(rest))
}

/// Encode a content line for the given cell kind.
///
/// Returns `None` when the line contributes nothing (a bare triple-quote
/// delimiter inside prose).
pub fn encode(kind: CellKind, line: &str) -> Option<String> {
    match kind {
        CellKind::Code => Some(code_line(line)),
        CellKind::Prose => prose_line(line),
    }
}

pub fn code_line(line: &str) -> String {
    format!("{}\n", line)
}

pub fn prose_line(line: &str) -> Option<String> {
    let text = if line.starts_with('#') {
        strip_comment(line).to_string()
    } else {
        if TRIPLE_QUOTES.contains(&line.trim()) {
            return None;
        }
        strip_quotes(line)
    };
    Some(format!("{}{}\n", text, LINE_BREAK))
}

/// `# text` and `#text` both yield `text`. Lines of two characters or fewer
/// (`#`, `#x`) yield nothing.
fn strip_comment(line: &str) -> &str {
    if line.chars().count() <= 2 {
        return "";
    }
    strip_one_whitespace(&line[1..])
}

fn strip_quotes(line: &str) -> String {
    let text = TRIPLE_QUOTES
        .iter()
        .fold(line.to_string(), |text, quote| text.replace(quote, ""));
    if text.chars().count() > 1 {
        strip_one_whitespace(&text).to_string()
    } else {
        text
    }
}

fn strip_one_whitespace(text: &str) -> &str {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_whitespace() => chars.as_str(),
        _ => text,
    }
}
