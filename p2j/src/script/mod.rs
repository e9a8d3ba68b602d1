//! Reverse conversion: notebook cells back into an annotated script.

use log::warn;

use crate::cell::{AssemblerOptions, Cell, CellKind, LINE_BREAK};
use crate::document::Document;
use crate::parser::marker;

/// Emits the marker convention read by [`crate::Parser`].
///
/// The kind before the first cell is implicitly [`CellKind::Code`], the
/// forward scanner's starting mode, so a document opening with prose starts
/// with `## m` while one opening with code has no leading marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptWriter {
    options: AssemblerOptions,
}

impl ScriptWriter {
    /// `options` must match the ones the script will be parsed back with.
    pub fn new(options: AssemblerOptions) -> Self {
        ScriptWriter { options }
    }

    pub fn write_lines(&self, document: &Document) -> Vec<String> {
        let mut out = Vec::new();
        let mut previous: Option<CellKind> = None;

        for (index, cell) in document.cells.iter().enumerate() {
            if cell.is_empty() && document.cells.len() > 1 {
                warn!(
                    "{} cell #{} is empty and will be dropped when read back",
                    cell.kind, index
                );
            }
            if self.needs_marker(previous, cell.kind) {
                out.push(cell.kind.marker().to_string());
            }
            let start = out.len();
            match cell.kind {
                CellKind::Code => write_code(cell, &mut out),
                CellKind::Prose => write_prose(cell, &mut out),
            }
            // The forward pass trims one trailing blank line per cell, so a
            // cell that ends in one gets a second to absorb the trim.
            if out.len() > start && out.last().is_some_and(|line| is_blank(cell.kind, line)) {
                out.push(blank_line(cell.kind).to_string());
            }
            previous = Some(cell.kind);
        }

        out
    }

    /// The script as text, one `\n`-terminated line per emitted line.
    pub fn write_string(&self, document: &Document) -> String {
        let mut text = String::new();
        for line in self.write_lines(document) {
            text.push_str(&line);
            text.push('\n');
        }
        text
    }

    fn needs_marker(&self, previous: Option<CellKind>, kind: CellKind) -> bool {
        match previous {
            None => kind != CellKind::default(),
            Some(previous) => previous != kind || self.options.split_on_repeated_marker,
        }
    }
}

fn write_code(cell: &Cell, out: &mut Vec<String>) {
    for line in &cell.lines {
        let line = strip_terminator(line);
        if marker::marker_keyword(line).is_some() {
            warn!(
                "code line `{}` starts with `##` and will be read back as a marker",
                line
            );
        }
        out.push(line.to_string());
    }
}

fn write_prose(cell: &Cell, out: &mut Vec<String>) {
    for line in &cell.lines {
        out.push(prose_to_comment(strip_terminator(line)));
    }
}

/// Re-encode a stored prose line as a `#` comment. Only the line-break
/// sentinel ending the line is removed; a `<br>` inside the text is kept.
pub fn prose_to_comment(line: &str) -> String {
    let text = line.strip_suffix(LINE_BREAK).unwrap_or(line);
    if text.is_empty() {
        "#".to_string()
    } else {
        format!("# {}", text)
    }
}

/// The script line that reads back as a blank artifact in a cell of `kind`.
fn blank_line(kind: CellKind) -> &'static str {
    match kind {
        CellKind::Code => "",
        CellKind::Prose => "#",
    }
}

fn is_blank(kind: CellKind, line: &str) -> bool {
    line == blank_line(kind)
}

fn strip_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}
