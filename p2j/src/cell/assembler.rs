use std::mem;

use log::debug;

use crate::cell::{Cell, CellKind, LINE_BREAK};

/// Knobs for how markers delimit cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblerOptions {
    /// Seal the open cell on every marker after the first line, including a
    /// marker that keeps the current kind. This allows consecutive cells of
    /// the same kind. When unset, only a change of kind seals.
    pub split_on_repeated_marker: bool,
}

/// Two-state machine that groups classified lines into cells.
///
/// The mode starts as [`CellKind::Code`] and only changes on marker events.
/// Content lines accumulate in the open buffer until the next sealing marker
/// or [`Assembler::finish`].
#[derive(Debug)]
pub struct Assembler {
    options: AssemblerOptions,
    mode: CellKind,
    buffer: Vec<String>,
    cells: Vec<Cell>,
    /// Whether any line (marker or content) has been consumed yet.
    started: bool,
}

impl Assembler {
    pub fn new(options: AssemblerOptions) -> Self {
        Assembler {
            options,
            mode: CellKind::default(),
            buffer: Vec::new(),
            cells: Vec::new(),
            started: false,
        }
    }

    /// The kind of the cell currently being filled.
    pub fn mode(&self) -> CellKind {
        self.mode
    }

    /// Append an already-classified content line to the open cell.
    pub fn push(&mut self, line: String) {
        self.started = true;
        self.buffer.push(line);
    }

    /// Handle a marker selecting `kind`.
    ///
    /// A marker on the very first line never seals: there is no prior cell.
    pub fn switch(&mut self, kind: CellKind) {
        let first_line = !self.started;
        self.started = true;

        if !first_line && (kind != self.mode || self.options.split_on_repeated_marker) {
            self.seal_open();
        }
        self.mode = kind;
    }

    /// Seal the final open cell and return every cell in source order.
    ///
    /// A document that produced no cell at all yields a single empty cell of
    /// the current mode, so empty input maps to one empty code cell.
    pub fn finish(mut self) -> Vec<Cell> {
        self.seal_open();
        if self.cells.is_empty() {
            debug!("no content; emitting a single empty {} cell", self.mode);
            self.cells.push(Cell::new(self.mode, Vec::new()));
        }
        self.cells
    }

    fn seal_open(&mut self) {
        let buffer = mem::take(&mut self.buffer);
        match seal(self.mode, buffer) {
            Some(cell) => {
                debug!(
                    "sealed {} cell #{} with {} line(s)",
                    cell.kind,
                    self.cells.len(),
                    cell.lines.len()
                );
                self.cells.push(cell);
            }
            None => debug!("discarded empty {} buffer", self.mode),
        }
    }
}

/// Turn a finished buffer into a cell.
///
/// A trailing blank line artifact (`"\n"` or `"<br>\n"`) is dropped first.
/// Returns `None` when nothing is left.
pub fn seal(kind: CellKind, mut buffer: Vec<String>) -> Option<Cell> {
    if buffer.last().is_some_and(|line| is_blank_artifact(line)) {
        buffer.pop();
    }
    if buffer.is_empty() {
        None
    } else {
        Some(Cell::new(kind, buffer))
    }
}

fn is_blank_artifact(line: &str) -> bool {
    match line.strip_suffix('\n') {
        Some(body) => body.is_empty() || body == LINE_BREAK,
        None => false,
    }
}
