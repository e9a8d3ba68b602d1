pub mod json;
pub mod template;

use std::fmt;

use serde_json::{Map, Value};

use crate::cell::{Cell, CellKind};
use crate::script::ScriptWriter;

/// Top-level notebook fields other than `cells` (`metadata`, `nbformat`,
/// `nbformat_minor`). Copied from the metadata template and never computed.
pub type Metadata = Map<String, Value>;

/// A notebook: ordered cells plus the fixed metadata record.
///
/// Cell order is the order in which cells were delimited in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub cells: Vec<Cell>,
    pub metadata: Metadata,
}

impl Document {
    pub fn new(cells: Vec<Cell>, metadata: Metadata) -> Self {
        Document { cells, metadata }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Cell::is_empty)
    }

    /// The kind of every cell, in order.
    pub fn kinds(&self) -> Vec<CellKind> {
        self.cells.iter().map(|cell| cell.kind).collect()
    }
}

/// Renders the document back into an annotated script.
impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in ScriptWriter::default().write_lines(self) {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
