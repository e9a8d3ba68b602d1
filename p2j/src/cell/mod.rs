pub mod assembler;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use assembler::{Assembler, AssemblerOptions};

/// Sentinel appended to every stored prose line. It encodes an intentional line
/// break inside a single prose cell's accumulated text.
pub const LINE_BREAK: &str = "<br>";

/// The kind of a notebook cell.
///
/// This is also the scanner's mode while reading a script: content lines are
/// classified according to the kind of the cell they are accumulated into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    #[default]
    Code,
    Prose,
}

impl CellKind {
    /// The script line that switches the scanner into this mode.
    pub fn marker(self) -> &'static str {
        match self {
            CellKind::Code => "## c",
            CellKind::Prose => "## m",
        }
    }

    pub fn from_cell_type(cell_type: &str) -> Option<Self> {
        match cell_type {
            "code" => Some(CellKind::Code),
            "markdown" => Some(CellKind::Prose),
            _ => None,
        }
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellKind::Code => write!(f, "code"),
            CellKind::Prose => write!(f, "prose"),
        }
    }
}

/// A sealed notebook cell: its kind and its stored lines in source order.
///
/// Code lines are kept verbatim with a trailing `\n`. Prose lines have their
/// comment syntax stripped and end in [`LINE_BREAK`] followed by `\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub kind: CellKind,
    pub lines: Vec<String>,
}

impl Cell {
    pub fn new(kind: CellKind, lines: Vec<String>) -> Self {
        Cell { kind, lines }
    }

    pub fn code<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Cell::new(CellKind::Code, lines.into_iter().map(Into::into).collect())
    }

    pub fn prose<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Cell::new(CellKind::Prose, lines.into_iter().map(Into::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
