//! The `.ipynb` JSON codec.

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

use crate::cell::{Cell, CellKind};
use crate::document::Document;
use crate::document::template::Templates;

/// Build the notebook JSON for `document`: its metadata record plus one
/// templated object per cell.
pub fn to_value(document: &Document, templates: &Templates) -> Value {
    let mut root = document.metadata.clone();
    root.insert(
        "cells".to_string(),
        Value::Array(
            document
                .cells
                .iter()
                .map(|cell| templates.instantiate(cell))
                .collect(),
        ),
    );
    Value::Object(root)
}

/// Pretty-print with one-space indentation. Non-ASCII text is written as is.
pub fn to_vec_pretty(value: &Value) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(b" ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    out.push(b'\n');
    Ok(out)
}

#[derive(Deserialize)]
struct RawNotebook {
    cells: Vec<RawCell>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

#[derive(Deserialize)]
struct RawCell {
    cell_type: String,
    #[serde(default)]
    source: RawSource,
}

/// nbformat allows `source` to be a single string or a list of lines.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSource {
    Lines(Vec<String>),
    Text(String),
}

impl Default for RawSource {
    fn default() -> Self {
        RawSource::Lines(Vec::new())
    }
}

impl RawSource {
    fn into_lines(self) -> Vec<String> {
        match self {
            RawSource::Lines(lines) => lines,
            RawSource::Text(text) => text.split_inclusive('\n').map(String::from).collect(),
        }
    }
}

/// Read a notebook. Cells that are neither code nor markdown are skipped.
pub fn from_str(text: &str) -> Result<Document, serde_json::Error> {
    let raw: RawNotebook = serde_json::from_str(text)?;

    let mut cells = Vec::with_capacity(raw.cells.len());
    for (index, raw_cell) in raw.cells.into_iter().enumerate() {
        match CellKind::from_cell_type(&raw_cell.cell_type) {
            Some(kind) => cells.push(Cell::new(kind, raw_cell.source.into_lines())),
            None => warn!(
                "skipping cell #{} with unsupported type `{}`",
                index, raw_cell.cell_type
            ),
        }
    }

    Ok(Document::new(cells, raw.rest))
}
