//! Notebook templates: the code cell, the markdown cell and the top-level
//! metadata record.
//!
//! Built-ins are embedded JSON assets parsed once per process. A template
//! directory may override any of the three files.

use std::path::Path;

use once_cell::sync::Lazy;
use serde_json::{Map, Value};

use crate::cell::{Cell, CellKind};
use crate::document::Metadata;
use crate::files::FileError;

pub const CODE_TEMPLATE_FILE: &str = "cell_code.json";
pub const PROSE_TEMPLATE_FILE: &str = "cell_markdown.json";
pub const METADATA_TEMPLATE_FILE: &str = "metadata.json";

const CODE_TEMPLATE: &str = include_str!("../../templates/cell_code.json");
const PROSE_TEMPLATE: &str = include_str!("../../templates/cell_markdown.json");
const METADATA_TEMPLATE: &str = include_str!("../../templates/metadata.json");

static BUILTIN: Lazy<Templates> = Lazy::new(|| {
    Templates::from_json(CODE_TEMPLATE, PROSE_TEMPLATE, METADATA_TEMPLATE)
        .expect("embedded notebook templates are JSON objects")
});

/// Immutable template record. Cells are built from copies, never by
/// mutating a shared instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Templates {
    code: Map<String, Value>,
    prose: Map<String, Value>,
    metadata: Metadata,
}

impl Templates {
    pub fn builtin() -> &'static Templates {
        &BUILTIN
    }

    pub fn from_json(code: &str, prose: &str, metadata: &str) -> Result<Self, FileError> {
        Ok(Templates {
            code: parse_object(CODE_TEMPLATE_FILE, code)?,
            prose: parse_object(PROSE_TEMPLATE_FILE, prose)?,
            metadata: parse_object(METADATA_TEMPLATE_FILE, metadata)?,
        })
    }

    /// Load templates from `dir`. Files missing from the directory fall back
    /// to the built-in template of the same name.
    pub fn from_dir(dir: &Path) -> Result<Self, FileError> {
        let builtin = Templates::builtin();
        Ok(Templates {
            code: load_object(dir, CODE_TEMPLATE_FILE)?.unwrap_or_else(|| builtin.code.clone()),
            prose: load_object(dir, PROSE_TEMPLATE_FILE)?
                .unwrap_or_else(|| builtin.prose.clone()),
            metadata: load_object(dir, METADATA_TEMPLATE_FILE)?
                .unwrap_or_else(|| builtin.metadata.clone()),
        })
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn cell_template(&self, kind: CellKind) -> &Map<String, Value> {
        match kind {
            CellKind::Code => &self.code,
            CellKind::Prose => &self.prose,
        }
    }

    /// A fresh JSON cell for `cell`: a copy of its kind's template with
    /// `source` set to the cell's lines.
    pub fn instantiate(&self, cell: &Cell) -> Value {
        let mut object = self.cell_template(cell.kind).clone();
        object.insert(
            "source".to_string(),
            Value::Array(cell.lines.iter().cloned().map(Value::String).collect()),
        );
        Value::Object(object)
    }
}

fn parse_object(name: &str, text: &str) -> Result<Map<String, Value>, FileError> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(other) => Err(FileError::Template {
            name: name.to_string(),
            message: format!("expected a JSON object, found {}", json_type(&other)),
        }),
        Err(err) => Err(FileError::Template {
            name: name.to_string(),
            message: err.to_string(),
        }),
    }
}

fn load_object(dir: &Path, name: &str) -> Result<Option<Map<String, Value>>, FileError> {
    let path = dir.join(name);
    if !path.exists() {
        return Ok(None);
    }
    let text = std::fs::read_to_string(&path).map_err(|err| FileError::io(&path, err))?;
    parse_object(name, &text).map(Some)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
