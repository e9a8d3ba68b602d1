pub mod cell;
pub mod document;
pub mod files;
pub mod parser;
pub mod script;

pub use cell::{Cell, CellKind};
pub use document::Document;
pub use document::template::Templates;
pub use parser::{ParseError, Parser};
pub use script::ScriptWriter;
