//! File-handling collaborators around the converters: target resolution,
//! reading scripts and notebooks, writing results.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use log::info;

use crate::document::Document;
use crate::document::json;
use crate::document::template::Templates;

/// Which way a conversion goes. Decides the default target extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    ScriptToNotebook,
    NotebookToScript,
}

impl Direction {
    pub fn target_extension(self) -> &'static str {
        match self {
            Direction::ScriptToNotebook => "ipynb",
            Direction::NotebookToScript => "py",
        }
    }
}

#[derive(Debug)]
pub enum FileError {
    SourceNotFound(PathBuf),
    TargetExists(PathBuf),
    Io { path: PathBuf, message: String },
    Json { path: PathBuf, message: String },
    Template { name: String, message: String },
}

impl FileError {
    pub fn io(path: &Path, err: io::Error) -> Self {
        FileError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::SourceNotFound(path) => write!(
                f,
                "source file not found: {}. Specify a valid source file",
                path.display()
            ),
            FileError::TargetExists(path) => write!(
                f,
                "target file {} already exists. Pass --overwrite to replace it",
                path.display()
            ),
            FileError::Io { path, message } => write!(f, "{}: {}", path.display(), message),
            FileError::Json { path, message } => {
                write!(f, "{}: invalid notebook: {}", path.display(), message)
            }
            FileError::Template { name, message } => {
                write!(f, "invalid template {}: {}", name, message)
            }
        }
    }
}

impl std::error::Error for FileError {}

/// Decide where a conversion writes to.
///
/// Without an explicit `target` the source path is reused with the
/// direction's extension. An existing target is refused unless `overwrite`.
pub fn resolve_target(
    source: &Path,
    target: Option<&Path>,
    overwrite: bool,
    direction: Direction,
) -> Result<PathBuf, FileError> {
    let target = match target {
        Some(target) => target.to_path_buf(),
        None => source.with_extension(direction.target_extension()),
    };

    if target.exists() && !overwrite {
        return Err(FileError::TargetExists(target));
    }
    Ok(target)
}

/// Read a source file. A missing file is reported as
/// [`FileError::SourceNotFound`].
pub fn read_source(path: &Path) -> Result<String, FileError> {
    std::fs::read_to_string(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => FileError::SourceNotFound(path.to_path_buf()),
        _ => FileError::io(path, err),
    })
}

pub fn read_notebook(path: &Path) -> Result<Document, FileError> {
    let text = read_source(path)?;
    json::from_str(&text).map_err(|err| FileError::Json {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

pub fn write_notebook(
    path: &Path,
    document: &Document,
    templates: &Templates,
) -> Result<(), FileError> {
    let value = json::to_value(document, templates);
    let bytes = json::to_vec_pretty(&value).map_err(|err| FileError::Json {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    std::fs::write(path, bytes).map_err(|err| FileError::io(path, err))?;
    info!(
        "wrote notebook {} ({} cells)",
        path.display(),
        document.cells.len()
    );
    Ok(())
}

pub fn write_script(path: &Path, text: &str) -> Result<(), FileError> {
    std::fs::write(path, text).map_err(|err| FileError::io(path, err))?;
    info!("wrote script {}", path.display());
    Ok(())
}
