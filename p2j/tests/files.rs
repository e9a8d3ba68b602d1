use std::path::{Path, PathBuf};

use p2j::files::{self, Direction, FileError};
use p2j::{Cell, Parser, ScriptWriter, Templates};

#[test]
fn target_defaults_to_source_with_new_extension() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("analysis.py");

    let target =
        files::resolve_target(&source, None, false, Direction::ScriptToNotebook).unwrap();
    assert_eq!(target, dir.path().join("analysis.ipynb"));

    let notebook = dir.path().join("analysis.ipynb");
    let target =
        files::resolve_target(&notebook, None, false, Direction::NotebookToScript).unwrap();
    assert_eq!(target, source);
}

#[test]
fn explicit_target_is_used() {
    let target = files::resolve_target(
        Path::new("a.py"),
        Some(Path::new("out/b.ipynb")),
        false,
        Direction::ScriptToNotebook,
    )
    .unwrap();
    assert_eq!(target, PathBuf::from("out/b.ipynb"));
}

#[test]
fn existing_target_needs_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("a.py");
    let existing = dir.path().join("a.ipynb");
    std::fs::write(&existing, "{}").unwrap();

    match files::resolve_target(&source, None, false, Direction::ScriptToNotebook) {
        Err(FileError::TargetExists(path)) => assert_eq!(path, existing),
        other => panic!("expected TargetExists, got {:?}", other),
    }

    let target =
        files::resolve_target(&source, None, true, Direction::ScriptToNotebook).unwrap();
    assert_eq!(target, existing);
}

#[test]
fn missing_source_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.py");

    let err = files::read_source(&missing).unwrap_err();
    assert!(matches!(&err, FileError::SourceNotFound(path) if *path == missing));
    assert!(err.to_string().contains("source file not found"));

    assert!(matches!(
        files::read_notebook(&dir.path().join("missing.ipynb")),
        Err(FileError::SourceNotFound(_))
    ));
}

#[test]
fn write_and_read_notebook() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.ipynb");
    let document = Parser::new("x = 1\n## m\n# note\n".to_string(), 0)
        .parse()
        .unwrap();

    files::write_notebook(&path, &document, Templates::builtin()).unwrap();
    let reread = files::read_notebook(&path).unwrap();
    assert_eq!(reread.cells, vec![Cell::code(["x = 1\n"]), Cell::prose(["note<br>\n"])]);
}

#[test]
fn invalid_notebook_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.ipynb");
    std::fs::write(&path, "{").unwrap();

    let err = files::read_notebook(&path).unwrap_err();
    assert!(matches!(err, FileError::Json { .. }));
    assert!(err.to_string().contains("invalid notebook"));
}

#[test]
fn notebook_to_script_file() {
    let dir = tempfile::tempdir().unwrap();
    let notebook = dir.path().join("nb.ipynb");
    let document = Parser::new("## m\n# Title\n## c\nx = 1\n".to_string(), 0)
        .parse()
        .unwrap();
    files::write_notebook(&notebook, &document, Templates::builtin()).unwrap();

    let target =
        files::resolve_target(&notebook, None, false, Direction::NotebookToScript).unwrap();
    let script = ScriptWriter::default().write_string(&files::read_notebook(&notebook).unwrap());
    files::write_script(&target, &script).unwrap();

    assert_eq!(
        std::fs::read_to_string(dir.path().join("nb.py")).unwrap(),
        "## m\n# Title\n## c\nx = 1\n"
    );
}
