use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use p2j::cell::AssemblerOptions;
use p2j::parser::{self, ParseError};
use p2j::{Cell, CellKind, Document, ScriptWriter};

#[derive(Debug, Deserialize)]
pub struct ExpectedCell {
    pub kind: CellKind,

    /// Stored lines, including their `\n` / `<br>\n` endings.
    #[serde(default)]
    pub lines: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct TestConfig {
    /// Human-readable test description.
    #[serde(default)]
    pub description: Option<String>,

    /// Expected parse error: the error's Display string must contain this substring.
    #[serde(default)]
    pub expect_error: Option<String>,

    /// Expected cells, in order. Unchecked when absent.
    #[serde(default)]
    pub expect_cells: Option<Vec<ExpectedCell>>,

    /// Seal a cell at every marker instead of only on a change of kind.
    #[serde(default)]
    pub split_cells: bool,

    /// Check that writing the document back out and parsing it again gives
    /// the same cells.
    #[serde(default = "default_round_trip")]
    pub round_trip: bool,
}

fn default_round_trip() -> bool {
    true
}

/// Split a `.test.py` fixture into its TOML frontmatter and the script after it.
fn parse_test_file(content: &str) -> Result<(TestConfig, &str), String> {
    let content = content.trim_start_matches('\u{feff}');
    let body = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
        .ok_or("missing opening --- frontmatter delimiter")?;

    let close = body
        .find("\n---")
        .ok_or("missing closing --- frontmatter delimiter")?;
    let frontmatter = body[..close].trim_end_matches('\r');
    let rest = &body[close + "\n---".len()..];
    let script = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);

    let config: TestConfig =
        toml::from_str(frontmatter).map_err(|e| format!("TOML parse error: {}", e))?;
    Ok((config, script))
}

pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: TestOutcome,
}

fn run_single_test(path: &Path) -> TestResult {
    let (description, outcome) = match check_file(path) {
        Ok(description) => (description, TestOutcome::Pass),
        Err((description, reason)) => (description, TestOutcome::Fail(reason)),
    };
    TestResult {
        path: path.to_path_buf(),
        description,
        outcome,
    }
}

type Description = Option<String>;

/// Run one fixture. On failure returns the description with the reason.
fn check_file(path: &Path) -> Result<Description, (Description, String)> {
    // 1. Read file
    let content = std::fs::read_to_string(path)
        .map_err(|e| (None, format!("cannot read file: {}", e)))?;

    // 2. Parse frontmatter
    let (config, source) =
        parse_test_file(&content).map_err(|e| (None, format!("frontmatter error: {}", e)))?;
    let description = config.description.clone();

    match check_source(&config, source) {
        Ok(()) => Ok(description),
        Err(reason) => Err((description, reason)),
    }
}

fn check_source(config: &TestConfig, source: &str) -> Result<(), String> {
    let options = AssemblerOptions {
        split_on_repeated_marker: config.split_cells,
    };

    // 3. Parse the script
    let parse_result = p2j::Parser::new(source.to_string(), 0)
        .with_options(options)
        .parse();

    // 4. Check error expectations
    let document = match (&config.expect_error, parse_result) {
        (Some(expected_err), Err(err)) => {
            return check_error(expected_err, &err);
        }
        (Some(expected_err), Ok(_)) => {
            return Err(format!(
                "expected error containing \"{}\", but parsing succeeded",
                expected_err
            ));
        }
        (None, Err(err)) => return Err(format!("unexpected parse error: {}", err)),
        (None, Ok(document)) => document,
    };

    // 5. Check cells
    if let Some(expected) = &config.expect_cells {
        check_cells(&document.cells, expected)?;
    }

    // 6. Write back out and parse again
    if config.round_trip {
        check_round_trip(&document, options)?;
    }

    Ok(())
}

fn check_error(expected: &str, err: &ParseError) -> Result<(), String> {
    let err_str = err.to_string();
    if err_str.contains(expected) {
        Ok(())
    } else {
        Err(format!(
            "expected error containing \"{}\", got: {}",
            expected, err_str
        ))
    }
}

fn check_cells(actual: &[Cell], expected: &[ExpectedCell]) -> Result<(), String> {
    if actual.len() != expected.len() {
        return Err(format!(
            "expected {} cell(s), got {}\n  actual kinds: {}",
            expected.len(),
            actual.len(),
            describe_kinds(&actual.iter().map(|cell| cell.kind).collect::<Vec<_>>())
        ));
    }

    for (i, (actual, expected)) in actual.iter().zip(expected.iter()).enumerate() {
        if actual.kind != expected.kind {
            return Err(format!(
                "cell[{}]: expected {} cell, got {}",
                i, expected.kind, actual.kind
            ));
        }
        if actual.lines != expected.lines {
            return Err(format!(
                "cell[{}]: line mismatch\n  expected: {:?}\n  actual:   {:?}",
                i, expected.lines, actual.lines
            ));
        }
    }

    Ok(())
}

fn check_round_trip(document: &Document, options: AssemblerOptions) -> Result<(), String> {
    let script = ScriptWriter::new(options).write_lines(document);
    let reparsed = parser::parse_lines_with(&script, options)
        .map_err(|e| format!("round trip: written script does not parse: {}", e))?;

    if reparsed.cells != document.cells {
        return Err(format!(
            "round trip: cells changed\n  before: {}\n  after:  {}",
            describe_kinds(&document.kinds()),
            describe_kinds(&reparsed.kinds())
        ));
    }
    Ok(())
}

fn describe_kinds(kinds: &[CellKind]) -> String {
    let kinds: Vec<String> = kinds.iter().map(|kind| kind.to_string()).collect();
    if kinds.is_empty() {
        "(none)".to_string()
    } else {
        kinds.join(", ")
    }
}

/// Discover `.test.py` fixtures grouped by category (directory relative to
/// `root`). Fixtures directly in `root` get the empty category.
fn discover_categorized(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect_fixtures(root, root, &mut categories);
    for fixtures in categories.values_mut() {
        fixtures.sort();
    }
    categories
}

fn collect_fixtures(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for path in entries.flatten().map(|entry| entry.path()) {
        if path.is_dir() {
            collect_fixtures(&path, root, out);
            continue;
        }
        let is_fixture = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.ends_with(".test.py"));
        if is_fixture {
            let category = path
                .parent()
                .and_then(|p| p.strip_prefix(root).ok())
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            out.entry(category).or_default().push(path);
        }
    }
}

fn category_label(category: &str) -> &str {
    if category.is_empty() { "(root)" } else { category }
}

/// List available categories for the given fixture path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }

    let categories = discover_categorized(path);
    if categories.is_empty() {
        eprintln!("no .test.py files found in {}", path.display());
        return;
    }

    eprintln!("available categories:");
    for (category, fixtures) in &categories {
        eprintln!("  {} ({} tests)", category_label(category), fixtures.len());
    }
}

/// ANSI styling, or none.
struct Palette {
    color: bool,
}

impl Palette {
    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        } else {
            text.to_string()
        }
    }

    fn pass(&self) -> String {
        self.paint("32", "PASS")
    }

    fn fail(&self) -> String {
        self.paint("31", "FAIL")
    }

    fn bold(&self, text: &str) -> String {
        self.paint("1", text)
    }
}

/// Keep only the requested categories (and their sub-categories). Unknown
/// names are reported and ignored.
fn filter_categories(
    all: BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<String, Vec<PathBuf>> {
    if requested.is_empty() {
        return all;
    }

    let wanted: Vec<&str> = requested.iter().map(|r| r.trim_matches('/')).collect();
    for name in &wanted {
        let known = all
            .keys()
            .any(|cat| cat == name || cat.starts_with(&format!("{}/", name)));
        if !known {
            let available: Vec<&str> = all.keys().map(|k| category_label(k)).collect();
            eprintln!(
                "warning: category '{}' not found (available: {})",
                name,
                available.join(", ")
            );
        }
    }

    all.into_iter()
        .filter(|(cat, _)| {
            wanted
                .iter()
                .any(|name| cat == name || cat.starts_with(&format!("{}/", name)))
        })
        .collect()
}

/// Run every `.test.py` fixture under `path` (or a single file).
/// If `categories` is non-empty, only run fixtures in those categories.
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let palette = Palette { color: !no_color };

    let groups = if path.is_file() {
        BTreeMap::from([(String::new(), vec![path.to_path_buf()])])
    } else {
        let all = discover_categorized(path);
        if all.is_empty() {
            eprintln!("no .test.py files found in {}", path.display());
            return 1;
        }
        filter_categories(all, categories)
    };

    if groups.is_empty() {
        eprintln!("no matching categories found");
        return 1;
    }

    let mut passed = 0usize;
    let mut failures: Vec<TestResult> = Vec::new();

    for (category, fixtures) in &groups {
        if !path.is_file() {
            eprintln!();
            eprintln!("{}", palette.bold(category_label(category)));
        }

        for fixture in fixtures {
            let result = run_single_test(fixture);
            let label = result.description.clone().unwrap_or_else(|| {
                fixture
                    .file_name()
                    .and_then(|s| s.to_str())
                    .map(|s| s.trim_end_matches(".test.py").to_string())
                    .unwrap_or_else(|| "?".to_string())
            });

            match result.outcome {
                TestOutcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", palette.pass(), label);
                }
                TestOutcome::Fail(_) => {
                    eprintln!("  {}  {}", palette.fail(), label);
                    failures.push(result);
                }
            }
        }
    }

    if !failures.is_empty() {
        eprintln!();
        eprintln!("failures:");
        for failure in &failures {
            eprintln!();
            eprintln!("  --- {} ---", failure.path.display());
            if let TestOutcome::Fail(reason) = &failure.outcome {
                for line in reason.lines() {
                    eprintln!("  {}", line);
                }
            }
        }
    }

    eprintln!();
    if failures.is_empty() {
        eprintln!(
            "test result: {}. {} passed, 0 failed",
            palette.paint("32", "ok"),
            passed
        );
        0
    } else {
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            palette.paint("31", "FAILED"),
            passed,
            failures.len(),
            passed + failures.len()
        );
        1
    }
}
