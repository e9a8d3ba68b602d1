use p2j::cell::AssemblerOptions;
use p2j::parser::marker::{self, Line};
use p2j::parser::{self, ParseErrorKind};
use p2j::{Cell, CellKind, Parser};

fn cells(lines: &[&str]) -> Vec<Cell> {
    parser::parse_lines(lines).expect("parse failed").cells
}

fn split_cells(lines: &[&str]) -> Vec<Cell> {
    let options = AssemblerOptions {
        split_on_repeated_marker: true,
    };
    parser::parse_lines_with(lines, options)
        .expect("parse failed")
        .cells
}

fn prose(line: &str) -> String {
    marker::prose_line(line).expect("line was discarded")
}

#[test]
fn alternating_markers() {
    assert_eq!(
        cells(&["## c", "x = 1", "## m", "# hello world", "## c", "y = 2"]),
        vec![
            Cell::code(["x = 1\n"]),
            Cell::prose(["hello world<br>\n"]),
            Cell::code(["y = 2\n"]),
        ]
    );
}

#[test]
fn no_markers_is_one_code_cell() {
    assert_eq!(
        cells(&["x = 1", "y = 2"]),
        vec![Cell::code(["x = 1\n", "y = 2\n"])]
    );
}

#[test]
fn bare_triple_quotes_are_discarded() {
    assert_eq!(
        cells(&["## m", "\"\"\"", "note", "\"\"\""]),
        vec![Cell::prose(["note<br>\n"])]
    );
    assert_eq!(
        cells(&["## m", "  '''  ", "note", "'''"]),
        vec![Cell::prose(["note<br>\n"])]
    );
}

#[test]
fn empty_input_is_one_empty_code_cell() {
    let document = parser::parse_lines::<&str>(&[]).expect("parse failed");
    assert_eq!(document.cells, vec![Cell::new(CellKind::Code, Vec::new())]);
    assert!(document.is_empty());
}

#[test]
fn lone_marker_is_one_empty_cell_of_its_kind() {
    assert_eq!(cells(&["## m"]), vec![Cell::new(CellKind::Prose, Vec::new())]);
    assert_eq!(cells(&["## c"]), vec![Cell::new(CellKind::Code, Vec::new())]);
}

#[test]
fn empty_buffer_between_markers_is_dropped() {
    assert_eq!(cells(&["## m", "## c", "x"]), vec![Cell::code(["x\n"])]);
    assert_eq!(cells(&["x", "## m"]), vec![Cell::code(["x\n"])]);
}

#[test]
fn leading_marker_does_not_seal() {
    assert_eq!(cells(&["## m", "# a"]), vec![Cell::prose(["a<br>\n"])]);
}

#[test]
fn markers_are_never_content() {
    let document = cells(&["## m", "# a", "## c", "b", "##m", "c", "##c", "d"]);
    for cell in &document {
        for line in &cell.lines {
            assert!(!line.starts_with("##"), "marker stored as content: {:?}", line);
        }
    }
    assert_eq!(
        document.iter().map(|cell| cell.kind).collect::<Vec<_>>(),
        vec![
            CellKind::Prose,
            CellKind::Code,
            CellKind::Prose,
            CellKind::Code
        ]
    );
}

#[test]
fn keywords_match_by_prefix() {
    assert_eq!(
        cells(&["import os", "##markdown", "# Notes", "## code", "print(os.name)"]),
        vec![
            Cell::code(["import os\n"]),
            Cell::prose(["Notes<br>\n"]),
            Cell::code(["print(os.name)\n"]),
        ]
    );
}

#[test]
fn same_kind_marker_does_not_split_by_default() {
    assert_eq!(
        cells(&["x = 1", "## c", "y = 2"]),
        vec![Cell::code(["x = 1\n", "y = 2\n"])]
    );
}

#[test]
fn split_policy_seals_on_every_marker() {
    assert_eq!(
        split_cells(&["x = 1", "## c", "y = 2", "## m", "# a", "## m", "# b"]),
        vec![
            Cell::code(["x = 1\n"]),
            Cell::code(["y = 2\n"]),
            Cell::prose(["a<br>\n"]),
            Cell::prose(["b<br>\n"]),
        ]
    );
    // the first line still never seals
    assert_eq!(split_cells(&["## c", "x"]), vec![Cell::code(["x\n"])]);
}

#[test]
fn trailing_blank_line_is_trimmed_once() {
    assert_eq!(
        cells(&["x = 1", "", "## m", "# a", "#"]),
        vec![Cell::code(["x = 1\n"]), Cell::prose(["a<br>\n"])]
    );
    assert_eq!(cells(&["x", "", ""]), vec![Cell::code(["x\n", "\n"])]);
}

#[test]
fn code_lines_are_verbatim() {
    assert_eq!(
        cells(&["  x = 1  ", "\ty = '''s'''", "# comment"]),
        vec![Cell::code(["  x = 1  \n", "\ty = '''s'''\n", "# comment\n"])]
    );
}

#[test]
fn malformed_marker_aborts() {
    let err = parser::parse_lines(&["x = 1", "## x: nope", "y = 2"]).unwrap_err();
    assert_eq!(
        err.kind,
        ParseErrorKind::InvalidMarker {
            line: "## x: nope".to_string()
        }
    );
    assert_eq!(err.line(), "## x: nope");
    assert_eq!(err.line_number, 2);
    assert!(err.to_string().contains("invalid cell marker on line 2"));
}

#[test]
fn bare_and_double_spaced_markers_are_malformed() {
    assert!(parser::parse_lines(&["##"]).is_err());
    assert!(parser::parse_lines(&["##  c"]).is_err());
    assert!(parser::parse_lines(&["## "]).is_err());
}

#[test]
fn error_span_points_at_the_marker_line() {
    let source = "x = 1\r\n## x: nope\r\n".to_string();
    let err = Parser::new(source, 7).parse().unwrap_err();
    assert_eq!(err.span, 7..17);
    assert_eq!(err.file_id, 7);
    assert!(err.notes.iter().any(|note| note.contains("`x: nope`")));
}

#[test]
fn parser_splits_source_text() {
    let document = Parser::new("x = 1\r\n## m\n# a\n".to_string(), 0)
        .parse()
        .expect("parse failed");
    assert_eq!(
        document.cells,
        vec![Cell::code(["x = 1\n"]), Cell::prose(["a<br>\n"])]
    );
    assert!(document.metadata.contains_key("nbformat"));
}

#[test]
fn classify_lines() {
    assert_eq!(marker::classify("## m"), Ok(Line::Marker(CellKind::Prose)));
    assert_eq!(marker::classify("##c"), Ok(Line::Marker(CellKind::Code)));
    assert_eq!(marker::classify("# m"), Ok(Line::Content("# m")));
    assert_eq!(marker::classify(" ## m"), Ok(Line::Content(" ## m")));

    let malformed = marker::classify("## x").unwrap_err();
    assert_eq!(malformed.line, "## x");
    assert_eq!(malformed.keyword, "x");
}

#[test]
fn hash_comments_are_stripped() {
    assert_eq!(prose("# Title"), "Title<br>\n");
    assert_eq!(prose("#tight"), "tight<br>\n");
    assert_eq!(prose("#\ttab"), "tab<br>\n");
    assert_eq!(prose("#  two"), " two<br>\n");
    assert_eq!(prose("#"), "<br>\n");
    assert_eq!(prose("# "), "<br>\n");
    assert_eq!(prose("#x"), "<br>\n");
    assert_eq!(prose("# # Heading"), "# Heading<br>\n");
}

#[test]
fn lengths_count_characters() {
    assert_eq!(prose("#é"), "<br>\n");
    assert_eq!(prose("# héllo"), "héllo<br>\n");
    assert_eq!(prose("\"\"\"é"), "é<br>\n");
}

#[test]
fn plain_prose_lines() {
    assert_eq!(prose("plain text"), "plain text<br>\n");
    assert_eq!(prose("  indented"), " indented<br>\n");
    assert_eq!(prose("\"\"\"Summary line."), "Summary line.<br>\n");
    assert_eq!(prose("More text.'''"), "More text.<br>\n");
    assert_eq!(prose("\"\"\" x"), "x<br>\n");
    assert_eq!(prose("\"\"\"x'''"), "x<br>\n");
    assert_eq!(prose(""), "<br>\n");
    assert_eq!(marker::prose_line("'''"), None);
    assert_eq!(marker::prose_line("   \"\"\""), None);
    assert_eq!(marker::prose_line("\"\"\" "), None);
}
