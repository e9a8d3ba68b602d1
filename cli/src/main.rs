mod test_runner;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use flexi_logger::{Logger, LoggerHandle};
use log::debug;

use p2j::cell::AssemblerOptions;
use p2j::files::{self, Direction};
use p2j::{Document, ParseError, ScriptWriter, Templates};

const SUBCOMMANDS: &[&str] = &["convert", "reverse", "test", "help"];

#[derive(Parser)]
#[command(
    name = "p2j",
    version,
    about = "Convert annotated scripts to notebooks and back"
)]
struct Cli {
    /// Disable colored error output
    #[arg(long, global = true)]
    no_color: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert an annotated script into a notebook
    Convert(ConvertArgs),

    /// Convert a notebook back into an annotated script
    Reverse(ReverseArgs),

    /// Run .test.py fixture files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct ConvertArgs {
    /// Script to convert
    source: PathBuf,

    /// Notebook to write (defaults to the source with an .ipynb extension)
    #[arg(short, long)]
    target: Option<PathBuf>,

    /// Replace the target if it already exists
    #[arg(short, long)]
    overwrite: bool,

    /// Parse only, don't write (exit 0 if valid)
    #[arg(long)]
    check: bool,

    /// Dump the parsed document
    #[arg(long)]
    dump: bool,

    /// List the cells of the parsed document
    #[arg(long)]
    list_cells: bool,

    /// Start a new cell at every marker, even one that keeps the current kind
    #[arg(long)]
    split_cells: bool,

    /// Directory with cell_code.json, cell_markdown.json and metadata.json
    #[arg(long)]
    templates: Option<PathBuf>,
}

#[derive(clap::Args)]
struct ReverseArgs {
    /// Notebook to convert
    source: PathBuf,

    /// Script to write (defaults to the source with a .py extension)
    #[arg(short, long)]
    target: Option<PathBuf>,

    /// Replace the target if it already exists
    #[arg(short, long)]
    overwrite: bool,

    /// Emit a marker before every cell so consecutive cells of one kind survive
    #[arg(long)]
    split_cells: bool,

    /// Print the script instead of writing a file
    #[arg(long)]
    stdout: bool,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.py file or directory containing them
    path: PathBuf,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    // If the first positional arg is not a known subcommand, inject "convert"
    // so `p2j script.py` works like `p2j convert script.py`.
    let mut args: Vec<String> = std::env::args().collect();
    if let Some(pos) = args
        .iter()
        .skip(1)
        .position(|a| !a.starts_with('-'))
        .map(|p| p + 1)
    {
        if !SUBCOMMANDS.contains(&args[pos].as_str()) {
            args.insert(pos, "convert".to_string());
        }
    }

    let cli = Cli::parse_from(&args);
    let _logger = init_logging(cli.verbose);

    match cli.command {
        Command::Convert(convert_args) => do_convert(convert_args, cli.no_color),
        Command::Reverse(reverse_args) => do_reverse(reverse_args),
        Command::Test(test_args) => {
            if test_args.list_categories {
                test_runner::list_categories(&test_args.path);
                return;
            }
            let exit_code =
                test_runner::run_tests(&test_args.path, cli.no_color, &test_args.category);
            process::exit(exit_code);
        }
    }
}

/// Log to stderr. `RUST_LOG` takes precedence over the verbosity flags.
fn init_logging(verbose: u8) -> Option<LoggerHandle> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    match Logger::try_with_env_or_str(level).and_then(|logger| logger.log_to_stderr().start()) {
        Ok(handle) => Some(handle),
        Err(err) => {
            eprintln!("warning: cannot initialize logging: {}", err);
            None
        }
    }
}

fn do_convert(args: ConvertArgs, no_color: bool) {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    let templates = match &args.templates {
        Some(dir) => Templates::from_dir(dir).unwrap_or_else(|err| fail(err)),
        None => Templates::builtin().clone(),
    };

    // Resolve the target before touching the source, unless nothing is written
    let writes = !(args.check || args.dump || args.list_cells);
    let target = if writes {
        let target = files::resolve_target(
            &args.source,
            args.target.as_deref(),
            args.overwrite,
            Direction::ScriptToNotebook,
        );
        Some(target.unwrap_or_else(|err| fail(err)))
    } else {
        None
    };

    let source = files::read_source(&args.source).unwrap_or_else(|err| fail(err));

    // Set up codespan file database
    let mut source_files = SimpleFiles::new();
    let file_id = source_files.add(args.source.display().to_string(), source.clone());

    let options = AssemblerOptions {
        split_on_repeated_marker: args.split_cells,
    };
    let parser = p2j::Parser::new(source, file_id)
        .with_options(options)
        .with_templates(&templates);
    let document = match parser.parse() {
        Ok(document) => {
            debug!(
                "parsed {} into {} cell(s)",
                args.source.display(),
                document.cells.len()
            );
            document
        }
        Err(error) => {
            emit_parse_error(color_choice, &source_files, &error);
            process::exit(1);
        }
    };

    if args.check {
        eprintln!(
            "ok: {} parsed successfully ({} cells)",
            args.source.display(),
            document.cells.len()
        );
        return;
    }

    if args.dump {
        println!("{:#?}", document.cells);
        return;
    }

    if args.list_cells {
        print_cells(&document);
        return;
    }

    if let Some(target) = target {
        files::write_notebook(&target, &document, &templates).unwrap_or_else(|err| fail(err));
        println!("Notebook {} written.", target.display());
    }
}

fn do_reverse(args: ReverseArgs) {
    let target = if args.stdout {
        None
    } else {
        let target = files::resolve_target(
            &args.source,
            args.target.as_deref(),
            args.overwrite,
            Direction::NotebookToScript,
        );
        Some(target.unwrap_or_else(|err| fail(err)))
    };

    let document = files::read_notebook(&args.source).unwrap_or_else(|err| fail(err));
    debug!(
        "read {} cell(s) from {}",
        document.cells.len(),
        args.source.display()
    );
    let writer = ScriptWriter::new(AssemblerOptions {
        split_on_repeated_marker: args.split_cells,
    });
    let script = writer.write_string(&document);

    match target {
        Some(target) => {
            files::write_script(&target, &script).unwrap_or_else(|err| fail(err));
            println!("Script {} written.", target.display());
        }
        None => print!("{}", script),
    }
}

fn emit_parse_error(
    color_choice: ColorChoice,
    files: &SimpleFiles<String, String>,
    error: &ParseError,
) {
    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();
    let diagnostic = error.to_diagnostic();
    let _ = term::emit_to_write_style(&mut writer.lock(), &config, files, &diagnostic);
}

fn print_cells(document: &Document) {
    for (index, cell) in document.cells.iter().enumerate() {
        let first = cell
            .lines
            .first()
            .map(|line| line.trim_end().to_string())
            .unwrap_or_default();
        println!(
            "{:>3}  {:<5}  {:>3} line(s)  {}",
            index,
            cell.kind.to_string(),
            cell.lines.len(),
            first
        );
    }
}

fn fail(error: impl std::fmt::Display) -> ! {
    eprintln!("error: {}", error);
    process::exit(1);
}
