//! mets_validate - Check METS documents for structural consistency.
//!
//! Validates each given METS file (or every `.xml` file below a given
//! directory) and prints the diagnostics found. The exit status is 0 when
//! every document is valid and 1 otherwise.
//!
//! # Usage
//!
//! ```bash
//! mets_validate [OPTIONS] <PATH>...
//! ```
//!
//! # Examples
//!
//! ```bash
//! # Validate one document
//! mets_validate mets.xml
//!
//! # Validate a directory tree with four threads, reporting JSON lines
//! mets_validate --jobs 4 --json archive/
//!
//! # Also require every ALTO file to be referenced by the logical structure
//! mets_validate --alto mets.xml
//! ```

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use rayon::prelude::*;
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use mets_validator::config::DEFAULT_SCHEMA_PATH;
use mets_validator::{Diagnostic, Validator, ValidatorConfig};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Check METS documents for structural consistency.
#[derive(Parser, Debug)]
#[command(name = "mets_validate")]
#[command(version = VERSION)]
#[command(about = "Check METS documents for structural consistency")]
#[command(
    long_about = "Validates the file section, the physical and logical struct maps \
    and the struct links of METS documents, and reports every defect with its line."
)]
struct Args {
    /// METS files, or directories to search for *.xml files
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// XML Schema used for grammar conformance (needs the validation feature)
    #[arg(long, default_value = DEFAULT_SCHEMA_PATH)]
    schema: PathBuf,

    /// Skip grammar conformance
    #[arg(long)]
    no_schema: bool,

    /// Require every ALTO file to be referenced by the logical struct map
    #[arg(long)]
    alto: bool,

    /// Print one JSON object per document instead of text
    #[arg(long)]
    json: bool,

    /// Number of documents to validate in parallel [default: one per CPU]
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Enable debug output
    #[arg(long)]
    debug: bool,
}

/// Validation outcome for one document.
#[derive(Debug, Serialize)]
struct Report {
    path: PathBuf,
    valid: bool,
    diagnostics: Vec<Diagnostic>,
}

/// Expands directories into the `.xml` files below them, sorted by name.
fn collect_paths(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut paths = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            paths.push(input.clone());
            continue;
        }
        for entry in WalkDir::new(input).sort_by_file_name() {
            match entry {
                Ok(e) if e.file_type().is_file() && has_xml_extension(e.path()) => {
                    paths.push(e.path().to_path_buf());
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("Error walking directory: {}", e),
            }
        }
    }
    paths
}

fn has_xml_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
}

fn print_text(out: &mut impl Write, report: &Report) -> io::Result<()> {
    if report.valid {
        return writeln!(out, "{}: valid", report.path.display());
    }
    writeln!(
        out,
        "{}: {} problem(s)",
        report.path.display(),
        report.diagnostics.len()
    )?;
    for d in &report.diagnostics {
        match d.line_number() {
            Some(line) => write!(out, "  line {}: {}", line, d)?,
            None => write!(out, "  {}", d)?,
        }
        match d.cause() {
            Some(cause) if cause != d.message() => writeln!(out, " ({})", cause)?,
            _ => writeln!(out)?,
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = if args.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    if args.jobs == Some(0) {
        eprintln!("Error: jobs must be at least 1");
        return ExitCode::from(2);
    }

    let mut config = ValidatorConfig::new()
        .with_schema_path(&args.schema)
        .with_grammar_check(!args.no_schema);
    if args.alto {
        config = config.with_annotation_check("ALTO");
    }
    let validator = Validator::with_config(&config);
    tracing::debug!(checks = ?validator.check_names(), "validator ready");

    let paths = collect_paths(&args.paths);
    if paths.is_empty() {
        eprintln!("Error: no METS documents found");
        return ExitCode::from(2);
    }

    let validate = |path: &PathBuf| {
        let diagnostics = validator.validate_file(path);
        Report {
            path: path.clone(),
            valid: diagnostics.is_empty(),
            diagnostics,
        }
    };
    if let Some(jobs) = args.jobs {
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
        {
            tracing::warn!("Could not size the thread pool: {}", e);
        }
    }
    tracing::debug!(threads = rayon::current_num_threads(), "validating {} documents", paths.len());
    let reports: Vec<Report> = paths.par_iter().map(validate).collect();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for report in &reports {
        let written = if args.json {
            serde_json::to_string(report)
                .map_err(io::Error::other)
                .and_then(|line| writeln!(out, "{}", line))
        } else {
            print_text(&mut out, report)
        };
        if let Err(e) = written {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    }

    if reports.iter().all(|r| r.valid) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
