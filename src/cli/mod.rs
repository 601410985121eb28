//! The gomacro Command-Line Interface.
//!
//! This module is the main entry point for the binary and orchestrates the
//! core library functions: read the template, expand it, write the result.
//! Any failure is reported once on stderr and exits with status 1 before
//! the output file is touched.

use clap::Parser;
use std::{fs, path::Path, process};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::args::{EmitFormat, GomacroArgs};
use crate::engine::ExpansionPipeline;
use crate::syntax::printer;
use crate::ExpandError;

pub mod args;
pub mod output;

/// The main entry point for the CLI.
pub fn run() {
    let args = GomacroArgs::parse();
    init_logging(&args);

    if let Err(e) = execute(&args) {
        output::print_error(e, args.error_format);
        process::exit(1);
    }
}

/// Runs one expansion as described by `args`.
pub fn execute(args: &GomacroArgs) -> Result<(), ExpandError> {
    let source = read_file(&args.input)?;
    let pipeline = ExpansionPipeline::new(args.expander_config());
    let expansion = pipeline.expand_source(&args.input.display().to_string(), &source)?;

    if args.trace {
        output::print_trace(&expansion.trace);
    }

    let rendered = match args.emit {
        EmitFormat::Source => printer::format_program(&expansion.program),
        EmitFormat::Ast => ExpansionPipeline::program_to_json(&expansion.program)?,
    };

    fs::write(&args.output, rendered)
        .map_err(|e| ExpandError::io("write", &args.output, e))?;
    info!(
        input = %args.input.display(),
        output = %args.output.display(),
        macros = expansion.macros.len(),
        "wrote expanded program"
    );
    Ok(())
}

fn read_file(path: &Path) -> Result<String, ExpandError> {
    fs::read_to_string(path).map_err(|e| ExpandError::io("read", path, e))
}

/// `RUST_LOG` wins over `-v`; logs go to stderr.
fn init_logging(args: &GomacroArgs) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
}
