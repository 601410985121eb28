//! Defines the command-line arguments for the gomacro CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

use crate::macros::{ExpanderConfig, DEFAULT_PREFIX};

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "gomacro",
    version,
    about = "Expands MACRO_-prefixed function templates in Go source."
)]
pub struct GomacroArgs {
    /// Expand macro calls inside macro bodies at definition time.
    #[arg(short, long)]
    pub recursive: bool,

    /// Function-name marker that identifies macro definitions.
    #[arg(long, value_name = "MARKER", default_value = DEFAULT_PREFIX)]
    pub prefix: String,

    /// Print every macro splice to stderr as a colored diff.
    #[arg(long)]
    pub trace: bool,

    /// What to write to OUTPUT.
    #[arg(long, value_enum, default_value_t = EmitFormat::Source)]
    pub emit: EmitFormat,

    /// How to report a failure on stderr.
    #[arg(long, value_enum, default_value_t = ErrorFormat::Short)]
    pub error_format: ErrorFormat,

    /// Raise the log level (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// The template file to expand.
    pub input: PathBuf,

    /// Where to write the expanded program.
    pub output: PathBuf,
}

/// Output representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EmitFormat {
    /// Canonically formatted source text.
    Source,
    /// The expanded tree as JSON.
    Ast,
}

/// Diagnostic renderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ErrorFormat {
    /// One line: `file:line:col: error[code]: message`.
    Short,
    /// The full report with the offending source underlined.
    Full,
}

impl GomacroArgs {
    pub fn expander_config(&self) -> ExpanderConfig {
        ExpanderConfig::default()
            .recursive(self.recursive)
            .with_prefix(self.prefix.as_str())
    }

    /// Default log directive for the requested verbosity.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
