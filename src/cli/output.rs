//! Handles all user-facing output for the CLI.
//!
//! Diagnostics and traces go to stderr; the expanded program only ever goes
//! to the output file.

use difference::{Changeset, Difference};
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::cli::args::ErrorFormat;
use crate::macros::MacroExpansionStep;
use crate::syntax::printer::format_stmts;
use crate::ExpandError;

// ============================================================================
// CORE OUTPUT FUNCTIONS: User-facing CLI output utilities
// ============================================================================

/// Prints a macro expansion trace to stderr with colored diffs.
///
/// Each step shows the statement that contained the call, removed, and the
/// statements spliced in its place, added.
pub fn print_trace(trace: &[MacroExpansionStep]) {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);

    for (i, step) in trace.iter().enumerate() {
        let _ = stderr.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true));
        let _ = writeln!(stderr, "--- Step {}: {} ---", i, step.macro_name);
        let _ = stderr.reset();

        let before = format_stmts(std::slice::from_ref(&step.input));
        let after = format_stmts(&step.output);
        let changeset = Changeset::new(before.trim_end(), after.trim_end(), "\n");
        print_diff(&mut stderr, &changeset.diffs);
        let _ = writeln!(stderr);
    }
}

/// Prints an error as a one-line summary, or with full miette diagnostics.
pub fn print_error(error: ExpandError, format: ErrorFormat) {
    match format {
        ErrorFormat::Short => eprintln!("{}", error.summary()),
        ErrorFormat::Full => {
            let report = miette::Report::new(error);
            eprintln!("{report:?}");
        }
    }
}

// ============================================================================
// PRIVATE HELPERS
// ============================================================================

fn print_diff(stderr: &mut StandardStream, diffs: &[Difference]) {
    for diff in diffs {
        let (color, marker, text) = match diff {
            Difference::Same(x) => (None, ' ', x),
            Difference::Add(x) => (Some(Color::Green), '+', x),
            Difference::Rem(x) => (Some(Color::Red), '-', x),
        };
        let _ = stderr.set_color(ColorSpec::new().set_fg(color));
        for line in text.lines() {
            let _ = writeln!(stderr, "{}{}", marker, line);
        }
    }
    let _ = stderr.reset();
}
