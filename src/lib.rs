//! gomacro: template macros for Go-like source.
//!
//! A function named `MACRO_name` is a template. Every statement elsewhere
//! that calls `name(...)` is replaced by the template body with its
//! parameters substituted by the call's arguments, and the template itself is
//! removed from the output.
//!
//! ```rust
//! use gomacro::engine::ExpansionPipeline;
//!
//! let source = concat!(
//!     "package main\n\n",
//!     "func MACRO_inc(v int) {\n\tv = v + 1\n}\n\n",
//!     "func main() {\n\tinc(n)\n}\n",
//! );
//! let output = ExpansionPipeline::default().expand_to_string("main.go", source).unwrap();
//! assert_eq!(output, "package main\n\nfunc main() {\n\tn = n + 1\n}\n");
//! ```

pub use crate::diagnostics::{to_error_source, ErrorContext, ErrorType, ExpandError, SourceArc};

pub mod ast;
pub mod cli;
pub mod diagnostics;
pub mod engine;
pub mod macros;
pub mod syntax;
