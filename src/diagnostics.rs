//! Unified, `miette`-based diagnostics for gomacro.
//!
//! Every failure in the pipeline (parsing, substitution, arity checking, file
//! I/O) is an [`ExpandError`]. All of them are fatal: the run aborts on the
//! first one and nothing is written.
//!
//! # Error Construction Macros
//!
//! - **Use `err_msg!` for message-only errors.**
//!   - `err_msg!(Io, "cannot write {}", path.display())`
//!
//! - **Use `err_ctx!` for errors pointing at a span.**
//!   - `err_ctx!(Parse, "Missing closing brace", span)`
//!   - `err_ctx!(Parse, "Missing closing brace", span, "add a '}'")`
//!
//! Spans are byte ranges into the input text. The source itself is attached
//! later, with [`ExpandError::with_source`], once the caller knows which file
//! the tree came from.

use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use thiserror::Error;

use crate::ast::Span;

pub type SourceArc = Arc<NamedSource<String>>;

/// Type-safe error classification, one per [`ExpandError`] family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Malformed source text
    Parse,
    /// A node kind the substitution engine does not handle
    Unsupported,
    /// Macro called with the wrong number of arguments
    Arity,
    /// Reading or writing a file failed
    Io,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Parse => "Parse",
            ErrorType::Unsupported => "Unsupported",
            ErrorType::Arity => "Arity",
            ErrorType::Io => "Io",
        }
    }

    /// The diagnostic code shown by miette.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorType::Parse => "gomacro::parse",
            ErrorType::Unsupported => "gomacro::unsupported",
            ErrorType::Arity => "gomacro::arity",
            ErrorType::Io => "gomacro::io",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Minimal, composable error context for diagnostics.
#[derive(Debug, Default)]
pub struct ErrorContext {
    /// The source text the span points into (if known).
    pub source: Option<SourceArc>,
    /// The primary span for this error (if any).
    pub span: Option<Span>,
    /// An optional help message.
    pub help: Option<String>,
}

impl ErrorContext {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_span(span: Option<Span>) -> Self {
        Self {
            source: None,
            span,
            help: None,
        }
    }

    pub fn with_help(span: Option<Span>, help: String) -> Self {
        Self {
            source: None,
            span,
            help: Some(help),
        }
    }
}

/// Unified error type for every gomacro failure mode.
#[derive(Debug, Error)]
pub enum ExpandError {
    #[error("Parse error: {message}")]
    Parse {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
    #[error("unsupported expression kind: {kind} (in macro '{macro_name}')")]
    UnsupportedExpr {
        kind: &'static str,
        macro_name: String,
        ctx: ErrorContext,
    },
    #[error("unsupported statement kind: {kind} (in macro '{macro_name}')")]
    UnsupportedStmt {
        kind: &'static str,
        macro_name: String,
        ctx: ErrorContext,
    },
    #[error(
        "Arity error: macro '{macro_name}' takes {expected} argument(s) but {actual} were supplied"
    )]
    Arity {
        macro_name: String,
        expected: usize,
        actual: usize,
        ctx: ErrorContext,
    },
    #[error("I/O error: {message}")]
    Io {
        message: String,
        ctx: ErrorContext,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
}

impl ExpandError {
    fn get_ctx(&self) -> &ErrorContext {
        match self {
            ExpandError::Parse { ctx, .. } => ctx,
            ExpandError::UnsupportedExpr { ctx, .. } => ctx,
            ExpandError::UnsupportedStmt { ctx, .. } => ctx,
            ExpandError::Arity { ctx, .. } => ctx,
            ExpandError::Io { ctx, .. } => ctx,
        }
    }

    fn get_ctx_mut(&mut self) -> &mut ErrorContext {
        match self {
            ExpandError::Parse { ctx, .. } => ctx,
            ExpandError::UnsupportedExpr { ctx, .. } => ctx,
            ExpandError::UnsupportedStmt { ctx, .. } => ctx,
            ExpandError::Arity { ctx, .. } => ctx,
            ExpandError::Io { ctx, .. } => ctx,
        }
    }

    pub fn error_type(&self) -> ErrorType {
        match self {
            ExpandError::Parse { .. } => ErrorType::Parse,
            ExpandError::UnsupportedExpr { .. } | ExpandError::UnsupportedStmt { .. } => {
                ErrorType::Unsupported
            }
            ExpandError::Arity { .. } => ErrorType::Arity,
            ExpandError::Io { .. } => ErrorType::Io,
        }
    }

    /// The span this error points at, if any.
    pub fn span(&self) -> Option<Span> {
        self.get_ctx().span
    }

    /// Attaches the source text the error's span refers to.
    ///
    /// An already attached source is kept.
    pub fn with_source(mut self, source: &SourceArc) -> Self {
        let ctx = self.get_ctx_mut();
        if ctx.source.is_none() {
            ctx.source = Some(SourceArc::clone(source));
        }
        self
    }

    /// One-line rendering, `file:line:col: error[code]: message`.
    ///
    /// The location is left out until both a span and a source are known.
    pub fn summary(&self) -> String {
        let ctx = self.get_ctx();
        let location = match (&ctx.source, ctx.span) {
            (Some(source), Some(span)) => {
                let (line, column) = line_column(source.inner(), span.start);
                format!("{}:{}:{}: ", source.name(), line, column)
            }
            _ => String::new(),
        };
        format!("{}error[{}]: {}", location, self.error_type().code(), self)
    }

    /// Wraps an I/O failure on `path`.
    pub fn io(operation: &str, path: &std::path::Path, error: std::io::Error) -> Self {
        ExpandError::Io {
            message: format!("failed to {} '{}': {}", operation, path.display(), error),
            ctx: ErrorContext::none(),
            source: Some(Box::new(error)),
        }
    }
}

impl Diagnostic for ExpandError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new(self.error_type().code()))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        self.get_ctx()
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn std::fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.get_ctx()
            .source
            .as_ref()
            .map(|s| s.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let ctx = self.get_ctx();
        // A label without source text cannot be rendered.
        let source_len = ctx.source.as_ref()?.inner().len();
        let span = ctx.span?;
        let text = match self {
            ExpandError::Parse { message, .. } => message.clone(),
            ExpandError::UnsupportedExpr { kind, .. }
            | ExpandError::UnsupportedStmt { kind, .. } => {
                format!("{} not allowed in a macro body", kind)
            }
            ExpandError::Arity { expected, .. } => format!("expected {} argument(s)", expected),
            ExpandError::Io { message, .. } => message.clone(),
        };
        // Point-like spans (e.g. end of input) still get a one-character
        // label when there is a character to underline.
        let start = span.start.min(source_len);
        let len = if span.end > start {
            span.end.min(source_len) - start
        } else if start < source_len {
            1
        } else {
            0
        };
        Some(Box::new(std::iter::once(LabeledSpan::new(
            Some(text),
            start,
            len,
        ))))
    }
}

/// 1-based line and column of a byte offset.
fn line_column(text: &str, offset: usize) -> (usize, usize) {
    let before = text.get(..offset.min(text.len())).unwrap_or(text);
    let line = before.matches('\n').count() + 1;
    let column = before.rsplit('\n').next().map_or(0, |l| l.chars().count()) + 1;
    (line, column)
}

/// Converts a source string into an `Arc<NamedSource<String>>` for use in error contexts.
pub fn to_error_source<S: AsRef<str>>(name: &str, source: S) -> SourceArc {
    Arc::new(NamedSource::new(name, source.as_ref().to_string()))
}

/// Constructs a message-only error for variants carrying `message`, `ctx`
/// and `source` fields (`Parse`, `Io`).
#[macro_export]
macro_rules! err_msg {
    ($variant:ident, $($arg:tt)+) => {
        $crate::ExpandError::$variant {
            message: format!($($arg)+),
            ctx: $crate::ErrorContext::none(),
            source: None,
        }
    };
}

/// Constructs an error pointing at a span, optionally with a help message.
#[macro_export]
macro_rules! err_ctx {
    // Message, span, help
    ($variant:ident, $msg:expr, $span:expr, $help:expr) => {
        $crate::ExpandError::$variant {
            message: $msg.to_string(),
            ctx: $crate::ErrorContext::with_help(Some($span), format!("{}", $help)),
            source: None,
        }
    };
    // Message, span
    ($variant:ident, $msg:expr, $span:expr) => {
        $crate::ExpandError::$variant {
            message: $msg.to_string(),
            ctx: $crate::ErrorContext::with_span(Some($span)),
            source: None,
        }
    };
}

#[cfg(test)]
mod diagnostics_tests {
    use miette::Report;

    use super::*;

    #[test]
    fn test_report_includes_code_label_and_help() {
        let src = to_error_source("input.go", "x := (1 + 2");
        let err = crate::err_ctx!(
            Parse,
            "Missing closing parenthesis",
            Span { start: 5, end: 11 },
            "add a ')'"
        )
        .with_source(&src);
        let output = format!("{:?}", Report::new(err));
        assert!(output.contains("gomacro::parse"));
        assert!(output.contains("Missing closing parenthesis"));
        assert!(output.contains("add a ')'"));
    }

    #[test]
    fn test_with_source_keeps_existing_source() {
        let first = to_error_source("first.go", "abc");
        let second = to_error_source("second.go", "def");
        let err = crate::err_ctx!(Parse, "bad", Span { start: 0, end: 1 })
            .with_source(&first)
            .with_source(&second);
        let ExpandError::Parse { ctx, .. } = err else {
            panic!("expected parse error");
        };
        assert_eq!(ctx.source.unwrap().name(), "first.go");
    }

    #[test]
    fn test_error_types() {
        let err = ExpandError::Arity {
            macro_name: "swap".to_string(),
            expected: 2,
            actual: 1,
            ctx: ErrorContext::none(),
        };
        assert_eq!(err.error_type(), ErrorType::Arity);
        assert!(err.to_string().contains("'swap' takes 2 argument(s) but 1 were supplied"));

        let err = crate::err_msg!(Io, "cannot write {}", "out.go");
        assert_eq!(err.error_type(), ErrorType::Io);
        assert_eq!(err.to_string(), "I/O error: cannot write out.go");
    }

    #[test]
    fn test_summary_is_one_line_with_location() {
        let src = to_error_source("input.go", "package main\nfunc main() {\n\tx := (1\n}\n");
        let err = crate::err_ctx!(
            Parse,
            "Missing closing parenthesis",
            Span { start: 33, end: 34 },
            "'(' opened here is never closed"
        );
        assert_eq!(
            err.summary(),
            "error[gomacro::parse]: Parse error: Missing closing parenthesis"
        );
        let summary = err.with_source(&src).summary();
        assert_eq!(
            summary,
            "input.go:3:7: error[gomacro::parse]: Parse error: Missing closing parenthesis"
        );
        assert!(!summary.contains('\n'));
    }

    #[test]
    fn test_labels_require_source() {
        let err = ExpandError::UnsupportedExpr {
            kind: "selector expression",
            macro_name: "log".to_string(),
            ctx: ErrorContext::with_span(Some(Span { start: 2, end: 9 })),
        };
        assert!(err.labels().is_none());
        let src = to_error_source("input.go", "  fmt.Println(x)");
        let err = err.with_source(&src);
        let labels: Vec<_> = err.labels().unwrap().collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].offset(), 2);
        assert_eq!(labels[0].len(), 7);
    }
}
