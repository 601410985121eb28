//! Core macro types.
//!
//! This module has no dependencies on other macro modules, making it the
//! foundation layer for the table, the substitution engine and the expander.

use serde::{Deserialize, Serialize};

use crate::ast::{Block, Span, StmtNode};

/// The function-name marker that turns a declaration into a macro definition.
pub const DEFAULT_PREFIX: &str = "MACRO_";

/// A macro recorded from a marker-prefixed function declaration.
///
/// The body is a read-only template: expansion substitutes into copies of its
/// statements and never modifies it.
///
/// # Examples
///
/// ```rust
/// use gomacro::ast::Block;
/// use gomacro::macros::MacroDef;
/// let def = MacroDef::new("swap", vec!["a".into(), "b".into()], Block::default());
/// assert_eq!(def.arity(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroDef {
    /// The public name, with the marker stripped.
    pub name: String,
    /// Parameter names in declaration order, groups flattened.
    pub params: Vec<String>,
    pub body: Block,
    /// Span of the defining declaration, if parsed from source.
    pub span: Option<Span>,
}

impl MacroDef {
    pub fn new(name: impl Into<String>, params: Vec<String>, body: Block) -> Self {
        Self {
            name: name.into(),
            params,
            body,
            span: None,
        }
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// A single macro expansion step, for traceability.
///
/// Each step records the statement that contained the macro call and the
/// statements spliced in its place.
#[derive(Debug, Clone)]
pub struct MacroExpansionStep {
    /// The macro name invoked
    pub macro_name: String,
    /// The statement before expansion
    pub input: StmtNode,
    /// The statements that replaced it
    pub output: Vec<StmtNode>,
}

/// Explicit expansion settings, threaded through the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpanderConfig {
    /// Pre-expand each macro body against earlier macros before recording it.
    pub recursive: bool,
    /// Function-name marker for macro definitions.
    pub prefix: String,
}

impl Default for ExpanderConfig {
    fn default() -> Self {
        Self {
            recursive: false,
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl ExpanderConfig {
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}
