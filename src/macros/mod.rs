//! # gomacro Macro System
//!
//! Purely syntactic, template-style macros. A function whose name carries the
//! marker prefix (`MACRO_` by default) is a template; a call to the
//! unprefixed name elsewhere is replaced by the template body with the
//! parameters substituted positionally.
//!
//! ## Layers
//!
//! - [`types`]: definitions, trace steps, configuration.
//! - [`registry`]: the name-to-definition table.
//! - [`substitute`]: argument substitution into body statements.
//! - [`expander`]: statement walk and splicing.
//! - [`loader`]: recognizing definitions and optional pre-expansion.

pub mod expander;
pub mod loader;
pub mod registry;
pub mod substitute;
pub mod types;

pub use expander::BlockExpander;
pub use registry::MacroTable;
pub use substitute::{substitute_expr, substitute_stmt, SubstitutionContext};
pub use types::{ExpanderConfig, MacroDef, MacroExpansionStep, DEFAULT_PREFIX};
