//! Macro table for storage and lookup of macro definitions.
//!
//! # Features
//! - Define and look up macros by name (case-sensitive).
//! - Redefining a name replaces the earlier definition. The replacement is
//!   logged at `warn` level but is not an error.
//!
//! # Thread Safety
//! This type is **not** thread-safe. One table belongs to one expansion run.

use std::collections::HashMap;

use tracing::warn;

use crate::macros::types::MacroDef;

/// Macro name to definition, filled in declaration order.
#[derive(Debug, Clone, Default)]
pub struct MacroTable {
    macros: HashMap<String, MacroDef>,
}

impl MacroTable {
    /// Creates a new, empty macro table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use gomacro::macros::MacroTable;
    /// let table = MacroTable::new();
    /// assert!(table.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a definition under its name.
    ///
    /// # Returns
    /// `Some(old)` if a macro with this name was already defined.
    ///
    /// # Example
    /// ```rust
    /// use gomacro::ast::Block;
    /// use gomacro::macros::{MacroDef, MacroTable};
    /// let mut table = MacroTable::new();
    /// assert!(table.define(MacroDef::new("inc", vec!["x".into()], Block::default())).is_none());
    /// let old = table.define(MacroDef::new("inc", vec![], Block::default()));
    /// assert_eq!(old.unwrap().arity(), 1);
    /// assert_eq!(table.lookup("inc").unwrap().arity(), 0);
    /// ```
    pub fn define(&mut self, def: MacroDef) -> Option<MacroDef> {
        let old = self.macros.insert(def.name.clone(), def);
        if let Some(previous) = &old {
            warn!(
                macro_name = %previous.name,
                "macro redefined; the later definition replaces the earlier one"
            );
        }
        old
    }

    pub fn lookup(&self, name: &str) -> Option<&MacroDef> {
        self.macros.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }

    /// All macro names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.macros.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder::{call, expr_stmt, ident};
    use crate::ast::Block;

    #[test]
    fn test_lookup_is_case_sensitive() {
        let mut table = MacroTable::new();
        table.define(MacroDef::new("log", vec![], Block::default()));
        assert!(table.contains("log"));
        assert!(!table.contains("Log"));
        assert!(table.lookup("LOG").is_none());
    }

    #[test]
    fn test_last_definition_wins() {
        let mut table = MacroTable::new();
        let first = Block::new(vec![expr_stmt(call("a", vec![]))]);
        let second = Block::new(vec![expr_stmt(call("b", vec![ident("x")]))]);
        table.define(MacroDef::new("m", vec![], first));
        table.define(MacroDef::new("m", vec!["x".into()], second.clone()));
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("m").unwrap().body, second);
    }

    #[test]
    fn test_names_sorted() {
        let mut table = MacroTable::new();
        for name in ["zeta", "alpha", "mid"] {
            table.define(MacroDef::new(name, vec![], Block::default()));
        }
        assert_eq!(table.names(), vec!["alpha", "mid", "zeta"]);
    }
}
