//! Recognizes macro definitions among function declarations.
//!
//! A function is a macro definition iff its name starts with the configured
//! prefix. Under recursive mode the body is expanded against the macros
//! defined so far before it is recorded, so a macro never sees itself or
//! anything defined after it.

use tracing::debug;

use crate::ast::{FuncDecl, Span};
use crate::macros::expander::BlockExpander;
use crate::macros::registry::MacroTable;
use crate::macros::types::{ExpanderConfig, MacroDef, MacroExpansionStep};
use crate::ExpandError;

/// The public macro name for `func`, or `None` if it is an ordinary function.
///
/// ```rust
/// use gomacro::ast::{Block, FuncDecl};
/// use gomacro::macros::loader::macro_name;
/// let func = FuncDecl {
///     receiver: None,
///     name: "MACRO_swap".into(),
///     type_params: None,
///     params: vec![],
///     results: None,
///     body: Block::default(),
/// };
/// assert_eq!(macro_name(&func, "MACRO_"), Some("swap"));
/// assert_eq!(macro_name(&func, "TEMPLATE_"), None);
/// ```
pub fn macro_name<'f>(func: &'f FuncDecl, prefix: &str) -> Option<&'f str> {
    func.name.strip_prefix(prefix)
}

/// Builds the definition for a macro-marked function.
///
/// Returns the definition and the splices made while pre-expanding its body
/// (always empty unless `config.recursive`).
pub fn load_macro(
    name: &str,
    func: &FuncDecl,
    span: Option<Span>,
    table: &MacroTable,
    config: &ExpanderConfig,
) -> Result<(MacroDef, Vec<MacroExpansionStep>), ExpandError> {
    let (body, trace) = if config.recursive {
        let mut expander = BlockExpander::new(table);
        let body = expander.expand_block(&func.body)?;
        (body, expander.into_trace())
    } else {
        (func.body.clone(), Vec::new())
    };

    let def = MacroDef {
        name: name.to_string(),
        params: func.param_names(),
        body,
        span,
    };
    debug!(
        macro_name = %def.name,
        arity = def.arity(),
        pre_expanded = trace.len(),
        "recorded macro definition"
    );
    Ok((def, trace))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::builder::{call, expr_stmt, ident};
    use crate::ast::{Block, ParamGroup};

    fn func(name: &str, params: &[&str], stmts: Vec<crate::ast::StmtNode>) -> FuncDecl {
        FuncDecl {
            receiver: None,
            name: name.to_string(),
            type_params: None,
            params: vec![ParamGroup {
                names: params.iter().map(|p| p.to_string()).collect(),
                ty: Some("int".into()),
            }],
            results: None,
            body: Block::new(stmts),
        }
    }

    #[test]
    fn test_custom_prefix() {
        let decl = func("TPL_log", &[], vec![]);
        assert_eq!(macro_name(&decl, "TPL_"), Some("log"));
        assert_eq!(macro_name(&decl, "MACRO_"), None);
    }

    #[test]
    fn test_non_recursive_keeps_body_verbatim() {
        let mut table = MacroTable::new();
        table.define(MacroDef::new("a", vec![], Block::default()));
        let decl = func("MACRO_b", &["x"], vec![expr_stmt(call("a", vec![]))]);
        let (def, trace) =
            load_macro("b", &decl, None, &table, &ExpanderConfig::default()).unwrap();
        assert_eq!(def.params, vec!["x"]);
        assert_eq!(def.body, decl.body);
        assert!(trace.is_empty());
    }

    #[test]
    fn test_recursive_pre_expands_earlier_macros() {
        let mut table = MacroTable::new();
        table.define(MacroDef::new(
            "a",
            vec!["v".into()],
            Block::new(vec![expr_stmt(call("touch", vec![ident("v")]))]),
        ));
        let decl = func("MACRO_b", &["x"], vec![expr_stmt(call("a", vec![ident("x")]))]);
        let config = ExpanderConfig::default().recursive(true);
        let (def, trace) = load_macro("b", &decl, None, &table, &config).unwrap();
        assert_eq!(
            def.body.stmts,
            vec![expr_stmt(call("touch", vec![ident("x")]))]
        );
        assert_eq!(trace.len(), 1);
    }

    #[test]
    fn test_recursive_macro_does_not_see_itself() {
        let table = MacroTable::new();
        let decl = func("MACRO_loop", &[], vec![expr_stmt(call("loop", vec![]))]);
        let config = ExpanderConfig::default().recursive(true);
        let (def, _) = load_macro("loop", &decl, None, &table, &config).unwrap();
        assert_eq!(def.body, decl.body);
    }
}
