//! Structural substitution of macro arguments into a macro body.
//!
//! Parameter identifiers are replaced by the caller's argument expressions,
//! shared rather than copied. Every other supported node is rebuilt with the
//! same kind and operator and no span. Node kinds outside the supported
//! subset abort the run.

use crate::ast::builder;
use crate::ast::{Expr, ExprNode, Stmt, StmtNode};
use crate::{ErrorContext, ExpandError};

/// The macro being instantiated and the arguments it was called with.
#[derive(Debug, Clone, Copy)]
pub struct SubstitutionContext<'a> {
    pub macro_name: &'a str,
    pub params: &'a [String],
    pub args: &'a [ExprNode],
}

impl<'a> SubstitutionContext<'a> {
    pub fn new(macro_name: &'a str, params: &'a [String], args: &'a [ExprNode]) -> Self {
        Self {
            macro_name,
            params,
            args,
        }
    }

    /// The argument bound to `name`. A repeated parameter name binds to its
    /// first position.
    pub fn argument_for(&self, name: &str) -> Option<&'a ExprNode> {
        let position = self.params.iter().position(|param| param == name)?;
        self.args.get(position)
    }
}

pub fn substitute_expr(
    expr: &ExprNode,
    ctx: &SubstitutionContext<'_>,
) -> Result<ExprNode, ExpandError> {
    let rebuilt = match &*expr.value {
        Expr::Ident(name) => {
            if let Some(arg) = ctx.argument_for(name) {
                return Ok(arg.clone());
            }
            Expr::Ident(name.clone())
        }
        Expr::Literal { kind, raw } => Expr::Literal {
            kind: *kind,
            raw: raw.clone(),
        },
        Expr::Binary { left, op, right } => Expr::Binary {
            left: substitute_expr(left, ctx)?,
            op: *op,
            right: substitute_expr(right, ctx)?,
        },
        Expr::Unary { op, operand } => Expr::Unary {
            op: *op,
            operand: substitute_expr(operand, ctx)?,
        },
        Expr::Index { base, index } => Expr::Index {
            base: substitute_expr(base, ctx)?,
            index: substitute_expr(index, ctx)?,
        },
        Expr::Call {
            callee,
            args,
            ellipsis,
        } => Expr::Call {
            callee: substitute_expr(callee, ctx)?,
            args: substitute_exprs(args, ctx)?,
            ellipsis: *ellipsis,
        },
        Expr::Paren(inner) => Expr::Paren(substitute_expr(inner, ctx)?),
        Expr::Selector { .. }
        | Expr::Slice { .. }
        | Expr::TypeAssert { .. }
        | Expr::Composite { .. }
        | Expr::FuncLit { .. }
        | Expr::Type(_) => {
            return Err(ExpandError::UnsupportedExpr {
                kind: expr.value.kind_name(),
                macro_name: ctx.macro_name.to_string(),
                ctx: ErrorContext::with_span(expr.span),
            })
        }
    };
    Ok(builder::expr(rebuilt))
}

fn substitute_exprs(
    exprs: &[ExprNode],
    ctx: &SubstitutionContext<'_>,
) -> Result<Vec<ExprNode>, ExpandError> {
    exprs.iter().map(|expr| substitute_expr(expr, ctx)).collect()
}

pub fn substitute_stmt(
    stmt: &StmtNode,
    ctx: &SubstitutionContext<'_>,
) -> Result<StmtNode, ExpandError> {
    let rebuilt = match &stmt.value {
        Stmt::Assign { lhs, op, rhs } => Stmt::Assign {
            lhs: substitute_exprs(lhs, ctx)?,
            op: *op,
            rhs: substitute_exprs(rhs, ctx)?,
        },
        Stmt::Expr(expr) => Stmt::Expr(substitute_expr(expr, ctx)?),
        Stmt::Comment(comment) => Stmt::Comment(comment.clone()),
        Stmt::IncDec { .. }
        | Stmt::Send { .. }
        | Stmt::Go(_)
        | Stmt::Defer(_)
        | Stmt::Block(_)
        | Stmt::If(_)
        | Stmt::For(_)
        | Stmt::Switch(_)
        | Stmt::Select(_)
        | Stmt::Labeled { .. }
        | Stmt::Return(_)
        | Stmt::Branch { .. }
        | Stmt::Value(_)
        | Stmt::Type(_) => {
            return Err(ExpandError::UnsupportedStmt {
                kind: stmt.value.kind_name(),
                macro_name: ctx.macro_name.to_string(),
                ctx: ErrorContext::with_span(stmt.span),
            })
        }
    };
    Ok(StmtNode::detached(rebuilt))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::ast::builder::{assign, binary, call, expr_stmt, ident, int_lit, selector};
    use crate::ast::{AssignOp, BinaryOp, Span, WithSpan};

    fn params(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_parameter_replaced_by_shared_argument() {
        let names = params(&["a"]);
        let arg = WithSpan::new(
            Arc::new(Expr::Ident("total".into())),
            Span { start: 10, end: 15 },
        );
        let args = vec![arg.clone()];
        let ctx = SubstitutionContext::new("double", &names, &args);

        let body = binary(ident("a"), BinaryOp::Add, ident("a"));
        let result = substitute_expr(&body, &ctx).unwrap();
        let Expr::Binary { left, right, .. } = &*result.value else {
            panic!("expected binary expression");
        };
        assert!(Arc::ptr_eq(&left.value, &arg.value));
        assert!(Arc::ptr_eq(&right.value, &arg.value));
        assert_eq!(left.span, Some(Span { start: 10, end: 15 }));
        assert_eq!(result.span, None);
    }

    #[test]
    fn test_non_parameters_are_rebuilt() {
        let names = params(&["x"]);
        let args = vec![int_lit("7")];
        let ctx = SubstitutionContext::new("m", &names, &args);

        let body = call("print", vec![ident("y"), ident("x")]);
        let result = substitute_expr(&body, &ctx).unwrap();
        assert_eq!(result, call("print", vec![ident("y"), int_lit("7")]));
    }

    #[test]
    fn test_repeated_parameter_binds_first_position() {
        let names = params(&["a", "a"]);
        let args = vec![int_lit("1"), int_lit("2")];
        let ctx = SubstitutionContext::new("m", &names, &args);
        assert_eq!(ctx.argument_for("a"), Some(&args[0]));
    }

    #[test]
    fn test_assign_keeps_operator() {
        let names = params(&["dst", "src"]);
        let args = vec![ident("x"), ident("y")];
        let ctx = SubstitutionContext::new("copy", &names, &args);
        let stmt = assign(vec![ident("dst")], AssignOp::Add, vec![ident("src")]);
        let result = substitute_stmt(&stmt, &ctx).unwrap();
        assert_eq!(
            result,
            assign(vec![ident("x")], AssignOp::Add, vec![ident("y")])
        );
    }

    #[test]
    fn test_selector_is_rejected() {
        let names = params(&[]);
        let ctx = SubstitutionContext::new("log", &names, &[]);
        let stmt = expr_stmt(selector(ident("fmt"), "Println"));
        let err = substitute_stmt(&stmt, &ctx).unwrap_err();
        assert!(matches!(
            err,
            ExpandError::UnsupportedExpr {
                kind: "selector expression",
                ..
            }
        ));
        assert!(err.to_string().contains("in macro 'log'"));
    }

    #[test]
    fn test_return_is_rejected() {
        let names = params(&[]);
        let ctx = SubstitutionContext::new("early", &names, &[]);
        let stmt = StmtNode::detached(Stmt::Return(vec![]));
        let err = substitute_stmt(&stmt, &ctx).unwrap_err();
        assert!(matches!(err, ExpandError::UnsupportedStmt { kind: "return statement", .. }));
    }

    #[test]
    fn test_kept_as_written_statements_are_rejected() {
        let names = params(&[]);
        let ctx = SubstitutionContext::new("wait", &names, &[]);
        let stmt = StmtNode::detached(Stmt::Select("select {}".into()));
        let err = substitute_stmt(&stmt, &ctx).unwrap_err();
        assert!(matches!(err, ExpandError::UnsupportedStmt { kind: "select statement", .. }));
    }

    #[test]
    fn test_spread_call_keeps_ellipsis() {
        let names = params(&["xs"]);
        let args = vec![ident("items")];
        let ctx = SubstitutionContext::new("emit", &names, &args);
        let body = builder::expr(Expr::Call {
            callee: ident("send"),
            args: vec![ident("xs")],
            ellipsis: true,
        });
        let result = substitute_expr(&body, &ctx).unwrap();
        assert!(matches!(
            &*result.value,
            Expr::Call { args, ellipsis: true, .. } if args[0] == ident("items")
        ));
    }
}
