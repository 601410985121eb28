//! Constructors for detached tree nodes.
//!
//! Used by the expander to rebuild substituted nodes and by tests to state
//! expected shapes without going through the parser.

use std::sync::Arc;

use crate::ast::{AssignOp, BinaryOp, Block, Expr, ExprNode, LitKind, Stmt, StmtNode, UnaryOp};

// ============================================================================
// EXPRESSIONS
// ============================================================================

pub fn expr(value: Expr) -> ExprNode {
    ExprNode::detached(Arc::new(value))
}

pub fn ident(name: &str) -> ExprNode {
    expr(Expr::Ident(name.to_string()))
}

pub fn int_lit(raw: &str) -> ExprNode {
    expr(Expr::Literal {
        kind: LitKind::Int,
        raw: raw.to_string(),
    })
}

pub fn string_lit(raw: &str) -> ExprNode {
    expr(Expr::Literal {
        kind: LitKind::String,
        raw: raw.to_string(),
    })
}

pub fn binary(left: ExprNode, op: BinaryOp, right: ExprNode) -> ExprNode {
    expr(Expr::Binary { left, op, right })
}

pub fn unary(op: UnaryOp, operand: ExprNode) -> ExprNode {
    expr(Expr::Unary { op, operand })
}

pub fn index(base: ExprNode, index: ExprNode) -> ExprNode {
    expr(Expr::Index { base, index })
}

pub fn paren(inner: ExprNode) -> ExprNode {
    expr(Expr::Paren(inner))
}

pub fn call(callee: &str, args: Vec<ExprNode>) -> ExprNode {
    expr(Expr::Call {
        callee: ident(callee),
        args,
        ellipsis: false,
    })
}

pub fn selector(base: ExprNode, field: &str) -> ExprNode {
    expr(Expr::Selector {
        base,
        field: field.to_string(),
    })
}

// ============================================================================
// STATEMENTS
// ============================================================================

pub fn expr_stmt(value: ExprNode) -> StmtNode {
    StmtNode::detached(Stmt::Expr(value))
}

pub fn assign(lhs: Vec<ExprNode>, op: AssignOp, rhs: Vec<ExprNode>) -> StmtNode {
    StmtNode::detached(Stmt::Assign { lhs, op, rhs })
}

pub fn block_stmt(stmts: Vec<StmtNode>) -> StmtNode {
    StmtNode::detached(Stmt::Block(Block::new(stmts)))
}
