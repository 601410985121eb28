//! Block expansion: finds macro calls and splices macro bodies in place of
//! the statements that contain them.
//!
//! ## Rules
//!
//! - Each statement is walked pre-order, left to right. A call whose callee
//!   is a bare identifier naming a known macro is a match; its arguments are
//!   not searched further.
//! - A match replaces the *whole* enclosing statement, however deeply the
//!   call is nested in it. With several matches the last one wins.
//! - Nested blocks (`{ }`, `if`/`else` and `for` bodies, `case` bodies,
//!   function literal bodies) are expanded on their own. Calls inside them
//!   never replace the enclosing statement.
//! - Spliced statements are not scanned again.
//! - `select` statements are kept as written and never scanned.

use std::sync::Arc;

use tracing::debug;

use crate::ast::{
    Block, CaseClause, DeclGroup, Element, Expr, ExprNode, ForHeader, ForStmt, GroupEntry,
    IfStmt, Span, Stmt, StmtNode, SwitchStmt, ValueDecl, ValueSpec,
};
use crate::macros::registry::MacroTable;
use crate::macros::substitute::{substitute_stmt, SubstitutionContext};
use crate::macros::types::{MacroDef, MacroExpansionStep};
use crate::{ErrorContext, ExpandError};

/// The replacement produced by the last macro call found in a statement.
struct Splice {
    macro_name: String,
    stmts: Vec<StmtNode>,
}

/// Expands blocks against a fixed macro table, recording every splice.
pub struct BlockExpander<'a> {
    table: &'a MacroTable,
    trace: Vec<MacroExpansionStep>,
}

impl<'a> BlockExpander<'a> {
    pub fn new(table: &'a MacroTable) -> Self {
        Self {
            table,
            trace: Vec::new(),
        }
    }

    /// The splices performed so far, in order.
    pub fn trace(&self) -> &[MacroExpansionStep] {
        &self.trace
    }

    pub fn into_trace(self) -> Vec<MacroExpansionStep> {
        self.trace
    }

    /// Returns a new block with every macro-bearing statement replaced.
    pub fn expand_block(&mut self, block: &Block) -> Result<Block, ExpandError> {
        let mut stmts = Vec::with_capacity(block.stmts.len());

        for stmt in &block.stmts {
            let mut found = None;
            let walked = self.walk_stmt(stmt, &mut found)?;
            match found {
                None => stmts.push(walked),
                Some(splice) => {
                    debug!(
                        macro_name = %splice.macro_name,
                        statements = splice.stmts.len(),
                        "expanded macro call"
                    );
                    self.trace.push(MacroExpansionStep {
                        macro_name: splice.macro_name,
                        input: stmt.clone(),
                        output: splice.stmts.clone(),
                    });
                    stmts.extend(splice.stmts);
                }
            }
        }

        Ok(Block {
            stmts,
            span: block.span,
        })
    }

    // ------------------------------------------------------------------------
    // Statement walk
    // ------------------------------------------------------------------------

    /// Returns the statement with its nested blocks expanded, recording the
    /// last macro call found outside those blocks in `found`.
    fn walk_stmt(
        &mut self,
        stmt: &StmtNode,
        found: &mut Option<Splice>,
    ) -> Result<StmtNode, ExpandError> {
        let value = match &stmt.value {
            Stmt::Assign { lhs, op, rhs } => Stmt::Assign {
                lhs: self.walk_exprs(lhs, found)?,
                op: *op,
                rhs: self.walk_exprs(rhs, found)?,
            },
            Stmt::Expr(expr) => Stmt::Expr(self.walk_expr(expr, found)?),
            Stmt::IncDec { target, op } => Stmt::IncDec {
                target: self.walk_expr(target, found)?,
                op: *op,
            },
            Stmt::Send { channel, value } => Stmt::Send {
                channel: self.walk_expr(channel, found)?,
                value: self.walk_expr(value, found)?,
            },
            Stmt::Go(call) => Stmt::Go(self.walk_expr(call, found)?),
            Stmt::Defer(call) => Stmt::Defer(self.walk_expr(call, found)?),
            Stmt::Return(values) => Stmt::Return(self.walk_exprs(values, found)?),
            Stmt::Value(decl) => Stmt::Value(self.walk_value_decl(decl, found)?),
            Stmt::Labeled { label, stmt } => Stmt::Labeled {
                label: label.clone(),
                stmt: Box::new(self.walk_stmt(stmt, found)?),
            },
            Stmt::Block(block) => Stmt::Block(self.expand_block(block)?),
            Stmt::If(if_stmt) => Stmt::If(self.walk_if(if_stmt, found)?),
            Stmt::For(for_stmt) => Stmt::For(self.walk_for(for_stmt, found)?),
            Stmt::Switch(switch) => Stmt::Switch(self.walk_switch(switch, found)?),
            Stmt::Select(_) | Stmt::Branch { .. } | Stmt::Type(_) | Stmt::Comment(_) => {
                return Ok(stmt.clone())
            }
        };

        Ok(StmtNode {
            value,
            span: stmt.span,
        })
    }

    fn walk_opt_stmt(
        &mut self,
        stmt: &Option<Box<StmtNode>>,
        found: &mut Option<Splice>,
    ) -> Result<Option<Box<StmtNode>>, ExpandError> {
        match stmt {
            Some(stmt) => Ok(Some(Box::new(self.walk_stmt(stmt, found)?))),
            None => Ok(None),
        }
    }

    fn walk_value_decl(
        &mut self,
        decl: &ValueDecl,
        found: &mut Option<Splice>,
    ) -> Result<ValueDecl, ExpandError> {
        let mut entries = Vec::with_capacity(decl.specs.entries.len());
        for entry in &decl.specs.entries {
            entries.push(match entry {
                GroupEntry::Spec(spec) => GroupEntry::Spec(ValueSpec {
                    values: self.walk_exprs(&spec.values, found)?,
                    ..spec.clone()
                }),
                GroupEntry::Comment(comment) => GroupEntry::Comment(comment.clone()),
            });
        }
        Ok(ValueDecl {
            keyword: decl.keyword,
            specs: DeclGroup {
                grouped: decl.specs.grouped,
                entries,
            },
        })
    }

    fn walk_if(
        &mut self,
        if_stmt: &IfStmt,
        found: &mut Option<Splice>,
    ) -> Result<IfStmt, ExpandError> {
        let init = self.walk_opt_stmt(&if_stmt.init, found)?;
        let cond = self.walk_expr(&if_stmt.cond, found)?;
        let then_block = self.expand_block(&if_stmt.then_block)?;
        // `else if` belongs to this statement; `else { }` is a nested block.
        let else_branch = self.walk_opt_stmt(&if_stmt.else_branch, found)?;

        Ok(IfStmt {
            init,
            cond,
            then_block,
            else_branch,
        })
    }

    fn walk_for(
        &mut self,
        for_stmt: &ForStmt,
        found: &mut Option<Splice>,
    ) -> Result<ForStmt, ExpandError> {
        let header = match &for_stmt.header {
            ForHeader::Forever => ForHeader::Forever,
            ForHeader::Cond(cond) => ForHeader::Cond(self.walk_expr(cond, found)?),
            ForHeader::Clause { init, cond, post } => ForHeader::Clause {
                init: self.walk_opt_stmt(init, found)?,
                cond: match cond {
                    Some(cond) => Some(self.walk_expr(cond, found)?),
                    None => None,
                },
                post: self.walk_opt_stmt(post, found)?,
            },
            ForHeader::Range {
                vars,
                define,
                iterable,
            } => ForHeader::Range {
                vars: self.walk_exprs(vars, found)?,
                define: *define,
                iterable: self.walk_expr(iterable, found)?,
            },
        };

        Ok(ForStmt {
            header,
            body: self.expand_block(&for_stmt.body)?,
        })
    }

    /// The init, tag and `case` values belong to the switch statement; each
    /// clause body is a nested block.
    fn walk_switch(
        &mut self,
        switch: &SwitchStmt,
        found: &mut Option<Splice>,
    ) -> Result<SwitchStmt, ExpandError> {
        let init = self.walk_opt_stmt(&switch.init, found)?;
        let tag = self.walk_opt_stmt(&switch.tag, found)?;
        let mut clauses = Vec::with_capacity(switch.clauses.len());
        for clause in &switch.clauses {
            let values = match &clause.values {
                Some(values) => Some(self.walk_exprs(values, found)?),
                None => None,
            };
            clauses.push(CaseClause {
                values,
                body: self.expand_block(&clause.body)?,
            });
        }
        Ok(SwitchStmt {
            init,
            tag,
            clauses,
        })
    }

    // ------------------------------------------------------------------------
    // Expression walk
    // ------------------------------------------------------------------------

    fn walk_exprs(
        &mut self,
        exprs: &[ExprNode],
        found: &mut Option<Splice>,
    ) -> Result<Vec<ExprNode>, ExpandError> {
        exprs.iter().map(|expr| self.walk_expr(expr, found)).collect()
    }

    /// Returns `expr` itself unless a function literal inside it had calls
    /// expanded, in which case the path down to that literal is rebuilt.
    fn walk_expr(
        &mut self,
        expr: &ExprNode,
        found: &mut Option<Splice>,
    ) -> Result<ExprNode, ExpandError> {
        let splices_before = self.trace.len();
        let rebuilt = match &*expr.value {
            Expr::Call {
                callee,
                args,
                ellipsis,
            } => {
                let table = self.table;
                if let Some(def) = callee.value.as_ident().and_then(|name| table.lookup(name)) {
                    *found = Some(instantiate(def, args, expr.span)?);
                    return Ok(expr.clone());
                }
                Expr::Call {
                    callee: self.walk_expr(callee, found)?,
                    args: self.walk_exprs(args, found)?,
                    ellipsis: *ellipsis,
                }
            }
            Expr::Binary { left, op, right } => Expr::Binary {
                left: self.walk_expr(left, found)?,
                op: *op,
                right: self.walk_expr(right, found)?,
            },
            Expr::Unary { op, operand } => Expr::Unary {
                op: *op,
                operand: self.walk_expr(operand, found)?,
            },
            Expr::Index { base, index } => Expr::Index {
                base: self.walk_expr(base, found)?,
                index: self.walk_expr(index, found)?,
            },
            Expr::Slice {
                base,
                low,
                high,
                max,
            } => Expr::Slice {
                base: self.walk_expr(base, found)?,
                low: self.walk_opt_expr(low, found)?,
                high: self.walk_opt_expr(high, found)?,
                max: self.walk_opt_expr(max, found)?,
            },
            Expr::Paren(inner) => Expr::Paren(self.walk_expr(inner, found)?),
            Expr::Selector { base, field } => Expr::Selector {
                base: self.walk_expr(base, found)?,
                field: field.clone(),
            },
            Expr::TypeAssert { base, ty } => Expr::TypeAssert {
                base: self.walk_expr(base, found)?,
                ty: ty.clone(),
            },
            Expr::Composite {
                ty,
                elements,
                multiline,
            } => {
                let mut walked = Vec::with_capacity(elements.len());
                for element in elements {
                    walked.push(Element {
                        key: self.walk_opt_expr(&element.key, found)?,
                        value: self.walk_expr(&element.value, found)?,
                    });
                }
                Expr::Composite {
                    ty: ty.clone(),
                    elements: walked,
                    multiline: *multiline,
                }
            }
            Expr::FuncLit { signature, body } => Expr::FuncLit {
                signature: signature.clone(),
                body: self.expand_block(body)?,
            },
            Expr::Ident(_) | Expr::Literal { .. } | Expr::Type(_) => return Ok(expr.clone()),
        };

        if self.trace.len() == splices_before {
            return Ok(expr.clone());
        }
        Ok(ExprNode {
            value: Arc::new(rebuilt),
            span: expr.span,
        })
    }

    fn walk_opt_expr(
        &mut self,
        expr: &Option<ExprNode>,
        found: &mut Option<Splice>,
    ) -> Result<Option<ExprNode>, ExpandError> {
        match expr {
            Some(expr) => Ok(Some(self.walk_expr(expr, found)?)),
            None => Ok(None),
        }
    }
}

/// Substitutes `args` into every statement of the macro body.
fn instantiate(
    def: &MacroDef,
    args: &[ExprNode],
    call_span: Option<Span>,
) -> Result<Splice, ExpandError> {
    if args.len() != def.arity() {
        return Err(ExpandError::Arity {
            macro_name: def.name.clone(),
            expected: def.arity(),
            actual: args.len(),
            ctx: ErrorContext::with_span(call_span),
        });
    }

    let ctx = SubstitutionContext::new(&def.name, &def.params, args);
    let stmts = def
        .body
        .stmts
        .iter()
        .map(|stmt| substitute_stmt(stmt, &ctx))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Splice {
        macro_name: def.name.clone(),
        stmts,
    })
}
