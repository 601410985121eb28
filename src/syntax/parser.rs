//! gomacro Parser
//!
//! Converts Go-like source text into a [`Program`] with source spans on every
//! node. The parser is purely syntactic: it knows nothing about macros.

use std::sync::Arc;

use pest::{
    error::{Error, ErrorVariant, InputLocation},
    iterators::Pair,
    Parser,
};
use pest_derive::Parser;

use crate::ast::{
    AssignOp, BinaryOp, Block, BranchKind, CaseClause, Comment, Decl, DeclGroup, DeclNode,
    Element, Expr, ExprNode, ForHeader, ForStmt, FuncDecl, GroupEntry, IfStmt, ImportSpec,
    IncDecOp, LitKind, ParamGroup, Program, Span, Stmt, StmtNode, SwitchStmt, TypeSpec, UnaryOp,
    ValueDecl, ValueKeyword, ValueSpec,
};
use crate::syntax::layout;
use crate::{err_ctx, ExpandError};

#[derive(Parser)]
#[grammar = "syntax/grammar.pest"]
struct GoParser;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parse source text into a [`Program`].
///
/// Errors carry a span but no source; attach it with
/// [`ExpandError::with_source`].
pub fn parse(source_text: &str) -> Result<Program, ExpandError> {
    let mut pairs = GoParser::parse(Rule::file, source_text)
        .map_err(|e| convert_parse_error(e, source_text))?;
    let file = pairs.next().ok_or_else(|| {
        missing(
            Span {
                start: 0,
                end: source_text.len(),
            },
            "package clause",
        )
    })?;
    build_program(file)
}

// ============================================================================
// DECLARATIONS
// ============================================================================

fn build_program(pair: Pair<Rule>) -> Result<Program, ExpandError> {
    let span = get_span(&pair);
    let mut leading = Vec::new();
    let mut package = None;
    let mut decls = Vec::new();

    for item in pair.into_inner() {
        let item_span = get_span(&item);
        let decl = match item.as_rule() {
            Rule::comment if package.is_none() => {
                leading.push(build_comment(&item, false));
                continue;
            }
            Rule::comment => Decl::Comment(build_comment(&item, false)),
            Rule::trailing => Decl::Comment(build_comment(&item, true)),
            Rule::package_clause => {
                let name = first_inner(item, "package name")?;
                package = Some(name.as_str().to_string());
                continue;
            }
            Rule::import_decl => Decl::Import(build_import(item)?),
            Rule::func_decl => Decl::Func(build_func_decl(item)?),
            Rule::value_decl => Decl::Value(build_value_decl(item)?),
            Rule::type_decl => Decl::Type(build_type_decl(item)?),
            Rule::EOI => continue,
            rule => return Err(unexpected(rule, item_span)),
        };
        decls.push(DeclNode::new(decl, item_span));
    }

    Ok(Program {
        leading,
        package: package.ok_or_else(|| missing(span, "package clause"))?,
        decls,
    })
}

/// Builds a parenthesized group; comments between specs are kept in place.
fn build_group<'i, T>(
    pair: Pair<'i, Rule>,
    build_spec: impl Fn(Pair<'i, Rule>) -> Result<T, ExpandError>,
) -> Result<DeclGroup<T>, ExpandError> {
    let entries = pair
        .into_inner()
        .map(|item| match item.as_rule() {
            Rule::comment => Ok(GroupEntry::Comment(build_comment(&item, false))),
            Rule::trailing => Ok(GroupEntry::Comment(build_comment(&item, true))),
            _ => build_spec(item).map(GroupEntry::Spec),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(DeclGroup {
        grouped: true,
        entries,
    })
}

fn build_import(pair: Pair<Rule>) -> Result<DeclGroup<ImportSpec>, ExpandError> {
    let span = get_span(&pair);
    let inner = first_inner(pair, "import path")?;
    match inner.as_rule() {
        Rule::import_group => build_group(inner, build_import_spec),
        Rule::import_spec => Ok(DeclGroup::single(build_import_spec(inner)?)),
        rule => Err(unexpected(rule, span)),
    }
}

fn build_import_spec(pair: Pair<Rule>) -> Result<ImportSpec, ExpandError> {
    let span = get_span(&pair);
    let mut alias = None;
    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::import_alias => alias = Some(item.as_str().to_string()),
            Rule::string_lit => {
                return Ok(ImportSpec {
                    alias,
                    path: item.as_str().to_string(),
                })
            }
            rule => return Err(unexpected(rule, get_span(&item))),
        }
    }
    Err(missing(span, "import path"))
}

fn build_type_decl(pair: Pair<Rule>) -> Result<DeclGroup<TypeSpec>, ExpandError> {
    let span = get_span(&pair);
    let inner = first_inner(pair, "type spec")?;
    match inner.as_rule() {
        Rule::type_group => build_group(inner, build_type_spec),
        Rule::type_spec => Ok(DeclGroup::single(build_type_spec(inner)?)),
        rule => Err(unexpected(rule, span)),
    }
}

fn build_type_spec(pair: Pair<Rule>) -> Result<TypeSpec, ExpandError> {
    let span = get_span(&pair);
    let mut name = None;
    let mut params = None;
    let mut alias = false;
    let mut ty = None;

    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::ident => name = Some(item.as_str().to_string()),
            Rule::type_params => params = Some(raw_text(&item)),
            Rule::alias_eq => alias = true,
            Rule::type_expr => ty = Some(raw_text(&item)),
            rule => return Err(unexpected(rule, get_span(&item))),
        }
    }

    Ok(TypeSpec {
        name: name.ok_or_else(|| missing(span, "type name"))?,
        params,
        alias,
        ty: ty.ok_or_else(|| missing(span, "type"))?,
    })
}

fn build_value_decl(pair: Pair<Rule>) -> Result<ValueDecl, ExpandError> {
    let span = get_span(&pair);
    let mut keyword = None;
    let mut specs = None;

    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::value_kw => {
                keyword = Some(match item.as_str() {
                    "const" => ValueKeyword::Const,
                    _ => ValueKeyword::Var,
                })
            }
            Rule::value_group => specs = Some(build_group(item, build_value_spec)?),
            Rule::value_spec => specs = Some(DeclGroup::single(build_value_spec(item)?)),
            rule => return Err(unexpected(rule, get_span(&item))),
        }
    }

    Ok(ValueDecl {
        keyword: keyword.ok_or_else(|| missing(span, "'var' or 'const'"))?,
        specs: specs.ok_or_else(|| missing(span, "declared name"))?,
    })
}

fn build_value_spec(pair: Pair<Rule>) -> Result<ValueSpec, ExpandError> {
    let mut names = Vec::new();
    let mut ty = None;
    let mut values = Vec::new();

    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::ident_list => {
                names = item.into_inner().map(|i| i.as_str().to_string()).collect()
            }
            Rule::type_expr => ty = Some(raw_text(&item)),
            Rule::expr_list => values = build_expr_list(item)?,
            rule => return Err(unexpected(rule, get_span(&item))),
        }
    }

    Ok(ValueSpec { names, ty, values })
}

fn build_func_decl(pair: Pair<Rule>) -> Result<FuncDecl, ExpandError> {
    let span = get_span(&pair);
    let mut receiver = None;
    let mut name = None;
    let mut type_params = None;
    let mut params = Vec::new();
    let mut results = None;
    let mut body = None;

    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::receiver => receiver = Some(raw_text(&item)),
            Rule::ident => name = Some(item.as_str().to_string()),
            Rule::type_params => type_params = Some(raw_text(&item)),
            Rule::params => params = build_params(item)?,
            Rule::results => results = Some(raw_text(&item)),
            Rule::block => body = Some(build_block(item)?),
            rule => return Err(unexpected(rule, get_span(&item))),
        }
    }

    Ok(FuncDecl {
        receiver,
        name: name.ok_or_else(|| missing(span, "function name"))?,
        type_params,
        params,
        results,
        body: body.ok_or_else(|| missing(span, "function body"))?,
    })
}

fn build_params(pair: Pair<Rule>) -> Result<Vec<ParamGroup>, ExpandError> {
    pair.into_inner()
        .map(|group| {
            let mut names = Vec::new();
            let mut ty = None;
            for item in group.into_inner() {
                match item.as_rule() {
                    Rule::ident => names.push(item.as_str().to_string()),
                    Rule::type_expr => ty = Some(raw_text(&item)),
                    rule => return Err(unexpected(rule, get_span(&item))),
                }
            }
            Ok(ParamGroup { names, ty })
        })
        .collect()
}

// ============================================================================
// STATEMENTS
// ============================================================================

fn build_block(pair: Pair<Rule>) -> Result<Block, ExpandError> {
    let span = get_span(&pair);
    let stmts = pair
        .into_inner()
        .map(build_stmt)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Block {
        stmts,
        span: Some(span),
    })
}

fn build_stmt(pair: Pair<Rule>) -> Result<StmtNode, ExpandError> {
    let span = get_span(&pair);

    let stmt = match pair.as_rule() {
        Rule::comment => Stmt::Comment(build_comment(&pair, false)),
        Rule::trailing => Stmt::Comment(build_comment(&pair, true)),

        Rule::simple_stmt => build_simple_stmt(pair)?,

        Rule::block => Stmt::Block(build_block(pair)?),

        Rule::if_stmt => Stmt::If(build_if(pair)?),

        Rule::for_stmt => Stmt::For(build_for(pair)?),

        Rule::switch_stmt => Stmt::Switch(build_switch(pair)?),

        Rule::select_stmt => Stmt::Select(raw_text(&pair)),

        Rule::labeled_stmt => {
            let mut inner = pair.into_inner();
            let label = inner.next().ok_or_else(|| missing(span, "label"))?;
            let stmt = inner.next().ok_or_else(|| missing(span, "labeled statement"))?;
            Stmt::Labeled {
                label: label.as_str().to_string(),
                stmt: Box::new(build_stmt(stmt)?),
            }
        }

        Rule::return_stmt => match pair.into_inner().next() {
            Some(list) => Stmt::Return(build_expr_list(list)?),
            None => Stmt::Return(Vec::new()),
        },

        Rule::go_stmt => Stmt::Go(build_expr(first_inner(pair, "call")?)?),

        Rule::defer_stmt => Stmt::Defer(build_expr(first_inner(pair, "call")?)?),

        Rule::branch_stmt => {
            let mut inner = pair.into_inner();
            let keyword = inner.next().ok_or_else(|| missing(span, "branch keyword"))?;
            let kind = BranchKind::from_token(keyword.as_str())
                .ok_or_else(|| unexpected(Rule::branch_kw, get_span(&keyword)))?;
            Stmt::Branch {
                kind,
                label: inner.next().map(|label| label.as_str().to_string()),
            }
        }

        Rule::value_decl => Stmt::Value(build_value_decl(pair)?),

        Rule::type_decl => Stmt::Type(build_type_decl(pair)?),

        // Wrappers around a single simple statement.
        Rule::if_init | Rule::for_init | Rule::for_post | Rule::switch_init | Rule::switch_tag => {
            return build_stmt(first_inner(pair, "statement")?);
        }

        rule => return Err(unexpected(rule, span)),
    };

    Ok(StmtNode::new(stmt, span))
}

/// An expression list, optionally followed by an assignment, a send or an
/// increment.
fn build_simple_stmt(pair: Pair<Rule>) -> Result<Stmt, ExpandError> {
    let span = get_span(&pair);
    let mut inner = pair.into_inner();
    let lhs = build_expr_list(inner.next().ok_or_else(|| missing(span, "expression"))?)?;

    let Some(op_pair) = inner.next() else {
        return Ok(Stmt::Expr(single_operand(lhs, span, "expression statement")?));
    };

    match op_pair.as_rule() {
        Rule::assign_op => {
            let op = AssignOp::from_token(op_pair.as_str())
                .ok_or_else(|| unknown_operator(&op_pair))?;
            let rhs = inner.next().ok_or_else(|| missing(span, "assigned value"))?;
            Ok(Stmt::Assign {
                lhs,
                op,
                rhs: build_expr_list(rhs)?,
            })
        }
        Rule::send_op => {
            let value = inner.next().ok_or_else(|| missing(span, "sent value"))?;
            Ok(Stmt::Send {
                channel: single_operand(lhs, span, "send statement")?,
                value: build_expr(value)?,
            })
        }
        Rule::inc_dec_op => Ok(Stmt::IncDec {
            target: single_operand(lhs, span, "increment statement")?,
            op: match op_pair.as_str() {
                "--" => IncDecOp::Dec,
                _ => IncDecOp::Inc,
            },
        }),
        rule => Err(unexpected(rule, get_span(&op_pair))),
    }
}

fn build_if(pair: Pair<Rule>) -> Result<IfStmt, ExpandError> {
    let span = get_span(&pair);
    let mut init = None;
    let mut cond = None;
    let mut then_block = None;
    let mut else_branch = None;

    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::if_init => init = Some(Box::new(build_stmt(item)?)),
            Rule::expression => cond = Some(build_expr(item)?),
            Rule::block if then_block.is_none() => then_block = Some(build_block(item)?),
            Rule::block | Rule::if_stmt => else_branch = Some(Box::new(build_stmt(item)?)),
            rule => return Err(unexpected(rule, get_span(&item))),
        }
    }

    Ok(IfStmt {
        init,
        cond: cond.ok_or_else(|| missing(span, "if condition"))?,
        then_block: then_block.ok_or_else(|| missing(span, "if body"))?,
        else_branch,
    })
}

fn build_for(pair: Pair<Rule>) -> Result<ForStmt, ExpandError> {
    let span = get_span(&pair);
    let mut header = ForHeader::Forever;
    let mut body = None;

    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::for_cond => {
                header = ForHeader::Cond(build_expr(first_inner(item, "loop condition")?)?)
            }
            Rule::for_clause => header = build_for_clause(item)?,
            Rule::range_clause => header = build_range_clause(item)?,
            Rule::block => body = Some(build_block(item)?),
            rule => return Err(unexpected(rule, get_span(&item))),
        }
    }

    Ok(ForStmt {
        header,
        body: body.ok_or_else(|| missing(span, "loop body"))?,
    })
}

fn build_for_clause(pair: Pair<Rule>) -> Result<ForHeader, ExpandError> {
    let mut init = None;
    let mut cond = None;
    let mut post = None;

    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::for_init => init = Some(Box::new(build_stmt(item)?)),
            Rule::for_cond => cond = Some(build_expr(first_inner(item, "loop condition")?)?),
            Rule::for_post => post = Some(Box::new(build_stmt(item)?)),
            rule => return Err(unexpected(rule, get_span(&item))),
        }
    }

    Ok(ForHeader::Clause { init, cond, post })
}

fn build_range_clause(pair: Pair<Rule>) -> Result<ForHeader, ExpandError> {
    let span = get_span(&pair);
    let mut vars = Vec::new();
    let mut define = false;
    let mut iterable = None;

    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::expr_list => vars = build_expr_list(item)?,
            Rule::range_op => define = item.as_str() == ":=",
            Rule::expression => iterable = Some(build_expr(item)?),
            rule => return Err(unexpected(rule, get_span(&item))),
        }
    }

    Ok(ForHeader::Range {
        vars,
        define,
        iterable: iterable.ok_or_else(|| missing(span, "range expression"))?,
    })
}

fn build_switch(pair: Pair<Rule>) -> Result<SwitchStmt, ExpandError> {
    let mut init = None;
    let mut tag = None;
    let mut clauses = Vec::new();

    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::switch_init => init = Some(Box::new(build_stmt(item)?)),
            Rule::switch_tag => tag = Some(Box::new(build_stmt(item)?)),
            Rule::case_clause => clauses.push(build_case_clause(item)?),
            rule => return Err(unexpected(rule, get_span(&item))),
        }
    }

    Ok(SwitchStmt {
        init,
        tag,
        clauses,
    })
}

/// A comment on the `case` line becomes the first statement of the body.
fn build_case_clause(pair: Pair<Rule>) -> Result<CaseClause, ExpandError> {
    let span = get_span(&pair);
    let mut values = None;
    let mut stmts = Vec::new();

    for item in pair.into_inner() {
        match item.as_rule() {
            Rule::case_values => values = Some(build_expr_list(item)?),
            Rule::default_kw => {}
            Rule::trailing => stmts.push(build_stmt(item)?),
            Rule::case_body => {
                for stmt in item.into_inner() {
                    stmts.push(build_stmt(stmt)?);
                }
            }
            rule => return Err(unexpected(rule, get_span(&item))),
        }
    }

    Ok(CaseClause {
        values,
        body: Block {
            stmts,
            span: Some(span),
        },
    })
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

fn build_expr_list(pair: Pair<Rule>) -> Result<Vec<ExprNode>, ExpandError> {
    pair.into_inner().map(build_expr).collect()
}

fn build_expr(pair: Pair<Rule>) -> Result<ExprNode, ExpandError> {
    let span = get_span(&pair);

    match pair.as_rule() {
        Rule::expression => build_expr(first_inner(pair, "expression")?),

        Rule::or_expr | Rule::and_expr | Rule::rel_expr | Rule::add_expr | Rule::mul_expr => {
            build_binary_level(pair)
        }

        Rule::unary_expr => {
            let mut ops = Vec::new();
            let mut operand = None;
            for item in pair.into_inner() {
                match item.as_rule() {
                    Rule::unary_op => ops.push(item),
                    _ => operand = Some(build_expr(item)?),
                }
            }
            let mut result = operand.ok_or_else(|| missing(span, "operand"))?;
            // The operator closest to the operand applies first.
            for op_pair in ops.into_iter().rev() {
                let op = UnaryOp::from_token(op_pair.as_str())
                    .ok_or_else(|| unknown_operator(&op_pair))?;
                let op_span = Span {
                    start: op_pair.as_span().start(),
                    end: span.end,
                };
                result = make_expr(Expr::Unary { op, operand: result }, op_span);
            }
            Ok(result)
        }

        Rule::postfix_expr => {
            let mut inner = pair.into_inner();
            let mut result = build_expr(inner.next().ok_or_else(|| missing(span, "operand"))?)?;
            for suffix in inner {
                let node_span = Span {
                    start: span.start,
                    end: suffix.as_span().end(),
                };
                result = make_expr(build_postfix(result, suffix)?, node_span);
            }
            Ok(result)
        }

        Rule::paren_expr => {
            let inner = build_expr(first_inner(pair, "expression")?)?;
            Ok(make_expr(Expr::Paren(inner), span))
        }

        Rule::func_lit => {
            let mut inner = pair.into_inner();
            let signature = inner.next().ok_or_else(|| missing(span, "signature"))?;
            let body = inner.next().ok_or_else(|| missing(span, "function body"))?;
            let func = Expr::FuncLit {
                signature: raw_text(&signature),
                body: build_block(body)?,
            };
            Ok(make_expr(func, span))
        }

        Rule::composite_lit => {
            let mut inner = pair.into_inner();
            let ty = inner.next().ok_or_else(|| missing(span, "literal type"))?;
            let value = inner.next().ok_or_else(|| missing(span, "literal value"))?;
            Ok(make_expr(build_composite(raw_text(&ty), value)?, span))
        }

        Rule::type_operand => Ok(make_expr(Expr::Type(raw_text(&pair)), span)),

        Rule::ident => Ok(make_expr(Expr::Ident(pair.as_str().to_string()), span)),

        Rule::int_lit => Ok(make_literal(LitKind::Int, &pair)),
        Rule::float_lit => Ok(make_literal(LitKind::Float, &pair)),
        Rule::char_lit => Ok(make_literal(LitKind::Char, &pair)),
        Rule::string_lit | Rule::raw_string_lit => Ok(make_literal(LitKind::String, &pair)),

        rule => Err(unexpected(rule, span)),
    }
}

fn build_postfix(base: ExprNode, suffix: Pair<Rule>) -> Result<Expr, ExpandError> {
    let expr = match suffix.as_rule() {
        Rule::call_args => {
            let mut args = Vec::new();
            let mut ellipsis = false;
            for item in suffix.into_inner() {
                match item.as_rule() {
                    Rule::ellipsis => ellipsis = true,
                    _ => args.push(build_expr(item)?),
                }
            }
            Expr::Call {
                callee: base,
                args,
                ellipsis,
            }
        }
        Rule::slice_suffix => {
            let (mut low, mut high, mut max) = (None, None, None);
            for bound in suffix.into_inner() {
                let rule = bound.as_rule();
                let value = Some(build_expr(first_inner(bound, "slice bound")?)?);
                match rule {
                    Rule::slice_low => low = value,
                    Rule::slice_high => high = value,
                    _ => max = value,
                }
            }
            Expr::Slice {
                base,
                low,
                high,
                max,
            }
        }
        Rule::index_suffix => Expr::Index {
            base,
            index: build_expr(first_inner(suffix, "index")?)?,
        },
        Rule::assert_suffix => Expr::TypeAssert {
            base,
            ty: raw_text(&first_inner(suffix, "asserted type")?),
        },
        Rule::selector_suffix => Expr::Selector {
            base,
            field: first_inner(suffix, "field name")?.as_str().to_string(),
        },
        rule => return Err(unexpected(rule, get_span(&suffix))),
    };
    Ok(expr)
}

/// Builds `ty{...}` from a `literal_value` pair; `ty` is empty when elided.
fn build_composite(ty: String, value: Pair<Rule>) -> Result<Expr, ExpandError> {
    let multiline = value.as_str().contains('\n');
    let elements = value
        .into_inner()
        .map(build_element)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Expr::Composite {
        ty,
        elements,
        multiline,
    })
}

fn build_element(pair: Pair<Rule>) -> Result<Element, ExpandError> {
    let span = get_span(&pair);
    let mut key = None;
    let mut value = None;

    for item in pair.into_inner() {
        let rule = item.as_rule();
        let inner = first_inner(item, "element")?;
        let part = match inner.as_rule() {
            Rule::literal_value => {
                let inner_span = get_span(&inner);
                make_expr(build_composite(String::new(), inner)?, inner_span)
            }
            _ => build_expr(inner)?,
        };
        match rule {
            Rule::element_key => key = Some(part),
            _ => value = Some(part),
        }
    }

    Ok(Element {
        key,
        value: value.ok_or_else(|| missing(span, "element value"))?,
    })
}

/// Folds `operand (op operand)*` left-associatively.
fn build_binary_level(pair: Pair<Rule>) -> Result<ExprNode, ExpandError> {
    let span = get_span(&pair);
    let mut inner = pair.into_inner();
    let mut left = build_expr(inner.next().ok_or_else(|| missing(span, "operand"))?)?;

    while let Some(op_pair) = inner.next() {
        let op =
            BinaryOp::from_token(op_pair.as_str()).ok_or_else(|| unknown_operator(&op_pair))?;
        let right_pair = inner
            .next()
            .ok_or_else(|| missing(get_span(&op_pair), "right operand"))?;
        let node_span = Span {
            start: span.start,
            end: right_pair.as_span().end(),
        };
        let right = build_expr(right_pair)?;
        left = make_expr(Expr::Binary { left, op, right }, node_span);
    }

    Ok(left)
}

// ============================================================================
// AST CONSTRUCTORS
// ============================================================================

fn make_expr(expr: Expr, span: Span) -> ExprNode {
    ExprNode::new(Arc::new(expr), span)
}

fn make_literal(kind: LitKind, pair: &Pair<Rule>) -> ExprNode {
    make_expr(
        Expr::Literal {
            kind,
            raw: pair.as_str().to_string(),
        },
        get_span(pair),
    )
}

fn build_comment(pair: &Pair<Rule>, trailing: bool) -> Comment {
    Comment {
        text: pair.as_str().trim_end().to_string(),
        trailing,
    }
}

// ============================================================================
// UTILITIES
// ============================================================================

fn get_span(pair: &Pair<Rule>) -> Span {
    Span {
        start: pair.as_span().start(),
        end: pair.as_span().end(),
    }
}

fn first_inner<'i>(pair: Pair<'i, Rule>, element: &str) -> Result<Pair<'i, Rule>, ExpandError> {
    let span = get_span(&pair);
    pair.into_inner().next().ok_or_else(|| missing(span, element))
}

/// The pair's text with continuation lines indented relative to the line
/// it starts on.
fn raw_text(pair: &Pair<Rule>) -> String {
    let base = layout::indentation(pair.as_span().start_pos().line_of());
    layout::reindent(pair.as_str(), base, "")
}

fn single_operand(
    mut exprs: Vec<ExprNode>,
    span: Span,
    what: &str,
) -> Result<ExprNode, ExpandError> {
    match exprs.pop() {
        Some(expr) if exprs.is_empty() => Ok(expr),
        _ => Err(err_ctx!(
            Parse,
            format!("{} takes a single operand", what),
            span
        )),
    }
}

// ============================================================================
// ERROR HANDLING
// ============================================================================

fn missing(span: Span, element: &str) -> ExpandError {
    err_ctx!(Parse, format!("missing {}", element), span)
}

fn unexpected(rule: Rule, span: Span) -> ExpandError {
    err_ctx!(Parse, format!("unsupported construct: {:?}", rule), span)
}

fn unknown_operator(pair: &Pair<Rule>) -> ExpandError {
    err_ctx!(
        Parse,
        format!("unknown operator '{}'", pair.as_str()),
        get_span(pair)
    )
}

/// Unbalanced delimiters are reported at their opening character. Anything
/// else is a syntax error at pest's position, with pest's expectations as
/// help.
fn convert_parse_error(error: Error<Rule>, source_text: &str) -> ExpandError {
    if let Some((unclosed, span)) = layout::find_unclosed(source_text) {
        let opener = source_text.get(span.start..span.end).unwrap_or_default();
        return err_ctx!(
            Parse,
            unclosed.message(),
            span,
            format!("'{}' opened here is never closed", opener)
        );
    }

    let span = match error.location {
        InputLocation::Pos(pos) => Span {
            start: pos,
            end: pos,
        },
        InputLocation::Span((start, end)) => Span { start, end },
    };
    let expects_package = matches!(
        &error.variant,
        ErrorVariant::ParsingError { positives, .. } if positives.contains(&Rule::package_clause)
    );
    let message = if expects_package {
        "Missing package clause"
    } else {
        "Syntax error"
    };

    err_ctx!(Parse, message, span, error.variant.message())
}
