//! Canonical formatter.
//!
//! Tab indentation, one statement per line, spaces around binary and
//! assignment operators, and a blank line between top-level declarations.
//! A standalone comment sticks to the declaration after it; a trailing
//! comment stays on the line it followed.
//!
//! Formatting never fails. Parentheses are inserted where a rebuilt tree
//! would otherwise print with a different grouping, so the output always
//! parses back to the same shape.

use crate::ast::{
    Block, CaseClause, Decl, DeclGroup, Element, Expr, ExprNode, ForHeader, FuncDecl,
    GroupEntry, IfStmt, ImportSpec, Program, Stmt, StmtNode, SwitchStmt, TypeSpec, UnaryOp,
    ValueSpec,
};
use crate::syntax::layout;

// ============================================================================
// PUBLIC API
// ============================================================================

/// Renders a whole program.
pub fn format_program(program: &Program) -> String {
    let mut printer = Printer::default();

    for comment in &program.leading {
        printer.line(&comment.text);
    }
    printer.line(&format!("package {}", program.package));

    let mut attached = false;
    for decl in &program.decls {
        if let Decl::Comment(comment) = &decl.value {
            if comment.trailing {
                printer.append_trailing(&comment.text);
                continue;
            }
        }
        if !attached {
            printer.blank_line();
        }
        attached = matches!(decl.value, Decl::Comment(_));
        printer.write_decl(&decl.value);
    }

    printer.out
}

/// Renders a list of statements at top indentation, one per line.
///
/// Used for expansion traces, where there is no enclosing function.
pub fn format_stmts(stmts: &[StmtNode]) -> String {
    let mut printer = Printer::default();
    for stmt in stmts {
        printer.write_stmt(stmt);
    }
    printer.out
}

/// Renders a single expression.
pub fn format_expr(expr: &ExprNode) -> String {
    expr_text(expr)
}

// ============================================================================
// LINE WRITER
// ============================================================================

#[derive(Default)]
struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn start_line(&mut self) {
        for _ in 0..self.indent {
            self.out.push('\t');
        }
    }

    /// Appends `text`, indenting its continuation lines to the current level.
    fn push(&mut self, text: &str) {
        if text.contains('\n') {
            let indent = "\t".repeat(self.indent);
            self.out.push_str(&layout::reindent(text, "", &indent));
        } else {
            self.out.push_str(text);
        }
    }

    fn end_line(&mut self) {
        self.out.push('\n');
    }

    fn line(&mut self, text: &str) {
        self.start_line();
        self.push(text);
        self.end_line();
    }

    fn blank_line(&mut self) {
        self.end_line();
    }

    /// Moves a trailing comment onto the previous line.
    fn append_trailing(&mut self, text: &str) {
        if self.out.ends_with('\n') {
            self.out.pop();
        }
        self.push(" ");
        self.push(text);
        self.end_line();
    }

    // ------------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------------

    fn write_decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Import(group) => self.write_group("import", group, import_spec_text),
            Decl::Value(decl) => {
                self.write_group(decl.keyword.as_str(), &decl.specs, value_spec_text)
            }
            Decl::Type(group) => self.write_group("type", group, type_spec_text),
            Decl::Func(func) => self.write_func(func),
            Decl::Comment(comment) => self.line(&comment.text),
        }
    }

    /// `keyword spec`, or `keyword (` with one spec or comment per line.
    fn write_group<T>(&mut self, keyword: &str, group: &DeclGroup<T>, text: fn(&T) -> String) {
        if let (false, [GroupEntry::Spec(spec)]) = (group.grouped, group.entries.as_slice()) {
            self.line(&format!("{} {}", keyword, text(spec)));
            return;
        }

        self.line(&format!("{} (", keyword));
        self.indent += 1;
        for entry in &group.entries {
            match entry {
                GroupEntry::Spec(spec) => self.line(&text(spec)),
                GroupEntry::Comment(comment) if comment.trailing => {
                    self.append_trailing(&comment.text)
                }
                GroupEntry::Comment(comment) => self.line(&comment.text),
            }
        }
        self.indent -= 1;
        self.line(")");
    }

    fn write_func(&mut self, func: &FuncDecl) {
        let params = func
            .params
            .iter()
            .map(|group| match &group.ty {
                Some(ty) => format!("{} {}", group.names.join(", "), ty),
                None => group.names.join(", "),
            })
            .collect::<Vec<_>>()
            .join(", ");

        self.start_line();
        self.push("func ");
        if let Some(receiver) = &func.receiver {
            self.push(receiver);
            self.push(" ");
        }
        self.push(&func.name);
        if let Some(type_params) = &func.type_params {
            self.push(type_params);
        }
        self.push(&format!("({})", params));
        if let Some(results) = &func.results {
            self.push(" ");
            self.push(results);
        }
        self.push(" {");
        self.end_line();
        self.write_block_body(&func.body);
        self.line("}");
    }

    // ------------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------------

    fn write_block_body(&mut self, block: &Block) {
        self.indent += 1;
        for stmt in &block.stmts {
            self.write_stmt(stmt);
        }
        self.indent -= 1;
    }

    fn write_stmt(&mut self, stmt: &StmtNode) {
        match &stmt.value {
            Stmt::Comment(comment) if comment.trailing => {
                self.append_trailing(&comment.text);
                return;
            }
            Stmt::Value(decl) => {
                self.write_group(decl.keyword.as_str(), &decl.specs, value_spec_text);
                return;
            }
            Stmt::Type(group) => {
                self.write_group("type", group, type_spec_text);
                return;
            }
            Stmt::Labeled { label, stmt } => {
                // Labels sit one level left of the statement they name.
                let indent = self.indent;
                self.indent = indent.saturating_sub(1);
                self.line(&format!("{}:", label));
                self.indent = indent;
                self.write_stmt(stmt);
                return;
            }
            Stmt::Block(block) => {
                self.line("{");
                self.write_block_body(block);
                self.start_line();
                self.push("}");
            }
            Stmt::If(if_stmt) => {
                self.start_line();
                self.write_if(if_stmt);
            }
            Stmt::For(for_stmt) => {
                self.start_line();
                self.push(&for_header_text(&for_stmt.header));
                self.push("{");
                self.end_line();
                self.write_block_body(&for_stmt.body);
                self.start_line();
                self.push("}");
            }
            Stmt::Switch(switch) => {
                self.start_line();
                self.write_switch(switch);
            }
            simple => {
                self.start_line();
                self.push(&inline_stmt_text(simple));
            }
        }
        self.end_line();
    }

    /// Writes an `if` chain. The caller starts and ends the line.
    fn write_if(&mut self, if_stmt: &IfStmt) {
        self.push("if ");
        if let Some(init) = &if_stmt.init {
            self.push(&inline_stmt_text(&init.value));
            self.push("; ");
        }
        self.push(&expr_text(&if_stmt.cond));
        self.push(" {");
        self.end_line();
        self.write_block_body(&if_stmt.then_block);
        self.start_line();
        self.push("}");

        if let Some(else_branch) = &if_stmt.else_branch {
            match &else_branch.value {
                Stmt::If(nested) => {
                    self.push(" else ");
                    self.write_if(nested);
                }
                Stmt::Block(block) => {
                    self.push(" else {");
                    self.end_line();
                    self.write_block_body(block);
                    self.start_line();
                    self.push("}");
                }
                other => {
                    self.push(" else {");
                    self.end_line();
                    self.indent += 1;
                    self.line(&inline_stmt_text(other));
                    self.indent -= 1;
                    self.start_line();
                    self.push("}");
                }
            }
        }
    }

    /// Writes a `switch` with its clauses at the switch's own level. The
    /// caller starts and ends the line.
    fn write_switch(&mut self, switch: &SwitchStmt) {
        self.push("switch ");
        if let Some(init) = &switch.init {
            self.push(&inline_stmt_text(&init.value));
            self.push("; ");
        }
        if let Some(tag) = &switch.tag {
            self.push(&inline_stmt_text(&tag.value));
            self.push(" ");
        }
        self.push("{");
        self.end_line();
        for clause in &switch.clauses {
            self.line(&case_head_text(clause));
            self.write_block_body(&clause.body);
        }
        self.start_line();
        self.push("}");
    }
}

// ============================================================================
// INLINE TEXT
// ============================================================================

fn import_spec_text(spec: &ImportSpec) -> String {
    match &spec.alias {
        Some(alias) => format!("{} {}", alias, spec.path),
        None => spec.path.clone(),
    }
}

fn value_spec_text(spec: &ValueSpec) -> String {
    let mut text = spec.names.join(", ");
    if let Some(ty) = &spec.ty {
        text.push(' ');
        text.push_str(ty);
    }
    if !spec.values.is_empty() {
        text.push_str(" = ");
        text.push_str(&expr_list_text(&spec.values));
    }
    text
}

fn type_spec_text(spec: &TypeSpec) -> String {
    let params = spec.params.as_deref().unwrap_or_default();
    let assign = if spec.alias { " =" } else { "" };
    format!("{}{}{} {}", spec.name, params, assign, spec.ty)
}

fn case_head_text(clause: &CaseClause) -> String {
    match &clause.values {
        Some(values) => format!("case {}:", expr_list_text(values)),
        None => "default:".to_string(),
    }
}

/// Header up to and including the space before `{`.
fn for_header_text(header: &ForHeader) -> String {
    match header {
        ForHeader::Forever => "for ".to_string(),
        ForHeader::Cond(cond) => format!("for {} ", expr_text(cond)),
        ForHeader::Clause { init, cond, post } => {
            let init = init
                .as_ref()
                .map(|s| inline_stmt_text(&s.value))
                .unwrap_or_default();
            let cond = cond.as_ref().map(expr_text).unwrap_or_default();
            let post = post
                .as_ref()
                .map(|s| inline_stmt_text(&s.value))
                .unwrap_or_default();
            format!("for {}; {}; {} ", init, cond, post)
        }
        ForHeader::Range {
            vars,
            define,
            iterable,
        } => {
            if vars.is_empty() {
                format!("for range {} ", expr_text(iterable))
            } else {
                let op = if *define { ":=" } else { "=" };
                format!(
                    "for {} {} range {} ",
                    expr_list_text(vars),
                    op,
                    expr_text(iterable)
                )
            }
        }
    }
}

/// Single-line form of a statement. Compound statements are only rendered
/// this way when they appear where Go expects a simple statement.
fn inline_stmt_text(stmt: &Stmt) -> String {
    match stmt {
        Stmt::Assign { lhs, op, rhs } => {
            format!("{} {} {}", expr_list_text(lhs), op, expr_list_text(rhs))
        }
        Stmt::Expr(expr) => expr_text(expr),
        Stmt::IncDec { target, op } => format!("{}{}", expr_text(target), op.as_str()),
        Stmt::Send { channel, value } => {
            format!("{} <- {}", expr_text(channel), expr_text(value))
        }
        Stmt::Go(call) => format!("go {}", expr_text(call)),
        Stmt::Defer(call) => format!("defer {}", expr_text(call)),
        Stmt::Select(text) => text.clone(),
        Stmt::Return(values) if values.is_empty() => "return".to_string(),
        Stmt::Return(values) => format!("return {}", expr_list_text(values)),
        Stmt::Branch { kind, label: None } => kind.as_str().to_string(),
        Stmt::Branch {
            kind,
            label: Some(label),
        } => format!("{} {}", kind.as_str(), label),
        Stmt::Comment(comment) => comment.text.clone(),
        Stmt::Block(_)
        | Stmt::If(_)
        | Stmt::For(_)
        | Stmt::Switch(_)
        | Stmt::Labeled { .. }
        | Stmt::Value(_)
        | Stmt::Type(_) => format_stmts(std::slice::from_ref(&StmtNode::detached(stmt.clone())))
            .trim_end()
            .replace('\n', "; "),
    }
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

// Multi-line expression text is indented relative to the line it starts
// on; `Printer::push` shifts it to the right level.

fn expr_list_text(exprs: &[ExprNode]) -> String {
    exprs.iter().map(expr_text).collect::<Vec<_>>().join(", ")
}

fn expr_text(expr: &ExprNode) -> String {
    match &*expr.value {
        Expr::Ident(name) => name.clone(),
        Expr::Literal { raw, .. } => raw.clone(),
        Expr::Type(text) => text.clone(),
        Expr::Binary { left, op, right } => {
            let prec = op.precedence();
            let left_text = operand_text(left, |p| p < prec);
            let right_text = operand_text(right, |p| p <= prec);
            format!("{} {} {}", left_text, op, right_text)
        }
        Expr::Unary { op, operand } => {
            let inner = expr_text(operand);
            let wrap = match &*operand.value {
                Expr::Binary { .. } => true,
                Expr::Unary { op: inner_op, .. } => merges_with(*op, *inner_op),
                _ => false,
            };
            if wrap {
                format!("{}({})", op, inner)
            } else {
                format!("{}{}", op, inner)
            }
        }
        Expr::Index { base, index } => {
            format!("{}[{}]", postfix_base_text(base), expr_text(index))
        }
        Expr::Slice {
            base,
            low,
            high,
            max,
        } => {
            let bound = |b: &Option<ExprNode>| b.as_ref().map(expr_text).unwrap_or_default();
            let mut text = format!("{}[{}:{}", postfix_base_text(base), bound(low), bound(high));
            if max.is_some() {
                text.push(':');
                text.push_str(&bound(max));
            }
            text.push(']');
            text
        }
        Expr::Call {
            callee,
            args,
            ellipsis,
        } => {
            let spread = if *ellipsis { "..." } else { "" };
            format!(
                "{}({}{})",
                postfix_base_text(callee),
                expr_list_text(args),
                spread
            )
        }
        Expr::Paren(inner) => format!("({})", expr_text(inner)),
        Expr::Selector { base, field } => format!("{}.{}", postfix_base_text(base), field),
        Expr::TypeAssert { base, ty } => format!("{}.({})", postfix_base_text(base), ty),
        Expr::Composite {
            ty,
            elements,
            multiline,
        } => composite_text(ty, elements, *multiline),
        Expr::FuncLit { signature, body } => {
            if body.stmts.is_empty() {
                return format!("func{} {{}}", signature);
            }
            let mut printer = Printer::default();
            printer.write_block_body(body);
            format!("func{} {{\n{}}}", signature, printer.out)
        }
    }
}

fn composite_text(ty: &str, elements: &[Element], multiline: bool) -> String {
    let element_text = |element: &Element| match &element.key {
        Some(key) => format!("{}: {}", expr_text(key), expr_text(&element.value)),
        None => expr_text(&element.value),
    };

    if !multiline || elements.is_empty() {
        let inner = elements.iter().map(element_text).collect::<Vec<_>>();
        return format!("{}{{{}}}", ty, inner.join(", "));
    }

    let mut text = format!("{}{{\n", ty);
    for element in elements {
        text.push('\t');
        text.push_str(&layout::reindent(&element_text(element), "", "\t"));
        text.push_str(",\n");
    }
    text.push('}');
    text
}

/// Renders a binary operand, parenthesised when `needs_parens` holds for
/// its own precedence.
fn operand_text(expr: &ExprNode, needs_parens: impl Fn(u8) -> bool) -> String {
    match &*expr.value {
        Expr::Binary { op, .. } if needs_parens(op.precedence()) => {
            format!("({})", expr_text(expr))
        }
        _ => expr_text(expr),
    }
}

fn postfix_base_text(expr: &ExprNode) -> String {
    match &*expr.value {
        Expr::Binary { .. } | Expr::Unary { .. } => format!("({})", expr_text(expr)),
        _ => expr_text(expr),
    }
}

/// True when two adjacent unary operators would read as one token.
fn merges_with(outer: UnaryOp, inner: UnaryOp) -> bool {
    matches!(
        (outer, inner),
        (UnaryOp::Neg, UnaryOp::Neg)
            | (UnaryOp::Plus, UnaryOp::Plus)
            | (UnaryOp::AddrOf, UnaryOp::AddrOf)
    )
}
