//! AST module for gomacro
//!
//! This module provides the tree model the expander works on: programs made
//! of declarations, blocks of statements, and expressions, each optionally
//! carrying the source span it was parsed from.
//!
//! Expression nodes are reference counted (`ExprNode = WithSpan<Arc<Expr>>`),
//! so substituting a macro argument shares the caller's sub-tree instead of
//! copying it.

// ============================================================================
// IMPORTS
// ============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

pub mod builder;

// ============================================================================
// SPANS
// ============================================================================

/// Represents a byte range in the source text.
///
/// # Examples
///
/// ```rust
/// use gomacro::ast::Span;
/// let span = Span { start: 0, end: 5 };
/// assert_eq!(span.len(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Wrapper for carrying an optional source span with any value.
///
/// Nodes produced by the parser always have a span. Nodes rebuilt during
/// macro expansion have none, since expanded code has no single origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithSpan<T> {
    pub value: T,
    pub span: Option<Span>,
}

impl<T> WithSpan<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self {
            value,
            span: Some(span),
        }
    }

    /// Wraps a value with no source position.
    pub fn detached(value: T) -> Self {
        Self { value, span: None }
    }
}

/// Canonical expression node with shared ownership of the expression.
pub type ExprNode = WithSpan<Arc<Expr>>;

/// Statement node.
pub type StmtNode = WithSpan<Stmt>;

/// Top-level declaration node.
pub type DeclNode = WithSpan<Decl>;

// ============================================================================
// EXPRESSIONS
// ============================================================================

/// The expression kinds the parser produces.
///
/// Only `Ident`, `Literal`, `Binary`, `Unary`, `Index`, `Call` and `Paren` may
/// appear inside a macro body that gets substituted. The other kinds are
/// accepted in ordinary code only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Ident(String),
    Literal {
        kind: LitKind,
        raw: String,
    },
    Binary {
        left: ExprNode,
        op: BinaryOp,
        right: ExprNode,
    },
    Unary {
        op: UnaryOp,
        operand: ExprNode,
    },
    Index {
        base: ExprNode,
        index: ExprNode,
    },
    Call {
        callee: ExprNode,
        args: Vec<ExprNode>,
        /// Final argument spread with `...`.
        ellipsis: bool,
    },
    Paren(ExprNode),
    /// Field or package member access, `base.field`.
    Selector {
        base: ExprNode,
        field: String,
    },
    /// `base[low:high:max]`, any bound may be absent.
    Slice {
        base: ExprNode,
        low: Option<ExprNode>,
        high: Option<ExprNode>,
        max: Option<ExprNode>,
    },
    /// `base.(T)`. In a type switch guard `ty` is `type`.
    TypeAssert {
        base: ExprNode,
        ty: String,
    },
    /// `T{...}`. `ty` is empty for an elided inner literal.
    Composite {
        ty: String,
        elements: Vec<Element>,
        /// Written with one element per line.
        multiline: bool,
    },
    /// `func(params) results { body }`; the signature is kept as written.
    FuncLit {
        signature: String,
        body: Block,
    },
    /// A type used as an operand, as in `make([]int, n)`.
    Type(String),
}

/// One element of a composite literal, `key: value` or just `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub key: Option<ExprNode>,
    pub value: ExprNode,
}

impl Expr {
    /// Human-readable name of the node kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Ident(_) => "identifier",
            Expr::Literal { .. } => "literal",
            Expr::Binary { .. } => "binary expression",
            Expr::Unary { .. } => "unary expression",
            Expr::Index { .. } => "index expression",
            Expr::Call { .. } => "call expression",
            Expr::Paren(_) => "parenthesized expression",
            Expr::Selector { .. } => "selector expression",
            Expr::Slice { .. } => "slice expression",
            Expr::TypeAssert { .. } => "type assertion",
            Expr::Composite { .. } => "composite literal",
            Expr::FuncLit { .. } => "function literal",
            Expr::Type(_) => "type expression",
        }
    }

    /// Returns the identifier name if this is a bare identifier.
    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Expr::Ident(name) => Some(name),
            _ => None,
        }
    }
}

/// Literal kinds. The raw source text is kept alongside, never re-rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LitKind {
    Int,
    Float,
    Char,
    String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    LogicalOr,
    LogicalAnd,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Add,
    Sub,
    BitOr,
    BitXor,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    BitAnd,
    AndNot,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::LogicalOr => "||",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::BitAnd => "&",
            BinaryOp::AndNot => "&^",
        }
    }

    /// Binding strength, 5 (tightest) down to 1.
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOp::LogicalOr => 1,
            BinaryOp::LogicalAnd => 2,
            BinaryOp::Eq
            | BinaryOp::NotEq
            | BinaryOp::Lt
            | BinaryOp::LtEq
            | BinaryOp::Gt
            | BinaryOp::GtEq => 3,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::BitOr | BinaryOp::BitXor => 4,
            BinaryOp::Mul
            | BinaryOp::Div
            | BinaryOp::Rem
            | BinaryOp::Shl
            | BinaryOp::Shr
            | BinaryOp::BitAnd
            | BinaryOp::AndNot => 5,
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        let op = match token {
            "||" => BinaryOp::LogicalOr,
            "&&" => BinaryOp::LogicalAnd,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::NotEq,
            "<" => BinaryOp::Lt,
            "<=" => BinaryOp::LtEq,
            ">" => BinaryOp::Gt,
            ">=" => BinaryOp::GtEq,
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "|" => BinaryOp::BitOr,
            "^" => BinaryOp::BitXor,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Rem,
            "<<" => BinaryOp::Shl,
            ">>" => BinaryOp::Shr,
            "&" => BinaryOp::BitAnd,
            "&^" => BinaryOp::AndNot,
            _ => return None,
        };
        Some(op)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    Plus,
    Neg,
    Not,
    BitNot,
    Deref,
    AddrOf,
    Recv,
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "^",
            UnaryOp::Deref => "*",
            UnaryOp::AddrOf => "&",
            UnaryOp::Recv => "<-",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        let op = match token {
            "+" => UnaryOp::Plus,
            "-" => UnaryOp::Neg,
            "!" => UnaryOp::Not,
            "^" => UnaryOp::BitNot,
            "*" => UnaryOp::Deref,
            "&" => UnaryOp::AddrOf,
            "<-" => UnaryOp::Recv,
            _ => return None,
        };
        Some(op)
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// STATEMENTS
// ============================================================================

/// The statement kinds the parser produces.
///
/// Only `Assign` and `Expr` (plus verbatim `Comment`s) may appear inside a
/// macro body that gets substituted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Assign {
        lhs: Vec<ExprNode>,
        op: AssignOp,
        rhs: Vec<ExprNode>,
    },
    Expr(ExprNode),
    IncDec {
        target: ExprNode,
        op: IncDecOp,
    },
    /// `channel <- value`
    Send {
        channel: ExprNode,
        value: ExprNode,
    },
    Go(ExprNode),
    Defer(ExprNode),
    Block(Block),
    If(IfStmt),
    For(ForStmt),
    Switch(SwitchStmt),
    /// A `select` statement, kept as written. Nothing inside it is expanded.
    Select(String),
    Labeled {
        label: String,
        stmt: Box<StmtNode>,
    },
    Return(Vec<ExprNode>),
    Branch {
        kind: BranchKind,
        label: Option<String>,
    },
    Value(ValueDecl),
    Type(DeclGroup<TypeSpec>),
    Comment(Comment),
}

impl Stmt {
    /// Human-readable name of the node kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Stmt::Assign { .. } => "assignment statement",
            Stmt::Expr(_) => "expression statement",
            Stmt::IncDec { .. } => "increment/decrement statement",
            Stmt::Send { .. } => "send statement",
            Stmt::Go(_) => "go statement",
            Stmt::Defer(_) => "defer statement",
            Stmt::Block(_) => "block statement",
            Stmt::If(_) => "if statement",
            Stmt::For(_) => "for statement",
            Stmt::Switch(_) => "switch statement",
            Stmt::Select(_) => "select statement",
            Stmt::Labeled { .. } => "labeled statement",
            Stmt::Return(_) => "return statement",
            Stmt::Branch { .. } => "branch statement",
            Stmt::Value(decl) => match decl.keyword {
                ValueKeyword::Var => "var declaration",
                ValueKeyword::Const => "const declaration",
            },
            Stmt::Type(_) => "type declaration",
            Stmt::Comment(_) => "comment",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignOp {
    Define,
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    AndNot,
}

impl AssignOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignOp::Define => ":=",
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Rem => "%=",
            AssignOp::BitAnd => "&=",
            AssignOp::BitOr => "|=",
            AssignOp::BitXor => "^=",
            AssignOp::Shl => "<<=",
            AssignOp::Shr => ">>=",
            AssignOp::AndNot => "&^=",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        let op = match token {
            ":=" => AssignOp::Define,
            "=" => AssignOp::Assign,
            "+=" => AssignOp::Add,
            "-=" => AssignOp::Sub,
            "*=" => AssignOp::Mul,
            "/=" => AssignOp::Div,
            "%=" => AssignOp::Rem,
            "&=" => AssignOp::BitAnd,
            "|=" => AssignOp::BitOr,
            "^=" => AssignOp::BitXor,
            "<<=" => AssignOp::Shl,
            ">>=" => AssignOp::Shr,
            "&^=" => AssignOp::AndNot,
            _ => return None,
        };
        Some(op)
    }
}

impl fmt::Display for AssignOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncDecOp {
    Inc,
    Dec,
}

impl IncDecOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncDecOp::Inc => "++",
            IncDecOp::Dec => "--",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchKind {
    Break,
    Continue,
    Goto,
    Fallthrough,
}

impl BranchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BranchKind::Break => "break",
            BranchKind::Continue => "continue",
            BranchKind::Goto => "goto",
            BranchKind::Fallthrough => "fallthrough",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        let kind = match token {
            "break" => BranchKind::Break,
            "continue" => BranchKind::Continue,
            "goto" => BranchKind::Goto,
            "fallthrough" => BranchKind::Fallthrough,
            _ => return None,
        };
        Some(kind)
    }
}

/// A brace-delimited statement list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Block {
    pub stmts: Vec<StmtNode>,
    pub span: Option<Span>,
}

impl Block {
    pub fn new(stmts: Vec<StmtNode>) -> Self {
        Self { stmts, span: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStmt {
    pub init: Option<Box<StmtNode>>,
    pub cond: ExprNode,
    pub then_block: Block,
    /// Either another `If` statement or a `Block` statement.
    pub else_branch: Option<Box<StmtNode>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForStmt {
    pub header: ForHeader,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ForHeader {
    /// `for { ... }`
    Forever,
    /// `for cond { ... }`
    Cond(ExprNode),
    /// `for init; cond; post { ... }`
    Clause {
        init: Option<Box<StmtNode>>,
        cond: Option<ExprNode>,
        post: Option<Box<StmtNode>>,
    },
    /// `for k, v := range xs { ... }`
    Range {
        vars: Vec<ExprNode>,
        define: bool,
        iterable: ExprNode,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchStmt {
    pub init: Option<Box<StmtNode>>,
    /// An expression statement, or a `v := x.(type)` guard.
    pub tag: Option<Box<StmtNode>>,
    pub clauses: Vec<CaseClause>,
}

/// `case a, b:` followed by its statements. `values` is `None` for
/// `default:`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseClause {
    pub values: Option<Vec<ExprNode>>,
    pub body: Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKeyword {
    Var,
    Const,
}

impl ValueKeyword {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKeyword::Var => "var",
            ValueKeyword::Const => "const",
        }
    }
}

/// A `var` or `const` declaration, single or grouped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueDecl {
    pub keyword: ValueKeyword,
    pub specs: DeclGroup<ValueSpec>,
}

/// Names with an optional type and initializers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSpec {
    pub names: Vec<String>,
    pub ty: Option<String>,
    pub values: Vec<ExprNode>,
}

/// `Name[params] T` or `Name = T`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSpec {
    pub name: String,
    /// Type parameters, brackets included, as written.
    pub params: Option<String>,
    pub alias: bool,
    /// The type, as written.
    pub ty: String,
}

/// The specs of an `import`, `var`, `const` or `type` declaration.
///
/// A parenthesized group may hold comments between its specs.
///
/// ```rust
/// use gomacro::ast::{DeclGroup, GroupEntry, ImportSpec};
/// let group = DeclGroup::single(ImportSpec { alias: None, path: "\"fmt\"".into() });
/// assert!(!group.grouped);
/// assert_eq!(group.specs().count(), 1);
/// assert!(matches!(group.entries[0], GroupEntry::Spec(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclGroup<T> {
    pub grouped: bool,
    pub entries: Vec<GroupEntry<T>>,
}

impl<T> DeclGroup<T> {
    /// An ungrouped declaration of one spec.
    pub fn single(spec: T) -> Self {
        Self {
            grouped: false,
            entries: vec![GroupEntry::Spec(spec)],
        }
    }

    pub fn specs(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().filter_map(|entry| match entry {
            GroupEntry::Spec(spec) => Some(spec),
            GroupEntry::Comment(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GroupEntry<T> {
    Spec(T),
    Comment(Comment),
}

/// A `//` line comment, stored with its marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    /// True when the comment followed code on the same line.
    pub trailing: bool,
}

// ============================================================================
// DECLARATIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Decl {
    Import(DeclGroup<ImportSpec>),
    Value(ValueDecl),
    Type(DeclGroup<TypeSpec>),
    Func(FuncDecl),
    Comment(Comment),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSpec {
    pub alias: Option<String>,
    /// The quoted import path, as written.
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncDecl {
    /// Method receiver, parentheses included, as written.
    pub receiver: Option<String>,
    pub name: String,
    /// Type parameters, brackets included, as written.
    pub type_params: Option<String>,
    pub params: Vec<ParamGroup>,
    /// Result type(s), as written.
    pub results: Option<String>,
    pub body: Block,
}

impl FuncDecl {
    /// Flattens grouped parameters into their names, in declaration order.
    ///
    /// ```rust
    /// use gomacro::ast::{Block, FuncDecl, ParamGroup};
    /// let decl = FuncDecl {
    ///     receiver: None,
    ///     name: "f".into(),
    ///     type_params: None,
    ///     params: vec![
    ///         ParamGroup { names: vec!["a".into(), "b".into()], ty: Some("int".into()) },
    ///         ParamGroup { names: vec!["c".into()], ty: Some("string".into()) },
    ///     ],
    ///     results: None,
    ///     body: Block::default(),
    /// };
    /// assert_eq!(decl.param_names(), vec!["a", "b", "c"]);
    /// ```
    pub fn param_names(&self) -> Vec<String> {
        self.params
            .iter()
            .flat_map(|group| group.names.iter().cloned())
            .collect()
    }
}

/// Names sharing one type, as in `a, b int`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamGroup {
    pub names: Vec<String>,
    pub ty: Option<String>,
}

/// A whole source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Comments above the package clause.
    pub leading: Vec<Comment>,
    pub package: String,
    pub decls: Vec<DeclNode>,
}

impl Program {
    /// Iterates over the function declarations in order.
    pub fn functions(&self) -> impl Iterator<Item = &FuncDecl> {
        self.decls.iter().filter_map(|decl| match &decl.value {
            Decl::Func(func) => Some(func),
            _ => None,
        })
    }
}
