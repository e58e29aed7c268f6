use crate::lexer::token::LitKind;
use crate::span::{Span, Spanned};

// ══════════════════════════════════════════════════════════════
// Identifiers
// ══════════════════════════════════════════════════════════════

/// An identifier occurrence. Every name in the tree is one of these, so a
/// walk over the tree sees every place a name is used.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }

    /// An identifier created by a transformation rather than read from source.
    pub fn synthetic(name: impl Into<String>) -> Self {
        Self::new(name, Span::dummy())
    }
}

// ══════════════════════════════════════════════════════════════
// Top-Level
// ══════════════════════════════════════════════════════════════

/// A complete source file.
#[derive(Debug, Clone)]
pub struct File {
    pub doc: Vec<String>,
    pub package: Ident,
    pub decls: Vec<Spanned<Decl>>,
    pub span: Span,
}

/// A top-level (or function-local) declaration.
#[derive(Debug, Clone)]
pub enum Decl {
    Import(ImportDecl),
    Type(TypeDecl),
    Func(FuncDecl),
    Var(ValueDecl),
    Const(ValueDecl),
}

impl Decl {
    pub fn is_import(&self) -> bool {
        matches!(self, Decl::Import(_))
    }

    /// Leading doc comment lines.
    pub fn doc(&self) -> &[String] {
        match self {
            Decl::Import(d) => &d.doc,
            Decl::Type(d) => &d.doc,
            Decl::Func(d) => &d.doc,
            Decl::Var(d) | Decl::Const(d) => &d.doc,
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Imports
// ══════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub doc: Vec<String>,
    pub specs: Vec<ImportSpec>,
    /// Written as `import ( ... )`.
    pub grouped: bool,
}

#[derive(Debug, Clone)]
pub struct ImportSpec {
    /// Local name, `.` or `_`.
    pub name: Option<Ident>,
    /// The quoted path, as written.
    pub path: Spanned<String>,
    pub comment: Option<String>,
}

// ══════════════════════════════════════════════════════════════
// Type declarations
// ══════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub doc: Vec<String>,
    pub specs: Vec<TypeSpec>,
    pub grouped: bool,
}

#[derive(Debug, Clone)]
pub struct TypeSpec {
    pub name: Ident,
    /// `type A = B`
    pub is_alias: bool,
    pub type_: Spanned<TypeExpr>,
    pub comment: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum TypeExpr {
    Name(Ident),
    Qualified { package: Ident, name: Ident },
    Pointer(Box<Spanned<TypeExpr>>),
    Slice(Box<Spanned<TypeExpr>>),
    /// `[N]T`, or `[...]T` when `len` is `None`.
    Array {
        len: Option<Box<Spanned<Expr>>>,
        elem: Box<Spanned<TypeExpr>>,
    },
    Map {
        key: Box<Spanned<TypeExpr>>,
        value: Box<Spanned<TypeExpr>>,
    },
    Chan {
        dir: ChanDir,
        elem: Box<Spanned<TypeExpr>>,
    },
    Func(FuncType),
    Struct(StructType),
    Interface(InterfaceType),
    /// `...T`, only valid as the last parameter type.
    Variadic(Box<Spanned<TypeExpr>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

#[derive(Debug, Clone)]
pub struct StructType {
    pub fields: Vec<Field>,
}

/// A struct field, parameter, result or receiver.
#[derive(Debug, Clone)]
pub struct Field {
    pub doc: Vec<String>,
    /// Empty for embedded fields and unnamed parameters.
    pub names: Vec<Ident>,
    pub type_: Spanned<TypeExpr>,
    /// The tag string literal, as written.
    pub tag: Option<String>,
    pub comment: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct InterfaceType {
    pub elems: Vec<InterfaceElem>,
}

#[derive(Debug, Clone)]
pub enum InterfaceElem {
    Method {
        name: Ident,
        signature: FuncType,
        comment: Option<String>,
    },
    Embedded {
        type_: Spanned<TypeExpr>,
        comment: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct FuncType {
    pub params: Vec<Field>,
    pub results: Vec<Field>,
}

// ══════════════════════════════════════════════════════════════
// Functions
// ══════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub doc: Vec<String>,
    pub recv: Option<Field>,
    pub name: Ident,
    pub signature: FuncType,
    /// `None` for external (assembly-backed) declarations.
    pub body: Option<Block>,
    pub span: Span,
}

impl FuncDecl {
    /// The base type identifier of the receiver: `T` for both `T` and `*T`.
    pub fn receiver_type(&self) -> Option<&Ident> {
        let recv = self.recv.as_ref()?;
        match &recv.type_.node {
            TypeExpr::Name(ident) => Some(ident),
            TypeExpr::Pointer(inner) => match &inner.node {
                TypeExpr::Name(ident) => Some(ident),
                _ => None,
            },
            _ => None,
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Const / var
// ══════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct ValueDecl {
    pub doc: Vec<String>,
    pub specs: Vec<ValueSpec>,
    pub grouped: bool,
}

#[derive(Debug, Clone)]
pub struct ValueSpec {
    pub names: Vec<Ident>,
    pub type_: Option<Spanned<TypeExpr>>,
    pub values: Vec<Spanned<Expr>>,
    pub comment: Option<String>,
}

// ══════════════════════════════════════════════════════════════
// Statements
// ══════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<Spanned<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Decl(Decl),
    Expr(Spanned<Expr>),
    Send {
        chan: Spanned<Expr>,
        value: Spanned<Expr>,
    },
    IncDec {
        expr: Spanned<Expr>,
        inc: bool,
    },
    Assign {
        lhs: Vec<Spanned<Expr>>,
        op: AssignOp,
        rhs: Vec<Spanned<Expr>>,
    },
    Go(Spanned<Expr>),
    Defer(Spanned<Expr>),
    Return(Vec<Spanned<Expr>>),
    Branch {
        kind: BranchKind,
        label: Option<Ident>,
    },
    Block(Block),
    If(IfStmt),
    Switch(SwitchStmt),
    TypeSwitch(TypeSwitchStmt),
    Select(Vec<CommClause>),
    For(ForStmt),
    Range(RangeStmt),
    Labeled {
        label: Ident,
        stmt: Box<Spanned<Stmt>>,
    },
    Empty,
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub init: Option<Box<Spanned<Stmt>>>,
    pub cond: Spanned<Expr>,
    pub then: Block,
    /// Either another `Stmt::If` or a `Stmt::Block`.
    pub else_: Option<Box<Spanned<Stmt>>>,
}

#[derive(Debug, Clone)]
pub struct SwitchStmt {
    pub init: Option<Box<Spanned<Stmt>>>,
    pub tag: Option<Spanned<Expr>>,
    pub cases: Vec<CaseClause>,
}

#[derive(Debug, Clone)]
pub struct CaseClause {
    /// Empty for `default`.
    pub exprs: Vec<Spanned<Expr>>,
    pub body: Vec<Spanned<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TypeSwitchStmt {
    pub init: Option<Box<Spanned<Stmt>>>,
    /// `v` in `switch v := x.(type)`.
    pub binding: Option<Ident>,
    /// `x` in `x.(type)`.
    pub expr: Spanned<Expr>,
    pub cases: Vec<TypeCaseClause>,
}

#[derive(Debug, Clone)]
pub struct TypeCaseClause {
    /// Empty for `default`.
    pub types: Vec<Spanned<TypeExpr>>,
    pub body: Vec<Spanned<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CommClause {
    /// Send or receive statement; `None` for `default`.
    pub comm: Option<Box<Spanned<Stmt>>>,
    pub body: Vec<Spanned<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ForStmt {
    pub init: Option<Box<Spanned<Stmt>>>,
    pub cond: Option<Spanned<Expr>>,
    pub post: Option<Box<Spanned<Stmt>>>,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct RangeStmt {
    pub key: Option<Spanned<Expr>>,
    pub value: Option<Spanned<Expr>>,
    /// `:=` rather than `=`.
    pub define: bool,
    pub expr: Spanned<Expr>,
    pub body: Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Define,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    AndNot,
}

impl AssignOp {
    pub fn as_str(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Define => ":=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Rem => "%=",
            AssignOp::And => "&=",
            AssignOp::Or => "|=",
            AssignOp::Xor => "^=",
            AssignOp::Shl => "<<=",
            AssignOp::Shr => ">>=",
            AssignOp::AndNot => "&^=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    Break,
    Continue,
    Goto,
    Fallthrough,
}

impl BranchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BranchKind::Break => "break",
            BranchKind::Continue => "continue",
            BranchKind::Goto => "goto",
            BranchKind::Fallthrough => "fallthrough",
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub enum Expr {
    Ident(Ident),
    BasicLit {
        kind: LitKind,
        value: String,
    },
    /// `T{...}`; `type_` is `None` for elided types inside another literal.
    Composite {
        type_: Option<Box<Spanned<Expr>>>,
        elts: Vec<Spanned<Expr>>,
        /// The closing brace was on a later line than the opening one.
        multiline: bool,
    },
    KeyValue {
        key: Box<Spanned<Expr>>,
        value: Box<Spanned<Expr>>,
    },
    FuncLit {
        signature: FuncType,
        body: Block,
    },
    Paren(Box<Spanned<Expr>>),
    Selector {
        expr: Box<Spanned<Expr>>,
        sel: Ident,
    },
    Index {
        expr: Box<Spanned<Expr>>,
        indices: Vec<Spanned<Expr>>,
    },
    Slice {
        expr: Box<Spanned<Expr>>,
        low: Option<Box<Spanned<Expr>>>,
        high: Option<Box<Spanned<Expr>>>,
        max: Option<Box<Spanned<Expr>>>,
    },
    /// `x.(T)`; `type_` is `None` for `x.(type)` in a type switch.
    TypeAssert {
        expr: Box<Spanned<Expr>>,
        type_: Option<Box<Spanned<TypeExpr>>>,
    },
    Call {
        fun: Box<Spanned<Expr>>,
        args: Vec<Spanned<Expr>>,
        /// Trailing `...` on the last argument.
        ellipsis: bool,
    },
    /// `*x`: a dereference or a pointer type.
    Star(Box<Spanned<Expr>>),
    Unary {
        op: UnaryOp,
        expr: Box<Spanned<Expr>>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Spanned<Expr>>,
        rhs: Box<Spanned<Expr>>,
    },
    /// A type in expression position: `[]int{}`, `map[K]V(nil)`, `make(chan T)`.
    Type(Box<Spanned<TypeExpr>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Neg,
    Not,
    BitNot,
    Addr,
    Recv,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "^",
            UnaryOp::Addr => "&",
            UnaryOp::Recv => "<-",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    LogOr,
    LogAnd,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Or,
    Xor,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    And,
    AndNot,
}

impl BinaryOp {
    /// Go operator precedence, 1 (`||`) to 5 (`*`).
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::LogOr => 1,
            BinaryOp::LogAnd => 2,
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge => 3,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Or | BinaryOp::Xor => 4,
            BinaryOp::Mul
            | BinaryOp::Div
            | BinaryOp::Rem
            | BinaryOp::Shl
            | BinaryOp::Shr
            | BinaryOp::And
            | BinaryOp::AndNot => 5,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::LogOr => "||",
            BinaryOp::LogAnd => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Or => "|",
            BinaryOp::Xor => "^",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::And => "&",
            BinaryOp::AndNot => "&^",
        }
    }
}
