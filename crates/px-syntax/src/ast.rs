//! The parser's output contract (spec §6, "Parser → Semantic contract").
//!
//! The parser itself is an external collaborator; this module only declares
//! the typed tree it hands to the semantic analyzer. Each node still carries
//! every field the contract names (`operation_type`, `value`, left/right
//! children, `extra`, `variable_type`, `default_value`, `state_modifier` /
//! `access_modifier`) — as enum payload rather than a generic struct with
//! optional fields, so the analyzer can match exhaustively instead of
//! checking a discriminant against a C-style union.

use crate::{Span, Text};

/// A complete translation unit: the top-level declarations the parser found,
/// in source order.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Ast {
    pub items: Vec<Decl>,
    pub span: Span,
}

/// The `state_modifier` named on every declaration and every compound member
/// (spec §3's symbol entry, spec §4.2's declaration table).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum StateModifier {
    Var,
    Let,
    Const,
    Obj,
    Func,
    Struct,
    Class,
}

impl StateModifier {
    pub fn as_str(self) -> &'static str {
        match self {
            StateModifier::Var => "var",
            StateModifier::Let => "let",
            StateModifier::Const => "const",
            StateModifier::Obj => "obj",
            StateModifier::Func => "func",
            StateModifier::Struct => "struct",
            StateModifier::Class => "class",
        }
    }
}

/// The AST Type descriptor from spec §3. Syntactic only — the analyzer
/// resolves this into a `semantic::typeck::DataType`.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct TypeExpr {
    pub name: Text,
    pub access_modifier: Option<Text>,
    pub modifiers: Vec<Text>,
    pub pointer_level: u32,
    pub is_reference: bool,
    pub is_register: bool,
    pub is_array: bool,
    pub array_dimensions: Vec<Expr>,
    pub compound_subtypes: Vec<TypeExpr>,
    pub size_bytes: Option<u32>,
    pub angle_expr: Option<Box<Expr>>,
    pub span: Span,
}

impl TypeExpr {
    /// A bare named type with no modifiers, e.g. `Int`.
    pub fn named(name: impl Into<Text>, span: Span) -> Self {
        TypeExpr {
            name: name.into(),
            access_modifier: None,
            modifiers: Vec::new(),
            pointer_level: 0,
            is_reference: false,
            is_register: false,
            is_array: false,
            array_dimensions: Vec::new(),
            compound_subtypes: Vec::new(),
            size_bytes: None,
            angle_expr: None,
            span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Param {
    pub name: Text,
    pub type_expr: TypeExpr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Member {
    pub modifier: StateModifier,
    pub name: Text,
    pub type_expr: TypeExpr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct VariableDecl {
    pub modifier: StateModifier,
    pub name: Text,
    /// `None` when no explicit type annotation and no initializer is present;
    /// the analyzer falls back to `Int` and should warn (spec §9 Open
    /// Questions: "the `TYPE_INT` fallback ... may mask user errors").
    pub type_expr: Option<TypeExpr>,
    pub initializer: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ArrayDecl {
    pub modifier: StateModifier,
    pub name: Text,
    pub element_type: TypeExpr,
    pub dimensions: Vec<Expr>,
    pub initializer: Option<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FunctionDecl {
    pub name: Text,
    pub return_type: TypeExpr,
    pub params: Vec<Param>,
    pub variadic: bool,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StructDecl {
    pub name: Text,
    pub members: Vec<Member>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ClassDecl {
    pub name: Text,
    pub members: Vec<Member>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ObjectDecl {
    pub name: Text,
    pub type_name: Text,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub enum Decl {
    Variable(VariableDecl),
    Array(ArrayDecl),
    Function(FunctionDecl),
    Struct(StructDecl),
    Class(ClassDecl),
    Object(ObjectDecl),
}

impl Decl {
    pub fn span(&self) -> Span {
        match self {
            Decl::Variable(d) => d.span,
            Decl::Array(d) => d.span,
            Decl::Function(d) => d.span,
            Decl::Struct(d) => d.span,
            Decl::Class(d) => d.span,
            Decl::Object(d) => d.span,
        }
    }

    pub fn name(&self) -> &Text {
        match self {
            Decl::Variable(d) => &d.name,
            Decl::Array(d) => &d.name,
            Decl::Function(d) => &d.name,
            Decl::Struct(d) => &d.name,
            Decl::Class(d) => &d.name,
            Decl::Object(d) => &d.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum LoopKind {
    While,
    For,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub enum Stmt {
    Decl(Decl),
    Expr(Expr),
    Block(Block),
    If {
        condition: Expr,
        then_branch: Block,
        else_branch: Option<Box<Stmt>>,
        span: Span,
    },
    Loop {
        kind: LoopKind,
        init: Option<Box<Stmt>>,
        condition: Option<Expr>,
        step: Option<Expr>,
        body: Block,
        span: Span,
    },
    Break(Span),
    Continue(Span),
    Return(Option<Expr>, Span),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Decl(d) => d.span(),
            Stmt::Expr(e) => e.span(),
            Stmt::Block(b) => b.span,
            Stmt::If { span, .. }
            | Stmt::Loop { span, .. }
            | Stmt::Return(_, span) => *span,
            Stmt::Break(span) | Stmt::Continue(span) => *span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    BitNot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
    BitOr,
    BitAnd,
    BitXor,
    Shl,
    Shr,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::BitOr => "|",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem
        )
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    pub fn is_bitwise(self) -> bool {
        matches!(
            self,
            BinaryOp::BitOr
                | BinaryOp::BitAnd
                | BinaryOp::BitXor
                | BinaryOp::Shl
                | BinaryOp::Shr
        )
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub enum Expr {
    IntLiteral(i64, Span),
    RealLiteral(f64, Span),
    BoolLiteral(bool, Span),
    CharLiteral(char, Span),
    StringLiteral(Text, Span),
    NoneLiteral(Span),
    Identifier(Text, Span),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        span: Span,
    },
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
        span: Span,
    },
    /// `base -> field`
    FieldAccess {
        base: Box<Expr>,
        field: Text,
        span: Span,
    },
    /// `ClassName :: member`
    ScopeAccess {
        base: Text,
        member: Text,
        span: Span,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        span: Span,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },
    Group(Box<Expr>, Span),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::IntLiteral(_, s)
            | Expr::RealLiteral(_, s)
            | Expr::BoolLiteral(_, s)
            | Expr::CharLiteral(_, s)
            | Expr::StringLiteral(_, s)
            | Expr::NoneLiteral(s)
            | Expr::Identifier(_, s)
            | Expr::Unary { span: s, .. }
            | Expr::Binary { span: s, .. }
            | Expr::Assign { span: s, .. }
            | Expr::FieldAccess { span: s, .. }
            | Expr::ScopeAccess { span: s, .. }
            | Expr::Call { span: s, .. }
            | Expr::Index { span: s, .. }
            | Expr::Group(_, s) => *s,
        }
    }
}
