use crate::{Span, Text};

/// One token as handed from the (external) lexer to the (external) parser.
///
/// `px-syntax` only declares the shape of this contract; nothing in this
/// workspace constructs `Token`s from real source text.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: Text,
    pub position: crate::Position,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum TokenKind {
    Identifier,
    IntLiteral,
    RealLiteral,
    CharLiteral,
    StringLiteral,
    Keyword,
    Punctuation,
    Eof,
}
