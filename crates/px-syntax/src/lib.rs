//! Boundary types shared by every stage of the `px` compiler.
//!
//! The lexer and parser are external collaborators (see the workspace-level
//! design notes); this crate only declares the data they are contracted to
//! produce: [`Span`]/[`Position`] for source locations, [`Text`] for cheaply
//! cloned strings, [`token::Token`] for the Lexer → Parser contract, and
//! [`ast`] for the Parser → Semantic contract.

pub mod ast;
mod span;
mod text;
pub mod token;

pub use crate::{
    span::{LineIndex, Position, Span},
    text::Text,
    token::{Token, TokenKind},
};
