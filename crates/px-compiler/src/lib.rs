//! The core of the `px` compiler's front end: preprocessor, semantic
//! analyzer, and diagnostics engine.
//!
//! The lexer, parser, debug-output renderer, and command-line driver are
//! external collaborators (spec §1) reached only through the typed
//! boundaries this crate declares in [`px_syntax`]: a [`px_syntax::Token`]
//! stream is the Preprocessor → Lexer → Parser contract, and
//! [`px_syntax::ast::Ast`] is the Parser → Semantic contract. This crate
//! never constructs either on its own.
//!
//! ```text
//! raw source ─▶ Preprocessor ─▶ preprocessed text ─▶ Lexer (ext) ─▶ tokens
//!                                                      Parser (ext) ─▶ AST
//! AST ─▶ Semantic Analyzer ─▶ scope tree + symbol table
//! ```
//!
//! All three core components write to a single [`diagnostics::DiagnosticsRegistry`]
//! (spec §2); none of them abort on the first error by default — that is a
//! driver policy, exposed here as `exit_on_error`.

pub mod debug;
pub mod diagnostics;
pub mod files;
pub mod preprocessor;
pub mod semantic;
pub mod types;

pub use px_syntax::Text;
pub use types::SourceFile;

use diagnostics::DiagnosticsRegistry;
use preprocessor::PreprocessorContext;
use semantic::SemanticContext;

/// Preprocess one translation unit, expanding macros, stripping comments,
/// and splicing in every `#import`/`#using` target, in one call (spec §4.1).
///
/// Returns the text ready to hand to the (external) lexer. Diagnostics
/// raised along the way land in `diagnostics`, which the caller should keep
/// passing to [`analyze`] so both stages share one registry (spec §2).
#[tracing::instrument(level = "debug", skip(source, diagnostics))]
pub fn preprocess(
    path: &std::path::Path,
    source: &str,
    diagnostics: &mut DiagnosticsRegistry,
) -> String {
    let mut ctx = PreprocessorContext::new(diagnostics);
    ctx.preprocess_root(path, source)
}

/// Run the semantic analyzer over a parsed translation unit (spec §4.2).
///
/// `source` must be the exact text the parser consumed, since the AST's
/// [`px_syntax::Span`]s are byte offsets into it; the analyzer resolves
/// them to line/column positions for diagnostics. Returns the populated
/// [`SemanticContext`] so the debug-output renderer can serialize the
/// resulting scope tree (see [`debug::SymbolTableView`]).
#[tracing::instrument(level = "debug", skip_all)]
pub fn analyze<'a>(
    ast: &px_syntax::ast::Ast,
    source: &'a str,
    diagnostics: &'a mut DiagnosticsRegistry,
    exit_on_error: bool,
) -> SemanticContext<'a> {
    let mut ctx = SemanticContext::new(diagnostics, source, exit_on_error);
    ctx.analyze(ast);
    ctx
}
