//! One function per scenario named in spec §8's "Concrete end-to-end
//! scenarios" and "Universal invariants".

use libtest_mimic::Failed;
use px_compiler::diagnostics::DiagnosticsRegistry;
use px_syntax::ast::{
    ArrayDecl, Ast, Block, Decl, Expr, FunctionDecl, StateModifier, Stmt, TypeExpr, VariableDecl,
};
use px_syntax::Span;

use crate::{preprocess_and_render, render};

const NOWHERE: Span = Span::new(0, 0);

fn named_type(name: &str) -> TypeExpr {
    TypeExpr::named(name, NOWHERE)
}

// -- Preprocessor scenarios -------------------------------------------------

pub(crate) fn comment_stripping_preserves_lines() -> Result<(), Failed> {
    let (out, diagnostics) = preprocess_and_render("a\n// x y z\nb\n");
    if out != "a\n\nb\n" {
        return Err(format!("unexpected preprocessor output: {out:?}").into());
    }
    if diagnostics.error_count() != 0 {
        return Err(format!("expected 0 errors, got {}", diagnostics.error_count()).into());
    }
    Ok(())
}

pub(crate) fn conditional_suppression() -> Result<(), Failed> {
    let (out, _) = preprocess_and_render("#define A 1\n#ifdef A\nkeep\n#else\ndrop\n#endif\n");
    if !out.contains("keep") {
        return Err(format!("expected output to contain \"keep\": {out:?}").into());
    }
    if out.contains("drop") {
        return Err(format!("expected output to not contain \"drop\": {out:?}").into());
    }
    Ok(())
}

pub(crate) fn nested_false_branch() -> Result<(), Failed> {
    let mut diagnostics = DiagnosticsRegistry::new();
    let mut ctx = px_compiler::preprocessor::PreprocessorContext::new(&mut diagnostics);
    let out = ctx.preprocess_root(
        std::path::Path::new("fixture.px"),
        "#ifdef UNDEF\n#ifdef ALSO_UNDEF\nx\n#endif\n#endif\n",
    );
    if out.contains('x') {
        return Err(format!("expected no 'x' in output: {out:?}").into());
    }
    if !ctx.conditionals.is_empty() {
        return Err("conditional stack is not empty at end of input".into());
    }
    if diagnostics.error_count() != 0 {
        return Err(format!("expected 0 errors, got {}", diagnostics.error_count()).into());
    }
    Ok(())
}

pub(crate) fn preprocessor_identity_on_plain_input() -> Result<(), Failed> {
    let source = "a plain file\nwith two lines\n";
    let (out, diagnostics) = preprocess_and_render(source);
    if out != source {
        return Err(format!("expected identity, got {out:?}").into());
    }
    if diagnostics.error_count() != 0 {
        return Err(format!("expected 0 errors, got {}", diagnostics.error_count()).into());
    }
    Ok(())
}

// -- Semantic scenarios ------------------------------------------------------
//
// There is no parser in this workspace (spec §1): these build the `Ast`
// directly, the way a hand-written test double for the parser would.

/// `var a: Int = 1; var a: Int = 2;`
pub(crate) fn redeclaration() -> Result<(), Failed> {
    let source = "var a: Int = 1; var a: Int = 2;";
    let ast = Ast {
        items: vec![
            Decl::Variable(VariableDecl {
                modifier: StateModifier::Var,
                name: "a".into(),
                type_expr: Some(named_type("Int")),
                initializer: Some(Expr::IntLiteral(1, NOWHERE)),
                span: NOWHERE,
            }),
            Decl::Variable(VariableDecl {
                modifier: StateModifier::Var,
                name: "a".into(),
                type_expr: Some(named_type("Int")),
                initializer: Some(Expr::IntLiteral(2, NOWHERE)),
                span: NOWHERE,
            }),
        ],
        span: NOWHERE,
    };

    let mut diagnostics = DiagnosticsRegistry::new();
    px_compiler::analyze(&ast, source, &mut diagnostics, false);

    let errors: Vec<_> = diagnostics
        .entries()
        .iter()
        .filter(|e| e.severity == px_compiler::diagnostics::Severity::Error)
        .collect();
    if errors.len() != 1 {
        return Err(format!("expected exactly 1 error, got {}", errors.len()).into());
    }
    let entry = errors[0];
    if entry.context.as_str() != "semantic" {
        return Err(format!("expected context 'semantic', got {}", entry.context).into());
    }
    if entry.code.render().len() != 8 {
        return Err(format!("expected an 8-character code, got {}", entry.code.render()).into());
    }
    if !entry.message.starts_with("Redeclaration of symbol 'a'") {
        return Err(format!("unexpected message: {}", entry.message).into());
    }
    Ok(())
}

/// `var a: Int; a = "hello";`
///
/// This crate's `Ast` only allows declarations at the top level (spec §6's
/// Parser → Semantic contract has no bare top-level statement), so the two
/// statements are nested in a function body; the assignment itself is
/// exactly spec §8's worked example.
pub(crate) fn type_mismatch_in_assignment() -> Result<(), Failed> {
    let source = "func f(): Void { var a: Int; a = \"hello\"; }";
    let ast = Ast {
        items: vec![Decl::Function(FunctionDecl {
            name: "f".into(),
            return_type: named_type("Void"),
            params: Vec::new(),
            variadic: false,
            body: Block {
                stmts: vec![
                    Stmt::Decl(Decl::Variable(VariableDecl {
                        modifier: StateModifier::Var,
                        name: "a".into(),
                        type_expr: Some(named_type("Int")),
                        initializer: None,
                        span: NOWHERE,
                    })),
                    Stmt::Expr(Expr::Assign {
                        target: Box::new(Expr::Identifier("a".into(), NOWHERE)),
                        value: Box::new(Expr::StringLiteral("hello".into(), NOWHERE)),
                        span: NOWHERE,
                    }),
                ],
                span: NOWHERE,
            },
            span: NOWHERE,
        })],
        span: NOWHERE,
    };

    let mut diagnostics = DiagnosticsRegistry::new();
    px_compiler::analyze(&ast, source, &mut diagnostics, false);

    let errors: Vec<_> = diagnostics
        .entries()
        .iter()
        .filter(|e| e.severity == px_compiler::diagnostics::Severity::Error)
        .collect();
    if errors.len() != 1 {
        return Err(format!("expected exactly 1 error, got {}", errors.len()).into());
    }
    let entry = errors[0];
    if entry.context.as_str() != "semantic" {
        return Err(format!("expected context 'semantic', got {}", entry.context).into());
    }
    if !entry.message.contains("cannot assign String") || !entry.message.contains("to Int") {
        return Err(format!("unexpected message: {}", entry.message).into());
    }
    Ok(())
}

/// `var buf: Char[4] = "hello";` — a 5-character literal does not fit a
/// 4-element `Char` array (spec §4.2's dimension-size rule).
pub(crate) fn char_array_rejects_oversized_string_literal() -> Result<(), Failed> {
    let source = "var buf: Char[4] = \"hello\";";
    let ast = Ast {
        items: vec![Decl::Array(ArrayDecl {
            modifier: StateModifier::Var,
            name: "buf".into(),
            element_type: named_type("Char"),
            dimensions: vec![Expr::IntLiteral(4, NOWHERE)],
            initializer: Some(Expr::StringLiteral("hello".into(), NOWHERE)),
            span: NOWHERE,
        })],
        span: NOWHERE,
    };

    let mut diagnostics = DiagnosticsRegistry::new();
    px_compiler::analyze(&ast, source, &mut diagnostics, false);

    let errors: Vec<_> = diagnostics
        .entries()
        .iter()
        .filter(|e| e.severity == px_compiler::diagnostics::Severity::Error)
        .collect();
    if errors.len() != 1 {
        return Err(format!("expected exactly 1 error, got {}", errors.len()).into());
    }
    if !errors[0].message.contains("does not fit") {
        return Err(format!("unexpected message: {}", errors[0].message).into());
    }
    Ok(())
}

/// `var buf: Char[8] = "hello";` fits and raises no diagnostic.
pub(crate) fn char_array_accepts_string_within_capacity() -> Result<(), Failed> {
    let source = "var buf: Char[8] = \"hello\";";
    let ast = Ast {
        items: vec![Decl::Array(ArrayDecl {
            modifier: StateModifier::Var,
            name: "buf".into(),
            element_type: named_type("Char"),
            dimensions: vec![Expr::IntLiteral(8, NOWHERE)],
            initializer: Some(Expr::StringLiteral("hello".into(), NOWHERE)),
            span: NOWHERE,
        })],
        span: NOWHERE,
    };

    let mut diagnostics = DiagnosticsRegistry::new();
    px_compiler::analyze(&ast, source, &mut diagnostics, false);

    if diagnostics.error_count() != 0 {
        return Err(format!("expected 0 errors, got {}", diagnostics.error_count()).into());
    }
    Ok(())
}

/// `func f(): Void { break; }`
pub(crate) fn break_outside_loop() -> Result<(), Failed> {
    let source = "func f(): Void { break; }";
    let ast = Ast {
        items: vec![Decl::Function(FunctionDecl {
            name: "f".into(),
            return_type: named_type("Void"),
            params: Vec::new(),
            variadic: false,
            body: Block {
                stmts: vec![Stmt::Break(NOWHERE)],
                span: NOWHERE,
            },
            span: NOWHERE,
        })],
        span: NOWHERE,
    };

    let mut diagnostics = DiagnosticsRegistry::new();
    px_compiler::analyze(&ast, source, &mut diagnostics, false);

    let errors: Vec<_> = diagnostics
        .entries()
        .iter()
        .filter(|e| e.severity == px_compiler::diagnostics::Severity::Error)
        .collect();
    if errors.len() != 1 {
        return Err(format!("expected exactly 1 error, got {}", errors.len()).into());
    }
    if errors[0].message != "break statement not in loop" {
        return Err(format!("unexpected message: {}", errors[0].message).into());
    }
    Ok(())
}

/// Every diagnostic with a real line number renders as exactly three lines
/// (header, source, caret).
pub(crate) fn rendered_diagnostic_is_three_lines() -> Result<(), Failed> {
    let source = "var a: Int = 1; var a: Int = 2;";
    let ast = Ast {
        items: vec![
            Decl::Variable(VariableDecl {
                modifier: StateModifier::Var,
                name: "a".into(),
                type_expr: Some(named_type("Int")),
                initializer: Some(Expr::IntLiteral(1, Span::new(0, 1))),
                span: Span::new(0, 15),
            }),
            Decl::Variable(VariableDecl {
                modifier: StateModifier::Var,
                name: "a".into(),
                type_expr: Some(named_type("Int")),
                initializer: Some(Expr::IntLiteral(2, Span::new(16, 1))),
                span: Span::new(16, 16),
            }),
        ],
        span: Span::new(0, source.len()),
    };

    let mut diagnostics = DiagnosticsRegistry::new();
    px_compiler::analyze(&ast, source, &mut diagnostics, false);

    let rendered = render(&diagnostics, source);
    let line_count = rendered.lines().count();
    if line_count != 3 {
        return Err(format!("expected a 3-line rendering, got {line_count}: {rendered:?}").into());
    }
    Ok(())
}
