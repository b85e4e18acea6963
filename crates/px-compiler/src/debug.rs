//! Serialization views consumed by the (external, out-of-scope) debug-output
//! renderer, which pretty-prints tokens, the AST, and the symbol table.
//!
//! The teacher (`mcc`) threads a `salsa::Database` through a
//! `SerializeWithDatabase` adapter because its tracked structs only hold
//! database keys. Nothing here is salsa-tracked, so a plain `serde::Serialize`
//! derive on the scope tree and symbol table is sufficient; this module just
//! gives the renderer one clearly named entry point instead of requiring it
//! to know the internals of `semantic::scope`.

use serde::Serialize;

use crate::semantic::SemanticContext;

/// A serializable snapshot of the global scope tree, suitable for the
/// `semantic` debug-output stage named in spec §6 (`<basename>_semantic.txt`).
#[derive(Debug, Serialize)]
pub struct SymbolTableView<'a> {
    root: &'a crate::semantic::scope::ScopeTree,
}

impl<'a> SymbolTableView<'a> {
    pub fn new(ctx: &'a SemanticContext) -> Self {
        SymbolTableView {
            root: ctx.scopes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use px_syntax::ast::{Ast, Decl, StateModifier, TypeExpr, VariableDecl};
    use px_syntax::Span;

    use super::SymbolTableView;
    use crate::diagnostics::DiagnosticsRegistry;

    #[test]
    fn symbol_table_view_serializes_a_single_global() {
        let span = Span::new(4, 1);
        let ast = Ast {
            items: vec![Decl::Variable(VariableDecl {
                modifier: StateModifier::Var,
                name: "count".into(),
                type_expr: Some(TypeExpr::named("Int", span)),
                initializer: None,
                span,
            })],
            span: Span::new(0, 20),
        };
        let source = "var count: Int;";
        let mut diagnostics = DiagnosticsRegistry::new();
        let ctx = crate::analyze(&ast, source, &mut diagnostics, false);
        insta::assert_json_snapshot!(SymbolTableView::new(&ctx));
    }
}
