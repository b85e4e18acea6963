//! Return-coverage checking (spec §4.2).

use px_syntax::ast::{Block, Stmt};

/// Whether every path through `block` ends in a `return` (spec §4.2: "body
/// must end in `return`, or every branch of the terminal `if` must
/// recursively end in `return`").
pub fn always_returns(block: &Block) -> bool {
    block.stmts.last().is_some_and(stmt_always_returns)
}

fn stmt_always_returns(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Return(..) => true,
        Stmt::Block(block) => always_returns(block),
        Stmt::If {
            then_branch,
            else_branch,
            ..
        } => {
            let then_returns = always_returns(then_branch);
            let else_returns = else_branch
                .as_deref()
                .is_some_and(stmt_always_returns);
            then_returns && else_returns
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use px_syntax::{Position, Span};

    fn span() -> Span {
        Span::new(0, 0)
    }

    fn ret() -> Stmt {
        Stmt::Return(None, span())
    }

    #[test]
    fn single_return_covers() {
        let block = Block {
            stmts: vec![ret()],
            span: span(),
        };
        assert!(always_returns(&block));
    }

    #[test]
    fn missing_terminal_return_does_not_cover() {
        let block = Block {
            stmts: vec![],
            span: span(),
        };
        assert!(!always_returns(&block));
    }

    #[test]
    fn if_else_both_returning_covers() {
        let then_branch = Block {
            stmts: vec![ret()],
            span: span(),
        };
        let else_branch = Some(Box::new(ret()));
        let block = Block {
            stmts: vec![Stmt::If {
                condition: px_syntax::ast::Expr::BoolLiteral(true, span()),
                then_branch,
                else_branch,
                span: span(),
            }],
            span: span(),
        };
        assert!(always_returns(&block));
        let _ = Position::new(1, 1);
    }

    #[test]
    fn if_without_else_does_not_cover() {
        let then_branch = Block {
            stmts: vec![ret()],
            span: span(),
        };
        let block = Block {
            stmts: vec![Stmt::If {
                condition: px_syntax::ast::Expr::BoolLiteral(true, span()),
                then_branch,
                else_branch: None,
                span: span(),
            }],
            span: span(),
        };
        assert!(!always_returns(&block));
    }
}
