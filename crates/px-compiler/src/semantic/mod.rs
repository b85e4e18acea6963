//! The Semantic Analyzer (spec §3, §4.2): a two-phase scoped symbol table
//! with type checking and control-flow validation.
//!
//! There is no teacher implementation to adapt: `mcc`'s closest analogue is
//! the `check_tree`/`ensure_return_type` pass in the now-removed
//! `parsing.rs`, which only validated tree-sitter parse trees structurally.
//! The two-phase collect-then-analyze shape and the scope-tag dispatch here
//! are grounded directly on spec §4.2's own component design.

pub mod control_flow;
pub mod scope;
pub mod symbol;
pub mod typeck;

use px_syntax::ast::{
    self, ArrayDecl, Block, Decl, Expr, FunctionDecl, ObjectDecl, StateModifier, Stmt, TypeExpr,
    VariableDecl,
};
use px_syntax::{LineIndex, Position, Span, Text};

use crate::diagnostics::{codes, Context as DiagContext, DiagnosticsRegistry};
use scope::{ScopeId, ScopeKind, ScopeTree};
use symbol::{FunctionSignature, InitState, Parameter, Symbol, SymbolExtra};
use typeck::DataType;

/// Owns the scope tree and drives two-phase analysis of one translation
/// unit's AST. The diagnostics registry is borrowed, not owned, so the
/// preprocessor and the analyzer can share one registry per file (spec §2:
/// "All three core components write to a single… Diagnostics Engine").
pub struct SemanticContext<'a> {
    scopes: ScopeTree,
    diagnostics: &'a mut DiagnosticsRegistry,
    current: ScopeId,
    current_function: Option<(Text, DataType)>,
    /// Driver policy (spec §4.2): abort analysis of the current file on the
    /// first ERROR-level diagnostic instead of continuing best-effort.
    exit_on_error: bool,
    /// Gates "unused variable" warnings. spec §9 Open Questions notes this
    /// bit is tracked but currently always suppressed; kept as a field so
    /// a driver can opt in without changing the analyzer's shape.
    warnings_enabled: bool,
    aborted: bool,
    /// The AST only carries byte-offset [`Span`]s; this resolves them to
    /// the line/column [`Position`] diagnostics are reported at.
    source: &'a str,
    line_index: LineIndex,
}

impl<'a> SemanticContext<'a> {
    pub fn new(diagnostics: &'a mut DiagnosticsRegistry, source: &'a str, exit_on_error: bool) -> Self {
        let scopes = ScopeTree::new();
        let root = scopes.root();
        let line_index = LineIndex::new(source);
        SemanticContext {
            scopes,
            diagnostics,
            current: root,
            current_function: None,
            exit_on_error,
            warnings_enabled: false,
            aborted: false,
            source,
            line_index,
        }
    }

    fn pos(&self, span: impl std::borrow::Borrow<Span>) -> Position {
        self.line_index.position_at(self.source, span.borrow().start)
    }

    pub fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }

    fn fail_fast(&self) -> bool {
        self.aborted
    }

    fn report(&mut self, severity: crate::diagnostics::Severity, code: codes::ErrorCode, at: Position, len: u32, message: impl Into<String>) {
        self.diagnostics.report(severity, DiagContext::Semantic, code, at, len, message);
        if severity == crate::diagnostics::Severity::Error && self.exit_on_error {
            self.aborted = true;
        }
    }

    /// Walk the AST twice: collect top-level signatures, then analyze
    /// bodies and expressions (spec §4.2).
    pub fn analyze(&mut self, ast: &ast::Ast) {
        for decl in &ast.items {
            if self.fail_fast() {
                return;
            }
            self.collect_top_level(decl);
        }
        for decl in &ast.items {
            if self.fail_fast() {
                return;
            }
            self.analyze_top_level(decl);
        }
    }

    // ---- Phase 1: collection ------------------------------------------------

    fn collect_top_level(&mut self, decl: &Decl) {
        let root = self.scopes.root();
        match decl {
            Decl::Variable(v) => self.collect_variable(root, v),
            Decl::Array(a) => self.collect_array(root, a),
            Decl::Function(f) => self.collect_function(root, f),
            Decl::Struct(s) => self.collect_compound(root, s.name.clone(), StateModifier::Struct, &s.members, s.span),
            Decl::Class(c) => self.collect_compound(root, c.name.clone(), StateModifier::Class, &c.members, c.span),
            Decl::Object(o) => self.collect_object(root, o),
        }
    }

    fn declare(&mut self, scope: ScopeId, name: Text, at: Position, len: u32, symbol: Symbol) {
        if self.scopes.contains_in_scope(scope, &name) {
            self.report(
                crate::diagnostics::Severity::Error,
                codes::semantic::REDECLARATION,
                at,
                len,
                format!("Redeclaration of symbol '{name}'"),
            );
            return;
        }
        if self.scopes.is_shadowing(scope, &name) {
            self.report(
                crate::diagnostics::Severity::Warning,
                codes::semantic::REDECLARATION,
                at,
                len,
                format!("declaration of '{name}' shadows an outer binding"),
            );
        }
        self.scopes.insert(scope, symbol);
    }

    fn collect_variable(&mut self, scope: ScopeId, v: &VariableDecl) {
        let at = self.pos(v.span);
        let data_type = match &v.type_expr {
            Some(t) => DataType::from_type_expr(t),
            None => DataType::Int,
        };
        let full_type_info = v
            .type_expr
            .clone()
            .unwrap_or_else(|| TypeExpr::named("Int", v.span));
        let (is_constant, is_mutable) = match v.modifier {
            StateModifier::Const => (true, false),
            StateModifier::Let => (false, false),
            _ => (false, true),
        };
        let init_state = if v.modifier == StateModifier::Const {
            InitState::Constant
        } else {
            InitState::Uninitialized
        };
        let symbol = Symbol {
            name: v.name.clone(),
            state_modifier: v.modifier,
            data_type,
            full_type_info,
            is_constant,
            is_mutable,
            init_state,
            is_used: false,
            declared_scope: scope,
            declared_at: at,
            extra: SymbolExtra::Plain,
        };
        self.declare(scope, v.name.clone(), at, v.name.len() as u32, symbol);
    }

    fn collect_array(&mut self, scope: ScopeId, a: &ArrayDecl) {
        let at = self.pos(a.span);
        let element = DataType::from_type_expr(&a.element_type);
        let capacity = typeck::eval_const_capacity(&a.dimensions);
        let data_type = DataType::Array(Box::new(element), capacity);
        let symbol = Symbol {
            name: a.name.clone(),
            state_modifier: a.modifier,
            data_type,
            full_type_info: a.element_type.clone(),
            is_constant: false,
            is_mutable: true,
            init_state: InitState::Uninitialized,
            is_used: false,
            declared_scope: scope,
            declared_at: at,
            extra: SymbolExtra::Plain,
        };
        self.declare(scope, a.name.clone(), at, a.name.len() as u32, symbol);
    }

    fn collect_function(&mut self, scope: ScopeId, f: &FunctionDecl) {
        let at = self.pos(f.span);
        let return_type = DataType::from_type_expr(&f.return_type);
        let parameters = f
            .params
            .iter()
            .map(|p| Parameter {
                name: p.name.clone(),
                data_type: DataType::from_type_expr(&p.type_expr),
                full_type_info: p.type_expr.clone(),
            })
            .collect();
        let signature = FunctionSignature {
            return_type: return_type.clone(),
            return_type_info: f.return_type.clone(),
            parameters,
            variadic: f.variadic,
        };
        let symbol = Symbol {
            name: f.name.clone(),
            state_modifier: StateModifier::Func,
            data_type: return_type,
            full_type_info: f.return_type.clone(),
            is_constant: false,
            is_mutable: false,
            init_state: InitState::Full,
            is_used: false,
            declared_scope: scope,
            declared_at: at,
            extra: SymbolExtra::Function(signature),
        };
        self.declare(scope, f.name.clone(), at, f.name.len() as u32, symbol);
    }

    fn collect_compound(
        &mut self,
        scope: ScopeId,
        name: Text,
        modifier: StateModifier,
        members: &[ast::Member],
        span: px_syntax::Span,
    ) {
        let at = self.pos(span);
        let member_scope = self.scopes.push(scope, ScopeKind::Compound);
        for member in members {
            if !matches!(member.modifier, StateModifier::Var | StateModifier::Obj) {
                self.report(
                    crate::diagnostics::Severity::Error,
                    codes::semantic::INVALID_COMPOUND_MEMBER,
                    self.pos(member.span),
                    member.name.len() as u32,
                    format!(
                        "member '{}' must be declared `var` or `obj`, not `{}`",
                        member.name,
                        member.modifier.as_str()
                    ),
                );
                continue;
            }
            let data_type = DataType::from_type_expr(&member.type_expr);
            let member_at = self.pos(member.span);
            let symbol = Symbol {
                name: member.name.clone(),
                state_modifier: member.modifier,
                data_type,
                full_type_info: member.type_expr.clone(),
                is_constant: false,
                is_mutable: true,
                init_state: InitState::Default,
                is_used: false,
                declared_scope: member_scope,
                declared_at: member_at,
                extra: SymbolExtra::Plain,
            };
            self.declare(member_scope, member.name.clone(), member_at, member.name.len() as u32, symbol);
        }
        let compound_symbol = Symbol {
            name: name.clone(),
            state_modifier: modifier,
            data_type: DataType::Compound(name.clone()),
            full_type_info: TypeExpr::named(name.clone(), span),
            is_constant: false,
            is_mutable: false,
            init_state: InitState::Full,
            is_used: false,
            declared_scope: scope,
            declared_at: at,
            extra: SymbolExtra::Compound {
                member_scope,
                members: members.to_vec(),
            },
        };
        self.declare(scope, name.clone(), at, name.len() as u32, compound_symbol);
    }

    fn collect_object(&mut self, scope: ScopeId, o: &ObjectDecl) {
        let at = self.pos(o.span);
        let symbol = Symbol {
            name: o.name.clone(),
            state_modifier: StateModifier::Obj,
            data_type: DataType::Compound(o.type_name.clone()),
            full_type_info: TypeExpr::named(o.type_name.clone(), o.span),
            is_constant: false,
            is_mutable: true,
            init_state: InitState::Uninitialized,
            is_used: false,
            declared_scope: scope,
            declared_at: at,
            extra: SymbolExtra::Plain,
        };
        self.declare(scope, o.name.clone(), at, o.name.len() as u32, symbol);
    }

    // ---- Phase 2: full analysis ---------------------------------------------

    fn analyze_top_level(&mut self, decl: &Decl) {
        match decl {
            Decl::Variable(v) => self.analyze_variable(v),
            Decl::Array(a) => self.analyze_array(a),
            Decl::Function(f) => self.analyze_function(f),
            Decl::Struct(s) => self.analyze_compound(s.name.clone(), &s.members),
            Decl::Class(c) => self.analyze_compound(c.name.clone(), &c.members),
            Decl::Object(o) => self.analyze_object(o),
        }
    }

    fn check_type_exists(&mut self, data_type: &DataType, at: Position) {
        match data_type {
            DataType::Compound(name) => {
                if self.scopes.resolve(self.scopes.root(), name).is_none() {
                    self.report(
                        crate::diagnostics::Severity::Error,
                        codes::semantic::TYPE_NOT_FOUND,
                        at,
                        name.chars().count() as u32,
                        format!("unknown type '{name}'"),
                    );
                }
            }
            DataType::Pointer(inner) | DataType::Reference(inner) | DataType::Array(inner, _) => {
                self.check_type_exists(inner, at)
            }
            _ => {}
        }
    }

    fn analyze_variable(&mut self, v: &VariableDecl) {
        let at = self.pos(v.span);
        let data_type = match &v.type_expr {
            Some(t) => DataType::from_type_expr(t),
            None => DataType::Int,
        };
        if matches!(data_type, DataType::Array(_, _)) {
            self.report(
                crate::diagnostics::Severity::Error,
                codes::semantic::INVALID_OPERATION,
                at,
                v.name.len() as u32,
                "variable declarations may not use an array type; use an array declaration",
            );
        }
        self.check_type_exists(&data_type, at);
        if v.modifier == StateModifier::Const && v.initializer.is_none() {
            self.report(
                crate::diagnostics::Severity::Error,
                codes::semantic::TYPE_MISMATCH,
                at,
                v.name.len() as u32,
                format!("'{}' is declared `const` but has no initializer", v.name),
            );
        }
        if let Some(init) = &v.initializer {
            let (init_type, init_state) = self.analyze_expr(init);
            if !data_type.compatible_with(&init_type) {
                self.report(
                    crate::diagnostics::Severity::Error,
                    codes::semantic::TYPE_MISMATCH,
                    at,
                    v.name.len() as u32,
                    format!("cannot assign {init_type} to {data_type} in initializer of '{}'", v.name),
                );
            }
            let promoted = if matches!(init_state, InitState::Full | InitState::Constant) {
                if v.modifier == StateModifier::Const {
                    InitState::Constant
                } else {
                    InitState::Full
                }
            } else {
                InitState::Partial
            };
            if let Some(symbol) = self.scopes.symbol_mut(self.current, &v.name) {
                symbol.init_state = promoted;
            }
        }
    }

    fn analyze_array(&mut self, a: &ArrayDecl) {
        let at = self.pos(a.span);
        let element = DataType::from_type_expr(&a.element_type);
        if element == DataType::Void {
            self.report(
                crate::diagnostics::Severity::Error,
                codes::semantic::TYPE_MISMATCH,
                at,
                a.name.len() as u32,
                "array element type may not be `Void`",
            );
        }
        if a.dimensions.is_empty() {
            self.report(
                crate::diagnostics::Severity::Error,
                codes::semantic::INVALID_OPERATION,
                at,
                a.name.len() as u32,
                format!("array '{}' must carry at least one dimension", a.name),
            );
        }
        self.check_type_exists(&element, at);
        for dim in &a.dimensions {
            self.analyze_expr(dim);
        }
        if let Some(init) = &a.initializer {
            let (init_type, _) = self.analyze_expr(init);
            let capacity = typeck::eval_const_capacity(&a.dimensions);
            let array_type = DataType::Array(Box::new(element.clone()), capacity);
            if !array_type.compatible_with(&init_type) && init_type != DataType::Unknown {
                self.report(
                    crate::diagnostics::Severity::Error,
                    codes::semantic::TYPE_MISMATCH,
                    at,
                    a.name.len() as u32,
                    format!(
                        "cannot assign {init_type} to {array_type} in initializer of '{}'",
                        a.name
                    ),
                );
            } else if element == DataType::Char && init_type == DataType::String {
                // compatible_with only sees types, not the literal's length;
                // the dimension-size half of the rule is checked here against
                // the actual string when both sides are known constants.
                if let (Expr::StringLiteral(text, _), Some(cap)) = (init, capacity) {
                    let len = text.chars().count() as u64;
                    if len > cap {
                        self.report(
                            crate::diagnostics::Severity::Error,
                            codes::semantic::TYPE_MISMATCH,
                            at,
                            a.name.len() as u32,
                            format!(
                                "string literal of length {len} does not fit in Char array '{}' of dimension {cap}",
                                a.name
                            ),
                        );
                    }
                }
            }
        }
    }

    fn analyze_function(&mut self, f: &FunctionDecl) {
        let return_type = DataType::from_type_expr(&f.return_type);
        self.check_type_exists(&return_type, self.pos(f.span));
        let previous = self.current;
        let func_scope = self.scopes.push(previous, ScopeKind::Function);
        self.current = func_scope;
        self.current_function = Some((f.name.clone(), return_type.clone()));

        for param in &f.params {
            let param_at = self.pos(param.span);
            let param_type = DataType::from_type_expr(&param.type_expr);
            self.check_type_exists(&param_type, param_at);
            let symbol = Symbol {
                name: param.name.clone(),
                state_modifier: StateModifier::Var,
                data_type: param_type,
                full_type_info: param.type_expr.clone(),
                is_constant: false,
                is_mutable: true,
                init_state: InitState::Full,
                is_used: false,
                declared_scope: func_scope,
                declared_at: param_at,
                extra: SymbolExtra::Plain,
            };
            self.declare(func_scope, param.name.clone(), param_at, param.name.len() as u32, symbol);
        }

        self.analyze_block(&f.body, ScopeKind::Block);

        if return_type != DataType::Void && !control_flow::always_returns(&f.body) {
            self.report(
                crate::diagnostics::Severity::Warning,
                codes::semantic::MISSING_RETURN,
                self.pos(f.span),
                f.name.len() as u32,
                format!("function '{}' may fall off the end without returning", f.name),
            );
        }

        self.current_function = None;
        self.current = previous;
    }

    fn analyze_compound(&mut self, name: Text, members: &[ast::Member]) {
        let Some((_, symbol)) = self.scopes.resolve(self.scopes.root(), &name) else {
            return;
        };
        let Some(member_scope) = symbol.member_scope() else {
            return;
        };
        for member in members {
            if !self.scopes.contains_in_scope(member_scope, &member.name) {
                // collect_compound already reported this one (an invalid
                // modifier, or a redeclaration) and never inserted it.
                continue;
            }
            let at = self.pos(member.span);
            let data_type = DataType::from_type_expr(&member.type_expr);
            self.check_type_exists(&data_type, at);
        }
    }

    fn analyze_object(&mut self, o: &ObjectDecl) {
        let at = self.pos(o.span);
        match self.scopes.resolve(self.scopes.root(), &o.type_name) {
            Some((_, symbol)) if symbol.member_scope().is_some() => {}
            Some(_) => {
                self.report(
                    crate::diagnostics::Severity::Error,
                    codes::semantic::TYPE_NOT_FOUND,
                    at,
                    o.type_name.len() as u32,
                    format!("'{}' is not a struct/class/object type", o.type_name),
                );
            }
            None => {
                self.report(
                    crate::diagnostics::Severity::Error,
                    codes::semantic::TYPE_NOT_FOUND,
                    at,
                    o.type_name.len() as u32,
                    format!("unknown type '{}'", o.type_name),
                );
            }
        }
    }

    // ---- Statement analysis -------------------------------------------------

    fn analyze_block(&mut self, block: &Block, kind: ScopeKind) {
        let previous = self.current;
        let scope = self.scopes.push(previous, kind);
        self.current = scope;
        for stmt in &block.stmts {
            if self.fail_fast() {
                break;
            }
            self.analyze_stmt(stmt);
        }
        self.current = previous;
    }

    fn analyze_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Decl(decl) => self.analyze_local_decl(decl),
            Stmt::Expr(expr) => {
                self.analyze_expr(expr);
            }
            Stmt::Block(block) => self.analyze_block(block, ScopeKind::Block),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => {
                self.analyze_expr(condition);
                self.analyze_block(then_branch, ScopeKind::Block);
                if let Some(else_stmt) = else_branch {
                    self.analyze_stmt(else_stmt);
                }
            }
            Stmt::Loop {
                init,
                condition,
                step,
                body,
                ..
            } => {
                let previous = self.current;
                let loop_scope = self.scopes.push(previous, ScopeKind::Loop);
                self.current = loop_scope;
                if let Some(init) = init {
                    self.analyze_stmt(init);
                }
                if let Some(condition) = condition {
                    self.analyze_expr(condition);
                }
                if let Some(step) = step {
                    self.analyze_expr(step);
                }
                for s in &body.stmts {
                    self.analyze_stmt(s);
                }
                self.current = previous;
            }
            Stmt::Break(span) => {
                if !self.scopes.is_within_loop(self.current) {
                    self.report(
                        crate::diagnostics::Severity::Error,
                        codes::semantic::INVALID_OPERATION,
                        self.pos(span),
                        5,
                        "break statement not in loop",
                    );
                }
            }
            Stmt::Continue(span) => {
                if !self.scopes.is_within_loop(self.current) {
                    self.report(
                        crate::diagnostics::Severity::Error,
                        codes::semantic::INVALID_OPERATION,
                        self.pos(span),
                        8,
                        "continue statement not in loop",
                    );
                }
            }
            Stmt::Return(value, span) => {
                let Some((_, return_type)) = self.current_function.clone() else {
                    self.report(
                        crate::diagnostics::Severity::Error,
                        codes::semantic::INVALID_OPERATION,
                        self.pos(span),
                        6,
                        "return statement outside a function",
                    );
                    return;
                };
                match value {
                    Some(expr) => {
                        let (value_type, _) = self.analyze_expr(expr);
                        if return_type == DataType::Void {
                            self.report(
                                crate::diagnostics::Severity::Error,
                                codes::semantic::TYPE_MISMATCH,
                                self.pos(span),
                                6,
                                "cannot return a value from a `Void` function",
                            );
                        } else if !return_type.compatible_with(&value_type) {
                            self.report(
                                crate::diagnostics::Severity::Error,
                                codes::semantic::TYPE_MISMATCH,
                                self.pos(span),
                                6,
                                format!("cannot return {value_type} from a function declared to return {return_type}"),
                            );
                        }
                    }
                    None if return_type != DataType::Void => {
                        self.report(
                            crate::diagnostics::Severity::Error,
                            codes::semantic::TYPE_MISMATCH,
                            self.pos(span),
                            6,
                            format!("function must return a value of type {return_type}"),
                        );
                    }
                    None => {}
                }
            }
        }
    }

    fn analyze_local_decl(&mut self, decl: &Decl) {
        let scope = self.current;
        match decl {
            Decl::Variable(v) => {
                self.collect_variable(scope, v);
                self.analyze_variable(v);
            }
            Decl::Array(a) => {
                self.collect_array(scope, a);
                self.analyze_array(a);
            }
            // Nested function/struct/class/object declarations are not part
            // of this language's surface (spec §4.2's declaration table
            // covers only these two local forms); fall back to top-level
            // handling so nothing is silently skipped if the parser allows it.
            other => self.collect_top_level(other),
        }
    }

    // ---- Expression analysis -------------------------------------------------

    fn analyze_expr(&mut self, expr: &Expr) -> (DataType, InitState) {
        match expr {
            Expr::IntLiteral(..) => (DataType::Int, InitState::Full),
            Expr::RealLiteral(..) => (DataType::Real, InitState::Full),
            Expr::BoolLiteral(..) => (DataType::Bool, InitState::Full),
            Expr::CharLiteral(..) => (DataType::Char, InitState::Full),
            Expr::StringLiteral(..) => (DataType::String, InitState::Full),
            Expr::NoneLiteral(..) => (DataType::None, InitState::Full),
            Expr::Identifier(name, span) => self.analyze_identifier(name, self.pos(span)),
            Expr::Unary { op, operand, span } => self.analyze_unary(*op, operand, self.pos(span)),
            Expr::Binary { op, lhs, rhs, span } => self.analyze_binary(*op, lhs, rhs, self.pos(span)),
            Expr::Assign { target, value, span } => self.analyze_assign(target, value, self.pos(span)),
            Expr::FieldAccess { base, field, span } => self.analyze_field_access(base, field, self.pos(span)),
            Expr::ScopeAccess { base, member, span } => self.analyze_scope_access(base, member, self.pos(span)),
            Expr::Call { callee, args, span } => self.analyze_call(callee, args, self.pos(span)),
            Expr::Index { base, index, span } => self.analyze_index(base, index, self.pos(span)),
            Expr::Group(inner, _) => self.analyze_expr(inner),
        }
    }

    fn analyze_identifier(&mut self, name: &Text, at: Position) -> (DataType, InitState) {
        let Some((_, symbol)) = self.scopes.resolve(self.current, name) else {
            self.report(
                crate::diagnostics::Severity::Error,
                codes::semantic::UNDECLARED_SYMBOL,
                at,
                name.len() as u32,
                format!("use of undeclared identifier '{name}'"),
            );
            return (DataType::Unknown, InitState::Uninitialized);
        };
        let data_type = symbol.data_type.clone();
        let init_state = symbol.init_state;
        if init_state.is_uninitialized() {
            self.report(
                crate::diagnostics::Severity::Warning,
                codes::semantic::UNINITIALIZED_USE,
                at,
                name.len() as u32,
                format!("'{name}' is used before being initialized"),
            );
        }
        self.scopes.mark_used(self.current, name);
        (data_type, init_state)
    }

    fn analyze_unary(&mut self, op: ast::UnaryOp, operand: &Expr, at: Position) -> (DataType, InitState) {
        let (data_type, state) = self.analyze_expr(operand);
        let ok = match op {
            ast::UnaryOp::Plus | ast::UnaryOp::Minus => data_type.is_numeric(),
            ast::UnaryOp::Not => data_type == DataType::Bool,
            ast::UnaryOp::BitNot => data_type == DataType::Int,
        };
        if !ok && data_type != DataType::Unknown {
            self.report(
                crate::diagnostics::Severity::Error,
                codes::semantic::INVALID_OPERATION,
                at,
                1,
                format!("operator cannot be applied to {data_type}"),
            );
        }
        (data_type, state)
    }

    fn analyze_binary(&mut self, op: ast::BinaryOp, lhs: &Expr, rhs: &Expr, at: Position) -> (DataType, InitState) {
        let (lhs_type, lhs_state) = self.analyze_expr(lhs);
        let (rhs_type, rhs_state) = self.analyze_expr(rhs);
        let state = lhs_state.weakest(rhs_state);
        let unknown = lhs_type == DataType::Unknown || rhs_type == DataType::Unknown;

        if op.is_arithmetic() {
            if lhs_type == DataType::String && rhs_type == DataType::String && op == ast::BinaryOp::Add {
                return (DataType::String, state);
            }
            if !lhs_type.is_numeric() || !rhs_type.is_numeric() {
                if !unknown {
                    self.report(
                        crate::diagnostics::Severity::Error,
                        codes::semantic::TYPE_MISMATCH,
                        at,
                        1,
                        format!("operator '{}' requires numeric operands, found {lhs_type} and {rhs_type}", op.as_str()),
                    );
                }
                return (DataType::Unknown, state);
            }
            return (lhs_type.numeric_result(&rhs_type), state);
        }
        if op.is_comparison() {
            if !lhs_type.compatible_with(&rhs_type) && !unknown {
                self.report(
                    crate::diagnostics::Severity::Error,
                    codes::semantic::TYPE_MISMATCH,
                    at,
                    1,
                    format!("cannot compare {lhs_type} with {rhs_type}"),
                );
            }
            return (DataType::Bool, state);
        }
        if op.is_logical() {
            if (lhs_type != DataType::Bool || rhs_type != DataType::Bool) && !unknown {
                self.report(
                    crate::diagnostics::Severity::Error,
                    codes::semantic::TYPE_MISMATCH,
                    at,
                    2,
                    format!("operator '{}' requires `Bool` operands, found {lhs_type} and {rhs_type}", op.as_str()),
                );
            }
            return (DataType::Bool, state);
        }
        debug_assert!(op.is_bitwise());
        if (lhs_type != DataType::Int || rhs_type != DataType::Int) && !unknown {
            self.report(
                crate::diagnostics::Severity::Error,
                codes::semantic::TYPE_MISMATCH,
                at,
                1,
                format!("operator '{}' requires `Int` operands, found {lhs_type} and {rhs_type}", op.as_str()),
            );
        }
        (DataType::Int, state)
    }

    fn analyze_assign(&mut self, target: &Expr, value: &Expr, at: Position) -> (DataType, InitState) {
        let Expr::Identifier(name, _) = target else {
            self.report(
                crate::diagnostics::Severity::Error,
                codes::semantic::INVALID_OPERATION,
                at,
                1,
                "assignment target must be an identifier",
            );
            return (DataType::Unknown, InitState::Uninitialized);
        };
        let (value_type, value_state) = self.analyze_expr(value);

        let Some((owner, symbol)) = self.scopes.resolve(self.current, name) else {
            self.report(
                crate::diagnostics::Severity::Error,
                codes::semantic::UNDECLARED_SYMBOL,
                at,
                name.len() as u32,
                format!("use of undeclared identifier '{name}'"),
            );
            return (DataType::Unknown, InitState::Uninitialized);
        };
        let target_type = symbol.data_type.clone();
        if symbol.is_constant {
            self.report(
                crate::diagnostics::Severity::Error,
                codes::semantic::ASSIGN_TO_CONST,
                at,
                name.len() as u32,
                format!("cannot assign to `const` binding '{name}'"),
            );
        } else if !symbol.is_mutable {
            self.report(
                crate::diagnostics::Severity::Error,
                codes::semantic::ASSIGN_TO_IMMUTABLE,
                at,
                name.len() as u32,
                format!("cannot assign to immutable binding '{name}'"),
            );
        }
        if !target_type.compatible_with(&value_type) && value_type != DataType::Unknown {
            self.report(
                crate::diagnostics::Severity::Error,
                codes::semantic::TYPE_MISMATCH,
                at,
                name.len() as u32,
                format!("cannot assign {value_type} to {target_type}"),
            );
        }
        let promoted = if matches!(value_state, InitState::Full | InitState::Constant) {
            InitState::Full
        } else {
            InitState::Partial
        };
        if let Some(symbol) = self.scopes.symbol_mut(owner, name) {
            symbol.init_state = promoted;
        }
        (target_type, promoted)
    }

    fn analyze_field_access(&mut self, base: &Expr, field: &Text, at: Position) -> (DataType, InitState) {
        let Expr::Identifier(base_name, base_span) = base else {
            self.report(
                crate::diagnostics::Severity::Error,
                codes::semantic::INVALID_FIELD_ACCESS,
                at,
                field.len() as u32,
                "`->` may only be used on an identifier naming an `obj` variable",
            );
            return (DataType::Unknown, InitState::Uninitialized);
        };
        let (base_type, _) = self.analyze_identifier(base_name, self.pos(base_span));
        let DataType::Compound(type_name) = &base_type else {
            if base_type != DataType::Unknown {
                self.report(
                    crate::diagnostics::Severity::Error,
                    codes::semantic::INVALID_FIELD_ACCESS,
                    at,
                    field.len() as u32,
                    format!("'{base_name}' is not a struct/class-typed `obj` variable"),
                );
            }
            return (DataType::Unknown, InitState::Uninitialized);
        };
        let Some((_, struct_symbol)) = self.scopes.resolve(self.scopes.root(), type_name) else {
            return (DataType::Unknown, InitState::Uninitialized);
        };
        let Some(member_scope) = struct_symbol.member_scope() else {
            return (DataType::Unknown, InitState::Uninitialized);
        };
        if !self.scopes.contains_in_scope(member_scope, field) {
            self.report(
                crate::diagnostics::Severity::Error,
                codes::semantic::INVALID_FIELD_ACCESS,
                at,
                field.len() as u32,
                format!("'{type_name}' has no member '{field}'"),
            );
            return (DataType::Unknown, InitState::Uninitialized);
        }
        let (_, member) = self.scopes.resolve(member_scope, field).unwrap();
        (member.data_type.clone(), member.init_state)
    }

    fn analyze_scope_access(&mut self, base: &Text, member: &Text, at: Position) -> (DataType, InitState) {
        let Some((_, class_symbol)) = self.scopes.resolve(self.scopes.root(), base) else {
            self.report(
                crate::diagnostics::Severity::Error,
                codes::semantic::TYPE_NOT_FOUND,
                at,
                base.len() as u32,
                format!("unknown class '{base}'"),
            );
            return (DataType::Unknown, InitState::Uninitialized);
        };
        if class_symbol.state_modifier != StateModifier::Class {
            self.report(
                crate::diagnostics::Severity::Error,
                codes::semantic::INVALID_FIELD_ACCESS,
                at,
                base.len() as u32,
                format!("'{base}' is not a class"),
            );
            return (DataType::Unknown, InitState::Uninitialized);
        }
        let Some(member_scope) = class_symbol.member_scope() else {
            return (DataType::Unknown, InitState::Uninitialized);
        };
        if !self.scopes.contains_in_scope(member_scope, member) {
            self.report(
                crate::diagnostics::Severity::Error,
                codes::semantic::INVALID_FIELD_ACCESS,
                at,
                member.len() as u32,
                format!("'{base}' has no member '{member}'"),
            );
            return (DataType::Unknown, InitState::Uninitialized);
        }
        let (_, resolved) = self.scopes.resolve(member_scope, member).unwrap();
        (resolved.data_type.clone(), resolved.init_state)
    }

    fn analyze_call(&mut self, callee: &Expr, args: &[Expr], at: Position) -> (DataType, InitState) {
        let arg_types: Vec<_> = args.iter().map(|a| self.analyze_expr(a)).collect();
        let Expr::Identifier(name, _) = callee else {
            self.report(
                crate::diagnostics::Severity::Error,
                codes::semantic::INVALID_OPERATION,
                at,
                1,
                "call target must name a function",
            );
            return (DataType::Unknown, InitState::Uninitialized);
        };
        let Some((_, symbol)) = self.scopes.resolve(self.scopes.root(), name) else {
            self.report(
                crate::diagnostics::Severity::Error,
                codes::semantic::UNDECLARED_SYMBOL,
                at,
                name.len() as u32,
                format!("call to undeclared function '{name}'"),
            );
            return (DataType::Unknown, InitState::Uninitialized);
        };
        let Some(signature) = symbol.function_signature().cloned() else {
            self.report(
                crate::diagnostics::Severity::Error,
                codes::semantic::INVALID_OPERATION,
                at,
                name.len() as u32,
                format!("'{name}' is not callable"),
            );
            return (DataType::Unknown, InitState::Uninitialized);
        };
        let min_args = signature.parameter_count();
        if args.len() < min_args || (!signature.variadic && args.len() > min_args) {
            self.report(
                crate::diagnostics::Severity::Error,
                codes::semantic::TYPE_MISMATCH,
                at,
                name.len() as u32,
                format!(
                    "'{name}' expects {min_args} argument(s), found {}",
                    args.len()
                ),
            );
        } else {
            for (param, (arg_type, _)) in signature.parameters.iter().zip(arg_types.iter()) {
                if !param.data_type.compatible_with(arg_type) && *arg_type != DataType::Unknown {
                    self.report(
                        crate::diagnostics::Severity::Error,
                        codes::semantic::TYPE_MISMATCH,
                        at,
                        name.len() as u32,
                        format!(
                            "argument '{}' expects {}, found {arg_type}",
                            param.name, param.data_type
                        ),
                    );
                }
            }
        }
        (signature.return_type.clone(), InitState::Full)
    }

    fn analyze_index(&mut self, base: &Expr, index: &Expr, at: Position) -> (DataType, InitState) {
        let (base_type, base_state) = self.analyze_expr(base);
        self.analyze_expr(index);
        match base_type {
            DataType::Array(element, _) => (*element, base_state),
            DataType::Unknown => (DataType::Unknown, base_state),
            other => {
                self.report(
                    crate::diagnostics::Severity::Error,
                    codes::semantic::INVALID_OPERATION,
                    at,
                    1,
                    format!("cannot index into {other}"),
                );
                (DataType::Unknown, base_state)
            }
        }
    }
}
