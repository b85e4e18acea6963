//! Type compatibility and operator typing rules (spec §4.2).

use px_syntax::ast::{BinaryOp, Expr, TypeExpr, UnaryOp};
use px_syntax::Text;

/// Best-effort constant-fold of an array dimension expression to its size.
/// The Char-array/String compatibility rule needs a concrete capacity to
/// compare a string literal's length against; returns `None` when the
/// expression isn't one this folds (a variable, a call, …), in which case
/// callers treat the array's capacity as unknown and skip the length check
/// rather than block on it.
pub fn eval_const_dimension(expr: &Expr) -> Option<u64> {
    match expr {
        Expr::IntLiteral(n, _) => u64::try_from(*n).ok(),
        Expr::Group(inner, _) => eval_const_dimension(inner),
        Expr::Unary { op: UnaryOp::Plus, operand, .. } => eval_const_dimension(operand),
        Expr::Binary { op, lhs, rhs, .. } => {
            let l = eval_const_dimension(lhs)?;
            let r = eval_const_dimension(rhs)?;
            match op {
                BinaryOp::Add => l.checked_add(r),
                BinaryOp::Sub => l.checked_sub(r),
                BinaryOp::Mul => l.checked_mul(r),
                BinaryOp::Div if r != 0 => Some(l / r),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Folds every dimension of an array declaration into a single element
/// count (their product), or `None` if any dimension isn't constant.
pub fn eval_const_capacity(dimensions: &[Expr]) -> Option<u64> {
    dimensions
        .iter()
        .try_fold(1u64, |acc, dim| eval_const_dimension(dim).and_then(|n| acc.checked_mul(n)))
}

/// The analyzer's resolved view of a type, derived from a [`TypeExpr`].
///
/// spec §3 describes the AST's type descriptor as "consumed, not
/// constructed" by this component; `DataType` is what the analyzer reduces
/// that descriptor to for compatibility checks, keeping the syntactic
/// `TypeExpr` (pointer level, array dimensions, …) around separately as
/// `full_type_info` on [`crate::semantic::symbol::Symbol`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub enum DataType {
    Void,
    Int,
    Real,
    Bool,
    Char,
    String,
    /// The `none` literal's type — only compatible with pointers/references.
    None,
    Pointer(Box<DataType>),
    Reference(Box<DataType>),
    /// `None` capacity means the declaration's dimensions weren't constant
    /// foldable; the Char-array/String length rule is skipped, not failed,
    /// in that case.
    Array(Box<DataType>, Option<u64>),
    /// A user-declared struct/class/object type, identified by name.
    /// spec §9 Open Questions flags that this compatibility check is
    /// nominal-free by design in the current core (see
    /// [`DataType::compatible_with`]).
    Compound(Text),
    /// A type name that does not resolve to any known builtin or
    /// declaration (TYPE_NOT_FOUND was already reported; this lets
    /// analysis continue best-effort).
    Unknown,
}

impl DataType {
    pub fn from_type_expr(expr: &TypeExpr) -> DataType {
        let mut base = match expr.name.as_ref() {
            "Void" => DataType::Void,
            "Int" => DataType::Int,
            "Real" => DataType::Real,
            "Bool" => DataType::Bool,
            "Char" => DataType::Char,
            "String" => DataType::String,
            "None" => DataType::None,
            other => DataType::Compound(other.into()),
        };
        for _ in 0..expr.pointer_level {
            base = DataType::Pointer(Box::new(base));
        }
        if expr.is_reference {
            base = DataType::Reference(Box::new(base));
        }
        if expr.is_array {
            let capacity = eval_const_capacity(&expr.array_dimensions);
            base = DataType::Array(Box::new(base), capacity);
        }
        base
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Int | DataType::Real)
    }

    pub fn is_compound(&self) -> bool {
        matches!(self, DataType::Compound(_))
    }

    /// Assignment/binary-operand compatibility (spec §4.2).
    pub fn compatible_with(&self, other: &DataType) -> bool {
        use DataType::*;
        if self == other {
            return true;
        }
        match (self, other) {
            (Int, Real) | (Real, Int) => true,
            (None, Pointer(_)) | (Pointer(_), None) => true,
            (None, Reference(_)) | (Reference(_), None) => true,
            (Pointer(_), Pointer(_)) => true,
            (Reference(_), Reference(_)) => true,
            (Compound(_), Compound(_)) => true,
            // Length itself is checked separately, against the literal
            // being assigned, since it isn't part of either `DataType`.
            (Array(elem, _), String) | (String, Array(elem, _)) if **elem == Char => true,
            // A type that failed to resolve doesn't cascade further
            // diagnostics once TYPE_NOT_FOUND has already fired for it.
            (Unknown, _) | (_, Unknown) => true,
            _ => false,
        }
    }

    /// Numeric-promotion result type for arithmetic operators: `Real`
    /// unless both operands are `Int` (spec §4.2).
    pub fn numeric_result(&self, other: &DataType) -> DataType {
        if *self == DataType::Int && *other == DataType::Int {
            DataType::Int
        } else {
            DataType::Real
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataType::Void => write!(f, "Void"),
            DataType::Int => write!(f, "Int"),
            DataType::Real => write!(f, "Real"),
            DataType::Bool => write!(f, "Bool"),
            DataType::Char => write!(f, "Char"),
            DataType::String => write!(f, "String"),
            DataType::None => write!(f, "None"),
            DataType::Pointer(inner) => write!(f, "{inner}*"),
            DataType::Reference(inner) => write!(f, "{inner}&"),
            DataType::Array(inner, _) => write!(f, "{inner}[]"),
            DataType::Compound(name) => write!(f, "{name}"),
            DataType::Unknown => write!(f, "<unknown>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_and_real_are_compatible() {
        assert!(DataType::Int.compatible_with(&DataType::Real));
        assert!(DataType::Real.compatible_with(&DataType::Int));
    }

    #[test]
    fn none_is_only_compatible_with_pointer_or_reference() {
        let ptr = DataType::Pointer(Box::new(DataType::Int));
        assert!(DataType::None.compatible_with(&ptr));
        assert!(!DataType::None.compatible_with(&DataType::Int));
    }

    #[test]
    fn two_compounds_are_compatible_regardless_of_name() {
        let a = DataType::Compound("Foo".into());
        let b = DataType::Compound("Bar".into());
        assert!(a.compatible_with(&b));
    }

    #[test]
    fn char_array_accepts_string_at_the_type_level() {
        let arr = DataType::Array(Box::new(DataType::Char), Some(8));
        assert!(arr.compatible_with(&DataType::String));
        assert!(DataType::String.compatible_with(&arr));
    }

    #[test]
    fn int_array_is_not_compatible_with_string() {
        let arr = DataType::Array(Box::new(DataType::Int), Some(8));
        assert!(!arr.compatible_with(&DataType::String));
    }

    #[test]
    fn eval_const_dimension_folds_literals_and_arithmetic() {
        use px_syntax::ast::Expr;
        use px_syntax::Span;

        let ten = Expr::IntLiteral(10, Span::new(0, 0));
        assert_eq!(eval_const_dimension(&ten), Some(10));

        let product = Expr::Binary {
            op: BinaryOp::Mul,
            lhs: Box::new(Expr::IntLiteral(4, Span::new(0, 0))),
            rhs: Box::new(Expr::IntLiteral(5, Span::new(0, 0))),
            span: Span::new(0, 0),
        };
        assert_eq!(eval_const_dimension(&product), Some(20));
    }

    #[test]
    fn eval_const_dimension_gives_up_on_identifiers() {
        use px_syntax::ast::Expr;
        use px_syntax::Span;

        let name = Expr::Identifier("n".into(), Span::new(0, 0));
        assert_eq!(eval_const_dimension(&name), None);
    }

    #[test]
    fn numeric_result_is_real_unless_both_int() {
        assert_eq!(DataType::Int.numeric_result(&DataType::Int), DataType::Int);
        assert_eq!(
            DataType::Int.numeric_result(&DataType::Real),
            DataType::Real
        );
    }
}
