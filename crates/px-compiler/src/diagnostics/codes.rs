//! Stable error codes (spec §4.3, §6).
//!
//! Generated-file convention: this is hand-maintained here because nothing in
//! this workspace runs a build step, but it follows the exact shape
//! `px-xtask`'s `error-codes` command would produce from `error-codes.yaml`
//! (grounded on the teacher's `crates/xtask/src/error_codes.rs`). Keep the two
//! in sync by hand; `px-xtask` documents the intended regeneration command.

use crate::diagnostics::Severity;

/// A stable, closed-set error/warning identifier.
///
/// spec.md calls the rendered form an "8-character base-32 string" but then
/// gives the alphabet `0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ`, which has 36
/// symbols, not 32. We follow the alphabet literally (it is the externally
/// promised contract in spec §6) and keep calling it "base-32" only because
/// that's the name spec.md uses for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode {
    pub id: u64,
    pub name: &'static str,
    pub default_severity: Severity,
    pub description: &'static str,
}

const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

impl ErrorCode {
    /// Render this code's stable identifier as the spec's 8-character
    /// string. Deterministic and total: every `id` maps to exactly one
    /// 8-character string (values beyond `36^8` wrap, but the taxonomy here
    /// is a small closed set, far below that range).
    pub fn render(&self) -> String {
        let mut buf = [b'0'; 8];
        let mut value = self.id;
        for slot in buf.iter_mut().rev() {
            let digit = (value % 36) as usize;
            *slot = ALPHABET[digit];
            value /= 36;
        }
        String::from_utf8(buf.to_vec()).expect("alphabet is ASCII")
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

macro_rules! error_codes {
    ($($name:ident = $id:expr, $severity:ident, $description:expr;)+) => {
        $(
            #[doc = $description]
            pub const $name: ErrorCode = ErrorCode {
                id: $id,
                name: stringify!($name),
                default_severity: Severity::$severity,
                description: $description,
            };
        )+

        /// All error codes in this namespace, for documentation/listing use.
        pub const ALL: &[ErrorCode] = &[$($name,)+];
    };
}

/// Preprocessor error taxonomy (spec §4.1).
pub mod preprocessor {
    use super::*;

    error_codes! {
        UNKNOWN_DIRECTIVE = 1, Warning, "an unrecognized `#` directive was found";
        DIRECTIVE_TOO_LONG = 2, Error, "a directive exceeded the 256-byte directive buffer";
        MISSING_CLOSING_QUOTE = 3, Error, "a string or char literal was never closed";
        FILE_NOT_FOUND = 4, Error, "an `#import`/`#using` target could not be opened";
        IO_READ = 5, Error, "reading an included file failed";
        OUT_OF_MEMORY = 6, Fatal, "a preprocessor buffer could not be grown";
        MISPLACED_ELSE_OR_ELIF = 7, Error, "`#else`/`#elif` with no matching `#if`, or repeated after `#else`";
        UNTERMINATED_CONDITIONAL = 8, Error, "an `#if`/`#ifdef`/`#ifndef` was never closed with `#endif`";
    }
}

/// Semantic analyzer error taxonomy (spec §4.2).
pub mod semantic {
    use super::*;

    error_codes! {
        REDECLARATION = 100, Error, "a symbol was declared twice in the same scope";
        UNDECLARED_SYMBOL = 101, Error, "an identifier has no matching declaration";
        TYPE_MISMATCH = 102, Error, "an operation's operand types are incompatible";
        TYPE_NOT_FOUND = 103, Error, "a named type has no matching declaration";
        ASSIGN_TO_CONST = 104, Error, "assignment to a `const` binding";
        ASSIGN_TO_IMMUTABLE = 105, Error, "assignment to an immutable `let` binding";
        UNINITIALIZED_USE = 106, Warning, "a variable was read before being assigned";
        MISSING_RETURN = 107, Warning, "a function body may fall off the end without returning";
        INVALID_OPERATION = 108, Error, "an operation is not valid in its current context";
        INVALID_FIELD_ACCESS = 109, Error, "`->`/`::` used against something other than a known member";
        INVALID_COMPOUND_MEMBER = 110, Error, "a struct/class member is not `var`/`obj`, or is unknown";
    }
}
