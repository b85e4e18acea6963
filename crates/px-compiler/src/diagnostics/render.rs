//! Caret-style rendering of a single [`Diagnostic`](super::Diagnostic), per
//! spec §4.3/§8's exact output layout:
//!
//! ```text
//! <ms>ms\t<LEVEL>[<CODE>]: <context>: <message>
//!     <line>:<col>\t|\t<source line>
//!             \t|\t<spaces><carets>
//! ```
//!
//! The source/caret lines are only emitted when the diagnostic carries a
//! real line number (`position.line > 0`).

use std::fmt::Write as _;

use super::Diagnostic;

/// Width a tab expands to: the cursor advances to the next multiple of 8.
const TAB_STOP: usize = 8;

/// Visual column (1-based) that `raw_column` lands on once every tab in
/// `line` before it has been expanded to the next multiple of [`TAB_STOP`].
fn visual_column(line: &str, raw_column: u32) -> usize {
    let mut visual = 0usize;
    for (i, ch) in line.chars().enumerate() {
        if (i as u32) + 1 >= raw_column {
            break;
        }
        if ch == '\t' {
            visual = (visual / TAB_STOP + 1) * TAB_STOP;
        } else {
            visual += 1;
        }
    }
    visual + 1
}

pub fn render_entry(entry: &Diagnostic, lines: &[&str]) -> String {
    let mut out = String::new();
    writeln!(
        out,
        "{}ms\t{}[{}]: {}: {}",
        entry.timestamp_ms,
        entry.severity,
        entry.code.render(),
        entry.context,
        entry.message
    )
    .expect("writing to a String never fails");

    if entry.position.line == 0 {
        return out;
    }

    let source_line = lines
        .get((entry.position.line - 1) as usize)
        .copied()
        .unwrap_or("");

    writeln!(
        out,
        "\t{}:{}\t|\t{}",
        entry.position.line, entry.position.column, source_line
    )
    .expect("writing to a String never fails");

    let column = visual_column(source_line, entry.position.column);
    let remaining = source_line.chars().count().saturating_sub(column - 1);
    let underline_len = (entry.underline_length as usize).min(remaining);
    let pad = " ".repeat(column - 1);
    let carets = "~".repeat(underline_len);
    writeln!(out, "\t\t\t|\t{pad}{carets}").expect("writing to a String never fails");

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{codes, Context, Severity};
    use px_syntax::Position;

    fn entry(line: u32, column: u32, underline_length: u32) -> Diagnostic {
        Diagnostic {
            severity: Severity::Error,
            context: Context::Semantic,
            code: codes::semantic::UNDECLARED_SYMBOL,
            message: "undeclared symbol `x`".to_string(),
            position: Position::new(line, column),
            underline_length,
            timestamp_ms: 0,
        }
    }

    #[test]
    fn renders_three_lines_when_positioned() {
        let rendered = render_entry(&entry(2, 5, 1), &["let a = 1;", "foo(x);"]);
        assert_eq!(rendered.lines().count(), 3);
        assert!(rendered.contains("2:5"));
        assert!(rendered.contains("foo(x);"));
    }

    #[test]
    fn renders_one_line_without_position() {
        let mut e = entry(0, 0, 0);
        e.position = Position::new(0, 0);
        let rendered = render_entry(&e, &[]);
        assert_eq!(rendered.lines().count(), 1);
    }

    #[test]
    fn expands_tabs_before_underlining() {
        // "\tfoo" -> 'f' visually starts at column 9 (next multiple of 8 + 1).
        let rendered = render_entry(&entry(1, 2, 3), &["\tfoo"]);
        let caret_line = rendered.lines().nth(2).unwrap();
        let spaces = caret_line.chars().take_while(|c| *c == ' ').count();
        assert_eq!(spaces, 8);
    }

    #[test]
    fn clamps_underline_to_remaining_width() {
        // Column 4 on a 3-character line is already past the end: no room
        // for any caret.
        let rendered = render_entry(&entry(1, 4, 100), &["abc"]);
        let caret_line = rendered.lines().nth(2).unwrap();
        assert_eq!(caret_line.matches('~').count(), 0);
    }
}
