//! The conditional-compilation stack (spec §3, §4.1).
//!
//! Grounded on the `If` stack in
//! `other_examples/21e99714_abyteintime-stitchkit__muscript-parsing-src-lexis-preprocessor.rs.rs`,
//! adapted to the frame shape spec.md names explicitly.

use crate::diagnostics::{codes, Context as DiagContext, DiagnosticsRegistry};
use px_syntax::Position;

/// Maximum nesting depth (spec §3: "the conditional stack's frame count
/// never exceeds 64").
pub const MAX_DEPTH: usize = 64;

/// One `#if`/`#ifdef`/`#ifndef` ... `#endif` group's state.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    /// Whether the *enclosing* frame was already skipping output.
    pub parent_skip: bool,
    /// Whether this frame's current branch is suppressed.
    pub skip: bool,
    /// Whether any branch in this group has emitted output yet.
    pub taken: bool,
    /// Whether `#else` has already been seen in this group.
    pub else_seen: bool,
}

#[derive(Debug, Default)]
pub struct ConditionalStack {
    frames: Vec<Frame>,
}

impl ConditionalStack {
    pub fn new() -> Self {
        ConditionalStack { frames: Vec::new() }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Render the current frame stack, innermost last, for the "state"
    /// debug stage. Empty once the translation unit's conditionals balance.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for (i, frame) in self.frames.iter().enumerate() {
            out.push_str(&format!(
                "#{i}: skip={} taken={} else_seen={} parent_skip={}\n",
                frame.skip, frame.taken, frame.else_seen, frame.parent_skip
            ));
        }
        out
    }

    /// Gate used before every byte of emission (spec §3's `should_output`):
    /// output happens only when no frame on the stack is currently
    /// suppressing.
    pub fn should_output(&self) -> bool {
        self.frames.iter().all(|f| !f.skip)
    }

    fn parent_is_skipping(&self) -> bool {
        self.frames.last().map(|f| f.skip).unwrap_or(false)
    }

    /// Push a new frame for `#if`/`#ifdef`/`#ifndef`, with `condition` the
    /// already-evaluated truth value of the guard expression.
    pub fn push(
        &mut self,
        condition: bool,
        position: Position,
        diagnostics: &mut DiagnosticsRegistry,
    ) {
        let parent_skip = self.parent_is_skipping();
        if self.frames.len() >= MAX_DEPTH {
            diagnostics.error(
                DiagContext::Preprocessor,
                codes::preprocessor::UNTERMINATED_CONDITIONAL,
                position,
                1,
                format!("conditional nesting exceeds the maximum depth of {MAX_DEPTH}"),
            );
            // Still push so `#endif` bookkeeping stays balanced; the frame
            // is force-skipped so nothing past the limit is emitted.
            self.frames.push(Frame {
                parent_skip,
                skip: true,
                taken: true,
                else_seen: false,
            });
            return;
        }
        self.frames.push(Frame {
            parent_skip,
            skip: parent_skip || !condition,
            taken: !parent_skip && condition,
            else_seen: false,
        });
    }

    /// `#elif expr`: only legal with an open frame whose group hasn't seen
    /// `#else` yet.
    pub fn elif(
        &mut self,
        condition: bool,
        position: Position,
        diagnostics: &mut DiagnosticsRegistry,
    ) {
        let Some(frame) = self.frames.last_mut() else {
            diagnostics.error(
                DiagContext::Preprocessor,
                codes::preprocessor::MISPLACED_ELSE_OR_ELIF,
                position,
                5,
                "#elif with no matching #if",
            );
            return;
        };
        if frame.else_seen {
            diagnostics.error(
                DiagContext::Preprocessor,
                codes::preprocessor::MISPLACED_ELSE_OR_ELIF,
                position,
                5,
                "#elif after #else in the same conditional group",
            );
            return;
        }
        if frame.parent_skip {
            frame.skip = true;
            return;
        }
        if frame.taken {
            frame.skip = true;
        } else {
            frame.skip = !condition;
            frame.taken = !frame.skip;
        }
    }

    /// `#else`: inverts `skip` based on whether any prior branch in the
    /// group already ran.
    pub fn else_branch(&mut self, position: Position, diagnostics: &mut DiagnosticsRegistry) {
        let Some(frame) = self.frames.last_mut() else {
            diagnostics.error(
                DiagContext::Preprocessor,
                codes::preprocessor::MISPLACED_ELSE_OR_ELIF,
                position,
                5,
                "#else with no matching #if",
            );
            return;
        };
        if frame.else_seen {
            diagnostics.error(
                DiagContext::Preprocessor,
                codes::preprocessor::MISPLACED_ELSE_OR_ELIF,
                position,
                5,
                "multiple #else in the same conditional group",
            );
            return;
        }
        frame.else_seen = true;
        frame.skip = frame.parent_skip || frame.taken;
        if !frame.skip {
            frame.taken = true;
        }
    }

    /// `#endif`: pop the current frame. An empty stack is an error but
    /// leaves the (already-empty) stack untouched.
    pub fn pop(&mut self, position: Position, diagnostics: &mut DiagnosticsRegistry) {
        if self.frames.pop().is_none() {
            diagnostics.error(
                DiagContext::Preprocessor,
                codes::preprocessor::MISPLACED_ELSE_OR_ELIF,
                position,
                6,
                "#endif with no matching #if",
            );
        }
    }

    /// Called once preprocessing of a translation unit finishes; any frame
    /// still open means an unterminated conditional.
    pub fn check_balanced(&self, position: Position, diagnostics: &mut DiagnosticsRegistry) {
        if !self.frames.is_empty() {
            diagnostics.error(
                DiagContext::Preprocessor,
                codes::preprocessor::UNTERMINATED_CONDITIONAL,
                position,
                1,
                format!("{} unterminated #if block(s) at end of file", self.frames.len()),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos() -> Position {
        Position::new(1, 1)
    }

    #[test]
    fn nested_false_branch_stays_suppressed() {
        let mut stack = ConditionalStack::new();
        let mut diags = DiagnosticsRegistry::new();
        stack.push(false, pos(), &mut diags); // #ifdef UNDEF
        assert!(!stack.should_output());
        stack.push(true, pos(), &mut diags); // #ifdef ALSO_UNDEF evaluated true, but parent skips
        assert!(!stack.should_output());
        stack.pop(pos(), &mut diags);
        stack.pop(pos(), &mut diags);
        assert!(stack.is_empty());
        assert_eq!(diags.error_count(), 0);
    }

    #[test]
    fn else_after_taken_branch_is_suppressed() {
        let mut stack = ConditionalStack::new();
        let mut diags = DiagnosticsRegistry::new();
        stack.push(true, pos(), &mut diags);
        assert!(stack.should_output());
        stack.else_branch(pos(), &mut diags);
        assert!(!stack.should_output());
        stack.pop(pos(), &mut diags);
        assert_eq!(diags.error_count(), 0);
    }

    #[test]
    fn endif_without_if_is_an_error() {
        let mut stack = ConditionalStack::new();
        let mut diags = DiagnosticsRegistry::new();
        stack.pop(pos(), &mut diags);
        assert_eq!(diags.error_count(), 1);
    }
}
