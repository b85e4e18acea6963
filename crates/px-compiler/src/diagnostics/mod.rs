//! The Diagnostics Engine (spec §4.3): a growable store of warnings, errors
//! and fatals with stable codes and caret-style rendering.
//!
//! Grounded on the teacher's `codespan_reporting::diagnostic::{Diagnostic,
//! Severity}` usage in `crates/mcc/src/diagnostics.rs`, but the actual entry
//! type and renderer here are bespoke rather than `codespan_reporting::term`
//! output: spec §4.3 and §8 pin down an exact line/column/caret layout that
//! doesn't match codespan's own renderer. `codespan_reporting` is still used
//! for source storage (see [`crate::files`]).

pub mod codes;
mod render;

use std::time::Instant;

use px_syntax::Position;

pub use codes::ErrorCode;
pub use render::render_entry;

/// Severity of a reported diagnostic. Ordered so that `Fatal > Error >
/// Warning`, matching the teacher's use of `codespan_reporting::Severity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warning,
    Error,
    Fatal,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which collaborator raised a diagnostic (spec §4.3's `context_tag`).
///
/// spec.md caps the tag at "≤7 bytes" but then lists `"semantic"` (8 bytes)
/// as one of the example tags, and spec §8's worked scenarios print
/// `context semantic` verbatim. We follow the worked examples, which are the
/// operational contract, over the byte-count aside; see DESIGN.md.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    File,
    Preprocessor,
    Semantic,
}

impl Context {
    pub fn as_str(self) -> &'static str {
        match self {
            Context::File => "file",
            Context::Preprocessor => "preproc",
            Context::Semantic => "semantic",
        }
    }
}

impl std::fmt::Display for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stored diagnostic entry.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub context: Context,
    pub code: ErrorCode,
    pub message: String,
    pub position: Position,
    /// Length, in source characters, of the span the caret underlines.
    pub underline_length: u32,
    pub timestamp_ms: u64,
}

/// Entries beyond this count are dropped (spec §4.3: "geometric resize,
/// saturating at the 16-bit maximum"); counts keep incrementing regardless,
/// so `error_count`/`warning_count` stay accurate even once storage is full.
const MAX_ENTRIES: usize = u16::MAX as usize;

/// Owns every diagnostic raised while processing one translation unit.
///
/// The teacher's salsa accumulator (`#[salsa::accumulator] struct
/// Diagnostic(DiagnosticKind)`) collects diagnostics implicitly across a
/// query graph. There is no query graph here: this registry is an explicit
/// context object threaded by `&mut` through the preprocessor and semantic
/// analyzer, per spec §9's own preference for "a designated context object
/// passed explicitly rather than relying on process-wide statics" for this
/// exact kind of shared, mutated state.
#[derive(Debug)]
pub struct DiagnosticsRegistry {
    entries: Vec<Diagnostic>,
    error_count: u32,
    warning_count: u32,
    baseline: Option<Instant>,
}

impl Default for DiagnosticsRegistry {
    fn default() -> Self {
        DiagnosticsRegistry::new()
    }
}

impl DiagnosticsRegistry {
    pub fn new() -> Self {
        DiagnosticsRegistry {
            entries: Vec::new(),
            error_count: 0,
            warning_count: 0,
            baseline: None,
        }
    }

    fn timestamp_ms(&mut self) -> u64 {
        let baseline = *self.baseline.get_or_insert_with(Instant::now);
        baseline.elapsed().as_millis() as u64
    }

    /// Record one diagnostic. `position.line == 0` means "no specific
    /// source location" (e.g. a missing-file error); renderers skip the
    /// source/caret lines for those (spec §4.3, §8).
    pub fn report(
        &mut self,
        severity: Severity,
        context: Context,
        code: ErrorCode,
        position: Position,
        underline_length: u32,
        message: impl Into<String>,
    ) {
        match severity {
            Severity::Warning => self.warning_count += 1,
            Severity::Error | Severity::Fatal => self.error_count += 1,
        }
        let timestamp_ms = self.timestamp_ms();
        if self.entries.len() < MAX_ENTRIES {
            self.entries.push(Diagnostic {
                severity,
                context,
                code,
                message: message.into(),
                position,
                underline_length,
                timestamp_ms,
            });
        }
    }

    pub fn warning(
        &mut self,
        context: Context,
        code: ErrorCode,
        position: Position,
        underline_length: u32,
        message: impl Into<String>,
    ) {
        self.report(
            Severity::Warning,
            context,
            code,
            position,
            underline_length,
            message,
        );
    }

    pub fn error(
        &mut self,
        context: Context,
        code: ErrorCode,
        position: Position,
        underline_length: u32,
        message: impl Into<String>,
    ) {
        self.report(
            Severity::Error,
            context,
            code,
            position,
            underline_length,
            message,
        );
    }

    /// Record a fatal diagnostic. The engine itself never aborts the
    /// process on a fatal entry; spec §4.3 leaves that to "the driver
    /// policy", so callers check [`DiagnosticsRegistry::has_fatal`] after
    /// a stage completes and decide whether to stop.
    pub fn fatal(
        &mut self,
        context: Context,
        code: ErrorCode,
        position: Position,
        underline_length: u32,
        message: impl Into<String>,
    ) {
        self.report(
            Severity::Fatal,
            context,
            code,
            position,
            underline_length,
            message,
        );
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn error_count(&self) -> u32 {
        self.error_count
    }

    pub fn warning_count(&self) -> u32 {
        self.warning_count
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn has_fatal(&self) -> bool {
        self.entries.iter().any(|e| e.severity == Severity::Fatal)
    }

    /// Render every stored entry, errors and fatals before warnings, each
    /// looking up its own source line from `lines` (see
    /// [`crate::files::split_lines`]). Matches the driver's convention from
    /// spec §6/§8 of reporting errors ahead of warnings.
    pub fn render_all(&self, lines: &[&str]) -> String {
        let mut out = String::new();
        let severe = self
            .entries
            .iter()
            .filter(|e| e.severity != Severity::Warning);
        let warnings = self.entries.iter().filter(|e| e.severity == Severity::Warning);
        for entry in severe.chain(warnings) {
            out.push_str(&render_entry(entry, lines));
        }
        out
    }
}
