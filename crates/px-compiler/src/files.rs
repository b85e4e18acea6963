use codespan_reporting::files::SimpleFiles;
use px_syntax::Text;

/// Source storage for rendering, grounded on the teacher's `Files` wrapper
/// (`crates/mcc/src/files.rs`) but backed directly by `codespan_reporting`'s
/// own `SimpleFiles` rather than a salsa-keyed indirection, since there is no
/// salsa database here to key off of.
pub type Files = SimpleFiles<Text, Text>;
pub type FileId = usize;

/// Split a file's contents into its lines so the diagnostics renderer can
/// fetch the offending source line for caret output (spec §4.3). Line `n`
/// (1-indexed) is `split_lines(src)[n - 1]`.
pub fn split_lines(contents: &str) -> Vec<&str> {
    if contents.is_empty() {
        return Vec::new();
    }
    contents.split('\n').collect()
}
