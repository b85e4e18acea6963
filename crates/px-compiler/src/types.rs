use px_syntax::Text;

/// One `.px` translation unit: a root file plus, after preprocessing, the
/// transitive closure of everything it `#import`s/`#using`s.
///
/// This used to be a `salsa`-tracked input in the teacher (`mcc`); the core
/// here has no incremental-rebuild non-goal to serve, and the semantic
/// analyzer's scope tree and diagnostics registry are owned explicitly by a
/// per-translation-unit context object instead (spec §9's own recommendation
/// for this subsystem), so `SourceFile` is a plain value type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceFile {
    pub path: Text,
    pub contents: Text,
}

impl SourceFile {
    pub fn new(path: impl Into<Text>, contents: impl Into<Text>) -> Self {
        SourceFile {
            path: path.into(),
            contents: contents.into(),
        }
    }
}
