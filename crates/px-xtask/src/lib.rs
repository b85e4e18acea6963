//! Dev tooling for the `px` workspace: currently just `error-codes`, which
//! regenerates `px-compiler/src/diagnostics/codes.rs` from
//! `px-compiler/error-codes.yaml` (grounded on the teacher's
//! `crates/xtask/src/error_codes.rs`).

pub mod error_codes;

use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use proc_macro2::TokenStream;

/// The workspace root, computed from this crate's own manifest directory
/// (`crates/px-xtask` is always two levels below it).
pub static ROOT_DIR: LazyLock<PathBuf> = LazyLock::new(|| {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(Path::parent)
        .expect("crates/px-xtask is two levels below the workspace root")
        .to_path_buf()
});

/// Format `tokens` as a Rust source file and write it to `path` if its
/// current contents differ. `label` is used only in the panic/log message.
///
/// This never runs as part of a build (the generated files are committed
/// by hand); it exists so `cargo run -p xtask -- error-codes` can both
/// regenerate the file and, via `PX_XTASK_CHECK=1`, verify it is up to date
/// without writing, for use in CI.
pub fn ensure_file_contents(path: &Path, tokens: TokenStream, label: &str) {
    let pretty = prettyplease::unparse(
        &syn::parse2(tokens).unwrap_or_else(|e| panic!("generated {label} is not valid Rust: {e}")),
    );

    let existing = std::fs::read_to_string(path).unwrap_or_default();
    if existing == pretty {
        return;
    }

    if std::env::var_os("PX_XTASK_CHECK").is_some() {
        panic!(
            "{} is out of date; run `cargo run -p xtask -- error-codes` to regenerate it",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, pretty)
        .unwrap_or_else(|e| panic!("failed to write {}: {e}", path.display()));
}
