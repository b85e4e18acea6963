//! Textual inclusion: `#import "path"` and `#using "libname"` resolution
//! (spec §4.1).

use std::path::{Path, PathBuf};

/// Resolve an `#import "path"` target relative to the importing file,
/// auto-suffixing `.hp` when the path carries no extension.
pub fn resolve_import(current_file: &Path, raw_path: &str) -> PathBuf {
    let mut candidate = PathBuf::from(raw_path);
    if candidate.extension().is_none() {
        candidate.set_extension("hp");
    }
    if candidate.is_absolute() {
        return candidate;
    }
    current_file
        .parent()
        .map(|dir| dir.join(&candidate))
        .unwrap_or(candidate)
}

/// Search locations tried, in order, for `#using "libname"` (spec §4.1).
/// `libname.hp` is looked up relative to: the current file's directory, the
/// process's current working directory, `./lib/`, and an OS-specific system
/// library directory.
pub fn using_search_paths(current_file: &Path, libname: &str) -> Vec<PathBuf> {
    let file_name = format!("{libname}.hp");
    let mut paths = Vec::new();

    if let Some(dir) = current_file.parent() {
        paths.push(dir.join(&file_name));
    }
    paths.push(PathBuf::from(&file_name));
    paths.push(Path::new("lib").join(&file_name));
    paths.push(system_lib_dir().join(&file_name));
    paths
}

#[cfg(target_os = "windows")]
fn system_lib_dir() -> PathBuf {
    PathBuf::from(r"C:\Program Files\lib\")
}

#[cfg(target_os = "macos")]
fn system_lib_dir() -> PathBuf {
    PathBuf::from("/usr/local/lib/")
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn system_lib_dir() -> PathBuf {
    PathBuf::from("/usr/lib/")
}

/// Human-readable linker marker line emitted before a `#using` target's
/// contents are spliced in (spec §4.1: "emits a human-readable linker
/// marker line, then includes contents").
pub fn linker_marker(libname: &str, resolved: &Path) -> String {
    format!("// using {libname} ({})\n", resolved.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_suffixes_hp_when_missing() {
        let resolved = resolve_import(Path::new("/proj/main.px"), "util");
        assert_eq!(resolved, PathBuf::from("/proj/util.hp"));
    }

    #[test]
    fn import_respects_explicit_extension() {
        let resolved = resolve_import(Path::new("/proj/main.px"), "util.txt");
        assert_eq!(resolved, PathBuf::from("/proj/util.txt"));
    }

    #[test]
    fn using_search_paths_includes_current_dir_and_lib() {
        let paths = using_search_paths(Path::new("/proj/main.px"), "core");
        assert!(paths.contains(&PathBuf::from("/proj/core.hp")));
        assert!(paths.contains(&PathBuf::from("lib/core.hp")));
    }
}
