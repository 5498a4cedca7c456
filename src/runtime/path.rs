//! Path utility functions for normalization and module specifiers.

use std::path::{Component, Path, PathBuf};

/// Normalize a path by processing `.` and `..` components lexically.
/// This does not access the filesystem and does not follow symlinks.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // Keep the `..` if there is nothing left to pop
                if !result.pop() {
                    result.push(component);
                }
            }
            _ => {
                result.push(component);
            }
        }
    }
    result
}

/// Resolve a package entry path so it stays inside the package directory.
///
/// Leading root and drive prefixes are dropped, so `/lib/main.js` means
/// `lib/main.js`. Returns `None` if the path is empty or climbs out of the
/// package once normalized.
pub fn contained_entry_path(entry: &str) -> Option<PathBuf> {
    let relative: PathBuf = Path::new(entry)
        .components()
        .filter(|c| !matches!(c, Component::Prefix(_) | Component::RootDir))
        .collect();
    let normalized = normalize_path(&relative);

    match normalized.components().next() {
        None | Some(Component::ParentDir) => None,
        Some(_) => Some(normalized),
    }
}

/// Build a `require()` specifier that resolves `target` from a module living
/// in `from_dir`.
///
/// The result always uses `/` separators and always starts with `./` or `../`,
/// otherwise the module loader would treat it as a bare package name.
///
/// For example, from `/app/node_modules/pkg` to
/// `/app/relocated_modules/pkg/lib/main.js` this returns
/// `../../relocated_modules/pkg/lib/main.js`.
///
/// Returns `None` if a relative path cannot be computed (e.g., different drive letters on Windows).
pub fn module_specifier(from_dir: &Path, target: &Path) -> Option<String> {
    let relative = pathdiff::diff_paths(normalize_path(target), normalize_path(from_dir))?;

    if relative.is_absolute() {
        return None;
    }

    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    let joined = parts.join("/");

    if joined == ".." || joined.starts_with("../") {
        Some(joined)
    } else {
        Some(format!("./{}", joined))
    }
}
