use anyhow::Result;
use std::path::Path;

use crate::runtime::Runtime;

/// Find the names of all installed packages under a modules directory.
///
/// Directory structure: `<root>/<name>/`. Hidden entries (`.bin`,
/// `.package-lock.json`, ...) and plain files are ignored. A missing root
/// yields an empty list.
#[tracing::instrument(skip(runtime, root))]
pub fn find_package_names<R: Runtime>(runtime: &R, root: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();

    if !runtime.exists(root) {
        return Ok(names);
    }

    for entry in runtime.read_dir(root)? {
        let Some(name) = entry.file_name().and_then(|n| n.to_str()) else {
            log::debug!("Skipping entry with non UTF-8 name: {:?}", entry);
            continue;
        };
        if name.starts_with('.') || !runtime.is_dir(&entry) {
            continue;
        }
        names.push(name.to_string());
    }

    Ok(names)
}
