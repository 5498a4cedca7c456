use anyhow::{Context, Result};
use std::path::Path;

use crate::runtime::module_specifier;

use super::manifest::ShimManifest;

/// Rendered contents of a shim directory.
#[derive(Debug, Clone, PartialEq)]
pub struct ShimFiles {
    /// `package.json`
    pub manifest: String,
    /// `index.js`
    pub entry: String,
}

/// Render the shim for `name`, placed in `shim_dir` and forwarding to
/// `target`, the relocated entry file.
pub fn render_shim(name: &str, shim_dir: &Path, target: &Path) -> Result<ShimFiles> {
    let specifier = module_specifier(shim_dir, target).with_context(|| {
        format!(
            "Cannot express {:?} relative to {:?} for package {}",
            target, shim_dir, name
        )
    })?;

    Ok(ShimFiles {
        manifest: serde_json::to_string_pretty(&ShimManifest::new(name))?,
        entry: render_entry(&specifier)?,
    })
}

/// A single CommonJS statement re-exporting the module at `specifier`.
pub fn render_entry(specifier: &str) -> Result<String> {
    Ok(format!(
        "module.exports = require({});\n",
        serde_json::to_string(specifier)?
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::PackageManifest;

    #[test]
    fn test_render_entry_quotes_specifier() {
        assert_eq!(
            render_entry("../../relocated_modules/pkg/index.js").unwrap(),
            "module.exports = require(\"../../relocated_modules/pkg/index.js\");\n"
        );
        assert_eq!(
            render_entry("./it's \"odd\".js").unwrap(),
            "module.exports = require(\"./it's \\\"odd\\\".js\");\n"
        );
    }

    #[cfg(not(windows))]
    #[test]
    fn test_render_shim() {
        let files = render_shim(
            "pkg-a",
            Path::new("/app/node_modules/pkg-a"),
            Path::new("/app/relocated_modules/pkg-a/lib/main.js"),
        )
        .unwrap();

        assert_eq!(
            files.entry,
            "module.exports = require(\"../../relocated_modules/pkg-a/lib/main.js\");\n"
        );

        let manifest: PackageManifest = serde_json::from_str(&files.manifest).unwrap();
        assert_eq!(manifest.name.as_deref(), Some("pkg-a"));
        assert_eq!(manifest.main_entry(), "index.js");
        assert!(manifest.is_shim());
    }

    #[cfg(not(windows))]
    #[test]
    fn test_render_shim_unrelated_paths() {
        let err = render_shim(
            "pkg-a",
            Path::new("node_modules/pkg-a"),
            Path::new("/app/relocated_modules/pkg-a/index.js"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("pkg-a"));
    }
}
