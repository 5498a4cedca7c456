use anyhow::Result;
use log::debug;
use std::path::PathBuf;

use crate::runtime::{Runtime, normalize_path};

/// Directory holding the installed packages, relative to the project root.
pub const PRIMARY_DIR: &str = "node_modules";

/// Directory receiving relocated packages, relative to the project root.
pub const SECONDARY_DIR: &str = "relocated_modules";

/// Immutable settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Project root, where the project manifest lives
    pub base_dir: PathBuf,
    /// `<base_dir>/node_modules`
    pub primary_root: PathBuf,
    /// `<base_dir>/relocated_modules`
    pub secondary_root: PathBuf,
    /// Fail when the project manifest is missing or malformed
    pub require_project_manifest: bool,
    /// Roll back the move phase on failure
    pub atomic: bool,
}

impl Config {
    /// Build the configuration for a project root.
    ///
    /// `root` defaults to the current directory; a relative `root` is resolved
    /// against it.
    pub fn new<R: Runtime>(runtime: &R, root: Option<PathBuf>) -> Result<Self> {
        let base_dir = match root {
            Some(path) if path.is_absolute() => path,
            Some(path) => runtime.current_dir()?.join(path),
            None => runtime.current_dir()?,
        };
        let config = Self::for_base(normalize_path(&base_dir));
        debug!("Using project root: {:?}", config.base_dir);
        Ok(config)
    }

    /// Default layout under `base_dir`.
    pub fn for_base(base_dir: PathBuf) -> Self {
        Self {
            primary_root: base_dir.join(PRIMARY_DIR),
            secondary_root: base_dir.join(SECONDARY_DIR),
            base_dir,
            require_project_manifest: true,
            atomic: false,
        }
    }

    pub fn with_atomic(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }

    pub fn with_required_manifest(mut self, required: bool) -> Self {
        self.require_project_manifest = required;
        self
    }
}
