//! Restore action - undoes a relocation.

use std::path::PathBuf;

use anyhow::Result;
use log::{debug, info, warn};

use crate::package::{PackageManifest, find_package_names, read_manifest};
use crate::runtime::Runtime;

/// What a restore run did, per package name.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RestoreReport {
    /// Shims removed from the primary root
    pub removed_shims: Vec<String>,
    /// Packages moved back into the primary root
    pub restored: Vec<String>,
    /// Shims whose relocated copy was missing
    pub missing: Vec<String>,
    /// Secondary root entries deleted without a matching shim
    pub discarded: Vec<PathBuf>,
}

/// Restore action - removes shims and moves relocated packages back
pub struct RestoreAction<'a, R: Runtime> {
    runtime: &'a R,
    primary_root: PathBuf,
    secondary_root: PathBuf,
}

impl<'a, R: Runtime> RestoreAction<'a, R> {
    pub fn new(
        runtime: &'a R,
        primary_root: impl Into<PathBuf>,
        secondary_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runtime,
            primary_root: primary_root.into(),
            secondary_root: secondary_root.into(),
        }
    }

    /// Names of the primary root entries that are shims.
    pub fn find_shims(&self) -> Result<Vec<String>> {
        let names = find_package_names(self.runtime, &self.primary_root)?;
        Ok(names
            .into_iter()
            .filter(|name| {
                read_manifest::<R, PackageManifest>(self.runtime, &self.primary_root.join(name))
                    .found()
                    .is_some_and(|m| m.is_shim())
            })
            .collect())
    }

    /// Undo a relocation.
    ///
    /// The secondary root is deleted at the end whatever it still contains.
    #[tracing::instrument(skip(self))]
    pub fn restore(&self) -> Result<RestoreReport> {
        let mut report = RestoreReport::default();
        let shims = self.find_shims()?;

        for name in &shims {
            let shim_dir = self.primary_root.join(name);
            debug!("Removing shim {:?}", shim_dir);
            self.runtime.remove_dir_all(&shim_dir)?;
            report.removed_shims.push(name.clone());
        }

        for name in &shims {
            let relocated = self.secondary_root.join(name);
            if !self.runtime.is_dir(&relocated) {
                warn!("No relocated copy of {} in {:?}", name, self.secondary_root);
                report.missing.push(name.clone());
                continue;
            }
            let original = self.primary_root.join(name);
            info!("Moving {:?} back to {:?}", relocated, original);
            self.runtime.rename(&relocated, &original)?;
            report.restored.push(name.clone());
        }

        if self.runtime.exists(&self.secondary_root) {
            for leftover in self.runtime.read_dir(&self.secondary_root)? {
                warn!("Discarding {:?}", leftover);
                report.discarded.push(leftover);
            }
            self.runtime.remove_dir_all(&self.secondary_root)?;
        } else {
            debug!("{:?} does not exist, nothing to remove", self.secondary_root);
        }

        Ok(report)
    }
}
