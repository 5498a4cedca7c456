//! Relocate action - moves eligible packages and writes shims in their place.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};

use crate::journal::RelocationJournal;
use crate::package::{
    EligiblePackage, MANIFEST_FILE, PackageManifest, SHIM_ENTRY_FILE, SkipReason, StepOutcome,
    read_manifest, render_shim,
};
use crate::runtime::{Runtime, contained_entry_path};

/// What a relocation run did, per package name.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RelocationReport {
    pub moved: Vec<String>,
    pub shimmed: Vec<String>,
    pub skipped: Vec<(String, SkipReason)>,
}

/// Relocate action - handles the move phase and the shim phase
pub struct RelocateAction<'a, R: Runtime> {
    runtime: &'a R,
    primary_root: PathBuf,
    secondary_root: PathBuf,
}

impl<'a, R: Runtime> RelocateAction<'a, R> {
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

    /// Returns: `<primary_root>/<name>`
    pub fn package_dir(&self, name: &str) -> PathBuf {
        self.primary_root.join(name)
    }

    /// Returns: `<secondary_root>/<name>`
    pub fn relocated_dir(&self, name: &str) -> PathBuf {
        self.secondary_root.join(name)
    }

    /// Run both phases over `packages`.
    ///
    /// With `atomic` set, a failure in the move phase moves every package
    /// already relocated by this call back before the error is returned.
    pub fn relocate(
        &self,
        packages: &[EligiblePackage],
        atomic: bool,
    ) -> Result<RelocationReport> {
        let mut report = RelocationReport::default();

        let moves = self.move_packages(packages, atomic)?;
        for (package, outcome) in packages.iter().zip(moves) {
            match outcome {
                StepOutcome::Done => report.moved.push(package.name.clone()),
                StepOutcome::Skipped(reason) => {
                    report.skipped.push((package.name.clone(), reason))
                }
            }
        }

        let shims = self.write_shims(packages)?;
        for (package, outcome) in packages.iter().zip(shims) {
            match outcome {
                StepOutcome::Done => report.shimmed.push(package.name.clone()),
                StepOutcome::Skipped(reason) => {
                    report.skipped.push((package.name.clone(), reason))
                }
            }
        }

        Ok(report)
    }

    /// Move every package into the secondary root.
    ///
    /// The first failing rename aborts the batch. Packages moved before it stay
    /// moved unless `atomic` is set.
    #[tracing::instrument(skip(self, packages))]
    pub fn move_packages(
        &self,
        packages: &[EligiblePackage],
        atomic: bool,
    ) -> Result<Vec<StepOutcome>> {
        self.runtime
            .create_dir_all(&self.secondary_root)
            .with_context(|| format!("Failed to prepare {:?}", self.secondary_root))?;

        let mut journal = RelocationJournal::new();
        let mut outcomes = Vec::with_capacity(packages.len());

        for package in packages {
            match self.move_package(package) {
                Ok(outcome) => {
                    if outcome.is_done() {
                        journal.record(
                            self.package_dir(&package.name),
                            self.relocated_dir(&package.name),
                        );
                    }
                    outcomes.push(outcome);
                }
                Err(e) if atomic && !journal.is_empty() => {
                    let total = journal.moves().len();
                    let stuck = journal.rollback(self.runtime);
                    return Err(e.context(format!(
                        "Relocation aborted, rolled back {} of {} moved package(s)",
                        total - stuck.len(),
                        total
                    )));
                }
                Err(e) => return Err(e),
            }
        }

        Ok(outcomes)
    }

    /// Move one package directory from the primary to the secondary root.
    pub fn move_package(&self, package: &EligiblePackage) -> Result<StepOutcome> {
        let from = self.package_dir(&package.name);
        if !self.runtime.exists(&from) || self.is_shim_dir(&from) {
            debug!("{} is already moved", package.name);
            return Ok(StepOutcome::Skipped(SkipReason::AlreadyMoved));
        }

        let to = self.relocated_dir(&package.name);
        info!("Moving {:?} to {:?}", from, to);
        self.runtime.rename(&from, &to)?;
        Ok(StepOutcome::Done)
    }

    /// Write a shim for every package. There is no atomicity across the set.
    #[tracing::instrument(skip(self, packages))]
    pub fn write_shims(&self, packages: &[EligiblePackage]) -> Result<Vec<StepOutcome>> {
        packages.iter().map(|p| self.write_shim(p)).collect()
    }

    /// Recreate the original package directory with a forwarding shim.
    pub fn write_shim(&self, package: &EligiblePackage) -> Result<StepOutcome> {
        let shim_dir = self.package_dir(&package.name);
        let Some(entry) = contained_entry_path(&package.main_path) else {
            anyhow::bail!(
                "Cannot write a shim for {}: entry {:?} is outside the package",
                package.name,
                package.main_path
            );
        };
        let target = self.relocated_dir(&package.name).join(entry);

        if self.runtime.exists(&shim_dir) {
            if self.is_shim_dir(&shim_dir) {
                debug!("{} already has a shim", package.name);
                return Ok(StepOutcome::Skipped(SkipReason::ShimPresent));
            }
            anyhow::bail!(
                "Cannot write a shim for {}: {:?} is occupied by another package",
                package.name,
                shim_dir
            );
        }

        let files = render_shim(&package.name, &shim_dir, &target)?;
        debug!("Writing shim for {} -> {:?}", package.name, target);

        self.runtime.create_dir(&shim_dir)?;
        self.runtime
            .write(&shim_dir.join(MANIFEST_FILE), files.manifest.as_bytes())?;
        self.runtime
            .write(&shim_dir.join(SHIM_ENTRY_FILE), files.entry.as_bytes())?;

        Ok(StepOutcome::Done)
    }

    fn is_shim_dir(&self, dir: &Path) -> bool {
        read_manifest::<R, PackageManifest>(self.runtime, dir)
            .found()
            .is_some_and(|m| m.is_shim())
    }
}
