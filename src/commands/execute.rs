use anyhow::Result;
use log::debug;

use crate::application::{RelocateAction, RelocationReport};
use crate::package::{EligibilityScanner, load_project_manifest};
use crate::runtime::Runtime;

use super::config::Config;

/// Relocate every eligible package and leave shims behind
#[tracing::instrument(skip(runtime, config))]
pub fn execute<R: Runtime>(runtime: &R, config: &Config) -> Result<RelocationReport> {
    let project = load_project_manifest(
        runtime,
        &config.base_dir,
        config.require_project_manifest,
    )?;
    debug!(
        "Project manifest lists {} extra dependencies",
        project.extra_dependencies.len()
    );

    let packages = EligibilityScanner::new(runtime, &config.primary_root, &project).scan()?;
    if packages.is_empty() {
        println!("No packages to relocate.");
        return Ok(RelocationReport::default());
    }

    let action = RelocateAction::new(runtime, &config.primary_root, &config.secondary_root);
    let report = action.relocate(&packages, config.atomic)?;

    for name in &report.moved {
        println!(
            "Relocated {} to {}",
            name,
            action.relocated_dir(name).display()
        );
    }
    for (name, reason) in &report.skipped {
        debug!("{}: {}", name, reason);
    }
    println!(
        "Relocated {} package(s), wrote {} shim(s)",
        report.moved.len(),
        report.shimmed.len()
    );

    Ok(report)
}
