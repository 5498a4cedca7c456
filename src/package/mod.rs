//! Package domain
//!
//! This module provides the manifest model, discovery of installed packages,
//! eligibility rules and shim rendering.

mod discovery;
mod eligibility;
mod manifest;
mod outcome;
mod shim;

pub use discovery::find_package_names;
pub use eligibility::{
    Classification, EligibilityScanner, EligiblePackage, classify, resolve_main_path,
};
pub use manifest::{
    DEFAULT_MAIN, MANIFEST_FILE, ManifestError, ManifestState, Override, PackageManifest,
    ProjectManifest, SHIM_ENTRY_FILE, ShimManifest, load_project_manifest, read_manifest,
};
pub use outcome::{SkipReason, StepOutcome};
pub use shim::{ShimFiles, render_entry, render_shim};
