//! Result values for steps that may legitimately do nothing.
//!
//! A step either did its work, was skipped for a known reason, or failed with
//! an error (carried separately in `anyhow::Result`).

use std::fmt;

/// Why a package was left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The package has no readable manifest and no project override.
    NoManifest,
    /// The package manifest is a shim written by a previous run.
    AlreadyRelocated,
    /// Neither the package nor the project opted it in.
    NotOptedIn,
    /// The chosen entry path points outside the package directory.
    EntryOutsidePackage,
    /// The package directory is no longer in the primary root.
    AlreadyMoved,
    /// A shim already occupies the original location.
    ShimPresent,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SkipReason::NoManifest => "no manifest",
            SkipReason::AlreadyRelocated => "already relocated",
            SkipReason::NotOptedIn => "not opted in",
            SkipReason::EntryOutsidePackage => "entry points outside the package",
            SkipReason::AlreadyMoved => "already moved",
            SkipReason::ShimPresent => "shim already present",
        };
        f.write_str(text)
    }
}

/// Outcome of a single per-package step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Done,
    Skipped(SkipReason),
}

impl StepOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, StepOutcome::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(SkipReason::AlreadyMoved.to_string(), "already moved");
        assert_eq!(SkipReason::NoManifest.to_string(), "no manifest");
    }

    #[test]
    fn test_step_outcome_is_done() {
        assert!(StepOutcome::Done.is_done());
        assert!(!StepOutcome::Skipped(SkipReason::ShimPresent).is_done());
    }
}
