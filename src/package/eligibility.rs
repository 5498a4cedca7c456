//! Selection of the installed packages that should be relocated.

use anyhow::Result;
use log::debug;
use std::path::PathBuf;

use crate::runtime::{Runtime, contained_entry_path};

use super::manifest::{
    DEFAULT_MAIN, ManifestState, Override, PackageManifest, ProjectManifest, read_manifest,
};
use super::{SkipReason, find_package_names};

/// A package confirmed for relocation, with the entry the shim will point to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligiblePackage {
    pub name: String,
    /// Entry path relative to the package root. Never empty.
    pub main_path: String,
}

/// Scanner verdict for one installed package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Eligible(EligiblePackage),
    Skipped(SkipReason),
}

/// Resolve the entry point a shim should re-export.
///
/// The project override wins over the package's own `alternateEntry`. Either
/// one set to `UseDefault` falls back to the package's `main` field.
pub fn resolve_main_path(
    own: Option<&PackageManifest>,
    project_override: Option<&Override>,
) -> Option<String> {
    let own_main = || {
        own.map(PackageManifest::main_entry)
            .unwrap_or(DEFAULT_MAIN)
            .to_string()
    };

    let chosen = project_override.or_else(|| own.and_then(|m| m.alternate_entry.as_ref()))?;
    match chosen {
        Override::UseExplicit(path) => Some(path.clone()),
        Override::UseDefault => Some(own_main()),
    }
}

/// Classify a package from its manifest state and the project overrides.
pub fn classify(
    name: &str,
    own: ManifestState<PackageManifest>,
    project: &ProjectManifest,
) -> Classification {
    let project_override = project.override_for(name);
    let own = own.found();

    match &own {
        None if project_override.is_none() => return Classification::Skipped(SkipReason::NoManifest),
        Some(manifest) if manifest.is_shim() => {
            return Classification::Skipped(SkipReason::AlreadyRelocated);
        }
        _ => {}
    }

    let Some(main_path) = resolve_main_path(own.as_ref(), project_override) else {
        return Classification::Skipped(SkipReason::NotOptedIn);
    };
    let Some(contained) = contained_entry_path(&main_path) else {
        return Classification::Skipped(SkipReason::EntryOutsidePackage);
    };

    let main_path = contained
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");
    Classification::Eligible(EligiblePackage {
        name: name.to_string(),
        main_path,
    })
}

/// Scans the primary modules directory for eligible packages.
pub struct EligibilityScanner<'a, R: Runtime> {
    runtime: &'a R,
    primary_root: PathBuf,
    project: &'a ProjectManifest,
}

impl<'a, R: Runtime> EligibilityScanner<'a, R> {
    pub fn new(runtime: &'a R, primary_root: impl Into<PathBuf>, project: &'a ProjectManifest) -> Self {
        Self {
            runtime,
            primary_root: primary_root.into(),
            project,
        }
    }

    /// Return every eligible package, in directory listing order.
    #[tracing::instrument(skip(self))]
    pub fn scan(&self) -> Result<Vec<EligiblePackage>> {
        let mut eligible = Vec::new();

        for name in find_package_names(self.runtime, &self.primary_root)? {
            let own = read_manifest(self.runtime, &self.primary_root.join(&name));
            if let ManifestState::Invalid(reason) = &own {
                debug!("Treating invalid manifest of {} as absent: {}", name, reason);
            }

            match classify(&name, own, self.project) {
                Classification::Eligible(package) => {
                    debug!("{} is eligible with main {}", package.name, package.main_path);
                    eligible.push(package);
                }
                Classification::Skipped(reason) => {
                    debug!("Skipping {}: {}", name, reason);
                }
            }
        }

        Ok(eligible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::MANIFEST_FILE;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;

    fn project(json: &str) -> ProjectManifest {
        serde_json::from_str(json).unwrap()
    }

    fn package(json: &str) -> ManifestState<PackageManifest> {
        ManifestState::Found(serde_json::from_str(json).unwrap())
    }

    fn eligible(name: &str, main_path: &str) -> Classification {
        Classification::Eligible(EligiblePackage {
            name: name.to_string(),
            main_path: main_path.to_string(),
        })
    }

    #[test]
    fn test_classify_self_declared_path() {
        let result = classify(
            "pkg",
            package(r#"{"alternateEntry": "src/index.js", "main": "lib/index.js"}"#),
            &ProjectManifest::default(),
        );
        assert_eq!(result, eligible("pkg", "src/index.js"));
    }

    #[test]
    fn test_classify_self_declared_flag_uses_main() {
        let result = classify(
            "pkg",
            package(r#"{"alternateEntry": true, "main": "dist/index.js"}"#),
            &ProjectManifest::default(),
        );
        assert_eq!(result, eligible("pkg", "dist/index.js"));
    }

    #[test]
    fn test_classify_project_path_beats_self_declared_flag() {
        let result = classify(
            "pkg",
            package(r#"{"alternateEntry": true, "main": "dist/index.js"}"#),
            &project(r#"{"extraDependencies": {"pkg": "src/entry.js"}}"#),
        );
        assert_eq!(result, eligible("pkg", "src/entry.js"));
    }

    #[test]
    fn test_classify_project_path_beats_self_declared_path() {
        let result = classify(
            "pkg",
            package(r#"{"alternateEntry": "src/own.js"}"#),
            &project(r#"{"extraDependencies": {"pkg": "src/entry.js"}}"#),
        );
        assert_eq!(result, eligible("pkg", "src/entry.js"));
    }

    #[test]
    fn test_classify_project_flag_uses_package_main() {
        let result = classify(
            "pkg",
            package(r#"{"alternateEntry": "src/own.js", "main": "dist/index.js"}"#),
            &project(r#"{"extraDependencies": {"pkg": true}}"#),
        );
        assert_eq!(result, eligible("pkg", "dist/index.js"));
    }

    #[test]
    fn test_classify_project_flag_without_main() {
        let result = classify(
            "pkg",
            package(r#"{"name": "pkg"}"#),
            &project(r#"{"extraDependencies": {"pkg": true}}"#),
        );
        assert_eq!(result, eligible("pkg", "index.js"));
    }

    #[test]
    fn test_classify_no_manifest_with_override() {
        let result = classify(
            "pkg-a",
            ManifestState::NotFound,
            &project(r#"{"extraDependencies": {"pkg-a": "lib/main.js"}}"#),
        );
        assert_eq!(result, eligible("pkg-a", "lib/main.js"));
    }

    #[test]
    fn test_classify_no_manifest_with_flag_override() {
        let result = classify(
            "pkg",
            ManifestState::NotFound,
            &project(r#"{"extraDependencies": {"pkg": true}}"#),
        );
        assert_eq!(result, eligible("pkg", "index.js"));
    }

    #[test]
    fn test_classify_invalid_manifest_with_override() {
        let overrides = project(r#"{"extraDependencies": {"pkg": "lib/main.js", "flagged": true}}"#);

        let result = classify("pkg", ManifestState::Invalid("bad".into()), &overrides);
        assert_eq!(result, eligible("pkg", "lib/main.js"));

        // Invalid own manifest is absent, so its `main` is never consulted
        let result = classify("flagged", ManifestState::Invalid("bad".into()), &overrides);
        assert_eq!(result, eligible("flagged", "index.js"));
    }

    #[test]
    fn test_classify_absolute_entry_stays_in_package() {
        let result = classify(
            "pkg",
            ManifestState::NotFound,
            &project(r#"{"extraDependencies": {"pkg": "/lib/./main.js"}}"#),
        );
        assert_eq!(result, eligible("pkg", "lib/main.js"));
    }

    #[test]
    fn test_classify_entry_outside_package() {
        let result = classify(
            "pkg",
            ManifestState::NotFound,
            &project(r#"{"extraDependencies": {"pkg": "../../x.js"}}"#),
        );
        assert_eq!(result, Classification::Skipped(SkipReason::EntryOutsidePackage));

        let result = classify(
            "pkg",
            package(r#"{"alternateEntry": true, "main": "lib/../../x.js"}"#),
            &ProjectManifest::default(),
        );
        assert_eq!(result, Classification::Skipped(SkipReason::EntryOutsidePackage));
    }

    #[test]
    fn test_classify_no_manifest_without_override() {
        let result = classify("pkg", ManifestState::NotFound, &ProjectManifest::default());
        assert_eq!(result, Classification::Skipped(SkipReason::NoManifest));

        let result = classify(
            "pkg",
            ManifestState::Invalid("bad".into()),
            &project(r#"{"extraDependencies": {"other": true}}"#),
        );
        assert_eq!(result, Classification::Skipped(SkipReason::NoManifest));
    }

    #[test]
    fn test_classify_shim_is_excluded_even_with_override() {
        let shim = package(r#"{"name": "pkg", "main": "index.js", "relocated": true}"#);
        let result = classify(
            "pkg",
            shim,
            &project(r#"{"extraDependencies": {"pkg": "lib/main.js"}}"#),
        );
        assert_eq!(result, Classification::Skipped(SkipReason::AlreadyRelocated));
    }

    #[test]
    fn test_classify_not_opted_in() {
        let result = classify(
            "pkg",
            package(r#"{"main": "index.js", "alternateEntry": false}"#),
            &ProjectManifest::default(),
        );
        assert_eq!(result, Classification::Skipped(SkipReason::NotOptedIn));
    }

    #[test]
    fn test_scan_keeps_listing_order() {
        let mut runtime = MockRuntime::new();
        let root = PathBuf::from("/app/node_modules");
        let project = project(r#"{"extraDependencies": {"zeta": "z.js"}}"#);

        runtime
            .expect_exists()
            .with(eq(root.clone()))
            .returning(|_| true);
        runtime
            .expect_read_dir()
            .with(eq(root.clone()))
            .returning(|p| Ok(vec![p.join("zeta"), p.join("plain"), p.join("alpha")]));
        runtime.expect_is_dir().returning(|_| true);

        let manifests = [
            ("zeta", None),
            ("plain", Some(r#"{"main": "index.js"}"#)),
            ("alpha", Some(r#"{"alternateEntry": "src/a.js"}"#)),
        ];
        for (name, content) in manifests {
            let path = root.join(name).join(MANIFEST_FILE);
            runtime
                .expect_exists()
                .with(eq(path.clone()))
                .returning(move |_| content.is_some());
            if let Some(content) = content {
                runtime
                    .expect_read_to_string()
                    .with(eq(path))
                    .returning(move |_| Ok(content.to_string()));
            }
        }

        let scanner = EligibilityScanner::new(&runtime, &root, &project);
        let found = scanner.scan().unwrap();
        assert_eq!(
            found,
            vec![
                EligiblePackage {
                    name: "zeta".into(),
                    main_path: "z.js".into()
                },
                EligiblePackage {
                    name: "alpha".into(),
                    main_path: "src/a.js".into()
                },
            ]
        );
    }

    #[test]
    fn test_scan_missing_root() {
        let mut runtime = MockRuntime::new();
        let project = ProjectManifest::default();
        runtime.expect_exists().returning(|_| false);

        let scanner = EligibilityScanner::new(&runtime, "/nowhere/node_modules", &project);
        assert!(scanner.scan().unwrap().is_empty());
    }
}
