use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::runtime::Runtime;

/// File name of every manifest the tool reads or writes.
pub const MANIFEST_FILE: &str = "package.json";

/// Entry file written into every shim directory.
pub const SHIM_ENTRY_FILE: &str = "index.js";

/// Entry used by the module loader when a package does not declare `main`.
pub const DEFAULT_MAIN: &str = "index.js";

/// Errors raised when the project manifest is required but unusable.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("We can't find the {} file at {}!", MANIFEST_FILE, .path.display())]
    NotFound { path: PathBuf },

    #[error("Your {} file at {} could not be parsed: {reason}", MANIFEST_FILE, .path.display())]
    Parse { path: PathBuf, reason: String },
}

/// Outcome of reading a manifest from disk.
#[derive(Debug, Clone, PartialEq)]
pub enum ManifestState<T> {
    Found(T),
    NotFound,
    Invalid(String),
}

impl<T> ManifestState<T> {
    /// Collapse the state into an `Option`, treating invalid content as absent.
    pub fn found(self) -> Option<T> {
        match self {
            ManifestState::Found(manifest) => Some(manifest),
            ManifestState::NotFound | ManifestState::Invalid(_) => None,
        }
    }
}

/// How a package's entry point should be chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Override {
    /// Opt the package in and keep its own `main` resolution (`true` in JSON).
    UseDefault,
    /// Opt the package in and use this path, relative to the package root.
    UseExplicit(String),
}

impl Override {
    /// `true` opts in, a non-empty string names the entry, anything else is ignored.
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bool(true) => Some(Override::UseDefault),
            Value::String(path) if !path.is_empty() => Some(Override::UseExplicit(path)),
            _ => None,
        }
    }
}

// Manifests are written by third parties, so fields of an unexpected type are
// ignored instead of failing the whole file.

fn deserialize_override<'de, D>(deserializer: D) -> Result<Option<Override>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(Override::from_value))
}

fn deserialize_overrides<'de, D>(deserializer: D) -> Result<BTreeMap<String, Override>, D::Error>
where
    D: Deserializer<'de>,
{
    let overrides = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(map)) => map
            .into_iter()
            .filter_map(|(name, value)| Override::from_value(value).map(|o| (name, o)))
            .collect(),
        _ => BTreeMap::new(),
    };
    Ok(overrides)
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(matches!(
        Option::<Value>::deserialize(deserializer)?,
        Some(Value::Bool(true))
    ))
}

fn deserialize_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Ok(Some(text)),
        _ => Ok(None),
    }
}

/// The root project's manifest. Only `extraDependencies` is consumed.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(from = "RawProjectManifest")]
pub struct ProjectManifest {
    pub extra_dependencies: BTreeMap<String, Override>,
}

#[derive(Deserialize)]
struct RawProjectManifest {
    #[serde(
        rename = "extraDependencies",
        default,
        deserialize_with = "deserialize_overrides"
    )]
    extra_dependencies: BTreeMap<String, Override>,
    #[serde(
        rename = "es6Dependencies",
        default,
        deserialize_with = "deserialize_overrides"
    )]
    legacy_dependencies: BTreeMap<String, Override>,
}

impl From<RawProjectManifest> for ProjectManifest {
    fn from(raw: RawProjectManifest) -> Self {
        // extraDependencies wins over the legacy key for the same package
        let mut extra_dependencies = raw.legacy_dependencies;
        extra_dependencies.extend(raw.extra_dependencies);
        Self { extra_dependencies }
    }
}

impl ProjectManifest {
    pub fn override_for(&self, name: &str) -> Option<&Override> {
        self.extra_dependencies.get(name)
    }
}

/// The manifest of an installed package.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(from = "RawPackageManifest")]
pub struct PackageManifest {
    pub name: Option<String>,
    pub main: Option<String>,
    pub alternate_entry: Option<Override>,
    pub relocated: bool,
}

#[derive(Deserialize)]
struct RawPackageManifest {
    #[serde(default, deserialize_with = "deserialize_text")]
    name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_text")]
    main: Option<String>,
    #[serde(
        rename = "alternateEntry",
        default,
        deserialize_with = "deserialize_override"
    )]
    alternate_entry: Option<Override>,
    #[serde(rename = "es6", default, deserialize_with = "deserialize_override")]
    legacy_entry: Option<Override>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    relocated: bool,
    #[serde(rename = "es6Replaced", default, deserialize_with = "deserialize_flag")]
    legacy_relocated: bool,
}

impl From<RawPackageManifest> for PackageManifest {
    fn from(raw: RawPackageManifest) -> Self {
        Self {
            name: raw.name,
            main: raw.main,
            alternate_entry: raw.alternate_entry.or(raw.legacy_entry),
            relocated: raw.relocated || raw.legacy_relocated,
        }
    }
}

impl PackageManifest {
    /// Whether this manifest was written by a previous run.
    pub fn is_shim(&self) -> bool {
        self.relocated
    }

    /// The conventional entry point, falling back to `index.js`.
    pub fn main_entry(&self) -> &str {
        match self.main.as_deref() {
            Some(main) if !main.is_empty() => main,
            _ => DEFAULT_MAIN,
        }
    }
}

/// Manifest written at the original location of a relocated package.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ShimManifest {
    pub name: String,
    pub main: String,
    pub relocated: bool,
}

impl ShimManifest {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            main: SHIM_ENTRY_FILE.to_string(),
            relocated: true,
        }
    }
}

/// Read and decode `<dir>/package.json`.
#[tracing::instrument(skip(runtime))]
pub fn read_manifest<R: Runtime, T: DeserializeOwned>(runtime: &R, dir: &Path) -> ManifestState<T> {
    let path = dir.join(MANIFEST_FILE);
    if !runtime.exists(&path) {
        return ManifestState::NotFound;
    }

    let content = match runtime.read_to_string(&path) {
        Ok(content) => content,
        Err(e) => return ManifestState::Invalid(format!("{:#}", e)),
    };

    match serde_json::from_str(&content) {
        Ok(manifest) => ManifestState::Found(manifest),
        Err(e) => ManifestState::Invalid(e.to_string()),
    }
}

/// Load the project manifest from `dir`.
///
/// With `required` set, a missing or malformed file is an error. Otherwise it
/// is treated as a manifest without overrides.
pub fn load_project_manifest<R: Runtime>(
    runtime: &R,
    dir: &Path,
    required: bool,
) -> Result<ProjectManifest, ManifestError> {
    match read_manifest(runtime, dir) {
        ManifestState::Found(manifest) => Ok(manifest),
        ManifestState::NotFound if required => Err(ManifestError::NotFound {
            path: dir.join(MANIFEST_FILE),
        }),
        ManifestState::Invalid(reason) if required => Err(ManifestError::Parse {
            path: dir.join(MANIFEST_FILE),
            reason,
        }),
        ManifestState::NotFound => {
            log::debug!("No project manifest in {:?}, using no overrides", dir);
            Ok(ProjectManifest::default())
        }
        ManifestState::Invalid(reason) => {
            log::warn!("Ignoring invalid project manifest in {:?}: {}", dir, reason);
            Ok(ProjectManifest::default())
        }
    }
}
