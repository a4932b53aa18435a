//! Project manifest (`package.json`) loading.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ConfigError, Result};
use crate::merge::merge_values;

pub const MANIFEST_FILE: &str = "package.json";

/// Dependency name to version range.
pub type DependencyMap = IndexMap<String, String>;

/// The fields of `package.json` the engine reads. Everything else is kept
/// in `extra` so the resolved manifest can be inspected as a whole.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub dependencies: DependencyMap,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub dev_dependencies: DependencyMap,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub peer_dependencies: DependencyMap,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub optional_dependencies: DependencyMap,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Manifest {
    /// Whether `package` is listed in `dependencies` or `devDependencies`.
    pub fn declares(&self, package: &str) -> bool {
        self.dependencies.contains_key(package) || self.dev_dependencies.contains_key(package)
    }

    /// Names of the runtime (`dependencies`) packages.
    pub fn runtime_dependencies(&self) -> impl Iterator<Item = &str> {
        self.dependencies.keys().map(String::as_str)
    }

    /// Names of the `peerDependencies` packages.
    pub fn peer_dependencies(&self) -> impl Iterator<Item = &str> {
        self.peer_dependencies.keys().map(String::as_str)
    }
}

/// Load `<root>/package.json` and deep-merge `fragment` on top of it.
///
/// The fragment wins on conflicting keys and replaces arrays wholesale. When no
/// file exists the fragment alone is the manifest; when neither exists this
/// fails with [`ConfigError::ManifestNotFound`].
pub fn load_manifest(root: &Path, fragment: Option<&Value>) -> Result<Manifest> {
    let path = root.join(MANIFEST_FILE);

    let on_disk = match fs::read_to_string(&path) {
        Ok(content) => Some(parse_document(&path, &content)?),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
        Err(err) => return Err(err.into()),
    };

    let document = match (on_disk, fragment) {
        (Some(mut base), Some(fragment)) => {
            tracing::debug!(path = %path.display(), "merging manifest override onto package.json");
            merge_values(&mut base, fragment);
            base
        }
        (Some(base), None) => base,
        (None, Some(fragment)) => {
            tracing::debug!("no package.json on disk, using manifest override");
            fragment.clone()
        }
        (None, None) => return Err(ConfigError::ManifestNotFound { path }),
    };

    from_document(&path, document)
}

fn parse_document(path: &Path, content: &str) -> Result<Value> {
    serde_json::from_str(content).map_err(|e| ConfigError::InvalidManifest {
        path: path.to_path_buf(),
        message: format!("invalid JSON: {e}"),
    })
}

fn from_document(path: &Path, document: Value) -> Result<Manifest> {
    if !document.is_object() {
        return Err(ConfigError::InvalidManifest {
            path: PathBuf::from(path),
            message: "manifest must be a JSON object".to_string(),
        });
    }

    serde_json::from_value(document).map_err(|e| ConfigError::InvalidManifest {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
