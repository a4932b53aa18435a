use std::collections::BTreeSet;
use std::fmt;

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::error::{ConfigError, Result};
use crate::manifest::Manifest;
use crate::request::{ExternalFn, ExternalSpec};

/// Decides which imports stay out of the bundle.
///
/// `ids` match an import exactly. `packages` match an import whose bare
/// package name is listed, so `react/jsx-runtime` is external when `react`
/// is. `bundled` entries are never external unless a caller predicate says so.
#[derive(Clone, Default)]
pub struct External {
    ids: BTreeSet<String>,
    packages: BTreeSet<String>,
    bundled: BTreeSet<String>,
    predicate: Option<ExternalFn>,
}

impl External {
    /// Nothing is external.
    pub fn none() -> Self {
        Self::default()
    }

    /// Externals given explicitly by the caller.
    pub fn from_spec(spec: &ExternalSpec) -> Result<Self> {
        match spec {
            ExternalSpec::List(ids) => {
                if let Some(bad) = ids.iter().find(|id| id.trim().is_empty()) {
                    return Err(ConfigError::InvalidExternal {
                        message: format!("external module ids cannot be empty (got {bad:?})"),
                    });
                }
                Ok(Self {
                    ids: ids.iter().cloned().collect(),
                    ..Self::default()
                })
            }
            ExternalSpec::Predicate(predicate) => Ok(Self {
                predicate: Some(predicate.clone()),
                ..Self::default()
            }),
        }
    }

    /// Library-mode externals: the manifest's runtime dependencies, plus its
    /// peer dependencies when asked, minus anything forced into the bundle.
    pub fn from_manifest(manifest: &Manifest, include_peers: bool, force_include: &[String]) -> Self {
        let mut packages: BTreeSet<String> =
            manifest.runtime_dependencies().map(str::to_string).collect();
        if include_peers {
            packages.extend(manifest.peer_dependencies().map(str::to_string));
        }

        let bundled: BTreeSet<String> = force_include.iter().cloned().collect();
        packages.retain(|name| !bundled.contains(name));

        Self {
            packages,
            bundled,
            ..Self::default()
        }
    }

    /// Evaluate the predicate for an import.
    pub fn is_external(&self, source: &str, importer: Option<&str>, resolved: bool) -> bool {
        if self.ids.contains(source) {
            return true;
        }

        if let Some(package) = package_name(source) {
            if self.packages.contains(package) && !self.bundled.contains(package) {
                return true;
            }
        }

        self.predicate
            .as_ref()
            .is_some_and(|predicate| predicate(source, importer, resolved))
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && self.packages.is_empty() && self.predicate.is_none()
    }
}

/// Bare package name of an import specifier: `lodash/fp` -> `lodash`,
/// `@scope/pkg/sub` -> `@scope/pkg`. Relative and absolute paths have none.
pub(crate) fn package_name(source: &str) -> Option<&str> {
    if source.is_empty() || source.starts_with('.') || source.starts_with('/') {
        return None;
    }

    let mut segments = source.splitn(3, '/');
    let first = segments.next()?;
    if first.starts_with('@') {
        let second = segments.next()?;
        Some(&source[..first.len() + 1 + second.len()])
    } else {
        Some(first)
    }
}

impl fmt::Debug for External {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("External")
            .field("ids", &self.ids)
            .field("packages", &self.packages)
            .field("bundled", &self.bundled)
            .field("predicate", &self.predicate.as_ref().map(|_| ".."))
            .finish()
    }
}

impl Serialize for External {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("External", 4)?;
        state.serialize_field("ids", &self.ids)?;
        state.serialize_field("packages", &self.packages)?;
        state.serialize_field("bundled", &self.bundled)?;
        state.serialize_field("customPredicate", &self.predicate.is_some())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn manifest() -> Manifest {
        let mut manifest = Manifest::default();
        manifest.dependencies.insert("react".into(), "*".into());
        manifest.dependencies.insert("@emotion/css".into(), "^11".into());
        manifest.peer_dependencies.insert("react-dom".into(), "*".into());
        manifest
    }

    #[test]
    fn runtime_dependencies_are_external() {
        let external = External::from_manifest(&manifest(), false, &[]);
        assert!(external.is_external("react", None, false));
        assert!(external.is_external("react/jsx-runtime", Some("src/index.tsx"), false));
        assert!(external.is_external("@emotion/css", None, false));
        assert!(!external.is_external("left-pad", None, false));
        assert!(!external.is_external("./react", None, false));
    }

    #[test]
    fn peers_only_when_requested() {
        assert!(!External::from_manifest(&manifest(), false, &[]).is_external("react-dom", None, false));
        assert!(External::from_manifest(&manifest(), true, &[]).is_external("react-dom", None, false));
    }

    #[test]
    fn force_include_wins() {
        let external = External::from_manifest(&manifest(), false, &["react".to_string()]);
        assert!(!external.is_external("react", None, false));
        assert!(external.is_external("@emotion/css", None, false));
    }

    #[test]
    fn explicit_ids_match_exactly() {
        let external = External::from_spec(&ExternalSpec::List(vec!["lodash".into()])).unwrap();
        assert!(external.is_external("lodash", None, false));
        assert!(!external.is_external("lodash/fp", None, false));
    }

    #[test]
    fn empty_ids_are_rejected() {
        let err = External::from_spec(&ExternalSpec::List(vec!["react".into(), "  ".into()]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidExternal { .. }));
    }

    #[test]
    fn predicate_receives_import_context() {
        let external = External::from_spec(&ExternalSpec::Predicate(Arc::new(
            |source: &str, importer: Option<&str>, resolved: bool| {
                source.starts_with("node:") && importer.is_some() && !resolved
            },
        )))
        .unwrap();
        assert!(external.is_external("node:fs", Some("src/a.ts"), false));
        assert!(!external.is_external("node:fs", None, false));
    }

    #[test]
    fn package_names() {
        assert_eq!(package_name("react"), Some("react"));
        assert_eq!(package_name("lodash/fp"), Some("lodash"));
        assert_eq!(package_name("@scope/pkg/sub/path"), Some("@scope/pkg"));
        assert_eq!(package_name("@scope"), None);
        assert_eq!(package_name("../x"), None);
    }
}
