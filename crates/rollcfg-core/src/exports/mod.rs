//! Named-export discovery for packages the CommonJS interop stage cannot
//! analyze statically.
//!
//! Discovery goes through the [`ModuleIntrospector`] seam so the candidate
//! selection and warning policy can be exercised without a real
//! `node_modules` tree.

mod node_modules;

use std::path::Path;

use indexmap::{IndexMap, IndexSet};

pub use node_modules::NodeModulesIntrospector;

use crate::error::ExportDiscoveryFailure;
use crate::manifest::Manifest;

/// Package name to the symbol names it exports.
pub type NamedExports = IndexMap<String, Vec<String>>;

/// Packages known to ship CommonJS without analyzable named exports.
pub const ESM_NOT_SUPPORTED: &[&str] = &["react", "react-dom"];

/// Loads a package and reports its top-level export names.
pub trait ModuleIntrospector {
    /// `package_dir` is `<root>/node_modules/<name>`.
    fn exports(&self, package_dir: &Path) -> Result<Vec<String>, String>;
}

/// Result of a discovery pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Discovery {
    pub exports: NamedExports,
    /// One entry per declared candidate that failed to load
    pub failures: Vec<ExportDiscoveryFailure>,
}

/// Introspect every candidate package under `<root>/node_modules`.
///
/// Candidates are the built-in [`ESM_NOT_SUPPORTED`] list (when
/// `allow_auto_config` is set) followed by `extra`, deduplicated in order.
/// A failure is reported only when the package is declared in the manifest's
/// dependencies or devDependencies; undeclared packages were never expected
/// to be installed.
pub fn discover_named_exports(
    root: &Path,
    manifest: &Manifest,
    allow_auto_config: bool,
    extra: &[String],
    introspector: &dyn ModuleIntrospector,
) -> Discovery {
    let builtin: &[&str] = if allow_auto_config {
        ESM_NOT_SUPPORTED
    } else {
        &[]
    };
    let candidates: IndexSet<&str> = builtin
        .iter()
        .copied()
        .chain(extra.iter().map(String::as_str))
        .collect();

    let modules_dir = root.join("node_modules");
    let mut discovery = Discovery::default();

    for package in candidates {
        match introspector.exports(&modules_dir.join(package)) {
            Ok(names) => {
                tracing::debug!(package, count = names.len(), "discovered named exports");
                discovery.exports.insert(package.to_string(), names);
            }
            Err(reason) if manifest.declares(package) => {
                let failure = ExportDiscoveryFailure {
                    package: package.to_string(),
                    reason,
                };
                tracing::warn!("{failure}");
                discovery.failures.push(failure);
            }
            Err(reason) => {
                tracing::trace!(package, %reason, "skipping undeclared package");
            }
        }
    }

    discovery
}

/// Overlay caller-supplied named exports on discovered ones; caller wins.
pub fn merge_named_exports(discovered: NamedExports, custom: &NamedExports) -> NamedExports {
    let mut merged = discovered;
    for (package, names) in custom {
        merged.insert(package.clone(), names.clone());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::path::PathBuf;

    /// Serves canned export lists keyed by package directory name.
    #[derive(Default)]
    struct FakeIntrospector {
        packages: HashMap<String, Vec<String>>,
        visited: RefCell<Vec<PathBuf>>,
    }

    impl FakeIntrospector {
        fn with(mut self, name: &str, exports: &[&str]) -> Self {
            self.packages.insert(
                name.to_string(),
                exports.iter().map(|s| s.to_string()).collect(),
            );
            self
        }
    }

    impl ModuleIntrospector for FakeIntrospector {
        fn exports(&self, package_dir: &Path) -> Result<Vec<String>, String> {
            self.visited.borrow_mut().push(package_dir.to_path_buf());
            let name = package_dir
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default();
            self.packages
                .get(name)
                .cloned()
                .ok_or_else(|| format!("cannot find module '{name}'"))
        }
    }

    fn manifest_with_dev(dev: &[&str]) -> Manifest {
        let mut manifest = Manifest::default();
        for name in dev {
            manifest
                .dev_dependencies
                .insert(name.to_string(), "*".to_string());
        }
        manifest
    }

    #[test]
    fn records_exports_of_loadable_candidates() {
        let introspector = FakeIntrospector::default().with("react", &["Children", "useState"]);
        let discovery = discover_named_exports(
            Path::new("/project"),
            &manifest_with_dev(&["react"]),
            true,
            &[],
            &introspector,
        );

        assert_eq!(discovery.exports["react"], vec!["Children", "useState"]);
        assert!(!discovery.exports.contains_key("react-dom"));
        assert!(discovery.failures.is_empty());
        assert_eq!(
            introspector.visited.borrow()[0],
            PathBuf::from("/project/node_modules/react")
        );
    }

    #[test]
    fn undeclared_failures_are_silent() {
        let introspector = FakeIntrospector::default();
        let discovery =
            discover_named_exports(Path::new("/p"), &Manifest::default(), true, &[], &introspector);
        assert!(discovery.failures.is_empty());
        assert!(discovery.exports.is_empty());
    }

    #[test]
    fn declared_dev_dependency_failure_warns_once() {
        let introspector = FakeIntrospector::default();
        let discovery = discover_named_exports(
            Path::new("/p"),
            &manifest_with_dev(&["react-dom"]),
            true,
            &["react-dom".to_string()],
            &introspector,
        );

        assert_eq!(discovery.failures.len(), 1);
        assert_eq!(discovery.failures[0].package, "react-dom");
    }

    #[test]
    fn auto_config_off_only_uses_caller_list() {
        let introspector = FakeIntrospector::default()
            .with("react", &["createElement"])
            .with("legacy-lib", &["run"]);
        let discovery = discover_named_exports(
            Path::new("/p"),
            &Manifest::default(),
            false,
            &["legacy-lib".to_string()],
            &introspector,
        );

        assert_eq!(discovery.exports.keys().collect::<Vec<_>>(), vec!["legacy-lib"]);
        assert_eq!(introspector.visited.borrow().len(), 1);
    }

    #[test]
    fn caller_named_exports_win() {
        let mut discovered = NamedExports::new();
        discovered.insert("react".into(), vec!["a".into(), "b".into()]);
        discovered.insert("react-dom".into(), vec!["render".into()]);

        let mut custom = NamedExports::new();
        custom.insert("react".into(), vec!["only".into()]);
        custom.insert("left-pad".into(), vec!["default".into()]);

        let merged = merge_named_exports(discovered, &custom);
        assert_eq!(merged["react"], vec!["only"]);
        assert_eq!(merged["react-dom"], vec!["render"]);
        assert_eq!(merged["left-pad"], vec!["default"]);
    }
}
