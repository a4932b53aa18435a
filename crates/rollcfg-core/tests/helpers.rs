//! Shared fixtures for rollcfg-core integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use rollcfg_core::{ConfigRequest, EnvContext, ModuleIntrospector, OutputSpec};
use serde_json::Value;
use tempfile::TempDir;

/// Introspector for projects without an installed `node_modules`.
pub struct NothingInstalled;

impl ModuleIntrospector for NothingInstalled {
    fn exports(&self, package_dir: &Path) -> Result<Vec<String>, String> {
        Err(format!("cannot find module '{}'", package_dir.display()))
    }
}

/// A request rooted in `root` with an empty environment, so nothing from the
/// test process leaks in.
pub fn request_in(root: &Path) -> ConfigRequest {
    ConfigRequest::new("src/index.ts", OutputSpec::file("dist/index.js").with_format("es"))
        .with_root_dir(root)
        .with_env(EnvContext::new())
}

/// A temp project with the given `package.json`.
pub fn project_with_manifest(manifest: &Value) -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    fs::write(
        dir.path().join("package.json"),
        serde_json::to_string_pretty(manifest).expect("serialize manifest"),
    )
    .expect("write package.json");
    dir
}

/// Write `content` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent dir")).expect("create dirs");
    fs::write(path, content).expect("write file");
}
