use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use once_cell::sync::Lazy;
use path_clean::PathClean;
use regex::Regex;
use serde_json::Value;

use super::ModuleIntrospector;
use crate::inject::is_valid_identifier;

/// `module.exports = require("./cjs/react.development.js")` chains followed at most this deep.
const MAX_REEXPORT_HOPS: usize = 4;

static CJS_ASSIGN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[^.\w$])(?:module\.)?exports\.([A-Za-z_$][\w$]*)\s*=[^=]")
        .expect("valid regex")
});

static CJS_DEFINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"Object\.defineProperty\(\s*(?:module\.)?exports\s*,\s*["']([A-Za-z_$][\w$]*)["']"#)
        .expect("valid regex")
});

static CJS_OBJECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"module\.exports\s*=\s*\{([^{}]*)\}").expect("valid regex")
});

static CJS_REEXPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"module\.exports\s*=\s*require\(\s*["']([^"']+)["']\s*\)"#).expect("valid regex")
});

static ESM_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^\s*export\s+(?:async\s+)?(?:const|let|var|function\s*\*?|class)\s*([A-Za-z_$][\w$]*)",
    )
    .expect("valid regex")
});

static ESM_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*export\s*\{([^}]*)\}").expect("valid regex"));

/// Introspects installed packages by reading their entry file and scanning it
/// for CommonJS and ES module export forms.
///
/// This does not execute the package. Exports computed at runtime (loops over
/// objects, `Object.assign(module.exports, ...)`) are not seen.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeModulesIntrospector;

impl NodeModulesIntrospector {
    pub fn new() -> Self {
        Self
    }

    fn entry_file(package_dir: &Path) -> Result<PathBuf, String> {
        if !package_dir.is_dir() {
            return Err(format!("cannot find module '{}'", package_dir.display()));
        }

        let main = match fs::read_to_string(package_dir.join("package.json")) {
            Ok(content) => serde_json::from_str::<Value>(&content)
                .map_err(|e| format!("invalid package.json: {e}"))?
                .get("main")
                .and_then(Value::as_str)
                .map(str::to_string),
            Err(_) => None,
        };

        let main = main.unwrap_or_else(|| "index.js".to_string());
        resolve_file(&package_dir.join(main))
    }
}

impl ModuleIntrospector for NodeModulesIntrospector {
    fn exports(&self, package_dir: &Path) -> Result<Vec<String>, String> {
        let mut path = Self::entry_file(package_dir)?;
        let mut names = IndexSet::new();

        for _ in 0..=MAX_REEXPORT_HOPS {
            let source = fs::read_to_string(&path)
                .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
            collect_exports(&source, &mut names);

            let Some(target) = reexport_target(&source) else {
                break;
            };
            if !names.is_empty() || !target.starts_with('.') {
                break;
            }

            let base = path.parent().unwrap_or(package_dir);
            path = resolve_file(&base.join(target))?;
        }

        Ok(names.into_iter().collect())
    }
}

/// Node's file resolution for a relative require: exact, `.js`, `/index.js`.
fn resolve_file(candidate: &Path) -> Result<PathBuf, String> {
    let candidate = candidate.clean();
    let with_ext = PathBuf::from(format!("{}.js", candidate.display()));
    let index = candidate.join("index.js");

    [candidate.clone(), with_ext, index]
        .into_iter()
        .find(|p| p.is_file())
        .ok_or_else(|| format!("cannot resolve '{}'", candidate.display()))
}

fn reexport_target(source: &str) -> Option<&str> {
    CJS_REEXPORT
        .captures(source)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn collect_exports(source: &str, names: &mut IndexSet<String>) {
    let mut push = |name: &str| {
        if name != "__esModule" && name != "default" && is_valid_identifier(name) {
            names.insert(name.to_string());
        }
    };

    for caps in CJS_ASSIGN.captures_iter(source) {
        push(&caps[1]);
    }
    for caps in CJS_DEFINE.captures_iter(source) {
        push(&caps[1]);
    }
    for caps in CJS_OBJECT.captures_iter(source) {
        for entry in caps[1].split(',') {
            let key = entry.split(':').next().unwrap_or_default().trim();
            push(key.trim_matches(|c| c == '"' || c == '\''));
        }
    }
    for caps in ESM_DECL.captures_iter(source) {
        push(&caps[1]);
    }
    for caps in ESM_LIST.captures_iter(source) {
        for entry in caps[1].split(',') {
            let exported = entry.rsplit(" as ").next().unwrap_or_default().trim();
            push(exported);
        }
    }
}
