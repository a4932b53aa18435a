use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized, Toml},
};
use rollcfg_core::{ConfigRequest, Dotenv, EnvContext};
use serde_json::{Value, json};

use crate::cli::ResolveArgs;
use crate::error::{CliError, Result};

/// TOML request file looked up in the project root.
pub const TOML_FILE: &str = "rollcfg.toml";

/// JSON request file looked up in the project root.
pub const JSON_FILE: &str = "rollcfg.json";

/// Prefix of request environment variables. `__` separates nested keys.
pub const ENV_PREFIX: &str = "ROLLCFG_";

/// `ROLLCFG_*` variables that configure the tool rather than the request.
/// `ROLLCFG_LOG` sets the log level.
pub const IGNORED_ENV_KEYS: &[&str] = &["LOG"];

/// Entry used when no source names one.
pub const DEFAULT_INPUT: &str = "src/index.ts";

/// Load the request for `resolve` from every source.
///
/// Priority: CLI args > environment variables > JSON (or `--config`) > TOML.
/// The process environment is snapshotted here, extended with the project's
/// `.env` file, and handed to the engine.
pub fn load_request(args: &ResolveArgs) -> Result<ConfigRequest> {
    let root = match &args.root {
        Some(root) => root.clone(),
        None => std::env::current_dir()?,
    };

    let mut value = layered_request(&root, args)?;
    fill_defaults(&mut value, &root);
    tracing::debug!(root = %root.display(), "loaded request sources");

    let request = ConfigRequest::from_value(value)?;
    let project_root = request.root_dir.clone().unwrap_or(root);
    let env = with_dotenv(EnvContext::from_process(), &request.dotenv, &project_root)?;
    Ok(request.with_env(env))
}

/// Add the variables of the `.env` file selected by `dotenv`.
///
/// Variables already in `env` are kept unless the file is marked `override`.
/// A missing file is not an error.
pub(crate) fn with_dotenv(mut env: EnvContext, dotenv: &Dotenv, root: &Path) -> Result<EnvContext> {
    let Some(path) = dotenv.file(root) else {
        return Ok(env);
    };
    if !path.is_file() {
        tracing::debug!(path = %path.display(), "no .env file");
        return Ok(env);
    }

    let dotenv_error = |source: dotenvy::Error| CliError::Dotenv {
        path: path.clone(),
        source,
    };
    let replace = dotenv.overrides_existing();
    let mut loaded = 0usize;
    for entry in dotenvy::from_path_iter(&path).map_err(dotenv_error)? {
        let (key, value) = entry.map_err(dotenv_error)?;
        if replace || env.get(&key).is_none() {
            env = env.with_var(key, value);
            loaded += 1;
        }
    }

    tracing::debug!(path = %path.display(), loaded, "read .env file");
    Ok(env)
}

/// Merge the request sources into one JSON document.
pub(crate) fn layered_request(root: &Path, args: &ResolveArgs) -> Result<Value> {
    let mut figment = Figment::new();

    let toml_path = root.join(TOML_FILE);
    if toml_path.is_file() {
        figment = figment.merge(Toml::file(toml_path));
    }

    match &args.config {
        Some(path) => {
            let path = if path.is_absolute() {
                path.clone()
            } else {
                root.join(path)
            };
            if !path.is_file() {
                return Err(CliError::ConfigNotFound(path));
            }
            let is_toml = path.extension().is_some_and(|ext| ext == "toml");
            figment = if is_toml {
                figment.merge(Toml::file(path))
            } else {
                figment.merge(Json::file(path))
            };
        }
        None => {
            let json_path = root.join(JSON_FILE);
            if json_path.is_file() {
                figment = figment.merge(Json::file(json_path));
            }
        }
    }

    // ROLLCFG_IS_LIBRARY=true, ROLLCFG_PLUGINS__STRIP=false, ...
    figment = figment.merge(
        Env::prefixed(ENV_PREFIX)
            .ignore(IGNORED_ENV_KEYS)
            .lowercase(false)
            .map(|key| env_key_to_path(key.as_str()).into()),
    );

    figment = figment.merge(Serialized::defaults(args.overrides()));

    figment.extract::<Value>().map_err(CliError::from)
}

/// `PLUGINS__STRIP` -> `plugins.strip`, `IS_LIBRARY` -> `isLibrary`.
pub(crate) fn env_key_to_path(key: &str) -> String {
    key.split("__")
        .map(camel_case)
        .collect::<Vec<_>>()
        .join(".")
}

fn camel_case(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for (i, word) in segment.split('_').filter(|w| !w.is_empty()).enumerate() {
        let word = word.to_lowercase();
        if i == 0 {
            out.push_str(&word);
        } else {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.extend(first.to_uppercase());
                out.push_str(chars.as_str());
            }
        }
    }
    out
}

fn fill_defaults(value: &mut Value, root: &Path) {
    if !value.is_object() {
        *value = json!({});
    }
    let Some(object) = value.as_object_mut() else {
        return;
    };

    object
        .entry("input")
        .or_insert_with(|| json!(DEFAULT_INPUT));
    object
        .entry("output")
        .or_insert_with(|| json!({ "dir": "dist", "format": "es" }));

    let root_dir = match object.get("rootDir").and_then(Value::as_str) {
        Some(dir) if Path::new(dir).is_absolute() => PathBuf::from(dir),
        Some(dir) => root.join(dir),
        None => root.to_path_buf(),
    };
    object.insert("rootDir".into(), json!(root_dir.display().to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcfg_core::DotenvOptions;
    use std::fs;
    use tempfile::TempDir;

    fn project_with_dotenv(name: &str, content: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(name), content).unwrap();
        dir
    }

    #[test]
    fn env_keys_become_camel_case_paths() {
        assert_eq!(env_key_to_path("IS_LIBRARY"), "isLibrary");
        assert_eq!(env_key_to_path("PLUGINS__STRIP"), "plugins.strip");
        assert_eq!(env_key_to_path("REPLACE_SAFE__API_URL"), "replaceSafe.apiUrl");
        assert_eq!(env_key_to_path("MINIFY"), "minify");
    }

    #[test]
    fn defaults_fill_missing_entry_points() {
        let mut value = json!({ "output": [{ "file": "out.js" }] });
        fill_defaults(&mut value, Path::new("/work/app"));

        assert_eq!(value["input"], json!(DEFAULT_INPUT));
        assert_eq!(value["output"], json!([{ "file": "out.js" }]));
        assert_eq!(value["rootDir"], json!("/work/app"));
    }

    #[test]
    fn relative_root_dir_is_joined_to_root() {
        let mut value = json!({ "rootDir": "packages/ui" });
        fill_defaults(&mut value, Path::new("/work"));
        assert_eq!(value["rootDir"], json!("/work/packages/ui"));
    }

    #[test]
    fn dotenv_adds_missing_variables_only() {
        let dir = project_with_dotenv(".env", "API_URL=https://api.test\nNODE_ENV=production\n");
        let env = EnvContext::from_pairs([("NODE_ENV", "development")]);

        let env = with_dotenv(env, &Dotenv::default(), dir.path()).unwrap();

        assert_eq!(env.get("API_URL"), Some("https://api.test"));
        assert_eq!(env.get("NODE_ENV"), Some("development"));
    }

    #[test]
    fn dotenv_override_replaces_existing_variables() {
        let dir = project_with_dotenv("build.env", "NODE_ENV=production\n");
        let dotenv = Dotenv::Options(DotenvOptions {
            path: Some("build.env".into()),
            override_existing: true,
        });

        let env = with_dotenv(EnvContext::from_pairs([("NODE_ENV", "test")]), &dotenv, dir.path())
            .unwrap();

        assert!(env.is_production_mode());
    }

    #[test]
    fn disabled_or_missing_dotenv_leaves_env_alone() {
        let dir = project_with_dotenv(".env", "API_URL=x\n");
        let env = with_dotenv(EnvContext::new(), &Dotenv::Flag(false), dir.path()).unwrap();
        assert_eq!(env, EnvContext::new());

        let empty = TempDir::new().unwrap();
        let env = with_dotenv(EnvContext::new(), &Dotenv::default(), empty.path()).unwrap();
        assert_eq!(env, EnvContext::new());
    }

    #[test]
    fn malformed_dotenv_is_an_error() {
        let dir = project_with_dotenv(".env", "NOT A LINE\n");
        let err = with_dotenv(EnvContext::new(), &Dotenv::default(), dir.path()).unwrap_err();
        assert!(matches!(err, CliError::Dotenv { .. }));
    }
}
