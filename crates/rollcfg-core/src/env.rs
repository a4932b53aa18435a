//! Environment-derived defaults.
//!
//! Nothing in the engine reads process environment variables directly. The
//! caller hands over an [`EnvContext`] snapshot (or lets the outermost entry
//! point take one), so two synthesis calls with different assumptions about
//! `NODE_ENV` can run side by side.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::request::{Production, SourceMapSetting};

/// Variable consulted when no explicit production flag is given.
pub const MODE_VAR: &str = "NODE_ENV";

/// Value of [`MODE_VAR`] that selects a production build.
pub const PRODUCTION_MODE: &str = "production";

/// Snapshot of environment variables visible to one synthesis call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvContext {
    vars: BTreeMap<String, String>,
}

impl EnvContext {
    /// An empty context: no mode, no variables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the current process environment. Variables that are not valid
    /// unicode are skipped.
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        }
    }

    /// Build a context from explicit pairs.
    ///
    /// ```
    /// use rollcfg_core::EnvContext;
    ///
    /// let env = EnvContext::from_pairs([("NODE_ENV", "production")]);
    /// assert!(env.is_production_mode());
    /// ```
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// The ambient build mode (`NODE_ENV`), if set.
    pub fn mode(&self) -> Option<&str> {
        self.get(MODE_VAR)
    }

    pub fn is_production_mode(&self) -> bool {
        self.mode() == Some(PRODUCTION_MODE)
    }
}

/// Concrete environment-derived settings for one synthesis call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentSettings {
    pub production: bool,
    pub minify: bool,
    pub sourcemap: SourceMapSetting,
    pub expose_env: Vec<String>,
}

/// Resolve production mode and the defaults that hang off it.
///
/// A predicate is invoked once with no arguments. Explicit `minify`,
/// `sourcemap` and `expose_env` values are kept as given; only missing ones
/// are derived (minify = production, sourcemap = !production,
/// expose_env = `["NODE_ENV"]`).
pub fn resolve_environment(
    production: Option<&Production>,
    minify: Option<bool>,
    sourcemap: Option<SourceMapSetting>,
    expose_env: Option<&[String]>,
    env: &EnvContext,
) -> EnvironmentSettings {
    let production = match production {
        Some(flag) => flag.evaluate(),
        None => env.is_production_mode(),
    };

    let settings = EnvironmentSettings {
        production,
        minify: minify.unwrap_or(production),
        sourcemap: sourcemap.unwrap_or(SourceMapSetting::Flag(!production)),
        expose_env: expose_env
            .map(<[String]>::to_vec)
            .unwrap_or_else(|| vec![MODE_VAR.to_string()]),
    };

    tracing::debug!(
        production = settings.production,
        minify = settings.minify,
        sourcemap = ?settings.sourcemap,
        "resolved environment settings"
    );

    settings
}
