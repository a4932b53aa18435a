//! The caller-facing configuration request.
//!
//! A [`ConfigRequest`] carries the build intents. Every field except `input`
//! and `output` is optional; missing values are derived during synthesis from
//! the environment context and the manifest.

mod helpers;
mod types;

use std::path::PathBuf;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};

pub use types::{
    AliasEntry, Autoprefix, DOTENV_FILE, Dotenv, DotenvOptions, ExternalFn, ExternalSpec,
    Framework, InputSpec, OutputSpec, Outputs, Production, ResolveOptions, SourceMapMode,
    SourceMapSetting, StyleOptions,
};

use crate::env::EnvContext;
use crate::error::{ConfigError, Result};
use crate::stage::{StageKind, StageOverride, StageOverrides};
use helpers::default_true;
use types::deserialize_alias;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigRequest {
    pub input: InputSpec,

    pub output: Outputs,

    /// Explicit production flag. Falls back to `NODE_ENV` in the env context.
    #[serde(default, rename = "isProduction")]
    pub production: Option<Production>,

    /// Library mode: emit declarations and externalize runtime dependencies
    #[serde(default, rename = "isLibrary")]
    pub library: bool,

    /// Directory holding `package.json` and `node_modules` (default: cwd)
    #[serde(default)]
    pub root_dir: Option<PathBuf>,

    /// Manifest fragment merged over the on-disk `package.json`
    #[serde(default, rename = "packageJson")]
    pub manifest: Option<Value>,

    #[serde(default)]
    pub external: Option<ExternalSpec>,

    /// Dependencies bundled even in library mode
    #[serde(default)]
    pub force_include: Vec<String>,

    /// Treat `peerDependencies` as external in library mode too
    #[serde(default)]
    pub external_peer_dependencies: bool,

    /// Top-level variables declared in the injection prologue
    #[serde(default)]
    pub inject: IndexMap<String, Value>,

    /// Inject the manifest version as `BUILD_VERSION`
    #[serde(default)]
    pub inject_version: bool,

    #[serde(default)]
    pub expose_env: Option<Vec<String>>,

    /// Replacements whose values are JSON-encoded before substitution
    #[serde(default)]
    pub replace_safe: IndexMap<String, Value>,

    /// Options passed to the replace stage as-is
    #[serde(default)]
    pub replace_raw: Map<String, Value>,

    #[serde(default, deserialize_with = "deserialize_alias")]
    pub alias: Vec<AliasEntry>,

    #[serde(default)]
    pub minify: Option<bool>,

    #[serde(default)]
    pub sourcemap: Option<SourceMapSetting>,

    /// Extra packages to introspect for named exports
    #[serde(default)]
    pub missing_exports: Vec<String>,

    /// Named exports supplied by hand; wins over discovered ones
    #[serde(default)]
    pub named_exports: IndexMap<String, Vec<String>>,

    #[serde(default = "default_true")]
    pub allow_auto_config: bool,

    #[serde(default)]
    pub autoprefix: Option<Autoprefix>,

    /// Style stage switch, or options merged over its defaults
    #[serde(default)]
    pub styles: StyleOptions,

    /// Options merged over the TypeScript stage defaults
    #[serde(default)]
    pub tsconfig: Map<String, Value>,

    #[serde(default)]
    pub resolve: ResolveOptions,

    #[serde(default)]
    pub framework: Option<Framework>,

    #[serde(default)]
    pub globals: IndexMap<String, String>,

    /// `.env` loading for entry points that snapshot the environment
    #[serde(default)]
    pub dotenv: Dotenv,

    #[serde(default, rename = "plugins")]
    pub stages: StageOverrides,

    /// Environment snapshot. `None` means the process environment is captured
    /// when synthesis starts.
    #[serde(skip)]
    pub env: Option<EnvContext>,

    /// Pass-through fields copied to the finished configuration
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConfigRequest {
    pub fn new(input: impl Into<InputSpec>, output: impl Into<Outputs>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            production: None,
            library: false,
            root_dir: None,
            manifest: None,
            external: None,
            force_include: Vec::new(),
            external_peer_dependencies: false,
            inject: IndexMap::new(),
            inject_version: false,
            expose_env: None,
            replace_safe: IndexMap::new(),
            replace_raw: Map::new(),
            alias: Vec::new(),
            minify: None,
            sourcemap: None,
            missing_exports: Vec::new(),
            named_exports: IndexMap::new(),
            allow_auto_config: true,
            autoprefix: None,
            styles: StyleOptions::default(),
            tsconfig: Map::new(),
            resolve: ResolveOptions::default(),
            framework: None,
            globals: IndexMap::new(),
            dotenv: Dotenv::default(),
            stages: StageOverrides::default(),
            env: None,
            extra: Map::new(),
        }
    }

    /// Create from serde_json::Value (config files, APIs)
    ///
    /// # Example
    ///
    /// ```
    /// use rollcfg_core::ConfigRequest;
    /// use serde_json::json;
    ///
    /// let request = ConfigRequest::from_value(json!({
    ///     "input": "src/index.ts",
    ///     "output": { "file": "dist/index.js", "format": "es" },
    ///     "isLibrary": true,
    ///     "plugins": { "strip": false }
    /// }))
    /// .unwrap();
    /// assert!(request.library);
    /// ```
    pub fn from_value(value: Value) -> Result<Self> {
        let request: ConfigRequest =
            serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue {
                field: "request".to_string(),
                hint: Some(e.to_string()),
            })?;
        request.stages.validate()?;
        Ok(request)
    }

    pub fn with_production(mut self, production: bool) -> Self {
        self.production = Some(Production::Flag(production));
        self
    }

    pub fn with_production_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.production = Some(Production::when(predicate));
        self
    }

    pub fn with_library(mut self, library: bool) -> Self {
        self.library = library;
        self
    }

    pub fn with_root_dir(mut self, root: impl Into<PathBuf>) -> Self {
        self.root_dir = Some(root.into());
        self
    }

    pub fn with_manifest(mut self, fragment: Value) -> Self {
        self.manifest = Some(fragment);
        self
    }

    pub fn with_external<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.external = Some(ExternalSpec::List(ids.into_iter().map(Into::into).collect()));
        self
    }

    pub fn with_external_fn<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str, Option<&str>, bool) -> bool + Send + Sync + 'static,
    {
        self.external = Some(ExternalSpec::Predicate(Arc::new(predicate)));
        self
    }

    pub fn with_inject(mut self, name: impl Into<String>, value: Value) -> Self {
        self.inject.insert(name.into(), value);
        self
    }

    pub fn with_expose_env<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expose_env = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_alias(mut self, find: impl Into<String>, replacement: impl Into<String>) -> Self {
        self.alias.push(AliasEntry::new(find, replacement));
        self
    }

    pub fn with_minify(mut self, minify: bool) -> Self {
        self.minify = Some(minify);
        self
    }

    pub fn with_sourcemap(mut self, sourcemap: SourceMapSetting) -> Self {
        self.sourcemap = Some(sourcemap);
        self
    }

    pub fn with_stage(mut self, kind: StageKind, stage_override: StageOverride) -> Self {
        self.stages.set(kind, stage_override);
        self
    }

    pub fn with_stage_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(StageKind) -> Option<StageOverride> + Send + Sync + 'static,
    {
        self.stages.set_resolver(resolver);
        self
    }

    pub fn with_styles(mut self, styles: impl Into<StyleOptions>) -> Self {
        self.styles = styles.into();
        self
    }

    pub fn with_dotenv(mut self, dotenv: Dotenv) -> Self {
        self.dotenv = dotenv;
        self
    }

    /// Override implied by a request field rather than the `plugins` map.
    pub(crate) fn implied_override(&self, kind: StageKind) -> Option<StageOverride> {
        match kind {
            StageKind::Styles if self.styles.is_disabled() => Some(StageOverride::Disabled),
            _ => None,
        }
    }

    pub fn with_env(mut self, env: EnvContext) -> Self {
        self.env = Some(env);
        self
    }

    /// Snapshot the process environment now instead of at synthesis time.
    pub fn with_process_env(self) -> Self {
        self.with_env(EnvContext::from_process())
    }
}
