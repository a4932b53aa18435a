//! Pipeline assembly: the single entry point of the engine.
//!
//! [`synthesize`] runs the resolution steps in dependency order and either
//! returns a complete [`PipelineConfig`] or fails as a whole. There is no
//! partial result and no caching; the same request against the same files
//! produces byte-identical JSON.

mod defaults;
mod external;

use std::path::{Path, PathBuf};

use path_clean::PathClean;
use serde::Serialize;
use serde_json::{Map, Value, json};

pub use external::External;

use crate::env::{EnvContext, EnvironmentSettings, resolve_environment};
use crate::error::{ConfigError, ExportDiscoveryFailure, Result};
use crate::exports::{
    ModuleIntrospector, NamedExports, NodeModulesIntrospector, discover_named_exports,
    merge_named_exports,
};
use crate::inject::{BUILD_VERSION, InjectionMap, build_prologue};
use crate::manifest::{Manifest, load_manifest};
use crate::request::{AliasEntry, ConfigRequest, InputSpec, OutputSpec};
use crate::stage::{Stage, StageKind, bind_stage};
use defaults::StageInputs;

/// Package whose presence turns on the React compatibility aliases.
pub const PREACT_PACKAGE: &str = "preact";

/// React import names redirected to Preact's compatibility layer. The
/// `test-utils` subpath comes first so it is not shadowed by `react-dom`.
pub const PREACT_COMPAT_ALIASES: &[(&str, &str)] = &[
    ("react", "preact/compat"),
    ("react-dom/test-utils", "preact/test-utils"),
    ("react-dom", "preact/compat"),
];

/// The finished bundler configuration.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineConfig {
    pub input: InputSpec,
    pub output: Vec<OutputSpec>,
    pub external: External,
    /// Enabled stages in pipeline order
    pub plugins: Vec<Stage>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,

    /// Intermediate results, kept for inspection
    #[serde(skip)]
    pub settings: ResolvedSettings,

    /// Non-fatal problems found along the way
    #[serde(skip)]
    pub diagnostics: Vec<ExportDiscoveryFailure>,
}

impl PipelineConfig {
    pub fn stage(&self, name: &str) -> Option<&Stage> {
        self.plugins.iter().find(|stage| stage.name == name)
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|stage| stage.name.as_str()).collect()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: Some(e.to_string()),
        })
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: Some(e.to_string()),
        })
    }
}

/// Concrete values every downstream step saw.
#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    pub environment: EnvironmentSettings,
    pub root_dir: PathBuf,
    pub manifest: Manifest,
    pub aliases: Vec<AliasEntry>,
    pub named_exports: NamedExports,
    pub prologue: String,
}

/// Synthesize a configuration, introspecting packages under `node_modules`.
///
/// When the request carries no [`EnvContext`], the process environment is
/// captured here, once.
///
/// # Example
///
/// ```no_run
/// use rollcfg_core::{ConfigRequest, OutputSpec, synthesize};
///
/// let request = ConfigRequest::new("src/index.ts", OutputSpec::file("dist/index.js"))
///     .with_library(true);
/// let config = synthesize(&request)?;
/// println!("{}", config.to_json_pretty()?);
/// # Ok::<(), rollcfg_core::ConfigError>(())
/// ```
pub fn synthesize(request: &ConfigRequest) -> Result<PipelineConfig> {
    synthesize_with(request, &NodeModulesIntrospector)
}

/// Synthesize a configuration with a caller-supplied module introspector.
pub fn synthesize_with(
    request: &ConfigRequest,
    introspector: &dyn ModuleIntrospector,
) -> Result<PipelineConfig> {
    let _span = tracing::debug_span!("synthesize").entered();

    let env = match &request.env {
        Some(env) => env.clone(),
        None => EnvContext::from_process(),
    };
    let root = resolve_root(request.root_dir.as_deref())?;

    // 1. production, minify and sourcemap defaults
    let settings = resolve_environment(
        request.production.as_ref(),
        request.minify,
        request.sourcemap,
        request.expose_env.as_deref(),
        &env,
    );

    // 2. manifest and externals
    let manifest = load_manifest(&root, request.manifest.as_ref())?;
    let external = match &request.external {
        Some(spec) => External::from_spec(spec)?,
        None if request.library => External::from_manifest(
            &manifest,
            request.external_peer_dependencies,
            &request.force_include,
        ),
        None => External::none(),
    };

    // 3. compatibility aliases
    let aliases = resolve_aliases(request, &manifest);

    // 4. named exports
    let discovery = discover_named_exports(
        &root,
        &manifest,
        request.allow_auto_config,
        &request.missing_exports,
        introspector,
    );
    let named_exports = merge_named_exports(discovery.exports, &request.named_exports);

    // 5. injection prologue and replacements
    let prologue = build_prologue(&injection_map(request, &settings, &manifest, &env))?;
    let replacements = replacement_values(request, &settings, &env)?;

    // 6. bind, 7. assemble
    let inputs = StageInputs {
        request,
        settings: &settings,
        root: &root,
        prologue: &prologue,
        replacements: &replacements,
        aliases: &aliases,
        named_exports: &named_exports,
    };

    request.stages.validate()?;
    let mut bound = Vec::with_capacity(StageKind::ALL.len());
    for kind in StageKind::ALL {
        let stage_override = match request.stages.resolve(kind)? {
            Some(explicit) => Some(explicit),
            None => request.implied_override(kind),
        };
        bound.push(bind_stage(kind, inputs.defaults(kind)?, stage_override)?);
    }

    let mut plugins = Vec::with_capacity(bound.len());
    for stage in bound {
        if let Some(stage) = stage.instantiate()? {
            plugins.push(stage);
        }
    }

    let output = request
        .output
        .clone()
        .into_vec()
        .into_iter()
        .map(|spec| resolve_output(spec, request, &settings))
        .collect();

    tracing::debug!(
        stages = plugins.len(),
        warnings = discovery.failures.len(),
        "pipeline assembled"
    );

    Ok(PipelineConfig {
        input: request.input.clone(),
        output,
        external,
        plugins,
        extra: request.extra.clone(),
        settings: ResolvedSettings {
            environment: settings,
            root_dir: root,
            manifest,
            aliases,
            named_exports,
            prologue,
        },
        diagnostics: discovery.failures,
    })
}

fn resolve_root(root_dir: Option<&Path>) -> Result<PathBuf> {
    match root_dir {
        Some(dir) if dir.is_absolute() => Ok(dir.clean()),
        Some(dir) => Ok(std::env::current_dir()?.join(dir).clean()),
        None => Ok(std::env::current_dir()?),
    }
}

/// Caller aliases, plus Preact compatibility aliases for keys the caller
/// left alone.
fn resolve_aliases(request: &ConfigRequest, manifest: &Manifest) -> Vec<AliasEntry> {
    let mut entries = request.alias.clone();

    if request.allow_auto_config && manifest.declares(PREACT_PACKAGE) {
        for (find, replacement) in PREACT_COMPAT_ALIASES {
            if !entries.iter().any(|entry| entry.find == *find) {
                tracing::debug!(find, replacement, "adding compatibility alias");
                entries.push(AliasEntry::new(*find, *replacement));
            }
        }
    }

    entries
}

fn exposed_env(settings: &EnvironmentSettings, env: &EnvContext) -> Map<String, Value> {
    settings
        .expose_env
        .iter()
        .filter_map(|name| env.get(name).map(|value| (name.clone(), json!(value))))
        .collect()
}

fn injection_map(
    request: &ConfigRequest,
    settings: &EnvironmentSettings,
    manifest: &Manifest,
    env: &EnvContext,
) -> InjectionMap {
    let mut map = request.inject.clone();
    map.insert(
        "process".to_string(),
        json!({ "env": exposed_env(settings, env) }),
    );

    if request.inject_version {
        let version = manifest.version.clone().map(Value::String).unwrap_or(Value::Null);
        map.insert(BUILD_VERSION.to_string(), version);
    }

    map
}

/// `process.env.X` for every exposed variable (empty string when unset),
/// then the caller's safe replacements. Values are JSON-encoded so they land
/// in the bundle as literals.
fn replacement_values(
    request: &ConfigRequest,
    settings: &EnvironmentSettings,
    env: &EnvContext,
) -> Result<Map<String, Value>> {
    let mut values = Map::new();

    for name in &settings.expose_env {
        let value = env.get(name).unwrap_or_default();
        values.insert(format!("process.env.{name}"), encode(name, &json!(value))?);
    }

    for (key, value) in &request.replace_safe {
        values.insert(key.clone(), encode(key, value)?);
    }

    Ok(values)
}

fn encode(field: &str, value: &Value) -> Result<Value> {
    serde_json::to_string(value)
        .map(Value::String)
        .map_err(|e| ConfigError::InvalidValue {
            field: field.to_string(),
            hint: Some(e.to_string()),
        })
}

fn resolve_output(
    mut spec: OutputSpec,
    request: &ConfigRequest,
    settings: &EnvironmentSettings,
) -> OutputSpec {
    let mut globals = request.globals.clone();
    globals.extend(spec.globals);
    spec.globals = globals;
    spec.sourcemap = spec.sourcemap.or(Some(settings.sourcemap));
    spec
}
