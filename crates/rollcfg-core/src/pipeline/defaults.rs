//! Engine defaults for each pipeline stage.

use std::path::Path;

use serde_json::{Map, Value, json};

use crate::env::EnvironmentSettings;
use crate::error::{ConfigError, Result};
use crate::exports::NamedExports;
use crate::merge::resolve_layers;
use crate::request::{AliasEntry, Autoprefix, ConfigRequest, Framework};
use crate::stage::{StageDefaults, StageKind};

/// Statements stripped in production builds.
const STRIPPED_FUNCTIONS: &[&str] = &["console.*", "assert.*"];

/// Everything the stage defaults are derived from.
pub(crate) struct StageInputs<'a> {
    pub request: &'a ConfigRequest,
    pub settings: &'a EnvironmentSettings,
    pub root: &'a Path,
    pub prologue: &'a str,
    pub replacements: &'a Map<String, Value>,
    pub aliases: &'a [AliasEntry],
    pub named_exports: &'a NamedExports,
}

impl StageInputs<'_> {
    fn sourcemap(&self) -> bool {
        self.settings.sourcemap.is_enabled()
    }

    pub(crate) fn defaults(&self, kind: StageKind) -> Result<StageDefaults> {
        Ok(match kind {
            StageKind::Styles => StageDefaults::enabled(self.styles()),
            StageKind::Json => StageDefaults::enabled(json!({})),
            StageKind::Inject => StageDefaults::enabled(json!({ "intro": self.prologue })),
            StageKind::Replace => StageDefaults::enabled(self.replace()),
            StageKind::Alias => StageDefaults::enabled_if(
                !self.aliases.is_empty(),
                json!({ "entries": to_value(kind, self.aliases)? }),
            ),
            StageKind::Typescript => StageDefaults::enabled(self.typescript()),
            StageKind::Resolve => StageDefaults::enabled(self.resolve()?),
            StageKind::Commonjs => StageDefaults::enabled(json!({
                "namedExports": to_value(kind, self.named_exports)?,
                "sourceMap": self.sourcemap(),
            })),
            StageKind::Strip => StageDefaults::enabled_if(
                self.settings.production,
                json!({
                    "debugger": true,
                    "functions": STRIPPED_FUNCTIONS,
                    "sourceMap": self.sourcemap(),
                }),
            ),
            StageKind::Minify => StageDefaults::enabled_if(
                self.settings.minify,
                json!({ "sourcemap": self.sourcemap() }),
            ),
        })
    }

    fn styles(&self) -> Value {
        let mut styles = self.request.styles.options();
        // `styles.autoprefix` is accepted as a nested spelling of `autoprefix`
        let nested = styles
            .remove("autoprefix")
            .and_then(|v| serde_json::from_value::<Autoprefix>(v).ok());
        let autoprefix = self
            .request
            .autoprefix
            .clone()
            .or(nested)
            .unwrap_or(Autoprefix::Flag(true));

        let mut base = json!({
            "extract": true,
            "minimize": self.settings.minify,
            "sourceMap": self.sourcemap(),
        });

        let caller_plugins = styles.get("plugins").is_some_and(Value::is_array);
        if !caller_plugins {
            base["plugins"] = match autoprefix {
                Autoprefix::Flag(false) => json!([]),
                Autoprefix::Flag(true) => json!([{ "name": "autoprefixer" }]),
                Autoprefix::Options(options) => {
                    json!([{ "name": "autoprefixer", "options": options }])
                }
            };
        }

        resolve_layers([base, Value::Object(styles)])
    }

    fn replace(&self) -> Value {
        resolve_layers([
            Value::Object(self.request.replace_raw.clone()),
            json!({ "values": self.replacements }),
        ])
    }

    fn typescript(&self) -> Value {
        let mut base = json!({ "sourceMap": self.sourcemap() });

        match self.request.framework {
            Some(Framework::React) => {
                base["jsx"] = json!("react");
            }
            Some(Framework::Preact) => {
                base["jsx"] = json!("react");
                base["jsxFactory"] = json!("h");
            }
            None => {}
        }

        if self.request.library {
            base["declaration"] = json!(true);
        }

        resolve_layers([base, Value::Object(self.request.tsconfig.clone())])
    }

    fn resolve(&self) -> Result<Value> {
        Ok(resolve_layers([
            json!({ "rootDir": self.root.display().to_string() }),
            to_value(StageKind::Resolve, &self.request.resolve)?,
        ]))
    }
}

fn to_value<T: serde::Serialize + ?Sized>(kind: StageKind, value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| ConfigError::stage(kind, e.to_string()))
}
