use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Pipeline stages, in execution order.
///
/// The discriminants encode the order the assembler emits them in. Style
/// processing comes before any code transform, variable injection before the
/// module transforms that read injected names, resolution and interop before
/// minification, and minification last.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    /// PostCSS: style preprocessing, extraction, autoprefixing
    Styles = 0,
    /// JSON module imports
    Json = 10,
    /// Injection prologue declaring top-level variables
    Inject = 20,
    /// Compile-time string replacement (`process.env.*` and friends)
    Replace = 30,
    /// Module alias redirection
    Alias = 40,
    Typescript = 50,
    /// Node-style module resolution
    Resolve = 60,
    /// CommonJS interop with named exports
    Commonjs = 70,
    /// Removes debugger statements and console calls
    Strip = 80,
    Minify = 90,
}

impl StageKind {
    /// Every stage in pipeline order.
    pub const ALL: [StageKind; 10] = [
        StageKind::Styles,
        StageKind::Json,
        StageKind::Inject,
        StageKind::Replace,
        StageKind::Alias,
        StageKind::Typescript,
        StageKind::Resolve,
        StageKind::Commonjs,
        StageKind::Strip,
        StageKind::Minify,
    ];

    /// Key used in override maps and on the command line.
    pub fn key(self) -> &'static str {
        match self {
            StageKind::Styles => "styles",
            StageKind::Json => "json",
            StageKind::Inject => "inject",
            StageKind::Replace => "replace",
            StageKind::Alias => "alias",
            StageKind::Typescript => "typescript",
            StageKind::Resolve => "resolve",
            StageKind::Commonjs => "commonjs",
            StageKind::Strip => "strip",
            StageKind::Minify => "minify",
        }
    }

    /// Name of the bundler plugin that implements the stage.
    pub fn plugin_name(self) -> &'static str {
        match self {
            StageKind::Styles => "postcss",
            StageKind::Json => "json",
            StageKind::Inject => "inject-vars",
            StageKind::Replace => "replace",
            StageKind::Alias => "alias",
            StageKind::Typescript => "typescript",
            StageKind::Resolve => "node-resolve",
            StageKind::Commonjs => "commonjs",
            StageKind::Strip => "strip",
            StageKind::Minify => "terser",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for StageKind {
    type Err = ConfigError;

    /// Accepts the stage key or the plugin name (`"minify"` or `"terser"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        StageKind::ALL
            .into_iter()
            .find(|kind| kind.key() == wanted || kind.plugin_name() == wanted)
            .ok_or_else(|| ConfigError::StageConfiguration {
                stage: s.to_string(),
                message: format!(
                    "unknown stage, expected one of: {}",
                    StageKind::ALL.map(StageKind::key).join(", ")
                ),
            })
    }
}
