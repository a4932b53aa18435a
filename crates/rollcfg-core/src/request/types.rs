use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Entry point(s) handed to the bundler unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputSpec {
    Single(String),
    Multiple(Vec<String>),
    Named(IndexMap<String, String>),
}

impl From<&str> for InputSpec {
    fn from(value: &str) -> Self {
        InputSpec::Single(value.to_string())
    }
}

/// Source map emission: a flag, or one of the named modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceMapSetting {
    Flag(bool),
    Mode(SourceMapMode),
}

impl SourceMapSetting {
    /// Whether any source map is produced.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, SourceMapSetting::Flag(false))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMapMode {
    /// Emit maps without the `sourceMappingURL` comment
    Hidden,
    /// Embed maps as data URLs
    Inline,
}

/// One bundler output. Fields the engine doesn't model are kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Global name for iife/umd bundles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Package name to global variable for externals in iife/umd bundles
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub globals: IndexMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sourcemap: Option<SourceMapSetting>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OutputSpec {
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            file: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn dir(path: impl Into<String>) -> Self {
        Self {
            dir: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

/// A single output or a list of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Outputs {
    One(OutputSpec),
    Many(Vec<OutputSpec>),
}

impl Outputs {
    pub fn into_vec(self) -> Vec<OutputSpec> {
        match self {
            Outputs::One(output) => vec![output],
            Outputs::Many(outputs) => outputs,
        }
    }
}

impl From<OutputSpec> for Outputs {
    fn from(value: OutputSpec) -> Self {
        Outputs::One(value)
    }
}

/// Production flag, or a predicate evaluated once per synthesis call.
#[derive(Clone)]
pub enum Production {
    Flag(bool),
    Predicate(Arc<dyn Fn() -> bool + Send + Sync>),
}

impl Production {
    pub fn when<F>(predicate: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        Production::Predicate(Arc::new(predicate))
    }

    pub fn evaluate(&self) -> bool {
        match self {
            Production::Flag(flag) => *flag,
            Production::Predicate(predicate) => predicate(),
        }
    }
}

impl fmt::Debug for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Production::Flag(flag) => f.debug_tuple("Flag").field(flag).finish(),
            Production::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl<'de> Deserialize<'de> for Production {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        bool::deserialize(deserializer).map(Production::Flag)
    }
}

/// Caller predicate over `(source, importer, is_resolved)`.
pub type ExternalFn = Arc<dyn Fn(&str, Option<&str>, bool) -> bool + Send + Sync>;

/// Explicit externals: module ids, or a predicate.
#[derive(Clone)]
pub enum ExternalSpec {
    List(Vec<String>),
    Predicate(ExternalFn),
}

impl fmt::Debug for ExternalSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExternalSpec::List(ids) => f.debug_tuple("List").field(ids).finish(),
            ExternalSpec::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl<'de> Deserialize<'de> for ExternalSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<String>::deserialize(deserializer).map(ExternalSpec::List)
    }
}

/// Framework preset that adjusts JSX compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    React,
    Preact,
}

/// Module alias redirecting `find` imports to `replacement`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasEntry {
    pub find: String,
    pub replacement: String,
}

impl AliasEntry {
    pub fn new(find: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            find: find.into(),
            replacement: replacement.into(),
        }
    }
}

/// Accepts either `[{ find, replacement }]` or `{ find: replacement }`.
pub(crate) fn deserialize_alias<'de, D>(deserializer: D) -> Result<Vec<AliasEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum AliasForm {
        List(Vec<AliasEntry>),
        Map(IndexMap<String, String>),
    }

    Ok(match AliasForm::deserialize(deserializer)? {
        AliasForm::List(entries) => entries,
        AliasForm::Map(map) => map
            .into_iter()
            .map(|(find, replacement)| AliasEntry { find, replacement })
            .collect(),
    })
}

/// Autoprefixer for the style stage: on/off, or its options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Autoprefix {
    Flag(bool),
    Options(Map<String, Value>),
}

/// Style stage: `false` drops it, `true` keeps the defaults, an object is
/// merged over them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleOptions {
    Flag(bool),
    Options(Map<String, Value>),
}

impl Default for StyleOptions {
    fn default() -> Self {
        StyleOptions::Flag(true)
    }
}

impl StyleOptions {
    pub fn is_disabled(&self) -> bool {
        matches!(self, StyleOptions::Flag(false))
    }

    /// Caller options for the stage; empty for the flag forms.
    pub fn options(&self) -> Map<String, Value> {
        match self {
            StyleOptions::Options(options) => options.clone(),
            StyleOptions::Flag(_) => Map::new(),
        }
    }
}

impl From<Map<String, Value>> for StyleOptions {
    fn from(options: Map<String, Value>) -> Self {
        StyleOptions::Options(options)
    }
}

/// File name read by default when `.env` loading is on.
pub const DOTENV_FILE: &str = ".env";

/// `.env` loading: on/off, or a custom file.
///
/// The engine never reads the file itself. Entry points that build an
/// [`EnvContext`](crate::EnvContext) consult [`Dotenv::file`] and add the
/// variables they find.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dotenv {
    Flag(bool),
    Options(DotenvOptions),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DotenvOptions {
    /// File to read, relative to the project root (default `.env`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Let file values replace variables that are already set
    #[serde(default, rename = "override")]
    pub override_existing: bool,
}

impl Default for Dotenv {
    fn default() -> Self {
        Dotenv::Flag(true)
    }
}

impl Dotenv {
    /// The file to load for a project rooted at `root`, or `None` when off.
    pub fn file(&self, root: &Path) -> Option<PathBuf> {
        match self {
            Dotenv::Flag(false) => None,
            Dotenv::Flag(true) => Some(root.join(DOTENV_FILE)),
            Dotenv::Options(options) => Some(match &options.path {
                Some(path) => root.join(path),
                None => root.join(DOTENV_FILE),
            }),
        }
    }

    pub fn overrides_existing(&self) -> bool {
        matches!(self, Dotenv::Options(options) if options.override_existing)
    }
}

/// Options forwarded to the module-resolution stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_fields: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dedupe: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefer_builtins: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sourcemap_accepts_flags_and_modes() {
        let flag: SourceMapSetting = serde_json::from_value(json!(true)).unwrap();
        assert_eq!(flag, SourceMapSetting::Flag(true));

        let inline: SourceMapSetting = serde_json::from_value(json!("inline")).unwrap();
        assert_eq!(inline, SourceMapSetting::Mode(SourceMapMode::Inline));
        assert!(inline.is_enabled());
        assert!(!SourceMapSetting::Flag(false).is_enabled());

        assert!(serde_json::from_value::<SourceMapSetting>(json!("external")).is_err());
    }

    #[test]
    fn outputs_accept_one_or_many() {
        let one: Outputs = serde_json::from_value(json!({ "file": "dist/index.js" })).unwrap();
        assert_eq!(one.into_vec().len(), 1);

        let many: Outputs = serde_json::from_value(json!([
            { "file": "dist/index.js", "format": "es" },
            { "file": "dist/index.cjs", "format": "cjs", "exports": "named" }
        ]))
        .unwrap();
        let many = many.into_vec();
        assert_eq!(many.len(), 2);
        assert_eq!(many[1].extra["exports"], json!("named"));
    }

    #[test]
    fn production_deserializes_from_bool_only() {
        let flag: Production = serde_json::from_value(json!(true)).unwrap();
        assert!(flag.evaluate());
        assert!(serde_json::from_value::<Production>(json!("yes")).is_err());
    }

    #[test]
    fn styles_accept_flags_and_objects() {
        let off: StyleOptions = serde_json::from_value(json!(false)).unwrap();
        assert!(off.is_disabled());

        let on: StyleOptions = serde_json::from_value(json!(true)).unwrap();
        assert!(!on.is_disabled());
        assert!(on.options().is_empty());

        let options: StyleOptions = serde_json::from_value(json!({ "extract": false })).unwrap();
        assert_eq!(options.options()["extract"], json!(false));
    }

    #[test]
    fn dotenv_file_is_relative_to_root() {
        let root = Path::new("/work/app");
        assert_eq!(Dotenv::default().file(root), Some(root.join(".env")));
        assert_eq!(Dotenv::Flag(false).file(root), None);

        let custom: Dotenv =
            serde_json::from_value(json!({ "path": "config/.env.local", "override": true })).unwrap();
        assert_eq!(custom.file(root), Some(root.join("config/.env.local")));
        assert!(custom.overrides_existing());
        assert!(!Dotenv::default().overrides_existing());
    }

    #[test]
    fn alias_accepts_map_form() {
        #[derive(Deserialize)]
        struct Holder {
            #[serde(deserialize_with = "deserialize_alias")]
            alias: Vec<AliasEntry>,
        }

        let holder: Holder =
            serde_json::from_value(json!({ "alias": { "react": "preact/compat" } })).unwrap();
        assert_eq!(holder.alias, vec![AliasEntry::new("react", "preact/compat")]);
    }
}
