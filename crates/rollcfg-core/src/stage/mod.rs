//! Pipeline stages and their per-stage overrides.

mod binder;
mod kind;
mod overrides;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

pub use binder::{BoundStage, StageDefaults, bind_stage};
pub use kind::StageKind;
pub use overrides::{OverrideResolver, StageOverrides};

use crate::error::{ConfigError, Result};

/// A configured stage as handed to the bundler: plugin name plus options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stage {
    pub name: String,
    pub options: Value,
}

impl Stage {
    pub fn new(name: impl Into<String>, options: Value) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }
}

/// Creates a stage instance from its final, merged options.
///
/// The engine's own factory emits a plain descriptor; callers replace a stage
/// by supplying their own factory through [`StageOverride::Replace`].
pub trait StageFactory: Send + Sync {
    fn create(&self, kind: StageKind, options: Value) -> Result<Stage>;
}

impl<F> StageFactory for F
where
    F: Fn(StageKind, Value) -> Result<Stage> + Send + Sync,
{
    fn create(&self, kind: StageKind, options: Value) -> Result<Stage> {
        self(kind, options)
    }
}

/// Default factory: `{ name: <plugin name>, options }`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptorFactory;

impl StageFactory for DescriptorFactory {
    fn create(&self, kind: StageKind, options: Value) -> Result<Stage> {
        Ok(Stage::new(kind.plugin_name(), options))
    }
}

/// Caller override for one stage.
#[derive(Clone)]
pub enum StageOverride {
    /// Force the stage on with engine options, even if a derived setting
    /// would suppress it
    Enabled,
    /// Omit the stage entirely
    Disabled,
    /// Partial options deep-merged over the engine defaults; implies enabled
    Options(Value),
    /// Build the stage with a caller factory from the engine defaults; implies enabled
    Replace(Arc<dyn StageFactory>),
}

impl StageOverride {
    pub fn replace<F: StageFactory + 'static>(factory: F) -> Self {
        StageOverride::Replace(Arc::new(factory))
    }

    /// Parse the config-file form: `false`, `true`, an options object, or
    /// `null` for "no override".
    pub fn from_value(kind: StageKind, value: &Value) -> Result<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::Bool(false) => Ok(Some(StageOverride::Disabled)),
            Value::Bool(true) => Ok(Some(StageOverride::Enabled)),
            Value::Object(_) => Ok(Some(StageOverride::Options(value.clone()))),
            other => Err(ConfigError::stage(
                kind,
                format!("expected an options object or a boolean, found {}", type_name(other)),
            )),
        }
    }

    pub fn toggle(&self) -> StageToggle {
        match self {
            StageOverride::Disabled => StageToggle::Disabled,
            StageOverride::Enabled | StageOverride::Options(_) | StageOverride::Replace(_) => {
                StageToggle::Enabled
            }
        }
    }
}

impl fmt::Debug for StageOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageOverride::Enabled => f.write_str("Enabled"),
            StageOverride::Disabled => f.write_str("Disabled"),
            StageOverride::Options(options) => f.debug_tuple("Options").field(options).finish(),
            StageOverride::Replace(_) => f.write_str("Replace(..)"),
        }
    }
}

/// Whether a stage runs. Explicit states always dominate the derived one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageToggle {
    /// No caller opinion: the engine's derived default decides
    Derived,
    Enabled,
    Disabled,
}

impl StageToggle {
    pub fn resolve(self, derived_enabled: bool) -> bool {
        match self {
            StageToggle::Derived => derived_enabled,
            StageToggle::Enabled => true,
            StageToggle::Disabled => false,
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
