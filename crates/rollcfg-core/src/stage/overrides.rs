use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use super::{StageKind, StageOverride};
use crate::error::{ConfigError, Result};

/// Override function consulted for stages without a typed entry.
pub type OverrideResolver = Arc<dyn Fn(StageKind) -> Option<StageOverride> + Send + Sync>;

/// All per-stage overrides of a request.
///
/// Lookup order for a stage: typed entry (set in code), then the resolver
/// function, then the raw config-file entry.
#[derive(Clone, Default, Deserialize)]
#[serde(from = "IndexMap<String, Value>")]
pub struct StageOverrides {
    typed: IndexMap<StageKind, StageOverride>,
    resolver: Option<OverrideResolver>,
    raw: IndexMap<String, Value>,
}

impl StageOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, kind: StageKind, stage_override: StageOverride) {
        self.typed.insert(kind, stage_override);
    }

    pub fn disable(&mut self, kind: StageKind) {
        self.set(kind, StageOverride::Disabled);
    }

    pub fn set_resolver<F>(&mut self, resolver: F)
    where
        F: Fn(StageKind) -> Option<StageOverride> + Send + Sync + 'static,
    {
        self.resolver = Some(Arc::new(resolver));
    }

    /// Record a config-file entry. Parsed lazily by [`StageOverrides::resolve`].
    pub fn insert_raw(&mut self, key: impl Into<String>, value: Value) {
        self.raw.insert(key.into(), value);
    }

    /// Reject raw entries that name no known stage, have the wrong shape, or
    /// name a stage another entry already configures (`minify` and `terser`).
    pub fn validate(&self) -> Result<()> {
        let mut seen: IndexMap<StageKind, &str> = IndexMap::new();
        for (key, value) in &self.raw {
            let kind: StageKind = key.parse()?;
            if let Some(first) = seen.insert(kind, key.as_str()) {
                return Err(ConfigError::stage(
                    kind,
                    format!("configured twice, as `{first}` and `{key}`"),
                ));
            }
            StageOverride::from_value(kind, value)?;
        }
        Ok(())
    }

    /// The caller's override for `kind`, if any.
    pub fn resolve(&self, kind: StageKind) -> Result<Option<StageOverride>> {
        if let Some(typed) = self.typed.get(&kind) {
            return Ok(Some(typed.clone()));
        }

        if let Some(resolved) = self.resolver.as_ref().and_then(|resolver| resolver(kind)) {
            return Ok(Some(resolved));
        }

        for (key, value) in &self.raw {
            if key.parse::<StageKind>().ok() == Some(kind) {
                return StageOverride::from_value(kind, value);
            }
        }

        Ok(None)
    }

    pub fn is_empty(&self) -> bool {
        self.typed.is_empty() && self.resolver.is_none() && self.raw.is_empty()
    }
}

impl From<IndexMap<String, Value>> for StageOverrides {
    fn from(raw: IndexMap<String, Value>) -> Self {
        Self {
            raw,
            ..Self::default()
        }
    }
}

impl fmt::Debug for StageOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageOverrides")
            .field("typed", &self.typed)
            .field("resolver", &self.resolver.as_ref().map(|_| ".."))
            .field("raw", &self.raw)
            .finish()
    }
}
