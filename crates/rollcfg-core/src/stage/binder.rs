use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::{DescriptorFactory, Stage, StageFactory, StageKind, StageOverride, StageToggle};
use crate::error::{ConfigError, Result};
use crate::merge::resolve_layers;

/// Engine defaults for one stage.
#[derive(Debug, Clone, PartialEq)]
pub struct StageDefaults {
    pub options: Value,
    /// Derived default: whether the stage runs when the caller says nothing
    pub enabled: bool,
}

impl StageDefaults {
    pub fn enabled(options: Value) -> Self {
        Self {
            options,
            enabled: true,
        }
    }

    /// Enabled only when `condition` holds (e.g. minify only when minifying).
    pub fn enabled_if(condition: bool, options: Value) -> Self {
        Self {
            options,
            enabled: condition,
        }
    }
}

enum Binding {
    Disabled,
    Ready {
        options: Value,
        factory: Arc<dyn StageFactory>,
    },
}

/// A stage whose options are final but which has not been created yet.
pub struct BoundStage {
    kind: StageKind,
    toggle: StageToggle,
    binding: Binding,
}

impl BoundStage {
    pub fn kind(&self) -> StageKind {
        self.kind
    }

    pub fn toggle(&self) -> StageToggle {
        self.toggle
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self.binding, Binding::Ready { .. })
    }

    /// Merged options, or `None` when the stage is disabled.
    pub fn options(&self) -> Option<&Value> {
        match &self.binding {
            Binding::Ready { options, .. } => Some(options),
            Binding::Disabled => None,
        }
    }

    /// Create the stage. `None` means the stage is omitted from the pipeline.
    pub fn instantiate(self) -> Result<Option<Stage>> {
        match self.binding {
            Binding::Disabled => Ok(None),
            Binding::Ready { options, factory } => factory.create(self.kind, options).map(Some),
        }
    }
}

impl fmt::Debug for BoundStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundStage")
            .field("kind", &self.kind)
            .field("toggle", &self.toggle)
            .field("options", &self.options())
            .finish()
    }
}

/// Combine engine defaults with the caller's override for `kind`.
///
/// An explicit disable always omits the stage. Any explicit enable (including
/// options or a replacement factory) runs it even if the derived default is
/// off. Without an override the derived default decides.
pub fn bind_stage(
    kind: StageKind,
    defaults: StageDefaults,
    stage_override: Option<StageOverride>,
) -> Result<BoundStage> {
    let toggle = stage_override
        .as_ref()
        .map(StageOverride::toggle)
        .unwrap_or(StageToggle::Derived);

    if !toggle.resolve(defaults.enabled) {
        tracing::debug!(stage = %kind, ?toggle, "stage disabled");
        return Ok(BoundStage {
            kind,
            toggle,
            binding: Binding::Disabled,
        });
    }

    let descriptor: Arc<dyn StageFactory> = Arc::new(DescriptorFactory);
    let (options, factory) = match stage_override {
        Some(StageOverride::Options(partial)) => {
            if !partial.is_object() {
                return Err(ConfigError::stage(kind, "override options must be an object"));
            }
            (resolve_layers([defaults.options, partial]), descriptor)
        }
        Some(StageOverride::Replace(factory)) => (defaults.options, factory),
        _ => (defaults.options, descriptor),
    };

    tracing::debug!(stage = %kind, ?toggle, "stage bound");
    Ok(BoundStage {
        kind,
        toggle,
        binding: Binding::Ready { options, factory },
    })
}
