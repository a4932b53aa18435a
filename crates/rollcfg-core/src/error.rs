//! Error types for pipeline synthesis.

use std::path::PathBuf;

use thiserror::Error;

use crate::stage::StageKind;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Fatal synthesis errors. Any of these aborts the whole call.
#[derive(Debug, Error)]
pub enum ConfigError {
    // Manifest loading
    #[error("package.json not found at {path} and no manifest override was supplied")]
    ManifestNotFound { path: PathBuf },

    #[error("invalid manifest {path}: {message}")]
    InvalidManifest { path: PathBuf, message: String },

    // Injection prologue
    #[error("unable to inject value \"{name}\" as it's an invalid JS variable name")]
    InvalidInjectionName { name: String },

    // Stage binding
    #[error("invalid configuration for stage `{stage}`: {message}")]
    StageConfiguration { stage: String, message: String },

    #[error("invalid external option: {message}")]
    InvalidExternal { message: String },

    #[error("invalid config value for `{field}`{}", hint.as_ref().map(|h| format!(": {h}")).unwrap_or_default())]
    InvalidValue { field: String, hint: Option<String> },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn stage(kind: StageKind, message: impl Into<String>) -> Self {
        ConfigError::StageConfiguration {
            stage: kind.key().to_string(),
            message: message.into(),
        }
    }
}

/// A declared dependency that could not be introspected for named exports.
///
/// Never fatal: the build continues without named-export support for it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ExportDiscoveryFailure {
    pub package: String,
    pub reason: String,
}

impl std::fmt::Display for ExportDiscoveryFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "could not discover named exports for `{}`: {}",
            self.package, self.reason
        )
    }
}
