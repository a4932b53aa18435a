#![cfg_attr(docsrs, feature(doc_cfg))]

//! # rollcfg-core
//!
//! Turns a handful of build intents plus a project's `package.json` into a
//! complete, ordered bundler pipeline configuration.
//!
//! The engine never builds anything. It resolves production mode from an
//! explicit flag or the environment, derives externals and compatibility
//! aliases from the manifest, discovers named exports of CommonJS packages,
//! generates an injection prologue, and binds every pipeline stage to its
//! options while honoring caller overrides.
//!
//! ## Quick Start
//!
//! ```no_run
//! use rollcfg_core::{ConfigRequest, EnvContext, OutputSpec, StageKind, StageOverride, synthesize};
//!
//! # fn main() -> Result<(), rollcfg_core::ConfigError> {
//! let request = ConfigRequest::new("src/index.ts", OutputSpec::file("dist/index.js").with_format("es"))
//!     .with_library(true)
//!     .with_stage(StageKind::Strip, StageOverride::Disabled)
//!     .with_env(EnvContext::from_pairs([("NODE_ENV", "production")]));
//!
//! let config = synthesize(&request)?;
//! assert!(config.external.is_external("react", None, false));
//! println!("{}", config.to_json_pretty()?);
//! # Ok(()) }
//! ```
//!
//! ## Logging
//!
//! The engine emits `tracing` events and installs no subscriber. Enable the
//! `logging` feature for [`init_logging`] when embedding in a binary.

pub mod env;
pub mod error;
pub mod exports;
pub mod inject;
pub mod manifest;
pub mod merge;
pub mod pipeline;
pub mod request;
pub mod stage;

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{LogLevel, init_logging, init_logging_from_env};

pub use env::{EnvContext, EnvironmentSettings, resolve_environment};
pub use error::{ConfigError, ExportDiscoveryFailure, Result};
pub use exports::{
    Discovery, ModuleIntrospector, NamedExports, NodeModulesIntrospector, discover_named_exports,
    merge_named_exports,
};
pub use inject::{InjectionMap, build_prologue, is_valid_identifier};
pub use manifest::{Manifest, load_manifest};
pub use merge::{merge_values, resolve_layers};
pub use pipeline::{External, PipelineConfig, ResolvedSettings, synthesize, synthesize_with};
pub use request::{
    AliasEntry, Autoprefix, ConfigRequest, Dotenv, DotenvOptions, ExternalSpec, Framework,
    InputSpec, OutputSpec, Outputs, Production, ResolveOptions, SourceMapMode, SourceMapSetting,
    StyleOptions,
};
pub use stage::{
    BoundStage, DescriptorFactory, Stage, StageDefaults, StageFactory, StageKind, StageOverride,
    StageOverrides, StageToggle, bind_stage,
};
