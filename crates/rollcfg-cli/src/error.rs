//! Error handling for the rollcfg CLI.
//!
//! [`CliError`] wraps engine, configuration-source, `.env` and I/O failures. `main`
//! converts it into a `miette` report through [`cli_error_to_miette`].

mod report;

use std::path::PathBuf;

use thiserror::Error;

pub use report::cli_error_to_miette;

#[derive(Debug, Error)]
pub enum CliError {
    /// Synthesis failed
    #[error(transparent)]
    Engine(#[from] rollcfg_core::ConfigError),

    /// A request source could not be read or merged
    #[error("failed to load request configuration: {0}")]
    Load(Box<figment::Error>),

    /// `--config` names a file that doesn't exist
    #[error("config file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// A `.env` file exists but could not be read or parsed
    #[error("failed to load {}: {source}", path.display())]
    Dotenv {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        CliError::Load(Box::new(err))
    }
}

pub type Result<T, E = CliError> = std::result::Result<T, E>;
