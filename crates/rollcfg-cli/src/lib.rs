//! rollcfg CLI - print resolved bundler pipeline configurations.
//!
//! - [`cli`] - clap argument definitions
//! - [`config`] - layered request loading (files, environment, flags)
//! - [`commands`] - `resolve` and `stages`
//! - [`error`] - CLI errors and their miette reports
//! - [`logger`] - tracing subscriber setup
//!
//! # Example
//!
//! ```rust,no_run
//! use rollcfg_cli::cli::ResolveArgs;
//! use rollcfg_cli::commands::resolve;
//!
//! let config = resolve::resolve(&ResolveArgs::default())?;
//! println!("{}", resolve::render(&config, true)?);
//! # Ok::<(), rollcfg_cli::CliError>(())
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result};
