//! Request loading for the `resolve` command.
//!
//! Sources are layered with `figment` and handed to
//! [`rollcfg_core::ConfigRequest::from_value`], so file, environment and flag
//! spellings all use the request's camelCase field names.

mod loading;

pub use loading::{DEFAULT_INPUT, ENV_PREFIX, IGNORED_ENV_KEYS, JSON_FILE, TOML_FILE, load_request};
