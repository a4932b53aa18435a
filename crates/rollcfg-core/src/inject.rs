//! Injection prologue: top-level `var` declarations prepended to the bundle.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::{ConfigError, Result};

/// Identifier name to the value it is declared with, in declaration order.
pub type InjectionMap = IndexMap<String, Value>;

/// Name the manifest version is injected under.
pub const BUILD_VERSION: &str = "BUILD_VERSION";

// ASCII only. `\w` in the regex crate matches unicode letters.
static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier pattern is valid"));

pub fn is_valid_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// Render `var <name> = <json>;` for every entry, in map order.
///
/// Fails on the first key that is not a valid identifier.
///
/// ```
/// use rollcfg_core::inject::{build_prologue, InjectionMap};
/// use serde_json::json;
///
/// let mut map = InjectionMap::new();
/// map.insert("BUILD_VERSION".into(), json!("1.0.0"));
/// assert_eq!(build_prologue(&map).unwrap(), "var BUILD_VERSION = \"1.0.0\";\n");
/// ```
pub fn build_prologue(map: &InjectionMap) -> Result<String> {
    let mut prologue = String::new();

    for (name, value) in map {
        if !is_valid_identifier(name) {
            return Err(ConfigError::InvalidInjectionName { name: name.clone() });
        }

        let literal = serde_json::to_string(value).map_err(|e| ConfigError::InvalidValue {
            field: format!("inject.{name}"),
            hint: Some(e.to_string()),
        })?;
        prologue.push_str("var ");
        prologue.push_str(name);
        prologue.push_str(" = ");
        prologue.push_str(&literal);
        prologue.push_str(";\n");
    }

    Ok(prologue)
}
