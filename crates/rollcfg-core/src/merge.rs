//! Layered option resolution.
//!
//! Every place the engine combines defaults with overrides (manifest fragments,
//! per-stage options, raw replacement maps) goes through these two functions so
//! that precedence is identical everywhere:
//!
//! - objects merge key-by-key, recursively
//! - arrays and scalars from the higher layer replace the lower value outright
//! - a non-object value receiving an object becomes a copy of that object

use serde_json::{Map, Value};

/// Merge `update` into `target`, `update` winning on conflicts.
pub fn merge_values(target: &mut Value, update: &Value) {
    match (target, update) {
        (Value::Object(base), Value::Object(layer)) => {
            for (key, value) in layer {
                match base.get_mut(key) {
                    Some(slot) => merge_values(slot, value),
                    None => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        // scalars, arrays, and objects landing on a non-object
        (slot, _) => *slot = update.clone(),
    }
}

/// Fold an ordered list of partial option objects, lowest precedence first.
///
/// # Example
///
/// ```
/// use rollcfg_core::merge::resolve_layers;
/// use serde_json::json;
///
/// let resolved = resolve_layers([
///     json!({ "extract": true, "plugins": ["a", "b"] }),
///     json!({ "plugins": ["c"] }),
/// ]);
/// assert_eq!(resolved, json!({ "extract": true, "plugins": ["c"] }));
/// ```
pub fn resolve_layers<I>(layers: I) -> Value
where
    I: IntoIterator<Item = Value>,
{
    let mut resolved = Value::Object(Map::new());
    for layer in layers {
        merge_values(&mut resolved, &layer);
    }
    resolved
}
