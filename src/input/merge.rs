//! Deep merge of input layers.
//!
//! Objects are merged key by key, everything else (arrays, scalars and
//! `null`) is replaced by the later layer.

use serde_json::{Map, Value};

/// Deep merge two inputs, with `overlay` taking precedence over `base`.
///
/// Unlike a file-tier merge, `null` in the overlay is kept: it is a real
/// setting value.
///
/// # Example
/// ```
/// use serde_json::json;
/// use setset::input::deep_merge;
///
/// let base = json!({ "server": { "port": 8080, "host": "localhost" }, "tags": ["a"] });
/// let overlay = json!({ "server": { "port": 9000 }, "tags": ["b"] });
/// assert_eq!(
///     deep_merge(base, overlay),
///     json!({ "server": { "port": 9000, "host": "localhost" }, "tags": ["b"] })
/// );
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged_value = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged_value);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Merge layers in order, later layers winning. No layers yield `{}`.
pub fn merge_layers(layers: impl IntoIterator<Item = Value>) -> Value {
    layers.into_iter().fold(Value::Object(Map::new()), deep_merge)
}
