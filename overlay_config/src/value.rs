//! Backing-store primitives over [`serde_json::Value`].
//!
//! A layer's backing store is one nested [`Value`] addressed by paths of
//! string keys. Numeric segments index into arrays on read; writes only ever
//! traverse (and, where needed, materialise) objects.

use serde_json::{Map, Value};

/// Returns `true` when `value` is a plain object.
///
/// Arrays and `null` are deliberately excluded: schema object merges treat
/// them as "no contribution from this layer".
///
/// # Examples
///
/// ```rust
/// use overlay_config::value::is_plain_object;
/// use serde_json::json;
///
/// assert!(is_plain_object(&json!({"k": 1})));
/// assert!(!is_plain_object(&json!([1, 2])));
/// assert!(!is_plain_object(&json!(null)));
/// ```
#[must_use]
pub fn is_plain_object(value: &Value) -> bool {
    value.is_object()
}

/// Boolean coercion used by the boolean schema kind.
///
/// Mirrors dynamic-language truthiness: `null`, `0`, and the empty string
/// are falsy; containers are always truthy.
#[must_use]
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Walk `root` along `path`, returning the subtree it addresses.
///
/// Objects are traversed by key; arrays by numeric segment. Any other
/// intermediate value ends the walk with `None`.
pub(crate) fn get_path<'a>(root: &'a Value, path: &[String]) -> Option<&'a Value> {
    let mut current = root;
    for segment in path {
        match current {
            Value::Object(map) => current = map.get(segment)?,
            Value::Array(items) => {
                let index: usize = segment.parse().ok()?;
                current = items.get(index)?;
            }
            _ => return None,
        }
    }
    Some(current)
}

/// Write `value` under `key` at `path`, materialising structure as needed.
///
/// Every path segment that is missing, not an object, or an array is
/// replaced with a fresh object, so the write always lands.
pub(crate) fn write_path(root: &mut Value, path: &[String], key: &str, value: Value) {
    let mut cursor = root;
    for segment in path {
        if !cursor.is_object() {
            *cursor = Value::Object(Map::new());
        }
        let Some(map) = cursor.as_object_mut() else {
            return;
        };
        cursor = map
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    if !cursor.is_object() {
        *cursor = Value::Object(Map::new());
    }
    if let Some(map) = cursor.as_object_mut() {
        map.insert(key.to_owned(), value);
    }
}

/// Remove the value addressed by `segments`, pruning emptied containers.
///
/// After the removal, every intermediate object left empty is removed from
/// its own container in turn; pruning stops at the first container that is
/// still non-empty. Paths running through non-objects are a no-op.
pub(crate) fn delete_path(root: &mut Value, segments: &[String]) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };
    let Some(map) = root.as_object_mut() else {
        return;
    };
    if rest.is_empty() {
        map.remove(head);
        return;
    }
    if let Some(child) = map.get_mut(head) {
        delete_path(child, rest);
        if child.as_object().is_some_and(Map::is_empty) {
            map.remove(head);
        }
    }
}
