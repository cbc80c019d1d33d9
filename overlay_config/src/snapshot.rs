//! Snapshot serialisation of merged views.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::trace;

use crate::error::{OverlayResult, OverlayResultExt};
use crate::overlay::Overlay;

impl Overlay {
    /// Flatten the current virtual view into a detached, JSON-compatible
    /// tree.
    ///
    /// The snapshot merges **eagerly**: every key reachable from any layer
    /// is resolved through the full overlay — schema merges included —
    /// before flattening, so the result never carries a stale or partially
    /// lazy field. Fields that resolve to absent are omitted. Mutating the
    /// returned tree has no effect on subsequent reads of the view.
    ///
    /// # Errors
    ///
    /// Propagates enum validation failures and custom-merger errors raised
    /// while resolving fields.
    pub fn to_json(&self) -> OverlayResult<Value> {
        let keys = self.keys();
        trace!(fields = keys.len(), "flattening merged view");
        let mut out = Map::new();
        for key in keys {
            if let Some(resolved) = self.get(&key)? {
                out.insert(key, resolved);
            }
        }
        Ok(Value::Object(out))
    }

    /// Deserialise the merged snapshot into a typed value.
    ///
    /// # Errors
    ///
    /// Propagates [`Overlay::to_json`] failures, and deserialisation
    /// failures as [`crate::OverlayError::Deserialize`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use overlay_config::Overlay;
    /// use serde::Deserialize;
    /// use serde_json::json;
    ///
    /// #[derive(Debug, Deserialize, PartialEq)]
    /// struct Limits {
    ///     burst: u32,
    ///     sustained: u32,
    /// }
    ///
    /// let defaults = Overlay::create(json!({"burst": 10, "sustained": 5}));
    /// let tuned = Overlay::create_with_parent(json!({"burst": 50}), &defaults);
    ///
    /// let limits: Limits = tuned.extract()?;
    /// assert_eq!(limits, Limits { burst: 50, sustained: 5 });
    /// # Ok::<_, std::sync::Arc<overlay_config::OverlayError>>(())
    /// ```
    pub fn extract<T: DeserializeOwned>(&self) -> OverlayResult<T> {
        serde_json::from_value(self.to_json()?).into_overlay()
    }
}
