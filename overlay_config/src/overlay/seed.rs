//! Layer seeds: what a new overlay layer is built from.

use std::rc::Rc;

use serde_json::Value;

use crate::schema::{Governed, Schema};

/// Ingredients for one overlay layer: the backing store, an optional
/// governing schema with its context, and a diagnostic label.
///
/// Plain [`Value`] stores and [`Governed`] objects convert into seeds, so
/// most call sites pass either directly to the overlay factory.
///
/// ```rust
/// use overlay_config::{LayerSeed, Overlay};
/// use serde_json::json;
///
/// let layer = Overlay::create(LayerSeed::from(json!({})).label("defaults"));
/// assert_eq!(layer.label(), Some("defaults"));
/// ```
#[derive(Debug)]
pub struct LayerSeed {
    store: Value,
    schema: Option<Rc<Schema>>,
    context: Option<Value>,
    label: Option<String>,
}

impl LayerSeed {
    /// Attach a diagnostic label, surfaced in tracing events.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub(crate) fn into_parts(self) -> (Value, Option<Rc<Schema>>, Option<Value>, Option<String>) {
        (self.store, self.schema, self.context, self.label)
    }
}

impl From<Value> for LayerSeed {
    fn from(store: Value) -> Self {
        Self {
            store,
            schema: None,
            context: None,
            label: None,
        }
    }
}

impl From<Governed> for LayerSeed {
    fn from(governed: Governed) -> Self {
        Self {
            store: governed.data,
            schema: Some(governed.schema),
            context: Some(governed.context),
            label: None,
        }
    }
}
