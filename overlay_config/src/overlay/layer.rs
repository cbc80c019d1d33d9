//! Per-layer state: the backing store and the merge memo cache.

use std::cell::RefCell;
use std::collections::HashMap;

use serde_json::Value;

/// Cache slot address: the owning node's path plus the field name.
pub(crate) type CacheSlot = (Vec<String>, String);

/// Memoised merge state for one declared field on one layer.
///
/// A cached entry is only served while both the freshly-resolved inherited
/// value and the layer's raw value still equal the recorded ones; value
/// equality stands in for the original pointer-identity check.
#[derive(Debug)]
pub(crate) struct FieldCache {
    pub(crate) inherited: Option<Value>,
    pub(crate) raw: Option<Value>,
    pub(crate) merged: Option<Value>,
}

/// One layer: its exclusively-owned backing store, the per-field memo
/// cache, and an optional label surfaced in tracing events.
#[derive(Debug)]
pub(crate) struct Layer {
    pub(crate) store: RefCell<Value>,
    pub(crate) cache: RefCell<HashMap<CacheSlot, FieldCache>>,
    pub(crate) label: Option<String>,
}

impl Layer {
    pub(crate) fn new(store: Value, label: Option<String>) -> Self {
        Self {
            store: RefCell::new(store),
            cache: RefCell::new(HashMap::new()),
            label,
        }
    }
}
