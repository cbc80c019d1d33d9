//! Overlay views: the public face of the layered virtual-view resolver.
//!
//! Each layer wraps its own backing store; an [`Overlay`] presents the
//! merged result of that store and every older layer beneath it. Resolution
//! is lazy and pull-based: each read decides, per field, whether the layer's
//! own value stands, defers to the parent's already-resolved view, or runs
//! a schema merge over both.

mod layer;
mod node;
mod seed;

use std::rc::Rc;

use serde_json::Value;
use tracing::debug;

use crate::error::OverlayResult;
use crate::schema::Schema;

use layer::Layer;
use node::Node;
pub use seed::LayerSeed;

/// A virtual merged view over one layer and its ancestors.
///
/// Handles are cheap to clone and dispose; dropping a view never affects
/// its store or any ancestor layer.
///
/// # Examples
///
/// ```rust
/// use overlay_config::Overlay;
/// use serde_json::json;
///
/// let base = Overlay::create(json!({"k1": {"k2": "test"}}));
/// let over = Overlay::create_with_parent(json!({}), &base);
/// assert_eq!(over.to_json()?, json!({"k1": {"k2": "test"}}));
///
/// over.at("k1").set("k3", json!(true));
/// assert_eq!(base.to_json()?, json!({"k1": {"k2": "test"}}));
/// assert_eq!(over.to_json()?, json!({"k1": {"k2": "test", "k3": true}}));
/// # Ok::<_, std::sync::Arc<overlay_config::OverlayError>>(())
/// ```
#[derive(Clone, Debug)]
pub struct Overlay {
    node: Rc<Node>,
}

impl Overlay {
    /// Wrap a store (or governed object) as layer zero of a new chain.
    #[must_use]
    pub fn create(seed: impl Into<LayerSeed>) -> Self {
        Self::build(seed.into(), None)
    }

    /// Wrap a store as a new layer inheriting from `parent`.
    ///
    /// The chain stays strictly linear: the new layer's reads fall through
    /// to `parent`'s fully-resolved view, never to its raw store.
    #[must_use]
    pub fn create_with_parent(seed: impl Into<LayerSeed>, parent: &Self) -> Self {
        Self::build(seed.into(), Some(parent.node.clone()))
    }

    fn build(seed: LayerSeed, parent: Option<Rc<Node>>) -> Self {
        let (store, schema, context, label) = seed.into_parts();
        let schema = schema.or_else(|| parent.as_ref().and_then(|p| p.schema()));
        let context = context
            .map(Rc::new)
            .or_else(|| parent.as_ref().map(|p| p.context()))
            .unwrap_or_else(|| Rc::new(Value::Null));
        let node = Rc::new(Node::new(
            Rc::new(Layer::new(store, label)),
            parent,
            schema,
            context,
        ));
        debug!(
            depth = node.depth(),
            label = node.label(),
            governed = node.schema().is_some(),
            "overlay layer created"
        );
        Self { node }
    }

    /// Resolve `key` to its fully-merged value.
    ///
    /// The node's own value is preferred; absence falls through to the
    /// parent's resolved view (the parent's own chain is consulted in
    /// turn). Plain objects union per key across the chain, and declared
    /// fields run their schema merge lazily, memoised per layer.
    ///
    /// # Errors
    ///
    /// Propagates enum validation failures and custom-merger errors raised
    /// while resolving the field.
    pub fn get(&self, key: &str) -> OverlayResult<Option<Value>> {
        self.node.materialize(key)
    }

    /// The nested overlay-aware view under `key`.
    ///
    /// Explicit accessor replacing the original model's transparent nested
    /// proxies: the child view carries the parent chain and any member
    /// schema along, so nested reads and writes stay overlay-aware.
    #[must_use]
    pub fn at(&self, key: &str) -> Self {
        Self {
            node: self.node.child(key),
        }
    }

    /// Write `value` under `key` into this layer's own store.
    ///
    /// Intermediate path segments that are missing, not objects, or arrays
    /// are replaced with fresh objects; the write always succeeds and never
    /// touches any ancestor layer.
    pub fn set(&self, key: &str, value: Value) {
        self.node.set(key, value);
    }

    /// Remove `key` from this layer's own store, pruning intermediate
    /// containers left empty, up to the first non-empty one.
    pub fn delete(&self, key: &str) {
        self.node.delete(key);
    }

    /// Set union of keys across every reachable layer's own subtree,
    /// sorted. Key presence, not layer order, is what this reports.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.node.keys()
    }

    /// Whether any reachable layer's own subtree defines `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.node.contains(key)
    }

    /// Escape hatch: this node's own unmerged backing value at its path.
    #[must_use]
    pub fn raw(&self) -> Option<Value> {
        self.node.raw()
    }

    /// The view for the next-older layer, when one exists.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.node.parent().map(|node| Self { node })
    }

    /// Path of keys locating this view's subtree within its layer.
    #[must_use]
    pub fn path(&self) -> &[String] {
        self.node.path()
    }

    /// Number of layers stacked under this view, itself included.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.node.depth()
    }

    /// The schema governing this view's subtree, when one is attached.
    ///
    /// Explicit accessor replacing the original model's reserved-key
    /// convention for reaching the schema from a value.
    #[must_use]
    pub fn schema(&self) -> Option<Rc<Schema>> {
        self.node.schema()
    }

    /// The layer's diagnostic label, when one was given.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.node.label()
    }
}
