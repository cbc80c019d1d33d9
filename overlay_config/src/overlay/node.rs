//! The virtual-view resolver walking a layer's store and its parent chain.

use std::collections::BTreeSet;
use std::rc::Rc;

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::OverlayResult;
use crate::schema::{Schema, SchemaKind, SchemaNode};
use crate::value::{self, is_plain_object};

use super::layer::{FieldCache, Layer};

/// Resolver node: one layer, one path into it, and the next-older layer's
/// node at the same path.
///
/// Nodes are only built by the overlay factory and by [`Node::child`], so
/// the parent chain is linear and acyclic by construction. Destroying a
/// node never touches its store or its ancestors.
#[derive(Debug)]
pub(crate) struct Node {
    layer: Rc<Layer>,
    parent: Option<Rc<Node>>,
    path: Vec<String>,
    schema: Option<Rc<Schema>>,
    context: Rc<Value>,
}

impl Node {
    pub(crate) fn new(
        layer: Rc<Layer>,
        parent: Option<Rc<Node>>,
        schema: Option<Rc<Schema>>,
        context: Rc<Value>,
    ) -> Self {
        Self {
            layer,
            parent,
            path: Vec::new(),
            schema,
            context,
        }
    }

    pub(crate) fn parent(&self) -> Option<Rc<Node>> {
        self.parent.clone()
    }

    pub(crate) fn path(&self) -> &[String] {
        &self.path
    }

    pub(crate) fn schema(&self) -> Option<Rc<Schema>> {
        self.schema.clone()
    }

    pub(crate) fn context(&self) -> Rc<Value> {
        self.context.clone()
    }

    pub(crate) fn label(&self) -> Option<&str> {
        self.layer.label.as_deref()
    }

    /// Number of layers reachable from this node, itself included.
    pub(crate) fn depth(&self) -> usize {
        let mut count = 1;
        let mut cursor = self.parent.as_deref();
        while let Some(node) = cursor {
            count += 1;
            cursor = node.parent.as_deref();
        }
        count
    }

    /// The node one key further down, with the parent chain and any member
    /// schema carried along.
    pub(crate) fn child(&self, key: &str) -> Rc<Node> {
        let mut path = self.path.clone();
        path.push(key.to_owned());
        Rc::new(Node {
            layer: self.layer.clone(),
            parent: self.parent.as_ref().map(|p| p.child(key)),
            path,
            schema: self.member(key).and_then(|m| m.nested()),
            context: self.context.clone(),
        })
    }

    fn member(&self, key: &str) -> Option<Rc<SchemaNode>> {
        self.schema.as_ref().and_then(|s| s.member(key))
    }

    fn with_own_subtree<R>(&self, f: impl FnOnce(Option<&Value>) -> R) -> R {
        let store = self.layer.store.borrow();
        f(value::get_path(&store, &self.path))
    }

    /// The node's own raw value for `key`; `None` unless the own subtree is
    /// a defined object carrying the key.
    fn own_value(&self, key: &str) -> Option<Value> {
        self.with_own_subtree(|subtree| match subtree {
            Some(Value::Object(map)) => map.get(key).cloned(),
            _ => None,
        })
    }

    /// The node's own unmerged backing value at its path.
    pub(crate) fn raw(&self) -> Option<Value> {
        self.with_own_subtree(|subtree| subtree.cloned())
    }

    /// Set union of own-subtree keys across the whole chain, sorted.
    pub(crate) fn keys(&self) -> Vec<String> {
        let mut found = BTreeSet::new();
        let mut cursor = Some(self);
        while let Some(node) = cursor {
            node.with_own_subtree(|subtree| {
                if let Some(Value::Object(map)) = subtree {
                    found.extend(map.keys().cloned());
                }
            });
            cursor = node.parent.as_deref();
        }
        found.into_iter().collect()
    }

    /// Whether any reachable own subtree defines `key`.
    pub(crate) fn contains(&self, key: &str) -> bool {
        let mut cursor = Some(self);
        while let Some(node) = cursor {
            let present = node.with_own_subtree(|subtree| {
                matches!(subtree, Some(Value::Object(map)) if map.contains_key(key))
            });
            if present {
                return true;
            }
            cursor = node.parent.as_deref();
        }
        false
    }

    /// Resolve `key` to its fully-merged value.
    ///
    /// Own values are preferred; absence falls through to the parent's
    /// resolved view. Plain objects on both sides deep-union per key, and
    /// declared fields run their schema merge, memoised per layer.
    pub(crate) fn materialize(&self, key: &str) -> OverlayResult<Option<Value>> {
        let next = self.own_value(key);
        let current = match &self.parent {
            Some(parent) => parent.materialize(key)?,
            None => None,
        };
        let resolved = match self.member(key) {
            Some(member) => self.merge_member(key, &member, current, next)?,
            None => match (next, current) {
                (Some(own), Some(inherited))
                    if is_plain_object(&own) && is_plain_object(&inherited) =>
                {
                    Some(self.union_child(key)?)
                }
                (Some(own), _) => Some(own),
                (None, inherited) => inherited,
            },
        };
        trace!(path = ?self.path, key, resolved = resolved.is_some(), "resolved field");
        Ok(resolved)
    }

    /// Schema-governed resolution for one declared member.
    ///
    /// Default object members resolve through the nested view so inherited
    /// undeclared keys union in; every other shape is a memoised whole-value
    /// merge whose absent outcome inherits `current`.
    fn merge_member(
        &self,
        key: &str,
        member: &Rc<SchemaNode>,
        current: Option<Value>,
        next: Option<Value>,
    ) -> OverlayResult<Option<Value>> {
        if member.kind() == SchemaKind::Object && !member.has_custom_merger() {
            return Ok(match next {
                Some(ref own) if is_plain_object(own) => Some(self.union_child(key)?),
                _ => current,
            });
        }

        let slot = (self.path.clone(), key.to_owned());
        if let Some(entry) = self.layer.cache.borrow().get(&slot) {
            if entry.inherited == current && entry.raw == next {
                trace!(path = ?self.path, key, "merge cache hit");
                return Ok(entry.merged.clone());
            }
        }
        let merged = member.merge(key, current.as_ref(), next.as_ref(), &self.context)?;
        let resolved = merged.or_else(|| current.clone());
        self.layer.cache.borrow_mut().insert(
            slot,
            FieldCache {
                inherited: current,
                raw: next,
                merged: resolved.clone(),
            },
        );
        Ok(resolved)
    }

    /// Deep union of the subtree under `key`: every key reachable from any
    /// layer, each resolved through the child node.
    fn union_child(&self, key: &str) -> OverlayResult<Value> {
        let child = self.child(key);
        let mut out = Map::new();
        for name in child.keys() {
            if let Some(resolved) = child.materialize(&name)? {
                out.insert(name, resolved);
            }
        }
        Ok(Value::Object(out))
    }

    /// Write `value` under `key`, auto-vivifying intermediate containers.
    pub(crate) fn set(&self, key: &str, value: Value) {
        debug!(label = self.label(), path = ?self.path, key, "set");
        value::write_path(&mut self.layer.store.borrow_mut(), &self.path, key, value);
        self.invalidate(key);
    }

    /// Remove `key` from the own store, pruning emptied containers.
    pub(crate) fn delete(&self, key: &str) {
        debug!(label = self.label(), path = ?self.path, key, "delete");
        let mut segments = self.path.clone();
        segments.push(key.to_owned());
        value::delete_path(&mut self.layer.store.borrow_mut(), &segments);
        self.invalidate(key);
    }

    /// Drop memo entries at, below, or above the written location. Entries
    /// elsewhere stay valid; the equality check on read catches the rest.
    fn invalidate(&self, key: &str) {
        let mut target = self.path.clone();
        target.push(key.to_owned());
        self.layer.cache.borrow_mut().retain(|(path, field), _| {
            let mut slot = path.clone();
            slot.push(field.clone());
            !(slot.starts_with(&target) || target.starts_with(&slot))
        });
        trace!(path = ?self.path, key, "memo invalidated");
    }
}
