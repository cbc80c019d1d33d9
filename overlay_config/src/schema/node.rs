//! Schema node variants and their default merge semantics.

use std::fmt;
use std::rc::Rc;

use serde_json::{Map, Value, json};

use crate::error::{OverlayError, OverlayResult};
use crate::value::truthy;

use super::merger::{MergeContext, MergeOutcome, Merger};
use super::object::Schema;
use super::kind::SchemaKind;

/// One declared field's schema: a kind, its kind-specific payload, and an
/// optional custom merge function.
///
/// Nodes are created through [`Schema::set`] and friends; object-kind nodes
/// expose their nested [`Schema`] for further member declarations.
pub struct SchemaNode {
    kind: SchemaKind,
    values: Vec<Value>,
    object: Option<Rc<Schema>>,
    merger: Option<Merger>,
}

impl SchemaNode {
    pub(crate) fn primitive(kind: SchemaKind, merger: Option<Merger>) -> Self {
        Self {
            kind,
            values: Vec::new(),
            object: None,
            merger,
        }
    }

    pub(crate) fn enumeration(values: Vec<Value>, merger: Option<Merger>) -> Self {
        Self {
            kind: SchemaKind::Enum,
            values,
            object: None,
            merger,
        }
    }

    pub(crate) fn object(schema: Rc<Schema>, merger: Option<Merger>) -> Self {
        Self {
            kind: SchemaKind::Object,
            values: Vec::new(),
            object: Some(schema),
            merger,
        }
    }

    /// The node's intrinsic kind.
    #[must_use]
    pub const fn kind(&self) -> SchemaKind {
        self.kind
    }

    /// Allowed values of an enum node; empty for every other kind.
    #[must_use]
    pub fn allowed(&self) -> &[Value] {
        &self.values
    }

    /// The nested object schema of an object-kind node.
    #[must_use]
    pub fn nested(&self) -> Option<Rc<Schema>> {
        self.object.clone()
    }

    pub(crate) fn has_custom_merger(&self) -> bool {
        self.merger.is_some()
    }

    /// Declare a member on this node's nested object schema.
    ///
    /// Mirrors [`Schema::set`], so object members returned by a parent
    /// declaration stay configurable.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::Declaration`] when this node is not an
    /// object, and the same errors as [`Schema::set`] otherwise.
    pub fn set(&self, kind: &str, field: &str) -> OverlayResult<Rc<Self>> {
        self.nested_for(field)?.set(kind, field)
    }

    /// Declare a member with a custom merge function.
    ///
    /// # Errors
    ///
    /// Same as [`SchemaNode::set`].
    pub fn set_with(&self, kind: &str, field: &str, merger: Merger) -> OverlayResult<Rc<Self>> {
        self.nested_for(field)?.set_with(kind, field, merger)
    }

    /// Declare an enum member with its allowed values.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::Declaration`] when this node is not an
    /// object.
    pub fn set_enum(&self, field: &str, values: Vec<Value>) -> OverlayResult<Rc<Self>> {
        Ok(self.nested_for(field)?.set_enum(field, values))
    }

    fn nested_for(&self, field: &str) -> OverlayResult<Rc<Schema>> {
        self.object.clone().ok_or_else(|| {
            std::sync::Arc::new(OverlayError::declaration(
                field,
                &format!("`{}` schema nodes do not take members", self.kind),
            ))
        })
    }

    /// Render this node (and any nested members) as a JSON value.
    #[must_use]
    pub fn describe(&self) -> Value {
        let mut out = Map::new();
        out.insert("kind".to_owned(), json!(self.kind.as_str()));
        if self.kind == SchemaKind::Enum {
            out.insert("values".to_owned(), Value::Array(self.values.clone()));
        }
        if let Some(schema) = &self.object {
            out.insert("members".to_owned(), schema.describe_members());
        }
        Value::Object(out)
    }

    /// Run this node's merge function for `field`.
    ///
    /// `current` is the inherited value, fully resolved through the parent
    /// chain; `next` is the layer's raw value. Absent is distinct from
    /// `null` on both sides.
    pub(crate) fn merge(
        &self,
        field: &str,
        current: Option<&Value>,
        next: Option<&Value>,
        context: &Value,
    ) -> MergeOutcome {
        match &self.merger {
            Some(custom) => {
                let default = |cur: Option<Value>, nxt: Option<Value>| {
                    self.default_merge(field, cur.as_ref(), nxt.as_ref(), context)
                };
                custom(MergeContext {
                    field,
                    current,
                    next,
                    context,
                    default: &default,
                })
            }
            None => self.default_merge(field, current, next, context),
        }
    }

    fn default_merge(
        &self,
        field: &str,
        current: Option<&Value>,
        next: Option<&Value>,
        context: &Value,
    ) -> MergeOutcome {
        match self.kind {
            SchemaKind::Boolean => Ok(next.map(|v| Value::Bool(truthy(v)))),
            SchemaKind::Number | SchemaKind::String => Ok(next.cloned()),
            SchemaKind::Enum => match next {
                None => Ok(None),
                Some(v) if self.values.contains(v) => Ok(Some(v.clone())),
                Some(v) => Err(OverlayError::validation_arc(field, v.clone(), &self.values)),
            },
            SchemaKind::Array => Ok(match next {
                None => None,
                Some(Value::Null) => Some(Value::Array(Vec::new())),
                Some(v) => Some(v.clone()),
            }),
            SchemaKind::Object => self.default_object_merge(current, next, context),
        }
    }

    /// Member-wise object merge: each declared member's merge runs against
    /// the corresponding member values, and the result is written back onto
    /// a copy of `next`. Non-object `next` values contribute nothing.
    fn default_object_merge(
        &self,
        current: Option<&Value>,
        next: Option<&Value>,
        context: &Value,
    ) -> MergeOutcome {
        let Some(Value::Object(incoming)) = next else {
            return Ok(None);
        };
        let mut merged = incoming.clone();
        let Some(schema) = &self.object else {
            return Ok(Some(Value::Object(merged)));
        };
        for (name, member) in schema.members_snapshot() {
            let inherited = current.and_then(Value::as_object).and_then(|m| m.get(&name));
            match member.merge(&name, inherited, incoming.get(&name), context)? {
                Some(value) => {
                    merged.insert(name, value);
                }
                None => {
                    merged.remove(&name);
                }
            }
        }
        Ok(Some(Value::Object(merged)))
    }
}

impl fmt::Debug for SchemaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaNode")
            .field("kind", &self.kind)
            .field("values", &self.values)
            .field("object", &self.object)
            .field("custom_merger", &self.merger.is_some())
            .finish()
    }
}
