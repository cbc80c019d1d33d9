//! Object schemas: member declaration and governed-object creation.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::debug;

use crate::error::{OverlayError, OverlayResult};

use super::kind::SchemaKind;
use super::merger::Merger;
use super::node::SchemaNode;

/// An object schema: the member table governing one level of a tree.
///
/// Declared once, independent of any data, and attached to a layer chain by
/// seeding an overlay with [`Schema::create`]'s governed object.
///
/// # Examples
///
/// ```rust
/// use overlay_config::Schema;
///
/// let schema = Schema::new();
/// let section = schema.set("object", "section")?;
/// section.set("array", "entries")?;
/// section.set_enum("mode", vec!["fast".into(), "safe".into()])?;
/// # Ok::<_, std::sync::Arc<overlay_config::OverlayError>>(())
/// ```
#[derive(Default)]
pub struct Schema {
    members: RefCell<BTreeMap<String, Rc<SchemaNode>>>,
}

impl Schema {
    /// Create an empty object schema, shared for further declaration.
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Declare a member of the given intrinsic kind.
    ///
    /// Returns the created child node, itself further configurable when it
    /// is an object.
    ///
    /// # Errors
    ///
    /// [`OverlayError::UnsupportedKind`] for a tag outside the intrinsic
    /// set; [`OverlayError::Declaration`] for `"enum"`, which carries
    /// allowed values and is declared through [`Schema::set_enum`].
    pub fn set(&self, kind: &str, field: &str) -> OverlayResult<Rc<SchemaNode>> {
        self.set_node(kind, field, None)
    }

    /// Declare a member with a custom merge function.
    ///
    /// # Errors
    ///
    /// Same as [`Schema::set`].
    pub fn set_with(&self, kind: &str, field: &str, merger: Merger) -> OverlayResult<Rc<SchemaNode>> {
        self.set_node(kind, field, Some(merger))
    }

    /// Declare an enum member with its allowed values.
    pub fn set_enum(&self, field: &str, values: Vec<Value>) -> Rc<SchemaNode> {
        self.insert(field, SchemaNode::enumeration(values, None))
    }

    /// Declare an enum member with allowed values and a custom merger.
    pub fn set_enum_with(&self, field: &str, values: Vec<Value>, merger: Merger) -> Rc<SchemaNode> {
        self.insert(field, SchemaNode::enumeration(values, Some(merger)))
    }

    fn set_node(
        &self,
        kind: &str,
        field: &str,
        merger: Option<Merger>,
    ) -> OverlayResult<Rc<SchemaNode>> {
        let parsed: SchemaKind = kind.parse().map_err(Arc::new)?;
        let node = match parsed {
            SchemaKind::Enum => {
                return Err(Arc::new(OverlayError::declaration(
                    field,
                    "enum members carry allowed values; declare them with `set_enum`",
                )));
            }
            SchemaKind::Object => SchemaNode::object(Self::new(), merger),
            primitive => SchemaNode::primitive(primitive, merger),
        };
        Ok(self.insert(field, node))
    }

    fn insert(&self, field: &str, node: SchemaNode) -> Rc<SchemaNode> {
        debug!(field, kind = %node.kind(), "schema member declared");
        let shared = Rc::new(node);
        self.members
            .borrow_mut()
            .insert(field.to_owned(), shared.clone());
        shared
    }

    /// Look up a declared member.
    #[must_use]
    pub fn member(&self, field: &str) -> Option<Rc<SchemaNode>> {
        self.members.borrow().get(field).cloned()
    }

    pub(crate) fn members_snapshot(&self) -> Vec<(String, Rc<SchemaNode>)> {
        self.members
            .borrow()
            .iter()
            .map(|(name, node)| (name.clone(), node.clone()))
            .collect()
    }

    /// Render the schema tree as a JSON value.
    #[must_use]
    pub fn describe(&self) -> Value {
        json!({ "kind": SchemaKind::Object.as_str(), "members": self.describe_members() })
    }

    pub(crate) fn describe_members(&self) -> Value {
        let mut out = Map::new();
        for (name, node) in self.members_snapshot() {
            out.insert(name, node.describe());
        }
        Value::Object(out)
    }

    /// Materialise a governed object: this schema, a caller-supplied opaque
    /// context, and `initial` data carried verbatim (fields without a
    /// declaration pass through untouched).
    ///
    /// The result seeds an overlay layer whose declared fields merge
    /// lazily, per read, through this schema.
    #[must_use]
    pub fn create(self: &Rc<Self>, context: Value, initial: Value) -> Governed {
        Governed {
            schema: self.clone(),
            context,
            data: initial,
        }
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let members: Vec<String> = self.members.borrow().keys().cloned().collect();
        f.debug_struct("Schema").field("members", &members).finish()
    }
}

/// A schema-governed layer seed: schema, context, and initial data.
///
/// Produced by [`Schema::create`]; consumed by the overlay factory.
#[derive(Debug)]
pub struct Governed {
    pub(crate) schema: Rc<Schema>,
    pub(crate) context: Value,
    pub(crate) data: Value,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::error::OverlayError;

    use super::Schema;

    #[test]
    fn describe_renders_the_member_tree() {
        let schema = Schema::new();
        let section = schema.set("object", "k1").unwrap();
        section.set("array", "k2").unwrap();
        schema.set_enum("mode", vec![json!("a"), json!("b")]);

        assert_eq!(
            schema.describe(),
            json!({
                "kind": "object",
                "members": {
                    "k1": {
                        "kind": "object",
                        "members": { "k2": { "kind": "array" } }
                    },
                    "mode": { "kind": "enum", "values": ["a", "b"] }
                }
            })
        );
    }

    #[test]
    fn enum_declarations_require_set_enum() {
        let schema = Schema::new();
        let err = schema.set("enum", "mode").unwrap_err();
        assert!(matches!(err.as_ref(), OverlayError::Declaration { .. }));
    }

    #[test]
    fn members_are_rejected_on_non_object_nodes() {
        let schema = Schema::new();
        let list = schema.set("array", "items").unwrap();
        let err = list.set("string", "inner").unwrap_err();
        assert!(matches!(
            err.as_ref(),
            OverlayError::Declaration { field, .. } if field == "inner"
        ));
    }
}
