//! Typed schemas and the merge protocol.
//!
//! A [`Schema`] declares, per field, how a layer's value combines with the
//! inherited value from its parent: replace, validate, deep-merge, or a
//! caller-supplied reduction. Schemas are declared once, independent of any
//! data, and attached to a layer chain through [`Schema::create`].

mod kind;
mod merger;
mod node;
mod object;

pub use kind::SchemaKind;
pub use merger::{MergeContext, MergeOutcome, Merger};
pub use node::SchemaNode;
pub use object::{Governed, Schema};
