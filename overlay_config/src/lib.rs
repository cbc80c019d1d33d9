//! A layered overlay object model.
//!
//! Sparse override layers — each owning one nested backing store — stack
//! into a chain that presents a single virtual merged view. A typed
//! [`Schema`] governs, per field, how a layer's value combines with the
//! inherited value from its parent: replace, boolean-coerce, validate
//! against an enum, deep-merge, or a custom reduction composed over the
//! default. Resolution is lazy, memoised per field, and cheaply re-derived
//! on mutation; the whole tree is only materialised when a snapshot is
//! explicitly requested.
//!
//! The engine is single-threaded and synchronous by design: every operation
//! runs to completion over a bounded chain. Callers needing concurrent
//! mutation serialize access externally.
//!
//! # Example
//!
//! ```rust
//! use overlay_config::{Overlay, Schema};
//! use serde_json::json;
//!
//! let schema = Schema::new();
//! let section = schema.set("object", "k1")?;
//! section.set("array", "k2")?;
//!
//! let base = Overlay::create(schema.create(json!(null), json!({})));
//! let site = Overlay::create_with_parent(json!({"k1": {"k2": ["test"]}}), &base);
//! let run = Overlay::create_with_parent(json!({"k1": {"k2": null}}), &site);
//!
//! assert_eq!(site.at("k1").get("k2")?, Some(json!(["test"])));
//! // `null` empties an array field; an absent value would inherit instead.
//! assert_eq!(run.at("k1").get("k2")?, Some(json!([])));
//! assert_eq!(run.to_json()?, json!({"k1": {"k2": []}}));
//! # Ok::<_, std::sync::Arc<overlay_config::OverlayError>>(())
//! ```

mod error;
mod overlay;
mod schema;
mod snapshot;
pub mod value;

pub use error::{OverlayError, OverlayResult, OverlayResultExt};
pub use overlay::{LayerSeed, Overlay};
pub use schema::{Governed, MergeContext, MergeOutcome, Merger, Schema, SchemaKind, SchemaNode};
