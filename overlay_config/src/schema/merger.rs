//! The functional contract every schema node's merge implements.

use std::rc::Rc;

use serde_json::Value;

use crate::error::OverlayResult;

/// Outcome of one merge invocation.
///
/// `Ok(None)` means the layer contributes nothing for the field, letting the
/// inherited value stand; `Ok(Some(value))` is the field's new resolved
/// value. Validation failures propagate as errors.
pub type MergeOutcome = OverlayResult<Option<Value>>;

/// A caller-supplied merge function for one declared field.
///
/// Receives the fully-resolved inherited value, the layer's raw value, and
/// the governed tree's context, plus the kind's default reducer to compose
/// with. See [`MergeContext`].
pub type Merger = Rc<dyn Fn(MergeContext<'_>) -> MergeOutcome>;

/// Arguments handed to every merge invocation.
///
/// Custom mergers can call [`MergeContext::merge`] to obtain the default
/// behaviour for their field's kind and post-process the result — the
/// extensibility seam of the schema engine.
///
/// ```rust
/// use std::rc::Rc;
/// use overlay_config::{MergeContext, Merger};
/// use serde_json::Value;
///
/// // Prefix the first element of the default-merged array.
/// let prefixing: Merger = Rc::new(|ctx: MergeContext<'_>| {
///     let mut merged = ctx.merge(ctx.current, ctx.next)?;
///     if let Some(Value::Array(items)) = merged.as_mut() {
///         if let Some(first) = items.first_mut() {
///             let text = first.as_str().unwrap_or_default().to_owned();
///             *first = Value::String(format!("test:{text}"));
///         }
///     }
///     Ok(merged)
/// });
/// # let _ = prefixing;
/// ```
pub struct MergeContext<'a> {
    /// Name of the field being merged, for diagnostics.
    pub field: &'a str,
    /// Inherited value, fully resolved through the parent chain.
    pub current: Option<&'a Value>,
    /// Raw value contributed by the layer under resolution.
    pub next: Option<&'a Value>,
    /// Opaque context attached to the governed tree.
    pub context: &'a Value,
    pub(crate) default: &'a dyn Fn(Option<Value>, Option<Value>) -> MergeOutcome,
}

impl MergeContext<'_> {
    /// Apply the field kind's default merge to the given pair.
    ///
    /// # Errors
    ///
    /// Propagates validation failures from the default merge (enum kinds).
    pub fn merge(&self, current: Option<&Value>, next: Option<&Value>) -> MergeOutcome {
        (self.default)(current.cloned(), next.cloned())
    }
}
