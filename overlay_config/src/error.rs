//! Error types produced by the overlay engine.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

/// Result alias used throughout the crate.
///
/// Errors are shared via [`Arc`] so a single failure can be surfaced from
/// several memoised read paths without cloning the error itself.
pub type OverlayResult<T> = Result<T, Arc<OverlayError>>;

/// Errors that can occur while declaring schemas or resolving merged views.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OverlayError {
    /// An incoming value was absent from an enum schema's allowed set.
    #[error("invalid enum value `{value}` for `{key}`: allowed values are {allowed}")]
    Validation {
        /// Field whose merge rejected the value.
        key: String,
        /// The offending value.
        value: Value,
        /// Rendered allowed set, for diagnostics.
        allowed: String,
    },

    /// A schema declaration used a kind tag outside the intrinsic set.
    #[error("`{kind}` is not an intrinsic schema kind")]
    UnsupportedKind {
        /// The unrecognized kind tag.
        kind: String,
    },

    /// A member declaration was structurally invalid.
    #[error("invalid member declaration `{field}`: {message}")]
    Declaration {
        /// Field being declared.
        field: String,
        /// Explanation of the misuse.
        message: String,
    },

    /// A merged snapshot could not be deserialised into the requested type.
    #[error("failed to deserialize merged snapshot: {0}")]
    Deserialize(#[from] Box<serde_json::Error>),
}

impl OverlayError {
    /// Construct an enum validation failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use overlay_config::OverlayError;
    /// use serde_json::json;
    ///
    /// let err = OverlayError::validation("mode", json!("c"), &[json!("a"), json!("b")]);
    /// assert!(matches!(err, OverlayError::Validation { .. }));
    /// ```
    #[must_use]
    pub fn validation(key: &str, value: Value, allowed: &[Value]) -> Self {
        let rendered = allowed
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        Self::Validation {
            key: key.to_owned(),
            value,
            allowed: rendered,
        }
    }

    /// Construct an enum validation failure already wrapped in an [`Arc`].
    #[must_use]
    pub fn validation_arc(key: &str, value: Value, allowed: &[Value]) -> Arc<Self> {
        Arc::new(Self::validation(key, value, allowed))
    }

    /// Construct an unsupported-kind failure for a declaration tag.
    #[must_use]
    pub fn unsupported_kind(kind: &str) -> Self {
        Self::UnsupportedKind {
            kind: kind.to_owned(),
        }
    }

    /// Construct a declaration-misuse failure.
    #[must_use]
    pub fn declaration(field: &str, message: &str) -> Self {
        Self::Declaration {
            field: field.to_owned(),
            message: message.to_owned(),
        }
    }
}

impl From<serde_json::Error> for OverlayError {
    fn from(e: serde_json::Error) -> Self {
        Self::Deserialize(Box::new(e))
    }
}

/// Extension for mapping any `Result<T, E>` with `E: Into<OverlayError>`
/// into an [`OverlayResult<T>`].
pub trait OverlayResultExt<T, E> {
    /// Convert `Result<T, E>` into `OverlayResult<T>`.
    ///
    /// # Errors
    ///
    /// Propagates the original error after conversion into
    /// `Arc<OverlayError>`.
    fn into_overlay(self) -> OverlayResult<T>;
}

impl<T, E> OverlayResultExt<T, E> for Result<T, E>
where
    E: Into<OverlayError>,
{
    fn into_overlay(self) -> OverlayResult<T> {
        self.map_err(|e| Arc::new(e.into()))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{OverlayError, OverlayResultExt};

    #[test]
    fn validation_renders_allowed_set() {
        let err = OverlayError::validation("mode", json!("c"), &[json!("a"), json!("b")]);
        let text = err.to_string();
        assert!(text.contains("\"c\""));
        assert!(text.contains("\"a\", \"b\""));
    }

    #[test]
    fn serde_errors_convert_through_the_extension() {
        let broken: Result<u32, serde_json::Error> = serde_json::from_value(json!("nope"));
        let converted = broken.into_overlay();
        let err = converted.unwrap_err();
        assert!(matches!(err.as_ref(), OverlayError::Deserialize(_)));
    }
}
