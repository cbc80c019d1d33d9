//! Intrinsic schema kinds and their declaration tags.

use std::fmt;
use std::str::FromStr;

use crate::error::OverlayError;

/// The closed set of intrinsic schema kinds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SchemaKind {
    /// Boolean-coerced flag.
    Boolean,
    /// Numeric value, replaced wholesale on merge.
    Number,
    /// String value, replaced wholesale on merge.
    String,
    /// Value validated against a fixed allowed set.
    Enum,
    /// Sequence, replaced wholesale on merge (`null` empties it).
    Array,
    /// Nested object with member-wise merge semantics.
    Object,
}

impl SchemaKind {
    /// The declaration tag for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Enum => "enum",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaKind {
    type Err = OverlayError;

    /// Parse a declaration tag.
    ///
    /// # Errors
    ///
    /// Returns [`OverlayError::UnsupportedKind`] for tags outside the
    /// intrinsic set; the failure surfaces at schema-definition time, not
    /// at merge time.
    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "boolean" => Ok(Self::Boolean),
            "number" => Ok(Self::Number),
            "string" => Ok(Self::String),
            "enum" => Ok(Self::Enum),
            "array" => Ok(Self::Array),
            "object" => Ok(Self::Object),
            other => Err(OverlayError::unsupported_kind(other)),
        }
    }
}
