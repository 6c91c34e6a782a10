//! # Payload Violation Kinds
//!
//! Classification tags for answer-payload validation failures. Callers branch
//! on the kind (e.g. to map onto API error codes); the human-readable message
//! lives alongside it in the engine's violation type.

use std::fmt;

use serde::Serialize;

/// The class of a single payload validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// A required answer is missing or empty.
    Required,
    /// The value has the wrong JSON shape for the question.
    WrongType,
    /// A string answer exceeds its maximum length.
    TooLong,
    /// An answer list has fewer entries than the configured minimum.
    TooFew,
    /// An answer list has more entries than the configured maximum.
    TooMany,
    /// A selected id is not among the question's items.
    NotAnItem,
    /// An entry object carries a key the question does not declare.
    UnknownKey,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Required => "required",
            Self::WrongType => "wrong_type",
            Self::TooLong => "too_long",
            Self::TooFew => "too_few",
            Self::TooMany => "too_many",
            Self::NotAnItem => "not_an_item",
            Self::UnknownKey => "unknown_key",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_snake_case() {
        let json = serde_json::to_string(&ViolationKind::NotAnItem).unwrap();
        assert_eq!(json, r#""not_an_item""#);
    }

    #[test]
    fn display_matches_serialized_form() {
        assert_eq!(ViolationKind::TooFew.to_string(), "too_few");
    }
}
