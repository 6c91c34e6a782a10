//! # Required Coverage Configuration
//!
//! The questionnaire has a canonical set of subsections and questions that
//! every activatable schema version must provide, regardless of how authors
//! rearrange the rest of the document. That set is deployment-specific, so it
//! is an explicit value injected into the build function rather than a
//! constant baked into the engine.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Map of required subsection id to the question ids that subsection must
/// register.
///
/// Insertion order is preserved so coverage diagnostics come out in a stable,
/// author-controlled order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequiredCoverage(IndexMap<String, Vec<String>>);

impl RequiredCoverage {
    /// An empty coverage map: no subsection or question is mandatory.
    pub fn none() -> Self {
        Self::default()
    }

    /// Add a required subsection and its required question ids.
    ///
    /// Calling twice for the same subsection replaces the earlier entry.
    pub fn require<S, I, Q>(mut self, subsection: S, questions: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = Q>,
        Q: Into<String>,
    {
        self.0.insert(
            subsection.into(),
            questions.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Iterate `(subsection id, required question ids)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(s, qs)| (s.as_str(), qs.as_slice()))
    }

    /// Whether nothing is required.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of required subsections.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}
