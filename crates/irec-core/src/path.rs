//! # Structured Node Paths
//!
//! Locations inside a schema document are ordered lists of typed segments,
//! one per nesting level actually traversed. The legacy dotted rendering
//! (`sections[0].subSections[1].steps[0].questions[2]`) is preserved for
//! diagnostic display, but consumers assert on segment structure.

use std::fmt;

use serde::Serialize;

/// One level of a schema-tree location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "at")]
pub enum PathSegment {
    /// Index into the document's section list.
    Section(usize),
    /// Index into a section's subsection list.
    Subsection(usize),
    /// Index into a subsection's step list.
    Step(usize),
    /// Index into a step's question list.
    Question(usize),
    /// Index into a choice question's item list.
    Item(usize),
    /// The nested conditional question of a concrete item.
    Conditional,
    /// The repeated field of a fields-group question.
    Field,
    /// The companion add-question of a checkbox-array or fields-group.
    AddQuestion,
    /// A step's visibility condition.
    StepCondition,
    /// A calculated-field target, keyed by the target field id.
    CalculatedField(String),
    /// Index into a calculated field's ordered condition list.
    CalculatedCondition(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Section(i) => write!(f, "sections[{i}]"),
            Self::Subsection(i) => write!(f, "subSections[{i}]"),
            Self::Step(i) => write!(f, "steps[{i}]"),
            Self::Question(i) => write!(f, "questions[{i}]"),
            Self::Item(i) => write!(f, "items[{i}]"),
            Self::Conditional => write!(f, "conditional"),
            Self::Field => write!(f, "field"),
            Self::AddQuestion => write!(f, "addQuestion"),
            Self::StepCondition => write!(f, "condition"),
            Self::CalculatedField(id) => write!(f, "calculatedFields.{id}"),
            Self::CalculatedCondition(i) => write!(f, "[{i}]"),
        }
    }
}

/// An ordered path from the document root to one node.
///
/// Used as a mutable stack during traversal; cloned into each emitted error
/// so the error owns an immutable snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct NodePath(Vec<PathSegment>);

impl NodePath {
    /// The empty path, pointing at the document root.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Descend one level.
    pub fn push(&mut self, segment: PathSegment) {
        self.0.push(segment);
    }

    /// Ascend one level. Returns the segment left, if any.
    pub fn pop(&mut self) -> Option<PathSegment> {
        self.0.pop()
    }

    /// The typed segments, root first.
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Whether this path points at the document root.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Path with one more segment appended, leaving `self` untouched.
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut next = self.clone();
        next.push(segment);
        next
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "(root)");
        }
        for (i, segment) in self.0.iter().enumerate() {
            // CalculatedCondition renders as a bare index suffix.
            if i > 0 && !matches!(segment, PathSegment::CalculatedCondition(_)) {
                write!(f, ".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromIterator<PathSegment> for NodePath {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_legacy_dotted_form() {
        let path: NodePath = [
            PathSegment::Section(0),
            PathSegment::Subsection(1),
            PathSegment::Step(0),
            PathSegment::Question(2),
        ]
        .into_iter()
        .collect();
        assert_eq!(path.to_string(), "sections[0].subSections[1].steps[0].questions[2]");
    }

    #[test]
    fn renders_calculated_condition_as_index_suffix() {
        let path: NodePath = [
            PathSegment::Section(0),
            PathSegment::Subsection(0),
            PathSegment::CalculatedField("totalRisk".into()),
            PathSegment::CalculatedCondition(1),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            path.to_string(),
            "sections[0].subSections[0].calculatedFields.totalRisk[1]"
        );
    }

    #[test]
    fn root_path_renders_placeholder() {
        assert_eq!(NodePath::root().to_string(), "(root)");
        assert!(NodePath::root().is_root());
    }

    #[test]
    fn push_pop_round_trip() {
        let mut path = NodePath::root();
        path.push(PathSegment::Section(3));
        path.push(PathSegment::Subsection(0));
        assert_eq!(path.segments().len(), 2);
        assert_eq!(path.pop(), Some(PathSegment::Subsection(0)));
        assert_eq!(path.segments(), &[PathSegment::Section(3)]);
    }
}
