//! # Question Model
//!
//! Pure data shapes for the Innovation Record questionnaire: a document is an
//! ordered tree of sections, subsections, steps and questions, with all
//! conditional logic and per-question validation rules expressed as data.
//! Nothing in this module validates anything; the structural checks live in
//! [`crate::build`] and the compiled answer validators in [`crate::rule`].
//!
//! ## Design Decision
//!
//! The six question kinds form an internally tagged serde enum keyed on the
//! `dataType` field of the source JSON. An unknown discriminant therefore
//! fails at the deserialization boundary, and every `match` over [`Question`]
//! is checked for exhaustiveness by the compiler, so a newly added kind
//! cannot be silently skipped by the validator factory.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─── Document tree ───────────────────────────────────────────────────

/// A whole schema document, as handed over by the versioned schema store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    /// Ordered top-level sections.
    pub sections: Vec<Section>,
}

/// A top-level grouping of subsections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Section identifier, unique among sections.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Ordered subsections.
    pub sub_sections: Vec<Subsection>,
}

/// The unit users answer and save step by step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subsection {
    /// Subsection identifier, unique across the document.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Ordered steps.
    pub steps: Vec<Step>,
    /// Derived values, keyed by target field id. Each target carries an
    /// ordered condition list evaluated first-match-wins against live
    /// answers.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub calculated_fields: IndexMap<String, Vec<CalculatedCondition>>,
    /// Whether document uploads are allowed while answering this subsection.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub has_files: bool,
}

/// One page of questions, optionally gated on an earlier answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Ordered questions shown on this step.
    pub questions: Vec<Question>,
    /// Visibility gate. The step is shown only when the referenced answer
    /// matches one of the listed option ids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

/// A reference to an earlier choice question plus an allowed-options subset.
///
/// An empty `options` list is a wildcard that matches any answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Id of the referenced question. Must point at a previously registered
    /// choice-bearing question.
    pub id: String,
    /// Allowed option ids; empty means always-match.
    #[serde(default)]
    pub options: Vec<String>,
}

/// A [`Condition`] plus the value its target field takes when it is the
/// first condition in the list to match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatedCondition {
    /// Id of the referenced question.
    pub id: String,
    /// Allowed option ids; empty means always-match.
    #[serde(default)]
    pub options: Vec<String>,
    /// Value the calculated field takes when this condition matches first.
    pub value: Value,
}

// ─── Questions ───────────────────────────────────────────────────────

/// The six question kinds, discriminated by the `dataType` JSON field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dataType", rename_all = "kebab-case")]
pub enum Question {
    /// Single-line free text.
    Text(TextQuestion),
    /// Multi-line free text with a symbolic length limit.
    Textarea(TextareaQuestion),
    /// Single selection from an item list.
    RadioGroup(RadioGroupQuestion),
    /// Multiple selection, optionally pairing each selection with a
    /// sub-answer.
    CheckboxArray(CheckboxArrayQuestion),
    /// Multiple selection from a long, searchable item list.
    AutocompleteArray(AutocompleteArrayQuestion),
    /// One field repeated as an array, with an optional companion question
    /// per repetition.
    FieldsGroup(FieldsGroupQuestion),
}

impl Question {
    /// The question's identifier.
    pub fn id(&self) -> &str {
        match self {
            Self::Text(q) => &q.id,
            Self::Textarea(q) => &q.id,
            Self::RadioGroup(q) => &q.id,
            Self::CheckboxArray(q) => &q.id,
            Self::AutocompleteArray(q) => &q.id,
            Self::FieldsGroup(q) => &q.id,
        }
    }

    /// The question's display label.
    pub fn label(&self) -> &str {
        match self {
            Self::Text(q) => &q.label,
            Self::Textarea(q) => &q.label,
            Self::RadioGroup(q) => &q.label,
            Self::CheckboxArray(q) => &q.label,
            Self::AutocompleteArray(q) => &q.label,
            Self::FieldsGroup(q) => &q.label,
        }
    }

    /// The configured validation rules, if any.
    pub fn validations(&self) -> Option<&ValidationConfig> {
        match self {
            Self::Text(q) => q.validations.as_ref(),
            Self::Textarea(q) => q.validations.as_ref(),
            Self::RadioGroup(q) => q.validations.as_ref(),
            Self::CheckboxArray(q) => q.validations.as_ref(),
            Self::AutocompleteArray(q) => q.validations.as_ref(),
            Self::FieldsGroup(q) => q.validations.as_ref(),
        }
    }

    /// The item list for choice-bearing kinds, `None` otherwise.
    pub fn items(&self) -> Option<&[Item]> {
        match self {
            Self::RadioGroup(q) => Some(&q.items),
            Self::CheckboxArray(q) => Some(&q.items),
            Self::AutocompleteArray(q) => Some(&q.items),
            Self::Text(_) | Self::Textarea(_) | Self::FieldsGroup(_) => None,
        }
    }

    /// Whether conditions may reference this question.
    pub fn is_choice(&self) -> bool {
        self.items().is_some()
    }

    /// The `dataType` tag as it appears in the source JSON.
    pub fn data_type(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Textarea(_) => "textarea",
            Self::RadioGroup(_) => "radio-group",
            Self::CheckboxArray(_) => "checkbox-array",
            Self::AutocompleteArray(_) => "autocomplete-array",
            Self::FieldsGroup(_) => "fields-group",
        }
    }
}

/// Single-line free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextQuestion {
    /// Question identifier, unique across the document.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Optional helper text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional validation rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validations: Option<ValidationConfig>,
}

/// Multi-line free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextareaQuestion {
    /// Question identifier, unique across the document.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Optional helper text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Symbolic maximum length, resolved through [`LengthLimit::chars`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_limit: Option<LengthLimit>,
    /// Optional validation rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validations: Option<ValidationConfig>,
}

/// Single selection from an item list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadioGroupQuestion {
    /// Question identifier, unique across the document.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Optional helper text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ordered selectable items.
    pub items: Vec<Item>,
    /// Optional validation rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validations: Option<ValidationConfig>,
}

/// Multiple selection with an optional per-selection sub-answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckboxArrayQuestion {
    /// Question identifier, unique across the document.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Optional helper text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ordered selectable items.
    pub items: Vec<Item>,
    /// Companion question turning each selection into a
    /// `{selection, subAnswer}` pair.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_question: Option<Box<Question>>,
    /// Optional validation rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validations: Option<ValidationConfig>,
}

/// Multiple selection from a long, searchable item list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutocompleteArrayQuestion {
    /// Question identifier, unique across the document.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Optional helper text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ordered selectable items.
    pub items: Vec<Item>,
    /// Optional validation rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validations: Option<ValidationConfig>,
}

/// One field repeated as an array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldsGroupQuestion {
    /// Question identifier, unique across the document.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Optional helper text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The repeated field.
    pub field: Box<Question>,
    /// Companion question asked once per repetition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_question: Option<Box<Question>>,
    /// Optional validation rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validations: Option<ValidationConfig>,
}

// ─── Items ───────────────────────────────────────────────────────────

/// One entry of a choice question's item list.
///
/// Untagged: the three shapes are disjoint on their required fields, so
/// serde picks the right variant from the keys present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Item {
    /// Borrow another question's item list instead of declaring one.
    FromAnswer(FromAnswerItem),
    /// Display-only divider. Carries no id and is exempt from uniqueness
    /// and reference checks.
    Separator(SeparatorItem),
    /// A selectable option.
    Option(ItemOption),
}

/// `{ "itemsFromAnswer": "<question id>" }` indirection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FromAnswerItem {
    /// Id of the question whose concrete items are borrowed.
    pub items_from_answer: String,
}

/// `{ "type": "separator" }` display marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeparatorItem {
    /// Always the literal string `separator`.
    #[serde(rename = "type")]
    pub marker: SeparatorMarker,
}

/// The only admitted value of a separator item's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeparatorMarker {
    /// The literal tag.
    #[serde(rename = "separator")]
    Separator,
}

/// A concrete, selectable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemOption {
    /// Option identifier, referenced by conditions and answers.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Follow-up question shown when this option is selected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<Box<Question>>,
}

// ─── Validation configuration ────────────────────────────────────────

/// Per-question validation rules, all optional.
///
/// `postcodeFormat` and `urlFormat` are carried as authoring metadata but
/// deliberately not enforced by the compiled validators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationConfig {
    /// Whether an answer must be present and non-empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_required: Option<bool>,
    /// Maximum string length in characters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Minimum entry count for list-shaped answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<ItemCountRule>,
    /// Maximum entry count for list-shaped answers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<ItemCountRule>,
    /// Metadata flag; not enforced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postcode_format: Option<bool>,
    /// Metadata flag; not enforced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_format: Option<bool>,
}

impl ValidationConfig {
    /// Whether the object declares no rule at all. A declared-but-empty
    /// `validations` object is a structural error.
    pub fn is_empty(&self) -> bool {
        self.is_required.is_none()
            && self.max_length.is_none()
            && self.min.is_none()
            && self.max.is_none()
            && self.postcode_format.is_none()
            && self.url_format.is_none()
    }

    /// Whether an answer is mandatory.
    pub fn required(&self) -> bool {
        self.is_required.unwrap_or(false)
    }
}

/// An entry-count bound with an optional author-supplied message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemCountRule {
    /// The bound itself.
    pub length: usize,
    /// Message shown instead of the generated one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

// ─── Textarea length limits ──────────────────────────────────────────

/// Symbolic textarea sizes, resolved to character counts at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthLimit {
    /// 200 characters.
    Xs,
    /// 500 characters.
    S,
    /// 1000 characters.
    M,
    /// 1500 characters.
    L,
    /// 2000 characters.
    Xl,
    /// 4000 characters.
    Xxl,
}

impl LengthLimit {
    /// The character count this symbolic size resolves to.
    pub fn chars(self) -> usize {
        match self {
            Self::Xs => 200,
            Self::S => 500,
            Self::M => 1000,
            Self::L => 1500,
            Self::Xl => 2000,
            Self::Xxl => 4000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn question_union_discriminates_on_data_type() {
        let question: Question = serde_json::from_value(json!({
            "dataType": "radio-group",
            "id": "hasEvidence",
            "label": "Do you have evidence?",
            "items": [
                { "id": "yes", "label": "Yes" },
                { "type": "separator" },
                { "id": "no", "label": "No" }
            ]
        }))
        .unwrap();
        assert_eq!(question.data_type(), "radio-group");
        assert_eq!(question.id(), "hasEvidence");
        let items = question.items().unwrap();
        assert!(matches!(items[1], Item::Separator(_)));
    }

    #[test]
    fn unknown_data_type_is_a_deserialization_error() {
        let result: Result<Question, _> = serde_json::from_value(json!({
            "dataType": "date-picker",
            "id": "when",
            "label": "When?"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn items_from_answer_parses_as_indirection() {
        let item: Item =
            serde_json::from_value(json!({ "itemsFromAnswer": "categories" })).unwrap();
        match item {
            Item::FromAnswer(from) => assert_eq!(from.items_from_answer, "categories"),
            other => panic!("expected FromAnswer, got {other:?}"),
        }
    }

    #[test]
    fn nested_conditional_question_round_trips() {
        let source = json!({
            "dataType": "checkbox-array",
            "id": "supportTypes",
            "label": "What support do you need?",
            "items": [
                {
                    "id": "other",
                    "label": "Other",
                    "conditional": {
                        "dataType": "text",
                        "id": "otherSupport",
                        "label": "Describe the support",
                        "validations": { "isRequired": true }
                    }
                }
            ]
        });
        let question: Question = serde_json::from_value(source.clone()).unwrap();
        assert_eq!(serde_json::to_value(&question).unwrap(), source);
    }

    #[test]
    fn empty_validations_object_is_detected() {
        let config: ValidationConfig = serde_json::from_value(json!({})).unwrap();
        assert!(config.is_empty());
        let config: ValidationConfig =
            serde_json::from_value(json!({ "maxLength": 100 })).unwrap();
        assert!(!config.is_empty());
    }

    #[test]
    fn length_limit_table() {
        let limit: LengthLimit = serde_json::from_value(json!("xl")).unwrap();
        assert_eq!(limit.chars(), 2000);
        assert_eq!(LengthLimit::Xs.chars(), 200);
        assert_eq!(LengthLimit::Xxl.chars(), 4000);
    }

    #[test]
    fn calculated_condition_carries_value() {
        let condition: CalculatedCondition = serde_json::from_value(json!({
            "id": "hasEvidence",
            "options": ["yes"],
            "value": "EVIDENCED"
        }))
        .unwrap();
        assert_eq!(condition.value, json!("EVIDENCED"));
        let wildcard: CalculatedCondition =
            serde_json::from_value(json!({ "id": "hasEvidence", "value": 0 })).unwrap();
        assert!(wildcard.options.is_empty());
    }
}
