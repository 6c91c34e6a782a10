//! # Question Validator Factory
//!
//! Compiles one [`Question`] into a [`FieldRule`]: an executable validator
//! honoring the question's data type and configured constraints. The `match`
//! over the question union is exhaustive, so adding a seventh question kind
//! is a compile error here rather than a runtime "unsupported dataType"
//! failure.
//!
//! Item-set membership works on *resolved* concrete item ids: the structural
//! pass has already substituted any `itemsFromAnswer` indirection and stored
//! the result in the activated index, which this module reads through the
//! [`ItemIndex`] seam.

use crate::model::{Item, ItemCountRule, Question, ValidationConfig};

/// Source of resolved concrete item ids, keyed by question id.
///
/// Implemented by the activated schema; tests supply a map.
pub trait ItemIndex {
    /// Resolved item ids of the referenced question; empty when unknown.
    fn item_ids(&self, question_id: &str) -> &[String];
}

impl ItemIndex for std::collections::HashMap<String, Vec<String>> {
    fn item_ids(&self, question_id: &str) -> &[String] {
        self.get(question_id).map_or(&[], Vec::as_slice)
    }
}

/// Selects the answer shape a compiled validator expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerMode {
    /// Default single-subsection validation.
    Single,
    /// Aggregated cross-version answer lists: a radio-group answer becomes
    /// an array of selected ids instead of one id. No other kind changes.
    MultipleAnswers,
}

/// An entry-count bound carried into a compiled rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountBound {
    /// The bound itself.
    pub length: usize,
    /// Author-supplied message overriding the generated one.
    pub message: Option<String>,
}

impl From<&ItemCountRule> for CountBound {
    fn from(rule: &ItemCountRule) -> Self {
        Self { length: rule.length, message: rule.error_message.clone() }
    }
}

/// One declared key of an entry object in an [`FieldRule::EntryList`].
#[derive(Debug, Clone, PartialEq)]
pub struct EntryField {
    /// The object key.
    pub key: String,
    /// Whether the key must be present in every entry.
    pub required: bool,
    /// The rule applied to the key's value when present.
    pub rule: Box<FieldRule>,
}

/// A compiled, composable answer validator.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRule {
    /// A free-form string with optional presence and length constraints.
    Text {
        /// Reject missing or empty answers.
        required: bool,
        /// Maximum length in characters.
        max_length: Option<usize>,
    },
    /// A single id drawn from a fixed item set.
    SingleChoice {
        /// Reject missing or empty answers.
        required: bool,
        /// The admitted item ids.
        items: Vec<String>,
    },
    /// An array of ids drawn from a fixed item set.
    ChoiceList {
        /// Reject missing or empty answer lists.
        required: bool,
        /// The admitted item ids.
        items: Vec<String>,
        /// Minimum entry count.
        min: Option<CountBound>,
        /// Maximum entry count.
        max: Option<CountBound>,
    },
    /// An array of free-form strings, each optional.
    FreeTextList,
    /// An array of objects with a fixed set of declared keys.
    EntryList {
        /// Minimum entry count.
        min: Option<CountBound>,
        /// The declared keys and their rules.
        fields: Vec<EntryField>,
    },
}

/// Compile one question into its answer validator.
pub fn compile(question: &Question, index: &dyn ItemIndex, mode: AnswerMode) -> FieldRule {
    match question {
        Question::Text(q) => FieldRule::Text {
            required: required(&q.validations),
            max_length: q.validations.as_ref().and_then(|v| v.max_length),
        },
        Question::Textarea(q) => FieldRule::Text {
            required: required(&q.validations),
            // The symbolic size wins over an explicit maxLength.
            max_length: q
                .length_limit
                .map(|limit| limit.chars())
                .or_else(|| q.validations.as_ref().and_then(|v| v.max_length)),
        },
        Question::RadioGroup(q) => {
            let items = concrete_ids(&q.items, index);
            match mode {
                AnswerMode::Single => FieldRule::SingleChoice {
                    required: required(&q.validations),
                    items,
                },
                AnswerMode::MultipleAnswers => FieldRule::ChoiceList {
                    required: required(&q.validations),
                    items,
                    min: None,
                    max: None,
                },
            }
        }
        Question::AutocompleteArray(q) => {
            let items = concrete_ids(&q.items, index);
            let max = q.validations.as_ref().and_then(|v| v.max.as_ref());
            if max.is_some_and(|rule| rule.length == 1) {
                // A one-entry maximum collapses to a single required
                // string, not an array of length one.
                FieldRule::SingleChoice { required: true, items }
            } else {
                FieldRule::ChoiceList {
                    required: required(&q.validations),
                    items,
                    min: q.validations.as_ref().and_then(|v| v.min.as_ref()).map(Into::into),
                    max: max.map(Into::into),
                }
            }
        }
        Question::CheckboxArray(q) => {
            let items = concrete_ids(&q.items, index);
            match &q.add_question {
                None => FieldRule::ChoiceList {
                    required: required(&q.validations),
                    items,
                    min: q.validations.as_ref().and_then(|v| v.min.as_ref()).map(Into::into),
                    max: q.validations.as_ref().and_then(|v| v.max.as_ref()).map(Into::into),
                },
                Some(add_question) => FieldRule::EntryList {
                    min: Some(CountBound { length: 1, message: None }),
                    fields: vec![
                        EntryField {
                            key: q.id.clone(),
                            required: true,
                            rule: Box::new(FieldRule::SingleChoice { required: true, items }),
                        },
                        EntryField {
                            key: add_question.id().to_string(),
                            required: false,
                            // The sub-answer stays optional even when the
                            // nested question is marked required: the user
                            // may not have reached it yet.
                            rule: Box::new(compile(add_question, index, AnswerMode::Single)),
                        },
                    ],
                },
            }
        }
        Question::FieldsGroup(q) => match &q.add_question {
            None => FieldRule::FreeTextList,
            Some(add_question) => FieldRule::EntryList {
                min: None,
                fields: vec![
                    EntryField {
                        key: q.field.id().to_string(),
                        required: q.field.validations().is_some_and(ValidationConfig::required),
                        rule: Box::new(compile(&q.field, index, AnswerMode::Single)),
                    },
                    EntryField {
                        key: add_question.id().to_string(),
                        required: false,
                        rule: Box::new(compile(add_question, index, AnswerMode::Single)),
                    },
                ],
            },
        },
    }
}

fn required(validations: &Option<ValidationConfig>) -> bool {
    validations.as_ref().is_some_and(ValidationConfig::required)
}

/// Concrete item ids of a question's own list, substituting indirections
/// through the index. Separators carry no id and are excluded.
fn concrete_ids(items: &[Item], index: &dyn ItemIndex) -> Vec<String> {
    let mut ids = Vec::new();
    for item in items {
        match item {
            Item::Separator(_) => {}
            Item::Option(option) => ids.push(option.id.clone()),
            Item::FromAnswer(from) => {
                ids.extend(index.item_ids(&from.items_from_answer).iter().cloned());
            }
        }
    }
    ids
}
