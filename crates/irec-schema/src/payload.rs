//! # Runtime Payload Validation
//!
//! Executes compiled [`FieldRule`]s against submitted answer payloads.
//! Structural violations in the *schema* are a different layer
//! ([`crate::build`]); everything here is about one user's answers and is
//! reported as a single aggregated failure carrying field-level violations,
//! which callers surface as a 400-class error.

use serde_json::Value;
use thiserror::Error;

use irec_core::ViolationKind;

use crate::rule::{CountBound, EntryField, FieldRule};

/// Strings echoed in violation context are cut at this length.
const CONTEXT_STRING_LIMIT: usize = 120;

/// One field-level violation inside an invalid payload.
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadViolation {
    /// Dotted/indexed path to the offending value, e.g. `standards[1].standardStatus`.
    pub path: String,
    /// The class of failure.
    pub kind: ViolationKind,
    /// Human-readable description.
    pub message: String,
    /// The offending value, with long strings truncated.
    pub context: Value,
}

impl std::fmt::Display for PayloadViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Aggregated payload failure.
#[derive(Debug, Clone, Error)]
#[error("invalid payload: {} violation(s)", .violations.len())]
pub struct PayloadError {
    /// Every field-level violation found, in rule order.
    pub violations: Vec<PayloadViolation>,
}

/// A validator built for one subsection and one payload's key set.
///
/// Keys absent from the schema were already skipped at construction, so
/// running it never rejects a partial save for what it does not contain.
#[derive(Debug, Clone)]
pub struct PayloadValidator {
    rules: Vec<(String, FieldRule)>,
}

impl PayloadValidator {
    pub(crate) fn new(rules: Vec<(String, FieldRule)>) -> Self {
        Self { rules }
    }

    /// The payload keys this validator covers, in deterministic order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|(key, _)| key.as_str())
    }

    /// Validate the payload.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError`] carrying every violation found across all
    /// covered keys.
    pub fn validate(&self, payload: &serde_json::Map<String, Value>) -> Result<(), PayloadError> {
        let mut violations = Vec::new();
        for (key, rule) in &self.rules {
            if let Some(value) = payload.get(key) {
                rule.check(value, key, &mut violations);
            }
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(PayloadError { violations })
        }
    }
}

impl FieldRule {
    /// Apply this rule to one value, appending violations.
    pub fn check(&self, value: &Value, path: &str, out: &mut Vec<PayloadViolation>) {
        match self {
            Self::Text { required, max_length } => {
                check_text(value, path, *required, *max_length, out);
            }
            Self::SingleChoice { required, items } => {
                check_single_choice(value, path, *required, items, out);
            }
            Self::ChoiceList { required, items, min, max } => {
                check_choice_list(value, path, *required, items, min.as_ref(), max.as_ref(), out);
            }
            Self::FreeTextList => check_free_text_list(value, path, out),
            Self::EntryList { min, fields } => {
                check_entry_list(value, path, min.as_ref(), fields, out);
            }
        }
    }
}

fn check_text(
    value: &Value,
    path: &str,
    required: bool,
    max_length: Option<usize>,
    out: &mut Vec<PayloadViolation>,
) {
    match value {
        Value::Null => {
            if required {
                out.push(required_violation(path, value));
            }
        }
        Value::String(text) => {
            if required && text.is_empty() {
                out.push(required_violation(path, value));
            }
            if let Some(max) = max_length {
                if text.chars().count() > max {
                    out.push(PayloadViolation {
                        path: path.to_string(),
                        kind: ViolationKind::TooLong,
                        message: format!("must be at most {max} characters"),
                        context: sanitize(value),
                    });
                }
            }
        }
        other => out.push(wrong_type(path, "a string", other)),
    }
}

fn check_single_choice(
    value: &Value,
    path: &str,
    required: bool,
    items: &[String],
    out: &mut Vec<PayloadViolation>,
) {
    match value {
        Value::Null => {
            if required {
                out.push(required_violation(path, value));
            }
        }
        Value::String(answer) => {
            if answer.is_empty() {
                if required {
                    out.push(required_violation(path, value));
                }
            } else if !items.iter().any(|item| item == answer) {
                out.push(not_an_item(path, answer, value));
            }
        }
        other => out.push(wrong_type(path, "an item id", other)),
    }
}

fn check_choice_list(
    value: &Value,
    path: &str,
    required: bool,
    items: &[String],
    min: Option<&CountBound>,
    max: Option<&CountBound>,
    out: &mut Vec<PayloadViolation>,
) {
    match value {
        Value::Null => {
            if required {
                out.push(required_violation(path, value));
            }
        }
        Value::Array(answers) => {
            if required && answers.is_empty() {
                out.push(required_violation(path, value));
            }
            if let Some(bound) = min {
                if answers.len() < bound.length {
                    out.push(count_violation(path, bound, ViolationKind::TooFew, value));
                }
            }
            if let Some(bound) = max {
                if answers.len() > bound.length {
                    out.push(count_violation(path, bound, ViolationKind::TooMany, value));
                }
            }
            for (index, answer) in answers.iter().enumerate() {
                let element_path = format!("{path}[{index}]");
                match answer {
                    Value::String(id) if items.iter().any(|item| item == id) => {}
                    Value::String(id) => out.push(not_an_item(&element_path, id, answer)),
                    other => out.push(wrong_type(&element_path, "an item id", other)),
                }
            }
        }
        other => out.push(wrong_type(path, "an array of item ids", other)),
    }
}

fn check_free_text_list(value: &Value, path: &str, out: &mut Vec<PayloadViolation>) {
    match value {
        Value::Null => {}
        Value::Array(entries) => {
            for (index, entry) in entries.iter().enumerate() {
                if !matches!(entry, Value::Null | Value::String(_)) {
                    out.push(wrong_type(&format!("{path}[{index}]"), "a string", entry));
                }
            }
        }
        other => out.push(wrong_type(path, "an array of strings", other)),
    }
}

fn check_entry_list(
    value: &Value,
    path: &str,
    min: Option<&CountBound>,
    fields: &[EntryField],
    out: &mut Vec<PayloadViolation>,
) {
    match value {
        Value::Null => {
            if min.is_some() {
                out.push(required_violation(path, value));
            }
        }
        Value::Array(entries) => {
            if let Some(bound) = min {
                if entries.len() < bound.length {
                    out.push(count_violation(path, bound, ViolationKind::TooFew, value));
                }
            }
            for (index, entry) in entries.iter().enumerate() {
                let entry_path = format!("{path}[{index}]");
                let Value::Object(object) = entry else {
                    out.push(wrong_type(&entry_path, "an object", entry));
                    continue;
                };
                for field in fields {
                    let field_path = format!("{entry_path}.{}", field.key);
                    match object.get(&field.key) {
                        Some(nested) => field.rule.check(nested, &field_path, out),
                        None => {
                            if field.required {
                                out.push(required_violation(&field_path, &Value::Null));
                            }
                        }
                    }
                }
                for key in object.keys() {
                    if !fields.iter().any(|field| &field.key == key) {
                        out.push(PayloadViolation {
                            path: format!("{entry_path}.{key}"),
                            kind: ViolationKind::UnknownKey,
                            message: "is not a declared key of this answer".to_string(),
                            context: sanitize(&object[key]),
                        });
                    }
                }
            }
        }
        other => out.push(wrong_type(path, "an array of objects", other)),
    }
}

fn required_violation(path: &str, value: &Value) -> PayloadViolation {
    PayloadViolation {
        path: path.to_string(),
        kind: ViolationKind::Required,
        message: "an answer is required".to_string(),
        context: sanitize(value),
    }
}

fn wrong_type(path: &str, expected: &str, value: &Value) -> PayloadViolation {
    PayloadViolation {
        path: path.to_string(),
        kind: ViolationKind::WrongType,
        message: format!("expected {expected}"),
        context: sanitize(value),
    }
}

fn not_an_item(path: &str, answer: &str, value: &Value) -> PayloadViolation {
    PayloadViolation {
        path: path.to_string(),
        kind: ViolationKind::NotAnItem,
        message: format!("'{answer}' is not one of the question's items"),
        context: sanitize(value),
    }
}

fn count_violation(
    path: &str,
    bound: &CountBound,
    kind: ViolationKind,
    value: &Value,
) -> PayloadViolation {
    let message = bound.message.clone().unwrap_or_else(|| match kind {
        ViolationKind::TooFew => format!("needs at least {} entries", bound.length),
        _ => format!("allows at most {} entries", bound.length),
    });
    PayloadViolation { path: path.to_string(), kind, message, context: sanitize(value) }
}

/// Echo a value into violation context with long strings truncated.
fn sanitize(value: &Value) -> Value {
    match value {
        Value::String(text) if text.chars().count() > CONTEXT_STRING_LIMIT => {
            let cut: String = text.chars().take(CONTEXT_STRING_LIMIT).collect();
            Value::String(format!("{cut}…"))
        }
        Value::Array(entries) => Value::Array(entries.iter().map(sanitize).collect()),
        Value::Object(object) => Value::Object(
            object.iter().map(|(key, nested)| (key.clone(), sanitize(nested))).collect(),
        ),
        other => other.clone(),
    }
}
