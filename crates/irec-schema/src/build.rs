//! # Structural Schema Validation
//!
//! One-shot, whole-document validation that turns a raw [`SchemaDocument`]
//! into an [`ActivatedSchema`]: an immutable index answering all runtime
//! queries for one schema version.
//!
//! ## Design Decision
//!
//! `build` is a pure function returning `Result<ActivatedSchema,
//! SchemaRejection>`. There is no stateful validator instance whose indices
//! must be "cleared on error": a rejected document simply never produces an
//! index, so a partially validated schema is unrepresentable. The rejection
//! still echoes the raw document back for diagnostic display.
//!
//! ## Traversal
//!
//! A single left-to-right, depth-first pass over sections, subsections,
//! steps and questions, descending into nested `conditional`, `field` and
//! `addQuestion` sub-questions as they are encountered. Violations are
//! appended to a flat list in traversal order; nothing short-circuits, so
//! schema authors get the full diagnostic report in one pass. The required
//! coverage map is checked after the traversal, also appending.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use irec_core::{NodePath, PathSegment, RequiredCoverage};

use crate::calculated;
use crate::model::{
    CalculatedCondition, Condition, Item, Question, SchemaDocument, Section, Step, Subsection,
};
use crate::payload::PayloadValidator;
use crate::rule::{compile, AnswerMode, FieldRule, ItemIndex};

// ─── Errors ──────────────────────────────────────────────────────────

/// One structural violation, located by a typed path into the document.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuralError {
    /// Where in the document tree the violation was found.
    pub path: NodePath,
    /// What went wrong.
    pub kind: StructuralErrorKind,
    /// The offending node, echoed for diagnostic display.
    pub context: Value,
}

impl std::fmt::Display for StructuralError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.kind)
    }
}

/// The classes of structural violation, with their diagnostic messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralErrorKind {
    /// Two sections share an id.
    #[error("section id '{id}' is repeated")]
    RepeatedSectionId {
        /// The duplicated id.
        id: String,
    },
    /// Two subsections share an id.
    #[error("subsection id '{id}' is repeated")]
    RepeatedSubsectionId {
        /// The duplicated id.
        id: String,
    },
    /// Two questions share an id, counting nested sub-questions.
    #[error("question id '{id}' is repeated")]
    RepeatedQuestionId {
        /// The duplicated id.
        id: String,
    },
    /// A condition references a question not registered earlier in the
    /// traversal (forward, sibling-later, or simply unknown).
    #[error("condition must reference a previous question, but '{id}' is not registered")]
    ConditionNotPrior {
        /// The referenced id.
        id: String,
    },
    /// A condition references a question that carries no items.
    #[error("condition references question '{id}' of non-tipified dataType '{data_type}'")]
    ConditionNotChoice {
        /// The referenced id.
        id: String,
        /// The referenced question's `dataType` tag.
        data_type: String,
    },
    /// A condition option is not among the referenced question's concrete
    /// item ids. Reported once per offending option.
    #[error("condition option '{option}' is not an item of question '{id}'")]
    OptionNotInItems {
        /// The referenced question id.
        id: String,
        /// The offending option id.
        option: String,
    },
    /// An `itemsFromAnswer` indirection references a question not
    /// registered earlier in the traversal.
    #[error("itemsFromAnswer must reference a previous question, but '{id}' is not registered")]
    ItemSourceNotPrior {
        /// The referenced id.
        id: String,
    },
    /// An `itemsFromAnswer` indirection references a question that carries
    /// no items.
    #[error("itemsFromAnswer references question '{id}' of non-tipified dataType '{data_type}'")]
    ItemSourceNotChoice {
        /// The referenced id.
        id: String,
        /// The referenced question's `dataType` tag.
        data_type: String,
    },
    /// A question declares a `validations` object with no rule in it.
    #[error("validations must declare at least one rule")]
    EmptyValidations,
    /// A subsection named by the required coverage map does not exist.
    #[error("required subsection '{id}' is missing")]
    MissingRequiredSubsection {
        /// The missing subsection id.
        id: String,
    },
    /// A question named by the required coverage map is not registered in
    /// its required subsection.
    #[error("required question '{question}' is missing from subsection '{subsection}'")]
    MissingRequiredQuestion {
        /// The subsection the question was expected in.
        subsection: String,
        /// The missing question id.
        question: String,
    },
}

/// A document that failed structural validation.
///
/// Carries the raw input for diagnostic display; callers must treat any
/// rejection as "not activatable" regardless of how readable the echoed
/// document looks.
#[derive(Debug, Clone, Error)]
#[error("schema rejected with {} structural violation(s)", .errors.len())]
pub struct SchemaRejection {
    /// The raw input, echoed back.
    pub document: SchemaDocument,
    /// All violations, in traversal order.
    pub errors: Vec<StructuralError>,
}

// ─── Activated schema ────────────────────────────────────────────────

/// A question as registered in the global id index.
#[derive(Debug, Clone)]
pub struct RegisteredQuestion {
    /// The question definition (a clone; nested sub-questions are
    /// registered individually as well).
    pub question: Question,
    /// The subsection the question was encountered in.
    pub subsection_id: String,
    /// Concrete item ids after `itemsFromAnswer` resolution. Empty for
    /// non-choice kinds.
    pub item_ids: Vec<String>,
}

/// The immutable runtime index for one validated schema version.
///
/// Build once per version, share freely (`Send + Sync`), discard and rebuild
/// wholesale on schema update. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct ActivatedSchema {
    document: SchemaDocument,
    questions: HashMap<String, RegisteredQuestion>,
    subsection_questions: IndexMap<String, Vec<String>>,
    calculated: HashMap<String, IndexMap<String, Vec<CalculatedCondition>>>,
    uploads: HashSet<String>,
}

impl ActivatedSchema {
    /// The validated document.
    pub fn document(&self) -> &SchemaDocument {
        &self.document
    }

    /// Whether the id names a subsection of this schema version.
    pub fn is_subsection_valid(&self, subsection_id: &str) -> bool {
        self.subsection_questions.contains_key(subsection_id)
    }

    /// Whether document uploads are allowed for the subsection.
    pub fn can_upload_files(&self, subsection_id: &str) -> bool {
        self.uploads.contains(subsection_id)
    }

    /// The subsection's registered questions in traversal order, nested
    /// sub-questions included. `None` for an unknown subsection.
    pub fn subsection_questions(&self, subsection_id: &str) -> Option<Vec<&Question>> {
        let ids = self.subsection_questions.get(subsection_id)?;
        Some(
            ids.iter()
                .filter_map(|id| self.questions.get(id))
                .map(|registered| &registered.question)
                .collect(),
        )
    }

    /// Look up a registered question by id.
    pub fn question(&self, question_id: &str) -> Option<&RegisteredQuestion> {
        self.questions.get(question_id)
    }

    /// Compile a validator for one question.
    ///
    /// `mode` selects between default single-subsection validation and the
    /// multiple-answers shape used for aggregated, cross-version answer
    /// lists. `None` for an unknown question id.
    pub fn question_validator(&self, question_id: &str, mode: AnswerMode) -> Option<FieldRule> {
        let registered = self.questions.get(question_id)?;
        Some(compile(&registered.question, self, mode))
    }

    /// Derive the subsection's calculated field values from a live payload.
    ///
    /// First-match-wins over each target's ordered condition list; targets
    /// with no matching condition are omitted.
    pub fn calculated_fields(
        &self,
        subsection_id: &str,
        payload: &serde_json::Map<String, Value>,
    ) -> IndexMap<String, Value> {
        match self.calculated.get(subsection_id) {
            Some(fields) => calculated::resolve(fields, payload),
            None => IndexMap::new(),
        }
    }

    /// Build a payload validator covering only the keys present in the
    /// payload. Keys that are not questions of the subsection are skipped
    /// silently, so partial step-by-step saves validate cleanly.
    pub fn payload_validator(
        &self,
        subsection_id: &str,
        payload: &serde_json::Map<String, Value>,
    ) -> PayloadValidator {
        let mut rules = Vec::new();
        for key in payload.keys() {
            let Some(registered) = self.questions.get(key) else {
                continue;
            };
            if registered.subsection_id != subsection_id {
                continue;
            }
            rules.push((
                key.clone(),
                compile(&registered.question, self, AnswerMode::Single),
            ));
        }
        PayloadValidator::new(rules)
    }
}

impl ItemIndex for ActivatedSchema {
    fn item_ids(&self, question_id: &str) -> &[String] {
        self.questions
            .get(question_id)
            .map_or(&[], |registered| registered.item_ids.as_slice())
    }
}

// ─── Build ───────────────────────────────────────────────────────────

/// Run structural validation over a whole document.
///
/// # Errors
///
/// Returns [`SchemaRejection`] carrying every violation found, in traversal
/// order, followed by required-coverage violations.
pub fn build(
    document: SchemaDocument,
    coverage: &RequiredCoverage,
) -> Result<ActivatedSchema, SchemaRejection> {
    debug!(sections = document.sections.len(), "running structural validation");

    let mut walker = Walker::new(coverage);
    for (index, section) in document.sections.iter().enumerate() {
        walker.path.push(PathSegment::Section(index));
        walker.visit_section(section);
        walker.path.pop();
    }
    walker.check_coverage();

    debug!(
        violations = walker.errors.len(),
        questions = walker.questions.len(),
        "structural validation finished"
    );

    if walker.errors.is_empty() {
        Ok(ActivatedSchema {
            document,
            questions: walker.questions,
            subsection_questions: walker.subsection_questions,
            calculated: walker.calculated,
            uploads: walker.uploads,
        })
    } else {
        Err(SchemaRejection { document, errors: walker.errors })
    }
}

/// Traversal state: the path stack, the three id registries, the runtime
/// indices under construction, and the violation list.
struct Walker<'a> {
    coverage: &'a RequiredCoverage,
    path: NodePath,
    section_ids: HashSet<String>,
    subsection_ids: HashSet<String>,
    questions: HashMap<String, RegisteredQuestion>,
    subsection_questions: IndexMap<String, Vec<String>>,
    calculated: HashMap<String, IndexMap<String, Vec<CalculatedCondition>>>,
    uploads: HashSet<String>,
    errors: Vec<StructuralError>,
}

impl<'a> Walker<'a> {
    fn new(coverage: &'a RequiredCoverage) -> Self {
        Self {
            coverage,
            path: NodePath::root(),
            section_ids: HashSet::new(),
            subsection_ids: HashSet::new(),
            questions: HashMap::new(),
            subsection_questions: IndexMap::new(),
            calculated: HashMap::new(),
            uploads: HashSet::new(),
            errors: Vec::new(),
        }
    }

    fn report(&mut self, kind: StructuralErrorKind, context: Value) {
        self.errors.push(StructuralError { path: self.path.clone(), kind, context });
    }

    fn visit_section(&mut self, section: &Section) {
        if !self.section_ids.insert(section.id.clone()) {
            self.report(
                StructuralErrorKind::RepeatedSectionId { id: section.id.clone() },
                json!({ "id": section.id, "title": section.title }),
            );
        }
        for (index, subsection) in section.sub_sections.iter().enumerate() {
            self.path.push(PathSegment::Subsection(index));
            self.visit_subsection(subsection);
            self.path.pop();
        }
    }

    fn visit_subsection(&mut self, subsection: &Subsection) {
        if !self.subsection_ids.insert(subsection.id.clone()) {
            self.report(
                StructuralErrorKind::RepeatedSubsectionId { id: subsection.id.clone() },
                json!({ "id": subsection.id, "title": subsection.title }),
            );
        }
        self.subsection_questions.entry(subsection.id.clone()).or_default();
        if subsection.has_files {
            self.uploads.insert(subsection.id.clone());
        }

        for (index, step) in subsection.steps.iter().enumerate() {
            self.path.push(PathSegment::Step(index));
            self.visit_step(step, &subsection.id);
            self.path.pop();
        }

        // Calculated conditions may reference the subsection's own
        // questions, so they are checked after its steps.
        for (target, conditions) in &subsection.calculated_fields {
            self.path.push(PathSegment::CalculatedField(target.clone()));
            for (index, condition) in conditions.iter().enumerate() {
                self.path.push(PathSegment::CalculatedCondition(index));
                self.check_reference(&condition.id, &condition.options, || {
                    json!({
                        "id": condition.id,
                        "options": condition.options,
                        "value": condition.value,
                    })
                });
                self.path.pop();
            }
            self.path.pop();
        }
        if !subsection.calculated_fields.is_empty() {
            self.calculated
                .insert(subsection.id.clone(), subsection.calculated_fields.clone());
        }
    }

    fn visit_step(&mut self, step: &Step, subsection_id: &str) {
        // The gate is checked first: it may only look at content registered
        // before this step.
        if let Some(condition) = &step.condition {
            self.path.push(PathSegment::StepCondition);
            self.check_condition(condition);
            self.path.pop();
        }
        for (index, question) in step.questions.iter().enumerate() {
            self.path.push(PathSegment::Question(index));
            self.register_question(question, subsection_id);
            self.path.pop();
        }
    }

    fn check_condition(&mut self, condition: &Condition) {
        let context = json!({ "id": condition.id, "options": condition.options });
        self.check_reference(&condition.id, &condition.options, || context.clone());
    }

    /// Invariants 2-4: the reference must resolve to a previously
    /// registered choice question, and every option must be one of its
    /// concrete item ids.
    fn check_reference(
        &mut self,
        id: &str,
        options: &[String],
        context: impl Fn() -> Value,
    ) {
        let Some(registered) = self.questions.get(id) else {
            self.report(
                StructuralErrorKind::ConditionNotPrior { id: id.to_string() },
                context(),
            );
            return;
        };
        if !registered.question.is_choice() {
            let data_type = registered.question.data_type().to_string();
            self.report(
                StructuralErrorKind::ConditionNotChoice { id: id.to_string(), data_type },
                context(),
            );
            return;
        }
        let missing: Vec<String> = options
            .iter()
            .filter(|option| !registered.item_ids.contains(option))
            .cloned()
            .collect();
        for option in missing {
            self.report(
                StructuralErrorKind::OptionNotInItems { id: id.to_string(), option },
                context(),
            );
        }
    }

    /// Invariant 1 (global question uniqueness), invariant 5 (non-empty
    /// `validations`), `itemsFromAnswer` resolution, and recursive
    /// registration of nested sub-questions.
    fn register_question(&mut self, question: &Question, subsection_id: &str) {
        let id = question.id().to_string();
        if self.questions.contains_key(&id) {
            self.report(
                StructuralErrorKind::RepeatedQuestionId { id: id.clone() },
                json!({ "id": id, "dataType": question.data_type() }),
            );
            // The duplicate's subtree is not traversed: its nested ids
            // would each collide with the original registration and drown
            // the report in follow-on noise.
            return;
        }
        if let Some(validations) = question.validations() {
            if validations.is_empty() {
                self.report(
                    StructuralErrorKind::EmptyValidations,
                    json!({ "id": id, "dataType": question.data_type() }),
                );
            }
        }

        // Resolve the item list before self-registration so indirections
        // can only point at prior content, then register self before
        // descending so nested sub-questions may borrow the parent's items.
        let item_ids = self.resolve_item_ids(question);
        self.questions.insert(
            id.clone(),
            RegisteredQuestion {
                question: question.clone(),
                subsection_id: subsection_id.to_string(),
                item_ids,
            },
        );
        self.subsection_questions
            .entry(subsection_id.to_string())
            .or_default()
            .push(id);

        self.visit_nested(question, subsection_id);
    }

    /// Concrete item ids for choice kinds, substituting each
    /// `itemsFromAnswer` indirection with the referenced question's
    /// already-resolved ids.
    fn resolve_item_ids(&mut self, question: &Question) -> Vec<String> {
        let Some(items) = question.items() else {
            return Vec::new();
        };
        let mut ids = Vec::new();
        for (index, item) in items.iter().enumerate() {
            match item {
                Item::Separator(_) => {}
                Item::Option(option) => ids.push(option.id.clone()),
                Item::FromAnswer(from) => {
                    let source = from.items_from_answer.clone();
                    self.path.push(PathSegment::Item(index));
                    match self.questions.get(&source) {
                        None => self.report(
                            StructuralErrorKind::ItemSourceNotPrior { id: source.clone() },
                            json!({ "itemsFromAnswer": source }),
                        ),
                        Some(registered) if !registered.question.is_choice() => {
                            let data_type = registered.question.data_type().to_string();
                            self.report(
                                StructuralErrorKind::ItemSourceNotChoice {
                                    id: source.clone(),
                                    data_type,
                                },
                                json!({ "itemsFromAnswer": source }),
                            );
                        }
                        Some(registered) => ids.extend(registered.item_ids.iter().cloned()),
                    }
                    self.path.pop();
                }
            }
        }
        ids
    }

    /// Depth-first descent into nested sub-questions, registering each as
    /// it is encountered.
    fn visit_nested(&mut self, question: &Question, subsection_id: &str) {
        if let Some(items) = question.items() {
            for (index, item) in items.iter().enumerate() {
                if let Item::Option(option) = item {
                    if let Some(conditional) = &option.conditional {
                        self.path.push(PathSegment::Item(index));
                        self.path.push(PathSegment::Conditional);
                        self.register_question(conditional, subsection_id);
                        self.path.pop();
                        self.path.pop();
                    }
                }
            }
        }
        match question {
            Question::CheckboxArray(q) => {
                if let Some(add_question) = &q.add_question {
                    self.path.push(PathSegment::AddQuestion);
                    self.register_question(add_question, subsection_id);
                    self.path.pop();
                }
            }
            Question::FieldsGroup(q) => {
                self.path.push(PathSegment::Field);
                self.register_question(&q.field, subsection_id);
                self.path.pop();
                if let Some(add_question) = &q.add_question {
                    self.path.push(PathSegment::AddQuestion);
                    self.register_question(add_question, subsection_id);
                    self.path.pop();
                }
            }
            Question::Text(_)
            | Question::Textarea(_)
            | Question::RadioGroup(_)
            | Question::AutocompleteArray(_) => {}
        }
    }

    /// Invariant 6: every required subsection must exist and register every
    /// required question id. Checked after the traversal, appending.
    fn check_coverage(&mut self) {
        let mut missing = Vec::new();
        for (subsection, required) in self.coverage.iter() {
            match self.subsection_questions.get(subsection) {
                None => missing.push((
                    StructuralErrorKind::MissingRequiredSubsection {
                        id: subsection.to_string(),
                    },
                    json!({ "subSectionId": subsection }),
                )),
                Some(registered) => {
                    for question in required {
                        if !registered.contains(question) {
                            missing.push((
                                StructuralErrorKind::MissingRequiredQuestion {
                                    subsection: subsection.to_string(),
                                    question: question.clone(),
                                },
                                json!({
                                    "subSectionId": subsection,
                                    "questionId": question,
                                }),
                            ));
                        }
                    }
                }
            }
        }
        for (kind, context) in missing {
            self.errors.push(StructuralError { path: NodePath::root(), kind, context });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: Value) -> SchemaDocument {
        serde_json::from_value(value).expect("fixture document must parse")
    }

    fn radio(id: &str, options: &[&str]) -> Value {
        json!({
            "dataType": "radio-group",
            "id": id,
            "label": format!("Question {id}"),
            "items": options
                .iter()
                .map(|o| json!({ "id": o, "label": o.to_uppercase() }))
                .collect::<Vec<_>>()
        })
    }

    fn single_subsection(questions: Vec<Value>) -> SchemaDocument {
        document(json!({
            "sections": [{
                "id": "S1",
                "title": "Section one",
                "subSections": [{
                    "id": "SS1",
                    "title": "Subsection one",
                    "steps": [{ "questions": questions }]
                }]
            }]
        }))
    }

    #[test]
    fn valid_document_activates_with_indices() {
        let doc = single_subsection(vec![
            radio("Q1", &["opt1", "opt2"]),
            json!({ "dataType": "text", "id": "Q2", "label": "Name" }),
        ]);
        let schema = build(doc, &RequiredCoverage::none()).unwrap();
        assert!(schema.is_subsection_valid("SS1"));
        assert!(!schema.is_subsection_valid("SS9"));
        let questions = schema.subsection_questions("SS1").unwrap();
        let ids: Vec<&str> = questions.iter().map(|q| q.id()).collect();
        assert_eq!(ids, ["Q1", "Q2"]);
        assert_eq!(schema.question("Q1").unwrap().item_ids, ["opt1", "opt2"]);
    }

    #[test]
    fn repeated_question_id_reports_exactly_once() {
        let doc = single_subsection(vec![
            radio("Q1", &["a"]),
            json!({ "dataType": "text", "id": "Q1", "label": "Duplicate" }),
        ]);
        let rejection = build(doc, &RequiredCoverage::none()).unwrap_err();
        let repeats = rejection
            .errors
            .iter()
            .filter(|e| {
                matches!(&e.kind, StructuralErrorKind::RepeatedQuestionId { id } if id == "Q1")
            })
            .count();
        assert_eq!(repeats, 1, "got: {:?}", rejection.errors);
    }

    #[test]
    fn nested_sub_question_ids_share_the_global_registry() {
        let doc = single_subsection(vec![json!({
            "dataType": "checkbox-array",
            "id": "Q1",
            "label": "Pick",
            "items": [{
                "id": "other",
                "label": "Other",
                "conditional": { "dataType": "text", "id": "Q1", "label": "Nested clash" }
            }]
        })]);
        let rejection = build(doc, &RequiredCoverage::none()).unwrap_err();
        assert!(matches!(
            &rejection.errors[0].kind,
            StructuralErrorKind::RepeatedQuestionId { id } if id == "Q1"
        ));
        // The clash is located at the nested conditional, not the parent.
        assert_eq!(
            rejection.errors[0].path.segments().last(),
            Some(&PathSegment::Conditional)
        );
    }

    #[test]
    fn forward_condition_reference_is_rejected() {
        let doc = document(json!({
            "sections": [{
                "id": "S1",
                "title": "Section",
                "subSections": [{
                    "id": "SS1",
                    "title": "Subsection",
                    "steps": [
                        {
                            "condition": { "id": "Q1", "options": ["opt1"] },
                            "questions": [radio("Q1", &["opt1"])]
                        }
                    ]
                }]
            }]
        }));
        let rejection = build(doc, &RequiredCoverage::none()).unwrap_err();
        assert!(matches!(
            &rejection.errors[0].kind,
            StructuralErrorKind::ConditionNotPrior { id } if id == "Q1"
        ));
    }

    #[test]
    fn condition_on_non_choice_question_is_rejected() {
        let doc = document(json!({
            "sections": [{
                "id": "S1",
                "title": "Section",
                "subSections": [{
                    "id": "SS1",
                    "title": "Subsection",
                    "steps": [
                        { "questions": [{ "dataType": "text", "id": "Q1", "label": "Name" }] },
                        {
                            "condition": { "id": "Q1", "options": [] },
                            "questions": [{ "dataType": "text", "id": "Q2", "label": "More" }]
                        }
                    ]
                }]
            }]
        }));
        let rejection = build(doc, &RequiredCoverage::none()).unwrap_err();
        assert!(matches!(
            &rejection.errors[0].kind,
            StructuralErrorKind::ConditionNotChoice { id, data_type }
                if id == "Q1" && data_type == "text"
        ));
    }

    #[test]
    fn condition_option_subset_reports_only_offenders() {
        let doc = document(json!({
            "sections": [{
                "id": "S1",
                "title": "Section",
                "subSections": [{
                    "id": "SS1",
                    "title": "Subsection",
                    "steps": [
                        { "questions": [radio("Q1", &["A", "B"])] },
                        {
                            "condition": { "id": "Q1", "options": ["A", "B", "C"] },
                            "questions": [{ "dataType": "text", "id": "Q2", "label": "More" }]
                        }
                    ]
                }]
            }]
        }));
        let rejection = build(doc, &RequiredCoverage::none()).unwrap_err();
        assert_eq!(rejection.errors.len(), 1);
        assert!(matches!(
            &rejection.errors[0].kind,
            StructuralErrorKind::OptionNotInItems { id, option } if id == "Q1" && option == "C"
        ));
    }

    #[test]
    fn empty_validations_object_is_rejected() {
        let doc = single_subsection(vec![json!({
            "dataType": "text",
            "id": "Q1",
            "label": "Name",
            "validations": {}
        })]);
        let rejection = build(doc, &RequiredCoverage::none()).unwrap_err();
        assert!(matches!(
            rejection.errors[0].kind,
            StructuralErrorKind::EmptyValidations
        ));
    }

    #[test]
    fn items_from_answer_resolves_prior_question() {
        let doc = single_subsection(vec![
            radio("Q1", &["a", "b"]),
            json!({
                "dataType": "radio-group",
                "id": "Q2",
                "label": "Same items",
                "items": [{ "itemsFromAnswer": "Q1" }]
            }),
        ]);
        let schema = build(doc, &RequiredCoverage::none()).unwrap();
        assert_eq!(schema.question("Q2").unwrap().item_ids, ["a", "b"]);
    }

    #[test]
    fn items_from_answer_forward_reference_is_rejected() {
        let doc = single_subsection(vec![
            json!({
                "dataType": "radio-group",
                "id": "Q1",
                "label": "Borrows forward",
                "items": [{ "itemsFromAnswer": "Q2" }]
            }),
            radio("Q2", &["a"]),
        ]);
        let rejection = build(doc, &RequiredCoverage::none()).unwrap_err();
        assert!(matches!(
            &rejection.errors[0].kind,
            StructuralErrorKind::ItemSourceNotPrior { id } if id == "Q2"
        ));
    }

    #[test]
    fn calculated_conditions_may_reference_own_subsection_questions() {
        let doc = document(json!({
            "sections": [{
                "id": "S1",
                "title": "Section",
                "subSections": [{
                    "id": "SS1",
                    "title": "Subsection",
                    "calculatedFields": {
                        "derived": [
                            { "id": "Q1", "options": ["yes"], "value": "VAL_A" }
                        ]
                    },
                    "steps": [{ "questions": [radio("Q1", &["yes", "no"])] }]
                }]
            }]
        }));
        assert!(build(doc, &RequiredCoverage::none()).is_ok());
    }

    #[test]
    fn calculated_condition_bad_option_is_located() {
        let doc = document(json!({
            "sections": [{
                "id": "S1",
                "title": "Section",
                "subSections": [{
                    "id": "SS1",
                    "title": "Subsection",
                    "calculatedFields": {
                        "derived": [
                            { "id": "Q1", "options": ["maybe"], "value": 1 }
                        ]
                    },
                    "steps": [{ "questions": [radio("Q1", &["yes", "no"])] }]
                }]
            }]
        }));
        let rejection = build(doc, &RequiredCoverage::none()).unwrap_err();
        assert!(matches!(
            &rejection.errors[0].kind,
            StructuralErrorKind::OptionNotInItems { option, .. } if option == "maybe"
        ));
        assert!(rejection.errors[0]
            .path
            .segments()
            .contains(&PathSegment::CalculatedField("derived".into())));
    }

    #[test]
    fn required_coverage_violations_name_the_pair() {
        let coverage = RequiredCoverage::none()
            .require("SS1", ["Q1", "Q9"])
            .require("SS2", ["Q5"]);
        let doc = single_subsection(vec![radio("Q1", &["a"])]);
        let rejection = build(doc, &coverage).unwrap_err();
        assert_eq!(rejection.errors.len(), 2);
        assert!(matches!(
            &rejection.errors[0].kind,
            StructuralErrorKind::MissingRequiredQuestion { subsection, question }
                if subsection == "SS1" && question == "Q9"
        ));
        assert!(matches!(
            &rejection.errors[1].kind,
            StructuralErrorKind::MissingRequiredSubsection { id } if id == "SS2"
        ));
    }

    #[test]
    fn run_twice_yields_identical_reports() {
        let source = json!({
            "sections": [{
                "id": "S1",
                "title": "Section",
                "subSections": [{
                    "id": "SS1",
                    "title": "Subsection",
                    "steps": [
                        { "questions": [radio("Q1", &["a"])] },
                        {
                            "condition": { "id": "Q1", "options": ["zzz"] },
                            "questions": [{ "dataType": "text", "id": "Q1", "label": "Clash" }]
                        }
                    ]
                }]
            }]
        });
        let first = build(document(source.clone()), &RequiredCoverage::none()).unwrap_err();
        let second = build(document(source), &RequiredCoverage::none()).unwrap_err();
        assert_eq!(first.errors, second.errors);
    }

    #[test]
    fn upload_flag_is_indexed_per_subsection() {
        let doc = document(json!({
            "sections": [{
                "id": "S1",
                "title": "Section",
                "subSections": [
                    { "id": "SS1", "title": "One", "hasFiles": true, "steps": [] },
                    { "id": "SS2", "title": "Two", "steps": [] }
                ]
            }]
        }));
        let schema = build(doc, &RequiredCoverage::none()).unwrap();
        assert!(schema.can_upload_files("SS1"));
        assert!(!schema.can_upload_files("SS2"));
    }

    #[test]
    fn rejection_echoes_the_raw_document() {
        let doc = single_subsection(vec![json!({
            "dataType": "text", "id": "Q1", "label": "Name", "validations": {}
        })]);
        let rejection = build(doc.clone(), &RequiredCoverage::none()).unwrap_err();
        assert_eq!(rejection.document, doc);
    }
}
