//! Integration test: a small but complete Innovation Record schema goes from
//! raw JSON through structural validation to runtime payload validation and
//! calculated-field derivation, the way the document service drives the
//! engine for one schema version.

use serde_json::{json, Map, Value};

use irec_schema::{build, AnswerMode, FieldRule, RequiredCoverage, SchemaDocument, ViolationKind};

fn demo_document() -> SchemaDocument {
    serde_json::from_value(json!({
        "sections": [{
            "id": "S1",
            "title": "About your innovation",
            "subSections": [{
                "id": "SS1",
                "title": "Evidence",
                "hasFiles": true,
                "calculatedFields": {
                    "evidenceStatus": [
                        { "id": "Q1", "options": ["opt1"], "value": "EVIDENCED" },
                        { "id": "Q1", "options": [], "value": "NOT_EVIDENCED" }
                    ]
                },
                "steps": [
                    {
                        "questions": [{
                            "dataType": "radio-group",
                            "id": "Q1",
                            "label": "Do you have evidence?",
                            "items": [
                                { "id": "opt1", "label": "Yes" },
                                { "id": "opt2", "label": "No" }
                            ],
                            "validations": { "isRequired": true }
                        }]
                    },
                    {
                        "condition": { "id": "Q1", "options": ["opt1"] },
                        "questions": [{
                            "dataType": "text",
                            "id": "Q2",
                            "label": "Summarise the evidence",
                            "validations": { "isRequired": true }
                        }]
                    }
                ]
            }]
        }]
    }))
    .expect("demo document must parse")
}

fn payload(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("payload fixture must be an object, got {other:?}"),
    }
}

#[test]
fn demo_document_activates_cleanly() {
    let schema = build(demo_document(), &RequiredCoverage::none()).unwrap();
    assert!(schema.is_subsection_valid("SS1"));
    assert!(schema.can_upload_files("SS1"));
    let ids: Vec<&str> = schema
        .subsection_questions("SS1")
        .unwrap()
        .iter()
        .map(|q| q.id())
        .collect();
    assert_eq!(ids, ["Q1", "Q2"]);
}

#[test]
fn payload_validation_enforces_gated_required_question() {
    let schema = build(demo_document(), &RequiredCoverage::none()).unwrap();

    let invalid = payload(json!({ "Q1": "opt1", "Q2": "" }));
    let err = schema
        .payload_validator("SS1", &invalid)
        .validate(&invalid)
        .unwrap_err();
    assert_eq!(err.violations.len(), 1);
    assert_eq!(err.violations[0].path, "Q2");
    assert_eq!(err.violations[0].kind, ViolationKind::Required);

    let valid = payload(json!({ "Q1": "opt1", "Q2": "hello" }));
    assert!(schema
        .payload_validator("SS1", &valid)
        .validate(&valid)
        .is_ok());
}

#[test]
fn unknown_payload_keys_are_skipped_silently() {
    let schema = build(demo_document(), &RequiredCoverage::none()).unwrap();
    // Partial step-by-step save: a stray key and a missing required answer
    // are both fine, only present registered keys are validated.
    let partial = payload(json!({ "notAQuestion": 42 }));
    assert!(schema
        .payload_validator("SS1", &partial)
        .validate(&partial)
        .is_ok());
}

#[test]
fn calculated_fields_follow_first_match() {
    let schema = build(demo_document(), &RequiredCoverage::none()).unwrap();
    let resolved = schema.calculated_fields("SS1", &payload(json!({ "Q1": "opt1" })));
    assert_eq!(resolved.get("evidenceStatus"), Some(&json!("EVIDENCED")));
    let resolved = schema.calculated_fields("SS1", &payload(json!({ "Q1": "opt2" })));
    assert_eq!(resolved.get("evidenceStatus"), Some(&json!("NOT_EVIDENCED")));
}

#[test]
fn multiple_answers_mode_widens_radio_groups() {
    let schema = build(demo_document(), &RequiredCoverage::none()).unwrap();
    let single = schema.question_validator("Q1", AnswerMode::Single).unwrap();
    assert!(matches!(single, FieldRule::SingleChoice { .. }));
    let multiple = schema
        .question_validator("Q1", AnswerMode::MultipleAnswers)
        .unwrap();
    let mut violations = Vec::new();
    multiple.check(&json!(["opt1", "opt2"]), "Q1", &mut violations);
    assert!(violations.is_empty(), "got: {violations:?}");
}

#[test]
fn required_coverage_is_enforced_end_to_end() {
    let coverage = RequiredCoverage::none().require("SS1", ["Q1", "Q2"]);
    assert!(build(demo_document(), &coverage).is_ok());

    let coverage = RequiredCoverage::none().require("SS1", ["Q1", "Q7"]);
    let rejection = build(demo_document(), &coverage).unwrap_err();
    assert_eq!(rejection.errors.len(), 1);
    assert!(rejection.errors[0].to_string().contains("Q7"));
}

#[test]
fn building_twice_yields_identical_indices() {
    let first = build(demo_document(), &RequiredCoverage::none()).unwrap();
    let second = build(demo_document(), &RequiredCoverage::none()).unwrap();
    assert_eq!(first.document(), second.document());
    let questions = |schema: &irec_schema::ActivatedSchema| -> Vec<String> {
        schema
            .subsection_questions("SS1")
            .unwrap()
            .iter()
            .map(|q| q.id().to_string())
            .collect()
    };
    assert_eq!(questions(&first), questions(&second));
}
