//! # irec-schema — Innovation Record Form-Schema Engine
//!
//! The Innovation Record is a hierarchical, versioned questionnaire whose
//! structure (sections → subsections → steps → questions), cross-question
//! conditional logic, and per-question validation rules are all data. This
//! crate is the small compiler that turns such a document into something
//! executable:
//!
//! 1. **[`model`]** — the question data shapes. Pure data, no behavior.
//! 2. **[`build`]** — one-shot structural validation. A single depth-first
//!    pass checks id uniqueness, prior-reference conditions, option subsets,
//!    and required coverage, accumulating every violation instead of failing
//!    fast. Success yields an immutable [`ActivatedSchema`] index.
//! 3. **[`rule`]** — the validator factory: one [`Question`] in, one
//!    executable [`FieldRule`] out, with exhaustive dispatch over the six
//!    question kinds.
//! 4. **[`payload`]** — runtime validation of submitted answers, scoped to
//!    the keys actually present so partial step-by-step saves pass cleanly.
//! 5. **[`calculated`]** — first-match-wins derivation of calculated field
//!    values from live answers.
//!
//! ## Lifecycle
//!
//! The external schema store hands over a raw document once per version.
//! [`build`](build::build) runs once at activation; on success the returned
//! [`ActivatedSchema`] is shared read-only for every subsequent subsection
//! query, and is discarded and rebuilt wholesale on schema update. Everything
//! is synchronous and in-memory; there is no I/O anywhere in this crate.
//!
//! ## Crate Policy
//!
//! - No `unsafe` code, no `panic!()` or `.unwrap()` outside tests.
//! - Structural diagnostics are accumulated, never thrown; payload failures
//!   are one aggregated error carrying field-level violations.

pub mod build;
pub mod calculated;
pub mod model;
pub mod payload;
pub mod rule;

pub use build::{
    build, ActivatedSchema, RegisteredQuestion, SchemaRejection, StructuralError,
    StructuralErrorKind,
};
pub use model::{
    CalculatedCondition, Condition, Item, ItemOption, LengthLimit, Question, SchemaDocument,
    Section, Step, Subsection, ValidationConfig,
};
pub use payload::{PayloadError, PayloadValidator, PayloadViolation};
pub use rule::{compile, AnswerMode, CountBound, EntryField, FieldRule, ItemIndex};

// The coverage map travels with the build call; re-exported so callers need
// only this crate.
pub use irec_core::{NodePath, PathSegment, RequiredCoverage, ViolationKind};
