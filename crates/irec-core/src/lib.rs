//! # irec-core — Foundational Types for the Innovation Record Schema Engine
//!
//! This crate is the leaf of the workspace DAG. It defines the types that the
//! schema engine and its callers share without pulling in the engine itself:
//!
//! 1. **Structured node paths.** Every structural diagnostic points at a node
//!    in the schema tree through an ordered list of typed [`PathSegment`]s,
//!    never a concatenated string. Tests pattern-match on segments; humans get
//!    the dotted rendering via `Display`.
//!
//! 2. **Required coverage as a value.** The canonical map of required
//!    subsection ids to required question ids is an explicit
//!    [`RequiredCoverage`] value handed to the build function, not a
//!    module-level constant. Deployments and tests supply their own.
//!
//! 3. **Shared violation kinds.** Payload-level violations are tagged with a
//!    [`ViolationKind`] so callers can branch on the class of failure without
//!    parsing messages.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `irec-*` crates.
//! - No `unsafe` code, no `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement `Serialize`.

pub mod coverage;
pub mod path;
pub mod violation;

pub use coverage::RequiredCoverage;
pub use path::{NodePath, PathSegment};
pub use violation::ViolationKind;
