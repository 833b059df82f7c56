//! # eligibility-resolver
//!
//! Turns authored eligibility criteria into executable function trees.
//!
//! ## Overview
//!
//! - [`parse_function`] reads the textual form `RULE(p1, p2)` back into an
//!   `EligibilityFunction`.
//! - [`TrialDefinition`] loads a trial and its cohorts from TOML.
//! - [`InputResolver`] checks every function's parameter shape and resolves
//!   raw tokens against the injected knowledge bases (disease ontology, ICD,
//!   treatment database, gene list, medication categories).
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use eligibility_resolver::{load_trial, InputResolver};
//!
//! let trial = load_trial(Path::new("trials/crc-01.toml"))?;
//! let resolver = InputResolver::new(&doids, &icd, &treatments, &genes, &medications);
//! let compiled = resolver.compile_trial(&trial)?;
//! ```
//!
//! A trial with any invalid function is rejected as a whole; nothing is
//! evaluated for it.

pub mod definition;
pub mod parse;
pub mod resolver;
pub mod syntax;

pub use definition::{load_trial, CohortDefinition, EligibilityDefinition, TrialDefinition};
pub use parse::parse_function;
pub use resolver::{InputResolver, Resolved};

// ── Tests ─────────────────────────────────────────────────────────────────────
