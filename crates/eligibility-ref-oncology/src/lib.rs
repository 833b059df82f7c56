//! # eligibility-ref-oncology
//!
//! Oncology reference runtime for the eligibility engine.
//!
//! Provides everything the engine deliberately leaves to its embedder:
//!
//! 1. **Knowledge bases**: a trimmed disease ontology, ICD table, treatment
//!    catalog, gene list and ATC medication categories, behind the
//!    collaborator traits of `eligibility-core`.
//! 2. **Leaf evaluators**: demographics, tumor, treatment history,
//!    molecular, laboratory, conditions and medication rules, registered
//!    through [`evaluators::reference_registry`].
//! 3. **Sample data**: two embedded trials, one deliberately broken trial
//!    and four patients, used by three demo scenarios.
//!
//! All data is hardcoded and fictional. No external systems are contacted.

pub mod evaluators;
pub mod knowledge;
pub mod sample;
pub mod scenarios;
pub mod trials;

pub use evaluators::reference_registry;
pub use knowledge::ReferenceKnowledge;
