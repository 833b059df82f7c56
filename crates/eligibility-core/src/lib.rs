//! # eligibility-core
//!
//! The evaluation runtime for eligibility function trees.
//!
//! This crate provides:
//! - The collaborator traits (`DoidModel`, `IcdModel`, `TreatmentDatabase`,
//!   `GeneChecker`, `MedicationCategories`) and the `LeafEvaluator` trait
//! - `CompiledFunction`, the executable form of an `EligibilityFunction`
//! - The `Evaluator` that combines leaf evaluations under AND / OR / NOT / WARN_IF
//! - The `LeafEvaluatorRegistry` and a rayon-backed `BatchRunner`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use eligibility_core::{Evaluator, LeafEvaluatorRegistry};
//! ```

pub mod batch;
pub mod compiled;
pub mod evaluator;
pub mod registry;
pub mod traits;

pub use batch::{BatchRunner, BatchStats, PairOutcome};
pub use compiled::{CompiledCohort, CompiledEligibility, CompiledFunction, CompiledTrial};
pub use evaluator::{CohortEvaluation, Evaluator, TrialEvaluation};
pub use registry::LeafEvaluatorRegistry;
