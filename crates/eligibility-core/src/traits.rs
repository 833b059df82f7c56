//! Trait definitions for everything the engine consumes but does not own.
//!
//! The clinical knowledge bases (disease ontology, ICD, treatment database,
//! gene list, medication categories) are read-only indices built once at
//! startup and injected by reference. Leaf evaluators are the per-rule
//! clinical logic the composite evaluator dispatches to.
//!
//! All traits are object safe and `Send + Sync` so one set of collaborators
//! can be shared across the batch runner's worker threads.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use eligibility_contracts::{
    domain::{Drug, MedicationCategory, Treatment},
    error::MatchResult,
    evaluation::Evaluation,
    patient::PatientRecord,
    resolved::ResolvedInput,
};

/// The Disease Ontology.
pub trait DoidModel: Send + Sync {
    /// Map DOID term names to DOID ids. Unknown terms are absent from the result.
    fn resolve_terms_to_doids(&self, terms: &[&str]) -> BTreeSet<String>;

    /// True when the set describes a known cancer location.
    fn is_valid_cancer_doid_set(&self, doids: &BTreeSet<String>) -> bool;

    /// The DOID itself plus all its ancestors.
    fn doid_with_parents(&self, doid: &str) -> BTreeSet<String>;
}

/// The ICD-11 classification.
pub trait IcdModel: Send + Sync {
    fn resolve_code_for_title(&self, title: &str) -> Option<String>;

    fn is_valid_code(&self, code: &str) -> bool;

    /// True when `code` equals `ancestor` or lies below it in the hierarchy.
    fn is_same_or_descendant(&self, code: &str, ancestor: &str) -> bool;
}

/// Curated treatments and drugs.
pub trait TreatmentDatabase: Send + Sync {
    fn find_treatment_by_name(&self, name: &str) -> Option<Treatment>;

    fn find_drug_by_name(&self, name: &str) -> Option<Drug>;
}

pub trait GeneChecker: Send + Sync {
    fn is_valid_gene(&self, symbol: &str) -> bool;
}

/// Named groups of ATC codes, e.g. "Anticoagulants".
pub trait MedicationCategories: Send + Sync {
    fn resolve_category(&self, name: &str) -> Option<MedicationCategory>;

    /// Names of every category whose ATC levels cover `atc_code`.
    fn categories_for_atc_code(&self, atc_code: &str) -> BTreeSet<String>;
}

/// The clinical logic of one leaf rule.
///
/// Implementations must be pure: same patient, input and reference date give
/// the same evaluation. Missing patient data is reported as an UNDETERMINED
/// evaluation, never as an error; `Err` is reserved for defects such as an
/// input that does not match the rule's shape.
pub trait LeafEvaluator: Send + Sync {
    fn evaluate(
        &self,
        patient: &PatientRecord,
        input: &ResolvedInput,
        reference_date: NaiveDate,
    ) -> MatchResult<Evaluation>;
}

impl<F> LeafEvaluator for F
where
    F: Fn(&PatientRecord, &ResolvedInput, NaiveDate) -> MatchResult<Evaluation> + Send + Sync,
{
    fn evaluate(
        &self,
        patient: &PatientRecord,
        input: &ResolvedInput,
        reference_date: NaiveDate,
    ) -> MatchResult<Evaluation> {
        self(patient, input, reference_date)
    }
}
