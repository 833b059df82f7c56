//! Reference leaf evaluators.
//!
//! Clinical logic for the subset of leaf rules the sample trials use. Each
//! submodule covers one clinical domain and registers its rules through a
//! `register` function. Evaluators that need a knowledge base capture a
//! shared `Arc<ReferenceKnowledge>`; the others are plain functions.
//!
//! Conventions shared by every evaluator:
//! - data that is absent from the record gives UNDETERMINED, never an error
//! - a lab value outside its bound is a recoverable FAIL (labs can be redone)
//! - values that cannot occur in a valid record (a WHO status above 5) are
//!   reported as a `Defect`

use std::sync::Arc;

use tracing::info;

use eligibility_contracts::{
    error::{MatchError, MatchResult},
    evaluation::Evaluation,
    resolved::ResolvedInput,
};
use eligibility_core::registry::LeafEvaluatorRegistry;

use crate::knowledge::ReferenceKnowledge;

pub mod conditions;
pub mod general;
pub mod laboratory;
pub mod medication;
pub mod molecular;
pub mod treatment;
pub mod tumor;

/// A registry with every reference evaluator.
pub fn reference_registry(knowledge: Arc<ReferenceKnowledge>) -> MatchResult<LeafEvaluatorRegistry> {
    let mut registry = LeafEvaluatorRegistry::new();
    general::register(&mut registry)?;
    tumor::register(&mut registry, &knowledge)?;
    treatment::register(&mut registry)?;
    molecular::register(&mut registry)?;
    laboratory::register(&mut registry)?;
    conditions::register(&mut registry, &knowledge)?;
    medication::register(&mut registry)?;
    info!(rules = registry.len(), "reference leaf evaluators registered");
    Ok(registry)
}

/// Map a recorded yes/no flag onto PASS, FAIL or UNDETERMINED.
pub(crate) fn flag(value: Option<bool>, yes: &str, no: &str, unknown: &str) -> Evaluation {
    match value {
        Some(true) => Evaluation::pass(yes, yes),
        Some(false) => Evaluation::fail(no, no),
        None => Evaluation::undetermined(unknown, unknown),
    }
}

pub(crate) fn defect(input: &ResolvedInput, reason: impl Into<String>) -> MatchError {
    MatchError::Defect { rule: input.rule.name().to_string(), reason: reason.into() }
}

/// Join names for messages, e.g. `CAPECITABINE, OXALIPLATIN`.
pub(crate) fn listing<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    names.into_iter().collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
pub(crate) mod testing {
    //! Patient builders shared by the evaluator tests.

    use chrono::NaiveDate;

    use eligibility_contracts::{
        input::FunctionInput,
        patient::{Gender, PatientRecord, TumorDetails},
        resolved::{ResolvedInput, ResolvedParam},
        rule::{EligibilityRule, RuleShape},
    };

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn reference_date() -> NaiveDate {
        date(2024, 6, 1)
    }

    pub fn base_patient() -> PatientRecord {
        PatientRecord {
            patient_id: "TEST".to_string(),
            birth_year: 1960,
            gender: Gender::Female,
            who_status: Some(1),
            tumor: TumorDetails::default(),
            oncological_history: vec![],
            molecular: None,
            lab_values: vec![],
            comorbidities: vec![],
            toxicities: vec![],
            medications: None,
            is_pregnant: None,
            is_breastfeeding: None,
        }
    }

    /// Input for `rule` with already resolved params; the shape comes from the catalog.
    pub fn input(rule: EligibilityRule, params: Vec<ResolvedParam>) -> ResolvedInput {
        let shape = match rule.shape() {
            RuleShape::Leaf(shape) => shape,
            RuleShape::Composite(_) => FunctionInput::NoParameters,
        };
        ResolvedInput::new(rule, shape, params)
    }
}

#[cfg(test)]
mod tests {
    use eligibility_contracts::rule::EligibilityRule;

    use super::*;

    #[test]
    fn registry_covers_every_domain() {
        let registry = reference_registry(Arc::new(ReferenceKnowledge::new())).unwrap();
        for rule in [
            EligibilityRule::IsAtLeastXYearsOld,
            EligibilityRule::HasStageX,
            EligibilityRule::HasHadTreatmentWithAnyDrugX,
            EligibilityRule::MutationInGeneXOfAnyProteinImpactsY,
            EligibilityRule::HasNeutrophilsAbsOfAtLeastX,
            EligibilityRule::HasHadOtherConditionWithIcdTitleX,
            EligibilityRule::CurrentlyGetsMedicationInhibitingCypX,
        ] {
            assert!(registry.contains(rule), "{rule} is not registered");
        }
        assert!(!registry.contains(EligibilityRule::And));
    }

    #[test]
    fn flag_maps_unknown_to_undetermined() {
        use eligibility_contracts::evaluation::EvaluationResult;
        assert_eq!(flag(Some(true), "y", "n", "?").result, EvaluationResult::Pass);
        assert_eq!(flag(Some(false), "y", "n", "?").result, EvaluationResult::Fail);
        let unknown = flag(None, "y", "n", "?");
        assert_eq!(unknown.result, EvaluationResult::Undetermined);
        assert!(unknown.recoverable);
    }
}
