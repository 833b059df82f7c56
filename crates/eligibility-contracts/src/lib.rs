//! # eligibility-contracts
//!
//! Shared types for the eligibility rule engine: the rule catalog, parameter
//! shapes, the function tree model, evaluations, trials and the patient
//! record.
//!
//! All crates in the workspace import from here. No evaluation logic lives in
//! this crate, only data definitions, the catalog and error types.

pub mod domain;
pub mod error;
pub mod evaluation;
pub mod function;
pub mod input;
pub mod patient;
pub mod resolved;
pub mod rule;
pub mod trial;

pub use error::{MatchError, MatchResult};
pub use evaluation::{Evaluation, EvaluationResult, MessageBucket};
pub use function::{CriterionReference, Eligibility, EligibilityFunction, FunctionParameter};
pub use input::{CompositeInput, FunctionInput, ParamKind};
pub use patient::PatientRecord;
pub use resolved::{ResolvedInput, ResolvedParam};
pub use rule::{shape_of, EligibilityRule, RuleShape};
pub use trial::{Cohort, CohortMetadata, Trial, TrialIdentification};

#[cfg(test)]
mod tests {
    use super::*;

    // ── MatchError display messages ──────────────────────────────────────────

    #[test]
    fn error_shape_display() {
        let err = MatchError::Shape {
            rule: "IS_AT_LEAST_X_YEARS_OLD".to_string(),
            reason: "expected 1 parameter(s), got 2".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid parameters for IS_AT_LEAST_X_YEARS_OLD: expected 1 parameter(s), got 2"
        );
        assert!(err.is_rejection());
    }

    #[test]
    fn error_lookup_display() {
        let err = MatchError::Lookup {
            rule: "HAS_HAD_TREATMENT_WITH_ANY_DRUG_X".to_string(),
            reason: "unknown drug 'ASPIRINE'".to_string(),
        };
        assert!(err.to_string().contains("unknown drug 'ASPIRINE'"));
        assert!(err.is_rejection());
    }

    #[test]
    fn defect_and_catalog_are_not_rejections() {
        let defect = MatchError::Defect { rule: "NOT".to_string(), reason: "x".to_string() };
        let catalog = MatchError::Catalog { reason: "no evaluator for IS_MALE".to_string() };
        assert!(!defect.is_rejection());
        assert!(!catalog.is_rejection());
        assert_eq!(catalog.to_string(), "catalog error: no evaluator for IS_MALE");
    }

    // ── Eligibility serde ────────────────────────────────────────────────────

    #[test]
    fn eligibility_serializes_rule_by_identifier() {
        let eligibility = Eligibility::new(
            EligibilityFunction::leaf(EligibilityRule::IsAtLeastXYearsOld, ["18"]),
            vec![CriterionReference::new("I-01", "Patients must be at least 18 years old")],
        );
        let json = serde_json::to_value(&eligibility).unwrap();
        assert_eq!(json["function"]["rule"], "IS_AT_LEAST_X_YEARS_OLD");
        assert_eq!(json["function"]["parameters"][0], "18");
        let decoded: Eligibility = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, eligibility);
    }

    #[test]
    fn trial_lists_leaf_rules_once() {
        let age = EligibilityFunction::leaf(EligibilityRule::IsAtLeastXYearsOld, ["18"]);
        let trial = Trial {
            identification: TrialIdentification {
                trial_id: "NL-001".to_string(),
                acronym: "TEST".to_string(),
                title: "Test trial".to_string(),
                open: true,
            },
            general_eligibility: vec![Eligibility::new(
                EligibilityFunction::composite(EligibilityRule::Not, vec![age.clone()]),
                vec![],
            )],
            cohorts: vec![Cohort {
                metadata: CohortMetadata {
                    cohort_id: "A".to_string(),
                    description: "Cohort A".to_string(),
                    open: true,
                    slots_available: true,
                    evaluable: true,
                },
                eligibility: vec![Eligibility::new(age, vec![])],
            }],
        };
        assert_eq!(trial.leaf_rules(), vec![EligibilityRule::IsAtLeastXYearsOld]);
    }
}
