//! The composite evaluator.
//!
//! Walks a `CompiledFunction` tree for one patient and reference date:
//!
//!   Leaf → registered LeafEvaluator
//!   AND / OR / NOT / WARN_IF → combine the children's evaluations
//!
//! Evaluation is a pure function of (tree, patient, reference date). The
//! evaluator holds no state between calls and recursion is bounded by the
//! depth of the tree, which is fixed at trial load.
//!
//! Combination rules:
//!
//! - AND: FAIL over WARN over UNDETERMINED over PASS. Messages of
//!   all children are kept. Recoverable when every non-passing child is.
//! - OR: best outcome wins (PASS > WARN > UNDETERMINED > FAIL). Only the
//!   messages of the children with the winning outcome are kept. Recoverable
//!   when any winning child is.
//! - NOT: PASS and FAIL swap, together with their message buckets and the
//!   inclusion/exclusion molecular events. WARN and UNDETERMINED pass through.
//! - WARN_IF: OR over the children, then FAIL is downgraded to WARN and the
//!   fail messages move to the warn bucket.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use eligibility_contracts::{
    error::{MatchError, MatchResult},
    evaluation::{Evaluation, EvaluationResult},
    function::Eligibility,
    patient::PatientRecord,
    rule::EligibilityRule,
    trial::{CohortMetadata, TrialIdentification},
};

use crate::compiled::{CompiledEligibility, CompiledFunction, CompiledTrial};
use crate::registry::LeafEvaluatorRegistry;

/// Evaluations of one cohort's criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortEvaluation {
    pub metadata: CohortMetadata,
    pub evaluations: Vec<(Eligibility, Evaluation)>,
}

/// Evaluations of every criterion of one trial for one patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialEvaluation {
    pub identification: TrialIdentification,
    pub patient_id: String,
    pub reference_date: NaiveDate,
    pub general: Vec<(Eligibility, Evaluation)>,
    pub cohorts: Vec<CohortEvaluation>,
}

/// Evaluates compiled function trees against patients.
pub struct Evaluator<'r> {
    registry: &'r LeafEvaluatorRegistry,
}

impl<'r> Evaluator<'r> {
    pub fn new(registry: &'r LeafEvaluatorRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &LeafEvaluatorRegistry {
        self.registry
    }

    /// Evaluate one function tree.
    ///
    /// # Errors
    ///
    /// Returns `MatchError::Defect` when a leaf has no registered evaluator or
    /// its evaluator returns an error. Missing patient data is not an error.
    pub fn evaluate(
        &self,
        function: &CompiledFunction,
        patient: &PatientRecord,
        reference_date: NaiveDate,
    ) -> MatchResult<Evaluation> {
        let evaluation = match function {
            CompiledFunction::Leaf { rule, input } => {
                let evaluator = self.registry.get(*rule).ok_or_else(|| MatchError::Defect {
                    rule: rule.name().to_string(),
                    reason: "no leaf evaluator registered".to_string(),
                })?;
                evaluator.evaluate(patient, input, reference_date).map_err(|e| {
                    error!(
                        rule = %rule,
                        patient_id = %patient.patient_id,
                        error = %e,
                        "leaf evaluation defect"
                    );
                    into_defect(*rule, e)
                })?
            }
            CompiledFunction::Composite { rule, children } => {
                let evaluations = children
                    .iter()
                    .map(|child| self.evaluate(child, patient, reference_date))
                    .collect::<MatchResult<Vec<_>>>()?;
                combine(*rule, evaluations)?
            }
        };

        debug!(
            rule = %function.rule(),
            patient_id = %patient.patient_id,
            result = %evaluation.result,
            recoverable = evaluation.recoverable,
            "evaluated function"
        );
        Ok(evaluation)
    }

    pub fn evaluate_eligibility(
        &self,
        compiled: &CompiledEligibility,
        patient: &PatientRecord,
        reference_date: NaiveDate,
    ) -> MatchResult<(Eligibility, Evaluation)> {
        let evaluation = self.evaluate(&compiled.function, patient, reference_date)?;
        Ok((compiled.eligibility.clone(), evaluation))
    }

    /// Evaluate every general and cohort criterion of a trial.
    pub fn evaluate_trial(
        &self,
        trial: &CompiledTrial,
        patient: &PatientRecord,
        reference_date: NaiveDate,
    ) -> MatchResult<TrialEvaluation> {
        let general = trial
            .general_eligibility
            .iter()
            .map(|e| self.evaluate_eligibility(e, patient, reference_date))
            .collect::<MatchResult<Vec<_>>>()?;

        let cohorts = trial
            .cohorts
            .iter()
            .map(|cohort| {
                let evaluations = cohort
                    .eligibility
                    .iter()
                    .map(|e| self.evaluate_eligibility(e, patient, reference_date))
                    .collect::<MatchResult<Vec<_>>>()?;
                Ok(CohortEvaluation { metadata: cohort.metadata.clone(), evaluations })
            })
            .collect::<MatchResult<Vec<_>>>()?;

        Ok(TrialEvaluation {
            identification: trial.identification.clone(),
            patient_id: patient.patient_id.clone(),
            reference_date,
            general,
            cohorts,
        })
    }
}

fn into_defect(rule: EligibilityRule, error: MatchError) -> MatchError {
    match error {
        MatchError::Defect { .. } => error,
        other => MatchError::Defect { rule: rule.name().to_string(), reason: other.to_string() },
    }
}

// ── Combination ──────────────────────────────────────────────────────────────

/// Combine child evaluations under a composite rule.
pub fn combine(rule: EligibilityRule, children: Vec<Evaluation>) -> MatchResult<Evaluation> {
    let defect = |reason: String| MatchError::Defect { rule: rule.name().to_string(), reason };
    match rule {
        EligibilityRule::And if children.len() >= 2 => Ok(and(children)),
        EligibilityRule::Or if children.len() >= 2 => Ok(or(children)),
        EligibilityRule::WarnIf if !children.is_empty() => Ok(warn_if(children)),
        EligibilityRule::Not => match <[Evaluation; 1]>::try_from(children) {
            Ok([child]) => Ok(not(child)),
            Err(children) => Err(defect(format!("expected 1 child, got {}", children.len()))),
        },
        EligibilityRule::And | EligibilityRule::Or | EligibilityRule::WarnIf => {
            Err(defect(format!("{} children violate the arity constraint", children.len())))
        }
        leaf => Err(defect(format!("{leaf} is not a composite rule"))),
    }
}

/// Conjunction: FAIL, then WARN, then UNDETERMINED, then PASS.
pub fn and(children: Vec<Evaluation>) -> Evaluation {
    let result = children
        .iter()
        .map(|c| c.result)
        .max_by_key(|r| r.conjunction_rank())
        .unwrap_or(EvaluationResult::Pass);
    let recoverable = children
        .iter()
        .filter(|c| c.result != EvaluationResult::Pass)
        .all(|c| c.recoverable);

    let mut combined = Evaluation::seed(result, recoverable);
    for child in children {
        combined.absorb_messages(child);
    }
    combined
}

/// Disjunction: the best outcome wins; only the winners' messages are kept.
pub fn or(children: Vec<Evaluation>) -> Evaluation {
    let result = children
        .iter()
        .map(|c| c.result)
        .min_by_key(|r| r.disjunction_rank())
        .unwrap_or(EvaluationResult::Fail);
    let recoverable = children.iter().filter(|c| c.result == result).any(|c| c.recoverable);

    let mut combined = Evaluation::seed(result, recoverable);
    for child in children.into_iter().filter(|c| c.result == result) {
        combined.absorb_messages(child);
    }
    combined
}

/// Negation: swaps PASS and FAIL; WARN and UNDETERMINED pass through.
pub fn not(child: Evaluation) -> Evaluation {
    let result = match child.result {
        EvaluationResult::Pass => EvaluationResult::Fail,
        EvaluationResult::Fail => EvaluationResult::Pass,
        other => other,
    };
    if result == child.result {
        return child;
    }
    Evaluation {
        result,
        recoverable: child.recoverable,
        pass: child.fail,
        warn: child.warn,
        undetermined: child.undetermined,
        fail: child.pass,
        inclusion_molecular_events: child.exclusion_molecular_events,
        exclusion_molecular_events: child.inclusion_molecular_events,
    }
}

/// OR over the children, then FAIL becomes WARN.
pub fn warn_if(children: Vec<Evaluation>) -> Evaluation {
    let mut combined = or(children);
    if combined.result == EvaluationResult::Fail {
        combined.result = EvaluationResult::Warn;
        let fail = std::mem::take(&mut combined.fail);
        combined.warn.absorb(fail);
    }
    combined
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rstest::rstest;

    use eligibility_contracts::{
        evaluation::EvaluationResult::{Fail, Pass, Undetermined, Warn},
        input::FunctionInput,
        patient::{Gender, PatientRecord, TumorDetails},
        resolved::{ResolvedInput, ResolvedParam},
    };

    use super::*;

    // ── Mock helpers ─────────────────────────────────────────────────────────

    fn outcome(result: EvaluationResult) -> Evaluation {
        match result {
            Pass => Evaluation::pass("pass message", "pass"),
            Warn => Evaluation::warn("warn message", "warn"),
            Undetermined => Evaluation::undetermined("undetermined message", "undetermined"),
            Fail => Evaluation::fail("fail message", "fail"),
        }
    }

    fn patient() -> PatientRecord {
        PatientRecord {
            patient_id: "ACTN-01".to_string(),
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

    fn reference_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    /// Minimum age check, reading the birth year.
    fn min_age(p: &PatientRecord, input: &ResolvedInput, date: NaiveDate) -> MatchResult<Evaluation> {
        use chrono::Datelike;
        let years = input.integer(0)?;
        if date.year() - p.birth_year >= years {
            Ok(Evaluation::pass(format!("Patient is at least {years} years old"), "Adequate age"))
        } else {
            Ok(Evaluation::fail(format!("Patient is younger than {years}"), "Inadequate age"))
        }
    }

    /// An evaluator that misreads its input.
    fn misreads_input(_: &PatientRecord, input: &ResolvedInput, _: NaiveDate) -> MatchResult<Evaluation> {
        input.double(0).map(|_| Evaluation::pass("", ""))
    }

    fn age_leaf(years: i32) -> CompiledFunction {
        CompiledFunction::Leaf {
            rule: EligibilityRule::IsAtLeastXYearsOld,
            input: ResolvedInput::new(
                EligibilityRule::IsAtLeastXYearsOld,
                FunctionInput::OneInteger,
                vec![ResolvedParam::Integer(years)],
            ),
        }
    }

    fn registry() -> LeafEvaluatorRegistry {
        let mut registry = LeafEvaluatorRegistry::new();
        registry.register(EligibilityRule::IsAtLeastXYearsOld, min_age).unwrap();
        registry
    }

    // ── Truth tables ─────────────────────────────────────────────────────────

    #[rstest]
    #[case(Pass, Pass, Pass)]
    #[case(Pass, Fail, Fail)]
    #[case(Pass, Warn, Warn)]
    #[case(Warn, Undetermined, Warn)]
    #[case(Undetermined, Warn, Warn)]
    #[case(Pass, Undetermined, Undetermined)]
    #[case(Undetermined, Fail, Fail)]
    #[case(Warn, Pass, Warn)]
    fn and_truth_table(#[case] a: EvaluationResult, #[case] b: EvaluationResult, #[case] expected: EvaluationResult) {
        assert_eq!(and(vec![outcome(a), outcome(b)]).result, expected);
    }

    #[rstest]
    #[case(Pass, Fail, Pass)]
    #[case(Fail, Fail, Fail)]
    #[case(Warn, Fail, Warn)]
    #[case(Undetermined, Fail, Undetermined)]
    #[case(Warn, Undetermined, Warn)]
    fn or_truth_table(#[case] a: EvaluationResult, #[case] b: EvaluationResult, #[case] expected: EvaluationResult) {
        assert_eq!(or(vec![outcome(a), outcome(b)]).result, expected);
    }

    #[rstest]
    #[case(Pass, Fail)]
    #[case(Fail, Pass)]
    #[case(Warn, Warn)]
    #[case(Undetermined, Undetermined)]
    fn not_truth_table(#[case] input: EvaluationResult, #[case] expected: EvaluationResult) {
        assert_eq!(not(outcome(input)).result, expected);
    }

    #[rstest]
    #[case(Fail, Warn)]
    #[case(Pass, Pass)]
    #[case(Undetermined, Undetermined)]
    #[case(Warn, Warn)]
    fn warn_if_truth_table(#[case] input: EvaluationResult, #[case] expected: EvaluationResult) {
        assert_eq!(warn_if(vec![outcome(input)]).result, expected);
    }

    // ── Messages and recoverability ──────────────────────────────────────────

    #[test]
    fn not_swaps_buckets_and_molecular_events() {
        let child = Evaluation::pass("has KRAS G12C", "KRAS").with_inclusion_event("KRAS G12C");
        let inverted = not(child);
        assert_eq!(inverted.result, Fail);
        assert!(inverted.fail.specific.contains("has KRAS G12C"));
        assert!(inverted.pass.is_empty());
        assert!(inverted.exclusion_molecular_events.contains("KRAS G12C"));
        assert!(inverted.inclusion_molecular_events.is_empty());
    }

    #[test]
    fn not_carries_recoverability() {
        assert!(not(Evaluation::recoverable_fail("x", "")).recoverable);
        assert!(!not(Evaluation::fail("x", "")).recoverable);
    }

    #[test]
    fn and_prefers_warn_over_undetermined_in_either_order() {
        for children in [
            vec![Evaluation::warn("interacting drug", "w"), Evaluation::undetermined("no lab", "u")],
            vec![Evaluation::undetermined("no lab", "u"), Evaluation::warn("interacting drug", "w")],
        ] {
            let combined = and(children);
            assert_eq!(combined.result, Warn);
            assert!(combined.warn.specific.contains("interacting drug"));
            assert!(combined.undetermined.specific.contains("no lab"));
        }
    }

    #[test]
    fn and_unions_all_messages() {
        let combined = and(vec![outcome(Pass), outcome(Fail)]);
        assert!(combined.pass.specific.contains("pass message"));
        assert!(combined.fail.specific.contains("fail message"));
    }

    #[test]
    fn and_is_recoverable_only_when_every_non_pass_child_is() {
        let all_pass = and(vec![outcome(Pass), outcome(Pass)]);
        assert!(all_pass.recoverable);

        let mixed = and(vec![Evaluation::recoverable_fail("a", ""), Evaluation::fail("b", "")]);
        assert!(!mixed.recoverable);

        let recoverable = and(vec![outcome(Pass), Evaluation::recoverable_fail("a", ""), outcome(Undetermined)]);
        assert_eq!(recoverable.result, Fail);
        assert!(recoverable.recoverable);
    }

    #[test]
    fn or_keeps_only_winning_messages() {
        let combined = or(vec![outcome(Pass), outcome(Fail), outcome(Warn)]);
        assert!(combined.pass.specific.contains("pass message"));
        assert!(combined.fail.is_empty());
        assert!(combined.warn.is_empty());
    }

    #[test]
    fn or_is_recoverable_when_any_winner_is() {
        let combined = or(vec![Evaluation::fail("a", ""), Evaluation::recoverable_fail("b", "")]);
        assert_eq!(combined.result, Fail);
        assert!(combined.recoverable);
    }

    #[test]
    fn warn_if_moves_fail_messages_to_warn() {
        let combined = warn_if(vec![outcome(Fail)]);
        assert!(combined.warn.specific.contains("fail message"));
        assert!(combined.fail.is_empty());
    }

    #[test]
    fn combine_rejects_arity_violations() {
        assert!(matches!(combine(EligibilityRule::Not, vec![]), Err(MatchError::Defect { .. })));
        assert!(matches!(combine(EligibilityRule::And, vec![outcome(Pass)]), Err(MatchError::Defect { .. })));
        assert!(matches!(combine(EligibilityRule::IsMale, vec![outcome(Pass)]), Err(MatchError::Defect { .. })));
    }

    // ── Tree evaluation ──────────────────────────────────────────────────────

    #[test]
    fn evaluates_nested_tree() {
        let registry = registry();
        let evaluator = Evaluator::new(&registry);
        // Born 1960, evaluated 2024: 64 years old.
        let tree = CompiledFunction::Composite {
            rule: EligibilityRule::And,
            children: vec![
                age_leaf(18),
                CompiledFunction::Composite { rule: EligibilityRule::Not, children: vec![age_leaf(75)] },
            ],
        };
        let evaluation = evaluator.evaluate(&tree, &patient(), reference_date()).unwrap();
        assert_eq!(evaluation.result, Pass);
        assert!(evaluation.pass.specific.contains("Patient is at least 18 years old"));
        assert!(evaluation.pass.specific.contains("Patient is younger than 75"));
    }

    #[test]
    fn evaluation_is_deterministic() {
        let registry = registry();
        let evaluator = Evaluator::new(&registry);
        let first = evaluator.evaluate(&age_leaf(70), &patient(), reference_date()).unwrap();
        let second = evaluator.evaluate(&age_leaf(70), &patient(), reference_date()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.result, Fail);
    }

    #[test]
    fn missing_evaluator_is_a_defect() {
        let registry = LeafEvaluatorRegistry::new();
        let evaluator = Evaluator::new(&registry);
        match evaluator.evaluate(&age_leaf(18), &patient(), reference_date()) {
            Err(MatchError::Defect { rule, .. }) => assert_eq!(rule, "IS_AT_LEAST_X_YEARS_OLD"),
            other => panic!("expected Defect, got {:?}", other),
        }
    }

    #[test]
    fn evaluator_error_aborts_the_tree() {
        let mut registry = LeafEvaluatorRegistry::new();
        registry.register(EligibilityRule::IsAtLeastXYearsOld, misreads_input).unwrap();
        let evaluator = Evaluator::new(&registry);
        let tree = CompiledFunction::Composite {
            rule: EligibilityRule::Or,
            children: vec![age_leaf(18), age_leaf(21)],
        };
        assert!(matches!(
            evaluator.evaluate(&tree, &patient(), reference_date()),
            Err(MatchError::Defect { .. })
        ));
    }
}
