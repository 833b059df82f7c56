//! Parallel evaluation of many (trial, patient) pairs.
//!
//! Before any patient is evaluated the runner checks that the registry covers
//! every leaf rule of every trial; a gap is a fatal `Catalog` error. After
//! that each pair is evaluated independently on the rayon pool. A defect in
//! one pair is reported for that pair only and the batch carries on.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use eligibility_contracts::{error::MatchResult, patient::PatientRecord};

use crate::compiled::CompiledTrial;
use crate::evaluator::{Evaluator, TrialEvaluation};

/// The outcome of evaluating one trial for one patient.
#[derive(Debug, Clone, PartialEq)]
pub struct PairOutcome {
    pub trial_id: String,
    pub patient_id: String,
    pub result: MatchResult<TrialEvaluation>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    pub pairs: usize,
    pub evaluated: usize,
    pub defects: usize,
}

pub struct BatchRunner<'r> {
    evaluator: Evaluator<'r>,
}

impl<'r> BatchRunner<'r> {
    pub fn new(evaluator: Evaluator<'r>) -> Self {
        Self { evaluator }
    }

    /// Verify registry coverage for `trials`. Fatal when a leaf rule has no evaluator.
    pub fn preflight(&self, trials: &[CompiledTrial]) -> MatchResult<()> {
        let rules: Vec<_> = trials.iter().flat_map(|t| t.leaf_rules()).collect();
        self.evaluator.registry().verify_covers(rules.iter())
    }

    /// Evaluate every trial for every patient.
    ///
    /// Outcomes are returned in trial-major order, independent of scheduling.
    pub fn run(
        &self,
        trials: &[CompiledTrial],
        patients: &[PatientRecord],
        reference_date: NaiveDate,
    ) -> MatchResult<(Vec<PairOutcome>, BatchStats)> {
        self.preflight(trials)?;

        let pairs: Vec<(&CompiledTrial, &PatientRecord)> = trials
            .iter()
            .flat_map(|trial| patients.iter().map(move |patient| (trial, patient)))
            .collect();

        info!(trials = trials.len(), patients = patients.len(), pairs = pairs.len(), "batch evaluation starting");

        let outcomes: Vec<PairOutcome> = pairs
            .par_iter()
            .map(|(trial, patient)| PairOutcome {
                trial_id: trial.identification.trial_id.clone(),
                patient_id: patient.patient_id.clone(),
                result: self.evaluator.evaluate_trial(trial, patient, reference_date),
            })
            .collect();

        let defects = outcomes.iter().filter(|o| o.result.is_err()).count();
        for outcome in outcomes.iter().filter(|o| o.result.is_err()) {
            if let Err(e) = &outcome.result {
                warn!(
                    trial_id = %outcome.trial_id,
                    patient_id = %outcome.patient_id,
                    error = %e,
                    "pair skipped after evaluation defect"
                );
            }
        }

        let stats = BatchStats { pairs: outcomes.len(), evaluated: outcomes.len() - defects, defects };
        info!(evaluated = stats.evaluated, defects = stats.defects, "batch evaluation finished");
        Ok((outcomes, stats))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use eligibility_contracts::{
        error::MatchError,
        evaluation::{Evaluation, EvaluationResult},
        function::{Eligibility, EligibilityFunction},
        input::FunctionInput,
        patient::{Gender, PatientRecord, TumorDetails},
        resolved::{ResolvedInput, ResolvedParam},
        rule::EligibilityRule,
        trial::{CohortMetadata, TrialIdentification},
    };

    use super::*;
    use crate::compiled::{CompiledCohort, CompiledEligibility, CompiledFunction};
    use crate::registry::LeafEvaluatorRegistry;

    fn patient(id: &str, who_status: Option<u8>) -> PatientRecord {
        PatientRecord {
            patient_id: id.to_string(),
            birth_year: 1970,
            gender: Gender::Male,
            who_status,
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

    /// WHO check that treats status 9 as corrupt input.
    fn who_at_most(p: &PatientRecord, input: &ResolvedInput, _: NaiveDate) -> MatchResult<Evaluation> {
        let max = input.integer(0)?;
        match p.who_status {
            Some(9) => Err(MatchError::Defect { rule: input.rule.name().to_string(), reason: "corrupt WHO".into() }),
            Some(who) if i32::from(who) <= max => Ok(Evaluation::pass(format!("WHO {who}"), "")),
            Some(who) => Ok(Evaluation::fail(format!("WHO {who}"), "")),
            None => Ok(Evaluation::undetermined("WHO unknown", "")),
        }
    }

    fn trial(rule: EligibilityRule) -> CompiledTrial {
        let function = CompiledFunction::Leaf {
            rule,
            input: ResolvedInput::new(rule, FunctionInput::OneInteger, vec![ResolvedParam::Integer(1)]),
        };
        CompiledTrial {
            identification: TrialIdentification {
                trial_id: "T1".to_string(),
                acronym: "T1".to_string(),
                title: "Test".to_string(),
                open: true,
            },
            general_eligibility: vec![],
            cohorts: vec![CompiledCohort {
                metadata: CohortMetadata {
                    cohort_id: "A".to_string(),
                    description: "A".to_string(),
                    open: true,
                    slots_available: true,
                    evaluable: true,
                },
                eligibility: vec![CompiledEligibility {
                    eligibility: Eligibility::new(EligibilityFunction::leaf(rule, ["1"]), vec![]),
                    function,
                }],
            }],
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn defect_is_isolated_to_its_pair() {
        let mut registry = LeafEvaluatorRegistry::new();
        registry.register(EligibilityRule::HasWhoStatusOfAtMostX, who_at_most).unwrap();
        let runner = BatchRunner::new(Evaluator::new(&registry));
        let patients = vec![patient("P1", Some(0)), patient("P2", Some(9)), patient("P3", None)];

        let (outcomes, stats) = runner.run(&[trial(EligibilityRule::HasWhoStatusOfAtMostX)], &patients, date()).unwrap();

        assert_eq!(stats, BatchStats { pairs: 3, evaluated: 2, defects: 1 });
        let ids: Vec<_> = outcomes.iter().map(|o| o.patient_id.as_str()).collect();
        assert_eq!(ids, vec!["P1", "P2", "P3"]);
        assert!(outcomes[1].result.is_err());
        let p3 = outcomes[2].result.as_ref().unwrap();
        assert_eq!(p3.cohorts[0].evaluations[0].1.result, EvaluationResult::Undetermined);
    }

    #[test]
    fn missing_evaluator_aborts_before_evaluation() {
        let registry = LeafEvaluatorRegistry::new();
        let runner = BatchRunner::new(Evaluator::new(&registry));
        let result = runner.run(&[trial(EligibilityRule::HasWhoStatusOfAtMostX)], &[patient("P1", Some(0))], date());
        assert!(matches!(result, Err(MatchError::Catalog { .. })));
    }
}
