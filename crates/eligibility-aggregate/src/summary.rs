//! Trial and cohort level aggregation.
//!
//! A trial (or cohort) stays potentially eligible unless one of its
//! evaluations is a FAIL that cannot be recovered from. A cohort additionally
//! requires the trial's general criteria to hold. Evaluations are kept as
//! they are; aggregation only adds the verdicts.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use eligibility_contracts::{
    error::MatchError,
    evaluation::Evaluation,
    function::Eligibility,
    trial::{CohortMetadata, TrialIdentification},
};
use eligibility_core::{batch::PairOutcome, evaluator::TrialEvaluation};

/// False when any evaluation is a non-recoverable FAIL.
pub fn is_potentially_eligible(evaluations: &[(Eligibility, Evaluation)]) -> bool {
    !evaluations.iter().any(|(_, evaluation)| evaluation.is_hard_fail())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortMatch {
    pub metadata: CohortMetadata,
    pub is_potentially_eligible: bool,
    pub evaluations: Vec<(Eligibility, Evaluation)>,
}

impl CohortMatch {
    /// Potentially eligible, evaluable, open and with slots left.
    pub fn is_open_fit(&self) -> bool {
        self.is_potentially_eligible
            && self.metadata.evaluable
            && self.metadata.open
            && self.metadata.slots_available
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialMatch {
    pub identification: TrialIdentification,
    pub is_potentially_eligible: bool,
    /// Evaluations of the trial's general criteria.
    pub evaluations: Vec<(Eligibility, Evaluation)>,
    pub cohorts: Vec<CohortMatch>,
}

impl TrialMatch {
    pub fn from_evaluation(evaluation: TrialEvaluation) -> Self {
        let trial_eligible = is_potentially_eligible(&evaluation.general);
        let cohorts = evaluation
            .cohorts
            .into_iter()
            .map(|cohort| CohortMatch {
                is_potentially_eligible: trial_eligible && is_potentially_eligible(&cohort.evaluations),
                metadata: cohort.metadata,
                evaluations: cohort.evaluations,
            })
            .collect();

        debug!(
            trial_id = %evaluation.identification.trial_id,
            patient_id = %evaluation.patient_id,
            eligible = trial_eligible,
            "aggregated trial evaluation"
        );

        Self {
            identification: evaluation.identification,
            is_potentially_eligible: trial_eligible,
            evaluations: evaluation.general,
            cohorts,
        }
    }

    /// Every evaluation of the trial and its cohorts.
    pub fn all_evaluations(&self) -> impl Iterator<Item = &(Eligibility, Evaluation)> {
        self.evaluations.iter().chain(self.cohorts.iter().flat_map(|c| c.evaluations.iter()))
    }
}

/// Counts over the trial matches of one patient.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub trials: usize,
    pub eligible_trials: usize,
    pub eligible_cohorts: usize,
    pub ineligible_cohorts: usize,
    pub open_cohorts_with_slots: usize,
}

/// All trial matches of one patient for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientMatch {
    pub run_id: Uuid,
    pub patient_id: String,
    pub reference_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub trial_matches: Vec<TrialMatch>,
}

impl PatientMatch {
    pub fn new(run_id: Uuid, patient_id: impl Into<String>, reference_date: NaiveDate, trial_matches: Vec<TrialMatch>) -> Self {
        Self { run_id, patient_id: patient_id.into(), reference_date, created_at: Utc::now(), trial_matches }
    }

    pub fn summary(&self) -> MatchSummary {
        let cohorts = || self.trial_matches.iter().flat_map(|t| t.cohorts.iter());
        let eligible_cohorts = cohorts().filter(|c| c.is_potentially_eligible).count();
        MatchSummary {
            trials: self.trial_matches.len(),
            eligible_trials: self.trial_matches.iter().filter(|t| t.is_potentially_eligible).count(),
            eligible_cohorts,
            ineligible_cohorts: cohorts().count() - eligible_cohorts,
            open_cohorts_with_slots: cohorts().filter(|c| c.is_open_fit()).count(),
        }
    }
}

/// A pair that could not be evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct PairDefect {
    pub trial_id: String,
    pub patient_id: String,
    pub error: MatchError,
}

/// The aggregated output of one batch run.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub matches: Vec<PatientMatch>,
    pub defects: Vec<PairDefect>,
}

/// Group batch outcomes by patient under a fresh run id.
///
/// Patients are ordered by id; within a patient trials keep batch order.
pub fn aggregate_batch(outcomes: Vec<PairOutcome>, reference_date: NaiveDate) -> BatchReport {
    let run_id = Uuid::new_v4();
    let mut by_patient: BTreeMap<String, Vec<TrialMatch>> = BTreeMap::new();
    let mut defects = Vec::new();

    for outcome in outcomes {
        match outcome.result {
            Ok(evaluation) => by_patient
                .entry(outcome.patient_id)
                .or_default()
                .push(TrialMatch::from_evaluation(evaluation)),
            Err(error) => {
                by_patient.entry(outcome.patient_id.clone()).or_default();
                defects.push(PairDefect { trial_id: outcome.trial_id, patient_id: outcome.patient_id, error });
            }
        }
    }

    let matches: Vec<PatientMatch> = by_patient
        .into_iter()
        .map(|(patient_id, trial_matches)| PatientMatch::new(run_id, patient_id, reference_date, trial_matches))
        .collect();

    info!(run_id = %run_id, patients = matches.len(), defects = defects.len(), "aggregated batch");
    BatchReport { run_id, matches, defects }
}

#[cfg(test)]
mod tests {
    use eligibility_contracts::{
        function::EligibilityFunction, rule::EligibilityRule,
    };
    use eligibility_core::evaluator::CohortEvaluation;

    use super::*;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn criterion(evaluation: Evaluation) -> (Eligibility, Evaluation) {
        (Eligibility::new(EligibilityFunction::leaf(EligibilityRule::IsMale, Vec::<String>::new()), vec![]), evaluation)
    }

    fn metadata(id: &str, slots_available: bool) -> CohortMetadata {
        CohortMetadata {
            cohort_id: id.to_string(),
            description: id.to_string(),
            open: true,
            slots_available,
            evaluable: true,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn trial_evaluation(general: Vec<Evaluation>, cohorts: Vec<(CohortMetadata, Vec<Evaluation>)>) -> TrialEvaluation {
        TrialEvaluation {
            identification: TrialIdentification {
                trial_id: "T1".to_string(),
                acronym: "T1".to_string(),
                title: "Trial".to_string(),
                open: true,
            },
            patient_id: "P1".to_string(),
            reference_date: date(),
            general: general.into_iter().map(criterion).collect(),
            cohorts: cohorts
                .into_iter()
                .map(|(metadata, evaluations)| CohortEvaluation {
                    metadata,
                    evaluations: evaluations.into_iter().map(criterion).collect(),
                })
                .collect(),
        }
    }

    // ── Eligibility verdicts ──────────────────────────────────────────────────

    #[test]
    fn test_hard_fail_makes_trial_ineligible() {
        let m = TrialMatch::from_evaluation(trial_evaluation(
            vec![Evaluation::pass("ok", ""), Evaluation::fail("too young", "")],
            vec![(metadata("A", true), vec![Evaluation::pass("ok", "")])],
        ));
        assert!(!m.is_potentially_eligible);
        assert!(!m.cohorts[0].is_potentially_eligible, "cohort inherits the trial-level failure");
        assert_eq!(m.evaluations.len(), 2, "evaluations are retained");
    }

    #[test]
    fn test_recoverable_fail_keeps_eligibility() {
        let m = TrialMatch::from_evaluation(trial_evaluation(
            vec![Evaluation::recoverable_fail("lab too old", "")],
            vec![(metadata("A", true), vec![Evaluation::undetermined("unknown", "")])],
        ));
        assert!(m.is_potentially_eligible);
        assert!(m.cohorts[0].is_potentially_eligible);
    }

    #[test]
    fn test_cohort_fail_does_not_affect_trial() {
        let m = TrialMatch::from_evaluation(trial_evaluation(
            vec![Evaluation::pass("ok", "")],
            vec![
                (metadata("A", true), vec![Evaluation::fail("no KRAS", "")]),
                (metadata("B", true), vec![Evaluation::warn("check", "")]),
            ],
        ));
        assert!(m.is_potentially_eligible);
        assert!(!m.cohorts[0].is_potentially_eligible);
        assert!(m.cohorts[1].is_potentially_eligible);
        assert_eq!(m.all_evaluations().count(), 3);
    }

    // ── Summaries ─────────────────────────────────────────────────────────────

    #[test]
    fn test_summary_counts() {
        let m = TrialMatch::from_evaluation(trial_evaluation(
            vec![Evaluation::pass("ok", "")],
            vec![
                (metadata("A", true), vec![Evaluation::pass("ok", "")]),
                (metadata("B", false), vec![Evaluation::pass("ok", "")]),
                (metadata("C", true), vec![Evaluation::fail("no", "")]),
            ],
        ));
        let patient = PatientMatch::new(Uuid::new_v4(), "P1", date(), vec![m]);
        assert_eq!(
            patient.summary(),
            MatchSummary {
                trials: 1,
                eligible_trials: 1,
                eligible_cohorts: 2,
                ineligible_cohorts: 1,
                open_cohorts_with_slots: 1,
            }
        );
    }

    #[test]
    fn test_aggregate_batch_groups_by_patient() {
        let ok = |patient: &str| PairOutcome {
            trial_id: "T1".to_string(),
            patient_id: patient.to_string(),
            result: Ok(trial_evaluation(vec![Evaluation::pass("ok", "")], vec![])),
        };
        let broken = PairOutcome {
            trial_id: "T2".to_string(),
            patient_id: "P2".to_string(),
            result: Err(MatchError::Defect { rule: "IS_MALE".to_string(), reason: "boom".to_string() }),
        };

        let report = aggregate_batch(vec![ok("P2"), ok("P1"), broken], date());

        let ids: Vec<_> = report.matches.iter().map(|m| m.patient_id.as_str()).collect();
        assert_eq!(ids, vec!["P1", "P2"]);
        assert!(report.matches.iter().all(|m| m.run_id == report.run_id));
        assert_eq!(report.defects.len(), 1);
        assert_eq!(report.defects[0].trial_id, "T2");
        assert_eq!(report.matches[1].trial_matches.len(), 1);
    }
}
