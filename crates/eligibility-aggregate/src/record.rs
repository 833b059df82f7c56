//! Persisted form of evaluations.
//!
//! An `EvaluationRecord` flattens one `(Eligibility, Evaluation)` pair into
//! plain strings so an external store can keep it as a row or a JSON
//! document. Message sets are joined with `;` in their sorted order.

use serde::{Deserialize, Serialize};

use eligibility_contracts::{
    error::{MatchError, MatchResult},
    evaluation::{Evaluation, EvaluationResult, MessageBucket},
    function::{CriterionReference, Eligibility},
};

use crate::summary::PatientMatch;

/// Separator of joined message and event sets.
pub const RECORD_DELIMITER: &str = ";";

fn join<'a>(items: impl IntoIterator<Item = &'a String>) -> String {
    items.into_iter().map(String::as_str).collect::<Vec<_>>().join(RECORD_DELIMITER)
}

/// Specific and general messages of one outcome, each joined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageColumns {
    pub specific: String,
    pub general: String,
}

impl From<&MessageBucket> for MessageColumns {
    fn from(bucket: &MessageBucket) -> Self {
        Self { specific: join(&bucket.specific), general: join(&bucket.general) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// Display form of the function tree, e.g. `NOT(IS_PREGNANT)`.
    pub rule: String,
    pub references: Vec<CriterionReference>,
    pub result: EvaluationResult,
    pub recoverable: bool,
    pub pass_messages: MessageColumns,
    pub warn_messages: MessageColumns,
    pub undetermined_messages: MessageColumns,
    pub fail_messages: MessageColumns,
    pub inclusion_molecular_events: String,
    pub exclusion_molecular_events: String,
}

impl EvaluationRecord {
    pub fn new(eligibility: &Eligibility, evaluation: &Evaluation) -> Self {
        Self {
            rule: eligibility.function.to_string(),
            references: eligibility.references.iter().cloned().collect(),
            result: evaluation.result,
            recoverable: evaluation.recoverable,
            pass_messages: (&evaluation.pass).into(),
            warn_messages: (&evaluation.warn).into(),
            undetermined_messages: (&evaluation.undetermined).into(),
            fail_messages: (&evaluation.fail).into(),
            inclusion_molecular_events: join(&evaluation.inclusion_molecular_events),
            exclusion_molecular_events: join(&evaluation.exclusion_molecular_events),
        }
    }
}

fn records(pairs: &[(Eligibility, Evaluation)]) -> Vec<EvaluationRecord> {
    pairs.iter().map(|(eligibility, evaluation)| EvaluationRecord::new(eligibility, evaluation)).collect()
}

/// Rows for one trial of a patient match: general criteria first, then each
/// cohort in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub trial_id: String,
    /// `None` for the trial's general criteria.
    pub cohort_id: Option<String>,
    pub is_potentially_eligible: bool,
    pub evaluations: Vec<EvaluationRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecordSet {
    pub run_id: String,
    pub patient_id: String,
    pub reference_date: String,
    pub trials: Vec<TrialRecord>,
}

impl PatientRecordSet {
    pub fn from_match(patient_match: &PatientMatch) -> Self {
        let trials = patient_match
            .trial_matches
            .iter()
            .flat_map(|trial| {
                let trial_id = &trial.identification.trial_id;
                std::iter::once(TrialRecord {
                    trial_id: trial_id.clone(),
                    cohort_id: None,
                    is_potentially_eligible: trial.is_potentially_eligible,
                    evaluations: records(&trial.evaluations),
                })
                .chain(trial.cohorts.iter().map(move |cohort| TrialRecord {
                    trial_id: trial_id.clone(),
                    cohort_id: Some(cohort.metadata.cohort_id.clone()),
                    is_potentially_eligible: cohort.is_potentially_eligible,
                    evaluations: records(&cohort.evaluations),
                }))
            })
            .collect();

        Self {
            run_id: patient_match.run_id.to_string(),
            patient_id: patient_match.patient_id.clone(),
            reference_date: patient_match.reference_date.to_string(),
            trials,
        }
    }

    /// Compact JSON, one document per patient.
    pub fn to_json(&self) -> MatchResult<String> {
        serde_json::to_string(self).map_err(|e| MatchError::Output {
            reason: format!("failed to serialize records for patient '{}': {}", self.patient_id, e),
        })
    }

    pub fn to_json_pretty(&self) -> MatchResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| MatchError::Output {
            reason: format!("failed to serialize records for patient '{}': {}", self.patient_id, e),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use uuid::Uuid;

    use eligibility_contracts::{
        function::EligibilityFunction,
        rule::EligibilityRule,
        trial::{CohortMetadata, TrialIdentification},
    };

    use super::*;
    use crate::summary::{CohortMatch, TrialMatch};

    fn not_pregnant() -> Eligibility {
        Eligibility::new(
            EligibilityFunction::composite(
                EligibilityRule::Not,
                vec![EligibilityFunction::leaf(EligibilityRule::IsPregnant, Vec::<String>::new())],
            ),
            vec![CriterionReference::new("E-10", "Pregnancy"), CriterionReference::new("E-2", "Lactation")],
        )
    }

    #[test]
    fn test_record_flattens_evaluation() {
        let mut evaluation = Evaluation::fail("Patient is pregnant", "Pregnancy").with_inclusion_event("KRAS G12C");
        evaluation.fail.specific.insert("Second reason".to_string());

        let record = EvaluationRecord::new(&not_pregnant(), &evaluation);

        assert_eq!(record.rule, "NOT(IS_PREGNANT)");
        assert_eq!(record.result, EvaluationResult::Fail);
        assert!(!record.recoverable);
        assert_eq!(record.fail_messages.specific, "Patient is pregnant;Second reason");
        assert_eq!(record.fail_messages.general, "Pregnancy");
        assert_eq!(record.pass_messages, MessageColumns::default());
        assert_eq!(record.inclusion_molecular_events, "KRAS G12C");
        let ids: Vec<_> = record.references.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["E-2", "E-10"], "references keep numeric-aware order");
    }

    #[test]
    fn test_record_set_serializes_to_json() {
        let cohort = CohortMatch {
            metadata: CohortMetadata {
                cohort_id: "A".to_string(),
                description: "A".to_string(),
                open: true,
                slots_available: true,
                evaluable: true,
            },
            is_potentially_eligible: true,
            evaluations: vec![(not_pregnant(), Evaluation::pass("Not pregnant", ""))],
        };
        let trial = TrialMatch {
            identification: TrialIdentification {
                trial_id: "T1".to_string(),
                acronym: "T1".to_string(),
                title: "Trial".to_string(),
                open: true,
            },
            is_potentially_eligible: true,
            evaluations: vec![],
            cohorts: vec![cohort],
        };
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let set = PatientRecordSet::from_match(&PatientMatch::new(Uuid::new_v4(), "P1", date, vec![trial]));

        assert_eq!(set.trials.len(), 2);
        assert_eq!(set.trials[0].cohort_id, None);
        assert_eq!(set.trials[1].cohort_id.as_deref(), Some("A"));

        let json: serde_json::Value = serde_json::from_str(&set.to_json().unwrap()).unwrap();
        assert_eq!(json["reference_date"], "2024-06-01");
        assert_eq!(json["trials"][1]["evaluations"][0]["result"], "PASS");
        assert_eq!(json["trials"][1]["evaluations"][0]["rule"], "NOT(IS_PREGNANT)");
    }
}
