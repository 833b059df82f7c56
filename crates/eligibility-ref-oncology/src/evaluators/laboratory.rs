//! Laboratory thresholds.
//!
//! Absolute-count rules compare the most recent value directly; ULN rules
//! compare it as a multiple of the upper limit of normal. An out-of-range
//! value is a recoverable FAIL: the lab can be repeated before inclusion.

use chrono::NaiveDate;

use eligibility_contracts::{
    error::MatchResult,
    evaluation::Evaluation,
    patient::{LabMeasure, PatientRecord},
    resolved::ResolvedInput,
    rule::EligibilityRule,
};
use eligibility_core::registry::LeafEvaluatorRegistry;

pub fn register(registry: &mut LeafEvaluatorRegistry) -> MatchResult<()> {
    for (rule, measure) in [
        (EligibilityRule::HasLeukocytesAbsOfAtLeastX, LabMeasure::LeukocytesAbs),
        (EligibilityRule::HasNeutrophilsAbsOfAtLeastX, LabMeasure::NeutrophilsAbs),
        (EligibilityRule::HasLymphocytesAbsOfAtLeastX, LabMeasure::LymphocytesAbs),
        (EligibilityRule::HasThrombocytesAbsOfAtLeastX, LabMeasure::ThrombocytesAbs),
        (EligibilityRule::HasHemoglobinGPerDlOfAtLeastX, LabMeasure::Hemoglobin),
        (EligibilityRule::HasAlbuminGPerDlOfAtLeastX, LabMeasure::Albumin),
    ] {
        registry.register(rule, value_of_at_least(measure))?;
    }
    for (rule, measure) in [
        (EligibilityRule::HasCreatinineUlnOfAtMostX, LabMeasure::Creatinine),
        (EligibilityRule::HasTotalBilirubinUlnOfAtMostX, LabMeasure::TotalBilirubin),
        (EligibilityRule::HasDirectBilirubinUlnOfAtMostX, LabMeasure::DirectBilirubin),
        (EligibilityRule::HasAsatUlnOfAtMostX, LabMeasure::Asat),
        (EligibilityRule::HasAlatUlnOfAtMostX, LabMeasure::Alat),
        (EligibilityRule::HasAlpUlnOfAtMostX, LabMeasure::AlkalinePhosphatase),
        (EligibilityRule::HasLdhUlnOfAtMostX, LabMeasure::Ldh),
    ] {
        registry.register(rule, uln_of_at_most(measure))?;
    }
    Ok(())
}

fn label(measure: LabMeasure) -> &'static str {
    match measure {
        LabMeasure::LeukocytesAbs => "Leukocytes",
        LabMeasure::NeutrophilsAbs => "Neutrophils",
        LabMeasure::LymphocytesAbs => "Lymphocytes",
        LabMeasure::ThrombocytesAbs => "Thrombocytes",
        LabMeasure::Hemoglobin => "Hemoglobin",
        LabMeasure::Creatinine => "Creatinine",
        LabMeasure::TotalBilirubin => "Total bilirubin",
        LabMeasure::DirectBilirubin => "Direct bilirubin",
        LabMeasure::Asat => "ASAT",
        LabMeasure::Alat => "ALAT",
        LabMeasure::AlkalinePhosphatase => "ALP",
        LabMeasure::Albumin => "Albumin",
        LabMeasure::Ldh => "LDH",
    }
}

fn no_measurement(measure: LabMeasure) -> Evaluation {
    let name = label(measure);
    Evaluation::undetermined(format!("No measurement found for {name}"), format!("{name} unknown"))
}

fn value_of_at_least(
    measure: LabMeasure,
) -> impl Fn(&PatientRecord, &ResolvedInput, NaiveDate) -> MatchResult<Evaluation> + Send + Sync {
    move |patient, input, reference_date| {
        let min = input.double(0)?;
        let name = label(measure);
        let Some(lab) = patient.latest_lab(measure, reference_date) else { return Ok(no_measurement(measure)) };
        Ok(if lab.value >= min {
            Evaluation::pass(format!("{name} {} {} is at least {min}", lab.value, lab.unit), format!("Adequate {name}"))
        } else {
            Evaluation::recoverable_fail(
                format!("{name} {} {} is below {min} (measured {})", lab.value, lab.unit, lab.date),
                format!("Inadequate {name}"),
            )
        })
    }
}

fn uln_of_at_most(
    measure: LabMeasure,
) -> impl Fn(&PatientRecord, &ResolvedInput, NaiveDate) -> MatchResult<Evaluation> + Send + Sync {
    move |patient, input, reference_date| {
        let max = input.double(0)?;
        let name = label(measure);
        let Some(lab) = patient.latest_lab(measure, reference_date) else { return Ok(no_measurement(measure)) };
        let Some(multiple) = lab.uln_multiple() else {
            return Ok(Evaluation::undetermined(
                format!("{name} has no upper limit of normal"),
                format!("{name} ULN unknown"),
            ));
        };
        Ok(if multiple <= max {
            Evaluation::pass(format!("{name} is {multiple:.1}x ULN, at most {max}x ULN"), format!("Adequate {name}"))
        } else {
            Evaluation::recoverable_fail(
                format!("{name} is {multiple:.1}x ULN, above {max}x ULN (measured {})", lab.date),
                format!("Inadequate {name}"),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use eligibility_contracts::{evaluation::EvaluationResult, patient::LabValue, resolved::ResolvedParam};

    use super::*;
    use crate::evaluators::testing::{base_patient, date, input, reference_date};

    fn lab(measure: LabMeasure, on: NaiveDate, value: f64, uln: Option<f64>) -> LabValue {
        LabValue { measure, date: on, value, unit: "x10^9/L".to_string(), ref_limit_up: uln }
    }

    #[test]
    fn low_count_is_recoverable() {
        let mut patient = base_patient();
        let threshold = input(EligibilityRule::HasNeutrophilsAbsOfAtLeastX, vec![ResolvedParam::Double(1.5)]);
        let evaluate = value_of_at_least(LabMeasure::NeutrophilsAbs);

        assert_eq!(evaluate(&patient, &threshold, reference_date()).unwrap().result, EvaluationResult::Undetermined);

        patient.lab_values = vec![
            lab(LabMeasure::NeutrophilsAbs, date(2024, 4, 1), 2.0, None),
            lab(LabMeasure::NeutrophilsAbs, date(2024, 5, 28), 1.1, None),
        ];
        let evaluation = evaluate(&patient, &threshold, reference_date()).unwrap();
        assert_eq!(evaluation.result, EvaluationResult::Fail);
        assert!(evaluation.recoverable);
        assert!(!evaluation.is_hard_fail());
    }

    #[test]
    fn labs_after_reference_date_are_ignored() {
        let mut patient = base_patient();
        patient.lab_values = vec![
            lab(LabMeasure::NeutrophilsAbs, date(2024, 5, 1), 2.0, None),
            lab(LabMeasure::NeutrophilsAbs, date(2024, 7, 1), 0.5, None),
        ];
        let threshold = input(EligibilityRule::HasNeutrophilsAbsOfAtLeastX, vec![ResolvedParam::Double(1.5)]);
        let evaluation = value_of_at_least(LabMeasure::NeutrophilsAbs)(&patient, &threshold, reference_date()).unwrap();
        assert_eq!(evaluation.result, EvaluationResult::Pass);
    }

    #[test]
    fn uln_multiple() {
        let mut patient = base_patient();
        let threshold = input(EligibilityRule::HasAsatUlnOfAtMostX, vec![ResolvedParam::Double(2.5)]);
        let evaluate = uln_of_at_most(LabMeasure::Asat);

        patient.lab_values = vec![lab(LabMeasure::Asat, date(2024, 5, 20), 80.0, Some(40.0))];
        assert_eq!(evaluate(&patient, &threshold, reference_date()).unwrap().result, EvaluationResult::Pass);

        patient.lab_values = vec![lab(LabMeasure::Asat, date(2024, 5, 20), 120.0, Some(40.0))];
        assert_eq!(evaluate(&patient, &threshold, reference_date()).unwrap().result, EvaluationResult::Fail);

        patient.lab_values = vec![lab(LabMeasure::Asat, date(2024, 5, 20), 120.0, None)];
        assert_eq!(evaluate(&patient, &threshold, reference_date()).unwrap().result, EvaluationResult::Undetermined);
    }
}
