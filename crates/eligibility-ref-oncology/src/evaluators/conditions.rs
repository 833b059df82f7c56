//! Other conditions and toxicities, matched on the ICD hierarchy.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Datelike, Months, NaiveDate};

use eligibility_contracts::{
    domain::IcdCode,
    error::MatchResult,
    evaluation::Evaluation,
    patient::{Comorbidity, PatientRecord, Toxicity},
    resolved::ResolvedInput,
    rule::EligibilityRule,
};
use eligibility_core::{registry::LeafEvaluatorRegistry, traits::IcdModel};

use super::{defect, listing};
use crate::knowledge::ReferenceKnowledge;

pub fn register(registry: &mut LeafEvaluatorRegistry, knowledge: &Arc<ReferenceKnowledge>) -> MatchResult<()> {
    registry.register(EligibilityRule::HasHadOtherConditionWithIcdTitleX, had_condition(Arc::clone(knowledge)))?;
    registry.register(EligibilityRule::HasHadOtherConditionWithIcdCodeFromSetX, had_condition(Arc::clone(knowledge)))?;
    registry.register(
        EligibilityRule::HasHadOtherConditionWithIcdTitleXWithinYMonths,
        had_condition_within_months(Arc::clone(knowledge)),
    )?;
    registry.register(
        EligibilityRule::HasToxicityCtcaeOfAtLeastGradeX,
        toxicity_of_at_least_grade(Arc::clone(knowledge)),
    )?;
    registry.register(
        EligibilityRule::HasToxicityCtcaeOfAtLeastGradeXWithAnyIcdTitleY,
        toxicity_of_at_least_grade(Arc::clone(knowledge)),
    )?;
    Ok(())
}

/// True when `code` is `target` or lies below it. An extension on the target
/// must be matched by the same extension.
fn icd_matches(icd: &dyn IcdModel, code: &IcdCode, target: &IcdCode) -> bool {
    icd.is_same_or_descendant(&code.main_code, &target.main_code)
        && target.extension_code.as_ref().map_or(true, |ext| code.extension_code.as_ref() == Some(ext))
}

/// One code from `IcdTitle` or several from `ManyIcdTitles`, at `index`.
fn target_codes(input: &ResolvedInput, index: usize) -> MatchResult<BTreeSet<IcdCode>> {
    match input.icd_codes(index) {
        Ok(codes) => Ok(codes.clone()),
        Err(_) => Ok(BTreeSet::from([input.icd_code(index)?.clone()])),
    }
}

fn matching_conditions<'a>(
    icd: &dyn IcdModel,
    patient: &'a PatientRecord,
    targets: &BTreeSet<IcdCode>,
) -> Vec<&'a Comorbidity> {
    patient
        .comorbidities
        .iter()
        .filter(|condition| targets.iter().any(|target| icd_matches(icd, &condition.icd, target)))
        .collect()
}

fn codes_listing(codes: &BTreeSet<IcdCode>) -> String {
    let codes: Vec<String> = codes.iter().map(IcdCode::to_string).collect();
    listing(codes.iter().map(String::as_str))
}

fn had_condition(
    knowledge: Arc<ReferenceKnowledge>,
) -> impl Fn(&PatientRecord, &ResolvedInput, NaiveDate) -> MatchResult<Evaluation> + Send + Sync {
    move |patient, input, _| {
        let targets = target_codes(input, 0)?;
        let matching = matching_conditions(&knowledge.icd, patient, &targets);
        Ok(if matching.is_empty() {
            Evaluation::fail(format!("Patient has no history of {}", codes_listing(&targets)), "No relevant condition")
        } else {
            let names: BTreeSet<&str> = matching.iter().map(|c| c.name.as_str()).collect();
            Evaluation::pass(format!("Patient has history of {}", listing(names)), "Relevant condition")
        })
    }
}

/// Conditions carry a year only: a condition in the boundary year may fall
/// either side of the window.
fn had_condition_within_months(
    knowledge: Arc<ReferenceKnowledge>,
) -> impl Fn(&PatientRecord, &ResolvedInput, NaiveDate) -> MatchResult<Evaluation> + Send + Sync {
    move |patient, input, reference_date| {
        let targets = target_codes(input, 0)?;
        let months = input.integer(1)?;
        let window = u32::try_from(months).map_err(|_| defect(input, format!("negative month window {months}")))?;
        let min_date = reference_date
            .checked_sub_months(Months::new(window))
            .ok_or_else(|| defect(input, format!("month window {months} out of range")))?;
        let matching = matching_conditions(&knowledge.icd, patient, &targets);
        let requested = codes_listing(&targets);

        if matching.iter().any(|c| c.year.is_some_and(|year| year > min_date.year())) {
            return Ok(Evaluation::pass(
                format!("Patient has had {requested} within {months} months"),
                "Recent relevant condition",
            ));
        }
        if matching.iter().any(|c| c.year.map_or(true, |year| year == min_date.year())) {
            return Ok(Evaluation::undetermined(
                format!("Patient has had {requested} but it is unknown whether within {months} months"),
                "Undetermined recent condition",
            ));
        }
        Ok(Evaluation::fail(
            format!("Patient has not had {requested} within {months} months"),
            "No recent relevant condition",
        ))
    }
}

/// `HAS_TOXICITY_CTCAE_OF_AT_LEAST_GRADE_X` with an optional title filter at position 1.
fn toxicity_of_at_least_grade(
    knowledge: Arc<ReferenceKnowledge>,
) -> impl Fn(&PatientRecord, &ResolvedInput, NaiveDate) -> MatchResult<Evaluation> + Send + Sync {
    move |patient, input, reference_date| {
        let min_grade = input.integer(0)?;
        let targets = if input.len() > 1 { Some(input.icd_codes(1)?) } else { None };
        let relevant: Vec<&Toxicity> = patient
            .toxicities
            .iter()
            .filter(|t| t.evaluated_date <= reference_date)
            .filter(|t| targets.map_or(true, |codes| codes.iter().any(|code| icd_matches(&knowledge.icd, &t.icd, code))))
            .collect();

        let severe: BTreeSet<&str> = relevant
            .iter()
            .filter(|t| t.grade.is_some_and(|grade| i32::from(grade) >= min_grade))
            .map(|t| t.name.as_str())
            .collect();
        if !severe.is_empty() {
            return Ok(Evaluation::pass(
                format!("Patient has toxicities of at least grade {min_grade}: {}", listing(severe)),
                "Relevant toxicity",
            ));
        }
        if relevant.iter().any(|t| t.grade.is_none()) {
            return Ok(Evaluation::undetermined(
                format!("Patient has toxicities of unknown grade, possibly at least grade {min_grade}"),
                "Undetermined toxicity",
            ));
        }
        Ok(Evaluation::fail(format!("Patient has no toxicities of at least grade {min_grade}"), "No relevant toxicity"))
    }
}

#[cfg(test)]
mod tests {
    use eligibility_contracts::{evaluation::EvaluationResult, resolved::ResolvedParam};

    use super::*;
    use crate::evaluators::testing::{base_patient, date, input, reference_date};

    fn knowledge() -> Arc<ReferenceKnowledge> {
        Arc::new(ReferenceKnowledge::new())
    }

    fn condition(name: &str, code: &str, year: Option<i32>) -> Comorbidity {
        Comorbidity { name: name.to_string(), icd: IcdCode::new(code), year }
    }

    // ── Conditions ───────────────────────────────────────────────────────────

    #[test]
    fn condition_matches_descendant_code() {
        let evaluate = had_condition(knowledge());
        let mut patient = base_patient();
        patient.comorbidities = vec![condition("Congestive heart failure", "BD10", Some(2020))];
        let heart_failure =
            input(EligibilityRule::HasHadOtherConditionWithIcdTitleX, vec![ResolvedParam::Icd(IcdCode::new("BD1"))]);
        assert_eq!(evaluate(&patient, &heart_failure, reference_date()).unwrap().result, EvaluationResult::Pass);

        let pneumonitis =
            input(EligibilityRule::HasHadOtherConditionWithIcdTitleX, vec![ResolvedParam::Icd(IcdCode::new("CB03.4"))]);
        assert_eq!(evaluate(&patient, &pneumonitis, reference_date()).unwrap().result, EvaluationResult::Fail);
    }

    #[test]
    fn extension_must_match_when_requested() {
        let evaluate = had_condition(knowledge());
        let mut patient = base_patient();
        patient.comorbidities = vec![condition("Pneumonitis", "CB03.4", None)];
        let drug_induced = input(
            EligibilityRule::HasHadOtherConditionWithIcdCodeFromSetX,
            vec![ResolvedParam::Icds(BTreeSet::from([IcdCode::with_extension("CB03.4", "XM9K")]))],
        );
        assert_eq!(evaluate(&patient, &drug_induced, reference_date()).unwrap().result, EvaluationResult::Fail);

        patient.comorbidities[0].icd = IcdCode::with_extension("CB03.4", "XM9K");
        assert_eq!(evaluate(&patient, &drug_induced, reference_date()).unwrap().result, EvaluationResult::Pass);
    }

    #[test]
    fn condition_window_by_year() {
        let evaluate = had_condition_within_months(knowledge());
        let window = input(
            EligibilityRule::HasHadOtherConditionWithIcdTitleXWithinYMonths,
            vec![ResolvedParam::Icd(IcdCode::new("BD1")), ResolvedParam::Integer(12)],
        );
        let mut patient = base_patient();

        patient.comorbidities = vec![condition("Heart failure", "BD1", Some(2024))];
        assert_eq!(evaluate(&patient, &window, reference_date()).unwrap().result, EvaluationResult::Pass);

        patient.comorbidities = vec![condition("Heart failure", "BD1", Some(2023))];
        assert_eq!(evaluate(&patient, &window, reference_date()).unwrap().result, EvaluationResult::Undetermined);

        patient.comorbidities = vec![condition("Heart failure", "BD1", Some(2015))];
        assert_eq!(evaluate(&patient, &window, reference_date()).unwrap().result, EvaluationResult::Fail);
    }

    // ── Toxicities ───────────────────────────────────────────────────────────

    #[test]
    fn toxicity_grade_with_title_filter() {
        let evaluate = toxicity_of_at_least_grade(knowledge());
        let mut patient = base_patient();
        patient.toxicities = vec![
            Toxicity { name: "Neuropathy".into(), icd: IcdCode::new("8C0Z"), grade: Some(3), evaluated_date: date(2024, 1, 5) },
            Toxicity { name: "Diarrhoea".into(), icd: IcdCode::new("ME05.1"), grade: None, evaluated_date: date(2024, 2, 5) },
        ];

        let any = input(EligibilityRule::HasToxicityCtcaeOfAtLeastGradeX, vec![ResolvedParam::Integer(3)]);
        assert_eq!(evaluate(&patient, &any, reference_date()).unwrap().result, EvaluationResult::Pass);

        let diarrhoea = input(
            EligibilityRule::HasToxicityCtcaeOfAtLeastGradeXWithAnyIcdTitleY,
            vec![ResolvedParam::Integer(2), ResolvedParam::Icds(BTreeSet::from([IcdCode::new("ME05.1")]))],
        );
        assert_eq!(evaluate(&patient, &diarrhoea, reference_date()).unwrap().result, EvaluationResult::Undetermined);
    }
}
