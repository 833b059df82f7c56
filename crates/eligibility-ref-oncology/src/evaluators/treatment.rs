//! Prior oncological treatments.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};

use eligibility_contracts::{
    domain::{Drug, DrugType, TreatmentCategory, TreatmentCategoryOrType},
    error::MatchResult,
    evaluation::Evaluation,
    patient::{PatientRecord, TreatmentHistoryEntry},
    resolved::ResolvedInput,
    rule::EligibilityRule,
};
use eligibility_core::registry::LeafEvaluatorRegistry;

use super::listing;

pub fn register(registry: &mut LeafEvaluatorRegistry) -> MatchResult<()> {
    registry.register(EligibilityRule::HasHadTreatmentWithAnyDrugX, has_had_any_drug)?;
    registry.register(EligibilityRule::HasHadTreatmentWithAnyDrugXWithinYWeeks, has_had_any_drug_within_weeks)?;
    registry.register(EligibilityRule::HasHadPdFollowingTreatmentWithAnyDrugX, has_had_pd_following_any_drug)?;
    registry.register(EligibilityRule::HasHadTreatmentWithAnyCategoryX, has_had_any_category)?;
    registry.register(EligibilityRule::HasHadCategoryXTreatment, has_had_category_or_type)?;
    registry.register(EligibilityRule::HasHadCategoryXTreatmentWithinYWeeks, has_had_category_or_type_within_weeks)?;
    registry.register(EligibilityRule::HasHadCategoryXTreatmentOfTypesY, has_had_category_of_types)?;
    registry.register(EligibilityRule::HasHadAtLeastXSystemicTreatmentLines, has_had_at_least_systemic_lines)?;
    registry.register(EligibilityRule::HasHadAtMostXSystemicTreatmentLines, has_had_at_most_systemic_lines)?;
    Ok(())
}

fn uses_any_drug(entry: &TreatmentHistoryEntry, drugs: &BTreeSet<Drug>) -> bool {
    entry.treatment.drugs.iter().any(|given| drugs.iter().any(|wanted| wanted.name == given.name))
}

fn matches_category_or_type(entry: &TreatmentHistoryEntry, wanted: TreatmentCategoryOrType) -> bool {
    match wanted {
        TreatmentCategoryOrType::Category(category) => entry.treatment.categories.contains(&category),
        TreatmentCategoryOrType::Type(drug_type) => entry.treatment.types.contains(&drug_type),
    }
}

fn treatment_names<'a>(entries: impl IntoIterator<Item = &'a TreatmentHistoryEntry>) -> String {
    let names: BTreeSet<&str> = entries.into_iter().map(|entry| entry.treatment.name.as_str()).collect();
    listing(names)
}

/// Whether a line was still given on or after `min_date`.
///
/// Ongoing lines count as recent once started. A line without any date cannot
/// be placed.
fn given_since(entry: &TreatmentHistoryEntry, min_date: NaiveDate) -> Option<bool> {
    match (entry.start_date, entry.stop_date) {
        (_, Some(stop)) => Some(stop >= min_date),
        (Some(_), None) => Some(true),
        (None, None) => None,
    }
}

/// PASS when a matching line is recent, UNDETERMINED when one cannot be placed.
fn recency(matching: &[&TreatmentHistoryEntry], min_date: NaiveDate, what: &str, weeks: i32) -> Evaluation {
    let recent: Vec<&TreatmentHistoryEntry> =
        matching.iter().copied().filter(|entry| given_since(entry, min_date) == Some(true)).collect();
    if !recent.is_empty() {
        return Evaluation::pass(
            format!("Patient has received {what} ({}) within {weeks} weeks", treatment_names(recent)),
            format!("Recent {what}"),
        );
    }
    if matching.iter().any(|entry| given_since(entry, min_date).is_none()) {
        return Evaluation::undetermined(
            format!("Patient has received {what} but it is unknown whether within {weeks} weeks"),
            format!("Undetermined recent {what}"),
        );
    }
    Evaluation::fail(format!("Patient has not received {what} within {weeks} weeks"), format!("No recent {what}"))
}

fn weeks_before(reference_date: NaiveDate, weeks: i32) -> NaiveDate {
    reference_date - Duration::weeks(i64::from(weeks))
}

fn has_had_any_drug(patient: &PatientRecord, input: &ResolvedInput, _: NaiveDate) -> MatchResult<Evaluation> {
    let drugs = input.drugs(0)?;
    let requested = listing(drugs.iter().map(|d| d.name.as_str()));
    let matching: Vec<&TreatmentHistoryEntry> =
        patient.oncological_history.iter().filter(|entry| uses_any_drug(entry, drugs)).collect();
    Ok(if matching.is_empty() {
        Evaluation::fail(format!("Patient has not received any of {requested}"), "No prior treatment with drugs")
    } else {
        Evaluation::pass(
            format!("Patient has received {requested} in {}", treatment_names(matching)),
            "Prior treatment with drugs",
        )
    })
}

fn has_had_any_drug_within_weeks(
    patient: &PatientRecord,
    input: &ResolvedInput,
    reference_date: NaiveDate,
) -> MatchResult<Evaluation> {
    let drugs = input.drugs(0)?;
    let weeks = input.integer(1)?;
    let matching: Vec<&TreatmentHistoryEntry> =
        patient.oncological_history.iter().filter(|entry| uses_any_drug(entry, drugs)).collect();
    let what = format!("treatment with any of {}", listing(drugs.iter().map(|d| d.name.as_str())));
    Ok(recency(&matching, weeks_before(reference_date, weeks), &what, weeks))
}

fn has_had_pd_following_any_drug(patient: &PatientRecord, input: &ResolvedInput, _: NaiveDate) -> MatchResult<Evaluation> {
    let drugs = input.drugs(0)?;
    let requested = listing(drugs.iter().map(|d| d.name.as_str()));
    let matching: Vec<&TreatmentHistoryEntry> =
        patient.oncological_history.iter().filter(|entry| uses_any_drug(entry, drugs)).collect();

    if matching.iter().any(|entry| entry.stopped_for_progression == Some(true)) {
        return Ok(Evaluation::pass(
            format!("Patient has progressed on treatment with {requested}"),
            "Progression after drug treatment",
        ));
    }
    if matching.iter().any(|entry| entry.stopped_for_progression.is_none()) {
        return Ok(Evaluation::undetermined(
            format!("Patient received {requested} but the stop reason is unknown"),
            "Undetermined progression after drug treatment",
        ));
    }
    Ok(Evaluation::fail(
        format!("Patient has not progressed on treatment with {requested}"),
        "No progression after drug treatment",
    ))
}

fn has_had_any_category(patient: &PatientRecord, input: &ResolvedInput, _: NaiveDate) -> MatchResult<Evaluation> {
    let categories = input.treatment_categories(0)?;
    let requested = listing(categories.iter().map(TreatmentCategory::as_str));
    let matching: Vec<&TreatmentHistoryEntry> = patient
        .oncological_history
        .iter()
        .filter(|entry| !entry.treatment.categories.is_disjoint(categories))
        .collect();
    Ok(if matching.is_empty() {
        Evaluation::fail(format!("Patient has not received any {requested} treatment"), "No prior treatment")
    } else {
        Evaluation::pass(format!("Patient has received {}", treatment_names(matching)), "Prior treatment")
    })
}

fn has_had_category_or_type(patient: &PatientRecord, input: &ResolvedInput, _: NaiveDate) -> MatchResult<Evaluation> {
    let wanted = input.treatment_category_or_type(0)?;
    let matching: Vec<&TreatmentHistoryEntry> =
        patient.oncological_history.iter().filter(|entry| matches_category_or_type(entry, wanted)).collect();
    Ok(if matching.is_empty() {
        Evaluation::fail(format!("Patient has not received {wanted} treatment"), format!("No prior {wanted}"))
    } else {
        Evaluation::pass(
            format!("Patient has received {wanted} treatment ({})", treatment_names(matching)),
            format!("Prior {wanted}"),
        )
    })
}

fn has_had_category_or_type_within_weeks(
    patient: &PatientRecord,
    input: &ResolvedInput,
    reference_date: NaiveDate,
) -> MatchResult<Evaluation> {
    let wanted = input.treatment_category_or_type(0)?;
    let weeks = input.integer(1)?;
    let matching: Vec<&TreatmentHistoryEntry> =
        patient.oncological_history.iter().filter(|entry| matches_category_or_type(entry, wanted)).collect();
    Ok(recency(&matching, weeks_before(reference_date, weeks), &format!("{wanted} treatment"), weeks))
}

/// A line of the category without any recorded type may still be of one of
/// the requested types.
fn has_had_category_of_types(patient: &PatientRecord, input: &ResolvedInput, _: NaiveDate) -> MatchResult<Evaluation> {
    let category = input.treatment_category(0)?;
    let types = input.treatment_types(1)?;
    let requested = listing(types.iter().map(DrugType::as_str));
    let in_category: Vec<&TreatmentHistoryEntry> =
        patient.oncological_history.iter().filter(|entry| entry.treatment.categories.contains(&category)).collect();

    let of_type: Vec<&TreatmentHistoryEntry> =
        in_category.iter().copied().filter(|entry| !entry.treatment.types.is_disjoint(types)).collect();
    if !of_type.is_empty() {
        return Ok(Evaluation::pass(
            format!("Patient has received {category} of type {requested} ({})", treatment_names(of_type)),
            format!("Prior {category}"),
        ));
    }
    if in_category.iter().any(|entry| entry.treatment.types.is_empty()) {
        return Ok(Evaluation::undetermined(
            format!("Patient has received {category} of unknown type"),
            format!("Undetermined prior {category}"),
        ));
    }
    Ok(Evaluation::fail(
        format!("Patient has not received {category} of type {requested}"),
        format!("No prior {category}"),
    ))
}

fn has_had_at_least_systemic_lines(patient: &PatientRecord, input: &ResolvedInput, _: NaiveDate) -> MatchResult<Evaluation> {
    let min = input.integer(0)?;
    let lines = patient.systemic_line_count() as i32;
    Ok(if lines >= min {
        Evaluation::pass(format!("Patient has had {lines} systemic line(s), at least {min}"), "Adequate treatment lines")
    } else {
        Evaluation::fail(format!("Patient has had {lines} systemic line(s), fewer than {min}"), "Insufficient treatment lines")
    })
}

fn has_had_at_most_systemic_lines(patient: &PatientRecord, input: &ResolvedInput, _: NaiveDate) -> MatchResult<Evaluation> {
    let max = input.integer(0)?;
    let lines = patient.systemic_line_count() as i32;
    Ok(if lines <= max {
        Evaluation::pass(format!("Patient has had {lines} systemic line(s), at most {max}"), "Adequate treatment lines")
    } else {
        Evaluation::fail(format!("Patient has had {lines} systemic line(s), more than {max}"), "Too many treatment lines")
    })
}

#[cfg(test)]
mod tests {
    use eligibility_contracts::{evaluation::EvaluationResult, resolved::ResolvedParam};
    use eligibility_core::traits::TreatmentDatabase;

    use super::*;
    use crate::evaluators::testing::{base_patient, date, input, reference_date};
    use crate::knowledge::TreatmentCatalog;

    fn line(name: &str, stop_date: Option<NaiveDate>, stopped_for_progression: Option<bool>) -> TreatmentHistoryEntry {
        let catalog = TreatmentCatalog::reference();
        TreatmentHistoryEntry {
            treatment: catalog.find_treatment_by_name(name).unwrap(),
            start_date: Some(date(2023, 1, 1)),
            stop_date,
            intent: None,
            stopped_for_progression,
        }
    }

    fn drugs(names: &[&str]) -> ResolvedParam {
        let catalog = TreatmentCatalog::reference();
        ResolvedParam::Drugs(names.iter().map(|n| catalog.find_drug_by_name(n).unwrap()).collect())
    }

    // ── Drugs ────────────────────────────────────────────────────────────────

    #[test]
    fn drug_found_inside_combination() {
        let mut patient = base_patient();
        patient.oncological_history = vec![line("CAPOX", Some(date(2023, 6, 1)), Some(true))];
        let input = input(EligibilityRule::HasHadTreatmentWithAnyDrugX, vec![drugs(&["OXALIPLATIN"])]);
        let evaluation = has_had_any_drug(&patient, &input, reference_date()).unwrap();
        assert_eq!(evaluation.result, EvaluationResult::Pass);
        assert!(evaluation.pass.specific.iter().any(|m| m.contains("CAPOX")));
    }

    #[test]
    fn drug_recency_by_stop_date() {
        let mut patient = base_patient();
        let input = input(
            EligibilityRule::HasHadTreatmentWithAnyDrugXWithinYWeeks,
            vec![drugs(&["CAPECITABINE"]), ResolvedParam::Integer(4)],
        );

        patient.oncological_history = vec![line("CAPOX", Some(date(2024, 5, 20)), None)];
        assert_eq!(has_had_any_drug_within_weeks(&patient, &input, reference_date()).unwrap().result, EvaluationResult::Pass);

        patient.oncological_history = vec![line("CAPOX", Some(date(2023, 6, 1)), None)];
        assert_eq!(has_had_any_drug_within_weeks(&patient, &input, reference_date()).unwrap().result, EvaluationResult::Fail);

        let mut undated = line("CAPOX", None, None);
        undated.start_date = None;
        patient.oncological_history = vec![undated];
        assert_eq!(
            has_had_any_drug_within_weeks(&patient, &input, reference_date()).unwrap().result,
            EvaluationResult::Undetermined
        );
    }

    #[test]
    fn progression_needs_stop_reason() {
        let mut patient = base_patient();
        let input = input(EligibilityRule::HasHadPdFollowingTreatmentWithAnyDrugX, vec![drugs(&["OXALIPLATIN"])]);

        patient.oncological_history = vec![line("FOLFOX", Some(date(2023, 6, 1)), None)];
        assert_eq!(
            has_had_pd_following_any_drug(&patient, &input, reference_date()).unwrap().result,
            EvaluationResult::Undetermined
        );

        patient.oncological_history.push(line("CAPOX", Some(date(2023, 9, 1)), Some(true)));
        assert_eq!(has_had_pd_following_any_drug(&patient, &input, reference_date()).unwrap().result, EvaluationResult::Pass);
    }

    // ── Categories and lines ─────────────────────────────────────────────────

    #[test]
    fn category_and_type() {
        let mut patient = base_patient();
        patient.oncological_history = vec![line("PEMBROLIZUMAB", Some(date(2023, 6, 1)), None)];

        let immuno = input(
            EligibilityRule::HasHadCategoryXTreatment,
            vec![ResolvedParam::TreatmentCategoryOrType(TreatmentCategoryOrType::Category(
                TreatmentCategory::Immunotherapy,
            ))],
        );
        assert_eq!(has_had_category_or_type(&patient, &immuno, reference_date()).unwrap().result, EvaluationResult::Pass);

        let targeted = input(
            EligibilityRule::HasHadCategoryXTreatmentOfTypesY,
            vec![
                ResolvedParam::TreatmentCategory(TreatmentCategory::TargetedTherapy),
                ResolvedParam::TreatmentTypes(BTreeSet::from([DrugType::KrasG12cInhibitor])),
            ],
        );
        assert_eq!(has_had_category_of_types(&patient, &targeted, reference_date()).unwrap().result, EvaluationResult::Fail);
    }

    #[test]
    fn systemic_line_counts() {
        let mut patient = base_patient();
        patient.oncological_history = vec![
            line("CAPOX", Some(date(2023, 6, 1)), Some(true)),
            line("FOLFIRI", Some(date(2023, 12, 1)), Some(true)),
            line("STEREOTACTIC RADIOTHERAPY", Some(date(2024, 1, 1)), None),
        ];
        let at_least = input(EligibilityRule::HasHadAtLeastXSystemicTreatmentLines, vec![ResolvedParam::Integer(2)]);
        let at_most = input(EligibilityRule::HasHadAtMostXSystemicTreatmentLines, vec![ResolvedParam::Integer(1)]);
        assert_eq!(has_had_at_least_systemic_lines(&patient, &at_least, reference_date()).unwrap().result, EvaluationResult::Pass);
        assert_eq!(has_had_at_most_systemic_lines(&patient, &at_most, reference_date()).unwrap().result, EvaluationResult::Fail);
    }
}
