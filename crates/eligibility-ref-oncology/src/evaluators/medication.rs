//! Current medication: names, ATC categories, CYP and transporter interactions.
//!
//! Only medications active on the reference date count. A patient without a
//! medication list is UNDETERMINED for every rule here.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use eligibility_contracts::{
    error::MatchResult,
    evaluation::Evaluation,
    patient::{InteractionKind, Medication, PatientRecord},
    resolved::ResolvedInput,
    rule::EligibilityRule,
};
use eligibility_core::registry::LeafEvaluatorRegistry;

use super::listing;

pub fn register(registry: &mut LeafEvaluatorRegistry) -> MatchResult<()> {
    registry.register(EligibilityRule::CurrentlyGetsNameXMedication, gets_medication_named)?;
    registry.register(EligibilityRule::CurrentlyGetsCategoryXMedication, gets_medication_of_category)?;
    registry.register(EligibilityRule::CurrentlyGetsMedicationInhibitingCypX, gets_cyp_interacting(InteractionKind::Inhibitor))?;
    registry.register(EligibilityRule::CurrentlyGetsMedicationInducingCypX, gets_cyp_interacting(InteractionKind::Inducer))?;
    registry.register(EligibilityRule::CurrentlyGetsMedicationSubstrateOfCypX, gets_cyp_interacting(InteractionKind::Substrate))?;
    registry.register(
        EligibilityRule::CurrentlyGetsMedicationInhibitingTransporterX,
        gets_transporter_interacting(InteractionKind::Inhibitor),
    )?;
    registry.register(
        EligibilityRule::CurrentlyGetsMedicationInducingTransporterX,
        gets_transporter_interacting(InteractionKind::Inducer),
    )?;
    registry.register(
        EligibilityRule::CurrentlyGetsMedicationSubstrateOfTransporterX,
        gets_transporter_interacting(InteractionKind::Substrate),
    )?;
    Ok(())
}

fn active_medications(patient: &PatientRecord, reference_date: NaiveDate) -> Option<Vec<&Medication>> {
    patient
        .medications
        .as_ref()
        .map(|medications| medications.iter().filter(|m| m.is_active_on(reference_date)).collect())
}

fn no_medication_data() -> Evaluation {
    Evaluation::undetermined("Medication data unavailable", "Medication unknown")
}

/// PASS naming the matching medications, or FAIL.
fn medication_outcome(found: Vec<&Medication>, what: &str) -> Evaluation {
    if found.is_empty() {
        Evaluation::fail(format!("Patient does not currently get {what}"), format!("No {what}"))
    } else {
        let names: BTreeSet<&str> = found.iter().map(|m| m.name.as_str()).collect();
        Evaluation::pass(format!("Patient currently gets {what}: {}", listing(names)), format!("Current {what}"))
    }
}

fn gets_medication_named(patient: &PatientRecord, input: &ResolvedInput, reference_date: NaiveDate) -> MatchResult<Evaluation> {
    let name = input.text(0)?;
    let Some(active) = active_medications(patient, reference_date) else { return Ok(no_medication_data()) };
    let found = active.into_iter().filter(|m| m.name.eq_ignore_ascii_case(name)).collect();
    Ok(medication_outcome(found, &format!("{name} medication")))
}

/// A medication without an ATC code cannot be placed in any category.
fn gets_medication_of_category(
    patient: &PatientRecord,
    input: &ResolvedInput,
    reference_date: NaiveDate,
) -> MatchResult<Evaluation> {
    let category = input.medication_category(0)?;
    let Some(active) = active_medications(patient, reference_date) else { return Ok(no_medication_data()) };
    let what = format!("{} medication", category.name.to_lowercase());

    let found: Vec<&Medication> = active
        .iter()
        .copied()
        .filter(|m| {
            m.atc_code
                .as_deref()
                .is_some_and(|atc| category.atc_levels.iter().any(|level| atc.starts_with(level.as_str())))
        })
        .collect();
    if found.is_empty() && active.iter().any(|m| m.atc_code.is_none()) {
        return Ok(Evaluation::undetermined(
            format!("Patient gets medication without ATC code, possibly {what}"),
            format!("Undetermined {what}"),
        ));
    }
    Ok(medication_outcome(found, &what))
}

fn kind_label(kind: InteractionKind) -> &'static str {
    match kind {
        InteractionKind::Inhibitor => "inhibiting",
        InteractionKind::Inducer => "inducing",
        InteractionKind::Substrate => "substrate of",
    }
}

fn gets_cyp_interacting(
    kind: InteractionKind,
) -> impl Fn(&PatientRecord, &ResolvedInput, NaiveDate) -> MatchResult<Evaluation> + Send + Sync {
    move |patient, input, reference_date| {
        let cyp = input.cyp(0)?;
        let Some(active) = active_medications(patient, reference_date) else { return Ok(no_medication_data()) };
        let found = active
            .into_iter()
            .filter(|m| m.cyp_interactions.iter().any(|i| i.cyp == cyp && i.kind == kind))
            .collect();
        Ok(medication_outcome(found, &format!("medication {} {cyp}", kind_label(kind))))
    }
}

fn gets_transporter_interacting(
    kind: InteractionKind,
) -> impl Fn(&PatientRecord, &ResolvedInput, NaiveDate) -> MatchResult<Evaluation> + Send + Sync {
    move |patient, input, reference_date| {
        let transporter = input.transporter(0)?;
        let Some(active) = active_medications(patient, reference_date) else { return Ok(no_medication_data()) };
        let found = active
            .into_iter()
            .filter(|m| m.transporter_interactions.iter().any(|i| i.transporter == transporter && i.kind == kind))
            .collect();
        Ok(medication_outcome(found, &format!("medication {} {transporter}", kind_label(kind))))
    }
}

#[cfg(test)]
mod tests {
    use eligibility_contracts::{
        domain::{Cyp, MedicationCategory, Transporter},
        evaluation::EvaluationResult,
        patient::{CypInteraction, TransporterInteraction},
        resolved::ResolvedParam,
    };

    use super::*;
    use crate::evaluators::testing::{base_patient, date, input, reference_date};

    fn medication(name: &str, atc: Option<&str>) -> Medication {
        Medication {
            name: name.to_string(),
            atc_code: atc.map(str::to_string),
            start_date: Some(date(2024, 1, 1)),
            stop_date: None,
            cyp_interactions: vec![],
            transporter_interactions: vec![],
        }
    }

    fn anticoagulants() -> ResolvedParam {
        ResolvedParam::MedicationCategory(MedicationCategory {
            name: "Anticoagulants".into(),
            atc_levels: BTreeSet::from(["B01AA".to_string()]),
        })
    }

    #[test]
    fn missing_list_is_undetermined() {
        let patient = base_patient();
        let named = input(EligibilityRule::CurrentlyGetsNameXMedication, vec![ResolvedParam::Text("Warfarin".into())]);
        assert_eq!(gets_medication_named(&patient, &named, reference_date()).unwrap().result, EvaluationResult::Undetermined);
    }

    #[test]
    fn name_and_category() {
        let mut patient = base_patient();
        let mut stopped = medication("Dexamethasone", Some("H02AB02"));
        stopped.stop_date = Some(date(2024, 3, 1));
        patient.medications = Some(vec![medication("Warfarin", Some("B01AA03")), stopped]);

        let named = input(EligibilityRule::CurrentlyGetsNameXMedication, vec![ResolvedParam::Text("warfarin".into())]);
        assert_eq!(gets_medication_named(&patient, &named, reference_date()).unwrap().result, EvaluationResult::Pass);

        let dexa = input(EligibilityRule::CurrentlyGetsNameXMedication, vec![ResolvedParam::Text("Dexamethasone".into())]);
        assert_eq!(gets_medication_named(&patient, &dexa, reference_date()).unwrap().result, EvaluationResult::Fail);

        let category = input(EligibilityRule::CurrentlyGetsCategoryXMedication, vec![anticoagulants()]);
        assert_eq!(gets_medication_of_category(&patient, &category, reference_date()).unwrap().result, EvaluationResult::Pass);
    }

    #[test]
    fn unknown_atc_code_keeps_category_open() {
        let mut patient = base_patient();
        patient.medications = Some(vec![medication("Unknown tablets", None)]);
        let category = input(EligibilityRule::CurrentlyGetsCategoryXMedication, vec![anticoagulants()]);
        assert_eq!(
            gets_medication_of_category(&patient, &category, reference_date()).unwrap().result,
            EvaluationResult::Undetermined
        );
    }

    #[test]
    fn cyp_and_transporter_interactions() {
        let mut patient = base_patient();
        let mut clarithromycin = medication("Clarithromycin", Some("J01FA09"));
        clarithromycin.cyp_interactions = vec![CypInteraction { cyp: Cyp::Cyp3a4, kind: InteractionKind::Inhibitor }];
        clarithromycin.transporter_interactions =
            vec![TransporterInteraction { transporter: Transporter::PGp, kind: InteractionKind::Inhibitor }];
        patient.medications = Some(vec![clarithromycin]);

        let inhibiting = input(EligibilityRule::CurrentlyGetsMedicationInhibitingCypX, vec![ResolvedParam::Cyp(Cyp::Cyp3a4)]);
        let evaluation = gets_cyp_interacting(InteractionKind::Inhibitor)(&patient, &inhibiting, reference_date()).unwrap();
        assert_eq!(evaluation.result, EvaluationResult::Pass);
        assert!(evaluation.pass.specific.iter().any(|m| m.contains("Clarithromycin")));

        let inducing = input(EligibilityRule::CurrentlyGetsMedicationInducingCypX, vec![ResolvedParam::Cyp(Cyp::Cyp3a4)]);
        assert_eq!(
            gets_cyp_interacting(InteractionKind::Inducer)(&patient, &inducing, reference_date()).unwrap().result,
            EvaluationResult::Fail
        );

        let pgp = input(
            EligibilityRule::CurrentlyGetsMedicationInhibitingTransporterX,
            vec![ResolvedParam::Transporter(Transporter::PGp)],
        );
        assert_eq!(
            gets_transporter_interacting(InteractionKind::Inhibitor)(&patient, &pgp, reference_date()).unwrap().result,
            EvaluationResult::Pass
        );
    }
}
