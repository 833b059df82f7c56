//! Tumor location, stage and lesion sites.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;

use eligibility_contracts::{
    domain::{BodyLocation, TumorStage},
    error::MatchResult,
    evaluation::Evaluation,
    patient::PatientRecord,
    resolved::ResolvedInput,
    rule::EligibilityRule,
};
use eligibility_core::{registry::LeafEvaluatorRegistry, traits::DoidModel};

use super::{flag, listing};
use crate::knowledge::ReferenceKnowledge;

pub fn register(registry: &mut LeafEvaluatorRegistry, knowledge: &Arc<ReferenceKnowledge>) -> MatchResult<()> {
    registry.register(EligibilityRule::HasStageX, has_any_stage)?;
    registry.register(EligibilityRule::HasMeasurableDisease, has_measurable_disease)?;
    registry.register(EligibilityRule::HasKnownActiveCnsMetastases, has_active_cns_metastases)?;
    registry.register(EligibilityRule::HasKnownActiveBrainMetastases, has_active_brain_metastases)?;
    registry.register(EligibilityRule::HasLesionsInAnyBodyLocationX, has_lesions_in_any_location)?;
    for (rule, location) in [
        (EligibilityRule::HasKnownBrainMetastases, BodyLocation::Brain),
        (EligibilityRule::HasKnownCnsMetastases, BodyLocation::Cns),
        (EligibilityRule::HasLiverMetastases, BodyLocation::Liver),
        (EligibilityRule::HasBoneMetastases, BodyLocation::Bone),
        (EligibilityRule::HasLungMetastases, BodyLocation::Lung),
        (EligibilityRule::HasLymphNodeMetastases, BodyLocation::LymphNode),
    ] {
        registry.register(rule, has_metastases_in(location))?;
    }
    registry.register(
        EligibilityRule::HasPrimaryTumorLocationBelongingToDoidTermX,
        primary_tumor_belongs_to(Arc::clone(knowledge)),
    )?;
    registry.register(
        EligibilityRule::HasPrimaryTumorLocationBelongingToAnyDoidTermX,
        primary_tumor_belongs_to(Arc::clone(knowledge)),
    )?;
    Ok(())
}

/// A requested sub-stage of the patient's stage group cannot be confirmed
/// from the group alone, e.g. stage III against a request for IIIB.
fn has_any_stage(patient: &PatientRecord, input: &ResolvedInput, _: NaiveDate) -> MatchResult<Evaluation> {
    let stages = input.tumor_stages(0)?;
    let requested = listing(stages.iter().map(TumorStage::as_str));
    let Some(stage) = patient.tumor.stage else {
        return Ok(Evaluation::undetermined("Tumor stage unknown", "Undetermined tumor stage"));
    };
    let evaluation = if stages.contains(&stage) || stages.contains(&stage.category()) {
        Evaluation::pass(format!("Tumor stage {stage} is one of {requested}"), "Adequate tumor stage")
    } else if stages.iter().any(|s| s.category() == stage && *s != stage) {
        Evaluation::undetermined(
            format!("Tumor stage {stage} may or may not match {requested}"),
            "Undetermined tumor stage",
        )
    } else {
        Evaluation::fail(format!("Tumor stage {stage} is not one of {requested}"), "Inadequate tumor stage")
    };
    Ok(evaluation)
}

fn has_measurable_disease(patient: &PatientRecord, _: &ResolvedInput, _: NaiveDate) -> MatchResult<Evaluation> {
    Ok(flag(
        patient.tumor.has_measurable_disease,
        "Patient has measurable disease",
        "Patient has no measurable disease",
        "Measurable disease unknown",
    ))
}

/// Active CNS lesions include active brain lesions.
fn has_active_cns_metastases(patient: &PatientRecord, _: &ResolvedInput, _: NaiveDate) -> MatchResult<Evaluation> {
    let tumor = &patient.tumor;
    let active = match (tumor.has_active_cns_lesions, tumor.has_active_brain_lesions) {
        (Some(true), _) | (_, Some(true)) => Some(true),
        (Some(false), Some(false)) => Some(false),
        _ => None,
    };
    Ok(flag(
        active,
        "Patient has active CNS metastases",
        "Patient has no active CNS metastases",
        "Activity of CNS metastases unknown",
    ))
}

fn has_active_brain_metastases(patient: &PatientRecord, _: &ResolvedInput, _: NaiveDate) -> MatchResult<Evaluation> {
    Ok(flag(
        patient.tumor.has_active_brain_lesions,
        "Patient has active brain metastases",
        "Patient has no active brain metastases",
        "Activity of brain metastases unknown",
    ))
}

fn location_label(location: BodyLocation) -> String {
    location.as_str().to_lowercase().replace('_', " ")
}

fn has_metastases_in(
    location: BodyLocation,
) -> impl Fn(&PatientRecord, &ResolvedInput, NaiveDate) -> MatchResult<Evaluation> + Send + Sync {
    move |patient, _, _| {
        let label = location_label(location);
        Ok(flag(
            patient.tumor.has_lesions_in(location),
            &format!("Patient has {label} metastases"),
            &format!("Patient has no {label} metastases"),
            &format!("Presence of {label} metastases unknown"),
        ))
    }
}

fn has_lesions_in_any_location(patient: &PatientRecord, input: &ResolvedInput, _: NaiveDate) -> MatchResult<Evaluation> {
    let locations = input.body_locations(0)?;
    let known: Vec<(BodyLocation, Option<bool>)> =
        locations.iter().map(|location| (*location, patient.tumor.has_lesions_in(*location))).collect();

    let present: Vec<String> =
        known.iter().filter(|(_, has)| *has == Some(true)).map(|(location, _)| location_label(*location)).collect();
    if !present.is_empty() {
        let present = listing(present.iter().map(String::as_str));
        return Ok(Evaluation::pass(format!("Patient has lesions in {present}"), "Lesions present"));
    }

    let requested = listing(locations.iter().map(BodyLocation::as_str));
    Ok(if known.iter().all(|(_, has)| *has == Some(false)) {
        Evaluation::fail(format!("Patient has no lesions in any of {requested}"), "No lesions present")
    } else {
        Evaluation::undetermined(format!("Lesions in {requested} unknown"), "Lesion sites unknown")
    })
}

/// One DOID from `DoidTerm` or several from `ManyDoidTerms`.
fn target_doids(input: &ResolvedInput) -> MatchResult<BTreeSet<String>> {
    match input.doids(0) {
        Ok(doids) => Ok(doids.clone()),
        Err(_) => Ok(BTreeSet::from([input.doid(0)?.to_string()])),
    }
}

fn primary_tumor_belongs_to(
    knowledge: Arc<ReferenceKnowledge>,
) -> impl Fn(&PatientRecord, &ResolvedInput, NaiveDate) -> MatchResult<Evaluation> + Send + Sync {
    move |patient, input, _| {
        let targets = target_doids(input)?;
        let requested = listing(targets.iter().map(String::as_str));
        if patient.tumor.doids.is_empty() {
            return Ok(Evaluation::undetermined("Primary tumor location unknown", "Undetermined tumor type"));
        }
        let matches = patient
            .tumor
            .doids
            .iter()
            .any(|doid| !knowledge.doids.doid_with_parents(doid).is_disjoint(&targets));
        Ok(if matches {
            Evaluation::pass(format!("Primary tumor belongs to {requested}"), "Adequate tumor type")
        } else {
            Evaluation::fail(format!("Primary tumor does not belong to {requested}"), "Inadequate tumor type")
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use eligibility_contracts::{evaluation::EvaluationResult, resolved::ResolvedParam};

    use super::*;
    use crate::evaluators::testing::{base_patient, input, reference_date};

    // ── Stage ────────────────────────────────────────────────────────────────

    #[rstest]
    #[case(Some(TumorStage::Stage4), &[TumorStage::Stage3, TumorStage::Stage4], EvaluationResult::Pass)]
    #[case(Some(TumorStage::Stage3B), &[TumorStage::Stage3], EvaluationResult::Pass)]
    #[case(Some(TumorStage::Stage3), &[TumorStage::Stage3B], EvaluationResult::Undetermined)]
    #[case(Some(TumorStage::Stage2), &[TumorStage::Stage4], EvaluationResult::Fail)]
    #[case(None, &[TumorStage::Stage4], EvaluationResult::Undetermined)]
    fn stage_matching(
        #[case] stage: Option<TumorStage>,
        #[case] requested: &[TumorStage],
        #[case] expected: EvaluationResult,
    ) {
        let mut patient = base_patient();
        patient.tumor.stage = stage;
        let input =
            input(EligibilityRule::HasStageX, vec![ResolvedParam::TumorStages(requested.iter().copied().collect())]);
        assert_eq!(has_any_stage(&patient, &input, reference_date()).unwrap().result, expected);
    }

    // ── Lesions ──────────────────────────────────────────────────────────────

    #[test]
    fn cns_falls_back_to_brain_lesions() {
        let mut patient = base_patient();
        patient.tumor.has_brain_lesions = Some(true);
        let evaluate = has_metastases_in(BodyLocation::Cns);
        let none = input(EligibilityRule::HasKnownCnsMetastases, vec![]);
        assert_eq!(evaluate(&patient, &none, reference_date()).unwrap().result, EvaluationResult::Pass);
    }

    #[test]
    fn any_location_needs_every_site_known_to_fail() {
        let mut patient = base_patient();
        patient.tumor.has_liver_lesions = Some(false);
        let locations = BTreeSet::from([BodyLocation::Liver, BodyLocation::Bone]);
        let input = input(EligibilityRule::HasLesionsInAnyBodyLocationX, vec![ResolvedParam::BodyLocations(locations)]);
        assert_eq!(
            has_lesions_in_any_location(&patient, &input, reference_date()).unwrap().result,
            EvaluationResult::Undetermined
        );

        patient.tumor.has_bone_lesions = Some(false);
        assert_eq!(has_lesions_in_any_location(&patient, &input, reference_date()).unwrap().result, EvaluationResult::Fail);

        patient.tumor.has_bone_lesions = Some(true);
        let evaluation = has_lesions_in_any_location(&patient, &input, reference_date()).unwrap();
        assert_eq!(evaluation.result, EvaluationResult::Pass);
        assert!(evaluation.pass.specific.contains("Patient has lesions in bone"));
    }

    // ── Primary tumor ────────────────────────────────────────────────────────

    #[test]
    fn primary_tumor_matches_through_ancestors() {
        let evaluate = primary_tumor_belongs_to(Arc::new(ReferenceKnowledge::new()));
        let mut patient = base_patient();
        let lung = input(
            EligibilityRule::HasPrimaryTumorLocationBelongingToAnyDoidTermX,
            vec![ResolvedParam::Doids(BTreeSet::from(["DOID:1324".to_string()]))],
        );
        assert_eq!(evaluate(&patient, &lung, reference_date()).unwrap().result, EvaluationResult::Undetermined);

        patient.tumor.doids = BTreeSet::from(["DOID:3910".to_string()]);
        assert_eq!(evaluate(&patient, &lung, reference_date()).unwrap().result, EvaluationResult::Pass);

        let colorectal = input(
            EligibilityRule::HasPrimaryTumorLocationBelongingToDoidTermX,
            vec![ResolvedParam::Doid("DOID:9256".to_string())],
        );
        assert_eq!(evaluate(&patient, &colorectal, reference_date()).unwrap().result, EvaluationResult::Fail);
    }
}
