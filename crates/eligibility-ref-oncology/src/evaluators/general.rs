//! Age, sex, performance status and reproductive status.

use chrono::{Datelike, NaiveDate};

use eligibility_contracts::{
    error::MatchResult,
    evaluation::Evaluation,
    patient::{Gender, PatientRecord},
    resolved::ResolvedInput,
    rule::EligibilityRule,
};
use eligibility_core::registry::LeafEvaluatorRegistry;

use super::{defect, flag};

const MAX_WHO_STATUS: u8 = 5;

pub fn register(registry: &mut LeafEvaluatorRegistry) -> MatchResult<()> {
    registry.register(EligibilityRule::IsAtLeastXYearsOld, is_at_least_years_old)?;
    registry.register(EligibilityRule::IsMale, is_male)?;
    registry.register(EligibilityRule::IsFemale, is_female)?;
    registry.register(EligibilityRule::HasWhoStatusOfAtMostX, who_status_at_most)?;
    registry.register(EligibilityRule::HasWhoStatusOfAtLeastX, who_status_at_least)?;
    registry.register(EligibilityRule::IsPregnant, is_pregnant)?;
    registry.register(EligibilityRule::IsBreastfeeding, is_breastfeeding)?;
    Ok(())
}

/// Only the birth year is known, so a patient turning the minimum age this
/// year may or may not have reached it yet.
fn is_at_least_years_old(patient: &PatientRecord, input: &ResolvedInput, reference_date: NaiveDate) -> MatchResult<Evaluation> {
    let min_age = input.integer(0)?;
    let age = reference_date.year() - patient.birth_year;
    let evaluation = if age > min_age {
        Evaluation::pass(format!("Patient is at least {min_age} years old"), "Adequate age")
    } else if age == min_age {
        Evaluation::undetermined(
            format!("Patient may not yet be {min_age} years old depending on birth date"),
            "Undetermined age",
        )
    } else {
        Evaluation::fail(format!("Patient is younger than {min_age} years old"), "Inadequate age")
    };
    Ok(evaluation)
}

fn is_male(patient: &PatientRecord, _: &ResolvedInput, _: NaiveDate) -> MatchResult<Evaluation> {
    Ok(match patient.gender {
        Gender::Male => Evaluation::pass("Patient is male", "Adequate gender"),
        _ => Evaluation::fail("Patient is not male", "Inadequate gender"),
    })
}

fn is_female(patient: &PatientRecord, _: &ResolvedInput, _: NaiveDate) -> MatchResult<Evaluation> {
    Ok(match patient.gender {
        Gender::Female => Evaluation::pass("Patient is female", "Adequate gender"),
        _ => Evaluation::fail("Patient is not female", "Inadequate gender"),
    })
}

/// The recorded WHO status, or `None` when unknown. Values above 5 are a defect.
fn who_status(patient: &PatientRecord, input: &ResolvedInput) -> MatchResult<Option<i32>> {
    match patient.who_status {
        Some(who) if who > MAX_WHO_STATUS => Err(defect(
            input,
            format!("patient '{}' has WHO status {who}, the scale ends at {MAX_WHO_STATUS}", patient.patient_id),
        )),
        other => Ok(other.map(i32::from)),
    }
}

fn who_status_at_most(patient: &PatientRecord, input: &ResolvedInput, _: NaiveDate) -> MatchResult<Evaluation> {
    let max = input.integer(0)?;
    Ok(match who_status(patient, input)? {
        None => Evaluation::undetermined("WHO status unknown", "WHO status unknown"),
        Some(who) if who <= max => Evaluation::pass(format!("WHO {who} is at most {max}"), "Adequate WHO status"),
        Some(who) => Evaluation::fail(format!("WHO {who} exceeds {max}"), "Inadequate WHO status"),
    })
}

fn who_status_at_least(patient: &PatientRecord, input: &ResolvedInput, _: NaiveDate) -> MatchResult<Evaluation> {
    let min = input.integer(0)?;
    Ok(match who_status(patient, input)? {
        None => Evaluation::undetermined("WHO status unknown", "WHO status unknown"),
        Some(who) if who >= min => Evaluation::pass(format!("WHO {who} is at least {min}"), "Adequate WHO status"),
        Some(who) => Evaluation::fail(format!("WHO {who} is below {min}"), "Inadequate WHO status"),
    })
}

fn is_pregnant(patient: &PatientRecord, _: &ResolvedInput, _: NaiveDate) -> MatchResult<Evaluation> {
    Ok(flag(patient.is_pregnant, "Patient is pregnant", "Patient is not pregnant", "Pregnancy status unknown"))
}

fn is_breastfeeding(patient: &PatientRecord, _: &ResolvedInput, _: NaiveDate) -> MatchResult<Evaluation> {
    Ok(flag(
        patient.is_breastfeeding,
        "Patient is breastfeeding",
        "Patient is not breastfeeding",
        "Breastfeeding status unknown",
    ))
}
