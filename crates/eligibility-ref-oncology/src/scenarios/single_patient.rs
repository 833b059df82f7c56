//! Scenario 1: Single Patient
//!
//! Walks one patient through one trial:
//!
//! 1. Compile the KRAS colorectal trial against the reference knowledge.
//! 2. Build the reference leaf evaluator registry.
//! 3. Evaluate every general and cohort criterion for patient P-001.
//! 4. Aggregate into trial and cohort verdicts.
//!
//! The OR criterion on ASAT shows a recoverable lab failure being rescued by
//! the liver-metastases branch.

use std::sync::Arc;

use eligibility_aggregate::{PatientMatch, TrialMatch};
use eligibility_contracts::error::MatchResult;
use eligibility_core::evaluator::Evaluator;
use uuid::Uuid;

use crate::evaluators::reference_registry;
use crate::knowledge::ReferenceKnowledge;
use crate::sample::{colorectal_patient, reference_date};
use crate::scenarios::print_criterion;
use crate::trials::{compile, KRAS_CRC};

/// Run Scenario 1: Single Patient.
pub fn run_scenario() -> MatchResult<()> {
    println!("=== Scenario 1: Single Patient ===");
    println!();

    let knowledge = Arc::new(ReferenceKnowledge::new());
    let trial = compile(&knowledge, KRAS_CRC)?;
    let registry = reference_registry(Arc::clone(&knowledge))?;
    let evaluator = Evaluator::new(&registry);
    let patient = colorectal_patient(&knowledge)?;
    let date = reference_date();

    println!("  Trial:           {} ({})", trial.identification.acronym, trial.identification.trial_id);
    println!("  Patient:         {} (born {})", patient.patient_id, patient.birth_year);
    println!("  Reference date:  {}", date);
    println!("  Evaluators:      {} rule(s) registered", registry.len());
    println!();

    let evaluation = evaluator.evaluate_trial(&trial, &patient, date)?;

    println!("  General criteria:");
    for (eligibility, outcome) in &evaluation.general {
        print_criterion(eligibility, outcome);
    }
    for cohort in &evaluation.cohorts {
        println!();
        println!("  Cohort {}: {}", cohort.metadata.cohort_id, cohort.metadata.description);
        for (eligibility, outcome) in &cohort.evaluations {
            print_criterion(eligibility, outcome);
        }
    }
    println!();

    let trial_match = TrialMatch::from_evaluation(evaluation);
    println!(
        "  Trial verdict:   {}",
        if trial_match.is_potentially_eligible { "POTENTIALLY ELIGIBLE" } else { "NOT ELIGIBLE" }
    );
    for cohort in &trial_match.cohorts {
        let verdict = if cohort.is_open_fit() {
            "potentially eligible, open"
        } else if cohort.is_potentially_eligible {
            "potentially eligible, not accepting patients"
        } else {
            "not eligible"
        };
        println!("  Cohort {}:        {}", cohort.metadata.cohort_id, verdict);
    }

    let summary = PatientMatch::new(Uuid::new_v4(), &patient.patient_id, date, vec![trial_match]).summary();
    println!(
        "  Summary:         {} eligible cohort(s), {} ineligible, {} open with slots",
        summary.eligible_cohorts, summary.ineligible_cohorts, summary.open_cohorts_with_slots
    );
    println!();
    println!("  Scenario 1 complete.");
    println!();

    Ok(())
}
