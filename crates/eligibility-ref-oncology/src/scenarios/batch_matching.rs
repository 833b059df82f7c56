//! Scenario 3: Batch Matching
//!
//! Runs every reference trial against every sample patient:
//!
//! 1. Compile both reference trials and preflight the registry.
//! 2. Evaluate all trial × patient pairs in parallel.
//! 3. Aggregate per patient; pairs with evaluation defects are reported and
//!    skipped (P-004 carries a WHO status of 7).
//! 4. Hand every patient's matches to the in-memory sink and export JSON.

use std::sync::Arc;

use eligibility_aggregate::{aggregate_batch, InMemoryMatchSink, MatchSink};
use eligibility_contracts::error::MatchResult;
use eligibility_core::{batch::BatchRunner, evaluator::Evaluator};

use crate::evaluators::reference_registry;
use crate::knowledge::ReferenceKnowledge;
use crate::sample::{reference_date, sample_patients};
use crate::trials::reference_trials;

/// Run Scenario 3: Batch Matching.
pub fn run_scenario() -> MatchResult<()> {
    println!("=== Scenario 3: Batch Matching ===");
    println!();

    let knowledge = Arc::new(ReferenceKnowledge::new());
    let trials = reference_trials(&knowledge)?;
    let patients = sample_patients(&knowledge)?;
    let registry = reference_registry(Arc::clone(&knowledge))?;
    let runner = BatchRunner::new(Evaluator::new(&registry));
    let date = reference_date();

    println!("  Trials:          {}", trials.len());
    println!("  Patients:        {}", patients.len());

    let (outcomes, stats) = runner.run(&trials, &patients, date)?;
    println!("  Pairs:           {} evaluated, {} defect(s)", stats.evaluated, stats.defects);
    println!();

    let report = aggregate_batch(outcomes, date);
    for patient_match in &report.matches {
        let summary = patient_match.summary();
        println!(
            "  {}  eligible trials: {}/{}  eligible cohorts: {}  open with slots: {}",
            patient_match.patient_id,
            summary.eligible_trials,
            summary.trials,
            summary.eligible_cohorts,
            summary.open_cohorts_with_slots
        );
        for trial_match in &patient_match.trial_matches {
            let cohorts: Vec<&str> = trial_match
                .cohorts
                .iter()
                .filter(|c| c.is_open_fit())
                .map(|c| c.metadata.cohort_id.as_str())
                .collect();
            println!(
                "      {:<12} {}{}",
                trial_match.identification.acronym,
                if trial_match.is_potentially_eligible { "potentially eligible" } else { "not eligible" },
                if cohorts.is_empty() { String::new() } else { format!(", cohorts {}", cohorts.join(", ")) }
            );
        }
    }
    for defect in &report.defects {
        println!("  DEFECT {} × {}: {}", defect.patient_id, defect.trial_id, defect.error);
    }
    println!();

    let sink = InMemoryMatchSink::new(report.run_id);
    for patient_match in &report.matches {
        sink.write(patient_match)?;
    }
    sink.finalize(report.run_id)?;

    let records = sink.export()?;
    let rows: usize = records.iter().flat_map(|r| r.trials.iter()).map(|t| t.evaluations.len()).sum();
    let json = sink.export_json()?;
    println!("  Run id:          {}", report.run_id);
    println!("  Sink finalized:  {}", sink.is_finalized()?);
    println!("  Record sets:     {} ({} evaluation row(s), {} bytes of JSON)", records.len(), rows, json.len());
    println!();
    println!("  Scenario 3 complete.");
    println!();

    Ok(())
}
