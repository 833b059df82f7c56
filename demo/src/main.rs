//! Trial Eligibility Reference Runtime — Demo CLI
//!
//! Runs one or all of the three reference scenarios, or matches the sample
//! patients against a trial definition read from disk. Every scenario uses
//! the real engine components (resolver, evaluator, batch runner,
//! aggregation, sink) wired to the in-memory oncology knowledge bases.
//!
//! Usage:
//!   cargo run -p demo -- run-all
//!   cargo run -p demo -- single-patient
//!   cargo run -p demo -- trial-validation
//!   cargo run -p demo -- batch-matching
//!   cargo run -p demo -- match --trial crates/eligibility-ref-oncology/trials/kras-crc.toml --json

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use eligibility_aggregate::{aggregate_batch, InMemoryMatchSink, MatchSink};
use eligibility_contracts::error::MatchResult;
use eligibility_core::{batch::BatchRunner, evaluator::Evaluator};
use eligibility_ref_oncology::{
    reference_registry,
    sample::{reference_date, sample_patients},
    scenarios::{batch_matching, single_patient, trial_validation},
    ReferenceKnowledge,
};
use eligibility_resolver::load_trial;

// ── CLI definition ────────────────────────────────────────────────────────────

/// Trial eligibility matching demo.
///
/// Each subcommand runs one or all of the reference scenarios, or matches
/// the sample patients against a trial definition file.
#[derive(Parser)]
#[command(
    name = "demo",
    about = "Oncology trial eligibility reference runtime demo",
    long_about = "Runs trial eligibility demo scenarios showing trial validation,\n\
                  composite criterion evaluation, batch matching and result export."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run all three scenarios in sequence.
    RunAll,
    /// Scenario 1: Single Patient (one patient, one trial, every criterion).
    SinglePatient,
    /// Scenario 2: Trial Validation (parse, resolution and coverage errors).
    TrialValidation,
    /// Scenario 3: Batch Matching (all trials × all patients, sink export).
    BatchMatching,
    /// Match the sample patients against a trial definition file.
    Match {
        /// Path to a TOML trial definition.
        #[arg(long)]
        trial: PathBuf,
        /// Reference date (YYYY-MM-DD). Defaults to the sample reference date.
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Print the exported records as JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::RunAll => run_scenarios(&ALL_SCENARIOS),
        Command::SinglePatient => run_scenarios(&[single_patient::run_scenario as Scenario]),
        Command::TrialValidation => run_scenarios(&[trial_validation::run_scenario as Scenario]),
        Command::BatchMatching => run_scenarios(&[batch_matching::run_scenario as Scenario]),
        Command::Match { trial, date, json } => run_match(&trial, date.unwrap_or_else(reference_date), json),
    };

    if let Err(e) = result {
        eprintln!("Demo error: {}", e);
        std::process::exit(1);
    }
}

// ── Scenario dispatch ─────────────────────────────────────────────────────────

type Scenario = fn() -> MatchResult<()>;

const ALL_SCENARIOS: [Scenario; 3] =
    [single_patient::run_scenario, trial_validation::run_scenario, batch_matching::run_scenario];

fn run_scenarios(scenarios: &[Scenario]) -> MatchResult<()> {
    print_banner();
    for scenario in scenarios {
        scenario()?;
    }
    println!("All selected scenarios completed successfully.");
    Ok(())
}

// ── Trial file matching ───────────────────────────────────────────────────────

fn run_match(path: &Path, date: NaiveDate, json: bool) -> MatchResult<()> {
    let knowledge = Arc::new(ReferenceKnowledge::new());
    let trial = knowledge.resolver().compile_trial(&load_trial(path)?)?;
    let patients = sample_patients(&knowledge)?;
    let registry = reference_registry(Arc::clone(&knowledge))?;
    let runner = BatchRunner::new(Evaluator::new(&registry));

    info!(trial_id = %trial.identification.trial_id, date = %date, "matching sample patients");
    let (outcomes, _) = runner.run(std::slice::from_ref(&trial), &patients, date)?;
    let report = aggregate_batch(outcomes, date);

    let sink = InMemoryMatchSink::new(report.run_id);
    for patient_match in &report.matches {
        sink.write(patient_match)?;
    }
    sink.finalize(report.run_id)?;

    if json {
        println!("{}", sink.export_json()?);
        return Ok(());
    }

    println!("{} ({}) on {}", trial.identification.acronym, trial.identification.trial_id, date);
    for patient_match in &report.matches {
        for trial_match in &patient_match.trial_matches {
            let cohorts: Vec<&str> = trial_match
                .cohorts
                .iter()
                .filter(|c| c.is_open_fit())
                .map(|c| c.metadata.cohort_id.as_str())
                .collect();
            println!(
                "  {}  {:<20}  open cohorts: {}",
                patient_match.patient_id,
                if trial_match.is_potentially_eligible { "potentially eligible" } else { "not eligible" },
                if cohorts.is_empty() { "-".to_string() } else { cohorts.join(", ") }
            );
        }
    }
    for defect in &report.defects {
        println!("  {}  skipped: {}", defect.patient_id, defect.error);
    }
    Ok(())
}

// ── Banner ────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("Trial Eligibility Engine");
    println!("Oncology Reference Demo");
    println!("========================");
    println!();
    println!("Matching pipeline per trial:");
    println!("  [1] Trial TOML parsed into eligibility function trees");
    println!("  [2] Every parameter checked against its rule's shape and resolved");
    println!("      against the knowledge bases; one bad function rejects the trial");
    println!("  [3] Registry preflight: every leaf rule must have an evaluator");
    println!("  [4] Trees evaluated per patient: PASS / WARN / UNDETERMINED / FAIL");
    println!("  [5] Trial and cohort verdicts aggregated and handed to the sink");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_arguments_parse() {
        let cli = Cli::try_parse_from(["demo", "match", "--trial", "trial.toml", "--date", "2024-06-01", "--json"]).unwrap();
        match cli.command {
            Command::Match { trial, date, json } => {
                assert_eq!(trial, PathBuf::from("trial.toml"));
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 6, 1));
                assert!(json);
            }
            _ => panic!("expected the match subcommand"),
        }
    }

    #[test]
    fn scenario_subcommands_parse() {
        for name in ["run-all", "single-patient", "trial-validation", "batch-matching"] {
            assert!(Cli::try_parse_from(["demo", name]).is_ok(), "{name}");
        }
        assert!(Cli::try_parse_from(["demo", "match"]).is_err(), "--trial is required");
    }
}
