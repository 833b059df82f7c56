//! Scenario 2: Trial Validation
//!
//! Shows the three ways a trial definition is stopped before any patient is
//! evaluated:
//!
//! Sub-case A: unknown rule name         → parse error at load
//! Sub-case B: malformed or unresolvable → every problem listed, trial rejected
//! Sub-case C: valid but uncovered rule  → preflight catalog error

use std::sync::Arc;

use eligibility_contracts::error::{MatchError, MatchResult};
use eligibility_core::{batch::BatchRunner, evaluator::Evaluator};
use eligibility_resolver::{parse_function, TrialDefinition};

use crate::evaluators::reference_registry;
use crate::knowledge::ReferenceKnowledge;
use crate::trials::{compile, BROKEN_DEFINITIONS};

/// Authored against a rule the reference registry has no evaluator for.
const UNCOVERED_TRIAL: &str = r#"
trial_id = "NL-TEST-2024-998"
acronym = "UNCOVERED"
title = "Trial using a rule without a reference evaluator"

[[eligibility]]
rule = "HAS_KARNOFSKY_SCORE_OF_AT_LEAST_X(70)"
references = [{ id = "I-01", text = "Karnofsky performance status of at least 70" }]
"#;

/// Run Scenario 2: Trial Validation.
pub fn run_scenario() -> MatchResult<()> {
    println!("=== Scenario 2: Trial Validation ===");
    println!();

    let knowledge = Arc::new(ReferenceKnowledge::new());

    // ── Sub-case A: unknown rule name ─────────────────────────────────────────

    {
        println!("  Sub-case A: Unknown rule name");
        let source = "AND(IS_MALE, HAS_SUPERPOWERS)";
        println!("  Function:        {}", source);
        match parse_function(source) {
            Err(e @ MatchError::Parse { .. }) => {
                println!("  Parse result:    {}", e);
                println!("  RESULT: Parse error (expected)");
            }
            Err(e) => println!("  Unexpected error: {}", e),
            Ok(function) => println!("  Unexpectedly parsed: {}", function),
        }
        println!();
    }

    // ── Sub-case B: functions that parse but do not resolve ───────────────────

    {
        println!("  Sub-case B: Functions that parse but do not resolve");
        let trial = TrialDefinition::from_toml_str(BROKEN_DEFINITIONS)?.into_trial()?;
        println!("  Trial:           {} ({})", trial.identification.acronym, trial.identification.trial_id);

        let problems = knowledge.resolver().validate_trial(&trial);
        for problem in &problems {
            let kind = match problem {
                MatchError::Shape { .. } => "shape",
                MatchError::Lookup { .. } => "lookup",
                _ => "other",
            };
            println!("    [{:<6}] {}", kind, problem);
        }

        match compile(&knowledge, BROKEN_DEFINITIONS) {
            Err(MatchError::Config { .. }) => {
                println!("  Problems found:  {}", problems.len());
                println!("  RESULT: Trial rejected as a whole (expected)");
            }
            Err(e) => println!("  Unexpected error: {}", e),
            Ok(_) => println!("  Unexpectedly compiled"),
        }
        println!();
    }

    // ── Sub-case C: valid trial, rule without evaluator ───────────────────────

    {
        println!("  Sub-case C: Valid trial using a rule without an evaluator");
        let trial = compile(&knowledge, UNCOVERED_TRIAL)?;
        println!("  Compilation:     OK ({} leaf rule(s))", trial.leaf_rules().len());

        let registry = reference_registry(Arc::clone(&knowledge))?;
        let runner = BatchRunner::new(Evaluator::new(&registry));
        match runner.preflight(std::slice::from_ref(&trial)) {
            Err(e @ MatchError::Catalog { .. }) => {
                println!("  Preflight:       {}", e);
                println!("  RESULT: Batch refused before evaluation (expected)");
            }
            Err(e) => println!("  Unexpected error: {}", e),
            Ok(()) => println!("  Unexpectedly passed preflight"),
        }
        println!();
    }

    println!("  Scenario 2 complete.");
    println!();

    Ok(())
}
