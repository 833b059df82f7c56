//! Reference runtime demo scenarios.
//!
//! Each scenario is a self-contained module that wires the real eligibility
//! components (resolver, evaluator, batch runner, aggregation, sink) to the
//! reference knowledge bases and the sample patients, and prints what
//! happens at each stage.

pub mod batch_matching;
pub mod single_patient;
pub mod trial_validation;

use eligibility_contracts::{evaluation::Evaluation, function::Eligibility};

/// One criterion as an indented report line, with its most telling message.
pub(crate) fn print_criterion(eligibility: &Eligibility, evaluation: &Evaluation) {
    let message = evaluation.bucket(evaluation.result).specific.iter().next().cloned().unwrap_or_default();
    let recoverable = if evaluation.recoverable { " (recoverable)" } else { "" };
    println!("    [{:<12}] {}{}", evaluation.result.to_string(), eligibility.function, recoverable);
    if !message.is_empty() {
        println!("                   {}", message);
    }
}
