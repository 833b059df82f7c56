//! # eligibility-aggregate
//!
//! Turns per-criterion evaluations into trial and cohort verdicts and into
//! records for an external store.
//!
//! ## Overview
//!
//! A trial or cohort is potentially eligible unless one of its evaluations is
//! a FAIL that cannot be recovered from; a cohort also needs its trial's
//! general criteria to hold. Evaluations are never dropped or changed.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use eligibility_aggregate::{aggregate_batch, InMemoryMatchSink, MatchSink};
//!
//! let report = aggregate_batch(outcomes, reference_date);
//! let sink = InMemoryMatchSink::new(report.run_id);
//! for patient_match in &report.matches {
//!     sink.write(patient_match)?;
//! }
//! sink.finalize(report.run_id)?;
//! ```

pub mod record;
pub mod sink;
pub mod summary;

pub use record::{EvaluationRecord, MessageColumns, PatientRecordSet, TrialRecord};
pub use sink::{InMemoryMatchSink, MatchSink};
pub use summary::{
    aggregate_batch, is_potentially_eligible, BatchReport, CohortMatch, MatchSummary, PairDefect, PatientMatch,
    TrialMatch,
};
