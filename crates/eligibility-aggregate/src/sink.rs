//! Hand-off of match results to a store.
//!
//! `MatchSink` is the seam to the external persistence layer.
//! `InMemoryMatchSink` is the reference implementation: it keeps the record
//! sets of one run in a `Vec` behind a `Mutex`, so batch code on several
//! threads can write into it.

use std::sync::{Arc, Mutex};

use tracing::info;
use uuid::Uuid;

use eligibility_contracts::error::{MatchError, MatchResult};

use crate::record::PatientRecordSet;
use crate::summary::PatientMatch;

/// Receives the matches of a run, one patient at a time.
pub trait MatchSink: Send + Sync {
    fn write(&self, patient_match: &PatientMatch) -> MatchResult<()>;

    /// Called once after the last `write` of a run.
    fn finalize(&self, run_id: Uuid) -> MatchResult<()>;
}

// ── Internal mutable state ────────────────────────────────────────────────────

pub(crate) struct InMemoryState {
    pub(crate) records: Vec<PatientRecordSet>,
    pub(crate) finalized: bool,
}

// ── Public sink ───────────────────────────────────────────────────────────────

pub struct InMemoryMatchSink {
    run_id: Uuid,
    pub(crate) state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryMatchSink {
    pub fn new(run_id: Uuid) -> Self {
        let state = InMemoryState { records: Vec::new(), finalized: false };
        Self { run_id, state: Arc::new(Mutex::new(state)) }
    }

    fn lock(&self) -> MatchResult<std::sync::MutexGuard<'_, InMemoryState>> {
        self.state.lock().map_err(|e| MatchError::Output { reason: format!("match sink lock poisoned: {}", e) })
    }

    /// Every record set written so far, in write order.
    pub fn export(&self) -> MatchResult<Vec<PatientRecordSet>> {
        Ok(self.lock()?.records.clone())
    }

    /// All record sets as a pretty-printed JSON array.
    pub fn export_json(&self) -> MatchResult<String> {
        let records = self.export()?;
        serde_json::to_string_pretty(&records)
            .map_err(|e| MatchError::Output { reason: format!("failed to serialize run {}: {}", self.run_id, e) })
    }

    pub fn is_finalized(&self) -> MatchResult<bool> {
        Ok(self.lock()?.finalized)
    }
}

// ── MatchSink impl ────────────────────────────────────────────────────────────

impl MatchSink for InMemoryMatchSink {
    /// Flatten and append one patient's matches.
    ///
    /// Matches from another run and writes after `finalize` are rejected.
    fn write(&self, patient_match: &PatientMatch) -> MatchResult<()> {
        if patient_match.run_id != self.run_id {
            return Err(MatchError::Output {
                reason: format!(
                    "match for patient '{}' belongs to run {}, sink holds run {}",
                    patient_match.patient_id, patient_match.run_id, self.run_id
                ),
            });
        }
        let mut state = self.lock()?;
        if state.finalized {
            return Err(MatchError::Output { reason: format!("run {} is already finalized", self.run_id) });
        }
        state.records.push(PatientRecordSet::from_match(patient_match));
        Ok(())
    }

    /// Only the sink's own run can be finalized.
    fn finalize(&self, run_id: Uuid) -> MatchResult<()> {
        if run_id != self.run_id {
            return Err(MatchError::Output {
                reason: format!("cannot finalize run {run_id}, sink holds run {}", self.run_id),
            });
        }
        let mut state = self.lock()?;
        state.finalized = true;
        info!(run_id = %run_id, patients = state.records.len(), "match output finalized");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn patient_match(run_id: Uuid, patient_id: &str) -> PatientMatch {
        PatientMatch::new(run_id, patient_id, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(), vec![])
    }

    #[test]
    fn test_write_and_export() {
        let run_id = Uuid::new_v4();
        let sink = InMemoryMatchSink::new(run_id);
        sink.write(&patient_match(run_id, "P1")).unwrap();
        sink.write(&patient_match(run_id, "P2")).unwrap();
        sink.finalize(run_id).unwrap();

        let exported = sink.export().unwrap();
        let ids: Vec<_> = exported.iter().map(|r| r.patient_id.as_str()).collect();
        assert_eq!(ids, vec!["P1", "P2"]);
        assert!(sink.is_finalized().unwrap());

        let json: serde_json::Value = serde_json::from_str(&sink.export_json().unwrap()).unwrap();
        assert_eq!(json.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_foreign_run_is_rejected() {
        let sink = InMemoryMatchSink::new(Uuid::new_v4());
        match sink.write(&patient_match(Uuid::new_v4(), "P1")) {
            Err(MatchError::Output { reason }) => assert!(reason.contains("P1"), "{reason}"),
            other => panic!("expected Output error, got {:?}", other),
        }
    }

    #[test]
    fn test_write_after_finalize_is_rejected() {
        let run_id = Uuid::new_v4();
        let sink = InMemoryMatchSink::new(run_id);
        sink.finalize(run_id).unwrap();
        assert!(sink.write(&patient_match(run_id, "P1")).is_err());
    }

    #[test]
    fn test_finalize_of_foreign_run_is_rejected() {
        let run_id = Uuid::new_v4();
        let sink = InMemoryMatchSink::new(run_id);
        assert!(matches!(sink.finalize(Uuid::new_v4()), Err(MatchError::Output { .. })));
        assert!(!sink.is_finalized().unwrap());
        sink.write(&patient_match(run_id, "P1")).unwrap();
    }

    #[test]
    fn test_poisoned_lock_surfaces_as_output_error() {
        let sink = InMemoryMatchSink::new(Uuid::new_v4());
        let state = Arc::clone(&sink.state);
        let _ = std::thread::spawn(move || {
            let _guard = state.lock().unwrap();
            panic!("writer crashed while holding the lock");
        })
        .join();

        assert!(matches!(sink.is_finalized(), Err(MatchError::Output { .. })));
        assert!(matches!(sink.export(), Err(MatchError::Output { .. })));
    }
}
