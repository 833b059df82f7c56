//! Evaluation outcomes.
//!
//! Every rule evaluation, leaf or composite, produces one `Evaluation`: a
//! four-valued result, a recoverability flag and messages sorted into one
//! specific (patient-facing detail) and one general (summary) bucket per
//! outcome. Molecular events that drove the outcome are carried separately so
//! they can be reported per inclusion/exclusion criterion.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The four-valued outcome of an evaluation.
///
/// Declaration order follows disjunction precedence. Combinators pick the
/// winner through [`EvaluationResult::conjunction_rank`] and
/// [`EvaluationResult::disjunction_rank`], never through `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvaluationResult {
    Pass,
    Warn,
    Undetermined,
    Fail,
}

impl EvaluationResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationResult::Pass => "PASS",
            EvaluationResult::Warn => "WARN",
            EvaluationResult::Undetermined => "UNDETERMINED",
            EvaluationResult::Fail => "FAIL",
        }
    }

    /// Position in conjunction precedence; higher wins.
    /// FAIL over WARN over UNDETERMINED over PASS.
    pub fn conjunction_rank(&self) -> u8 {
        match self {
            EvaluationResult::Pass => 0,
            EvaluationResult::Undetermined => 1,
            EvaluationResult::Warn => 2,
            EvaluationResult::Fail => 3,
        }
    }

    /// Position in disjunction precedence; lower wins.
    pub fn disjunction_rank(&self) -> u8 {
        match self {
            EvaluationResult::Pass => 0,
            EvaluationResult::Warn => 1,
            EvaluationResult::Undetermined => 2,
            EvaluationResult::Fail => 3,
        }
    }
}

impl fmt::Display for EvaluationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Specific and general messages for one outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBucket {
    pub specific: BTreeSet<String>,
    pub general: BTreeSet<String>,
}

impl MessageBucket {
    pub fn is_empty(&self) -> bool {
        self.specific.is_empty() && self.general.is_empty()
    }

    pub fn absorb(&mut self, other: MessageBucket) {
        self.specific.extend(other.specific);
        self.general.extend(other.general);
    }
}

/// The result of evaluating one function against one patient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub result: EvaluationResult,
    /// A FAIL that may turn into a PASS once more data is known or time passes.
    pub recoverable: bool,
    pub pass: MessageBucket,
    pub warn: MessageBucket,
    pub undetermined: MessageBucket,
    pub fail: MessageBucket,
    pub inclusion_molecular_events: BTreeSet<String>,
    pub exclusion_molecular_events: BTreeSet<String>,
}

impl Evaluation {
    fn empty(result: EvaluationResult, recoverable: bool) -> Self {
        Self {
            result,
            recoverable,
            pass: MessageBucket::default(),
            warn: MessageBucket::default(),
            undetermined: MessageBucket::default(),
            fail: MessageBucket::default(),
            inclusion_molecular_events: BTreeSet::new(),
            exclusion_molecular_events: BTreeSet::new(),
        }
    }

    pub fn pass(specific: impl Into<String>, general: impl Into<String>) -> Self {
        let mut evaluation = Self::empty(EvaluationResult::Pass, false);
        evaluation.pass = bucket(specific, general);
        evaluation
    }

    pub fn fail(specific: impl Into<String>, general: impl Into<String>) -> Self {
        let mut evaluation = Self::empty(EvaluationResult::Fail, false);
        evaluation.fail = bucket(specific, general);
        evaluation
    }

    pub fn recoverable_fail(specific: impl Into<String>, general: impl Into<String>) -> Self {
        let mut evaluation = Self::fail(specific, general);
        evaluation.recoverable = true;
        evaluation
    }

    pub fn warn(specific: impl Into<String>, general: impl Into<String>) -> Self {
        let mut evaluation = Self::empty(EvaluationResult::Warn, false);
        evaluation.warn = bucket(specific, general);
        evaluation
    }

    /// Missing or ambiguous data. Always recoverable.
    pub fn undetermined(specific: impl Into<String>, general: impl Into<String>) -> Self {
        let mut evaluation = Self::empty(EvaluationResult::Undetermined, true);
        evaluation.undetermined = bucket(specific, general);
        evaluation
    }

    pub fn with_inclusion_event(mut self, event: impl Into<String>) -> Self {
        self.inclusion_molecular_events.insert(event.into());
        self
    }

    pub fn with_exclusion_event(mut self, event: impl Into<String>) -> Self {
        self.exclusion_molecular_events.insert(event.into());
        self
    }

    /// A FAIL that cannot become a PASS.
    pub fn is_hard_fail(&self) -> bool {
        self.result == EvaluationResult::Fail && !self.recoverable
    }

    pub fn bucket(&self, result: EvaluationResult) -> &MessageBucket {
        match result {
            EvaluationResult::Pass => &self.pass,
            EvaluationResult::Warn => &self.warn,
            EvaluationResult::Undetermined => &self.undetermined,
            EvaluationResult::Fail => &self.fail,
        }
    }

    /// Unions messages and molecular events of `other` into `self`.
    /// Result and recoverability are left untouched.
    pub fn absorb_messages(&mut self, other: Evaluation) {
        self.pass.absorb(other.pass);
        self.warn.absorb(other.warn);
        self.undetermined.absorb(other.undetermined);
        self.fail.absorb(other.fail);
        self.inclusion_molecular_events.extend(other.inclusion_molecular_events);
        self.exclusion_molecular_events.extend(other.exclusion_molecular_events);
    }

    /// An evaluation with the given outcome and no messages, used as the seed
    /// when combining children.
    pub fn seed(result: EvaluationResult, recoverable: bool) -> Self {
        Self::empty(result, recoverable)
    }
}

fn bucket(specific: impl Into<String>, general: impl Into<String>) -> MessageBucket {
    let mut bucket = MessageBucket::default();
    let specific = specific.into();
    let general = general.into();
    if !specific.is_empty() {
        bucket.specific.insert(specific);
    }
    if !general.is_empty() {
        bucket.general.insert(general);
    }
    bucket
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factories_fill_the_matching_bucket() {
        let e = Evaluation::fail("Patient is 16 years old", "Too young");
        assert_eq!(e.result, EvaluationResult::Fail);
        assert!(!e.recoverable);
        assert!(e.fail.specific.contains("Patient is 16 years old"));
        assert!(e.pass.is_empty() && e.warn.is_empty() && e.undetermined.is_empty());
    }

    #[test]
    fn conjunction_rank_puts_warn_above_undetermined() {
        use EvaluationResult::*;
        let mut results = vec![Undetermined, Pass, Fail, Warn];
        results.sort_by_key(|r| r.conjunction_rank());
        assert_eq!(results, vec![Pass, Undetermined, Warn, Fail]);
    }

    #[test]
    fn undetermined_is_recoverable() {
        let e = Evaluation::undetermined("No WHO status known", "");
        assert!(e.recoverable);
        assert!(e.undetermined.general.is_empty());
        assert!(!e.is_hard_fail());
    }

    #[test]
    fn hard_fail_requires_non_recoverable_fail() {
        assert!(Evaluation::fail("x", "y").is_hard_fail());
        assert!(!Evaluation::recoverable_fail("x", "y").is_hard_fail());
        assert!(!Evaluation::warn("x", "y").is_hard_fail());
    }

    #[test]
    fn absorb_unions_messages_and_events() {
        let mut a = Evaluation::pass("a", "g").with_inclusion_event("KRAS G12C");
        let b = Evaluation::fail("b", "g").with_exclusion_event("EGFR L858R");
        a.absorb_messages(b);
        assert_eq!(a.result, EvaluationResult::Pass);
        assert!(a.fail.specific.contains("b"));
        assert_eq!(a.inclusion_molecular_events.len(), 1);
        assert_eq!(a.exclusion_molecular_events.len(), 1);
    }

    #[test]
    fn result_serializes_screaming_case() {
        assert_eq!(serde_json::to_string(&EvaluationResult::Undetermined).unwrap(), "\"UNDETERMINED\"");
    }
}
