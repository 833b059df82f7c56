//! The leaf evaluator registry.
//!
//! Maps every leaf rule to the clinical logic that evaluates it. The registry
//! is filled once at startup and then only read. `verify_covers` is the
//! startup check that every leaf rule a set of trials uses has an evaluator.

use std::collections::{BTreeSet, HashMap};

use eligibility_contracts::{
    error::{MatchError, MatchResult},
    rule::EligibilityRule,
};
use tracing::debug;

use crate::traits::LeafEvaluator;

#[derive(Default)]
pub struct LeafEvaluatorRegistry {
    evaluators: HashMap<EligibilityRule, Box<dyn LeafEvaluator>>,
}

impl LeafEvaluatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the evaluator for a leaf rule, replacing any earlier one.
    ///
    /// Composite rules are evaluated by the engine itself and cannot be
    /// registered.
    pub fn register(&mut self, rule: EligibilityRule, evaluator: impl LeafEvaluator + 'static) -> MatchResult<()> {
        if rule.is_composite() {
            return Err(MatchError::Catalog {
                reason: format!("{rule} is a composite rule and cannot have a leaf evaluator"),
            });
        }
        debug!(rule = %rule, "registering leaf evaluator");
        self.evaluators.insert(rule, Box::new(evaluator));
        Ok(())
    }

    pub fn get(&self, rule: EligibilityRule) -> Option<&dyn LeafEvaluator> {
        self.evaluators.get(&rule).map(|e| e.as_ref())
    }

    pub fn contains(&self, rule: EligibilityRule) -> bool {
        self.evaluators.contains_key(&rule)
    }

    pub fn len(&self) -> usize {
        self.evaluators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluators.is_empty()
    }

    pub fn rules(&self) -> BTreeSet<EligibilityRule> {
        self.evaluators.keys().copied().collect()
    }

    /// Fails with a `Catalog` error naming every rule that has no evaluator.
    pub fn verify_covers<'a>(&self, rules: impl IntoIterator<Item = &'a EligibilityRule>) -> MatchResult<()> {
        let missing: BTreeSet<&str> = rules
            .into_iter()
            .filter(|rule| !rule.is_composite() && !self.contains(**rule))
            .map(|rule| rule.name())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(MatchError::Catalog {
                reason: format!(
                    "no leaf evaluator registered for: {}",
                    missing.into_iter().collect::<Vec<_>>().join(", ")
                ),
            })
        }
    }
}

impl std::fmt::Debug for LeafEvaluatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeafEvaluatorRegistry").field("rules", &self.rules()).finish()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use eligibility_contracts::{
        evaluation::Evaluation, patient::PatientRecord, resolved::ResolvedInput,
    };

    use super::*;

    fn always_pass(_: &PatientRecord, _: &ResolvedInput, _: NaiveDate) -> MatchResult<Evaluation> {
        Ok(Evaluation::pass("ok", ""))
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = LeafEvaluatorRegistry::new();
        registry.register(EligibilityRule::IsMale, always_pass).unwrap();
        assert!(registry.contains(EligibilityRule::IsMale));
        assert!(registry.get(EligibilityRule::IsFemale).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn composite_rules_cannot_be_registered() {
        let mut registry = LeafEvaluatorRegistry::new();
        let result = registry.register(EligibilityRule::And, always_pass);
        assert!(matches!(result, Err(MatchError::Catalog { .. })));
    }

    #[test]
    fn verify_covers_names_missing_rules() {
        let mut registry = LeafEvaluatorRegistry::new();
        registry.register(EligibilityRule::IsMale, always_pass).unwrap();
        let used = [EligibilityRule::Not, EligibilityRule::IsMale, EligibilityRule::IsPregnant];
        match registry.verify_covers(used.iter()) {
            Err(MatchError::Catalog { reason }) => {
                assert!(reason.contains("IS_PREGNANT"), "{reason}");
                assert!(!reason.contains("NOT"), "{reason}");
            }
            other => panic!("expected Catalog error, got {:?}", other),
        }
        assert!(registry.verify_covers([EligibilityRule::IsMale].iter()).is_ok());
    }
}
