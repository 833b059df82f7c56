//! Trials and cohorts with their eligibility criteria.

use serde::{Deserialize, Serialize};

use crate::function::Eligibility;
use crate::rule::EligibilityRule;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialIdentification {
    pub trial_id: String,
    pub acronym: String,
    pub title: String,
    pub open: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CohortMetadata {
    pub cohort_id: String,
    pub description: String,
    pub open: bool,
    pub slots_available: bool,
    /// Cohorts that are not evaluable are matched but never reported as a fit.
    pub evaluable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cohort {
    pub metadata: CohortMetadata,
    pub eligibility: Vec<Eligibility>,
}

/// A trial: general criteria shared by every cohort, plus per-cohort criteria.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trial {
    pub identification: TrialIdentification,
    pub general_eligibility: Vec<Eligibility>,
    pub cohorts: Vec<Cohort>,
}

impl Trial {
    /// Every eligibility of the trial and all its cohorts.
    pub fn all_eligibility(&self) -> impl Iterator<Item = &Eligibility> {
        self.general_eligibility
            .iter()
            .chain(self.cohorts.iter().flat_map(|c| c.eligibility.iter()))
    }

    /// Leaf rules used anywhere in the trial.
    pub fn leaf_rules(&self) -> Vec<EligibilityRule> {
        let mut rules: Vec<EligibilityRule> = self
            .all_eligibility()
            .flat_map(|e| e.function.rules())
            .filter(|rule| !rule.is_composite())
            .collect();
        rules.sort();
        rules.dedup();
        rules
    }
}
