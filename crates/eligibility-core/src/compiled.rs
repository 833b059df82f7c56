//! Executable function trees.
//!
//! A `CompiledFunction` is an `EligibilityFunction` whose leaf parameters
//! have been resolved. Composite and leaf nodes are disjoint variants so the
//! evaluator never has to re-check which kind of parameter a node carries.

use std::collections::BTreeSet;

use eligibility_contracts::{
    function::Eligibility,
    resolved::ResolvedInput,
    rule::EligibilityRule,
    trial::{CohortMetadata, TrialIdentification},
};

#[derive(Debug, Clone, PartialEq)]
pub enum CompiledFunction {
    Composite {
        rule: EligibilityRule,
        children: Vec<CompiledFunction>,
    },
    Leaf {
        rule: EligibilityRule,
        input: ResolvedInput,
    },
}

impl CompiledFunction {
    pub fn rule(&self) -> EligibilityRule {
        match self {
            CompiledFunction::Composite { rule, .. } | CompiledFunction::Leaf { rule, .. } => *rule,
        }
    }

    pub fn leaf_rules(&self) -> BTreeSet<EligibilityRule> {
        let mut rules = BTreeSet::new();
        self.collect_leaf_rules(&mut rules);
        rules
    }

    fn collect_leaf_rules(&self, rules: &mut BTreeSet<EligibilityRule>) {
        match self {
            CompiledFunction::Leaf { rule, .. } => {
                rules.insert(*rule);
            }
            CompiledFunction::Composite { children, .. } => {
                for child in children {
                    child.collect_leaf_rules(rules);
                }
            }
        }
    }
}

/// An eligibility with its compiled function tree.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledEligibility {
    pub eligibility: Eligibility,
    pub function: CompiledFunction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledCohort {
    pub metadata: CohortMetadata,
    pub eligibility: Vec<CompiledEligibility>,
}

/// A trial whose every function has been resolved and is ready to evaluate.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledTrial {
    pub identification: TrialIdentification,
    pub general_eligibility: Vec<CompiledEligibility>,
    pub cohorts: Vec<CompiledCohort>,
}

impl CompiledTrial {
    pub fn leaf_rules(&self) -> BTreeSet<EligibilityRule> {
        self.general_eligibility
            .iter()
            .chain(self.cohorts.iter().flat_map(|c| c.eligibility.iter()))
            .flat_map(|e| e.function.leaf_rules())
            .collect()
    }
}
