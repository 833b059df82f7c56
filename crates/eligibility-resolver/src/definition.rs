//! TOML trial definitions.
//!
//! A `TrialDefinition` is deserialized from TOML and converted into a
//! `Trial` by parsing every `rule` string. Conversion checks syntax only;
//! run the result through `InputResolver::compile_trial` before evaluating.
//!
//! Example:
//! ```toml
//! trial_id = "CRC-01"
//! acronym = "CRC-01"
//! title = "Capecitabine maintenance in colorectal cancer"
//!
//! [[eligibility]]
//! rule = "IS_AT_LEAST_X_YEARS_OLD(18)"
//! references = [{ id = "I-01", text = "Patients aged 18 years or older" }]
//!
//! [[cohorts]]
//! cohort_id = "A"
//! description = "Pretreated with oxaliplatin"
//!
//! [[cohorts.eligibility]]
//! rule = "HAS_HAD_TREATMENT_WITH_ANY_DRUG_X(OXALIPLATIN)"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use eligibility_contracts::{
    error::{MatchError, MatchResult},
    function::{CriterionReference, Eligibility},
    trial::{Cohort, CohortMetadata, Trial, TrialIdentification},
};

use crate::parse::parse_function;

fn default_true() -> bool {
    true
}

/// One criterion: the function string plus the protocol text it covers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilityDefinition {
    /// Function in its textual form, e.g. `NOT(IS_PREGNANT)`.
    pub rule: String,

    #[serde(default)]
    pub references: Vec<CriterionReference>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortDefinition {
    pub cohort_id: String,

    pub description: String,

    #[serde(default = "default_true")]
    pub open: bool,

    #[serde(default = "default_true")]
    pub slots_available: bool,

    #[serde(default = "default_true")]
    pub evaluable: bool,

    #[serde(default)]
    pub eligibility: Vec<EligibilityDefinition>,
}

/// The top-level structure deserialized from a TOML trial file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialDefinition {
    pub trial_id: String,

    pub acronym: String,

    pub title: String,

    #[serde(default = "default_true")]
    pub open: bool,

    /// Criteria every cohort shares.
    #[serde(default)]
    pub eligibility: Vec<EligibilityDefinition>,

    #[serde(default)]
    pub cohorts: Vec<CohortDefinition>,
}

impl TrialDefinition {
    /// Parse `s` as TOML.
    ///
    /// Returns `MatchError::Config` if the TOML is malformed or does not
    /// match the expected schema.
    pub fn from_toml_str(s: &str) -> MatchResult<Self> {
        toml::from_str(s).map_err(|e| MatchError::Config { reason: format!("failed to parse trial TOML: {}", e) })
    }

    /// Read the file at `path` and parse it as a TOML trial definition.
    pub fn from_file(path: &Path) -> MatchResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| MatchError::Config {
            reason: format!("failed to read trial file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse every rule string. The first syntax error rejects the trial.
    pub fn into_trial(self) -> MatchResult<Trial> {
        let trial_id = self.trial_id.clone();
        let general_eligibility = convert(&trial_id, self.eligibility)?;
        let cohorts = self
            .cohorts
            .into_iter()
            .map(|cohort| {
                Ok(Cohort {
                    metadata: CohortMetadata {
                        cohort_id: cohort.cohort_id,
                        description: cohort.description,
                        open: cohort.open,
                        slots_available: cohort.slots_available,
                        evaluable: cohort.evaluable,
                    },
                    eligibility: convert(&trial_id, cohort.eligibility)?,
                })
            })
            .collect::<MatchResult<Vec<_>>>()?;

        debug!(trial_id = %trial_id, cohorts = cohorts.len(), "loaded trial definition");
        Ok(Trial {
            identification: TrialIdentification {
                trial_id: self.trial_id,
                acronym: self.acronym,
                title: self.title,
                open: self.open,
            },
            general_eligibility,
            cohorts,
        })
    }
}

fn convert(trial_id: &str, definitions: Vec<EligibilityDefinition>) -> MatchResult<Vec<Eligibility>> {
    definitions
        .into_iter()
        .map(|definition| {
            let function = parse_function(&definition.rule).map_err(|e| MatchError::Config {
                reason: format!("trial '{trial_id}': {e}"),
            })?;
            Ok(Eligibility::new(function, definition.references))
        })
        .collect()
}

/// Convenience for `TrialDefinition::from_file(path)?.into_trial()`.
pub fn load_trial(path: &Path) -> MatchResult<Trial> {
    TrialDefinition::from_file(path)?.into_trial()
}
