//! Trial definitions shipped with the reference runtime.
//!
//! The TOML sources live under `trials/` and are embedded at compile time.

use eligibility_contracts::error::MatchResult;
use eligibility_core::compiled::CompiledTrial;
use eligibility_resolver::TrialDefinition;

use crate::knowledge::ReferenceKnowledge;

/// KRAS-mutant metastatic colorectal cancer, three cohorts.
pub const KRAS_CRC: &str = include_str!("../trials/kras-crc.toml");

/// EGFR-mutant NSCLC after TKI progression, two cohorts.
pub const EGFR_NSCLC: &str = include_str!("../trials/egfr-nsclc.toml");

/// Parses, but every function in it is rejected by the resolver.
pub const BROKEN_DEFINITIONS: &str = include_str!("../trials/broken-definitions.toml");

/// Parse and compile one TOML trial definition against the reference knowledge.
pub fn compile(knowledge: &ReferenceKnowledge, source: &str) -> MatchResult<CompiledTrial> {
    let trial = TrialDefinition::from_toml_str(source)?.into_trial()?;
    knowledge.resolver().compile_trial(&trial)
}

/// The two valid reference trials, compiled.
pub fn reference_trials(knowledge: &ReferenceKnowledge) -> MatchResult<Vec<CompiledTrial>> {
    [KRAS_CRC, EGFR_NSCLC].into_iter().map(|source| compile(knowledge, source)).collect()
}
