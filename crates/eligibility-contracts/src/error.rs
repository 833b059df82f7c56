//! Error types for trial loading, input resolution and evaluation.
//!
//! All fallible operations in the workspace return `MatchResult<T>`. Shape and
//! lookup problems are load-time rejections of a single function; catalog
//! problems abort startup; defects abort evaluation for one patient.

use thiserror::Error;

/// The unified error type for the eligibility engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// A rule lacks an evaluator or a shape lacks a resolver. Fatal at startup.
    #[error("catalog error: {reason}")]
    Catalog { reason: String },

    /// Parameter count, nesting or token syntax does not match the rule's shape.
    #[error("invalid parameters for {rule}: {reason}")]
    Shape { rule: String, reason: String },

    /// A token is syntactically fine but an external collaborator cannot resolve it.
    #[error("unresolvable parameter for {rule}: {reason}")]
    Lookup { rule: String, reason: String },

    /// A function string could not be parsed, e.g. because of an unknown rule name.
    #[error("parse error: {reason}")]
    Parse { reason: String },

    /// A trial definition could not be read or does not match the expected schema.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// A resolver/evaluator contract was violated after resolution.
    ///
    /// Never produced for missing patient data; that is an UNDETERMINED evaluation.
    #[error("evaluation defect in {rule}: {reason}")]
    Defect { rule: String, reason: String },

    /// Match results could not be serialized or handed to a sink.
    #[error("output error: {reason}")]
    Output { reason: String },
}

impl MatchError {
    /// True for the two load-time rejections that are reported to trial authors.
    pub fn is_rejection(&self) -> bool {
        matches!(self, MatchError::Shape { .. } | MatchError::Lookup { .. })
    }
}

/// Convenience alias used throughout the eligibility crates.
pub type MatchResult<T> = Result<T, MatchError>;
