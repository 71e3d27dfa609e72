use thiserror::Error;

use crate::api::IngestError;
use crate::policy::RuleError;
use crate::rules::EvaluationError;

/// Any failure surfaced by the engine's entry points.
///
/// Configuration errors are for operators (bad rule files); input errors
/// are for the caller who sent the data.
#[derive(Error, Debug)]
pub enum Error {
    #[error("rule configuration error: {0}")]
    Configuration(#[from] RuleError),

    #[error("rule evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    #[error("invalid input: {0}")]
    Input(#[from] IngestError),
}

impl Error {
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }

    pub fn is_evaluation(&self) -> bool {
        matches!(self, Error::Evaluation(_))
    }

    /// Returns true if the caller, not the operator, should fix this.
    pub fn is_input(&self) -> bool {
        matches!(self, Error::Input(_))
    }
}
