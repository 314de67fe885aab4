//! Error taxonomy for the GA engine.
//!
//! None of these are recovered internally: configuration errors abort
//! before the first generation, the others signal a defect in an operator
//! or in the caller's driving order.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors raised by the exam-scheduling GA.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GaError {
    /// Invalid construction parameters or domain data.
    #[error("invalid configuration: {}", join_messages(.0))]
    Configuration(Vec<ValidationError>),

    /// A malformed chromosome reached the evaluator or an operator.
    #[error("chromosome invariant violated: {0}")]
    InvariantViolation(String),

    /// Selection over an empty or zero-fitness population.
    #[error("cannot select from an empty or unscored population")]
    EmptyPopulation,

    /// A driver operation was called in the wrong lifecycle state.
    #[error("driver is in state {actual:?}, expected {expected}")]
    InvalidState {
        /// Human-readable description of the acceptable states.
        expected: &'static str,
        /// The state the driver was actually in.
        actual: crate::ga::GaState,
    },
}

impl From<Vec<ValidationError>> for GaError {
    fn from(errors: Vec<ValidationError>) -> Self {
        GaError::Configuration(errors)
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
