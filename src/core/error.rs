//! Runtime errors raised while evaluating conditions and running actions.

use super::value::ValueKind;
use thiserror::Error;

/// Errors that can occur while a machine reads or mutates its store.
///
/// A transition that fails with one of these errors is not committed: the
/// machine keeps the state and variables it had before the call.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MachineError {
    #[error("Variable '{name}' is not defined")]
    UndefinedVariable { name: String },

    #[error("Timer '{name}' is not defined")]
    UndefinedTimer { name: String },

    #[error("Variable '{name}' holds a {found} value, expected {expected}")]
    TypeMismatch {
        name: String,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("Action failed: {0}")]
    ActionFailed(String),
}
