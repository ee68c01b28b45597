//! Build errors for machine and transition builders.

use thiserror::Error;

/// Errors that can occur when building machines and transitions.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("Initial state not specified. Call .initial(state) before .build()")]
    MissingInitialState,

    #[error("Transition origin not specified. Call .from(state)")]
    MissingOrigin,

    #[error("Transition destination not specified. Call .to(state)")]
    MissingDestination,

    #[error("Transition symbol not specified. Call .on(symbol)")]
    MissingSymbol,
}
