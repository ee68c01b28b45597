//! TGF loading errors.

use std::fmt::{self, Display, Formatter};
use thiserror::Error;

/// A single problem found while reading a TGF document.
///
/// Line numbers are 1-based and refer to the input text.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TgfError {
    #[error("line {line}: expected '<id> <name> [condition]'")]
    MalformedState { line: usize },

    #[error("line {line}: expected '<origin> <destination> <symbol>[, <symbol>...]'")]
    MalformedTransition { line: usize },

    #[error("line {line}: invalid condition '{text}', expected '<timer> <op> <integer>'")]
    InvalidCondition { line: usize, text: String },

    #[error("line {line}: invalid action '{text}', expected '<timer> = 0'")]
    InvalidAction { line: usize, text: String },

    #[error("line {line}: state '{id}' is declared twice")]
    DuplicateState { line: usize, id: String },

    #[error("line {line}: transition refers to undeclared state '{id}'")]
    UnknownState { line: usize, id: String },

    #[error("no states declared")]
    NoStates,

    #[error("initial state '{0}' is not declared")]
    UnknownInitialState(String),
}

/// Every error found in a TGF document, in line order.
#[derive(Debug, Clone, Error, PartialEq)]
pub struct TgfErrors(pub Vec<TgfError>);

impl Display for TgfErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} TGF error(s)", self.0.len())?;
        for error in &self.0 {
            write!(f, "\n  {error}")?;
        }
        Ok(())
    }
}
