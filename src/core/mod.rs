//! Core value types of the runtime.
//!
//! This module contains everything a machine is made of but not the machine
//! itself:
//! - Variable and timer storage (`Variables`, `Value`)
//! - Predicates (`Condition`) and side effects (`Action`)
//! - States, including composite states of product machines
//! - Input symbols and transition history
//!
//! Nothing in this module spawns tasks or takes locks.

mod action;
mod condition;
mod error;
mod history;
mod state;
mod symbol;
mod value;
mod variables;

pub use action::{Action, Effect};
pub use condition::{Comparator, Condition, Predicate};
pub use error::MachineError;
pub use history::{StateHistory, StateTransition, Trigger};
pub use state::State;
pub use symbol::Symbol;
pub use value::{Value, ValueKind};
pub use variables::Variables;
