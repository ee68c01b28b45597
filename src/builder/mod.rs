//! Builder API for ergonomic machine construction.
//!
//! This module provides fluent builders and macros for creating machines
//! with minimal boilerplate.

pub mod error;
pub mod machine;
pub mod macros;
pub mod transition;

pub use error::BuildError;
pub use machine::MachineBuilder;
pub use transition::TransitionBuilder;

use crate::core::{Condition, State, Symbol};
use crate::runtime::Transition;

/// Create an unconditional transition with no action.
///
/// # Example
///
/// ```
/// use tandem::builder::simple_transition;
///
/// let transition = simple_transition("red", "switch", "green");
/// assert_eq!(transition.origin.id(), "red");
/// ```
pub fn simple_transition(
    from: impl Into<State>,
    symbol: impl Into<Symbol>,
    to: impl Into<State>,
) -> Transition {
    Transition::new(from, symbol, to)
}

/// Create a transition with a guard.
///
/// # Example
///
/// ```
/// use tandem::builder::guarded_transition;
/// use tandem::core::{Comparator, Condition};
///
/// let transition = guarded_transition(
///     "red",
///     "switch",
///     "green",
///     Condition::timer("t", Comparator::Ge, 3),
/// );
/// ```
pub fn guarded_transition(
    from: impl Into<State>,
    symbol: impl Into<Symbol>,
    to: impl Into<State>,
    guard: Condition,
) -> Transition {
    Transition::new(from, symbol, to).when(guard)
}
