//! Tandem: finite state machines with timed state conditions and parallel
//! composition.
//!
//! A [`Machine`] consumes input symbols through an ordered transition table.
//! States may carry a [`Condition`] that must keep holding while the machine
//! sits in them; when a variable write or a clock tick violates it, the
//! machine leaves the state on its own through the first enabled transition.
//! Two machines compose into their synchronous product with
//! [`Machine::compose_in_parallel`].
//!
//! # Core Concepts
//!
//! - **Variables**: named values plus integer timers owned by a machine
//! - **Conditions**: predicates over variables, used as guards and state
//!   conditions
//! - **Actions**: store mutations run when a transition fires, all or nothing
//! - **Clock**: a tokio task that advances timers and re-checks the current
//!   state
//!
//! # Example
//!
//! ```rust
//! use tandem::{variables, Action, Comparator, Condition, Machine, Transition};
//!
//! let store = Machine::with_variables(
//!     "empty",
//!     vec![
//!         Transition::new("empty", "enter person", "full").then(Action::add("counter", 1)),
//!         Transition::new("full", "enter person", "full").then(Action::add("counter", 1)),
//!         Transition::new("full", "exit person", "empty")
//!             .when(Condition::variable("counter", Comparator::Eq, 1))
//!             .then(Action::add("counter", -1)),
//!         Transition::new("full", "exit person", "full")
//!             .when(Condition::variable("counter", Comparator::Gt, 1))
//!             .then(Action::add("counter", -1)),
//!     ],
//!     variables! { "counter" => 0 },
//! );
//!
//! let alarm = Machine::new(
//!     "alarm off",
//!     vec![
//!         Transition::new("alarm off", "enter person", "alarm on"),
//!         Transition::new("alarm on", "exit person", "alarm off"),
//!     ],
//! );
//!
//! let both = store.compose_in_parallel(&alarm);
//! both.receive("enter person").unwrap();
//! assert_eq!(both.current_state().id(), "full, alarm on");
//! assert_eq!(both.int_value_for("counter").unwrap(), 1);
//! ```

pub mod builder;
pub mod core;
pub mod runtime;
pub mod tgf;

// Re-export commonly used types
pub use crate::builder::{BuildError, MachineBuilder, TransitionBuilder};
pub use crate::core::{
    Action, Comparator, Condition, MachineError, State, StateHistory, Symbol, Value, Variables,
};
pub use crate::runtime::{Machine, MachineConfig, MachineStatus, Snapshot, StepResult, Transition};
