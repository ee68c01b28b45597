//! Executable machines.
//!
//! This module is the imperative shell around [`crate::core`]: it owns the
//! mutable current state, runs actions, performs autonomous resolution when a
//! state condition is violated, drives timers from a tokio clock, and builds
//! product machines.
//!
//! # Key Concepts
//!
//! - **First match wins**: `receive` fires the first applicable transition in
//!   definition order and silently ignores symbols with none.
//! - **Autonomous resolution**: after every transition, `set` and tick, a
//!   violated state condition makes the machine leave the state on its own.
//! - **Deadlock**: resolution found no exit. Reported, logged, never panics.

mod clock;
mod compose;
mod config;
mod machine;
mod transition;

pub use config::MachineConfig;
pub use machine::{Machine, MachineStatus, Snapshot, StepResult};
pub use transition::Transition;
