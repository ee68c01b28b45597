//! Builder for constructing transitions.

use crate::builder::error::BuildError;
use crate::core::{Action, Condition, State, Symbol, Variables};
use crate::runtime::Transition;

/// Builder for constructing transitions with a fluent API.
///
/// Calling `when` or `then` more than once conjoins the guards and sequences
/// the actions.
#[derive(Default)]
pub struct TransitionBuilder {
    from: Option<State>,
    to: Option<State>,
    symbol: Option<Symbol>,
    guard: Condition,
    action: Action,
}

impl TransitionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the origin state (required).
    pub fn from(mut self, state: impl Into<State>) -> Self {
        self.from = Some(state.into());
        self
    }

    /// Set the destination state (required).
    pub fn to(mut self, state: impl Into<State>) -> Self {
        self.to = Some(state.into());
        self
    }

    /// Set the input symbol (required).
    pub fn on(mut self, symbol: impl Into<Symbol>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Add a guard condition (optional).
    pub fn when(mut self, guard: Condition) -> Self {
        self.guard = std::mem::take(&mut self.guard).and(guard);
        self
    }

    /// Add a guard using a closure (optional).
    pub fn when_fn<F>(self, predicate: F) -> Self
    where
        F: Fn(&Variables) -> Result<bool, crate::core::MachineError> + Send + Sync + 'static,
    {
        self.when(Condition::custom(predicate))
    }

    /// Add an action (optional).
    pub fn then(mut self, action: Action) -> Self {
        self.action = std::mem::take(&mut self.action).then(action);
        self
    }

    /// Build the transition.
    pub fn build(self) -> Result<Transition, BuildError> {
        let origin = self.from.ok_or(BuildError::MissingOrigin)?;
        let destination = self.to.ok_or(BuildError::MissingDestination)?;
        let symbol = self.symbol.ok_or(BuildError::MissingSymbol)?;

        Ok(Transition {
            origin,
            symbol,
            destination,
            guard: self.guard,
            action: self.action,
        })
    }
}
