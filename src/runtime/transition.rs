//! Transitions between states.

use crate::core::{Action, Condition, MachineError, State, Symbol, Variables};
use std::fmt::{self, Debug, Formatter};
use std::hash::{Hash, Hasher};

/// A guarded, effectful edge of a machine.
///
/// Identity (equality and hashing) is the `(origin, symbol, destination)`
/// triple; the guard and action are not part of it. Machines keep their
/// transitions in a sequence, so transitions that compare equal but carry
/// different guards are all retained.
#[derive(Clone)]
pub struct Transition {
    pub origin: State,
    pub symbol: Symbol,
    pub destination: State,
    pub guard: Condition,
    pub action: Action,
}

impl Transition {
    /// Unguarded transition with no action.
    pub fn new(
        origin: impl Into<State>,
        symbol: impl Into<Symbol>,
        destination: impl Into<State>,
    ) -> Self {
        Self {
            origin: origin.into(),
            symbol: symbol.into(),
            destination: destination.into(),
            guard: Condition::Always,
            action: Action::Noop,
        }
    }

    /// Replace the guard.
    pub fn when(mut self, guard: Condition) -> Self {
        self.guard = guard;
        self
    }

    /// Replace the action.
    pub fn then(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    /// Whether this transition may fire from `current` (origin and guard).
    pub fn can_fire(&self, current: &State, vars: &Variables) -> Result<bool, MachineError> {
        if self.origin != *current {
            return Ok(false);
        }
        self.guard.evaluate(vars)
    }

    pub fn is_self_loop(&self) -> bool {
        self.origin == self.destination
    }
}

impl PartialEq for Transition {
    fn eq(&self, other: &Self) -> bool {
        self.origin == other.origin
            && self.symbol == other.symbol
            && self.destination == other.destination
    }
}

impl Eq for Transition {}

impl Hash for Transition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.origin.hash(state);
        self.symbol.hash(state);
        self.destination.hash(state);
    }
}

impl Debug for Transition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} --{}--> {}",
            self.origin.id(),
            self.symbol,
            self.destination.id()
        )?;
        if self.guard != Condition::Always {
            write!(f, " [{}]", self.guard)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Comparator;
    use std::collections::HashSet;

    #[test]
    fn defaults_to_unguarded_noop() {
        let transition = Transition::new("Initial", "a", "Final");
        assert_eq!(transition.origin, State::new("Initial"));
        assert_eq!(transition.destination, State::new("Final"));
        assert_eq!(transition.guard, Condition::Always);
        assert!(matches!(transition.action, Action::Noop));
    }

    #[test]
    fn identity_ignores_guard_and_action() {
        let t1 = Transition::new("Initial", "a", "Initial");
        let t2 = Transition::new("Initial", "a", "Initial")
            .when(Condition::variable("x", Comparator::Eq, 1))
            .then(Action::add("x", 1));
        let t3 = Transition::new("Initial", "b", "Initial");
        let t4 = Transition::new("Final", "a", "Initial");

        assert_eq!(t1, t2);
        assert_ne!(t2, t3);
        assert_ne!(t1, t4);

        let set: HashSet<Transition> = [t1, t2].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn can_fire_checks_origin_then_guard() {
        let vars = Variables::new().with("counter", 1);
        let transition = Transition::new("full", "exit person", "empty").when(
            Condition::variable("counter", Comparator::Eq, 1),
        );

        assert!(transition.can_fire(&State::new("full"), &vars).unwrap());
        assert!(!transition.can_fire(&State::new("empty"), &vars).unwrap());

        let vars = Variables::new().with("counter", 2);
        assert!(!transition.can_fire(&State::new("full"), &vars).unwrap());
    }

    #[test]
    fn can_fire_skips_guard_for_other_origins() {
        let transition = Transition::new("a", "go", "b")
            .when(Condition::variable("undefined", Comparator::Eq, 1));
        assert!(!transition
            .can_fire(&State::new("c"), &Variables::new())
            .unwrap());
        assert!(transition
            .can_fire(&State::new("a"), &Variables::new())
            .is_err());
    }

    #[test]
    fn debug_shows_edge_and_guard() {
        let transition = Transition::new("red", "switch", "green")
            .when(Condition::timer("t", Comparator::Ge, 3));
        assert_eq!(
            format!("{transition:?}"),
            "red --switch--> green [timer t >= 3]"
        );
    }
}
