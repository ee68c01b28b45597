//! Parallel (synchronous product) composition of two machine definitions.

use super::machine::Definition;
use super::transition::Transition;
use crate::core::{State, Symbol, Variables};
use std::collections::HashSet;

pub(crate) struct Product {
    pub(crate) initial: State,
    pub(crate) transitions: Vec<Transition>,
    pub(crate) variables: Variables,
}

/// Build the product of `left` and `right`.
///
/// Emission order is fixed: for each left transition in definition order,
/// first its synchronized pairings with right transitions (in right order),
/// then its interleavings over the right states (in state order); after all
/// left transitions, the right-private interleavings over the left states.
/// The receiving machine takes the first match, so this order decides ties.
pub(crate) fn product(left: &Definition, right: &Definition) -> Product {
    let left_symbols: HashSet<&Symbol> = left.alphabet.iter().collect();
    let right_symbols: HashSet<&Symbol> = right.alphabet.iter().collect();
    let mut transitions = Vec::new();

    for t1 in &left.transitions {
        transitions.extend(
            right
                .transitions
                .iter()
                .filter(|t2| t2.symbol == t1.symbol)
                .map(|t2| synchronize(t1, t2)),
        );
        if !right_symbols.contains(&t1.symbol) {
            transitions.extend(right.states.iter().map(|held| hold_right(t1, held)));
        }
    }

    for t2 in &right.transitions {
        if !left_symbols.contains(&t2.symbol) {
            transitions.extend(left.states.iter().map(|held| hold_left(held, t2)));
        }
    }

    Product {
        initial: State::composite(&left.initial, &right.initial),
        transitions,
        variables: left.variables.merge(&right.variables),
    }
}

/// Both components move on a shared symbol.
fn synchronize(t1: &Transition, t2: &Transition) -> Transition {
    Transition {
        origin: State::composite(&t1.origin, &t2.origin),
        symbol: t1.symbol.clone(),
        destination: State::composite(&t1.destination, &t2.destination),
        guard: t1.guard.clone().and(t2.guard.clone()),
        action: t1.action.clone().then(t2.action.clone()),
    }
}

/// The left component moves; the right one stays in `held`.
fn hold_right(t1: &Transition, held: &State) -> Transition {
    Transition {
        origin: State::composite(&t1.origin, held),
        symbol: t1.symbol.clone(),
        destination: State::composite(&t1.destination, held),
        guard: t1.guard.clone(),
        action: t1.action.clone(),
    }
}

/// The right component moves; the left one stays in `held`.
fn hold_left(held: &State, t2: &Transition) -> Transition {
    Transition {
        origin: State::composite(held, &t2.origin),
        symbol: t2.symbol.clone(),
        destination: State::composite(held, &t2.destination),
        guard: t2.guard.clone(),
        action: t2.action.clone(),
    }
}

#[cfg(test)]
mod tests {
    use crate::core::{Action, Comparator, Condition, State, Symbol, Variables};
    use crate::runtime::{Machine, StepResult, Transition};

    fn first() -> Machine {
        Machine::with_variables(
            "1",
            vec![
                Transition::new("1", "a", "2"),
                Transition::new("2", "d", "3"),
                Transition::new("3", "c", "1"),
            ],
            Variables::new().with("counter", 3),
        )
    }

    fn second() -> Machine {
        Machine::with_variables(
            "1'",
            vec![
                Transition::new("1'", "b", "2'"),
                Transition::new("2'", "a", "3'"),
                Transition::new("3'", "c", "1'"),
            ],
            Variables::new().with("counter", 0).with("greetings", "hello"),
        )
    }

    #[test]
    fn composed_machine_starts_in_composite_initial_state() {
        let (a, b) = (first(), second());
        let composed = a.compose_in_parallel(&b);

        assert_eq!(
            composed.initial_state(),
            State::composite(&a.initial_state(), &b.initial_state())
        );
        assert_eq!(composed.current_state(), composed.initial_state());
        assert_eq!(composed.int_value_for("counter").unwrap(), 3);
        assert_eq!(composed.string_value_for("greetings").unwrap(), "hello");
    }

    #[test]
    fn composed_traces_synchronize_shared_symbols() {
        let composed = first().compose_in_parallel(&second());
        let steps = [
            ("a", "1, 1'"),
            ("c", "1, 1'"),
            ("b", "1, 2'"),
            ("b", "1, 2'"),
            ("a", "2, 3'"),
            ("b", "2, 3'"),
            ("d", "3, 3'"),
            ("c", "1, 1'"),
        ];
        for (symbol, expected) in steps {
            composed.receive(symbol).unwrap();
            assert_eq!(composed.current_state().name(), expected, "after {symbol}");
        }
    }

    #[test]
    fn transition_count_matches_product_construction() {
        let composed = first().compose_in_parallel(&second());
        // Shared: a (1 x 1) and c (1 x 1). Private: d over 3 right states,
        // b over 3 left states.
        assert_eq!(composed.transitions().len(), 2 + 3 + 3);
    }

    #[test]
    fn alphabet_is_union_of_both() {
        let composed = first().compose_in_parallel(&second());
        let mut alphabet: Vec<String> = composed
            .alphabet()
            .iter()
            .map(|s| s.as_str().to_string())
            .collect();
        alphabet.sort();
        assert_eq!(alphabet, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn sources_are_not_mutated_by_composed_machine() {
        let (a, b) = (first(), second());
        let composed = a.compose_in_parallel(&b);
        composed.set("counter", 42).unwrap();
        composed.receive("b").unwrap();

        assert_eq!(a.int_value_for("counter").unwrap(), 3);
        assert_eq!(b.int_value_for("counter").unwrap(), 0);
        assert_eq!(b.current_state().id(), "1'");
    }

    #[test]
    fn shared_transitions_conjoin_guards_and_sequence_actions() {
        let left = Machine::with_variables(
            "l",
            vec![Transition::new("l", "go", "l2")
                .when(Condition::variable("x", Comparator::Gt, 0))
                .then(Action::set("log", "left"))],
            Variables::new().with("x", 1),
        );
        let right = Machine::with_variables(
            "r",
            vec![Transition::new("r", "go", "r2")
                .when(Condition::variable("y", Comparator::Gt, 0))
                .then(Action::custom(|vars| {
                    let log = format!("{},right", vars.string_value_for("log")?);
                    vars.set("log", log);
                    Ok(())
                }))],
            Variables::new().with("y", 0),
        );
        let composed = left.compose_in_parallel(&right);

        assert_eq!(composed.receive("go").unwrap(), StepResult::Unchanged);
        composed.set("y", 1).unwrap();
        composed.receive(Symbol::from("go")).unwrap();
        assert_eq!(composed.current_state().id(), "l2, r2");
        assert_eq!(composed.string_value_for("log").unwrap(), "left,right");
    }

    #[test]
    fn composing_a_machine_with_itself_does_not_block() {
        let a = first();
        let composed = a.compose_in_parallel(&a);
        composed.receive("a").unwrap();
        assert_eq!(composed.current_state().id(), "2, 2");
    }

    #[test]
    fn duplicate_keyed_transitions_are_kept() {
        let left = Machine::new(
            "p",
            vec![
                Transition::new("p", "s", "q").when(Condition::variable("k", Comparator::Eq, 1)),
                Transition::new("p", "s", "q").when(Condition::variable("k", Comparator::Eq, 2)),
            ],
        );
        let right = Machine::new("r", vec![Transition::new("r", "s", "r")]);
        let composed = left.compose_in_parallel(&right);

        let transitions = composed.transitions();
        assert_eq!(transitions.len(), 2);
        assert_eq!(transitions[0], transitions[1]);

        composed.set("k", 2).unwrap();
        composed.receive("s").unwrap();
        assert_eq!(composed.current_state().id(), "q, r");
    }
}
