//! Machine definitions from Trivial Graph Format text.
//!
//! A document lists states, one per line, then a `#` line, then transitions:
//!
//! ```text
//! 7 Idle
//! 8 Sending bytes [ t < 120 ]
//! #
//! 7 8 send bytes { t = 0 }
//! 8 7 bytes sent, failed
//! 8 7 timeout [ t = 120 ]
//! ```
//!
//! A state line is an id, a display name and an optional bracketed timer
//! condition. A transition line is an origin id, a destination id, a comma
//! separated list of symbols, an optional bracketed guard and an optional
//! braced list of timer resets. Bracket expressions have the form
//! `timer op integer` with `op` one of `< <= = == != >= >`.
//!
//! Parsing accumulates every error in the document rather than stopping at
//! the first one.
//!
//! ```
//! use tandem::tgf::Graph;
//!
//! let graph: Graph = "1 off\n2 on\n#\n1 2 flip\n2 1 flip".parse().unwrap();
//! let machine = graph.machine("1").unwrap();
//! machine.receive("flip").unwrap();
//! assert_eq!(machine.current_state().name(), "on");
//! ```

mod error;
mod parser;

pub use error::{TgfError, TgfErrors};

use crate::core::{Action, Condition, State, Symbol, Variables};
use crate::runtime::{Machine, MachineConfig, Transition};
use parser::Line;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// A declared state.
#[derive(Clone, Debug, PartialEq)]
pub struct StateDef {
    pub id: String,
    pub name: String,
    pub condition: Option<Condition>,
    /// Source line, 1-based.
    pub line: usize,
}

impl StateDef {
    pub fn to_state(&self) -> State {
        State::named_with_condition(self.id.clone(), self.name.clone(), self.condition.clone())
    }
}

/// A transition line, before expansion into one transition per symbol.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionDef {
    pub origin: String,
    pub destination: String,
    pub symbols: Vec<Symbol>,
    pub guard: Option<Condition>,
    /// Timers reset when the transition fires, in order.
    pub resets: Vec<String>,
    pub line: usize,
}

impl TransitionDef {
    pub fn action(&self) -> Action {
        self.resets
            .iter()
            .fold(Action::noop(), |action, timer| {
                action.then(Action::reset_timer(timer.clone()))
            })
    }
}

/// A parsed, reference-checked TGF document.
#[derive(Clone, Debug, PartialEq)]
pub struct Graph {
    states: Vec<StateDef>,
    transitions: Vec<TransitionDef>,
}

impl Graph {
    /// Parse a document, accumulating all errors.
    pub fn parse(text: &str) -> Validation<Graph, NonEmptyVec<TgfError>> {
        let mut in_transitions = false;
        let mut lines = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            if raw == parser::SEPARATOR {
                in_transitions = true;
                continue;
            }
            let parsed = if in_transitions {
                parser::transition_line(line, raw).map(Line::Transition)
            } else {
                parser::state_line(line, raw).map(Line::State)
            };
            lines.push(validate(parsed));
        }

        match Validation::all_vec(lines) {
            Validation::Success(lines) => Self::assemble(lines),
            Validation::Failure(errors) => Validation::Failure(errors),
        }
    }

    /// Check ids once every line parsed: no duplicates, no dangling
    /// references.
    fn assemble(lines: Vec<Line>) -> Validation<Graph, NonEmptyVec<TgfError>> {
        let mut states = Vec::new();
        let mut transitions = Vec::new();
        for line in lines {
            match line {
                Line::State(state) => states.push(state),
                Line::Transition(transition) => transitions.push(transition),
            }
        }
        if states.is_empty() {
            return Validation::fail(TgfError::NoStates);
        }

        let mut checks: Vec<Validation<(), NonEmptyVec<TgfError>>> = Vec::new();
        let mut declared = HashSet::new();
        for state in &states {
            checks.push(if declared.insert(state.id.as_str()) {
                Validation::success(())
            } else {
                Validation::fail(TgfError::DuplicateState {
                    line: state.line,
                    id: state.id.clone(),
                })
            });
        }
        for transition in &transitions {
            for id in [&transition.origin, &transition.destination] {
                checks.push(if declared.contains(id.as_str()) {
                    Validation::success(())
                } else {
                    Validation::fail(TgfError::UnknownState {
                        line: transition.line,
                        id: id.clone(),
                    })
                });
            }
        }

        match Validation::all_vec(checks) {
            Validation::Success(_) => Validation::success(Graph {
                states,
                transitions,
            }),
            Validation::Failure(errors) => Validation::Failure(errors),
        }
    }

    pub fn states(&self) -> &[StateDef] {
        &self.states
    }

    pub fn transitions(&self) -> &[TransitionDef] {
        &self.transitions
    }

    /// The runtime state for a declared id.
    pub fn state(&self, id: &str) -> Option<State> {
        self.states
            .iter()
            .find(|state| state.id == id)
            .map(StateDef::to_state)
    }

    /// All transitions, one per (line, symbol), in document order.
    pub fn expand(&self) -> Vec<Transition> {
        let states: HashMap<&str, State> = self
            .states
            .iter()
            .map(|state| (state.id.as_str(), state.to_state()))
            .collect();

        let mut expanded = Vec::new();
        for def in &self.transitions {
            let (Some(origin), Some(destination)) = (
                states.get(def.origin.as_str()),
                states.get(def.destination.as_str()),
            ) else {
                continue;
            };
            let guard = def.guard.clone().unwrap_or_default();
            let action = def.action();
            for symbol in &def.symbols {
                expanded.push(
                    Transition::new(origin.clone(), symbol.clone(), destination.clone())
                        .when(guard.clone())
                        .then(action.clone()),
                );
            }
        }
        expanded
    }

    /// Split into weakly connected components.
    ///
    /// Components are ordered by their first declared state; each keeps its
    /// states and transitions in document order.
    pub fn components(&self) -> Vec<Graph> {
        let index: HashMap<&str, usize> = self
            .states
            .iter()
            .enumerate()
            .map(|(i, state)| (state.id.as_str(), i))
            .collect();

        let mut parent: Vec<usize> = (0..self.states.len()).collect();
        for transition in &self.transitions {
            if let (Some(&a), Some(&b)) = (
                index.get(transition.origin.as_str()),
                index.get(transition.destination.as_str()),
            ) {
                let (a, b) = (find(&mut parent, a), find(&mut parent, b));
                // The smaller index becomes the root so roots stay in
                // declaration order.
                parent[a.max(b)] = a.min(b);
            }
        }

        let mut roots = Vec::new();
        let mut members: HashMap<usize, Graph> = HashMap::new();
        for (i, state) in self.states.iter().enumerate() {
            let root = find(&mut parent, i);
            let component = members.entry(root).or_insert_with(|| {
                roots.push(root);
                Graph {
                    states: Vec::new(),
                    transitions: Vec::new(),
                }
            });
            component.states.push(state.clone());
        }
        for transition in &self.transitions {
            if let Some(&i) = index.get(transition.origin.as_str()) {
                let root = find(&mut parent, i);
                if let Some(component) = members.get_mut(&root) {
                    component.transitions.push(transition.clone());
                }
            }
        }

        roots
            .into_iter()
            .filter_map(|root| members.remove(&root))
            .collect()
    }

    /// Build one machine over the whole graph, starting in `initial`.
    pub fn machine(&self, initial: &str) -> Result<Machine, TgfError> {
        self.machine_with_config(initial, MachineConfig::default())
    }

    pub fn machine_with_config(
        &self,
        initial: &str,
        config: MachineConfig,
    ) -> Result<Machine, TgfError> {
        let initial = self
            .state(initial)
            .ok_or_else(|| TgfError::UnknownInitialState(initial.to_string()))?;
        Ok(Machine::with_config(
            initial,
            self.expand(),
            Variables::new(),
            config,
        ))
    }

    /// One machine per connected component, each starting in the
    /// component's first declared state.
    pub fn machines(&self) -> Vec<Machine> {
        self.components()
            .iter()
            .filter_map(|component| {
                let first = component.states.first()?;
                Some(Machine::new(first.to_state(), component.expand()))
            })
            .collect()
    }

    /// The parallel composition of every component machine, left to right.
    pub fn compose(&self) -> Result<Machine, TgfError> {
        let mut machines = self.machines().into_iter();
        let first = machines.next().ok_or(TgfError::NoStates)?;
        Ok(machines.fold(first, |composed, machine| {
            composed.compose_in_parallel(&machine)
        }))
    }
}

impl FromStr for Graph {
    type Err = TgfErrors;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match Graph::parse(text) {
            Validation::Success(graph) => Ok(graph),
            Validation::Failure(errors) => Err(TgfErrors(errors.iter().cloned().collect())),
        }
    }
}

fn validate<T>(result: Result<T, TgfError>) -> Validation<T, NonEmptyVec<TgfError>> {
    match result {
        Ok(value) => Validation::success(value),
        Err(error) => Validation::fail(error),
    }
}

fn find(parent: &mut [usize], mut node: usize) -> usize {
    while parent[node] != node {
        parent[node] = parent[parent[node]];
        node = parent[node];
    }
    node
}
