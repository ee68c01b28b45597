//! The machine: symbol consumption, autonomous resolution, timers.

use super::clock::Clock;
use super::compose;
use super::config::MachineConfig;
use super::transition::Transition;
use crate::core::{
    MachineError, State, StateHistory, StateTransition, Symbol, Trigger, Value, Variables,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::watch;

/// Outcome of a single `receive`, `set` or `tick`, including any autonomous
/// resolution it triggered.
#[derive(Clone, Debug, PartialEq)]
pub enum StepResult {
    /// Nothing fired. For `receive`, no transition matched the symbol.
    Unchanged,

    /// At least one transition fired and the machine settled in `to`.
    Transitioned { from: State, to: State },

    /// The current state's condition is violated and no transition leaves it.
    Deadlocked { state: State },

    /// Resolution stopped after the configured number of steps.
    Unsettled { state: State, steps: usize },
}

/// Health of the machine after its last re-check.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineStatus {
    Running,
    Deadlocked { state: String },
    Unsettled { state: String, steps: usize },
}

/// Read-only view of a machine for observers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub initial_state: String,
    pub current_state: String,
    pub variables: BTreeMap<String, Value>,
    pub timers: BTreeMap<String, i64>,
    pub status: MachineStatus,
}

enum Settled {
    Stable { steps: usize },
    Deadlocked,
    Unsettled { steps: usize },
}

/// Everything guarded by the machine's mutex.
pub(crate) struct Core {
    initial: State,
    current: State,
    transitions: Vec<Transition>,
    states: Vec<State>,
    alphabet: Vec<Symbol>,
    variables: Variables,
    history: StateHistory,
    status: MachineStatus,
    max_resolution_steps: usize,
    clock: Option<Clock>,
    missing_runtime_logged: bool,
    state_tx: watch::Sender<String>,
}

/// Machine definition detached from any running machine.
pub(crate) struct Definition {
    pub(crate) initial: State,
    pub(crate) transitions: Vec<Transition>,
    pub(crate) states: Vec<State>,
    pub(crate) alphabet: Vec<Symbol>,
    pub(crate) variables: Variables,
}

/// A finite state machine with guarded transitions, per-state validity
/// conditions, and timers.
///
/// All methods take `&self`; calls and clock ticks are serialized by an
/// internal mutex. The clock, once started, stops when the machine is dropped.
///
/// # Example
///
/// ```rust
/// use tandem::{Action, Comparator, Condition, Machine, Transition, Variables};
///
/// let machine = Machine::with_variables(
///     "empty",
///     vec![
///         Transition::new("empty", "enter person", "full").then(Action::add("counter", 1)),
///         Transition::new("full", "enter person", "full").then(Action::add("counter", 1)),
///         Transition::new("full", "exit person", "full")
///             .when(Condition::variable("counter", Comparator::Gt, 1))
///             .then(Action::add("counter", -1)),
///         Transition::new("full", "exit person", "empty")
///             .when(Condition::variable("counter", Comparator::Eq, 1))
///             .then(Action::add("counter", -1)),
///     ],
///     Variables::new().with("counter", 0),
/// );
///
/// machine.receive("enter person").unwrap();
/// assert_eq!(machine.current_state().id(), "full");
/// machine.receive("exit person").unwrap();
/// assert_eq!(machine.current_state().id(), "empty");
/// assert_eq!(machine.int_value_for("counter").unwrap(), 0);
/// ```
pub struct Machine {
    core: Arc<Mutex<Core>>,
    config: MachineConfig,
}

impl Machine {
    pub fn new(initial: impl Into<State>, transitions: Vec<Transition>) -> Self {
        Self::with_variables(initial, transitions, Variables::new())
    }

    pub fn with_variables(
        initial: impl Into<State>,
        transitions: Vec<Transition>,
        variables: Variables,
    ) -> Self {
        Self::with_config(initial, transitions, variables, MachineConfig::default())
    }

    /// Build a machine. The state set and alphabet are derived here, once,
    /// from the initial state and the transition list.
    ///
    /// Timer values in `variables` are kept, but the clock stays stopped until
    /// the machine's own first timer reset or [`start_clock`](Self::start_clock).
    pub fn with_config(
        initial: impl Into<State>,
        transitions: Vec<Transition>,
        mut variables: Variables,
        config: MachineConfig,
    ) -> Self {
        let initial = initial.into();
        variables.clear_clock_request();
        let mut states = vec![initial.clone()];
        let mut seen_states: HashSet<State> = states.iter().cloned().collect();
        let mut alphabet = Vec::new();
        let mut seen_symbols = HashSet::new();
        for transition in &transitions {
            for state in [&transition.origin, &transition.destination] {
                if seen_states.insert(state.clone()) {
                    states.push(state.clone());
                }
            }
            if seen_symbols.insert(transition.symbol.clone()) {
                alphabet.push(transition.symbol.clone());
            }
        }

        let (state_tx, _) = watch::channel(initial.id().to_string());
        let core = Core {
            current: initial.clone(),
            initial,
            transitions,
            states,
            alphabet,
            variables,
            history: StateHistory::with_limit(config.history_limit),
            status: MachineStatus::Running,
            max_resolution_steps: config.resolution_limit(),
            clock: None,
            missing_runtime_logged: false,
            state_tx,
        };

        Self {
            core: Arc::new(Mutex::new(core)),
            config,
        }
    }

    /// Consume one input symbol.
    ///
    /// The first transition (in definition order) leaving the current state
    /// on `symbol` whose guard holds fires; the new state's condition is then
    /// re-checked. Symbols with no applicable transition are ignored.
    pub fn receive(&self, symbol: impl Into<Symbol>) -> Result<StepResult, MachineError> {
        let symbol = symbol.into();
        let mut core = self.lock();
        let result = core.receive(&symbol);
        self.ensure_clock(&mut core);
        result
    }

    /// Write a variable, then re-check the current state's condition.
    pub fn set(
        &self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<StepResult, MachineError> {
        let mut core = self.lock();
        let result = core.set(name.into(), value.into());
        self.ensure_clock(&mut core);
        result
    }

    /// Set a timer to zero, starting the clock if it is not running yet.
    ///
    /// Resetting a timer does not re-check the current state; the next tick
    /// does.
    pub fn reset_timer(&self, name: impl Into<String>) {
        let mut core = self.lock();
        core.variables.reset_timer(name);
        self.ensure_clock(&mut core);
    }

    /// Advance every timer by one and re-check the current state.
    ///
    /// The clock calls this once per tick interval. Calling it directly drives
    /// timers without a tokio runtime.
    pub fn tick(&self) -> Result<StepResult, MachineError> {
        self.lock().tick()
    }

    /// Start the periodic clock regardless of whether a timer was reset.
    pub fn start_clock(&self) {
        let mut core = self.lock();
        core.variables.request_clock();
        self.ensure_clock(&mut core);
    }

    /// Stop the periodic clock. A later timer reset starts it again.
    pub fn stop_clock(&self) {
        let mut core = self.lock();
        core.variables.clear_clock_request();
        if core.clock.take().is_some() {
            tracing::info!(state = %core.current.id(), "Stopped machine clock");
        }
    }

    pub fn is_clock_running(&self) -> bool {
        self.lock().clock.is_some()
    }

    /// Synchronous product of `self` and `other`.
    ///
    /// Shared symbols move both components together; symbols private to one
    /// operand move only that operand's component. The variable stores are
    /// merged with `self` taking precedence. Neither operand is modified and
    /// the result shares no state with them.
    pub fn compose_in_parallel(&self, other: &Machine) -> Machine {
        let left = self.definition();
        let right = other.definition();
        let product = compose::product(&left, &right);
        tracing::debug!(
            left = %left.initial.id(),
            right = %right.initial.id(),
            transitions = product.transitions.len(),
            "Composed machines in parallel"
        );
        Machine::with_config(
            product.initial,
            product.transitions,
            product.variables,
            self.config.clone(),
        )
    }

    pub fn current_state(&self) -> State {
        self.lock().current.clone()
    }

    pub fn initial_state(&self) -> State {
        self.lock().initial.clone()
    }

    /// Every state of the machine, initial state first.
    pub fn states(&self) -> Vec<State> {
        self.lock().states.clone()
    }

    /// Every symbol of the machine, in order of first appearance.
    pub fn alphabet(&self) -> Vec<Symbol> {
        self.lock().alphabet.clone()
    }

    pub fn transitions(&self) -> Vec<Transition> {
        self.lock().transitions.clone()
    }

    pub fn status(&self) -> MachineStatus {
        self.lock().status.clone()
    }

    pub fn history(&self) -> StateHistory {
        self.lock().history.clone()
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Copy of the current store.
    pub fn variables(&self) -> Variables {
        self.lock().variables.clone()
    }

    pub fn value_for(&self, name: &str) -> Result<Value, MachineError> {
        self.lock().variables.value_for(name).cloned()
    }

    pub fn int_value_for(&self, name: &str) -> Result<i64, MachineError> {
        self.lock().variables.int_value_for(name)
    }

    pub fn string_value_for(&self, name: &str) -> Result<String, MachineError> {
        self.lock()
            .variables
            .string_value_for(name)
            .map(str::to_string)
    }

    pub fn bool_value_for(&self, name: &str) -> Result<bool, MachineError> {
        self.lock().variables.bool_value_for(name)
    }

    pub fn timer_value_for(&self, name: &str) -> Result<i64, MachineError> {
        self.lock().variables.timer_value_for(name)
    }

    /// Receiver that observes the current state id after every change,
    /// including changes made by the clock.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.lock().state_tx.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        let core = self.lock();
        Snapshot {
            initial_state: core.initial.id().to_string(),
            current_state: core.current.id().to_string(),
            variables: core
                .variables
                .variables()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            timers: core
                .variables
                .timers()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            status: core.status.clone(),
        }
    }

    pub(crate) fn definition(&self) -> Definition {
        let core = self.lock();
        Definition {
            initial: core.initial.clone(),
            transitions: core.transitions.clone(),
            states: core.states.clone(),
            alphabet: core.alphabet.clone(),
            variables: core.variables.clone(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Core> {
        lock(&self.core)
    }

    fn ensure_clock(&self, core: &mut Core) {
        if core.clock.is_some() || !core.variables.clock_requested() {
            return;
        }
        match Handle::try_current() {
            Ok(handle) => {
                let period = self.config.tick_interval();
                core.clock = Some(Clock::start(&handle, Arc::downgrade(&self.core), period));
                tracing::info!(
                    state = %core.current.id(),
                    period_ms = period.as_millis() as u64,
                    "Started machine clock"
                );
            }
            Err(_) if !core.missing_runtime_logged => {
                core.missing_runtime_logged = true;
                tracing::warn!(
                    state = %core.current.id(),
                    "No tokio runtime available; timers advance only through Machine::tick"
                );
            }
            Err(_) => {}
        }
    }
}

impl Drop for Machine {
    fn drop(&mut self) {
        self.lock().clock.take();
    }
}

impl std::fmt::Debug for Machine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let core = self.lock();
        f.debug_struct("Machine")
            .field("current", &core.current)
            .field("transitions", &core.transitions.len())
            .field("status", &core.status)
            .finish()
    }
}

pub(crate) fn lock(core: &Mutex<Core>) -> MutexGuard<'_, Core> {
    core.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Core {
    fn receive(&mut self, symbol: &Symbol) -> Result<StepResult, MachineError> {
        let from = self.current.clone();
        let Some(index) = self.find_transition(|t| t.symbol == *symbol)? else {
            tracing::debug!(state = %from.id(), %symbol, "No transition for symbol");
            return Ok(StepResult::Unchanged);
        };
        self.fire(index, Trigger::Input)?;
        let settled = self.settle()?;
        Ok(self.step_result(from, true, settled))
    }

    fn set(&mut self, name: String, value: Value) -> Result<StepResult, MachineError> {
        let from = self.current.clone();
        self.variables.set(name, value);
        let settled = self.settle()?;
        Ok(self.step_result(from, false, settled))
    }

    pub(crate) fn tick(&mut self) -> Result<StepResult, MachineError> {
        let from = self.current.clone();
        self.variables.tick();
        tracing::debug!(state = %from.id(), "Timers ticked");
        let settled = self.settle()?;
        Ok(self.step_result(from, false, settled))
    }

    /// Index of the first transition leaving the current state that satisfies
    /// `matches` and whose guard holds.
    fn find_transition(
        &self,
        mut matches: impl FnMut(&Transition) -> bool,
    ) -> Result<Option<usize>, MachineError> {
        for (index, transition) in self.transitions.iter().enumerate() {
            if transition.origin == self.current
                && matches(transition)
                && transition.guard.evaluate(&self.variables)?
            {
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    /// Run the action against a working copy of the store and commit the
    /// move only if it succeeds.
    fn fire(&mut self, index: usize, trigger: Trigger) -> Result<(), MachineError> {
        let transition = &self.transitions[index];
        let mut staged = self.variables.clone();
        transition.action.apply(&mut staged)?;

        let from = std::mem::replace(&mut self.current, transition.destination.clone());
        self.variables = staged;
        tracing::debug!(
            from = %from.id(),
            to = %self.current.id(),
            symbol = %transition.symbol,
            ?trigger,
            "Transition fired"
        );
        self.history.push(StateTransition {
            from: from.id().to_string(),
            to: self.current.id().to_string(),
            symbol: transition.symbol.clone(),
            trigger,
            timestamp: Utc::now(),
        });
        self.state_tx.send_replace(self.current.id().to_string());
        Ok(())
    }

    /// Leave the current state for as long as its condition is violated.
    fn settle(&mut self) -> Result<Settled, MachineError> {
        let mut steps = 0;
        loop {
            let satisfied = match self.current.condition() {
                Some(condition) => condition.evaluate(&self.variables)?,
                None => true,
            };
            if satisfied {
                self.status = MachineStatus::Running;
                return Ok(Settled::Stable { steps });
            }

            if steps >= self.max_resolution_steps {
                tracing::warn!(
                    state = %self.current.id(),
                    steps,
                    "Autonomous resolution did not settle"
                );
                self.status = MachineStatus::Unsettled {
                    state: self.current.id().to_string(),
                    steps,
                };
                return Ok(Settled::Unsettled { steps });
            }

            let current = self.current.clone();
            match self.find_transition(|t| !t.is_self_loop())? {
                Some(index) => {
                    self.fire(index, Trigger::Autonomous)?;
                    steps += 1;
                }
                None => {
                    let already = matches!(
                        &self.status,
                        MachineStatus::Deadlocked { state } if state == current.id()
                    );
                    if !already {
                        tracing::warn!(
                            state = %current.id(),
                            condition = ?current.condition(),
                            "Deadlock: state condition violated with no enabled exit"
                        );
                    }
                    self.status = MachineStatus::Deadlocked {
                        state: current.id().to_string(),
                    };
                    return Ok(Settled::Deadlocked);
                }
            }
        }
    }

    fn step_result(&self, from: State, fired: bool, settled: Settled) -> StepResult {
        let state = self.current.clone();
        match settled {
            Settled::Deadlocked => StepResult::Deadlocked { state },
            Settled::Unsettled { steps } => StepResult::Unsettled { state, steps },
            Settled::Stable { steps } if fired || steps > 0 => {
                StepResult::Transitioned { from, to: state }
            }
            Settled::Stable { .. } => StepResult::Unchanged,
        }
    }
}
