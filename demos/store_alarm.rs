//! Store With Alarm
//!
//! This example composes two machines in parallel: a store counting the
//! people inside and an alarm whose states depend on that count. The alarm
//! never receives an input of its own; its state conditions switch it when
//! the shared counter crosses the limit.
//!
//! Key concepts:
//! - Guards and actions over shared variables
//! - Parallel composition and variable merging
//! - Conditional states resolved autonomously
//!
//! Run with: cargo run --example store_alarm

use tandem::{variables, Action, Comparator, Condition, Machine, State, StepResult, Transition};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const STORE_LIMIT: i64 = 5;

fn store() -> Machine {
    Machine::with_variables(
        "empty",
        vec![
            Transition::new("empty", "enter person", "full").then(Action::add("counter", 1)),
            Transition::new("full", "enter person", "full").then(Action::add("counter", 1)),
            Transition::new("full", "exit person", "empty")
                .when(Condition::variable("counter", Comparator::Eq, 1))
                .then(Action::add("counter", -1)),
            Transition::new("full", "exit person", "full")
                .when(Condition::variable("counter", Comparator::Gt, 1))
                .then(Action::add("counter", -1)),
        ],
        variables! { "counter" => 0 },
    )
}

fn alarm() -> Machine {
    let off = State::with_condition(
        "alarm off",
        Condition::variable("counter", Comparator::Le, STORE_LIMIT),
    );
    let on = State::with_condition(
        "alarm on",
        Condition::variable("counter", Comparator::Gt, STORE_LIMIT),
    );
    Machine::new(
        off.clone(),
        vec![
            Transition::new(off.clone(), "turn on alarm", on.clone())
                .when(Condition::variable("counter", Comparator::Gt, STORE_LIMIT)),
            Transition::new(on, "turn off alarm", off)
                .when(Condition::variable("counter", Comparator::Eq, STORE_LIMIT)),
        ],
    )
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tandem=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Store With Alarm ===\n");

    let composed = store().compose_in_parallel(&alarm());
    println!("Composed states: {}", composed.states().len());
    println!("Composed alphabet: {:?}\n", composed.alphabet());

    let inputs = std::iter::repeat("enter person")
        .take(6)
        .chain(std::iter::repeat("exit person").take(3));

    for input in inputs {
        let result = composed.receive(input)?;
        let marker = match result {
            StepResult::Transitioned { .. } => "",
            StepResult::Unchanged => " (ignored)",
            StepResult::Deadlocked { .. } => " (deadlocked)",
            StepResult::Unsettled { .. } => " (unsettled)",
        };
        println!(
            "{input:>13}: {:<18} counter = {}{marker}",
            composed.current_state().name(),
            composed.int_value_for("counter")?
        );
    }

    println!("\nSnapshot: {:?}", composed.snapshot());
    Ok(())
}
