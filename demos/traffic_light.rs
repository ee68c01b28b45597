//! Timed Traffic Light
//!
//! This example runs a traffic light whose states carry timer conditions.
//! No input is ever sent: the clock advances the timer and every violated
//! state condition moves the light on by itself.
//!
//! Key concepts:
//! - Timer conditions on states (`t < 3`)
//! - Autonomous transitions driven by the tokio clock
//! - Watching state changes through `subscribe`
//!
//! Run with: cargo run --example traffic_light

use std::time::Duration;
use tandem::{Action, Comparator, Condition, MachineBuilder, MachineConfig, State, Transition};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tandem=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Timed Traffic Light ===\n");

    let red = State::with_condition("red", Condition::timer("t", Comparator::Lt, 3));
    let green = State::with_condition("green", Condition::timer("t", Comparator::Lt, 2));
    let yellow = State::with_condition("yellow", Condition::timer("t", Comparator::Lt, 1));

    let light = MachineBuilder::new()
        .initial(red.clone())
        .config(MachineConfig::default().with_tick_interval(Duration::from_millis(250)))
        .add_transition(
            Transition::new(red.clone(), "go", green.clone())
                .when(Condition::timer("t", Comparator::Ge, 3))
                .then(Action::reset_timer("t")),
        )
        .add_transition(
            Transition::new(green, "slow", yellow.clone())
                .when(Condition::timer("t", Comparator::Ge, 2))
                .then(Action::reset_timer("t")),
        )
        .add_transition(
            Transition::new(yellow, "stop", red)
                .when(Condition::timer("t", Comparator::Ge, 1))
                .then(Action::reset_timer("t")),
        )
        .build()?;

    println!("Initial state: {}", light.current_state());
    println!("Red lasts 3 ticks, green 2, yellow 1 (one tick = 250ms)\n");

    let mut states = light.subscribe();
    light.reset_timer("t");

    for _ in 0..6 {
        states.changed().await?;
        let state = states.borrow_and_update().clone();
        println!("  -> {state}");
    }

    light.stop_clock();

    println!("\nHistory:");
    for transition in light.history().transitions() {
        println!(
            "  {} --{}--> {} ({:?})",
            transition.from, transition.symbol, transition.to, transition.trigger
        );
    }

    Ok(())
}
