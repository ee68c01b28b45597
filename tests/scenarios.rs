//! End-to-end scenarios: composed machines, timed machines on the tokio
//! clock, and machines loaded from TGF.

use std::time::Duration;
use tandem::tgf::Graph;
use tandem::{
    variables, Action, Comparator, Condition, Machine, MachineBuilder, MachineConfig,
    MachineStatus, State, StepResult, Transition,
};
use tokio::time::{sleep, Instant};

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
    Machine::with_variables(
        off.clone(),
        vec![
            Transition::new(off.clone(), "turn on alarm", on.clone())
                .when(Condition::variable("counter", Comparator::Gt, STORE_LIMIT)),
            Transition::new(on, "turn off alarm", off)
                .when(Condition::variable("counter", Comparator::Eq, STORE_LIMIT)),
        ],
        variables! { "counter" => 0 },
    )
}

fn traffic_light(config: MachineConfig) -> Machine {
    let red = State::with_condition("red", Condition::timer("t", Comparator::Lt, 3));
    let green = State::with_condition("green", Condition::timer("t", Comparator::Lt, 2));
    let yellow = State::with_condition("yellow", Condition::timer("t", Comparator::Lt, 1));

    MachineBuilder::new()
        .initial(red.clone())
        .config(config)
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
        .build()
        .unwrap()
}

fn sprinkler() -> Machine {
    let off = State::with_condition("sprinkler off", Condition::timer("t", Comparator::Lt, 5));
    let on = State::with_condition("sprinkler on", Condition::timer("u", Comparator::Lt, 2));
    Machine::new(
        off.clone(),
        vec![
            Transition::new(off.clone(), "open tap", on.clone())
                .when(Condition::timer("t", Comparator::Eq, 5))
                .then(Action::reset_timer("u")),
            Transition::new(on, "close tap", off)
                .when(Condition::timer("u", Comparator::Eq, 2))
                .then(Action::reset_timer("t")),
        ],
    )
}

#[test]
fn store_alarm_turns_on_past_the_limit() {
    let composed = store().compose_in_parallel(&alarm());

    for _ in 0..5 {
        composed.receive("enter person").unwrap();
    }
    assert_eq!(composed.int_value_for("counter").unwrap(), 5);
    assert_eq!(composed.current_state().name(), "full, alarm off");

    let result = composed.receive("enter person").unwrap();
    assert_eq!(composed.int_value_for("counter").unwrap(), 6);
    assert_eq!(composed.current_state().name(), "full, alarm on");
    assert!(matches!(result, StepResult::Transitioned { .. }));

    composed.receive("exit person").unwrap();
    composed.receive("exit person").unwrap();
    assert_eq!(composed.int_value_for("counter").unwrap(), 4);
    assert_eq!(composed.current_state().name(), "full, alarm off");
    assert_eq!(composed.status(), MachineStatus::Running);

    let path = composed.history();
    assert_eq!(
        path.get_path(),
        vec![
            "empty, alarm off",
            "full, alarm off",
            "full, alarm off",
            "full, alarm off",
            "full, alarm off",
            "full, alarm off",
            "full, alarm off",
            "full, alarm on",
            "full, alarm on",
            "full, alarm off",
            "full, alarm off",
        ]
    );
}

#[test]
fn deadlock_is_reported_and_recovers() {
    let hot = State::with_condition("hot", Condition::variable("temp", Comparator::Lt, 100));
    let machine = Machine::with_variables(
        hot.clone(),
        vec![Transition::new(hot.clone(), "cool", hot.clone())],
        variables! { "temp" => 20 },
    );

    let result = machine.set("temp", 120).unwrap();
    assert_eq!(result, StepResult::Deadlocked { state: hot.clone() });
    assert_eq!(
        machine.status(),
        MachineStatus::Deadlocked {
            state: "hot".to_string()
        }
    );

    // A self-loop is not an exit, so the machine stays deadlocked.
    let result = machine.receive("cool").unwrap();
    assert_eq!(result, StepResult::Deadlocked { state: hot.clone() });

    assert_eq!(machine.set("temp", 50).unwrap(), StepResult::Unchanged);
    assert_eq!(machine.status(), MachineStatus::Running);
    assert_eq!(machine.current_state(), hot);
}

/// Two-state machine flipping between `{prefix}0` and `{prefix}1` on each of
/// `symbols`.
fn toggle(prefix: &str, symbols: &[&str]) -> Machine {
    let (zero, one) = (format!("{prefix}0"), format!("{prefix}1"));
    let transitions = symbols
        .iter()
        .flat_map(|symbol| {
            [
                Transition::new(zero.as_str(), *symbol, one.as_str()),
                Transition::new(one.as_str(), *symbol, zero.as_str()),
            ]
        })
        .collect();
    Machine::new(zero.as_str(), transitions)
}

#[test]
fn composition_is_associative_on_traces() {
    let a = toggle("a", &["x", "y"]);
    let b = toggle("b", &["y", "z"]);
    let c = toggle("c", &["z", "x"]);

    let left = a.compose_in_parallel(&b).compose_in_parallel(&c);
    let right = a.compose_in_parallel(&b.compose_in_parallel(&c));

    for input in ["x", "y", "z", "z", "x", "y", "y", "x"] {
        left.receive(input).unwrap();
        right.receive(input).unwrap();
        assert_eq!(left.current_state().id(), right.current_state().id());
    }
    assert_eq!(left.current_state().id(), "a0, b1, c1");
}

#[test]
fn snapshot_serializes_for_observers() {
    let machine = store();
    machine.receive("enter person").unwrap();

    let json = serde_json::to_value(machine.snapshot()).unwrap();
    assert_eq!(json["current_state"], "full");
    assert_eq!(json["initial_state"], "empty");
    assert_eq!(json["variables"]["counter"], 1);
    assert_eq!(json["status"], "Running");
}

#[tokio::test(start_paused = true)]
async fn sprinkler_cycles_on_the_clock() {
    let machine = sprinkler();
    machine.reset_timer("t");
    machine.reset_timer("u");
    assert!(machine.is_clock_running());
    assert_eq!(machine.current_state().id(), "sprinkler off");

    sleep(Duration::from_millis(4_500)).await;
    assert_eq!(machine.current_state().id(), "sprinkler off");

    sleep(Duration::from_millis(1_000)).await;
    assert_eq!(machine.current_state().id(), "sprinkler on");

    sleep(Duration::from_millis(2_000)).await;
    assert_eq!(machine.current_state().id(), "sprinkler off");
    assert_eq!(machine.timer_value_for("t").unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn subscribers_are_woken_by_clock_transitions() {
    let machine = sprinkler();
    let mut states = machine.subscribe();
    let started = Instant::now();
    machine.reset_timer("t");
    machine.reset_timer("u");

    states.changed().await.unwrap();
    assert_eq!(*states.borrow_and_update(), "sprinkler on");
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(5) && elapsed < Duration::from_secs(6));
}

#[tokio::test(start_paused = true)]
async fn traffic_light_follows_its_timers() {
    let light = traffic_light(MachineConfig::default().with_tick_interval(Duration::from_millis(100)));
    light.start_clock();
    light.reset_timer("t");

    sleep(Duration::from_millis(350)).await;
    assert_eq!(light.current_state().id(), "green");
    sleep(Duration::from_millis(200)).await;
    assert_eq!(light.current_state().id(), "yellow");
    sleep(Duration::from_millis(100)).await;
    assert_eq!(light.current_state().id(), "red");

    let path: Vec<String> = light
        .history()
        .transitions()
        .map(|t| t.symbol.to_string())
        .collect();
    assert_eq!(path, vec!["go", "slow", "stop"]);
}

#[tokio::test(start_paused = true)]
async fn stopped_clock_freezes_timers() {
    let machine = Machine::new("idle", vec![]);
    machine.reset_timer("t");

    sleep(Duration::from_millis(2_500)).await;
    assert_eq!(machine.timer_value_for("t").unwrap(), 2);

    machine.stop_clock();
    assert!(!machine.is_clock_running());
    sleep(Duration::from_secs(5)).await;
    assert_eq!(machine.timer_value_for("t").unwrap(), 2);

    machine.reset_timer("t");
    assert!(machine.is_clock_running());
    sleep(Duration::from_millis(1_500)).await;
    assert_eq!(machine.timer_value_for("t").unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn composed_clock_waits_for_its_own_reset() {
    let source = Machine::new("off", vec![Transition::new("off", "switch", "on")]);
    source.reset_timer("t");
    assert!(source.is_clock_running());
    let other = Machine::new("x", vec![]);

    let composed = source.compose_in_parallel(&other);
    assert!(!composed.is_clock_running());
    sleep(Duration::from_secs(3)).await;
    assert_eq!(composed.timer_value_for("t").unwrap(), 0);

    // An ignored symbol leaves the clock alone.
    assert_eq!(composed.receive("no such symbol").unwrap(), StepResult::Unchanged);
    assert!(!composed.is_clock_running());

    composed.reset_timer("t");
    assert!(composed.is_clock_running());
    sleep(Duration::from_millis(2_500)).await;
    assert_eq!(composed.timer_value_for("t").unwrap(), 2);
    assert!(source.timer_value_for("t").unwrap() >= 5);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_machine_releases_it() {
    let machine = Machine::new("idle", vec![]);
    machine.reset_timer("t");
    let mut states = machine.subscribe();
    assert!(machine.is_clock_running());

    drop(machine);
    assert!(states.changed().await.is_err());
}

#[tokio::test(start_paused = true)]
async fn tgf_machine_times_out_on_the_clock() {
    let graph: Graph = "
        1 idle
        2 busy [ t < 3 ]
        #
        1 2 start { t = 0 }
        2 1 timeout [ t = 3 ]
    "
    .parse()
    .unwrap();
    let machine = graph.machine("1").unwrap();

    machine.receive("start").unwrap();
    assert_eq!(machine.current_state().name(), "busy");
    assert!(machine.is_clock_running());

    sleep(Duration::from_millis(2_500)).await;
    assert_eq!(machine.current_state().name(), "busy");
    sleep(Duration::from_millis(1_000)).await;
    assert_eq!(machine.current_state().name(), "idle");
    assert_eq!(machine.history().len(), 2);
}
