//! Variable and timer store owned by a machine.

use super::error::MachineError;
use super::value::{Value, ValueKind};
use std::collections::BTreeMap;

/// Named variables plus named integer timers.
///
/// A store is owned by exactly one [`Machine`](crate::Machine). Reads of a
/// name that was never written are errors, not defaults. Timers advance by
/// one on every clock tick once they have been reset at least once.
///
/// # Example
///
/// ```rust
/// use tandem::core::{Value, Variables};
///
/// let vars = Variables::new()
///     .with("counter", 3)
///     .with("greetings", "hello");
///
/// assert_eq!(vars.int_value_for("counter").unwrap(), 3);
/// assert_eq!(vars.string_value_for("greetings").unwrap(), "hello");
/// assert!(vars.value_for("missing").is_err());
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Variables {
    values: BTreeMap<String, Value>,
    timers: BTreeMap<String, i64>,
    clock_requested: bool,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an initial value, consuming and returning the store.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn value_for(&self, name: &str) -> Result<&Value, MachineError> {
        self.values
            .get(name)
            .ok_or_else(|| MachineError::UndefinedVariable {
                name: name.to_string(),
            })
    }

    pub fn int_value_for(&self, name: &str) -> Result<i64, MachineError> {
        match self.value_for(name)? {
            Value::Int(v) => Ok(*v),
            other => Err(mismatch(name, ValueKind::Int, other)),
        }
    }

    pub fn string_value_for(&self, name: &str) -> Result<&str, MachineError> {
        match self.value_for(name)? {
            Value::Str(v) => Ok(v),
            other => Err(mismatch(name, ValueKind::Str, other)),
        }
    }

    pub fn bool_value_for(&self, name: &str) -> Result<bool, MachineError> {
        match self.value_for(name)? {
            Value::Bool(v) => Ok(*v),
            other => Err(mismatch(name, ValueKind::Bool, other)),
        }
    }

    pub fn timer_value_for(&self, name: &str) -> Result<i64, MachineError> {
        self.timers
            .get(name)
            .copied()
            .ok_or_else(|| MachineError::UndefinedTimer {
                name: name.to_string(),
            })
    }

    /// Insert or overwrite a variable.
    ///
    /// When the store belongs to a machine, the machine re-checks its current
    /// state condition once the surrounding call (or action) completes.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Set a timer to zero and ask the owning machine for a running clock.
    pub fn reset_timer(&mut self, name: impl Into<String>) {
        self.timers.insert(name.into(), 0);
        self.clock_requested = true;
    }

    /// Advance every timer by one tick.
    pub fn tick(&mut self) {
        for elapsed in self.timers.values_mut() {
            *elapsed = elapsed.saturating_add(1);
        }
    }

    /// Union of both stores. On a name collision `self` wins.
    ///
    /// Timers are carried over with the same precedence, but the merged store
    /// does not share a clock with either source and requests none.
    pub fn merge(&self, other: &Variables) -> Variables {
        let mut values = other.values.clone();
        values.extend(self.values.clone());
        let mut timers = other.timers.clone();
        timers.extend(self.timers.clone());
        Variables {
            values,
            timers,
            clock_requested: false,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn timers(&self) -> impl Iterator<Item = (&str, i64)> {
        self.timers.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Whether any timer has been reset, meaning a clock should be running.
    pub fn clock_requested(&self) -> bool {
        self.clock_requested
    }

    pub(crate) fn request_clock(&mut self) {
        self.clock_requested = true;
    }

    pub(crate) fn clear_clock_request(&mut self) {
        self.clock_requested = false;
    }
}

fn mismatch(name: &str, expected: ValueKind, found: &Value) -> MachineError {
    MachineError::TypeMismatch {
        name: name.to_string(),
        expected,
        found: found.kind(),
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Variables {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Variables::new(), |vars, (name, value)| vars.with(name, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reading_unset_variable_is_an_error() {
        let vars = Variables::new();
        assert_eq!(
            vars.value_for("counter"),
            Err(MachineError::UndefinedVariable {
                name: "counter".to_string()
            })
        );
    }

    #[test]
    fn typed_accessor_rejects_other_kinds() {
        let vars = Variables::new().with("greetings", "hello");
        let err = vars.int_value_for("greetings").unwrap_err();
        assert_eq!(
            err,
            MachineError::TypeMismatch {
                name: "greetings".to_string(),
                expected: ValueKind::Int,
                found: ValueKind::Str,
            }
        );
    }

    #[test]
    fn set_overwrites_previous_value() {
        let mut vars = Variables::new().with("counter", 1);
        vars.set("counter", 7);
        assert_eq!(vars.int_value_for("counter").unwrap(), 7);
        vars.set("counter", "seven");
        assert_eq!(vars.string_value_for("counter").unwrap(), "seven");
    }

    #[test]
    fn unset_timer_is_an_error() {
        let vars = Variables::new();
        assert!(matches!(
            vars.timer_value_for("t"),
            Err(MachineError::UndefinedTimer { .. })
        ));
    }

    #[test]
    fn tick_advances_every_timer_by_one() {
        let mut vars = Variables::new();
        vars.reset_timer("t");
        vars.tick();
        vars.reset_timer("u");
        vars.tick();
        vars.tick();

        assert_eq!(vars.timer_value_for("t").unwrap(), 3);
        assert_eq!(vars.timer_value_for("u").unwrap(), 2);
        assert!(vars.clock_requested());
    }

    #[test]
    fn merge_prefers_calling_store() {
        let a = Variables::new().with("counter", 3);
        let b = Variables::new().with("counter", 0).with("greetings", "hello");

        let merged = a.merge(&b);
        assert_eq!(merged.int_value_for("counter").unwrap(), 3);
        assert_eq!(merged.string_value_for("greetings").unwrap(), "hello");

        let reversed = b.merge(&a);
        assert_eq!(reversed.int_value_for("counter").unwrap(), 0);
    }

    #[test]
    fn merge_leaves_sources_untouched() {
        let a = Variables::new().with("x", 1);
        let b = Variables::new().with("y", 2);
        let mut merged = a.merge(&b);
        merged.set("x", 10);

        assert_eq!(a.int_value_for("x").unwrap(), 1);
        assert!(!b.contains("x"));
    }

    #[test]
    fn merge_carries_timers() {
        let mut a = Variables::new();
        a.reset_timer("t");
        a.tick();
        let mut b = Variables::new();
        b.reset_timer("t");
        b.reset_timer("u");

        let merged = a.merge(&b);
        assert_eq!(merged.timer_value_for("t").unwrap(), 1);
        assert_eq!(merged.timer_value_for("u").unwrap(), 0);
        assert!(!merged.clock_requested());
    }

    #[test]
    fn collects_from_pairs() {
        let vars: Variables = vec![("a", 1), ("b", 2)].into_iter().collect();
        assert_eq!(vars.int_value_for("b").unwrap(), 2);
    }
}
