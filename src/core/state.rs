//! States of a machine, including composite states of product machines.

use super::condition::Condition;
use std::fmt::{self, Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A machine state: an id, a display name, and an optional validity
/// condition.
///
/// States are cheap to clone. Two states are equal when their ids, their
/// conditions and (for composites) their component states agree.
///
/// # Example
///
/// ```rust
/// use tandem::core::{Comparator, Condition, State};
///
/// let off = State::new("off");
/// let on = State::with_condition("on", Condition::timer("u", Comparator::Lt, 2));
/// let both = State::composite(&off, &on);
///
/// assert_eq!(both.id(), "off, on");
/// assert!(both.contains(&on));
/// assert!(both.condition().is_some());
/// ```
#[derive(Clone)]
pub struct State {
    inner: Arc<StateData>,
}

struct StateData {
    id: String,
    name: String,
    condition: Option<Condition>,
    parts: Option<(State, State)>,
}

impl State {
    /// State whose display name equals its id, with no condition.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self::build(id.clone(), id, None, None)
    }

    pub fn named(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::build(id.into(), name.into(), None, None)
    }

    pub fn with_condition(id: impl Into<String>, condition: Condition) -> Self {
        let id = id.into();
        Self::build(id.clone(), id, Some(condition), None)
    }

    pub fn named_with_condition(
        id: impl Into<String>,
        name: impl Into<String>,
        condition: Option<Condition>,
    ) -> Self {
        Self::build(id.into(), name.into(), condition, None)
    }

    /// Pair two states into a product-machine state.
    ///
    /// The condition is the conjunction of both component conditions, an
    /// absent one counting as always true; it is computed here once.
    pub fn composite(first: &State, second: &State) -> Self {
        let condition = Condition::conjoin(first.condition(), second.condition());
        Self::build(
            format!("{}, {}", first.id(), second.id()),
            format!("{}, {}", first.name(), second.name()),
            Some(condition),
            Some((first.clone(), second.clone())),
        )
    }

    fn build(
        id: String,
        name: String,
        condition: Option<Condition>,
        parts: Option<(State, State)>,
    ) -> Self {
        Self {
            inner: Arc::new(StateData {
                id,
                name,
                condition,
                parts,
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.inner.condition.as_ref()
    }

    /// The two component states, for composites.
    pub fn parts(&self) -> Option<(&State, &State)> {
        self.inner.parts.as_ref().map(|(a, b)| (a, b))
    }

    pub fn is_composite(&self) -> bool {
        self.inner.parts.is_some()
    }

    /// Whether `state` is a component of this composite, at any depth.
    ///
    /// A plain state contains nothing, not even itself.
    pub fn contains(&self, state: &State) -> bool {
        match self.parts() {
            None => false,
            Some((first, second)) => {
                first == state || second == state || first.contains(state) || second.contains(state)
            }
        }
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.inner, &other.inner) {
            return true;
        }
        let (a, b) = (&*self.inner, &*other.inner);
        a.id == b.id && a.condition == b.condition && a.parts == b.parts
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl Debug for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("State");
        s.field("id", &self.inner.id);
        if self.inner.name != self.inner.id {
            s.field("name", &self.inner.name);
        }
        if let Some(condition) = &self.inner.condition {
            s.field("condition", condition);
        }
        s.finish()
    }
}

impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.name)
    }
}

impl From<&str> for State {
    fn from(id: &str) -> Self {
        State::new(id)
    }
}

impl From<String> for State {
    fn from(id: String) -> Self {
        State::new(id)
    }
}
