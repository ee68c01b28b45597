//! Conditions over a variable store.
//!
//! Conditions serve two roles: the validity condition attached to a
//! [`State`](super::State), and the guard of a transition. Both are pure
//! predicates over [`Variables`]; evaluating one never mutates the store.

use super::error::MachineError;
use super::value::Value;
use super::variables::Variables;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

/// Native predicate used by [`Condition::custom`].
pub type Predicate = Arc<dyn Fn(&Variables) -> Result<bool, MachineError> + Send + Sync>;

/// Binary comparison between a stored value and a threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    Lt,
    Le,
    Eq,
    Ne,
    Ge,
    Gt,
}

impl Comparator {
    /// Whether `ordering` (of left against right) satisfies the comparator.
    pub fn holds(self, ordering: Ordering) -> bool {
        match self {
            Self::Lt => ordering == Ordering::Less,
            Self::Le => ordering != Ordering::Greater,
            Self::Eq => ordering == Ordering::Equal,
            Self::Ne => ordering != Ordering::Equal,
            Self::Ge => ordering != Ordering::Less,
            Self::Gt => ordering == Ordering::Greater,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Ge => ">=",
            Self::Gt => ">",
        }
    }
}

impl Display for Comparator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Immutable boolean predicate over a [`Variables`] store.
///
/// # Example
///
/// ```rust
/// use tandem::core::{Comparator, Condition, Variables};
///
/// let vars = Variables::new().with("counter", 6);
/// let over_limit = Condition::variable("counter", Comparator::Gt, 5);
/// let always = Condition::always();
///
/// assert!(over_limit.evaluate(&vars).unwrap());
/// assert!(over_limit.and(always).evaluate(&vars).unwrap());
/// ```
#[derive(Clone)]
pub enum Condition {
    Always,
    Variable {
        name: String,
        comparator: Comparator,
        threshold: Value,
    },
    Timer {
        name: String,
        comparator: Comparator,
        threshold: i64,
    },
    And(Box<Condition>, Box<Condition>),
    Custom(Predicate),
}

impl Condition {
    pub fn always() -> Self {
        Self::Always
    }

    pub fn variable(
        name: impl Into<String>,
        comparator: Comparator,
        threshold: impl Into<Value>,
    ) -> Self {
        Self::Variable {
            name: name.into(),
            comparator,
            threshold: threshold.into(),
        }
    }

    pub fn timer(name: impl Into<String>, comparator: Comparator, threshold: i64) -> Self {
        Self::Timer {
            name: name.into(),
            comparator,
            threshold,
        }
    }

    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(&Variables) -> Result<bool, MachineError> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(predicate))
    }

    /// Conjunction. `Always` operands are absorbed.
    pub fn and(self, other: Condition) -> Self {
        match (self, other) {
            (Self::Always, c) | (c, Self::Always) => c,
            (a, b) => Self::And(Box::new(a), Box::new(b)),
        }
    }

    /// Conjunction of two optional conditions, an absent one counting as true.
    pub fn conjoin(first: Option<&Condition>, second: Option<&Condition>) -> Self {
        match (first, second) {
            (Some(a), Some(b)) => a.clone().and(b.clone()),
            (Some(c), None) | (None, Some(c)) => c.clone(),
            (None, None) => Self::Always,
        }
    }

    /// Evaluate against a store. Conjunctions short-circuit left to right.
    pub fn evaluate(&self, vars: &Variables) -> Result<bool, MachineError> {
        match self {
            Self::Always => Ok(true),
            Self::Variable {
                name,
                comparator,
                threshold,
            } => {
                let stored = vars.value_for(name)?;
                let ordering =
                    stored
                        .compare(threshold)
                        .ok_or_else(|| MachineError::TypeMismatch {
                            name: name.clone(),
                            expected: threshold.kind(),
                            found: stored.kind(),
                        })?;
                Ok(comparator.holds(ordering))
            }
            Self::Timer {
                name,
                comparator,
                threshold,
            } => {
                let elapsed = vars.timer_value_for(name)?;
                Ok(comparator.holds(elapsed.cmp(threshold)))
            }
            Self::And(a, b) => Ok(a.evaluate(vars)? && b.evaluate(vars)?),
            Self::Custom(predicate) => predicate(vars),
        }
    }
}

impl Default for Condition {
    fn default() -> Self {
        Self::Always
    }
}

// Custom predicates compare by identity; everything else structurally.
impl PartialEq for Condition {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Always, Self::Always) => true,
            (
                Self::Variable {
                    name: n1,
                    comparator: c1,
                    threshold: t1,
                },
                Self::Variable {
                    name: n2,
                    comparator: c2,
                    threshold: t2,
                },
            ) => n1 == n2 && c1 == c2 && t1 == t2,
            (
                Self::Timer {
                    name: n1,
                    comparator: c1,
                    threshold: t1,
                },
                Self::Timer {
                    name: n2,
                    comparator: c2,
                    threshold: t2,
                },
            ) => n1 == n2 && c1 == c2 && t1 == t2,
            (Self::And(a1, b1), Self::And(a2, b2)) => a1 == a2 && b1 == b2,
            (Self::Custom(p1), Self::Custom(p2)) => Arc::ptr_eq(p1, p2),
            _ => false,
        }
    }
}

impl Debug for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => write!(f, "true"),
            Self::Variable {
                name,
                comparator,
                threshold,
            } => write!(f, "{name} {comparator} {threshold}"),
            Self::Timer {
                name,
                comparator,
                threshold,
            } => write!(f, "timer {name} {comparator} {threshold}"),
            Self::And(a, b) => write!(f, "({a} && {b})"),
            Self::Custom(_) => write!(f, "<custom>"),
        }
    }
}
