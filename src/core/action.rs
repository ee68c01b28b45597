//! Side effects executed when a transition fires.

use super::error::MachineError;
use super::value::Value;
use super::variables::Variables;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// Native mutation used by [`Action::custom`].
pub type Effect = Arc<dyn Fn(&mut Variables) -> Result<(), MachineError> + Send + Sync>;

/// Mutation of the owning machine's store.
///
/// Actions run against a working copy of the store; the machine commits the
/// copy only if the whole action succeeds.
#[derive(Clone, Default)]
pub enum Action {
    #[default]
    Noop,
    Set {
        name: String,
        value: Value,
    },
    /// Add `delta` to an integer variable.
    Add {
        name: String,
        delta: i64,
    },
    ResetTimer(String),
    Sequence(Vec<Action>),
    Custom(Effect),
}

impl Action {
    pub fn noop() -> Self {
        Self::Noop
    }

    pub fn set(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Set {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn add(name: impl Into<String>, delta: i64) -> Self {
        Self::Add {
            name: name.into(),
            delta,
        }
    }

    pub fn reset_timer(name: impl Into<String>) -> Self {
        Self::ResetTimer(name.into())
    }

    /// Wrap a closure over the store. Effects report their own failures with
    /// [`MachineError::ActionFailed`]; the transition is then not committed.
    ///
    /// ```rust
    /// use tandem::{Action, MachineError, Variables};
    ///
    /// let withdraw = Action::custom(|vars| {
    ///     let balance = vars.int_value_for("balance")?;
    ///     if balance < 10 {
    ///         return Err(MachineError::ActionFailed(format!("balance {balance} below 10")));
    ///     }
    ///     vars.set("balance", balance - 10);
    ///     Ok(())
    /// });
    ///
    /// let mut vars = Variables::new().with("balance", 5);
    /// assert!(matches!(withdraw.apply(&mut vars), Err(MachineError::ActionFailed(_))));
    /// ```
    pub fn custom<F>(effect: F) -> Self
    where
        F: Fn(&mut Variables) -> Result<(), MachineError> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(effect))
    }

    /// Run `self`, then `next`.
    pub fn then(self, next: Action) -> Self {
        match (self, next) {
            (Self::Noop, a) | (a, Self::Noop) => a,
            (Self::Sequence(mut first), Self::Sequence(rest)) => {
                first.extend(rest);
                Self::Sequence(first)
            }
            (Self::Sequence(mut first), a) => {
                first.push(a);
                Self::Sequence(first)
            }
            (a, Self::Sequence(mut rest)) => {
                rest.insert(0, a);
                Self::Sequence(rest)
            }
            (a, b) => Self::Sequence(vec![a, b]),
        }
    }

    pub fn apply(&self, vars: &mut Variables) -> Result<(), MachineError> {
        match self {
            Self::Noop => Ok(()),
            Self::Set { name, value } => {
                vars.set(name.clone(), value.clone());
                Ok(())
            }
            Self::Add { name, delta } => {
                let current = vars.int_value_for(name)?;
                vars.set(name.clone(), current.saturating_add(*delta));
                Ok(())
            }
            Self::ResetTimer(name) => {
                vars.reset_timer(name.clone());
                Ok(())
            }
            Self::Sequence(actions) => actions.iter().try_for_each(|a| a.apply(vars)),
            Self::Custom(effect) => effect(vars),
        }
    }
}

impl Debug for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Noop => write!(f, "Noop"),
            Self::Set { name, value } => write!(f, "Set({name} = {value})"),
            Self::Add { name, delta } => write!(f, "Add({name} += {delta})"),
            Self::ResetTimer(name) => write!(f, "ResetTimer({name})"),
            Self::Sequence(actions) => f.debug_list().entries(actions).finish(),
            Self::Custom(_) => write!(f, "Custom"),
        }
    }
}
