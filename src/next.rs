//! The result of one transition step and the loop's starting point.

use std::fmt;

use crate::Effect;

/// New state plus an optional effect, returned by every transition.
pub struct Next<State, Event> {
    pub state: State,
    pub effect: Option<Effect<Event>>,
}

impl<State, Event> Next<State, Event> {
    /// A step with no side effect.
    pub fn new(state: State) -> Self {
        Self { state, effect: None }
    }

    pub fn with_effect(state: State, effect: Effect<Event>) -> Self {
        Self {
            state,
            effect: Some(effect),
        }
    }

    pub fn into_parts(self) -> (State, Option<Effect<Event>>) {
        (self.state, self.effect)
    }
}

/// Shorthand for building a [`Next`].
///
/// ```rust
/// use oak_loop::{next, Next};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct State { pressed: bool }
///
/// let step: Next<State, ()> = next(State { pressed: true }, None);
/// assert!(step.effect.is_none());
/// ```
pub fn next<State, Event>(state: State, effect: Option<Effect<Event>>) -> Next<State, Event> {
    Next { state, effect }
}

impl<State: fmt::Debug, Event> fmt::Debug for Next<State, Event> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("state", &self.state)
            .field("effect", &self.effect.as_ref().map(|effect| effect.name()))
            .finish()
    }
}

/// How a loop obtains its first [`Next`].
///
/// Either a ready value or a producer that is called once when the loop
/// starts.
pub enum Init<State, Event> {
    Ready(Next<State, Event>),
    Deferred(Box<dyn FnOnce() -> Next<State, Event> + Send + 'static>),
}

impl<State, Event> Init<State, Event> {
    pub fn deferred<F>(producer: F) -> Self
    where
        F: FnOnce() -> Next<State, Event> + Send + 'static,
    {
        Self::Deferred(Box::new(producer))
    }

    pub(crate) fn resolve(self) -> Next<State, Event> {
        match self {
            Self::Ready(next) => next,
            Self::Deferred(producer) => producer(),
        }
    }
}

impl<State, Event> From<Next<State, Event>> for Init<State, Event> {
    fn from(next: Next<State, Event>) -> Self {
        Self::Ready(next)
    }
}
