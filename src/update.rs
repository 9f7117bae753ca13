//! The transition contract supplied by the application.

use crate::Next;

/// Pure transition from the current state and an event to the next step.
///
/// Implementations must be total and free of I/O: every side effect belongs in
/// the returned [`Effect`](crate::Effect). The runtime calls this
/// synchronously, once per event, in dispatch order.
///
/// Closures of the right shape implement it directly:
///
/// ```rust
/// use oak_loop::{Next, Update};
///
/// let update = |count: &u32, step: u32| Next::<u32, u32>::new(count + step);
/// assert_eq!(update.update(&1, 2).state, 3);
/// ```
pub trait Update<State, Event> {
    fn update(&self, state: &State, event: Event) -> Next<State, Event>;
}

impl<State, Event, F> Update<State, Event> for F
where
    F: Fn(&State, Event) -> Next<State, Event>,
{
    fn update(&self, state: &State, event: Event) -> Next<State, Event> {
        self(state, event)
    }
}
