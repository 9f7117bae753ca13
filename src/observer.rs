//! Diagnostic hooks around each transition.

use std::fmt::Debug;

use crate::Next;

/// Observes the loop at its two diagnostic points.
///
/// Both hooks default to doing nothing. Observers only read; they cannot
/// change what the loop does.
pub trait LoopObserver<State, Event>: Send {
    /// An event was taken off the event channel, before the transition runs.
    fn on_event(&self, _event: &Event) {}

    /// The transition for the last event returned `next`.
    fn on_next(&self, _next: &Next<State, Event>) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl<State, Event> LoopObserver<State, Event> for NoopObserver {}

/// Observer that emits `tracing` events at debug level.
///
/// Installed by [`LoopOptions::log`](crate::LoopOptions::log).
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl<State: Debug, Event: Debug> LoopObserver<State, Event> for TracingObserver {
    fn on_event(&self, event: &Event) {
        tracing::debug!(?event, "event");
    }

    fn on_next(&self, next: &Next<State, Event>) {
        tracing::debug!(?next, "update returned");
    }
}
