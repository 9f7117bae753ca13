//! Rendering abstraction driven by the binding layer.

#[cfg(any(test, feature = "testing"))]
use std::sync::Arc;

#[cfg(any(test, feature = "testing"))]
use parking_lot::Mutex;

use crate::Dispatch;

/// Renders the loop's published state.
///
/// Implement this to plug the loop into a UI toolkit, a terminal, or anything
/// else that draws. [`render`](Self::render) is called once on mount and then
/// once per published state change; equal consecutive states are coalesced
/// before they get here.
///
/// # Example
///
/// ```rust
/// use oak_loop::{Dispatch, Renderer};
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct State { message: &'static str }
///
/// struct ConsoleRenderer;
///
/// impl<Event> Renderer<State, Event> for ConsoleRenderer {
///     fn render(&mut self, state: &State, _dispatch: &Dispatch<Event>) {
///         println!("{}", state.message);
///     }
/// }
/// ```
pub trait Renderer<State, Event> {
    /// Render `state`.
    ///
    /// `dispatch` is the same handle on every call; clone it into callbacks
    /// to send events back into the loop.
    fn render(&mut self, state: &State, dispatch: &Dispatch<Event>);
}

impl<State, Event, F> Renderer<State, Event> for F
where
    F: FnMut(&State, &Dispatch<Event>),
{
    fn render(&mut self, state: &State, dispatch: &Dispatch<Event>) {
        self(state, dispatch)
    }
}

#[cfg(any(test, feature = "testing"))]
/// Renderer that records every rendered state for assertions.
///
/// Only available with the `testing` feature.
///
/// Clones share the same record, so keep one clone for assertions and hand
/// the other to the loop.
///
/// # Example
///
/// ```rust
/// use oak_loop::{create_test_spawner, Next, TestLoopRuntime, TestRenderer};
///
/// let renderer = TestRenderer::new();
/// let update = |count: &i32, step: i32| Next::new(count + step);
///
/// let mut driver =
///     TestLoopRuntime::new(update, Next::new(0), renderer.clone(), create_test_spawner()).run();
/// driver.dispatch().dispatch(2);
/// driver.process_events();
///
/// renderer.with_renders(|renders| {
///     assert_eq!(renders, &vec![0, 2]);
/// });
/// ```
pub struct TestRenderer<State> {
    renders: Arc<Mutex<Vec<State>>>,
}

#[cfg(any(test, feature = "testing"))]
impl<State> Clone for TestRenderer<State> {
    fn clone(&self) -> Self {
        Self {
            renders: self.renders.clone(),
        }
    }
}

#[cfg(any(test, feature = "testing"))]
impl<State: Clone, Event> Renderer<State, Event> for TestRenderer<State> {
    fn render(&mut self, state: &State, _dispatch: &Dispatch<Event>) {
        self.renders.lock().push(state.clone());
    }
}

#[cfg(any(test, feature = "testing"))]
impl<State> Default for TestRenderer<State> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "testing"))]
impl<State> TestRenderer<State> {
    pub fn new() -> Self {
        Self {
            renders: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Get the number of renders that have occurred.
    pub fn count(&self) -> usize {
        self.renders.lock().len()
    }

    /// Access the recorded renders with a closure.
    pub fn with_renders<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Vec<State>) -> R,
    {
        let renders = self.renders.lock();
        f(&renders)
    }

    /// The most recently rendered state.
    pub fn last(&self) -> Option<State>
    where
        State: Clone,
    {
        self.renders.lock().last().cloned()
    }
}
