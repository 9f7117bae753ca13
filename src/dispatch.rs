//! Handle for feeding events into a running loop.

use flume::Sender;

use crate::LoopError;

/// Event dispatch handle.
///
/// Clone this into UI callbacks. Every clone feeds the same event channel;
/// the runtime drains it in the order events were sent, so dispatching from
/// several callbacks at once is safe. Dispatching never returns state: render
/// from the state the binding layer publishes.
///
/// # Example
///
/// ```rust
/// use oak_loop::{create_test_spawner, Next, TestLoopRuntime, TestRenderer};
///
/// #[derive(Debug)]
/// enum Event { Click }
///
/// let renderer = TestRenderer::new();
/// let update = |clicks: &u32, _: Event| Next::new(clicks + 1);
/// let mut driver =
///     TestLoopRuntime::new(update, Next::new(0), renderer.clone(), create_test_spawner()).run();
///
/// let on_click = {
///     let dispatch = driver.dispatch().clone();
///     move || dispatch.dispatch(Event::Click)
/// };
/// on_click();
/// driver.process_events();
///
/// assert_eq!(driver.state(), &1);
/// ```
pub struct Dispatch<Event>(pub(crate) Sender<Event>);

impl<Event> Clone for Dispatch<Event> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<Event> Dispatch<Event> {
    pub(crate) fn new(sender: Sender<Event>) -> Self {
        Self(sender)
    }

    /// Queue an event for the loop.
    ///
    /// Events sent after the runtime is gone are discarded silently.
    pub fn dispatch(&self, event: Event) {
        self.0.send(event).ok();
    }

    /// Queue an event, reporting whether the runtime still exists.
    pub fn try_dispatch(&self, event: Event) -> Result<(), LoopError> {
        self.0.send(event).map_err(|_| LoopError::Disconnected)
    }

    /// Whether both handles feed the same loop.
    pub fn same_loop(&self, other: &Self) -> bool {
        self.0.same_channel(&other.0)
    }
}

impl<Event> core::fmt::Debug for Dispatch<Event> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Dispatch")
            .field("pending", &self.0.len())
            .finish()
    }
}
