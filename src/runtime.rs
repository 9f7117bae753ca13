//! The loop runtime that serializes events and launches effects.

use core::fmt::Debug;
use core::future::Future;
use core::pin::Pin;

use flume::Receiver;
use futures::StreamExt;

use crate::bus::{StateBus, StateSubscription};
use crate::{
    CancelSource, Dispatch, Effect, Init, LoopError, LoopObserver, LoopOptions, Next, NoopObserver,
    TracingObserver, Update,
};

/// Where a loop runs the effects it starts.
///
/// Each started effect becomes one task that forwards its events into the
/// loop's event channel until it finishes or the loop is torn down. The
/// effect's thunk has already been called by the time the task is handed
/// over, so deadlines and requests do not wait for the task to be polled.
///
/// [`TokioSpawner`] covers the timer and HTTP effects; plain functions and
/// closures taking the boxed task work as well.
pub trait Spawner {
    fn spawn(&self, future: Pin<Box<dyn Future<Output = ()> + Send>>);
}

impl<F> Spawner for F
where
    F: Fn(Pin<Box<dyn Future<Output = ()> + Send>>),
{
    fn spawn(&self, future: Pin<Box<dyn Future<Output = ()> + Send>>) {
        self(future)
    }
}

/// Spawns effects as tasks on the ambient tokio runtime.
///
/// Must be used from within a tokio runtime context.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSpawner;

impl Spawner for TokioSpawner {
    fn spawn(&self, future: Pin<Box<dyn Future<Output = ()> + Send>>) {
        tokio::spawn(future);
    }
}

/// Lifecycle of a [`LoopRuntime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStatus {
    Uninitialized,
    Running,
    TornDown,
}

/// Handle that tears a loop down from outside the task running it.
#[derive(Clone)]
pub struct TeardownHandle(CancelSource);

impl TeardownHandle {
    /// Returns `true` only for the call that performed the teardown.
    pub fn teardown(&self) -> bool {
        self.0.cancel()
    }

    pub fn is_torn_down(&self) -> bool {
        self.0.is_cancelled()
    }
}

/// The loop runtime.
///
/// Owns the authoritative state and the two channels around it:
/// - the event channel, fed by [`Dispatch`] handles and by effects;
/// - the state channel, drained by [`StateSubscription`]s (usually a
///   [`Binding`](crate::Binding)).
///
/// Events are processed one at a time, in the order they were sent, each
/// against the state left by the previous one. Effects run on the
/// [`Spawner`] and only talk back through the event channel, so however long
/// they take, the final state is the left fold of the transition over the
/// events in arrival order.
///
/// Tearing down fires the loop's [`CancelToken`](crate::CancelToken): started
/// effects stop being polled and whatever they would have produced is dropped.
/// Dropping the runtime without tearing down does the same once every
/// [`TeardownHandle`] is gone too.
///
/// # Type Parameters
///
/// * `State` - The state type for your application
/// * `Event` - The event type for your application
/// * `Logic` - The transition implementation type (implements [`Update`])
/// * `Spawn` - The spawner implementation type (implements [`Spawner`])
pub struct LoopRuntime<State, Event, Logic, Spawn> {
    update: Logic,
    init: Option<Init<State, Event>>,
    state: Option<State>,
    status: LoopStatus,
    event_receiver: Receiver<Event>,
    dispatch: Dispatch<Event>,
    state_bus: StateBus<State>,
    spawner: Spawn,
    observer: Box<dyn LoopObserver<State, Event>>,
    teardown: CancelSource,
}

impl<State, Event, Logic, Spawn> LoopRuntime<State, Event, Logic, Spawn>
where
    State: Clone + PartialEq + Debug + Send + 'static,
    Event: Debug + Send + 'static,
    Logic: Update<State, Event>,
    Spawn: Spawner,
{
    /// Create a new runtime.
    ///
    /// Nothing happens until [`start`](Self::start) or [`run`](Self::run) is
    /// called; in particular the initial effect is not started yet.
    ///
    /// # Arguments
    ///
    /// * `update` - The pure transition function
    /// * `init` - The initial step, or a producer of it
    /// * `spawner` - Spawner to execute effects on your chosen runtime
    /// * `options` - Diagnostics switches
    pub fn new(
        update: Logic,
        init: impl Into<Init<State, Event>>,
        spawner: Spawn,
        options: LoopOptions,
    ) -> Self {
        let (event_sender, event_receiver) = flume::unbounded();
        let observer: Box<dyn LoopObserver<State, Event>> = if options.log {
            Box::new(TracingObserver)
        } else {
            Box::new(NoopObserver)
        };

        LoopRuntime {
            update,
            init: Some(init.into()),
            state: None,
            status: LoopStatus::Uninitialized,
            event_receiver,
            dispatch: Dispatch::new(event_sender),
            state_bus: StateBus::new(),
            spawner,
            observer,
            teardown: CancelSource::new(),
        }
    }

    /// Replace the diagnostics observer.
    pub fn with_observer(mut self, observer: impl LoopObserver<State, Event> + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// A handle feeding this loop's event channel.
    pub fn dispatcher(&self) -> Dispatch<Event> {
        self.dispatch.clone()
    }

    pub fn teardown_handle(&self) -> TeardownHandle {
        TeardownHandle(self.teardown.clone())
    }

    pub fn status(&self) -> LoopStatus {
        if self.teardown.is_cancelled() {
            LoopStatus::TornDown
        } else {
            self.status
        }
    }

    /// The authoritative state, once started.
    pub fn state(&self) -> Option<&State> {
        self.state.as_ref()
    }

    /// Subscribe to published states.
    ///
    /// A subscriber joining after start first receives the current state.
    pub fn subscribe(&mut self) -> StateSubscription<State> {
        self.state_bus.subscribe()
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        self.state_bus.subscriber_count()
    }

    /// Resolve the initial step, publish its state and start its effect.
    pub fn start(&mut self) -> Result<(), LoopError> {
        match self.status() {
            LoopStatus::Running => return Err(LoopError::AlreadyStarted),
            LoopStatus::TornDown => return Err(LoopError::TornDown),
            LoopStatus::Uninitialized => {}
        }
        let init = self.init.take().ok_or(LoopError::AlreadyStarted)?;
        let Next { state, effect } = init.resolve();

        tracing::debug!(?state, "loop started");
        self.state_bus.publish(&state);
        self.state = Some(state);
        self.status = LoopStatus::Running;

        if let Some(effect) = effect {
            self.start_effect(effect);
        }
        Ok(())
    }

    /// Start if needed, then process events until the loop is torn down.
    ///
    /// Events can be dispatched from any thread but are always processed
    /// sequentially on the task awaiting this future. Events still queued at
    /// teardown are discarded.
    ///
    /// Fails with [`LoopError::TornDown`] only when the loop was torn down
    /// before it ever started.
    pub async fn run(&mut self) -> Result<(), LoopError> {
        match self.status {
            LoopStatus::Uninitialized => self.start()?,
            LoopStatus::Running => {}
            LoopStatus::TornDown => return Ok(()),
        }

        let mut events = self
            .event_receiver
            .clone()
            .into_stream()
            .take_until(self.teardown.token().cancelled())
            .boxed();

        while let Some(event) = events.next().await {
            self.step(event);
        }

        self.finish_teardown();
        Ok(())
    }

    /// Tear the loop down: cancel in-flight effects and stop publishing.
    pub fn teardown(&mut self) {
        self.teardown.cancel();
        self.finish_teardown();
    }

    fn finish_teardown(&mut self) {
        if self.status != LoopStatus::TornDown {
            tracing::debug!("loop torn down");
            self.status = LoopStatus::TornDown;
            self.state_bus.close();
        }
    }

    fn step(&mut self, event: Event) {
        if self.teardown.is_cancelled() {
            self.finish_teardown();
            return;
        }
        let Some(state) = self.state.as_ref() else {
            tracing::warn!(?event, "event received before start; dropped");
            return;
        };

        self.observer.on_event(&event);
        let next = self.update.update(state, event);
        self.observer.on_next(&next);

        let Next { state, effect } = next;
        self.state_bus.publish(&state);
        self.state = Some(state);

        if let Some(effect) = effect {
            self.start_effect(effect);
        }
    }

    fn start_effect(&self, effect: Effect<Event>) {
        let name = effect.name().to_owned();
        let token = self.teardown.token();
        let dispatch = self.dispatch.clone();

        tracing::trace!(effect = %name, "starting effect");
        let mut events = effect
            .start(token.clone())
            .into_stream()
            .take_until(token.cancelled())
            .boxed();

        self.spawner.spawn(Box::pin(async move {
            while let Some(event) = events.next().await {
                dispatch.dispatch(event);
            }
            tracing::trace!(effect = %name, "effect finished");
        }));
    }
}

#[cfg(any(test, feature = "testing"))]
/// Drive an effect task to completion on the calling thread.
///
/// Events from [`Effect::just`]-style effects are queued before the step that
/// started them returns. Nothing here drives tokio timers or sockets, so
/// timeouts, intervals and HTTP requests would block the calling thread
/// forever; run those under [`TokioSpawner`] inside a tokio test.
pub fn test_spawner_fn(fut: Pin<Box<dyn Future<Output = ()> + Send>>) {
    futures::executor::block_on(fut);
}

#[cfg(any(test, feature = "testing"))]
/// The blocking spawner of [`test_spawner_fn`], ready to hand to
/// [`LoopRuntime::new`] or [`TestLoopRuntime::new`].
pub fn create_test_spawner() -> fn(Pin<Box<dyn Future<Output = ()> + Send>>) {
    test_spawner_fn
}

#[cfg(any(test, feature = "testing"))]
/// Test runtime for the loop with manual event processing control.
///
/// Only available with the `testing` feature or during tests.
///
/// Unlike [`LoopRuntime::run`], nothing processes events on its own. Tests
/// call [`process_events`](TestLoopDriver::process_events) on the returned
/// driver to drain the event channel and render what was published.
///
/// ```rust
/// use oak_loop::{create_test_spawner, Effect, Next, TestLoopRuntime, TestRenderer};
///
/// #[derive(Debug)]
/// enum Event { Increment }
///
/// let renderer = TestRenderer::new();
/// let update = |count: &i32, _: Event| Next::new(count + 1);
/// let init = Next::with_effect(0, Effect::just(Event::Increment));
///
/// let mut driver = TestLoopRuntime::new(update, init, renderer.clone(), create_test_spawner()).run();
/// driver.process_events();
///
/// assert_eq!(renderer.count(), 2);
/// assert_eq!(driver.state(), &1);
/// ```
pub struct TestLoopRuntime<State, Event, Logic, Spawn, Render> {
    runtime: LoopRuntime<State, Event, Logic, Spawn>,
    renderer: Render,
}

#[cfg(any(test, feature = "testing"))]
impl<State, Event, Logic, Spawn, Render> TestLoopRuntime<State, Event, Logic, Spawn, Render>
where
    State: Clone + PartialEq + Debug + Send + 'static,
    Event: Debug + Send + 'static,
    Logic: Update<State, Event>,
    Spawn: Spawner,
    Render: crate::Renderer<State, Event>,
{
    /// Create a new test runtime with default options.
    pub fn new(
        update: Logic,
        init: impl Into<Init<State, Event>>,
        renderer: Render,
        spawner: Spawn,
    ) -> Self {
        Self::with_options(update, init, renderer, spawner, LoopOptions::default())
    }

    pub fn with_options(
        update: Logic,
        init: impl Into<Init<State, Event>>,
        renderer: Render,
        spawner: Spawn,
        options: LoopOptions,
    ) -> Self {
        TestLoopRuntime {
            runtime: LoopRuntime::new(update, init, spawner, options),
            renderer,
        }
    }

    /// Replace the diagnostics observer.
    pub fn with_observer(mut self, observer: impl LoopObserver<State, Event> + 'static) -> Self {
        self.runtime = self.runtime.with_observer(observer);
        self
    }

    /// Mounts a binding and returns a driver for manual event processing.
    ///
    /// The initial state is rendered and the initial effect started before
    /// this returns.
    ///
    /// # Panics
    ///
    /// If the runtime cannot be started, which only happens on misuse.
    pub fn run(mut self) -> TestLoopDriver<State, Event, Logic, Spawn, Render> {
        let binding = crate::Binding::attach(&mut self.runtime, self.renderer)
            .expect("a fresh test runtime always starts");

        TestLoopDriver {
            runtime: self.runtime,
            binding,
        }
    }
}

#[cfg(any(test, feature = "testing"))]
/// Test runtime driver for manual event processing control.
///
/// Only available with the `testing` feature or during tests.
///
/// Returned by [`TestLoopRuntime::run`].
pub struct TestLoopDriver<State, Event, Logic, Spawn, Render> {
    runtime: LoopRuntime<State, Event, Logic, Spawn>,
    binding: crate::Binding<State, Event, Render>,
}

#[cfg(any(test, feature = "testing"))]
impl<State, Event, Logic, Spawn, Render> TestLoopDriver<State, Event, Logic, Spawn, Render>
where
    State: Clone + PartialEq + Debug + Send + 'static,
    Event: Debug + Send + 'static,
    Logic: Update<State, Event>,
    Spawn: Spawner,
    Render: crate::Renderer<State, Event>,
{
    /// Process all queued events, then render everything they published.
    ///
    /// Events queued while draining (e.g. by synchronously spawned effects) are
    /// processed in the same call. Returns the number of events processed.
    pub fn process_events(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(event) = self.runtime.event_receiver.try_recv() {
            self.runtime.step(event);
            processed += 1;
        }
        self.binding.sync();
        processed
    }

    pub fn dispatch(&self) -> &Dispatch<Event> {
        self.binding.dispatch()
    }

    /// State as last rendered by the binding.
    pub fn state(&self) -> &State {
        self.binding.state()
    }

    pub fn runtime(&self) -> &LoopRuntime<State, Event, Logic, Spawn> {
        &self.runtime
    }

    /// Unmount the binding, tearing the runtime down.
    pub fn unmount(&mut self) {
        self.binding.teardown();
        self.runtime.teardown();
    }
}
