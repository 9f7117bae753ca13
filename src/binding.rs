//! Binding between a loop and a component's render lifecycle.

use core::fmt::Debug;

use crate::runtime::TeardownHandle;
use crate::{
    Dispatch, Init, LoopError, LoopOptions, LoopRuntime, Renderer, Spawner, StateSubscription,
    Update,
};

/// A mounted component bound to one loop.
///
/// Mounting starts the loop exactly once and renders its initial state.
/// From then on the binding keeps a read-only copy of the last published
/// state and re-renders whenever a new, different state arrives. Unmounting,
/// explicitly or by dropping the binding, tears the loop down exactly once.
///
/// # Example
///
/// ```rust,no_run
/// use oak_loop::{effects, use_loop, Dispatch, LoopOptions, Next, TokioSpawner};
/// use std::time::Duration;
///
/// #[derive(Debug, Clone, PartialEq)]
/// struct State { ready: bool }
///
/// #[derive(Debug)]
/// enum Event { Ready }
///
/// fn update(_state: &State, event: Event) -> Next<State, Event> {
///     match event {
///         Event::Ready => Next::new(State { ready: true }),
///     }
/// }
///
/// # async fn demo() -> Result<(), oak_loop::LoopError> {
/// let init = Next::with_effect(
///     State { ready: false },
///     effects::timeout(Duration::from_secs(1), || Event::Ready),
/// );
/// let render = |state: &State, _: &Dispatch<Event>| println!("ready: {}", state.ready);
///
/// let (mut binding, mut runtime) =
///     use_loop(update, init, LoopOptions::new().log(true), TokioSpawner, render)?;
/// tokio::spawn(async move { runtime.run().await });
///
/// while binding.changed().await {
///     if binding.state().ready {
///         break;
///     }
/// }
/// binding.unmount();
/// # Ok(())
/// # }
/// ```
pub struct Binding<State, Event, Render> {
    state: State,
    dispatch: Dispatch<Event>,
    subscription: Option<StateSubscription<State>>,
    teardown: TeardownHandle,
    renderer: Render,
}

impl<State, Event, Render> Binding<State, Event, Render>
where
    State: Clone + PartialEq + Debug + Send + 'static,
    Event: Debug + Send + 'static,
    Render: Renderer<State, Event>,
{
    /// Create a loop and mount `renderer` on it.
    ///
    /// Returns the binding and the runtime; drive the runtime with
    /// [`LoopRuntime::run`] on your executor.
    pub fn mount<Logic, Spawn>(
        update: Logic,
        init: impl Into<Init<State, Event>>,
        options: LoopOptions,
        spawner: Spawn,
        renderer: Render,
    ) -> Result<(Self, LoopRuntime<State, Event, Logic, Spawn>), LoopError>
    where
        Logic: Update<State, Event>,
        Spawn: Spawner,
    {
        let mut runtime = LoopRuntime::new(update, init, spawner, options);
        let binding = Self::attach(&mut runtime, renderer)?;
        Ok((binding, runtime))
    }

    /// Mount `renderer` on an existing, not yet started runtime.
    pub fn attach<Logic, Spawn>(
        runtime: &mut LoopRuntime<State, Event, Logic, Spawn>,
        mut renderer: Render,
    ) -> Result<Self, LoopError>
    where
        Logic: Update<State, Event>,
        Spawn: Spawner,
    {
        runtime.start()?;
        let subscription = runtime.subscribe();
        let state = subscription
            .try_next()
            .ok_or(LoopError::MissingInitialState)?;
        let dispatch = runtime.dispatcher();
        renderer.render(&state, &dispatch);

        Ok(Self {
            state,
            dispatch,
            subscription: Some(subscription),
            teardown: runtime.teardown_handle(),
            renderer,
        })
    }

    /// Render every state published since the last call.
    ///
    /// Returns the number of renders performed.
    pub fn sync(&mut self) -> usize {
        let mut rendered = 0;
        while let Some(state) = self
            .subscription
            .as_ref()
            .and_then(StateSubscription::try_next)
        {
            self.apply(state);
            rendered += 1;
        }
        rendered
    }

    /// Wait for the next published state and render it.
    ///
    /// Returns `false` once the loop stopped publishing or the binding was
    /// unmounted.
    pub async fn changed(&mut self) -> bool {
        let state = match &self.subscription {
            Some(subscription) => subscription.next().await,
            None => None,
        };
        match state {
            Some(state) => {
                self.apply(state);
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, state: State) {
        self.state = state;
        self.renderer.render(&self.state, &self.dispatch);
    }
}

impl<State, Event, Render> Binding<State, Event, Render> {
    /// The last rendered state.
    pub fn state(&self) -> &State {
        &self.state
    }

    /// The dispatch handle; the same loop for the binding's whole lifetime.
    pub fn dispatch(&self) -> &Dispatch<Event> {
        &self.dispatch
    }

    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    /// Unsubscribe and tear the loop down.
    pub fn unmount(self) {
        drop(self);
    }

    pub(crate) fn teardown(&mut self) {
        if self.subscription.take().is_some() && self.teardown.teardown() {
            tracing::debug!("binding unmounted");
        }
    }
}

impl<State, Event, Render> Drop for Binding<State, Event, Render> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Mount a loop for a rendering component.
///
/// Shorthand for [`Binding::mount`]; returns the binding, which exposes
/// [`state`](Binding::state) and [`dispatch`](Binding::dispatch), plus the
/// runtime to drive.
#[allow(clippy::type_complexity)]
pub fn use_loop<State, Event, Logic, Spawn, Render>(
    update: Logic,
    init: impl Into<Init<State, Event>>,
    options: LoopOptions,
    spawner: Spawn,
    renderer: Render,
) -> Result<
    (
        Binding<State, Event, Render>,
        LoopRuntime<State, Event, Logic, Spawn>,
    ),
    LoopError,
>
where
    State: Clone + PartialEq + Debug + Send + 'static,
    Event: Debug + Send + 'static,
    Logic: Update<State, Event>,
    Spawn: Spawner,
    Render: Renderer<State, Event>,
{
    Binding::mount(update, init, options, spawner, renderer)
}
