//! Declarative effect descriptors and the shape of their results.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{self, BoxFuture};
use futures::stream::{self, BoxStream, Stream};
use futures::{FutureExt, StreamExt};

use crate::CancelToken;

/// What an effect produces once started.
///
/// The variant is chosen by the effect author; the runtime never inspects the
/// underlying type to decide how to drive it.
pub enum EffectResult<Event> {
    /// Eventually exactly one event.
    Single(BoxFuture<'static, Event>),
    /// A lazy, possibly infinite, sequence of events.
    Stream(BoxStream<'static, Event>),
}

impl<Event: Send + 'static> EffectResult<Event> {
    pub fn single<F>(future: F) -> Self
    where
        F: Future<Output = Event> + Send + 'static,
    {
        Self::Single(future.boxed())
    }

    pub fn stream<S>(events: S) -> Self
    where
        S: Stream<Item = Event> + Send + 'static,
    {
        Self::Stream(events.boxed())
    }

    /// Resolve a fallible future into at most one event.
    ///
    /// `Ok` values are delivered. `Err` values are logged and dropped: the loop
    /// never receives a follow-up event for them. Effects whose failures must be
    /// observed should map the error into an event instead.
    pub fn fallible<F, E>(future: F) -> Self
    where
        F: Future<Output = Result<Event, E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let events = stream::once(future).filter_map(|result| {
            future::ready(match result {
                Ok(event) => Some(event),
                Err(error) => {
                    tracing::warn!(%error, "effect failed; no event produced");
                    None
                }
            })
        });
        Self::Stream(events.boxed())
    }

    /// Flatten either variant into a stream the runtime can drain.
    pub fn into_stream(self) -> BoxStream<'static, Event> {
        match self {
            Self::Single(future) => stream::once(future).boxed(),
            Self::Stream(events) => events,
        }
    }
}

impl<Event> fmt::Debug for EffectResult<Event> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(_) => f.write_str("EffectResult::Single"),
            Self::Stream(_) => f.write_str("EffectResult::Stream"),
        }
    }
}

type EffectRun<Event> = Box<dyn FnOnce(CancelToken) -> EffectResult<Event> + Send + 'static>;

/// Inert description of a side effect.
///
/// An effect pairs a diagnostic name with a thunk that starts the actual work.
/// Building one does nothing; the runtime invokes the thunk exactly once, right
/// after the transition that returned it. Starting consumes the effect, so it
/// cannot run twice.
///
/// # Example
///
/// ```rust
/// use oak_loop::{Effect, EffectResult};
///
/// #[derive(Debug)]
/// enum Event {
///     Loaded(String),
///     Refresh,
/// }
///
/// // Follow up immediately with another event
/// let refresh = Effect::just(Event::Refresh);
///
/// // Arbitrary async work
/// let load = Effect::new("load", |_token| {
///     EffectResult::single(async { Event::Loaded("cached".to_string()) })
/// });
///
/// // Run several at once
/// let both = Effect::batch(vec![refresh, load]);
/// assert_eq!(both.name(), "batch");
/// ```
pub struct Effect<Event> {
    name: Cow<'static, str>,
    run: EffectRun<Event>,
    data: Option<Arc<dyn Any + Send + Sync>>,
}

impl<Event: Send + 'static> Effect<Event> {
    /// Describe an effect.
    ///
    /// `run` receives the loop's [`CancelToken`] and returns the pending
    /// result. Failures must be expressed through the result itself; nothing
    /// thrown from `run` is caught.
    pub fn new<F>(name: impl Into<Cow<'static, str>>, run: F) -> Self
    where
        F: FnOnce(CancelToken) -> EffectResult<Event> + Send + 'static,
    {
        Self {
            name: name.into(),
            run: Box::new(run),
            data: None,
        }
    }

    /// Describe an effect from a zero-argument future producer.
    pub fn from_future<F, Fut>(name: impl Into<Cow<'static, str>>, run: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Event> + Send + 'static,
    {
        Self::new(name, move |_| EffectResult::single(run()))
    }

    /// Describe an effect from a zero-argument stream producer.
    pub fn from_stream<F, S>(name: impl Into<Cow<'static, str>>, run: F) -> Self
    where
        F: FnOnce() -> S + Send + 'static,
        S: Stream<Item = Event> + Send + 'static,
    {
        Self::new(name, move |_| EffectResult::stream(run()))
    }

    /// An effect that resolves immediately to `event`.
    pub fn just(event: Event) -> Self {
        Self::new("just", move |_| EffectResult::single(future::ready(event)))
    }

    /// Start all `effects` together and deliver their events as they arrive.
    pub fn batch(effects: Vec<Effect<Event>>) -> Self {
        Self::new("batch", move |token| {
            let started = effects
                .into_iter()
                .map(|effect| effect.start(token.clone()).into_stream());
            EffectResult::Stream(stream::select_all(started).boxed())
        })
    }

    /// Attach opaque descriptive data, e.g. the duration of a timer.
    pub fn with_data<D>(mut self, data: D) -> Self
    where
        D: Any + Send + Sync,
    {
        self.data = Some(Arc::new(data));
        self
    }
}

impl<Event> Effect<Event> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Borrow the attached data if it is a `D`.
    pub fn data<D: Any>(&self) -> Option<&D> {
        self.data.as_deref()?.downcast_ref::<D>()
    }

    pub(crate) fn start(self, token: CancelToken) -> EffectResult<Event> {
        (self.run)(token)
    }
}

impl<Event> fmt::Debug for Effect<Event> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("name", &self.name)
            .field("has_data", &self.data.is_some())
            .finish_non_exhaustive()
    }
}
