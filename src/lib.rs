//! A small unidirectional dataflow loop for Rust UIs.
//!
//! State changes only through a pure transition function; side effects are
//! described as inert [`Effect`] values and run by the loop, which feeds the
//! events they produce back through the same transition function.
//!
//! ```text
//! UI ── dispatch(event) ──▶ event channel ──▶ update(state, event)
//!  ▲                            ▲                   │
//!  │                            │            Next { state, effect }
//!  └── render(state) ◀── state channel ◀────────────┤
//!                               │                   ▼
//!                               └─────── effect events (async)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oak_loop::{create_test_spawner, Effect, Next, TestLoopRuntime, TestRenderer};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct State { clicks: u32, message: &'static str }
//!
//! #[derive(Debug)]
//! enum Event { Clicked, Greet }
//!
//! fn update(state: &State, event: Event) -> Next<State, Event> {
//!     match event {
//!         Event::Clicked => Next::with_effect(
//!             State { clicks: state.clicks + 1, ..state.clone() },
//!             Effect::just(Event::Greet),
//!         ),
//!         Event::Greet => Next::new(State { message: "hello", ..state.clone() }),
//!     }
//! }
//!
//! let renderer = TestRenderer::new();
//! let init = Next::new(State { clicks: 0, message: "" });
//! let mut driver = TestLoopRuntime::new(update, init, renderer.clone(), create_test_spawner()).run();
//!
//! driver.dispatch().dispatch(Event::Clicked);
//! driver.process_events();
//!
//! assert_eq!(driver.state(), &State { clicks: 1, message: "hello" });
//! assert_eq!(renderer.count(), 3);
//! ```
//!
//! In an application, mount with [`use_loop`] and drive the returned
//! [`LoopRuntime`] with [`LoopRuntime::run`] on your executor.

// Module declarations
mod binding;
mod bus;
mod cancel;
mod dispatch;
mod effect;
pub mod effects;
mod error;
mod next;
mod observer;
mod options;
mod renderer;
mod runtime;
mod update;

// Public re-exports
pub use binding::{use_loop, Binding};
pub use bus::StateSubscription;
pub use cancel::{CancelSource, CancelToken};
pub use dispatch::Dispatch;
pub use effect::{Effect, EffectResult};
pub use error::{HttpError, LoopError};
pub use next::{next, Init, Next};
pub use observer::{LoopObserver, NoopObserver, TracingObserver};
pub use options::LoopOptions;
pub use renderer::Renderer;
pub use runtime::{LoopRuntime, LoopStatus, Spawner, TeardownHandle, TokioSpawner};
pub use update::Update;

// Test utilities (only available with 'testing' feature or during tests)
#[cfg(any(test, feature = "testing"))]
pub use renderer::TestRenderer;
#[cfg(any(test, feature = "testing"))]
pub use runtime::{create_test_spawner, TestLoopDriver, TestLoopRuntime};
