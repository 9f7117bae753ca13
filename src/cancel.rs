//! Cooperative cancellation shared between a loop and the effects it starts.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use futures::channel::oneshot;
use futures::future::{FutureExt, Shared};
use parking_lot::Mutex;

/// Owning side of a cancellation signal.
///
/// Cloning yields another handle to the same signal. Calling
/// [`cancel`](Self::cancel) on any clone fires every [`CancelToken`] handed
/// out by [`token`](Self::token). Dropping every clone without cancelling also
/// resolves [`CancelToken::cancelled`], so abandoned effects stop as well.
#[derive(Clone)]
pub struct CancelSource {
    trigger: Arc<Mutex<Option<oneshot::Sender<()>>>>,
    token: CancelToken,
}

impl CancelSource {
    pub fn new() -> Self {
        let (sender, receiver) = oneshot::channel();
        let trigger = Arc::new(Mutex::new(Some(sender)));
        Self {
            token: CancelToken {
                flag: Arc::new(AtomicBool::new(false)),
                signal: receiver.shared(),
                source: Arc::downgrade(&trigger),
            },
            trigger,
        }
    }

    /// Fire the signal. Returns `true` only for the call that actually fired it.
    pub fn cancel(&self) -> bool {
        let Some(sender) = self.trigger.lock().take() else {
            return false;
        };
        self.token.flag.store(true, Ordering::Release);
        let _ = sender.send(());
        true
    }

    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Default for CancelSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Read side of a cancellation signal, passed to every effect thunk.
///
/// Effects that hold resources of their own can poll
/// [`is_cancelled`](Self::is_cancelled) or await [`cancelled`](Self::cancelled).
/// Effects that ignore it are still stopped: the runtime drops them as soon as
/// the signal fires.
#[derive(Clone)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    signal: Shared<oneshot::Receiver<()>>,
    source: Weak<Mutex<Option<oneshot::Sender<()>>>>,
}

impl CancelToken {
    /// `true` once the source fired or every [`CancelSource`] was dropped.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
            || self.source.strong_count() == 0
            || self.signal.peek().is_some()
    }

    /// Resolves once the owning [`CancelSource`] fires or is dropped.
    pub fn cancelled(&self) -> impl Future<Output = ()> + Send + 'static {
        let signal = self.signal.clone();
        async move {
            let _ = signal.await;
        }
    }
}

impl core::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
