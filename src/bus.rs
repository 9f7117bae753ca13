//! State channel from the runtime to its subscribers.

use flume::{Receiver, Sender};

/// Fan-out of published states, coalescing consecutive equal values.
pub(crate) struct StateBus<State> {
    last: Option<State>,
    subscribers: Vec<Sender<State>>,
    closed: bool,
}

impl<State: Clone + PartialEq> StateBus<State> {
    pub(crate) fn new() -> Self {
        Self {
            last: None,
            subscribers: Vec::new(),
            closed: false,
        }
    }

    /// Publish `state` to every live subscriber.
    ///
    /// Returns `false` when nothing was sent, either because `state` equals the
    /// last published value or because the bus is closed.
    pub(crate) fn publish(&mut self, state: &State) -> bool {
        if self.closed || self.last.as_ref() == Some(state) {
            return false;
        }
        self.last = Some(state.clone());
        self.subscribers
            .retain(|subscriber| subscriber.send(state.clone()).is_ok());
        true
    }

    /// Subscribe, receiving the last published state first if there is one.
    pub(crate) fn subscribe(&mut self) -> StateSubscription<State> {
        let (sender, receiver) = flume::unbounded();
        if !self.closed {
            if let Some(last) = &self.last {
                sender.send(last.clone()).ok();
            }
            self.subscribers.push(sender);
        }
        StateSubscription { receiver }
    }

    /// Stop publishing. Subscribers see their channel disconnect once drained.
    pub(crate) fn close(&mut self) {
        self.closed = true;
        self.subscribers.clear();
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

/// Receiving end of the state channel.
///
/// Dropping it unsubscribes.
pub struct StateSubscription<State> {
    receiver: Receiver<State>,
}

impl<State> StateSubscription<State> {
    /// Take the next pending state without waiting.
    pub fn try_next(&self) -> Option<State> {
        self.receiver.try_recv().ok()
    }

    /// Wait for the next state; `None` once the runtime stopped publishing.
    pub async fn next(&self) -> Option<State> {
        self.receiver.recv_async().await.ok()
    }

    /// Whether the runtime side has gone away.
    pub fn is_closed(&self) -> bool {
        self.receiver.is_disconnected()
    }
}
