use std::time::Duration;

use futures::channel::oneshot;
use oak_loop::{effects, Effect, Next, Update};

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum RemoteData {
    Initial,
    Loading,
    Fetched(String),
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct PostState {
    pub(crate) value: RemoteData,
    pub(crate) foobar: String,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum PostEvent {
    DelayDone,
    Result(String),
    ButtonClicked,
}

#[cfg_attr(test, mockall::automock)]
pub(crate) trait PostEffects {
    fn fetch_post(&self) -> Effect<PostEvent>;
}

pub(crate) struct PostLogic {
    pub(crate) effects: Box<dyn PostEffects + Send>,
}

impl PostLogic {
    pub(crate) fn new(effects: impl PostEffects + Send + 'static) -> Self {
        Self {
            effects: Box::new(effects),
        }
    }
}

impl Update<PostState, PostEvent> for PostLogic {
    fn update(&self, state: &PostState, event: PostEvent) -> Next<PostState, PostEvent> {
        match event {
            PostEvent::DelayDone => Next::with_effect(
                PostState {
                    value: RemoteData::Loading,
                    ..state.clone()
                },
                self.effects.fetch_post(),
            ),
            PostEvent::Result(title) => Next::new(PostState {
                value: RemoteData::Fetched(title),
                ..state.clone()
            }),
            PostEvent::ButtonClicked => Next::new(PostState {
                foobar: "I've been pressed".to_string(),
                ..state.clone()
            }),
        }
    }
}

pub(crate) fn initial_post_state() -> PostState {
    PostState {
        value: RemoteData::Initial,
        foobar: "Not pressed".to_string(),
    }
}

/// Start in `Initial` and move on after one second.
pub(crate) fn delayed_post_init() -> Next<PostState, PostEvent> {
    Next::with_effect(
        initial_post_state(),
        effects::timeout(Duration::from_millis(1000), || PostEvent::DelayDone),
    )
}

/// A fetch whose result the test supplies through the returned sender.
pub(crate) fn controlled_fetch() -> (oneshot::Sender<String>, Effect<PostEvent>) {
    let (sender, receiver) = oneshot::channel();
    let effect = Effect::from_future("fetch_post", move || async move {
        PostEvent::Result(receiver.await.unwrap_or_default())
    });
    (sender, effect)
}

pub(crate) fn values(renders: &[PostState]) -> Vec<RemoteData> {
    renders.iter().map(|state| state.value.clone()).collect()
}
