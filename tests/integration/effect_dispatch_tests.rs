use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream;
use oak_loop::{
    create_test_spawner, effects, CancelToken, Effect, EffectResult, LoopStatus, Next,
    TestLoopRuntime, TestRenderer, TokioSpawner,
};
use parking_lot::Mutex;

use super::advance;

#[derive(Clone, Debug, PartialEq)]
enum CounterEvent {
    Tick,
    Same,
    Done,
}

#[derive(Clone, Debug, PartialEq)]
struct CounterState {
    ticks: u32,
    done: bool,
}

fn counting_effect(calls: &Arc<AtomicUsize>) -> Effect<CounterEvent> {
    let calls = calls.clone();
    Effect::new("count", move |_| {
        calls.fetch_add(1, Ordering::SeqCst);
        EffectResult::stream(stream::empty())
    })
}

#[tokio::test(start_paused = true)]
async fn given_a_pending_initial_effect_when_events_arrive_should_still_run_it_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let init = Next::with_effect(
        CounterState { ticks: 0, done: false },
        Effect::new("slow", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            EffectResult::single(async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                CounterEvent::Done
            })
        }),
    );
    let update = |state: &CounterState, event: CounterEvent| match event {
        CounterEvent::Tick => Next::new(CounterState {
            ticks: state.ticks + 1,
            ..state.clone()
        }),
        CounterEvent::Done => Next::new(CounterState {
            done: true,
            ..state.clone()
        }),
        CounterEvent::Same => Next::new(state.clone()),
    };

    let mut driver = TestLoopRuntime::new(update, init, TestRenderer::new(), TokioSpawner).run();
    for _ in 0..3 {
        driver.dispatch().dispatch(CounterEvent::Tick);
    }
    driver.process_events();
    advance(600).await;
    driver.process_events();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(driver.state(), &CounterState { ticks: 3, done: true });
}

#[test]
fn given_each_step_returns_an_effect_should_run_one_thunk_per_step() {
    let calls = Arc::new(AtomicUsize::new(0));
    let effect_calls = calls.clone();
    let update = move |state: &CounterState, _: CounterEvent| {
        Next::with_effect(
            CounterState {
                ticks: state.ticks + 1,
                ..state.clone()
            },
            counting_effect(&effect_calls),
        )
    };

    let mut driver = TestLoopRuntime::new(
        update,
        Next::new(CounterState { ticks: 0, done: false }),
        TestRenderer::new(),
        create_test_spawner(),
    )
    .run();
    for _ in 0..4 {
        driver.dispatch().dispatch(CounterEvent::Tick);
    }
    driver.process_events();

    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[test]
fn given_an_unchanged_state_should_skip_the_render_but_still_start_the_effect() {
    let calls = Arc::new(AtomicUsize::new(0));
    let effect_calls = calls.clone();
    let update = move |state: &CounterState, _: CounterEvent| {
        Next::with_effect(state.clone(), counting_effect(&effect_calls))
    };
    let renderer = TestRenderer::new();

    let mut driver = TestLoopRuntime::new(
        update,
        Next::new(CounterState { ticks: 0, done: false }),
        renderer.clone(),
        create_test_spawner(),
    )
    .run();
    driver.dispatch().dispatch(CounterEvent::Same);

    assert_eq!(driver.process_events(), 1);
    assert_eq!(renderer.count(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn given_an_unmount_before_the_timeout_fires_should_drop_its_event() {
    let renderer = TestRenderer::new();
    let update = |state: &CounterState, _: CounterEvent| {
        Next::new(CounterState {
            done: true,
            ..state.clone()
        })
    };
    let init = Next::with_effect(
        CounterState { ticks: 0, done: false },
        effects::timeout(Duration::from_millis(100), || CounterEvent::Done),
    );

    let mut driver = TestLoopRuntime::new(update, init, renderer.clone(), TokioSpawner).run();
    advance(50).await;
    driver.unmount();
    advance(100).await;

    assert_eq!(driver.process_events(), 0);
    assert_eq!(driver.runtime().status(), LoopStatus::TornDown);
    assert_eq!(renderer.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn given_an_interval_should_tick_until_unmounted() {
    let ticks = Arc::new(AtomicUsize::new(0));
    let counter = ticks.clone();
    let update = |state: &CounterState, _: CounterEvent| {
        Next::new(CounterState {
            ticks: state.ticks + 1,
            ..state.clone()
        })
    };
    let init = Next::with_effect(
        CounterState { ticks: 0, done: false },
        effects::interval(Duration::from_millis(10), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            CounterEvent::Tick
        }),
    );

    let mut driver = TestLoopRuntime::new(update, init, TestRenderer::new(), TokioSpawner).run();
    advance(35).await;
    driver.process_events();
    assert_eq!(driver.state().ticks, 3);

    driver.unmount();
    advance(100).await;

    assert_eq!(ticks.load(Ordering::SeqCst), 3);
    assert_eq!(driver.process_events(), 0);
}

#[tokio::test(start_paused = true)]
async fn given_an_unmount_should_cancel_the_token_handed_to_effects() {
    let seen: Arc<Mutex<Option<CancelToken>>> = Arc::default();
    let slot = seen.clone();
    let init = Next::with_effect(
        CounterState { ticks: 0, done: false },
        Effect::new("watch", move |token: CancelToken| {
            *slot.lock() = Some(token);
            EffectResult::stream(stream::pending())
        }),
    );
    let update = |state: &CounterState, _: CounterEvent| Next::new(state.clone());

    let mut driver = TestLoopRuntime::new(update, init, TestRenderer::new(), TokioSpawner).run();
    let token = seen.lock().clone().expect("thunk ran on start");
    assert!(!token.is_cancelled());

    driver.unmount();

    assert!(token.is_cancelled());
    token.cancelled().await;
}
