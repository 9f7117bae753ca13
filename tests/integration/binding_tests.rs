use std::time::Duration;

use oak_loop::{
    use_loop, Binding, Dispatch, Init, LoopError, LoopOptions, LoopRuntime, LoopStatus, Next,
    TestRenderer, TokioSpawner,
};
use tokio::time::timeout;

use super::{
    delayed_post_init, init_tracing, MockPostEffects, PostEvent, PostLogic, RecordingObserver,
};

fn add(total: &i64, amount: i64) -> Next<i64, i64> {
    Next::new(total + amount)
}

#[tokio::test]
async fn given_a_running_loop_when_dispatching_should_render_the_published_state() {
    init_tracing();
    let renderer = TestRenderer::new();
    let (mut binding, mut runtime) = use_loop(
        add,
        Next::new(0),
        LoopOptions::new().log(true),
        TokioSpawner,
        renderer.clone(),
    )
    .unwrap();
    let task = tokio::spawn(async move { runtime.run().await });

    binding.dispatch().dispatch(5);
    assert!(timeout(Duration::from_secs(5), binding.changed()).await.unwrap());

    assert_eq!(binding.state(), &5);
    renderer.with_renders(|renders| assert_eq!(renders, &vec![0, 5]));

    binding.unmount();
    assert_eq!(task.await.unwrap(), Ok(()));
}

#[tokio::test]
async fn given_an_unmount_should_end_the_run_loop_and_close_the_state_channel() {
    let (binding, mut runtime) = use_loop(
        add,
        Next::new(0),
        LoopOptions::default(),
        TokioSpawner,
        TestRenderer::new(),
    )
    .unwrap();
    let dispatch = binding.dispatch().clone();
    let subscription = runtime.subscribe();
    assert_eq!(subscription.try_next(), Some(0));

    let task = tokio::spawn(async move {
        let result = runtime.run().await;
        (result, runtime.status())
    });
    binding.unmount();

    let (result, status) = timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
    assert_eq!(result, Ok(()));
    assert_eq!(status, LoopStatus::TornDown);

    dispatch.dispatch(1);
    assert!(subscription.next().await.is_none());
    assert!(subscription.is_closed());
}

#[test]
fn given_a_deferred_init_should_evaluate_it_once_on_mount() {
    let calls = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = calls.clone();
    let init = Init::deferred(move || {
        counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Next::new(10)
    });

    let (binding, _runtime) = use_loop(
        add,
        init,
        LoopOptions::default(),
        oak_loop::create_test_spawner(),
        TestRenderer::new(),
    )
    .unwrap();

    assert_eq!(binding.state(), &10);
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[test]
fn given_a_torn_down_runtime_when_mounting_should_fail() {
    let mut runtime = LoopRuntime::new(
        add,
        Next::new(0),
        oak_loop::create_test_spawner(),
        LoopOptions::default(),
    );
    runtime.teardown();

    let result = Binding::attach(&mut runtime, TestRenderer::new());

    assert!(matches!(result, Err(LoopError::TornDown)));
}

#[tokio::test]
async fn given_a_closure_renderer_should_receive_the_same_dispatch_handle_on_every_render() {
    let mut handles = Vec::new();
    let (mut binding, mut runtime) = use_loop(
        add,
        Next::new(0),
        LoopOptions::default(),
        TokioSpawner,
        |_: &i64, dispatch: &Dispatch<i64>| handles.push(dispatch.clone()),
    )
    .unwrap();
    let task = tokio::spawn(async move { runtime.run().await });

    binding.dispatch().dispatch(1);
    assert!(binding.changed().await);
    binding.dispatch().dispatch(2);
    assert!(binding.changed().await);
    assert_eq!(binding.state(), &3);
    drop(binding);
    task.await.unwrap().unwrap();

    assert_eq!(handles.len(), 3);
    assert!(handles.iter().all(|handle| handle.same_loop(&handles[0])));
}

#[tokio::test(start_paused = true)]
async fn given_a_custom_observer_should_see_each_event_and_its_result() {
    init_tracing();
    let (resolve, fetch) = super::controlled_fetch();
    let mut effects = MockPostEffects::new();
    effects.expect_fetch_post().return_once(move || fetch);
    let observer = RecordingObserver::default();

    let mut runtime = LoopRuntime::new(
        PostLogic::new(effects),
        delayed_post_init(),
        TokioSpawner,
        LoopOptions::new().log(true),
    )
    .with_observer(observer.clone());
    let mut binding = Binding::attach(&mut runtime, TestRenderer::new()).unwrap();
    let task = tokio::spawn(async move { runtime.run().await });

    assert!(binding.changed().await);
    resolve.send("title".to_string()).unwrap();
    assert!(binding.changed().await);

    assert_eq!(
        observer.entries()[0],
        format!("event {:?}", PostEvent::DelayDone)
    );
    assert_eq!(observer.entries().len(), 4);
    binding.unmount();
    task.await.unwrap().unwrap();
}
