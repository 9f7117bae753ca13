use std::time::Duration;

use futures::stream;
use tokio::time::{self, MissedTickBehavior};

use crate::{Effect, EffectResult};

/// Resolve once, after `duration`, to `msg_creator()`.
///
/// Never fires early. The deadline is fixed when the effect is started, not
/// when its task is first polled, so timeouts started together resolve in
/// order of their durations. The duration is attached as the effect's data.
///
/// Must be started inside a tokio runtime with the time driver enabled.
pub fn timeout<Event, F>(duration: Duration, msg_creator: F) -> Effect<Event>
where
    Event: Send + 'static,
    F: FnOnce() -> Event + Send + 'static,
{
    Effect::new("timeout", move |_| {
        let sleep = time::sleep(duration);
        EffectResult::single(async move {
            sleep.await;
            msg_creator()
        })
    })
    .with_data(duration)
}

/// Emit `msg_creator(tick)` every `period`, starting one period from now.
///
/// Runs until the loop is torn down. Ticks missed under load are delayed, not
/// burst.
///
/// # Panics
///
/// When started with a zero `period`.
pub fn interval<Event, F>(period: Duration, msg_creator: F) -> Effect<Event>
where
    Event: Send + 'static,
    F: FnMut(u64) -> Event + Send + 'static,
{
    Effect::new("interval", move |_| {
        let mut ticker = time::interval_at(time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        EffectResult::stream(stream::unfold(
            (ticker, msg_creator, 0u64),
            |(mut ticker, mut msg_creator, tick)| async move {
                ticker.tick().await;
                let event = msg_creator(tick);
                Some((event, (ticker, msg_creator, tick + 1)))
            },
        ))
    })
    .with_data(period)
}
