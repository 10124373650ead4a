use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

/// Identifier of one ticker generation. Callbacks carry their handle's id so
/// a stale callback can be recognized after the handle was cancelled.
pub type TickerId = Uuid;

/// Periodic driver producing one callback per elapsed interval
pub struct Ticker;

impl Ticker {
    /// Start a periodic task invoking `on_tick` once per `interval`.
    ///
    /// Callbacks are awaited in sequence, so at most one is in flight per
    /// handle. Missed intervals are not compensated: a stalled runtime
    /// produces late single ticks, never a catch-up burst.
    pub fn start<F, Fut>(interval: Duration, on_tick: F) -> TickerHandle
    where
        F: Fn(TickerId) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let id = Uuid::new_v4();
        let interval = interval.max(Duration::from_millis(1));
        let task = tokio::spawn(async move {
            let mut clock = tokio::time::interval(interval);
            clock.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first interval tick completes immediately; consume it so
            // the first callback lands one full period after start.
            clock.tick().await;
            loop {
                clock.tick().await;
                on_tick(id).await;
            }
        });
        TickerHandle { id, task }
    }
}

/// Exclusive handle to a running ticker. Dropping the handle cancels the
/// driving task; combined with the id check at the callback's point of
/// application, no tick takes effect after cancellation.
pub struct TickerHandle {
    id: TickerId,
    task: JoinHandle<()>,
}

impl TickerHandle {
    pub fn id(&self) -> TickerId {
        self.id
    }

    /// Stop the driver. Equivalent to dropping the handle.
    pub fn cancel(self) {}
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl std::fmt::Debug for TickerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TickerHandle").field("id", &self.id).finish()
    }
}
