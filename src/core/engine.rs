use crate::core::protocol::{ControlMessage, SessionEvent};
use crate::core::session::session::{TickOutcome, UserId};
use crate::core::session::store::{SessionStore, Transition};
use crate::core::ticker::{Ticker, TickerHandle, TickerId};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Outbound notification seam. Delivery must be fire-and-forget: a slow or
/// absent recipient may never stall session processing.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn deliver(&self, owner: &UserId, event: SessionEvent);
}

/// Drives the focus session state machine. The engine is the only component
/// that creates or mutates sessions, always through the store's per-owner
/// critical section, and the only component that starts tickers.
pub struct FocusEngine {
    store: Arc<SessionStore>,
    sink: Arc<dyn EventSink>,
    tick_interval: Duration,
}

impl FocusEngine {
    pub fn new(store: Arc<SessionStore>, sink: Arc<dyn EventSink>, tick_interval: Duration) -> Self {
        Self {
            store,
            sink,
            tick_interval,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Apply one inbound control message for `owner`. Invalid transitions
    /// are silent no-ops; nothing here is fatal to the connection.
    pub async fn handle_control(self: &Arc<Self>, owner: &UserId, message: ControlMessage) {
        match message {
            ControlMessage::Start { duration } => self.start_session(owner, duration).await,
            ControlMessage::Pause => self.pause_session(owner).await,
            ControlMessage::Resume => self.resume_session(owner).await,
            ControlMessage::Stop => self.stop_session(owner).await,
        }
    }

    /// Discard the owner's session when their connection goes away. No
    /// notification: there is nobody left to deliver it to.
    pub async fn handle_disconnect(&self, owner: &UserId) {
        if let Some(session) = self.store.remove(owner).await {
            info!(
                owner = %owner,
                elapsed = session.elapsed_secs(),
                "focus session discarded on disconnect"
            );
        }
    }

    async fn start_session(self: &Arc<Self>, owner: &UserId, duration: u64) {
        if duration == 0 {
            warn!(owner = %owner, "rejected start with non-positive duration");
            return;
        }
        let ticker = self.spawn_ticker(owner);
        let snapshot = self.store.begin(owner, duration, ticker).await;
        info!(owner = %owner, duration, "focus session started");
        self.sink
            .deliver(
                owner,
                SessionEvent::Started {
                    duration: snapshot.target_secs,
                    elapsed: snapshot.elapsed_secs,
                },
            )
            .await;
    }

    async fn pause_session(&self, owner: &UserId) {
        let paused = self
            .store
            .mutate(owner, |session| Transition::Keep(session.pause()))
            .await
            .and_then(|applied| applied.value);
        if let Some(elapsed) = paused {
            info!(owner = %owner, elapsed, "focus session paused");
            self.sink.deliver(owner, SessionEvent::Paused { elapsed }).await;
        }
    }

    async fn resume_session(self: &Arc<Self>, owner: &UserId) {
        // Spawned up front; the session drops it unused when the transition
        // is invalid, which cancels it.
        let ticker = self.spawn_ticker(owner);
        let resumed = self
            .store
            .mutate(owner, |session| Transition::Keep(session.resume(ticker)))
            .await
            .and_then(|applied| applied.value);
        if let Some(elapsed) = resumed {
            info!(owner = %owner, elapsed, "focus session resumed");
            self.sink.deliver(owner, SessionEvent::Resumed { elapsed }).await;
        }
    }

    async fn stop_session(&self, owner: &UserId) {
        if let Some(session) = self.store.remove(owner).await {
            let elapsed = session.elapsed_secs();
            info!(owner = %owner, elapsed, uptime = ?session.uptime(), "focus session stopped");
            self.sink.deliver(owner, SessionEvent::Stopped { elapsed }).await;
        }
    }

    /// Ticker callback: advance the owner's session by one second. Stale
    /// callbacks (cancelled or superseded tickers, removed sessions) fall
    /// through without effect.
    async fn apply_tick(self: Arc<Self>, owner: &UserId, ticker: TickerId) {
        let applied = self
            .store
            .mutate(owner, |session| match session.apply_tick(ticker) {
                outcome @ TickOutcome::Finished { .. } => Transition::Finish(outcome),
                outcome => Transition::Keep(outcome),
            })
            .await;
        let Some(applied) = applied else {
            return;
        };
        match applied.value {
            TickOutcome::Advanced { elapsed, remaining } => {
                self.sink
                    .deliver(owner, SessionEvent::Tick { elapsed, remaining })
                    .await;
            }
            TickOutcome::Finished { duration } => {
                info!(owner = %owner, duration, "focus session completed");
                self.sink
                    .deliver(owner, SessionEvent::Completed { duration })
                    .await;
                // Dropping the finished record aborts this very ticker task;
                // everything observable has already happened by now.
                drop(applied.finished);
            }
            TickOutcome::Ignored => {}
        }
    }

    fn spawn_ticker(self: &Arc<Self>, owner: &UserId) -> TickerHandle {
        let engine = Arc::clone(self);
        let owner = owner.clone();
        Ticker::start(self.tick_interval, move |ticker| {
            let engine = Arc::clone(&engine);
            let owner = owner.clone();
            async move {
                engine.apply_tick(&owner, ticker).await;
            }
        })
    }
}
