use crate::core::session::session::{FocusSession, SessionSnapshot, UserId};
use crate::core::ticker::TickerHandle;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Verdict of a transition applied through [`SessionStore::mutate`]
pub enum Transition<R> {
    /// Keep the session in the store
    Keep(R),
    /// Remove the session from the store as part of the same operation
    Finish(R),
}

/// Result of [`SessionStore::mutate`]
pub struct Applied<R> {
    pub value: R,
    /// The detached record when the transition finished the session. Its
    /// ticker is still attached; dropping the record cancels it, so the
    /// caller decides how cancellation orders against its final
    /// notification.
    pub finished: Option<FocusSession>,
}

type Slot = Arc<Mutex<Option<FocusSession>>>;

/// Process-wide registry holding at most one live session per owner.
///
/// The outer map lock only guards slot lookup, insertion and removal; every
/// transition runs under the owner's slot mutex, so operations for one owner
/// serialize while other owners' ticks and control messages proceed without
/// contention.
pub struct SessionStore {
    sessions: RwLock<HashMap<UserId, Slot>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Create a session for `owner` in the Running state with zero elapsed
    /// time, atomically superseding any existing session. The superseded
    /// session's ticker is cancelled before the new session becomes
    /// observable.
    pub async fn begin(&self, owner: &UserId, target_secs: u64, ticker: TickerHandle) -> SessionSnapshot {
        // The map lock is held across the slot lock here so a concurrent
        // `remove` cannot detach the slot between lookup and installation.
        let mut map = self.sessions.write().await;
        let slot = map.entry(owner.clone()).or_default().clone();
        let mut entry = slot.lock().await;
        if entry.is_some() {
            debug!(owner = %owner, "superseding existing session");
        }
        let session = FocusSession::new(owner.clone(), target_secs, ticker);
        let snapshot = session.snapshot();
        *entry = Some(session);
        drop(entry);
        drop(map);
        snapshot
    }

    /// Read-only lookup
    pub async fn get(&self, owner: &UserId) -> Option<SessionSnapshot> {
        let slot = self.slot(owner).await?;
        let entry = slot.lock().await;
        entry.as_ref().map(FocusSession::snapshot)
    }

    /// Atomically apply a transition to the existing session for `owner`;
    /// a no-op returning `None` when no session exists. This is the guard
    /// against races between disconnect-triggered removal and in-flight
    /// control messages or ticks.
    pub async fn mutate<R, F>(&self, owner: &UserId, transition: F) -> Option<Applied<R>>
    where
        F: FnOnce(&mut FocusSession) -> Transition<R>,
    {
        let slot = self.slot(owner).await?;
        let mut entry = slot.lock().await;
        let session = entry.as_mut()?;
        let applied = match transition(session) {
            Transition::Keep(value) => Applied { value, finished: None },
            Transition::Finish(value) => Applied {
                value,
                finished: entry.take(),
            },
        };
        let emptied = entry.is_none();
        drop(entry);
        if emptied {
            self.prune(owner, &slot).await;
        }
        Some(applied)
    }

    /// Atomically detach and return the session for `owner`, cancelling its
    /// ticker. Used by stop and disconnect cleanup.
    pub async fn remove(&self, owner: &UserId) -> Option<FocusSession> {
        let slot = self.sessions.write().await.remove(owner)?;
        let mut entry = slot.lock().await;
        let mut session = entry.take()?;
        // The caller receives a quiesced record: no callback for the old
        // ticker survives this point observably (stale ids are ignored).
        drop(session.detach_ticker());
        Some(session)
    }

    pub async fn contains(&self, owner: &UserId) -> bool {
        self.get(owner).await.is_some()
    }

    /// Number of live sessions across all owners
    pub async fn active_count(&self) -> usize {
        let slots: Vec<Slot> = self.sessions.read().await.values().cloned().collect();
        let mut count = 0;
        for slot in slots {
            if slot.lock().await.is_some() {
                count += 1;
            }
        }
        count
    }

    async fn slot(&self, owner: &UserId) -> Option<Slot> {
        self.sessions.read().await.get(owner).cloned()
    }

    /// Drop the map entry for a slot that was emptied by a Finish
    /// transition. Re-checks occupancy without blocking so a `begin` that
    /// claimed the slot in the meantime is never orphaned.
    async fn prune(&self, owner: &UserId, slot: &Slot) {
        let mut map = self.sessions.write().await;
        let still_empty = match map.get(owner) {
            Some(current) if Arc::ptr_eq(current, slot) => match current.try_lock() {
                Ok(entry) => entry.is_none(),
                Err(_) => false,
            },
            _ => false,
        };
        if still_empty {
            map.remove(owner);
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
