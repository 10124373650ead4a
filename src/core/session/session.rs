use crate::core::ticker::{TickerHandle, TickerId};
use serde::Serialize;
use std::time::{Duration, SystemTime};

/// Opaque owner identity a session belongs to
pub type UserId = String;

/// Live phases of a focus session. Completed and Stopped are terminal
/// outcomes reported as events; a session in a terminal state is removed
/// from the store by the operation that produced it and never observable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Running,
    Paused,
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionPhase::Running => write!(f, "Running"),
            SessionPhase::Paused => write!(f, "Paused"),
        }
    }
}

/// Result of applying a ticker callback to a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Stale or out-of-phase callback; nothing changed
    Ignored,
    /// Timer advanced one second
    Advanced { elapsed: u64, remaining: u64 },
    /// Target reached; the session must leave the store
    Finished { duration: u64 },
}

/// One user's live focus timer. Owned exclusively by the
/// [`SessionStore`](crate::core::session::store::SessionStore); all
/// transitions go through the store's per-owner critical section.
pub struct FocusSession {
    owner: UserId,
    phase: SessionPhase,
    target_secs: u64,
    elapsed_secs: u64,
    started_at: SystemTime,
    /// Present iff the session is Running
    ticker: Option<TickerHandle>,
}

impl FocusSession {
    pub(crate) fn new(owner: UserId, target_secs: u64, ticker: TickerHandle) -> Self {
        Self {
            owner,
            phase: SessionPhase::Running,
            target_secs,
            elapsed_secs: 0,
            started_at: SystemTime::now(),
            ticker: Some(ticker),
        }
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn target_secs(&self) -> u64 {
        self.target_secs
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn remaining_secs(&self) -> u64 {
        self.target_secs.saturating_sub(self.elapsed_secs)
    }

    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    /// Wall-clock time since the session was created
    pub fn uptime(&self) -> Duration {
        SystemTime::now()
            .duration_since(self.started_at)
            .unwrap_or_default()
    }

    pub(crate) fn ticker_id(&self) -> Option<TickerId> {
        self.ticker.as_ref().map(TickerHandle::id)
    }

    /// Running -> Paused. Cancels the ticker and freezes `elapsed_secs`.
    /// Returns the frozen value, or `None` when the session is not Running.
    pub(crate) fn pause(&mut self) -> Option<u64> {
        if self.phase != SessionPhase::Running {
            return None;
        }
        self.ticker = None;
        self.phase = SessionPhase::Paused;
        Some(self.elapsed_secs)
    }

    /// Paused -> Running with a fresh ticker continuing from the frozen
    /// elapsed time. When the session is not Paused the offered ticker is
    /// dropped (cancelling it) and `None` is returned.
    pub(crate) fn resume(&mut self, ticker: TickerHandle) -> Option<u64> {
        if self.phase != SessionPhase::Paused {
            return None;
        }
        self.ticker = Some(ticker);
        self.phase = SessionPhase::Running;
        Some(self.elapsed_secs)
    }

    /// Advance one second on behalf of ticker `ticker`. Callbacks from a
    /// cancelled or superseded ticker carry a mismatched id and are ignored,
    /// which is what makes cancellation race-free.
    pub(crate) fn apply_tick(&mut self, ticker: TickerId) -> TickOutcome {
        if self.phase != SessionPhase::Running {
            return TickOutcome::Ignored;
        }
        if self.ticker_id() != Some(ticker) {
            return TickOutcome::Ignored;
        }
        self.elapsed_secs += 1;
        if self.elapsed_secs >= self.target_secs {
            TickOutcome::Finished {
                duration: self.target_secs,
            }
        } else {
            TickOutcome::Advanced {
                elapsed: self.elapsed_secs,
                remaining: self.target_secs - self.elapsed_secs,
            }
        }
    }

    /// Take the ticker handle out, cancelling it when the caller drops it
    pub(crate) fn detach_ticker(&mut self) -> Option<TickerHandle> {
        self.ticker.take()
    }

    /// Cloneable read view of the session
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            owner: self.owner.clone(),
            phase: self.phase,
            target_secs: self.target_secs,
            elapsed_secs: self.elapsed_secs,
        }
    }
}

impl std::fmt::Debug for FocusSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FocusSession")
            .field("owner", &self.owner)
            .field("phase", &self.phase)
            .field("target_secs", &self.target_secs)
            .field("elapsed_secs", &self.elapsed_secs)
            .field("ticker", &self.ticker)
            .finish()
    }
}

/// Read-only view of a session returned by store lookups
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub owner: UserId,
    pub phase: SessionPhase,
    pub target_secs: u64,
    pub elapsed_secs: u64,
}

impl SessionSnapshot {
    pub fn remaining_secs(&self) -> u64 {
        self.target_secs.saturating_sub(self.elapsed_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ticker::Ticker;

    fn idle_ticker() -> TickerHandle {
        Ticker::start(Duration::from_secs(3600), |_| async {})
    }

    fn test_session(target: u64) -> FocusSession {
        FocusSession::new("user-1".to_string(), target, idle_ticker())
    }

    #[tokio::test]
    async fn test_new_session_is_running_at_zero() {
        let session = test_session(25);
        assert_eq!(session.phase(), SessionPhase::Running);
        assert_eq!(session.elapsed_secs(), 0);
        assert_eq!(session.target_secs(), 25);
        assert_eq!(session.remaining_secs(), 25);
        assert!(session.ticker_id().is_some());
    }

    #[tokio::test]
    async fn test_tick_advances_by_one() {
        let mut session = test_session(5);
        let id = session.ticker_id().unwrap();

        assert_eq!(
            session.apply_tick(id),
            TickOutcome::Advanced { elapsed: 1, remaining: 4 }
        );
        assert_eq!(
            session.apply_tick(id),
            TickOutcome::Advanced { elapsed: 2, remaining: 3 }
        );
        assert_eq!(session.elapsed_secs(), 2);
    }

    #[tokio::test]
    async fn test_tick_finishes_at_target() {
        let mut session = test_session(3);
        let id = session.ticker_id().unwrap();

        session.apply_tick(id);
        session.apply_tick(id);
        assert_eq!(session.apply_tick(id), TickOutcome::Finished { duration: 3 });
        assert_eq!(session.elapsed_secs(), session.target_secs());
    }

    #[tokio::test]
    async fn test_stale_ticker_id_is_ignored() {
        let mut session = test_session(10);
        let stale = Ticker::start(Duration::from_secs(3600), |_| async {});
        let stale_id = stale.id();
        stale.cancel();

        assert_eq!(session.apply_tick(stale_id), TickOutcome::Ignored);
        assert_eq!(session.elapsed_secs(), 0);
    }

    #[tokio::test]
    async fn test_pause_freezes_and_detaches_ticker() {
        let mut session = test_session(60);
        let id = session.ticker_id().unwrap();
        session.apply_tick(id);
        session.apply_tick(id);

        assert_eq!(session.pause(), Some(2));
        assert_eq!(session.phase(), SessionPhase::Paused);
        assert!(session.ticker_id().is_none());

        // Ticks from the cancelled ticker no longer apply.
        assert_eq!(session.apply_tick(id), TickOutcome::Ignored);
        assert_eq!(session.elapsed_secs(), 2);

        // Pausing twice is a no-op.
        assert_eq!(session.pause(), None);
    }

    #[tokio::test]
    async fn test_resume_continues_from_frozen_elapsed() {
        let mut session = test_session(60);
        let first = session.ticker_id().unwrap();
        session.apply_tick(first);
        session.pause();

        let replacement = idle_ticker();
        let new_id = replacement.id();
        assert_eq!(session.resume(replacement), Some(1));
        assert_eq!(session.phase(), SessionPhase::Running);
        assert_eq!(session.ticker_id(), Some(new_id));

        assert_eq!(
            session.apply_tick(new_id),
            TickOutcome::Advanced { elapsed: 2, remaining: 58 }
        );
    }

    #[tokio::test]
    async fn test_resume_while_running_is_ignored() {
        let mut session = test_session(60);
        let original = session.ticker_id().unwrap();

        assert_eq!(session.resume(idle_ticker()), None);
        // The original ticker stays installed.
        assert_eq!(session.ticker_id(), Some(original));
    }

    #[tokio::test]
    async fn test_pause_while_paused_keeps_elapsed() {
        let mut session = test_session(30);
        let id = session.ticker_id().unwrap();
        session.apply_tick(id);
        session.pause();

        assert_eq!(session.pause(), None);
        assert_eq!(session.elapsed_secs(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_reflects_state() {
        let mut session = test_session(10);
        let id = session.ticker_id().unwrap();
        session.apply_tick(id);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.owner, "user-1");
        assert_eq!(snapshot.phase, SessionPhase::Running);
        assert_eq!(snapshot.elapsed_secs, 1);
        assert_eq!(snapshot.remaining_secs(), 9);
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(SessionPhase::Running.to_string(), "Running");
        assert_eq!(SessionPhase::Paused.to_string(), "Paused");
    }
}
