use serde::{Deserialize, Serialize};

/// Handshake frame carrying the opaque credential. Must be the first line a
/// client sends; verification is delegated to the configured
/// [`IdentityVerifier`](crate::infrastructure::auth::IdentityVerifier).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientHello {
    pub token: String,
}

/// Inbound control message, implicitly addressed to the connection's owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlMessage {
    /// Begin a session of `duration` seconds, superseding any existing one
    Start { duration: u64 },
    /// Freeze the running timer
    Pause,
    /// Continue a paused timer from its frozen elapsed time
    Resume,
    /// End the session and discard it
    Stop,
}

/// Outbound notification pushed to the owner's connection. Delivery is
/// best-effort; events for an absent connection are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    Started { duration: u64, elapsed: u64 },
    Tick { elapsed: u64, remaining: u64 },
    Paused { elapsed: u64 },
    Resumed { elapsed: u64 },
    Stopped { elapsed: u64 },
    Completed { duration: u64 },
}

impl std::fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionEvent::Started { .. } => write!(f, "started"),
            SessionEvent::Tick { .. } => write!(f, "tick"),
            SessionEvent::Paused { .. } => write!(f, "paused"),
            SessionEvent::Resumed { .. } => write!(f, "resumed"),
            SessionEvent::Stopped { .. } => write!(f, "stopped"),
            SessionEvent::Completed { .. } => write!(f, "completed"),
        }
    }
}
