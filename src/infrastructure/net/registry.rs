use crate::core::engine::EventSink;
use crate::core::protocol::SessionEvent;
use crate::core::session::UserId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, RwLock};
use tracing::debug;

pub type ConnectionId = u64;

struct ConnectionEntry {
    id: ConnectionId,
    sender: mpsc::UnboundedSender<SessionEvent>,
}

/// Maps each owner to their single live connection's outbound channel.
/// A later connection for the same owner replaces the earlier one; delivery
/// to an absent or closed connection is dropped silently.
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<UserId, ConnectionEntry>>,
    counter: AtomicU64,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            counter: AtomicU64::new(0),
        }
    }

    /// Register `sender` as the owner's live connection, superseding any
    /// previous registration. Returns the connection id needed to detach.
    pub async fn attach(&self, owner: &UserId, sender: mpsc::UnboundedSender<SessionEvent>) -> ConnectionId {
        let id = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let previous = self
            .connections
            .write()
            .await
            .insert(owner.clone(), ConnectionEntry { id, sender });
        if previous.is_some() {
            debug!(owner = %owner, conn = id, "replaced existing connection");
        }
        id
    }

    /// Remove the registration, but only when `id` is still the live
    /// connection. A superseded connection's teardown must not tear down
    /// its successor.
    pub async fn detach(&self, owner: &UserId, id: ConnectionId) -> bool {
        let mut connections = self.connections.write().await;
        match connections.get(owner) {
            Some(entry) if entry.id == id => {
                connections.remove(owner);
                true
            }
            _ => false,
        }
    }

    pub async fn is_attached(&self, owner: &UserId) -> bool {
        self.connections.read().await.contains_key(owner)
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }
}

#[async_trait]
impl EventSink for ConnectionRegistry {
    async fn deliver(&self, owner: &UserId, event: SessionEvent) {
        let connections = self.connections.read().await;
        match connections.get(owner) {
            Some(entry) => {
                if entry.sender.send(event).is_err() {
                    debug!(owner = %owner, "dropping event for closed connection");
                }
            }
            None => {
                debug!(owner = %owner, "dropping event for absent connection");
            }
        }
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
