use crate::core::engine::FocusEngine;
use crate::core::protocol::{ClientHello, ControlMessage};
use crate::domain::error::{FocusError, FocusResult};
use crate::infrastructure::auth::IdentityVerifier;
use crate::infrastructure::net::registry::ConnectionRegistry;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Terminates persistent client connections and bridges the wire protocol to
/// the session engine. One connection per verified identity; control
/// messages flow in, session events flow out as newline-delimited JSON.
pub struct FocusGateway {
    listener: TcpListener,
    local_addr: SocketAddr,
    engine: Arc<FocusEngine>,
    registry: Arc<ConnectionRegistry>,
    verifier: Arc<dyn IdentityVerifier>,
    handshake_timeout: Duration,
}

impl FocusGateway {
    pub async fn bind(
        addr: &str,
        engine: Arc<FocusEngine>,
        registry: Arc<ConnectionRegistry>,
        verifier: Arc<dyn IdentityVerifier>,
        handshake_timeout: Duration,
    ) -> FocusResult<Self> {
        let listener = TcpListener::bind(addr).await.map_err(|e| FocusError::Config {
            message: format!("Failed to bind gateway to {}: {}", addr, e),
        })?;
        let local_addr = listener.local_addr()?;
        Ok(Self {
            listener,
            local_addr,
            engine,
            registry,
            verifier,
            handshake_timeout,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accept connections until the task is cancelled
    pub async fn run(self) -> FocusResult<()> {
        info!(addr = %self.local_addr, "focus gateway listening");
        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!(error = %e, "failed to accept connection");
                    continue;
                }
            };
            let engine = Arc::clone(&self.engine);
            let registry = Arc::clone(&self.registry);
            let verifier = Arc::clone(&self.verifier);
            let handshake_timeout = self.handshake_timeout;
            tokio::spawn(async move {
                if let Err(e) =
                    handle_connection(engine, registry, verifier, handshake_timeout, stream, peer).await
                {
                    debug!(peer = %peer, error = %e, "connection closed");
                }
            });
        }
    }
}

async fn handle_connection(
    engine: Arc<FocusEngine>,
    registry: Arc<ConnectionRegistry>,
    verifier: Arc<dyn IdentityVerifier>,
    handshake_timeout: Duration,
    stream: TcpStream,
    peer: SocketAddr,
) -> FocusResult<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    // Handshake: the first line must carry the credential. Failures close
    // the connection with no session side effects.
    let first = tokio::time::timeout(handshake_timeout, lines.next_line())
        .await
        .map_err(|_| FocusError::Protocol("handshake timed out".to_string()))??
        .ok_or_else(|| FocusError::Protocol("connection closed before handshake".to_string()))?;
    let hello: ClientHello = serde_json::from_str(&first)
        .map_err(|e| FocusError::Protocol(format!("invalid handshake: {}", e)))?;
    let identity = match verifier.verify(&hello.token).await {
        Ok(identity) => identity,
        Err(e) => {
            warn!(peer = %peer, error = %e, "rejected connection");
            return Err(e);
        }
    };
    let owner = identity.user_id;

    let (sender, mut events) = mpsc::unbounded_channel();
    let conn = registry.attach(&owner, sender).await;
    info!(owner = %owner, peer = %peer, conn, "client connected");

    // Writer task: drains the event channel onto the socket. A slow client
    // backs up only its own channel; the engine never waits on it.
    let writer_owner = owner.clone();
    let write_task = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let mut line = match serde_json::to_string(&event) {
                Ok(line) => line,
                Err(e) => {
                    warn!(owner = %writer_owner, error = %e, "failed to encode event");
                    continue;
                }
            };
            line.push('\n');
            if writer.write_all(line.as_bytes()).await.is_err() {
                debug!(owner = %writer_owner, "event write failed");
                break;
            }
        }
    });

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<ControlMessage>(line) {
                    Ok(message) => engine.handle_control(&owner, message).await,
                    Err(e) => {
                        debug!(owner = %owner, error = %e, "ignoring malformed control message");
                    }
                }
            }
            Ok(None) => {
                info!(owner = %owner, conn, "client disconnected");
                break;
            }
            Err(e) => {
                warn!(owner = %owner, conn, error = %e, "connection read error");
                break;
            }
        }
    }

    // Only the connection that still owns the registration cleans up the
    // session; a superseded connection just goes away.
    if registry.detach(&owner, conn).await {
        engine.handle_disconnect(&owner).await;
    }
    write_task.abort();
    Ok(())
}
