//! Billow Focus Mode session engine
//!
//! Tracks one live deep-work timer per authenticated user, drives it forward
//! on a wall-clock tick and pushes state changes to the owning client over a
//! persistent connection carrying newline-delimited JSON.

pub mod cli;
pub mod core;
pub mod domain;
pub mod infrastructure;

pub use crate::core::engine::{EventSink, FocusEngine};
pub use crate::core::protocol::{ClientHello, ControlMessage, SessionEvent};
pub use crate::core::session::{SessionPhase, SessionSnapshot, SessionStore, UserId};
pub use crate::core::ticker::{Ticker, TickerHandle, TickerId};
pub use crate::domain::config::FocusConfig;
pub use crate::domain::error::{FocusError, FocusResult};
pub use crate::infrastructure::auth::{IdentityVerifier, SharedSecretVerifier, VerifiedIdentity};
pub use crate::infrastructure::net::{ConnectionRegistry, FocusGateway};
