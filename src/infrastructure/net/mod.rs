// Net module - TCP gateway and connection registry
pub mod gateway;
pub mod registry;

pub use gateway::FocusGateway;
pub use registry::{ConnectionId, ConnectionRegistry};
