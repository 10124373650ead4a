// Session module - focus session record and registry
pub mod session;
pub mod store;

pub use session::{FocusSession, SessionPhase, SessionSnapshot, TickOutcome, UserId};
pub use store::{Applied, SessionStore, Transition};
