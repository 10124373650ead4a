// Infrastructure module - configuration, logging, auth and network
pub mod auth;
pub mod config;
pub mod logging;
pub mod net;
