// Logging module - tracing subscriber setup
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use std::io;

/// Initialize the logging system. `RUST_LOG` takes precedence over the
/// configured level; repeated initialization (tests) is harmless.
pub fn init_logging(level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("billow_focusd={},warn", level)));

    let result = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .try_init();

    if result.is_ok() {
        tracing::info!("billow-focusd logging initialized");
    }
    Ok(())
}
