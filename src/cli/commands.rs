use crate::cli::args::{Args, Command, ConfigArgs, ConfigCommand, ServeArgs, TokenArgs};
use crate::cli::output::{ConsoleWriter, OutputWriter};
use crate::core::engine::{EventSink, FocusEngine};
use crate::core::session::SessionStore;
use crate::domain::config::FocusConfig;
use crate::domain::error::{FocusError, FocusResult};
use crate::infrastructure::auth::{IdentityVerifier, SharedSecretVerifier};
use crate::infrastructure::config::{ConfigManager, AUTH_SECRET_ENV};
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::net::{ConnectionRegistry, FocusGateway};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Execute CLI command
pub async fn execute_command(args: Args) -> FocusResult<()> {
    let writer = ConsoleWriter::new(args.output.clone());

    let config_manager = ConfigManager::new()?;
    let config = if let Some(config_path) = &args.config {
        config_manager.load_config_from_path(Path::new(config_path))?
    } else {
        config_manager.load_config()?
    };

    if !args.quiet {
        setup_logging(&config, args.verbose)?;
    }

    match args.command {
        Command::Serve(serve_args) => execute_serve(serve_args, config).await,
        Command::Config(config_args) => {
            execute_config_command(config_args, &writer, &config, &config_manager)
        }
        Command::Token(token_args) => execute_token_command(token_args, &writer, &config),
        Command::Version => {
            writer.write_message(&format!("billow-focusd {}", env!("CARGO_PKG_VERSION")))?;
            Ok(())
        }
    }
}

fn setup_logging(config: &FocusConfig, verbose: bool) -> FocusResult<()> {
    let level = if verbose {
        "debug"
    } else {
        config.global.log_level.as_str()
    };
    init_logging(level).map_err(|e| FocusError::Config {
        message: format!("Failed to initialize logging: {}", e),
    })
}

async fn execute_serve(serve_args: ServeArgs, mut config: FocusConfig) -> FocusResult<()> {
    if let Some(bind) = serve_args.bind {
        config.server.bind = bind;
    }
    if let Some(port) = serve_args.port {
        config.server.port = port;
    }
    if config.auth.is_dev_secret() {
        warn!(
            "using built-in development auth secret; set {} before exposing this daemon",
            AUTH_SECRET_ENV
        );
    }

    let store = Arc::new(SessionStore::new());
    let registry = Arc::new(ConnectionRegistry::new());
    let sink: Arc<dyn EventSink> = registry.clone();
    let engine = Arc::new(FocusEngine::new(
        store,
        sink,
        Duration::from_millis(config.global.tick_interval_ms),
    ));
    let verifier: Arc<dyn IdentityVerifier> = Arc::new(SharedSecretVerifier::new(&config.auth.secret));

    let gateway = FocusGateway::bind(
        &config.server.addr(),
        engine,
        registry,
        verifier,
        Duration::from_millis(config.global.handshake_timeout_ms),
    )
    .await?;

    tokio::select! {
        result = gateway.run() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received, closing gateway");
            Ok(())
        }
    }
}

fn execute_config_command(
    config_args: ConfigArgs,
    writer: &ConsoleWriter,
    config: &FocusConfig,
    config_manager: &ConfigManager,
) -> FocusResult<()> {
    match config_args.command {
        ConfigCommand::Show => {
            writer.write_config(config)?;
            Ok(())
        }
        ConfigCommand::Validate { file } => {
            let path = match &file {
                Some(file) => Path::new(file).to_path_buf(),
                None => match config_manager.get_project_config_path() {
                    Some(path) => path.clone(),
                    None => config_manager.get_global_config_path_ref().clone(),
                },
            };
            config_manager.load_config_from_path(&path)?;
            writer.write_message(&format!("Configuration {} is valid", path.display()))?;
            Ok(())
        }
        ConfigCommand::Init { global } => {
            let written = if global {
                config_manager.init_global_config()?
            } else {
                let current_dir = std::env::current_dir().map_err(|e| FocusError::Config {
                    message: format!("Could not determine current directory: {}", e),
                })?;
                config_manager.init_project_config(&current_dir)?
            };
            writer.write_message(&format!("Wrote default configuration to {}", written.display()))?;
            Ok(())
        }
    }
}

fn execute_token_command(
    token_args: TokenArgs,
    writer: &ConsoleWriter,
    config: &FocusConfig,
) -> FocusResult<()> {
    if token_args.expires_in == 0 {
        return Err(FocusError::InvalidInput(
            "token lifetime must be a positive number of seconds".to_string(),
        ));
    }
    let verifier = SharedSecretVerifier::new(&config.auth.secret);
    let token = verifier.issue(&token_args.user, Duration::from_secs(token_args.expires_in))?;
    writer.write_message(&token)?;
    Ok(())
}
