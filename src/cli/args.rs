use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};

/// Command line arguments for the focus daemon
#[derive(Parser, Debug)]
#[command(
    name = "billow-focusd",
    version = env!("CARGO_PKG_VERSION"),
    about = "Focus Mode session engine for Billow",
    long_about = "Real-time deep-work timer daemon: tracks one live focus session per \
                  authenticated user and pushes state changes to the owning client over a \
                  persistent connection."
)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress log output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the focus session gateway
    Serve(ServeArgs),
    /// Configuration management commands
    Config(ConfigArgs),
    /// Mint a development token for a user
    Token(TokenArgs),
    /// Display version information
    Version,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
}

/// Gateway server arguments
#[derive(ClapArgs, Debug)]
pub struct ServeArgs {
    /// Bind address override
    #[arg(short, long)]
    pub bind: Option<String>,

    /// Port override
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Configuration management arguments
#[derive(ClapArgs, Debug)]
pub struct ConfigArgs {
    /// Configuration subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Validate a configuration file
    Validate {
        /// Configuration file path
        file: Option<String>,
    },
    /// Create a default configuration file
    Init {
        /// Write the global configuration instead of a project one
        #[arg(short, long)]
        global: bool,
    },
}

/// Development token arguments
#[derive(ClapArgs, Debug)]
pub struct TokenArgs {
    /// User id the token authenticates
    pub user: String,

    /// Token lifetime in seconds
    #[arg(short, long, default_value = "86400")]
    pub expires_in: u64,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Text
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
