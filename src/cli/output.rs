use crate::cli::args::OutputFormat;
use crate::domain::config::FocusConfig;
use std::io;

/// Output writer trait for different formats
pub trait OutputWriter {
    fn write_config(&self, config: &FocusConfig) -> Result<(), OutputError>;
    fn write_message(&self, message: &str) -> Result<(), OutputError>;
    fn write_error(&self, error: &str) -> Result<(), OutputError>;
}

/// Output formatting errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("TOML serialization error: {0}")]
    TomlError(#[from] toml::ser::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

impl From<OutputError> for crate::domain::error::FocusError {
    fn from(err: OutputError) -> Self {
        Self::Output(err.to_string())
    }
}

/// Console output writer
pub struct ConsoleWriter {
    format: OutputFormat,
}

impl ConsoleWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }
}

impl OutputWriter for ConsoleWriter {
    fn write_config(&self, config: &FocusConfig) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Text => {
                print!("{}", toml::to_string_pretty(config)?);
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(config)?);
            }
        }
        Ok(())
    }

    fn write_message(&self, message: &str) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Text => println!("{}", message),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({ "message": message }));
            }
        }
        Ok(())
    }

    fn write_error(&self, error: &str) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Text => eprintln!("Error: {}", error),
            OutputFormat::Json => {
                eprintln!("{}", serde_json::json!({ "error": error }));
            }
        }
        Ok(())
    }
}
