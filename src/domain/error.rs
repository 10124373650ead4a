use thiserror::Error;

/// Focus daemon unified error type
#[derive(Error, Debug)]
pub enum FocusError {
    #[error("Network error: {0}")]
    Network(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Output error: {0}")]
    Output(String),
}

pub type FocusResult<T> = Result<T, FocusError>;
