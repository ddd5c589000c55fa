use thiserror::Error;

/// Main error type for the companion daemon
#[derive(Error, Debug)]
pub enum MipmeshError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid broadcast address: {0}")]
    InvalidAddress(#[from] std::net::AddrParseError),

    // Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for MipmeshError
pub type Result<T> = std::result::Result<T, MipmeshError>;
