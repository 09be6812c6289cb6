//! Error types for ClawForge

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum CfError {
    #[error("Prize pool is empty")]
    EmptyPool,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias
pub type CfResult<T> = Result<T, CfError>;
