//! Resource adapter error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by resource adapters
#[derive(Error, Debug)]
pub enum CloudError {
    /// Malformed input, illegal field combination or malformed identity key
    #[error("Validation error: {0}")]
    Validation(String),

    /// The remote entity does not exist
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// Any other remote-call failure, with the remote detail embedded
    #[error("API error: {0}")]
    ApiError(String),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CloudError {
    pub fn validation(message: impl Into<String>) -> Self {
        CloudError::Validation(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, CloudError::ResourceNotFound(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, CloudError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;
