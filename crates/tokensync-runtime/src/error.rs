use std::fmt;

use crate::client::SyncError;

/// Result type for tokensync-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the runtime layer
#[derive(Debug)]
pub enum Error {
    /// Checkpoint store error
    Index(tokensync_index::Error),

    /// Provider layer error
    Provider(tokensync_providers::Error),

    /// Workspace path resolution error
    Core(tokensync_core::Error),

    /// Remote sync error
    Sync(SyncError),

    /// IO operation failed
    Io(std::io::Error),

    /// Configuration error
    Config(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Index(err) => write!(f, "Checkpoint error: {}", err),
            Error::Provider(err) => write!(f, "Provider error: {}", err),
            Error::Core(err) => write!(f, "Workspace error: {}", err),
            Error::Sync(err) => write!(f, "Sync error: {}", err),
            Error::Io(err) => write!(f, "IO error: {}", err),
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Index(err) => Some(err),
            Error::Provider(err) => Some(err),
            Error::Core(err) => Some(err),
            Error::Sync(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Config(_) => None,
        }
    }
}

impl From<tokensync_index::Error> for Error {
    fn from(err: tokensync_index::Error) -> Self {
        Error::Index(err)
    }
}

impl From<tokensync_providers::Error> for Error {
    fn from(err: tokensync_providers::Error) -> Self {
        Error::Provider(err)
    }
}

impl From<tokensync_core::Error> for Error {
    fn from(err: tokensync_core::Error) -> Self {
        Error::Core(err)
    }
}

impl From<SyncError> for Error {
    fn from(err: SyncError) -> Self {
        Error::Sync(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}
