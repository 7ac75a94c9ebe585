//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::platform::AdapterError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),

    #[error("invalid [[platform]] entry")]
    Platform(#[from] AdapterError),
}
