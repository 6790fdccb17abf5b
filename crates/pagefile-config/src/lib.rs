//! # pagefile-config
//!
//! Runtime configuration for the `pagefile` tool and the manifest format that
//! declares page files.
//!
//! Settings come from `pagefile.toml` (or an explicit path) with
//! `PAGEFILE__SECTION__KEY` environment overrides, for example
//! `PAGEFILE__PROVIDER__PATH_CASE=lowercase`.

mod manifest;
mod settings;

pub mod loader;

pub use manifest::Manifest;
pub use settings::{AppConfig, BackendConfig, BackendKind, LoggingConfig, ProviderSettings};

/// Error types for configuration operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {}: {source}", .path.display())]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Manifest error: {0}")]
    Manifest(#[from] pagefile_core::CoreError),
}

impl ConfigError {
    pub fn io(path: impl Into<std::path::PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
