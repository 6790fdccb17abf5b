use thiserror::Error;

/// Core error types for page file declarations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{message}")]
    Validation { message: String },

    #[error("Title or name must be provided")]
    MissingPath,

    #[error("Invalid value {value:?} for {property}: not an integer")]
    InvalidSize { property: String, value: String },

    #[error("Duplicate declaration: Pagefile[{path}] is already declared")]
    DuplicateDeclaration { path: String },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CoreError {
    /// Create a new Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new InvalidSize error
    pub fn invalid_size(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidSize {
            property: property.into(),
            value: value.into(),
        }
    }

    /// Create a new DuplicateDeclaration error
    pub fn duplicate_declaration(path: impl Into<String>) -> Self {
        Self::DuplicateDeclaration { path: path.into() }
    }

    /// Create a new Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Get error category for logging/reporting
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } | Self::MissingPath | Self::DuplicateDeclaration { .. } => {
                ErrorCategory::Validation
            }
            Self::InvalidSize { .. } => ErrorCategory::Type,
            Self::Configuration(_) => ErrorCategory::Configuration,
        }
    }
}

/// Error categories for reporting and classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Validation,
    Type,
    NotFound,
    Automation,
    Configuration,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Type => write!(f, "type"),
            Self::NotFound => write!(f, "not_found"),
            Self::Automation => write!(f, "automation"),
            Self::Configuration => write!(f, "configuration"),
        }
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
