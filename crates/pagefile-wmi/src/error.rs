//! Automation error types for the management binding layer.
//!
//! Every failure reported by the platform's management automation layer is an
//! [`AutomationError`]. Call failures carry the numeric HRESULT when one was
//! reported so callers can tell benign codes apart from real failures.

use std::fmt;

/// Well-known WBEM status codes.
pub mod codes {
    /// Generic failure.
    pub const WBEM_E_FAILED: u32 = 0x8004_1001;
    /// Object cannot be found.
    pub const WBEM_E_NOT_FOUND: u32 = 0x8004_1002;
    /// Current user does not have permission to perform the action.
    pub const WBEM_E_ACCESS_DENIED: u32 = 0x8004_1003;
    /// Object already exists.
    pub const WBEM_E_ALREADY_EXISTS: u32 = 0x8004_1019;
}

/// Errors raised by a management binding.
#[derive(Debug, thiserror::Error)]
pub enum AutomationError {
    /// An automation call returned an error.
    #[error("{operation} failed{}: {message}", HResult::display(.code))]
    Call {
        /// The automation operation that failed.
        operation: String,
        /// HRESULT reported by the automation layer, if any.
        code: Option<u32>,
        /// Message reported by the automation layer.
        message: String,
    },

    /// The binding could not be reached (interpreter missing, spawn failure).
    #[error("{operation}: {source}")]
    Io {
        /// The operation that was being attempted.
        operation: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The automation layer answered with something that could not be read.
    #[error("Unreadable automation response: {message}")]
    Parse {
        /// Description of the parse failure.
        message: String,
    },

    /// The binding is not available on this platform.
    #[error("Unsupported: {message}")]
    Unsupported {
        /// Why the binding is unavailable.
        message: String,
    },
}

impl AutomationError {
    /// Creates a new `Call` error.
    #[must_use]
    pub fn call(operation: impl Into<String>, code: Option<u32>, message: impl Into<String>) -> Self {
        Self::Call {
            operation: operation.into(),
            code,
            message: message.into(),
        }
    }

    /// Creates a new `Io` error.
    #[must_use]
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Creates a new `Parse` error.
    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Creates a new `Unsupported` error.
    #[must_use]
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }

    /// Returns the HRESULT reported by the automation layer, if any.
    #[must_use]
    pub fn code(&self) -> Option<u32> {
        match self {
            Self::Call { code, .. } => *code,
            _ => None,
        }
    }

    /// Returns `true` if the reported code is one of `benign_codes`.
    ///
    /// Only call failures with a reported code can be benign.
    #[must_use]
    pub fn is_benign(&self, benign_codes: &[u32]) -> bool {
        self.code().is_some_and(|code| benign_codes.contains(&code))
    }

    /// Returns `true` if the automation layer reported a missing object.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.code() == Some(codes::WBEM_E_NOT_FOUND)
    }
}

/// Hex rendering of an optional HRESULT.
pub struct HResult(pub u32);

impl HResult {
    fn display(code: &Option<u32>) -> String {
        code.map(|c| format!(" ({})", HResult(c))).unwrap_or_default()
    }
}

impl fmt::Display for HResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

/// Type alias for an automation result.
pub type AutomationResult<T> = Result<T, AutomationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_error_display_with_code() {
        let err = AutomationError::call("Put_", Some(codes::WBEM_E_FAILED), "Generic failure");
        assert_eq!(err.to_string(), "Put_ failed (0x80041001): Generic failure");
        assert_eq!(err.code(), Some(0x8004_1001));
    }

    #[test]
    fn test_call_error_display_without_code() {
        let err = AutomationError::call("Delete_", None, "boom");
        assert_eq!(err.to_string(), "Delete_ failed: boom");
        assert_eq!(err.code(), None);
    }

    #[test]
    fn test_benign_requires_listed_code() {
        let benign = [codes::WBEM_E_FAILED];
        assert!(AutomationError::call("Put_", Some(codes::WBEM_E_FAILED), "x").is_benign(&benign));
        assert!(!AutomationError::call("Put_", Some(codes::WBEM_E_ACCESS_DENIED), "x").is_benign(&benign));
        assert!(!AutomationError::call("Put_", None, "x").is_benign(&benign));
        assert!(!AutomationError::parse("garbage").is_benign(&benign));
    }

    #[test]
    fn test_not_found_detection() {
        assert!(AutomationError::call("Put_", Some(codes::WBEM_E_NOT_FOUND), "gone").is_not_found());
        assert!(!AutomationError::unsupported("linux").is_not_found());
    }

    #[test]
    fn test_io_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "powershell.exe");
        let err = AutomationError::io("start interpreter", io);
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().starts_with("start interpreter: "));
    }

    #[test]
    fn test_hresult_display() {
        assert_eq!(HResult(0x8004_1019).to_string(), "0x80041019");
        assert_eq!(HResult(5).to_string(), "0x00000005");
    }
}
