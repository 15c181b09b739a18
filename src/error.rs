//! Error types shared by the native capture and windowing backends.

use thiserror::Error;

/// Failure reported by a native backend call.
///
/// Only success vs. failure carries meaning; the raw status is kept for
/// diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("{operation} failed (status {status:#010x})")]
    Status { operation: &'static str, status: i32 },

    #[error("{operation} did not return a usable handle")]
    NullHandle { operation: &'static str },

    #[error("{operation}: invalid argument ({detail})")]
    InvalidArgument {
        operation: &'static str,
        detail: String,
    },

    #[error("{operation} called on a closed handle")]
    Closed { operation: &'static str },
}

impl BackendError {
    /// Name of the native operation that failed.
    pub fn operation(&self) -> &'static str {
        match self {
            BackendError::Status { operation, .. }
            | BackendError::NullHandle { operation }
            | BackendError::InvalidArgument { operation, .. }
            | BackendError::Closed { operation } => operation,
        }
    }
}

#[cfg(windows)]
impl BackendError {
    /// Maps a `windows` crate error onto the status variant.
    pub fn from_win32(operation: &'static str, error: &windows::core::Error) -> Self {
        BackendError::Status {
            operation,
            status: error.code().0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_operation() {
        let err = BackendError::Status {
            operation: "set_position",
            status: 1,
        };
        assert_eq!(err.to_string(), "set_position failed (status 0x00000001)");
        assert_eq!(err.operation(), "set_position");
    }

    #[test]
    fn test_closed_display() {
        let err = BackendError::Closed { operation: "update" };
        assert_eq!(err.to_string(), "update called on a closed handle");
    }
}
