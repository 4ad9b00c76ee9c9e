use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Authentication error types.
///
/// An absent token during `revoke` or `check_and_consume` is not an error;
/// those report the absence in their return value instead.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Reading or writing a token or directory file failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Token lifetime must be positive
    #[error("Token duration must be greater than zero")]
    InvalidDuration,

    /// Token lifetime reaches past what the clock can represent
    #[error("Token duration of {seconds} seconds is too large")]
    DurationTooLarge { seconds: u64 },

    /// User directory is not valid JSON or has an unexpected shape
    #[error("Invalid user directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A user record violates the directory rules
    #[error("(In user {name}): {reason}")]
    InvalidUser { name: String, reason: String },

    /// Password contains characters that have no keypad digit
    #[error("Password must consist of only letters and numbers (found {0:?})")]
    InvalidPassword(char),
}

impl AuthError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_user(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUser {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Specialized result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
