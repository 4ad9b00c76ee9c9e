//! Error types for voice session operations.
//!
//! The variants follow how much the session can still be trusted afterwards:
//! a `Timeout` leaves the protocol state untouched and lets the caller decide,
//! while `Controller`, `UnexpectedState`, `ConnectionLost` and codec errors
//! leave the session disabled.

use nix::errno::Errno;

use doorvim_protocol::Response;

/// Result type alias for voice session operations.
pub type Result<T> = std::result::Result<T, VoiceError>;

/// Errors that can occur while talking to the voice controller.
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    /// No response arrived before the deadline.
    #[error("Timeout after {duration_ms}ms while waiting for controller response")]
    Timeout { duration_ms: u64 },

    /// The controller sent `ERROR`.
    #[error("Voice controller reported an error")]
    Controller,

    /// A valid response that is not acceptable at this step.
    #[error("Expected one of {expected:?}, got '{actual}'")]
    UnexpectedState {
        expected: Vec<String>,
        actual: String,
    },

    /// The session is torn down or in an unknown state.
    #[error("Voice session is disabled")]
    Disabled,

    /// The opening handshake did not complete.
    #[error("Handshake failed while {stage}: {source}")]
    Protocol {
        stage: &'static str,
        #[source]
        source: Box<VoiceError>,
    },

    /// The controller closed its end of the pipe.
    #[error("Voice controller closed the connection")]
    ConnectionLost,

    /// A line could not be encoded or decoded.
    #[error("Codec error: {0}")]
    Codec(#[from] doorvim_core::Error),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The out-of-band wakeup could not be delivered.
    #[error("Failed to notify controller process {pid}: {source}")]
    Notify {
        pid: i32,
        #[source]
        source: Errno,
    },

    /// An environment binding is missing or malformed.
    #[error("Invalid controller binding {name}: {reason}")]
    Binding { name: &'static str, reason: String },
}

impl VoiceError {
    /// Create a timeout error.
    pub fn timeout(duration: std::time::Duration) -> Self {
        Self::Timeout {
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Create an unexpected state error from the accepted set and the actual
    /// response.
    pub fn unexpected(expected: &[Response], actual: &Response) -> Self {
        Self::UnexpectedState {
            expected: expected.iter().map(|r| r.as_str().to_string()).collect(),
            actual: actual.as_str().to_string(),
        }
    }

    /// Wrap a failure that happened during the handshake.
    pub fn protocol(stage: &'static str, source: VoiceError) -> Self {
        Self::Protocol {
            stage,
            source: Box::new(source),
        }
    }

    /// Create a binding error.
    pub fn binding(name: &'static str, reason: impl Into<String>) -> Self {
        Self::Binding {
            name,
            reason: reason.into(),
        }
    }

    /// Check if this is a deadline expiry.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
