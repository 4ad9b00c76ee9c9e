//! Inbound lines from the voice controller.

use std::fmt;

use doorvim_core::SessionState;
use doorvim_core::constants::{
    TOKEN_BEEPING, TOKEN_DIALING, TOKEN_ERROR, TOKEN_GOODBYE_SHELL, TOKEN_HELLO_SHELL,
    TOKEN_PLAYING, TOKEN_READY, TOKEN_RECEIVED_DTMF, TOKEN_SILENCE_DETECTED, TOKEN_WAITING,
};

/// One line received from the controller.
///
/// Known state tokens get their own variant. Anything else (the DTMF key
/// line that follows `RECEIVED_DTMF`, or a token this program does not know)
/// is kept verbatim as a `Payload`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Response {
    HelloShell,
    Ready,
    Playing,
    Beeping,
    Dialing,
    Waiting,
    ReceivedDtmf,
    SilenceDetected,
    Error,
    GoodbyeShell,
    Payload(String),
}

impl Response {
    /// Interpret a raw line. Surrounding whitespace is stripped.
    ///
    /// # Examples
    ///
    /// ```
    /// use doorvim_protocol::Response;
    ///
    /// assert_eq!(Response::parse("READY\n"), Response::Ready);
    /// assert_eq!(Response::parse("HELLO SHELL"), Response::HelloShell);
    /// assert_eq!(Response::parse("7"), Response::Payload("7".to_string()));
    /// ```
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            TOKEN_HELLO_SHELL => Response::HelloShell,
            TOKEN_READY => Response::Ready,
            TOKEN_PLAYING => Response::Playing,
            TOKEN_BEEPING => Response::Beeping,
            TOKEN_DIALING => Response::Dialing,
            TOKEN_WAITING => Response::Waiting,
            TOKEN_RECEIVED_DTMF => Response::ReceivedDtmf,
            TOKEN_SILENCE_DETECTED => Response::SilenceDetected,
            TOKEN_ERROR => Response::Error,
            TOKEN_GOODBYE_SHELL => Response::GoodbyeShell,
            other => Response::Payload(other.to_string()),
        }
    }

    /// The line as it appears on the wire.
    pub fn as_str(&self) -> &str {
        match self {
            Response::HelloShell => TOKEN_HELLO_SHELL,
            Response::Ready => TOKEN_READY,
            Response::Playing => TOKEN_PLAYING,
            Response::Beeping => TOKEN_BEEPING,
            Response::Dialing => TOKEN_DIALING,
            Response::Waiting => TOKEN_WAITING,
            Response::ReceivedDtmf => TOKEN_RECEIVED_DTMF,
            Response::SilenceDetected => TOKEN_SILENCE_DETECTED,
            Response::Error => TOKEN_ERROR,
            Response::GoodbyeShell => TOKEN_GOODBYE_SHELL,
            Response::Payload(line) => line,
        }
    }

    /// Session state the controller is in after sending this line.
    pub fn session_state(&self) -> SessionState {
        match self {
            Response::HelloShell => SessionState::Greeting,
            Response::Ready => SessionState::Ready,
            Response::Playing => SessionState::Playing,
            Response::Beeping => SessionState::Beeping,
            Response::Dialing => SessionState::Dialing,
            Response::Waiting => SessionState::Waiting,
            Response::ReceivedDtmf => SessionState::ReceivedDigit,
            Response::SilenceDetected => SessionState::SilenceDetected,
            Response::Error => SessionState::ErrorState,
            Response::GoodbyeShell => SessionState::Goodbye,
            Response::Payload(_) => SessionState::Payload,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
