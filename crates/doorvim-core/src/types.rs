use crate::{Result, error::Error};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Protocol state of a voice session.
///
/// The state is the last thing the controller told us, or one of the local
/// lifecycle states (`Uninitialized`, `ErrorState`, `Disabled`). Once a
/// session reaches `ErrorState` or `Disabled` no further command is issued on
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Handles bound, handshake not yet completed.
    Uninitialized,
    /// Controller sent its greeting (`HELLO SHELL`).
    Greeting,
    /// Controller is idle (`READY`).
    Ready,
    /// Controller is playing a file (`PLAYING`).
    Playing,
    /// Controller is dialing (`DIALING`).
    Dialing,
    /// Controller is emitting a tone (`BEEPING`).
    Beeping,
    /// Controller is listening for events (`WAITING`).
    Waiting,
    /// A DTMF key was decoded; its value follows on the next line.
    ReceivedDigit,
    /// The inactivity window elapsed (`SILENCE_DETECTED`).
    SilenceDetected,
    /// A data line that is not a state token, e.g. the DTMF key itself.
    Payload,
    /// Controller acknowledged the goodbye (`GOODBYE SHELL`).
    Goodbye,
    /// Controller reported `ERROR`; the real state is unknown.
    ErrorState,
    /// Session torn down or desynchronized. Terminal.
    Disabled,
}

impl SessionState {
    /// Whether commands may still be exchanged in this state.
    ///
    /// # Examples
    ///
    /// ```
    /// use doorvim_core::SessionState;
    ///
    /// assert!(SessionState::Ready.is_enabled());
    /// assert!(!SessionState::ErrorState.is_enabled());
    /// assert!(!SessionState::Disabled.is_enabled());
    /// ```
    pub fn is_enabled(&self) -> bool {
        !matches!(self, SessionState::ErrorState | SessionState::Disabled)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            SessionState::Uninitialized => "Uninitialized",
            SessionState::Greeting => "Greeting",
            SessionState::Ready => "Ready",
            SessionState::Playing => "Playing",
            SessionState::Dialing => "Dialing",
            SessionState::Beeping => "Beeping",
            SessionState::Waiting => "Waiting",
            SessionState::ReceivedDigit => "ReceivedDigit",
            SessionState::SilenceDetected => "SilenceDetected",
            SessionState::Payload => "Payload",
            SessionState::Goodbye => "Goodbye",
            SessionState::ErrorState => "ErrorState",
            SessionState::Disabled => "Disabled",
        };
        write!(f, "{}", state_str)
    }
}

/// A single key decoded from the caller's touch-tone keypad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DtmfKey {
    /// Numeric digit (0-9).
    Digit(u8),

    /// Star key (*). Clears the code entered so far.
    Star,

    /// Hash/pound key (#). Terminates entry.
    Hash,

    /// Any other DTMF symbol (A-D, fax tones, ...). Ignored by code entry.
    Other(char),
}

impl DtmfKey {
    /// Decode a key from the character reported by the controller.
    ///
    /// # Examples
    ///
    /// ```
    /// use doorvim_core::DtmfKey;
    ///
    /// assert_eq!(DtmfKey::from_char('7'), DtmfKey::Digit(7));
    /// assert_eq!(DtmfKey::from_char('*'), DtmfKey::Star);
    /// assert_eq!(DtmfKey::from_char('#'), DtmfKey::Hash);
    /// assert_eq!(DtmfKey::from_char('A'), DtmfKey::Other('A'));
    /// ```
    pub fn from_char(c: char) -> Self {
        match c {
            '*' => DtmfKey::Star,
            '#' => DtmfKey::Hash,
            '0'..='9' => DtmfKey::Digit(c as u8 - b'0'),
            other => DtmfKey::Other(other),
        }
    }

    /// Decode a key from a payload line that must hold exactly one character.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidKey` when the line is empty or longer than one
    /// character (the first character is reported, or `'\0'` if empty).
    pub fn from_line(line: &str) -> Result<Self> {
        let mut chars = line.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Self::from_char(c)),
            (first, _) => Err(Error::InvalidKey(first.unwrap_or('\0'))),
        }
    }

    /// Get the digit value if this is a digit key.
    pub fn as_digit(&self) -> Option<u8> {
        match self {
            Self::Digit(d) => Some(*d),
            _ => None,
        }
    }

    /// The character this key is reported as on the wire.
    pub fn as_char(&self) -> char {
        match self {
            Self::Digit(d) => (b'0' + d) as char,
            Self::Star => '*',
            Self::Hash => '#',
            Self::Other(c) => *c,
        }
    }
}

impl fmt::Display for DtmfKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Outcome of a DTMF collection.
///
/// `Code("")` and `Silence` are distinct: the former means `#` was pressed
/// before any digit, the latter that the caller never pressed anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DtmfResult {
    /// Digits entered before termination, possibly empty.
    Code(String),
    /// Inactivity timeout without a keypress.
    Silence,
}

impl DtmfResult {
    /// The collected code, or `None` for silence.
    pub fn code(&self) -> Option<&str> {
        match self {
            DtmfResult::Code(code) => Some(code),
            DtmfResult::Silence => None,
        }
    }

    /// Check if this result is the silence sentinel.
    pub fn is_silence(&self) -> bool {
        matches!(self, DtmfResult::Silence)
    }
}

impl fmt::Display for DtmfResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DtmfResult::Code(code) => write!(f, "code({} digits)", code.len()),
            DtmfResult::Silence => write!(f, "silence"),
        }
    }
}
