//! Core constants for the vgetty voice shell protocol.
//!
//! This module defines the protocol-level constants shared by the Doorvim
//! crates: line tokens exchanged with the voice controller, default deadlines,
//! environment variable names and keypad limits.
//!
//! # Protocol Structure
//!
//! The controller speaks a half-duplex, newline-delimited ASCII protocol.
//! Every outbound line is a verb followed by positional arguments, every
//! inbound line is a single state token (or a data line that belongs to the
//! preceding token):
//!
//! ```text
//! controller -> HELLO SHELL
//! program    -> HELLO VOICE PROGRAM
//! controller -> READY
//! program    -> WAIT 30
//! controller -> WAITING
//! controller -> RECEIVED_DTMF
//! controller -> 5
//! ```
//!
//! # Usage
//!
//! ```
//! use doorvim_core::constants::*;
//! use std::time::Duration;
//!
//! assert_eq!(TOKEN_READY, "READY");
//! let deadline = Duration::from_millis(DEFAULT_WAIT_TIMEOUT_MS);
//! assert_eq!(deadline.as_secs(), 10);
//! ```

// ============================================================================
// Inbound State Tokens
// ============================================================================

/// Greeting sent by the controller when the voice program starts.
pub const TOKEN_HELLO_SHELL: &str = "HELLO SHELL";

/// Controller is idle and accepts the next command.
pub const TOKEN_READY: &str = "READY";

/// Controller started playing an audio file.
pub const TOKEN_PLAYING: &str = "PLAYING";

/// Controller started emitting a tone.
pub const TOKEN_BEEPING: &str = "BEEPING";

/// Controller started dialing.
pub const TOKEN_DIALING: &str = "DIALING";

/// Controller is waiting (listening for events).
pub const TOKEN_WAITING: &str = "WAITING";

/// A DTMF key was decoded. The next line carries the key itself.
pub const TOKEN_RECEIVED_DTMF: &str = "RECEIVED_DTMF";

/// The inactivity window elapsed without any keypress.
pub const TOKEN_SILENCE_DETECTED: &str = "SILENCE_DETECTED";

/// The controller reports a failure. Session state is unknown afterwards.
pub const TOKEN_ERROR: &str = "ERROR";

/// Acknowledgement of `GOODBYE`.
pub const TOKEN_GOODBYE_SHELL: &str = "GOODBYE SHELL";

// ============================================================================
// Outbound Verbs
// ============================================================================

/// Identification line sent after the greeting.
pub const VERB_HELLO: &str = "HELLO";

/// Toggle automatic stop of playback on incoming events.
pub const VERB_AUTOSTOP: &str = "AUTOSTOP";

/// Enable event reporting.
pub const VERB_ENABLE: &str = "ENABLE";

/// Disable event reporting.
pub const VERB_DISABLE: &str = "DISABLE";

/// Play an audio file.
pub const VERB_PLAY: &str = "PLAY";

/// Emit a tone.
pub const VERB_BEEP: &str = "BEEP";

/// Dial a number (also used to send in-call DTMF sequences).
pub const VERB_DIAL: &str = "DIAL";

/// Wait for events for a number of seconds.
pub const VERB_WAIT: &str = "WAIT";

/// Stop the current action.
pub const VERB_STOP: &str = "STOP";

/// End the voice shell session.
pub const VERB_GOODBYE: &str = "GOODBYE";

// ============================================================================
// Deadlines
// ============================================================================

/// Default deadline for a single `receive` (milliseconds).
///
/// Short on purpose: the controller answers most commands immediately.
pub const DEFAULT_RECEIVE_TIMEOUT_MS: u64 = 1000;

/// Default deadline for `wait_for` (milliseconds).
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 10_000;

/// Default overall ceiling for `drain_until` (milliseconds).
pub const DEFAULT_DRAIN_TIMEOUT_MS: u64 = 10_000;

/// Default ceiling for an audio file to finish playing (milliseconds).
pub const DEFAULT_PLAY_TIMEOUT_MS: u64 = 120_000;

/// Base deadline for a beep to complete, before adding the tone length
/// (seconds).
pub const BEEP_BASE_TIMEOUT_SECS: u64 = 11;

/// Default DTMF inactivity window (seconds).
pub const DEFAULT_DTMF_WAIT_SECS: u32 = 30;

/// Deadline used for flush and shutdown of the output handle during teardown
/// (milliseconds).
pub const TEARDOWN_IO_TIMEOUT_MS: u64 = 500;

// ============================================================================
// Limits
// ============================================================================

/// Maximum number of digits kept for a caller-entered code.
///
/// Digits beyond this bound are dropped.
pub const MAX_CODE_DIGITS: usize = 64;

/// Maximum accepted length of a single protocol line in bytes.
pub const MAX_LINE_LENGTH: usize = 1024;

// ============================================================================
// Environment Bindings
// ============================================================================

/// File descriptor the controller writes responses to (our input).
pub const ENV_VOICE_INPUT: &str = "VOICE_INPUT";

/// File descriptor the controller reads commands from (our output).
pub const ENV_VOICE_OUTPUT: &str = "VOICE_OUTPUT";

/// Process id of the controller, used for out-of-band wakeups.
pub const ENV_VOICE_PID: &str = "VOICE_PID";

// ============================================================================
// Door Defaults
// ============================================================================

/// In-call DTMF sequence that triggers the door opener.
pub const DEFAULT_UNLOCK_SEQUENCE: &str = "#9";

/// Default lifetime of a capability token issued by the admin shell (seconds).
pub const DEFAULT_TOKEN_DURATION_SECS: u64 = 120;
