//! Controller handles taken from the process environment.
//!
//! vgetty starts the voice program with three environment variables: the
//! descriptor it writes responses to, the descriptor it reads commands from,
//! and its own pid for wakeups.

use std::env;
use std::os::fd::{BorrowedFd, FromRawFd, OwnedFd, RawFd};

use tokio::net::unix::pipe;
use tracing::debug;

use crate::error::{Result, VoiceError};
use crate::notify::SignalNotifier;
use doorvim_core::constants::{ENV_VOICE_INPUT, ENV_VOICE_OUTPUT, ENV_VOICE_PID};

/// Everything a session needs to talk to one controller.
#[derive(Debug)]
pub struct ControllerLink<R, W, N> {
    /// Lines from the controller.
    pub input: R,
    /// Lines to the controller.
    pub output: W,
    /// Wakeup after each command.
    pub notifier: N,
}

/// Link over the pipes vgetty hands to the voice program.
pub type PipeLink = ControllerLink<pipe::Receiver, pipe::Sender, SignalNotifier>;

/// Raw controller bindings before any descriptor is adopted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerBindings {
    pub input_fd: RawFd,
    pub output_fd: RawFd,
    pub pid: i32,
}

impl ControllerBindings {
    /// Read `VOICE_INPUT`, `VOICE_OUTPUT` and `VOICE_PID`.
    ///
    /// # Errors
    ///
    /// Returns `VoiceError::Binding` naming the first variable that is missing
    /// or not a number.
    pub fn from_env() -> Result<Self> {
        let bindings = Self {
            input_fd: read_var(ENV_VOICE_INPUT)?,
            output_fd: read_var(ENV_VOICE_OUTPUT)?,
            pid: read_var(ENV_VOICE_PID)?,
        };
        debug!(?bindings, "Controller bindings from environment");
        Ok(bindings)
    }

    /// Adopt the descriptors as non-blocking tokio pipes.
    ///
    /// Must be called from within a tokio runtime. Descriptors 0 to 2 are
    /// duplicated so closing the session never closes a standard stream.
    pub fn into_link(self) -> Result<PipeLink> {
        let input = pipe::Receiver::from_owned_fd(adopt_fd(ENV_VOICE_INPUT, self.input_fd)?)?;
        let output = pipe::Sender::from_owned_fd(adopt_fd(ENV_VOICE_OUTPUT, self.output_fd)?)?;

        Ok(ControllerLink {
            input,
            output,
            notifier: SignalNotifier::new(self.pid),
        })
    }
}

fn read_var(name: &'static str) -> Result<i32> {
    let value = env::var(name).map_err(|e| VoiceError::binding(name, e.to_string()))?;
    parse_binding(name, &value)
}

fn parse_binding(name: &'static str, value: &str) -> Result<i32> {
    value
        .trim()
        .parse()
        .map_err(|_| VoiceError::binding(name, format!("not a number: {value:?}")))
}

fn adopt_fd(name: &'static str, fd: RawFd) -> Result<OwnedFd> {
    if fd < 0 {
        return Err(VoiceError::binding(name, format!("negative descriptor {fd}")));
    }
    if fd <= 2 {
        // SAFETY: standard streams stay open for the life of the process.
        let borrowed = unsafe { BorrowedFd::borrow_raw(fd) };
        return Ok(borrowed.try_clone_to_owned()?);
    }
    // SAFETY: the controller passed this descriptor to us and nothing else in
    // the process owns it.
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}
