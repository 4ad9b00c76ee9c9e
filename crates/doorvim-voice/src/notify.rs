//! Out-of-band wakeups for the voice controller.
//!
//! vgetty only looks at its command pipe after it receives a signal, so every
//! command written by the session is followed by a notification.

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tracing::trace;

use crate::error::{Result, VoiceError};

/// Wakes the controller after a command was written.
pub trait Notifier {
    fn notify(&self) -> Result<()>;
}

/// Sends `SIGPIPE` to the controller process.
#[derive(Debug, Clone, Copy)]
pub struct SignalNotifier {
    pid: Pid,
}

impl SignalNotifier {
    pub fn new(pid: i32) -> Self {
        Self {
            pid: Pid::from_raw(pid),
        }
    }

    pub fn pid(&self) -> i32 {
        self.pid.as_raw()
    }
}

impl Notifier for SignalNotifier {
    fn notify(&self) -> Result<()> {
        trace!(pid = self.pid.as_raw(), "Signalling controller");
        signal::kill(self.pid, Signal::SIGPIPE).map_err(|source| VoiceError::Notify {
            pid: self.pid.as_raw(),
            source,
        })
    }
}
