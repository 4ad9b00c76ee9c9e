//! Session lifecycle for one call.
//!
//! A [`SessionChannel`] owns the controller link from the handshake until
//! teardown. It is an ordinary value: the host constructs it, passes it by
//! `&mut` to whatever needs to talk to the controller, and closes it.
//!
//! # Lifecycle
//!
//! ```text
//! open() ──> HELLO SHELL / HELLO VOICE PROGRAM / READY [/ AUTOSTOP ON / READY]
//!    │
//!    ├─> protocol operations (send, receive, play, ...)
//!    │
//! close() ──> GOODBYE / GOODBYE SHELL (if still enabled) ──> release handles
//! ```
//!
//! [`SessionChannel::with_session`] wraps the three steps so teardown runs on
//! every exit path of the body.
//!
//! # Failure Model
//!
//! Once the session is disabled (error token, unexpected line, lost link or
//! explicit close) every operation fails with `VoiceError::Disabled` before
//! touching the handles. There is no way back to an enabled state.

use std::time::Duration;

use futures::SinkExt;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info, warn};

use crate::bindings::ControllerLink;
use crate::error::{Result, VoiceError};
use crate::notify::Notifier;
use doorvim_core::SessionState;
use doorvim_core::constants::{
    DEFAULT_DRAIN_TIMEOUT_MS, DEFAULT_PLAY_TIMEOUT_MS, DEFAULT_RECEIVE_TIMEOUT_MS,
    DEFAULT_WAIT_TIMEOUT_MS, TEARDOWN_IO_TIMEOUT_MS,
};
use doorvim_protocol::{Command, Response, VoiceCodec};

/// Deadlines and modes for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Deadline for a single `receive` when the caller gives none.
    pub receive_timeout: Duration,
    /// Deadline for `wait_for`.
    pub wait_timeout: Duration,
    /// Overall ceiling for `drain_until`.
    pub drain_timeout: Duration,
    /// Ceiling for an audio file to finish playing.
    pub play_timeout: Duration,
    /// Send `AUTOSTOP ON` during the handshake, and restore it after DTMF
    /// collection.
    pub autostop: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            receive_timeout: Duration::from_millis(DEFAULT_RECEIVE_TIMEOUT_MS),
            wait_timeout: Duration::from_millis(DEFAULT_WAIT_TIMEOUT_MS),
            drain_timeout: Duration::from_millis(DEFAULT_DRAIN_TIMEOUT_MS),
            play_timeout: Duration::from_millis(DEFAULT_PLAY_TIMEOUT_MS),
            autostop: true,
        }
    }
}

/// Framed halves of the controller link.
pub(crate) struct SessionIo<R, W> {
    pub(crate) reader: FramedRead<R, VoiceCodec>,
    pub(crate) writer: FramedWrite<W, VoiceCodec>,
}

/// The single session with the voice controller for one call.
pub struct SessionChannel<R, W, N> {
    /// `None` once the handles were released.
    pub(crate) io: Option<SessionIo<R, W>>,
    pub(crate) notifier: N,
    pub(crate) state: SessionState,
    pub(crate) last_response: Option<Response>,
    pub(crate) config: SessionConfig,
}

impl<R, W, N> SessionChannel<R, W, N>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    N: Notifier,
{
    /// Bind the link and run the handshake.
    ///
    /// # Errors
    ///
    /// Returns `VoiceError::Protocol` naming the handshake stage that failed.
    /// The handles are released before returning.
    pub async fn open(link: ControllerLink<R, W, N>, config: SessionConfig) -> Result<Self> {
        let mut session = Self {
            io: Some(SessionIo {
                reader: FramedRead::new(link.input, VoiceCodec::new()),
                writer: FramedWrite::new(link.output, VoiceCodec::new()),
            }),
            notifier: link.notifier,
            state: SessionState::Uninitialized,
            last_response: None,
            config,
        };

        match session.handshake().await {
            Ok(()) => {
                info!("Voice session established");
                Ok(session)
            }
            Err(e) => {
                session.state = SessionState::Disabled;
                session.release().await;
                Err(e)
            }
        }
    }

    async fn handshake(&mut self) -> Result<()> {
        self.wait_for(Response::HelloShell)
            .await
            .map_err(|e| VoiceError::protocol("waiting for greeting", e))?;
        self.send(Command::Hello)
            .await
            .map_err(|e| VoiceError::protocol("sending identification", e))?;
        self.wait_for(Response::Ready)
            .await
            .map_err(|e| VoiceError::protocol("waiting for first READY", e))?;

        if self.config.autostop {
            self.set_autostop(true)
                .await
                .map_err(|e| VoiceError::protocol("enabling autostop", e))?;
        }
        Ok(())
    }

    /// Open a session, run `body` on it, and close it on every exit path.
    ///
    /// The body's error type only needs to absorb `VoiceError`, so hosts can
    /// run `anyhow` bodies directly.
    pub async fn with_session<T, E, F>(
        link: ControllerLink<R, W, N>,
        config: SessionConfig,
        body: F,
    ) -> std::result::Result<T, E>
    where
        F: AsyncFnOnce(&mut Self) -> std::result::Result<T, E>,
        E: From<VoiceError>,
    {
        let mut session = Self::open(link, config).await?;
        let outcome = body(&mut session).await;
        session.close().await;
        outcome
    }

    /// Say goodbye if still possible, then release the handles.
    ///
    /// Never fails and may be called any number of times.
    pub async fn close(&mut self) {
        if self.io.is_none() {
            self.state = SessionState::Disabled;
            return;
        }

        if self.is_enabled() {
            if let Err(e) = self.goodbye().await {
                warn!("Goodbye exchange failed during close: {}", e);
            }
        } else {
            debug!("Session not enabled ({}), skipping goodbye", self.state);
        }

        self.release().await;
        info!("Voice session closed");
    }

    async fn goodbye(&mut self) -> Result<()> {
        self.send(Command::Goodbye).await?;
        self.wait_for(Response::GoodbyeShell).await?;
        Ok(())
    }

    /// Flush and shut down the output, drop both handles, and disable.
    async fn release(&mut self) {
        self.state = SessionState::Disabled;
        let Some(io) = self.io.take() else {
            return;
        };
        drop(io.reader);

        let mut writer = io.writer;
        let io_timeout = Duration::from_millis(TEARDOWN_IO_TIMEOUT_MS);
        match tokio::time::timeout(io_timeout, writer.flush()).await {
            Ok(Ok(())) => debug!("Flush completed successfully"),
            Ok(Err(e)) => warn!("Error flushing during close: {}", e),
            Err(_) => warn!("Flush timeout during close ({}ms)", io_timeout.as_millis()),
        }

        let mut output = writer.into_inner();
        match tokio::time::timeout(io_timeout, output.shutdown()).await {
            Ok(Ok(())) => debug!("Shutdown completed successfully"),
            Ok(Err(e)) => warn!("Error during shutdown: {}", e),
            Err(_) => warn!(
                "Shutdown timeout during close ({}ms)",
                io_timeout.as_millis()
            ),
        }
    }
}

impl<R, W, N> SessionChannel<R, W, N> {
    /// Current protocol state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether commands can still be exchanged.
    pub fn is_enabled(&self) -> bool {
        self.state.is_enabled()
    }

    /// The last line received from the controller.
    pub fn last_response(&self) -> Option<&Response> {
        self.last_response.as_ref()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub(crate) fn ensure_enabled(&self) -> Result<()> {
        if self.is_enabled() && self.io.is_some() {
            Ok(())
        } else {
            Err(VoiceError::Disabled)
        }
    }

    pub(crate) fn disable(&mut self) {
        if self.state != SessionState::Disabled {
            debug!("Disabling session (was {})", self.state);
        }
        self.state = SessionState::Disabled;
    }
}

impl<R, W, N> Drop for SessionChannel<R, W, N> {
    fn drop(&mut self) {
        if self.io.is_some() {
            warn!("SessionChannel dropped without close - handles released without goodbye");
        }
    }
}
