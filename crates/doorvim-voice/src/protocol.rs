//! Command/response exchange on an open session.
//!
//! The controller is half-duplex: the program writes one command, wakes the
//! controller, and reads the state tokens it answers with. Every read is
//! bounded by its own deadline. A deadline that elapses reports
//! `VoiceError::Timeout` and leaves the state alone; every other failure
//! disables the session.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::channel::SessionChannel;
use crate::error::{Result, VoiceError};
use crate::notify::Notifier;
use doorvim_core::constants::BEEP_BASE_TIMEOUT_SECS;
use doorvim_protocol::{Command, Response, Tone};

impl<R, W, N> SessionChannel<R, W, N>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
    N: Notifier,
{
    /// Write one command and wake the controller.
    ///
    /// # Errors
    ///
    /// - `VoiceError::Disabled` if the session can no longer be used
    /// - `VoiceError::Codec` / `VoiceError::Notify` if the write or the
    ///   wakeup failed; the session is disabled in that case
    pub async fn send(&mut self, command: Command) -> Result<()> {
        self.ensure_enabled()?;
        let io = self.io.as_mut().ok_or(VoiceError::Disabled)?;

        info!("SEND: {}", command);
        if let Err(e) = io.writer.send(command).await {
            error!("Failed to write command: {}", e);
            self.disable();
            return Err(e.into());
        }

        if let Err(e) = self.notifier.notify() {
            error!("{}", e);
            self.disable();
            return Err(e);
        }
        Ok(())
    }

    /// Read one line within `timeout` and check it against `expected`.
    ///
    /// An empty `expected` accepts any line except `ERROR`.
    ///
    /// # Errors
    ///
    /// - `VoiceError::Timeout` if nothing arrived in time (state unchanged)
    /// - `VoiceError::Controller` if the controller sent `ERROR`
    /// - `VoiceError::UnexpectedState` if the line is not in `expected`
    /// - `VoiceError::ConnectionLost` / `VoiceError::Codec` if the link broke
    pub async fn receive(&mut self, expected: &[Response], timeout: Duration) -> Result<Response> {
        self.ensure_enabled()?;
        let io = self.io.as_mut().ok_or(VoiceError::Disabled)?;

        let next = match tokio::time::timeout(timeout, io.reader.next()).await {
            Ok(next) => next,
            Err(_) => {
                warn!(
                    "No response within {}ms (state {})",
                    timeout.as_millis(),
                    self.state
                );
                return Err(VoiceError::timeout(timeout));
            }
        };

        match next {
            Some(Ok(response)) => {
                info!("RECV: {}", response);
                self.accept(response, expected)
            }
            Some(Err(e)) => {
                error!("Undecodable line from controller: {}", e);
                self.disable();
                Err(e.into())
            }
            None => {
                error!("Controller closed the connection");
                self.disable();
                Err(VoiceError::ConnectionLost)
            }
        }
    }

    fn accept(&mut self, response: Response, expected: &[Response]) -> Result<Response> {
        self.state = response.session_state();
        self.last_response = Some(response.clone());

        if response.is_error() {
            error!("Controller reported ERROR");
            return Err(VoiceError::Controller);
        }

        if !expected.is_empty() && !expected.contains(&response) {
            let err = VoiceError::unexpected(expected, &response);
            error!("{}", err);
            self.disable();
            return Err(err);
        }

        Ok(response)
    }

    /// Wait for exactly `state` within the configured wait deadline.
    pub async fn wait_for(&mut self, state: Response) -> Result<Response> {
        let timeout = self.config.wait_timeout;
        self.wait_for_timeout(state, timeout).await
    }

    /// Wait for exactly `state` within `timeout`.
    pub async fn wait_for_timeout(&mut self, state: Response, timeout: Duration) -> Result<Response> {
        debug!("Expecting {}", state);
        self.receive(std::slice::from_ref(&state), timeout).await
    }

    /// Discard lines until one in `terminal` arrives, all within `ceiling`.
    ///
    /// `ERROR` still fails the drain.
    pub async fn drain_until(&mut self, terminal: &[Response], ceiling: Duration) -> Result<Response> {
        let deadline = Instant::now() + ceiling;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(VoiceError::timeout(ceiling));
            }

            let response = match self.receive(&[], remaining).await {
                Ok(response) => response,
                Err(e) if e.is_timeout() => return Err(VoiceError::timeout(ceiling)),
                Err(e) => return Err(e),
            };

            if terminal.contains(&response) {
                return Ok(response);
            }
            debug!("Ignoring {} while draining", response);
        }
    }

    /// Play an audio file and wait until it finished.
    ///
    /// An empty path plays nothing.
    pub async fn play(&mut self, path: &str) -> Result<()> {
        if path.is_empty() {
            debug!("No audio file given, skipping playback");
            return Ok(());
        }

        self.send(Command::play(path)?).await?;
        self.wait_for(Response::Playing).await?;
        let ceiling = self.config.play_timeout;
        self.wait_for_timeout(Response::Ready, ceiling).await?;
        Ok(())
    }

    /// Emit a tone. The deadline for completion grows with the tone length.
    pub async fn beep(&mut self, tone: Option<Tone>) -> Result<()> {
        let tone_secs = tone.and_then(|t| t.duration_ms).unwrap_or(0) / 1000;

        self.send(Command::Beep(tone)).await?;
        self.wait_for(Response::Beeping).await?;
        let ceiling = Duration::from_secs(BEEP_BASE_TIMEOUT_SECS + u64::from(tone_secs));
        self.wait_for_timeout(Response::Ready, ceiling).await?;
        Ok(())
    }

    /// Dial a number or an in-call DTMF sequence.
    pub async fn dial(&mut self, number: &str) -> Result<()> {
        self.send(Command::dial(number)?).await?;
        self.wait_for(Response::Dialing).await?;
        self.wait_for(Response::Ready).await?;
        Ok(())
    }

    pub async fn set_autostop(&mut self, on: bool) -> Result<()> {
        self.send(Command::Autostop(on)).await?;
        self.wait_for(Response::Ready).await?;
        Ok(())
    }

    /// Interrupt the current action and wait until the controller is idle.
    pub async fn stop(&mut self) -> Result<()> {
        self.send(Command::Stop).await?;
        self.wait_for(Response::Ready).await?;
        Ok(())
    }
}
