//! Touch-tone code entry.
//!
//! [`DigitBuffer`] holds the keypad editing rules (`*` clears, `#` ends,
//! digits append, everything else is ignored) so they can be exercised
//! without a controller. [`DtmfCollector`] drives a session through the
//! event sequence that feeds the buffer:
//!
//! ```text
//! AUTOSTOP ON / ENABLE EVENTS / READY
//! [PLAY prompt / drain until PLAYING or READY]
//! WAIT n / WAITING
//! RECEIVED_DTMF / <key> ...            (until READY)
//! DISABLE EVENTS / READY
//! AUTOSTOP <configured> / READY
//! ```

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, warn};

use crate::channel::SessionChannel;
use crate::error::Result;
use crate::notify::Notifier;
use doorvim_core::constants::{DEFAULT_DTMF_WAIT_SECS, MAX_CODE_DIGITS};
use doorvim_core::{DtmfKey, DtmfResult, SessionState};
use doorvim_protocol::{Command, Response};

/// What a key did to the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Appended,
    Cleared,
    Terminated,
    Ignored,
    /// A digit arrived with the buffer already full and was dropped.
    Overflow,
}

/// Digits entered so far, bounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitBuffer {
    digits: String,
    max_digits: usize,
}

impl DigitBuffer {
    pub fn new() -> Self {
        Self::with_max_digits(MAX_CODE_DIGITS)
    }

    pub fn with_max_digits(max_digits: usize) -> Self {
        Self {
            digits: String::new(),
            max_digits,
        }
    }

    /// Apply one key.
    ///
    /// # Examples
    ///
    /// ```
    /// use doorvim_core::DtmfKey;
    /// use doorvim_voice::{DigitBuffer, KeyOutcome};
    ///
    /// let mut buffer = DigitBuffer::new();
    /// buffer.apply(DtmfKey::Digit(1));
    /// assert_eq!(buffer.apply(DtmfKey::Star), KeyOutcome::Cleared);
    /// buffer.apply(DtmfKey::Digit(4));
    /// assert_eq!(buffer.apply(DtmfKey::Hash), KeyOutcome::Terminated);
    /// assert_eq!(buffer.as_str(), "4");
    /// ```
    pub fn apply(&mut self, key: DtmfKey) -> KeyOutcome {
        match key {
            DtmfKey::Star => {
                self.digits.clear();
                KeyOutcome::Cleared
            }
            DtmfKey::Hash => KeyOutcome::Terminated,
            DtmfKey::Digit(_) if self.digits.len() >= self.max_digits => KeyOutcome::Overflow,
            DtmfKey::Digit(_) => {
                self.digits.push(key.as_char());
                KeyOutcome::Appended
            }
            DtmfKey::Other(_) => KeyOutcome::Ignored,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.digits
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    pub fn into_code(self) -> String {
        self.digits
    }
}

impl Default for DigitBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a key sequence through a fresh buffer, stopping at the first `#`.
pub fn edit_keys<I>(keys: I) -> String
where
    I: IntoIterator<Item = DtmfKey>,
{
    let mut buffer = DigitBuffer::new();
    for key in keys {
        if buffer.apply(key) == KeyOutcome::Terminated {
            break;
        }
    }
    buffer.into_code()
}

/// Collects a caller-entered code over an open session.
#[derive(Debug, Clone)]
pub struct DtmfCollector {
    wait_secs: u32,
    prompt: Option<String>,
    max_digits: usize,
}

impl DtmfCollector {
    /// `wait_secs` is the inactivity window handed to `WAIT`, re-armed after
    /// every key.
    pub fn new(wait_secs: u32) -> Self {
        Self {
            wait_secs,
            prompt: None,
            max_digits: MAX_CODE_DIGITS,
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        self.prompt = (!prompt.is_empty()).then_some(prompt);
        self
    }

    pub fn with_max_digits(mut self, max_digits: usize) -> Self {
        self.max_digits = max_digits;
        self
    }

    /// Prompt the caller and read keys until `#`, silence, or the controller
    /// returns to `READY` on its own.
    ///
    /// # Errors
    ///
    /// Any protocol failure is returned as is; the collector does not try to
    /// restore event or autostop modes after a failure.
    pub async fn collect<R, W, N>(&self, session: &mut SessionChannel<R, W, N>) -> Result<DtmfResult>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
        N: Notifier,
    {
        session.set_autostop(true).await?;
        session.send(Command::EnableEvents).await?;
        session.wait_for(Response::Ready).await?;

        if let Some(prompt) = &self.prompt {
            session.send(Command::play(prompt.as_str())?).await?;
            let ceiling = session.config().drain_timeout;
            session
                .drain_until(&[Response::Playing, Response::Ready], ceiling)
                .await?;
        }

        session.send(Command::Wait(self.wait_secs)).await?;
        session.wait_for(Response::Waiting).await?;

        let window = Duration::from_secs(u64::from(self.wait_secs));
        let mut buffer = DigitBuffer::with_max_digits(self.max_digits);
        let mut silence = false;

        while session.state() != SessionState::Ready {
            debug!("Code so far: {} digits", buffer.len());
            match session.receive(&[], window).await? {
                Response::ReceivedDtmf => {
                    let key_timeout = session.config().receive_timeout;
                    let line = session.receive(&[], key_timeout).await?;
                    let key = match DtmfKey::from_line(line.as_str()) {
                        Ok(key) => key,
                        Err(e) => {
                            warn!("Ignoring malformed key line {:?}: {}", line.as_str(), e);
                            continue;
                        }
                    };
                    match buffer.apply(key) {
                        KeyOutcome::Terminated => session.stop().await?,
                        KeyOutcome::Overflow => {
                            warn!("Code longer than {} digits, dropping key", self.max_digits)
                        }
                        KeyOutcome::Ignored => debug!("Ignoring key {}", key),
                        KeyOutcome::Appended | KeyOutcome::Cleared => {}
                    }
                }
                Response::SilenceDetected => {
                    session.stop().await?;
                    silence = true;
                }
                other => debug!("Ignoring {} while collecting", other),
            }
        }

        session.send(Command::DisableEvents).await?;
        session.wait_for(Response::Ready).await?;
        let autostop = session.config().autostop;
        session.set_autostop(autostop).await?;

        let result = if silence {
            DtmfResult::Silence
        } else {
            DtmfResult::Code(buffer.into_code())
        };
        debug!("Collected {}", result);
        Ok(result)
    }
}

impl Default for DtmfCollector {
    fn default() -> Self {
        Self::new(DEFAULT_DTMF_WAIT_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn keys(s: &str) -> Vec<DtmfKey> {
        s.chars().map(DtmfKey::from_char).collect()
    }

    #[rstest]
    #[case("12*34#", "34")]
    #[case("#", "")]
    #[case("1234", "1234")]
    #[case("12#34", "12")]
    #[case("1A2B", "12")]
    #[case("**", "")]
    fn test_edit_keys(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(edit_keys(keys(input)), expected);
    }

    #[test]
    fn test_buffer_overflow_drops_digits() {
        let mut buffer = DigitBuffer::with_max_digits(3);
        for key in keys("123") {
            assert_eq!(buffer.apply(key), KeyOutcome::Appended);
        }
        assert_eq!(buffer.apply(DtmfKey::Digit(4)), KeyOutcome::Overflow);
        assert_eq!(buffer.as_str(), "123");

        assert_eq!(buffer.apply(DtmfKey::Star), KeyOutcome::Cleared);
        assert!(buffer.is_empty());
        assert_eq!(buffer.apply(DtmfKey::Digit(9)), KeyOutcome::Appended);
    }

    #[test]
    fn test_collector_empty_prompt_is_none() {
        let collector = DtmfCollector::new(5).with_prompt("");
        assert!(collector.prompt.is_none());
    }
}
