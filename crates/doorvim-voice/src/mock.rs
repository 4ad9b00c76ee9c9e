//! Scripted stand-in for the voice controller.
//!
//! The mock plays the controller side of a session over in-memory pipes:
//! it waits for the exact command lines a script expects and answers with
//! the scripted tokens. Useful for exercising hosts without vgetty.
//!
//! # Example
//!
//! ```
//! use doorvim_voice::mock::{MockController, Script};
//! use doorvim_voice::{SessionChannel, SessionConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (controller, link) = MockController::new();
//! let script = Script::new().handshake().reply("DIAL #9", &["DIALING", "READY"]).goodbye();
//! let controller = tokio::spawn(controller.run(script));
//!
//! let mut session = SessionChannel::open(link, SessionConfig::default()).await.unwrap();
//! session.dial("#9").await.unwrap();
//! session.close().await;
//!
//! let seen = controller.await.unwrap().unwrap();
//! assert!(seen.contains(&"DIAL #9".to_string()));
//! # }
//! ```

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines};
use tracing::{debug, trace};

use crate::bindings::ControllerLink;
use crate::error::Result;
use crate::notify::Notifier;

const PIPE_CAPACITY: usize = 4096;

/// One step of the controller's side of the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Read one command line and require it to equal this text.
    Expect(String),
    /// Write one line to the session.
    Say(String),
    /// Stay silent for a while.
    Pause(Duration),
    /// Close the controller's output; the session sees end of stream.
    Hangup,
}

/// Ordered controller behaviour.
#[derive(Debug, Clone, Default)]
pub struct Script {
    steps: Vec<Step>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect(mut self, line: impl Into<String>) -> Self {
        self.steps.push(Step::Expect(line.into()));
        self
    }

    pub fn say(mut self, line: impl Into<String>) -> Self {
        self.steps.push(Step::Say(line.into()));
        self
    }

    pub fn pause(mut self, duration: Duration) -> Self {
        self.steps.push(Step::Pause(duration));
        self
    }

    pub fn hangup(mut self) -> Self {
        self.steps.push(Step::Hangup);
        self
    }

    /// Expect `command`, then answer with each of `responses`.
    pub fn reply(self, command: &str, responses: &[&str]) -> Self {
        responses
            .iter()
            .fold(self.expect(command), |script, line| script.say(*line))
    }

    /// Greeting, identification and `AUTOSTOP ON`.
    pub fn handshake(self) -> Self {
        self.handshake_without_autostop()
            .reply("AUTOSTOP ON", &["READY"])
    }

    /// Greeting and identification only.
    pub fn handshake_without_autostop(self) -> Self {
        self.say("HELLO SHELL")
            .reply("HELLO VOICE PROGRAM", &["READY"])
    }

    pub fn goodbye(self) -> Self {
        self.reply("GOODBYE", &["GOODBYE SHELL"])
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }
}

/// Counts wakeups instead of signalling a process.
#[derive(Debug, Clone, Default)]
pub struct CountingNotifier {
    count: Arc<AtomicUsize>,
}

impl CountingNotifier {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl Notifier for CountingNotifier {
    fn notify(&self) -> Result<()> {
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Link type handed to sessions talking to a [`MockController`].
pub type MockLink = ControllerLink<DuplexStream, DuplexStream, CountingNotifier>;

/// Controller end of an in-memory session.
pub struct MockController {
    commands: Lines<BufReader<DuplexStream>>,
    responses: Option<DuplexStream>,
}

impl MockController {
    /// Create a controller and the link a session should be opened with.
    pub fn new() -> (Self, MockLink) {
        let (session_input, responses) = tokio::io::duplex(PIPE_CAPACITY);
        let (session_output, commands) = tokio::io::duplex(PIPE_CAPACITY);

        let controller = Self {
            commands: BufReader::new(commands).lines(),
            responses: Some(responses),
        };
        let link = ControllerLink {
            input: session_input,
            output: session_output,
            notifier: CountingNotifier::default(),
        };
        (controller, link)
    }

    /// Play `script`, then hang up and collect whatever else the session
    /// sends until it closes its end.
    ///
    /// Returns every command line received, in order.
    ///
    /// # Errors
    ///
    /// `InvalidData` when a command differs from the scripted one,
    /// `UnexpectedEof` when the session closed while a command was expected.
    pub async fn run(mut self, script: Script) -> io::Result<Vec<String>> {
        let mut seen = Vec::new();

        for step in script.steps {
            match step {
                Step::Expect(expected) => {
                    let Some(line) = self.commands.next_line().await? else {
                        return Err(io::Error::new(
                            io::ErrorKind::UnexpectedEof,
                            format!("session closed while expecting {expected:?}"),
                        ));
                    };
                    trace!("mock received {:?}", line);
                    if line != expected {
                        return Err(io::Error::new(
                            io::ErrorKind::InvalidData,
                            format!("expected {expected:?}, got {line:?}"),
                        ));
                    }
                    seen.push(line);
                }
                Step::Say(line) => {
                    let Some(responses) = self.responses.as_mut() else {
                        return Err(io::Error::new(
                            io::ErrorKind::BrokenPipe,
                            format!("cannot say {line:?} after hangup"),
                        ));
                    };
                    match responses.write_all(format!("{line}\n").as_bytes()).await {
                        Ok(()) => {}
                        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                            debug!("session stopped reading before {:?}", line);
                            self.responses = None;
                        }
                        Err(e) => return Err(e),
                    }
                }
                Step::Pause(duration) => tokio::time::sleep(duration).await,
                Step::Hangup => {
                    self.responses = None;
                }
            }
        }

        self.responses = None;
        while let Some(line) = self.commands.next_line().await? {
            debug!("mock received unscripted {:?}", line);
            seen.push(line);
        }
        Ok(seen)
    }
}
