//! Voice session engine for the vgetty voice shell.
//!
//! This crate owns the link to the voice controller for the lifetime of one
//! call and layers three things on top of it:
//!
//! - [`SessionChannel`]: handshake, guaranteed teardown and the protocol
//!   state of the call.
//! - The command protocol ([`SessionChannel::send`],
//!   [`SessionChannel::receive`], [`SessionChannel::wait_for`],
//!   [`SessionChannel::drain_until`] and the `play`/`beep`/`dial`
//!   composites): one request/response exchange at a time, each receive
//!   guarded by its own deadline.
//! - [`DtmfCollector`]: prompts the caller and turns keypresses into a code
//!   or a silence signal.
//!
//! # Example
//!
//! ```no_run
//! use doorvim_voice::{ControllerBindings, DtmfCollector, SessionChannel, SessionConfig};
//!
//! # async fn example() -> Result<(), doorvim_voice::VoiceError> {
//! let link = ControllerBindings::from_env()?.into_link()?;
//! let collector = DtmfCollector::new(30).with_prompt("sounds/prompt.pcm");
//!
//! let result = SessionChannel::with_session(link, SessionConfig::default(), async |session| {
//!     collector.collect(session).await
//! })
//! .await?;
//! println!("caller entered {result}");
//! # Ok(())
//! # }
//! ```
//!
//! # Deadlines
//!
//! Every receive is wrapped in `tokio::time::timeout`. Operations borrow the
//! session mutably, so at most one deadline is ever outstanding per session.

pub mod bindings;
pub mod channel;
pub mod dtmf;
pub mod error;
pub mod mock;
pub mod notify;
pub mod protocol;

pub use bindings::{ControllerBindings, ControllerLink, PipeLink};
pub use channel::{SessionChannel, SessionConfig};
pub use dtmf::{DigitBuffer, DtmfCollector, KeyOutcome, edit_keys};
pub use error::{Result, VoiceError};
pub use notify::{Notifier, SignalNotifier};
