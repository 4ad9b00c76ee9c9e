//! Wire types for the vgetty voice shell protocol.
//!
//! Outbound lines are [`Command`]s, inbound lines are [`Response`]s, and
//! [`VoiceCodec`] frames both over any async byte stream.

pub mod codec;
pub mod commands;
pub mod response;

pub use codec::VoiceCodec;
pub use commands::{Command, Tone};
pub use response::Response;
