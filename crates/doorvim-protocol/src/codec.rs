//! Tokio codec for voice shell line framing.
//!
//! This module provides a Tokio-compatible codec that frames the controller's
//! newline-delimited ASCII protocol, so a session can wrap its input handle in
//! a `FramedRead` and its output handle in a `FramedWrite`.
//!
//! # Architecture
//!
//! ```text
//! controller pipe -> Decoder -> Response (one per line)
//! Command -> Encoder -> controller pipe ("VERB args\n")
//! ```
//!
//! # Usage with Tokio Framed
//!
//! ```rust
//! use doorvim_protocol::{Command, Response, VoiceCodec};
//! use futures::{SinkExt, StreamExt};
//! use tokio_util::codec::{FramedRead, FramedWrite};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> doorvim_core::Result<()> {
//! let (ours, theirs) = tokio::io::duplex(64);
//! let (their_read, _their_write) = tokio::io::split(theirs);
//! let (_our_read, our_write) = tokio::io::split(ours);
//!
//! let mut outbound = FramedWrite::new(our_write, VoiceCodec::new());
//! let mut peer = FramedRead::new(their_read, VoiceCodec::new());
//!
//! outbound.send(Command::Stop).await?;
//! assert_eq!(peer.next().await.transpose()?, Some(Response::Payload("STOP".into())));
//! # Ok(())
//! # }
//! ```
//!
//! # Partial Lines
//!
//! The decoder keeps unterminated bytes in the read buffer and remembers how
//! far it already scanned, so a line split across several pipe reads is
//! assembled without rescanning. At end of stream a trailing unterminated
//! line is still delivered.
//!
//! # Error Handling
//!
//! Decode errors occur when a line exceeds the configured maximum length or
//! is not ASCII. The offending bytes are discarded; callers treat the session
//! as desynchronized.

use std::cmp;

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::commands::validate_argument;
use crate::{Command, Response};
use doorvim_core::constants::MAX_LINE_LENGTH;
use doorvim_core::{Error, Result};

/// Tokio codec for voice shell lines.
#[derive(Debug, Clone)]
pub struct VoiceCodec {
    /// Maximum accepted line length, excluding the newline.
    max_line_length: usize,

    /// Index in the read buffer up to which no newline was found.
    next_index: usize,
}

impl VoiceCodec {
    /// Create a new codec with the default maximum line length.
    ///
    /// # Example
    ///
    /// ```
    /// use doorvim_protocol::VoiceCodec;
    ///
    /// let codec = VoiceCodec::new();
    /// assert_eq!(codec.max_line_length(), 1024);
    /// ```
    pub fn new() -> Self {
        Self::with_max_line_length(MAX_LINE_LENGTH)
    }

    /// Create a new codec with a custom maximum line length.
    pub fn with_max_line_length(max_line_length: usize) -> Self {
        Self {
            max_line_length,
            next_index: 0,
        }
    }

    /// Get the current maximum line length.
    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }
}

impl Default for VoiceCodec {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_line(bytes: &[u8]) -> Result<Response> {
    if !bytes.is_ascii() {
        return Err(Error::NonAscii(String::from_utf8_lossy(bytes).into_owned()));
    }
    // ASCII is valid UTF-8
    let line = std::str::from_utf8(bytes).map_err(|_| {
        Error::NonAscii(String::from_utf8_lossy(bytes).into_owned())
    })?;
    Ok(Response::parse(line))
}

impl Decoder for VoiceCodec {
    type Item = Response;
    type Error = Error;

    /// Decode one line from the byte stream.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Response))` - A complete line was decoded
    /// - `Ok(None)` - Need more data to complete the line
    /// - `Err(Error)` - Line too long or not ASCII
    ///
    /// # Example
    ///
    /// ```
    /// use bytes::BytesMut;
    /// use tokio_util::codec::Decoder;
    /// use doorvim_protocol::{Response, VoiceCodec};
    ///
    /// let mut codec = VoiceCodec::new();
    /// let mut buffer = BytesMut::from(&b"WAITING\nRECEIVED_DTMF\n"[..]);
    ///
    /// assert_eq!(codec.decode(&mut buffer).unwrap(), Some(Response::Waiting));
    /// assert_eq!(codec.decode(&mut buffer).unwrap(), Some(Response::ReceivedDtmf));
    /// assert_eq!(codec.decode(&mut buffer).unwrap(), None);
    /// ```
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        let read_to = cmp::min(self.max_line_length.saturating_add(1), src.len());

        if let Some(offset) = src[self.next_index..read_to]
            .iter()
            .position(|b| *b == b'\n')
        {
            let newline_index = self.next_index + offset;
            self.next_index = 0;

            let line = src.split_to(newline_index + 1);
            return decode_line(&line[..line.len() - 1]).map(Some);
        }

        if src.len() > self.max_line_length {
            self.next_index = 0;
            src.clear();
            return Err(Error::LineTooLong {
                limit: self.max_line_length,
            });
        }

        self.next_index = read_to;
        Ok(None)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>> {
        if let Some(response) = self.decode(src)? {
            return Ok(Some(response));
        }
        if src.is_empty() {
            return Ok(None);
        }

        self.next_index = 0;
        let line = src.split_to(src.len());
        decode_line(&line).map(Some)
    }
}

impl Encoder<Command> for VoiceCodec {
    type Error = Error;

    /// Encode a command as `VERB args\n`.
    ///
    /// # Errors
    ///
    /// Returns an error if an argument would break line framing (possible
    /// when a variant was built directly instead of through its validating
    /// constructor) or the line exceeds the maximum length.
    ///
    /// # Example
    ///
    /// ```
    /// use bytes::BytesMut;
    /// use tokio_util::codec::Encoder;
    /// use doorvim_protocol::{Command, VoiceCodec};
    ///
    /// let mut codec = VoiceCodec::new();
    /// let mut buffer = BytesMut::new();
    /// codec.encode(Command::Wait(30), &mut buffer).unwrap();
    /// assert_eq!(&buffer[..], b"WAIT 30\n");
    /// ```
    fn encode(&mut self, item: Command, dst: &mut BytesMut) -> Result<()> {
        for arg in item.args() {
            validate_argument(item.verb(), &arg)?;
        }

        let line = item.to_line();
        if line.len() > self.max_line_length {
            return Err(Error::LineTooLong {
                limit: self.max_line_length,
            });
        }

        dst.reserve(line.len() + 1);
        dst.put_slice(line.as_bytes());
        dst.put_u8(b'\n');
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_default() {
        let codec = VoiceCodec::default();
        assert_eq!(codec.max_line_length(), MAX_LINE_LENGTH);
    }

    #[test]
    fn test_decode_partial_line() {
        let mut codec = VoiceCodec::new();
        let mut buffer = BytesMut::from(&b"HELLO SH"[..]);

        assert_eq!(codec.decode(&mut buffer).unwrap(), None);

        buffer.extend_from_slice(b"ELL\n");
        assert_eq!(
            codec.decode(&mut buffer).unwrap(),
            Some(Response::HelloShell)
        );
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_decode_crlf_line() {
        let mut codec = VoiceCodec::new();
        let mut buffer = BytesMut::from(&b"READY\r\n"[..]);
        assert_eq!(codec.decode(&mut buffer).unwrap(), Some(Response::Ready));
    }

    #[test]
    fn test_decode_empty_buffer() {
        let mut codec = VoiceCodec::new();
        let mut buffer = BytesMut::new();
        assert_eq!(codec.decode(&mut buffer).unwrap(), None);
    }

    #[test]
    fn test_decode_line_too_long() {
        let mut codec = VoiceCodec::with_max_line_length(8);
        let mut buffer = BytesMut::from(&b"SILENCE_DETECTED\n"[..]);

        let result = codec.decode(&mut buffer);
        assert!(matches!(result, Err(Error::LineTooLong { limit: 8 })));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_decode_non_ascii() {
        let mut codec = VoiceCodec::new();
        let mut buffer = BytesMut::from(&b"REA\xc3\x90Y\n"[..]);
        assert!(matches!(codec.decode(&mut buffer), Err(Error::NonAscii(_))));
    }

    #[test]
    fn test_decode_eof_flushes_unterminated_line() {
        let mut codec = VoiceCodec::new();
        let mut buffer = BytesMut::from(&b"GOODBYE SHELL"[..]);

        assert_eq!(
            codec.decode_eof(&mut buffer).unwrap(),
            Some(Response::GoodbyeShell)
        );
        assert_eq!(codec.decode_eof(&mut buffer).unwrap(), None);
    }

    #[test]
    fn test_encode_rejects_injected_newline() {
        let mut codec = VoiceCodec::new();
        let mut buffer = BytesMut::new();

        let result = codec.encode(Command::Play("x\nGOODBYE".to_string()), &mut buffer);
        assert!(matches!(result, Err(Error::InvalidArgument { .. })));
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_encode_multiple_commands() {
        let mut codec = VoiceCodec::new();
        let mut buffer = BytesMut::new();

        codec.encode(Command::EnableEvents, &mut buffer).unwrap();
        codec.encode(Command::Stop, &mut buffer).unwrap();
        assert_eq!(&buffer[..], b"ENABLE EVENTS\nSTOP\n");
    }
}
