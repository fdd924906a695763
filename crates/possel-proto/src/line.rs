//! Newline-framed codec for tokio.
//!
//! Inbound bytes are split on `\n`, the trailing `\r\n` is stripped and the
//! payload is decoded as UTF-8 with invalid sequences replaced. Outbound
//! lines get a single `\n` appended unless they already end in one; a line
//! with an embedded `\r`, `\n` or NUL is refused.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{ProtocolError, Result};
use crate::message::{validate_param, Message};

/// Default upper bound on a single line, in bytes.
///
/// Room for 512 bytes of message plus a full IRCv3 tag section.
pub const DEFAULT_MAX_LINE: usize = 8704;

/// Line-based codec for IRC streams.
#[derive(Debug, Clone)]
pub struct LineCodec {
    /// Index of next byte to check for newline
    next_index: usize,
    max_len: usize,
}

impl LineCodec {
    /// Codec with [`DEFAULT_MAX_LINE`].
    pub fn new() -> Self {
        Self::with_max_len(DEFAULT_MAX_LINE)
    }

    /// Codec with a custom maximum line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            next_index: 0,
            max_len,
        }
    }

    /// The configured maximum line length.
    pub fn max_len(&self) -> usize {
        self.max_len
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = String;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<String>> {
        let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') else {
            self.next_index = src.len();
            if src.len() > self.max_len {
                let actual = src.len();
                // Drop the oversized partial so the stream can resync.
                src.clear();
                self.next_index = 0;
                return Err(ProtocolError::LineTooLong {
                    actual,
                    limit: self.max_len,
                });
            }
            return Ok(None);
        };

        let line = src.split_to(self.next_index + offset + 1);
        self.next_index = 0;

        if line.len() > self.max_len {
            return Err(ProtocolError::LineTooLong {
                actual: line.len(),
                limit: self.max_len,
            });
        }

        let text = String::from_utf8_lossy(&line);
        Ok(Some(text.trim_end_matches(['\r', '\n']).to_owned()))
    }
}

impl Encoder<String> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: String, dst: &mut BytesMut) -> Result<()> {
        <Self as Encoder<&str>>::encode(self, line.as_str(), dst)
    }
}

impl Encoder<&str> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, line: &str, dst: &mut BytesMut) -> Result<()> {
        let body = line
            .strip_suffix('\n')
            .map_or(line, |l| l.strip_suffix('\r').unwrap_or(l));
        validate_param(body)?;

        dst.reserve(line.len() + 1);
        dst.put_slice(line.as_bytes());
        if !line.ends_with('\n') {
            dst.put_u8(b'\n');
        }
        Ok(())
    }
}

impl Encoder<Message> for LineCodec {
    type Error = ProtocolError;

    fn encode(&mut self, msg: Message, dst: &mut BytesMut) -> Result<()> {
        msg.validate()?;
        <Self as Encoder<&str>>::encode(self, msg.to_string().as_str(), dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_strips_terminators() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING :test\r\nPING :again\n");

        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING :test".to_string()));
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING :again".to_string()));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_partial_line() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from("PING :");
        assert_eq!(codec.decode(&mut buf).unwrap(), None);

        buf.extend_from_slice(b"late\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING :late".to_string()));
    }

    #[test]
    fn test_decode_invalid_utf8_is_lossy() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::from(&b"PRIVMSG #a :caf\xe9\r\n"[..]);
        let line = codec.decode(&mut buf).unwrap().unwrap();
        assert_eq!(line, "PRIVMSG #a :caf\u{FFFD}");
    }

    #[test]
    fn test_decode_too_long() {
        let mut codec = LineCodec::with_max_len(10);
        let mut buf = BytesMut::from("this is way too long\n");
        assert!(matches!(
            codec.decode(&mut buf),
            Err(ProtocolError::LineTooLong { limit: 10, .. })
        ));
    }

    #[test]
    fn test_decode_too_long_partial_resyncs() {
        let mut codec = LineCodec::with_max_len(10);
        let mut buf = BytesMut::from("0123456789abc");
        assert!(codec.decode(&mut buf).is_err());
        assert!(buf.is_empty());

        buf.extend_from_slice(b"PING\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some("PING".to_string()));
    }

    #[test]
    fn test_encode_appends_newline_once() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();

        codec.encode("PONG :test".to_string(), &mut buf).unwrap();
        codec.encode("PONG :x\n", &mut buf).unwrap();
        assert_eq!(&buf[..], b"PONG :test\nPONG :x\n");
    }

    #[test]
    fn test_encode_refuses_embedded_breaks() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();

        assert!(matches!(
            codec.encode("PRIVMSG #x :hi\rQUIT", &mut buf),
            Err(ProtocolError::InvalidMessage(_))
        ));
        assert!(codec
            .encode(Message::join("#x\nQUIT :bye", None), &mut buf)
            .is_err());
        assert!(buf.is_empty());

        codec.encode("PING :ok\r\n", &mut buf).unwrap();
        assert_eq!(&buf[..], b"PING :ok\r\n");
    }

    #[test]
    fn test_encode_message() {
        let mut codec = LineCodec::new();
        let mut buf = BytesMut::new();
        codec
            .encode(Message::privmsg("#possel", "hello world"), &mut buf)
            .unwrap();
        assert_eq!(&buf[..], b"PRIVMSG #possel :hello world\n");
    }
}
