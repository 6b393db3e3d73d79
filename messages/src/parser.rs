// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Length-prefixed framing of a byte stream into messages.

use crate::header::HEADER_SIZE;
use crate::message;
use crate::message::Message;
use crate::Error;
use byteorder::BigEndian;
use byteorder::ByteOrder;

/// Total length of the frame at the front of `buf`, once enough of the
/// fixed header has arrived to know it.
pub fn frame_length(buf: &[u8]) -> Option<usize> {
    (buf.len() >= HEADER_SIZE).then(|| BigEndian::read_u16(&buf[2..4]) as usize)
}

/// A framing failure.
///
/// Once a parser returns this it must be discarded along with the
/// connection that fed it: the stream can no longer be trusted to be on a
/// message boundary. The unconsumed bytes are included for reporting.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid data on the connection: {error}")]
pub struct ParseError {
    #[source]
    pub error: Error,
    pub bytes: Vec<u8>,
}

/// A stateful accumulator turning a byte stream into messages.
///
/// A parser is created once version negotiation settles and is bound to
/// the negotiated version: its [`encode`](Self::encode) stamps that
/// version into outbound headers. Feeding may return any number of
/// messages, including none; partial frames are retained across calls and
/// no byte is ever dropped.
#[derive(Clone, Debug)]
pub struct Parser {
    version: u8,
    buf: Vec<u8>,
}

impl Parser {
    pub fn new(version: u8) -> Self {
        Self {
            version,
            buf: Vec::new(),
        }
    }

    /// The negotiated version this parser is bound to.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Append `bytes` to the accumulator and decode every complete
    /// message now available.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Vec<Message>, ParseError> {
        self.buf.extend_from_slice(bytes);
        let mut messages = Vec::new();
        loop {
            let Some(length) = frame_length(&self.buf) else {
                break;
            };
            if length < HEADER_SIZE {
                return Err(self.poison(Error::BadLength {
                    what: "message",
                    length,
                }));
            }
            if self.buf.len() < length {
                break;
            }
            match message::decode(&self.buf[..length]) {
                Ok((message, _)) => {
                    messages.push(message);
                    self.buf.drain(..length);
                }
                Err(error) => return Err(self.poison(error)),
            }
        }
        Ok(messages)
    }

    /// Encode a message under the negotiated version.
    pub fn encode(&self, message: &Message) -> Result<Vec<u8>, Error> {
        message.encode_as(self.version)
    }

    fn poison(&mut self, error: Error) -> ParseError {
        ParseError {
            error,
            bytes: std::mem::take(&mut self.buf),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::frame_length;
    use super::Parser;
    use crate::header::Header;
    use crate::message::Message;
    use crate::message::MessageBody;
    use crate::Error;

    fn echo(xid: u32) -> Message {
        Message::new(
            Header { version: 4, xid },
            MessageBody::EchoRequest(vec![0xab, 0xcd]),
        )
    }

    #[test]
    fn test_frame_length_needs_full_header() {
        assert_eq!(frame_length(&[4, 0, 0]), None);
        assert_eq!(frame_length(&[4, 0, 0, 16, 0, 0, 0, 0]), Some(16));
    }

    #[test]
    fn test_single_message_in_one_chunk() {
        let mut parser = Parser::new(4);
        let bytes = echo(1).encode().unwrap();
        let messages = parser.feed(&bytes).unwrap();
        assert_eq!(messages, vec![echo(1)]);
    }

    #[test]
    fn test_message_split_byte_by_byte() {
        let mut parser = Parser::new(4);
        let bytes = echo(2).encode().unwrap();
        for &byte in &bytes[..bytes.len() - 1] {
            assert!(parser.feed(&[byte]).unwrap().is_empty());
        }
        let messages = parser.feed(&bytes[bytes.len() - 1..]).unwrap();
        assert_eq!(messages, vec![echo(2)]);
    }

    #[test]
    fn test_multiple_messages_in_one_chunk() {
        let mut parser = Parser::new(4);
        let mut bytes = echo(3).encode().unwrap();
        bytes.extend(echo(4).encode().unwrap());
        // And a partial third message.
        let third = echo(5).encode().unwrap();
        bytes.extend_from_slice(&third[..5]);
        let messages = parser.feed(&bytes).unwrap();
        assert_eq!(messages, vec![echo(3), echo(4)]);
        let messages = parser.feed(&third[5..]).unwrap();
        assert_eq!(messages, vec![echo(5)]);
    }

    #[test]
    fn test_undersized_length_is_fatal() {
        let mut parser = Parser::new(4);
        let error = parser.feed(&[4, 0, 0, 7, 0, 0, 0, 0, 1, 2]).unwrap_err();
        assert_eq!(
            error.error,
            Error::BadLength {
                what: "message",
                length: 7,
            },
        );
        assert_eq!(error.bytes, vec![4, 0, 0, 7, 0, 0, 0, 0, 1, 2]);
    }

    #[test]
    fn test_decode_failure_is_fatal() {
        let mut parser = Parser::new(4);
        // Complete frame with an unknown type code.
        let error = parser.feed(&[4, 99, 0, 8, 0, 0, 0, 0]).unwrap_err();
        assert_eq!(error.error, Error::UnknownMessageType(99));
    }

    #[test]
    fn test_encode_stamps_bound_version() {
        let parser = Parser::new(3);
        let bytes = parser.encode(&echo(6)).unwrap();
        assert_eq!(bytes[0], 3);
    }
}
