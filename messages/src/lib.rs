// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire formats for the OpenFlow control channel, as spoken by the switch
//! side of a connection.
//!
//! # Overview
//!
//! This crate converts between raw bytes and structured OpenFlow messages.
//! It is purely computational: it never touches a socket. The accompanying
//! `ofagent-client` crate owns the TCP connection to a controller and uses
//! this crate for all of its framing and (de)serialization.
//!
//! # Messages
//!
//! Every message starts with the fixed 8-byte header: a version octet (top
//! bit reserved and always zero), a type code, the total message length in
//! bytes, and a transaction id (`xid`) used to correlate replies with
//! requests. All integers are big-endian on the wire. The parsed
//! representation is a [`Message`](message::Message), which pairs a
//! [`Header`](header::Header) -- just the version and xid; length and type
//! code are derived -- with a typed [`MessageBody`](message::MessageBody).
//!
//! Message types whose layout this crate fully understands (hello, error,
//! echo, features, switch configuration, packet-in, flow-removed,
//! port-status) decode into structured bodies. The remaining types ride
//! through a generic path that preserves their body bytes untouched, so
//! they still round-trip exactly.
//!
//! # Framing
//!
//! TCP delivers a byte stream, not messages. The [`Parser`](parser::Parser)
//! accumulates arbitrary chunks and yields each message once its full
//! length has arrived. A buffer that merely ends mid-message is never an
//! error; an inconsistent message with all of its bytes present is, and it
//! poisons the parser -- the connection that produced it cannot be trusted
//! to be in frame again.
//!
//! # Version handling
//!
//! A parser is bound to the protocol version negotiated during the HELLO
//! exchange, and its encoder stamps that version into every outbound
//! header. The layouts implemented here are stable across the supported
//! versions (1, 3 and 4), so decoding is version-agnostic and simply
//! carries the header version through.

pub mod flags;
pub mod header;
pub mod message;
pub mod oxm;
pub mod parser;
pub mod port;

/// The TCP port OpenFlow controllers conventionally listen on.
pub const PORT: u16 = 6633;

/// An error decoding or encoding an OpenFlow message.
///
/// Truncation at a buffer boundary is deliberately *not* represented here:
/// callers hand [`message::decode`] a complete frame, and the
/// [`Parser`](parser::Parser) is responsible for waiting until one is
/// available. `Truncated` therefore always means the message lies about
/// its own contents.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("unknown message type code {0}")]
    UnknownMessageType(u8),

    #[error("reserved bit set in version octet {0:#04x}")]
    ReservedVersionBit(u8),

    #[error("truncated {0}")]
    Truncated(&'static str),

    #[error("{what} length {length} inconsistent with contents")]
    BadLength { what: &'static str, length: usize },

    #[error("unknown {what} value {value}")]
    UnknownValue { what: &'static str, value: u32 },

    #[error("{0} too large to encode")]
    Oversized(&'static str),
}
