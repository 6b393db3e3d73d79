// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The fixed message header shared by every OpenFlow message.

use crate::Error;
use byteorder::BigEndian;
use byteorder::ByteOrder;

/// Size in bytes of the fixed header.
pub const HEADER_SIZE: usize = 8;

/// The long-lived part of a message header: protocol version and
/// transaction id.
///
/// The wire header also carries a type code and the total message length.
/// Both are fully determined by the message body, so they are derived
/// during encoding and never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    /// The protocol version the message was (or will be) encoded under.
    pub version: u8,
    /// Transaction id, echoed by replies to correlate with requests.
    pub xid: u32,
}

/// The 8-byte header exactly as it appears on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawHeader {
    pub version: u8,
    pub type_code: u8,
    /// Total message length in bytes, header included.
    pub length: u16,
    pub xid: u32,
}

impl RawHeader {
    /// Peel a raw header off the front of `buf`.
    ///
    /// The top bit of the version octet is reserved and must be zero.
    pub fn parse(buf: &[u8]) -> Result<Self, Error> {
        if buf.len() < HEADER_SIZE {
            return Err(Error::Truncated("message header"));
        }
        if buf[0] & 0x80 != 0 {
            return Err(Error::ReservedVersionBit(buf[0]));
        }
        Ok(Self {
            version: buf[0],
            type_code: buf[1],
            length: BigEndian::read_u16(&buf[2..4]),
            xid: BigEndian::read_u32(&buf[4..8]),
        })
    }

    /// Append this header to `bytes`.
    pub fn marshal(&self, bytes: &mut Vec<u8>) {
        bytes.push(self.version & 0x7f);
        bytes.push(self.type_code);
        bytes.extend_from_slice(&self.length.to_be_bytes());
        bytes.extend_from_slice(&self.xid.to_be_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::Header;
    use super::RawHeader;
    use crate::Error;

    #[test]
    fn test_parse_marshal_roundtrip() {
        let header = RawHeader {
            version: 4,
            type_code: 0,
            length: 8,
            xid: 0xdead_beef,
        };
        let mut bytes = Vec::new();
        header.marshal(&mut bytes);
        assert_eq!(bytes, [4, 0, 0, 8, 0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(RawHeader::parse(&bytes).unwrap(), header);
    }

    #[test]
    fn test_reserved_version_bit() {
        let bytes = [0x84, 0, 0, 8, 0, 0, 0, 0];
        assert_eq!(
            RawHeader::parse(&bytes).unwrap_err(),
            Error::ReservedVersionBit(0x84),
        );
    }

    #[test]
    fn test_short_buffer() {
        assert_eq!(
            RawHeader::parse(&[4, 0, 0]).unwrap_err(),
            Error::Truncated("message header"),
        );
    }

    #[test]
    fn test_header_is_version_and_xid_only() {
        let header = Header { version: 4, xid: 7 };
        assert_eq!(header, Header { version: 4, xid: 7 });
    }
}
