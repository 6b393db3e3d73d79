// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The fixed-size port description structure.

use crate::flags::PortConfig;
use crate::flags::PortFeatures;
use crate::flags::PortState;
use crate::Error;
use byteorder::BigEndian;
use byteorder::ByteOrder;

/// Size in bytes of a port description on the wire.
pub const PORT_SIZE: usize = 64;

const PORT_NAME_LEN: usize = 16;

/// Description of a single switch port.
///
/// Appears in features replies and port-status messages. The name occupies
/// a fixed 16-byte field on the wire, zero-padded on encode and stripped
/// of trailing zeros on decode; names longer than the field are truncated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Port {
    pub port_no: u32,
    pub hw_addr: [u8; 6],
    pub name: String,
    pub config: PortConfig,
    pub state: PortState,
    /// Current features of the port.
    pub curr: PortFeatures,
    /// Features advertised to the peer.
    pub advertised: PortFeatures,
    /// Features the hardware supports.
    pub supported: PortFeatures,
    /// Features advertised by the peer.
    pub peer: PortFeatures,
    /// Current bit rate in kbps.
    pub curr_speed: u32,
    /// Maximum bit rate in kbps.
    pub max_speed: u32,
}

impl Port {
    /// Parse a port description from the front of `buf`.
    pub fn parse(buf: &[u8]) -> Result<Self, Error> {
        if buf.len() < PORT_SIZE {
            return Err(Error::Truncated("port description"));
        }
        let mut hw_addr = [0; 6];
        hw_addr.copy_from_slice(&buf[8..14]);
        let name_field = &buf[16..16 + PORT_NAME_LEN];
        let name_len = name_field
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |i| i + 1);
        let name = String::from_utf8_lossy(&name_field[..name_len]).into_owned();
        Ok(Self {
            port_no: BigEndian::read_u32(&buf[0..4]),
            hw_addr,
            name,
            config: PortConfig::from_bits_retain(BigEndian::read_u32(&buf[32..36])),
            state: PortState::from_bits_retain(BigEndian::read_u32(&buf[36..40])),
            curr: PortFeatures::from_bits_retain(BigEndian::read_u32(&buf[40..44])),
            advertised: PortFeatures::from_bits_retain(BigEndian::read_u32(&buf[44..48])),
            supported: PortFeatures::from_bits_retain(BigEndian::read_u32(&buf[48..52])),
            peer: PortFeatures::from_bits_retain(BigEndian::read_u32(&buf[52..56])),
            curr_speed: BigEndian::read_u32(&buf[56..60]),
            max_speed: BigEndian::read_u32(&buf[60..64]),
        })
    }

    /// Append the 64-byte wire form of this port to `bytes`.
    pub fn marshal(&self, bytes: &mut Vec<u8>) {
        bytes.extend_from_slice(&self.port_no.to_be_bytes());
        bytes.extend_from_slice(&[0; 4]);
        bytes.extend_from_slice(&self.hw_addr);
        bytes.extend_from_slice(&[0; 2]);
        let mut name_field = [0u8; PORT_NAME_LEN];
        let name = self.name.as_bytes();
        let name_len = name.len().min(PORT_NAME_LEN);
        name_field[..name_len].copy_from_slice(&name[..name_len]);
        bytes.extend_from_slice(&name_field);
        bytes.extend_from_slice(&self.config.bits().to_be_bytes());
        bytes.extend_from_slice(&self.state.bits().to_be_bytes());
        bytes.extend_from_slice(&self.curr.bits().to_be_bytes());
        bytes.extend_from_slice(&self.advertised.bits().to_be_bytes());
        bytes.extend_from_slice(&self.supported.bits().to_be_bytes());
        bytes.extend_from_slice(&self.peer.bits().to_be_bytes());
        bytes.extend_from_slice(&self.curr_speed.to_be_bytes());
        bytes.extend_from_slice(&self.max_speed.to_be_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::Port;
    use super::PORT_SIZE;
    use crate::flags::PortConfig;
    use crate::flags::PortFeatures;
    use crate::flags::PortState;
    use crate::Error;

    fn sample_port() -> Port {
        Port {
            port_no: 7,
            hw_addr: [0x02, 0x00, 0x00, 0x00, 0x00, 0x07],
            name: String::from("eth7"),
            config: PortConfig::PORT_DOWN,
            state: PortState::LINK_DOWN | PortState::LIVE,
            curr: PortFeatures::RATE_1GB_FD | PortFeatures::COPPER,
            advertised: PortFeatures::RATE_1GB_FD,
            supported: PortFeatures::RATE_1GB_FD | PortFeatures::RATE_10GB_FD,
            peer: PortFeatures::empty(),
            curr_speed: 1_000_000,
            max_speed: 10_000_000,
        }
    }

    #[test]
    fn test_roundtrip() {
        let port = sample_port();
        let mut bytes = Vec::new();
        port.marshal(&mut bytes);
        assert_eq!(bytes.len(), PORT_SIZE);
        assert_eq!(Port::parse(&bytes).unwrap(), port);
    }

    #[test]
    fn test_name_is_zero_padded_and_stripped() {
        let port = sample_port();
        let mut bytes = Vec::new();
        port.marshal(&mut bytes);
        // "eth7" then twelve zeros.
        assert_eq!(&bytes[16..20], b"eth7");
        assert!(bytes[20..32].iter().all(|&b| b == 0));
        assert_eq!(Port::parse(&bytes).unwrap().name, "eth7");
    }

    #[test]
    fn test_overlong_name_truncated() {
        let mut port = sample_port();
        port.name = String::from("a-port-name-well-beyond-the-field");
        let mut bytes = Vec::new();
        port.marshal(&mut bytes);
        assert_eq!(bytes.len(), PORT_SIZE);
        assert_eq!(Port::parse(&bytes).unwrap().name, "a-port-name-well");
    }

    #[test]
    fn test_truncated_buffer() {
        assert_eq!(
            Port::parse(&[0; PORT_SIZE - 1]).unwrap_err(),
            Error::Truncated("port description"),
        );
    }
}
