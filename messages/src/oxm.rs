// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! OpenFlow Extensible Match: TLV-encoded match fields and the padded
//! match structure that carries them.

use crate::Error;
use byteorder::BigEndian;
use byteorder::ByteOrder;

/// Namespace of an OXM field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u16)]
pub enum OxmClass {
    Nxm0 = 0x0000,
    Nxm1 = 0x0001,
    OpenflowBasic = 0x8000,
    Experimenter = 0xffff,
}

impl OxmClass {
    pub fn from_code(code: u16) -> Result<Self, Error> {
        match code {
            0x0000 => Ok(Self::Nxm0),
            0x0001 => Ok(Self::Nxm1),
            0x8000 => Ok(Self::OpenflowBasic),
            0xffff => Ok(Self::Experimenter),
            other => Err(Error::UnknownValue {
                what: "OXM class",
                value: u32::from(other),
            }),
        }
    }

    pub fn code(&self) -> u16 {
        *self as u16
    }
}

/// Match fields of the `OpenflowBasic` class.
///
/// For this class the value width is fixed by the field, not by the
/// on-wire length octet; [`bit_length`](Self::bit_length) is the canonical
/// table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum OxmField {
    InPort = 0,
    InPhyPort = 1,
    Metadata = 2,
    EthDst = 3,
    EthSrc = 4,
    EthType = 5,
    VlanVid = 6,
    VlanPcp = 7,
    IpDscp = 8,
    IpEcn = 9,
    IpProto = 10,
    Ipv4Src = 11,
    Ipv4Dst = 12,
    TcpSrc = 13,
    TcpDst = 14,
    UdpSrc = 15,
    UdpDst = 16,
    SctpSrc = 17,
    SctpDst = 18,
    Icmpv4Type = 19,
    Icmpv4Code = 20,
    ArpOp = 21,
    ArpSpa = 22,
    ArpTpa = 23,
    ArpSha = 24,
    ArpTha = 25,
    Ipv6Src = 26,
    Ipv6Dst = 27,
    Ipv6Flabel = 28,
    Icmpv6Type = 29,
    Icmpv6Code = 30,
    Ipv6NdTarget = 31,
    Ipv6NdSll = 32,
    Ipv6NdTll = 33,
    MplsLabel = 34,
    MplsTc = 35,
    MplsBos = 36,
    PbbIsid = 37,
    TunnelId = 38,
    Ipv6Exthdr = 39,
}

impl OxmField {
    pub fn from_code(code: u8) -> Option<Self> {
        use OxmField::*;
        let field = match code {
            0 => InPort,
            1 => InPhyPort,
            2 => Metadata,
            3 => EthDst,
            4 => EthSrc,
            5 => EthType,
            6 => VlanVid,
            7 => VlanPcp,
            8 => IpDscp,
            9 => IpEcn,
            10 => IpProto,
            11 => Ipv4Src,
            12 => Ipv4Dst,
            13 => TcpSrc,
            14 => TcpDst,
            15 => UdpSrc,
            16 => UdpDst,
            17 => SctpSrc,
            18 => SctpDst,
            19 => Icmpv4Type,
            20 => Icmpv4Code,
            21 => ArpOp,
            22 => ArpSpa,
            23 => ArpTpa,
            24 => ArpSha,
            25 => ArpTha,
            26 => Ipv6Src,
            27 => Ipv6Dst,
            28 => Ipv6Flabel,
            29 => Icmpv6Type,
            30 => Icmpv6Code,
            31 => Ipv6NdTarget,
            32 => Ipv6NdSll,
            33 => Ipv6NdTll,
            34 => MplsLabel,
            35 => MplsTc,
            36 => MplsBos,
            37 => PbbIsid,
            38 => TunnelId,
            39 => Ipv6Exthdr,
            _ => return None,
        };
        Some(field)
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Canonical width of the field's value in bits.
    pub fn bit_length(&self) -> usize {
        use OxmField::*;
        match self {
            InPort | InPhyPort => 32,
            Metadata => 64,
            EthDst | EthSrc => 48,
            EthType => 16,
            VlanVid => 13,
            VlanPcp => 3,
            IpDscp => 6,
            IpEcn => 2,
            IpProto => 8,
            Ipv4Src | Ipv4Dst => 32,
            TcpSrc | TcpDst | UdpSrc | UdpDst | SctpSrc | SctpDst => 16,
            Icmpv4Type | Icmpv4Code => 8,
            ArpOp => 16,
            ArpSpa | ArpTpa => 32,
            ArpSha | ArpTha => 48,
            Ipv6Src | Ipv6Dst => 128,
            Ipv6Flabel => 20,
            Icmpv6Type | Icmpv6Code => 8,
            Ipv6NdTarget => 128,
            Ipv6NdSll | Ipv6NdTll => 48,
            MplsLabel => 20,
            MplsTc => 3,
            MplsBos => 1,
            PbbIsid => 24,
            TunnelId => 64,
            Ipv6Exthdr => 9,
        }
    }

    /// Width of the field's value in whole bytes.
    pub fn byte_length(&self) -> usize {
        (self.bit_length() + 7) / 8
    }
}

/// A single TLV-encoded match field.
///
/// The wire header packs the class, the 7-bit field number, a has-mask bit
/// and the body length into four bytes. For the `OpenflowBasic` class the
/// value (and mask) width is taken from the field table and the encoder
/// zeroes any bits beyond the field's canonical bit length; for the other
/// classes the width is whatever the length octet says, split evenly
/// between value and mask when a mask is present.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OxmTlv {
    pub class: OxmClass,
    pub field: u8,
    pub value: Vec<u8>,
    pub mask: Option<Vec<u8>>,
}

impl OxmTlv {
    /// Build an `OpenflowBasic` field, validating widths and zeroing bits
    /// beyond the field's canonical bit length.
    pub fn basic(field: OxmField, value: Vec<u8>, mask: Option<Vec<u8>>) -> Result<Self, Error> {
        if value.len() != field.byte_length() {
            return Err(Error::BadLength {
                what: "OXM value",
                length: value.len(),
            });
        }
        if let Some(mask) = &mask {
            if mask.len() != field.byte_length() {
                return Err(Error::BadLength {
                    what: "OXM mask",
                    length: mask.len(),
                });
            }
        }
        Ok(Self {
            class: OxmClass::OpenflowBasic,
            field: field.code(),
            value: truncate_to_bits(&value, field.bit_length()),
            mask: mask.map(|m| truncate_to_bits(&m, field.bit_length())),
        })
    }

    /// An exact-match on the ingress port.
    pub fn in_port(port_no: u32) -> Self {
        Self {
            class: OxmClass::OpenflowBasic,
            field: OxmField::InPort.code(),
            value: port_no.to_be_bytes().to_vec(),
            mask: None,
        }
    }

    /// Parse one TLV from the front of `buf`, returning it along with the
    /// number of bytes consumed.
    pub fn parse(buf: &[u8]) -> Result<(Self, usize), Error> {
        if buf.len() < 4 {
            return Err(Error::Truncated("OXM header"));
        }
        let wire = BigEndian::read_u32(&buf[..4]);
        let class = OxmClass::from_code((wire >> 16) as u16)?;
        let field = ((wire >> 9) & 0x7f) as u8;
        let has_mask = wire & 0x100 != 0;
        let body_len = (wire & 0xff) as usize;
        if buf.len() < 4 + body_len {
            return Err(Error::Truncated("OXM body"));
        }
        let value_len = match class {
            OxmClass::OpenflowBasic => {
                let known = OxmField::from_code(field).ok_or(Error::UnknownValue {
                    what: "OXM basic field",
                    value: u32::from(field),
                })?;
                let width = known.byte_length();
                let expected = if has_mask { width * 2 } else { width };
                if body_len != expected {
                    return Err(Error::BadLength {
                        what: "OXM field",
                        length: body_len,
                    });
                }
                width
            }
            _ => {
                if has_mask {
                    if body_len % 2 != 0 {
                        return Err(Error::BadLength {
                            what: "masked OXM field",
                            length: body_len,
                        });
                    }
                    body_len / 2
                } else {
                    body_len
                }
            }
        };
        let value = buf[4..4 + value_len].to_vec();
        let mask = has_mask.then(|| buf[4 + value_len..4 + body_len].to_vec());
        Ok((
            Self {
                class,
                field,
                value,
                mask,
            },
            4 + body_len,
        ))
    }

    /// Append the wire form of this TLV to `bytes`.
    pub fn marshal(&self, bytes: &mut Vec<u8>) -> Result<(), Error> {
        let (value, mask) = match self.class {
            OxmClass::OpenflowBasic => {
                let field = OxmField::from_code(self.field).ok_or(Error::UnknownValue {
                    what: "OXM basic field",
                    value: u32::from(self.field),
                })?;
                let width = field.byte_length();
                if self.value.len() != width {
                    return Err(Error::BadLength {
                        what: "OXM value",
                        length: self.value.len(),
                    });
                }
                if let Some(mask) = &self.mask {
                    if mask.len() != width {
                        return Err(Error::BadLength {
                            what: "OXM mask",
                            length: mask.len(),
                        });
                    }
                }
                let bits = field.bit_length();
                (
                    truncate_to_bits(&self.value, bits),
                    self.mask.as_ref().map(|m| truncate_to_bits(m, bits)),
                )
            }
            _ => {
                if let Some(mask) = &self.mask {
                    if mask.len() != self.value.len() {
                        return Err(Error::BadLength {
                            what: "OXM mask",
                            length: mask.len(),
                        });
                    }
                }
                (self.value.clone(), self.mask.clone())
            }
        };
        let body_len = value.len() + mask.as_ref().map_or(0, Vec::len);
        if body_len > 0xff {
            return Err(Error::Oversized("OXM field"));
        }
        if self.field > 0x7f {
            return Err(Error::UnknownValue {
                what: "OXM field number",
                value: u32::from(self.field),
            });
        }
        let wire = (u32::from(self.class.code()) << 16)
            | (u32::from(self.field) << 9)
            | (u32::from(self.mask.is_some()) << 8)
            | body_len as u32;
        bytes.extend_from_slice(&wire.to_be_bytes());
        bytes.extend_from_slice(&value);
        if let Some(mask) = mask {
            bytes.extend_from_slice(&mask);
        }
        Ok(())
    }

    fn wire_len(&self) -> usize {
        4 + self.value.len() + self.mask.as_ref().map_or(0, Vec::len)
    }
}

// Zero the bits of a big-endian value beyond `bits`; the excess lives in
// the high bits of the first byte.
fn truncate_to_bits(bytes: &[u8], bits: usize) -> Vec<u8> {
    let mut out = bytes.to_vec();
    let excess = out.len() * 8 - bits;
    if excess > 0 {
        if let Some(first) = out.first_mut() {
            *first &= 0xff >> excess;
        }
    }
    out
}

/// Match type discriminator in the match header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u16)]
pub enum MatchType {
    /// The fixed-layout match of early protocol revisions.
    Standard = 0,
    /// TLV-encoded OXM fields.
    Oxm = 1,
}

impl MatchType {
    pub fn from_code(code: u16) -> Result<Self, Error> {
        match code {
            0 => Ok(Self::Standard),
            1 => Ok(Self::Oxm),
            other => Err(Error::UnknownValue {
                what: "match type",
                value: u32::from(other),
            }),
        }
    }
}

/// A packet predicate: an ordered sequence of OXM fields.
///
/// On the wire a 4-byte header carries the match type and the length
/// excluding padding; the whole structure is then zero-padded to a
/// multiple of 8 bytes. A match with no fields occupies exactly 8 bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Match {
    pub typ: MatchType,
    pub fields: Vec<OxmTlv>,
}

impl Match {
    pub fn new() -> Self {
        Self {
            typ: MatchType::Oxm,
            fields: Vec::new(),
        }
    }

    /// Length of the match excluding padding.
    fn length(&self) -> usize {
        4 + self.fields.iter().map(OxmTlv::wire_len).sum::<usize>()
    }

    /// Parse a match from the front of `buf`, returning it along with the
    /// number of bytes consumed, padding included.
    pub fn parse(buf: &[u8]) -> Result<(Self, usize), Error> {
        if buf.len() < 4 {
            return Err(Error::Truncated("match header"));
        }
        let typ = MatchType::from_code(BigEndian::read_u16(&buf[..2]))?;
        let length = BigEndian::read_u16(&buf[2..4]) as usize;
        if length < 4 {
            return Err(Error::BadLength {
                what: "match",
                length,
            });
        }
        let padded = (length + 7) / 8 * 8;
        if buf.len() < padded {
            return Err(Error::Truncated("match"));
        }
        let mut fields = Vec::new();
        let mut offset = 4;
        while offset < length {
            let (tlv, consumed) = OxmTlv::parse(&buf[offset..length])?;
            fields.push(tlv);
            offset += consumed;
        }
        Ok((Self { typ, fields }, padded))
    }

    /// Append the wire form of this match to `bytes`.
    pub fn marshal(&self, bytes: &mut Vec<u8>) -> Result<(), Error> {
        let length = self.length();
        if length > usize::from(u16::MAX) {
            return Err(Error::Oversized("match"));
        }
        bytes.extend_from_slice(&(self.typ as u16).to_be_bytes());
        bytes.extend_from_slice(&(length as u16).to_be_bytes());
        for field in &self.fields {
            field.marshal(bytes)?;
        }
        let padded = (length + 7) / 8 * 8;
        bytes.extend(std::iter::repeat(0).take(padded - length));
        Ok(())
    }
}

impl Default for Match {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::Match;
    use super::MatchType;
    use super::OxmClass;
    use super::OxmField;
    use super::OxmTlv;
    use crate::Error;

    #[test]
    fn test_empty_match_is_eight_bytes() {
        let mut bytes = Vec::new();
        Match::new().marshal(&mut bytes).unwrap();
        assert_eq!(bytes, [0, 1, 0, 4, 0, 0, 0, 0]);
        let (parsed, consumed) = Match::parse(&bytes).unwrap();
        assert_eq!(consumed, 8);
        assert!(parsed.fields.is_empty());
    }

    #[test]
    fn test_in_port_roundtrip() {
        let mut m = Match::new();
        m.fields.push(OxmTlv::in_port(0x1122_3344));
        let mut bytes = Vec::new();
        m.marshal(&mut bytes).unwrap();
        // 4 header + 8 TLV, padded to 16.
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[..4], &[0, 1, 0, 12]);
        assert_eq!(&bytes[4..8], &[0x80, 0x00, 0x00, 0x04]);
        assert_eq!(&bytes[8..12], &[0x11, 0x22, 0x33, 0x44]);
        let (parsed, consumed) = Match::parse(&bytes).unwrap();
        assert_eq!(consumed, 16);
        assert_eq!(parsed, m);
    }

    #[test]
    fn test_basic_value_is_masked_to_field_width() {
        let tlv = OxmTlv::basic(OxmField::VlanVid, vec![0xff, 0xff], None).unwrap();
        // 13-bit field: the top three bits of the first byte are zeroed.
        assert_eq!(tlv.value, vec![0x1f, 0xff]);
    }

    #[test]
    fn test_masked_field_doubles_body_length() {
        let tlv = OxmTlv::basic(
            OxmField::Ipv4Src,
            vec![10, 0, 0, 0],
            Some(vec![255, 255, 255, 0]),
        )
        .unwrap();
        let mut bytes = Vec::new();
        tlv.marshal(&mut bytes).unwrap();
        assert_eq!(bytes.len(), 12);
        // has-mask bit and the doubled length octet.
        assert_eq!(bytes[2], (OxmField::Ipv4Src.code() << 1) | 1);
        assert_eq!(bytes[3], 8);
        let (parsed, consumed) = OxmTlv::parse(&bytes).unwrap();
        assert_eq!(consumed, 12);
        assert_eq!(parsed, tlv);
    }

    #[test]
    fn test_experimenter_class_width_from_wire() {
        let tlv = OxmTlv {
            class: OxmClass::Experimenter,
            field: 0x12,
            value: vec![1, 2, 3, 4, 5],
            mask: None,
        };
        let mut bytes = Vec::new();
        tlv.marshal(&mut bytes).unwrap();
        let (parsed, consumed) = OxmTlv::parse(&bytes).unwrap();
        assert_eq!(consumed, 9);
        assert_eq!(parsed, tlv);
    }

    #[test]
    fn test_unknown_basic_field_rejected() {
        let bytes = [0x80, 0x00, 99 << 1, 4, 0, 0, 0, 0];
        assert_eq!(
            OxmTlv::parse(&bytes).unwrap_err(),
            Error::UnknownValue {
                what: "OXM basic field",
                value: 99,
            },
        );
    }

    #[test]
    fn test_wrong_basic_length_rejected() {
        // in_port is four bytes; claim two.
        let bytes = [0x80, 0x00, 0x00, 2, 0, 0];
        assert_eq!(
            OxmTlv::parse(&bytes).unwrap_err(),
            Error::BadLength {
                what: "OXM field",
                length: 2,
            },
        );
    }

    #[test]
    fn test_match_type_standard() {
        assert_eq!(MatchType::from_code(0).unwrap(), MatchType::Standard);
        assert!(MatchType::from_code(7).is_err());
    }
}
