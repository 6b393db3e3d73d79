// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Message definitions and the per-type codec.

use crate::flags::Capabilities;
use crate::flags::ConfigFlags;
use crate::header::Header;
use crate::header::RawHeader;
use crate::header::HEADER_SIZE;
use crate::oxm::Match;
use crate::port::Port;
use crate::port::PORT_SIZE;
use crate::Error;
use byteorder::BigEndian;
use byteorder::ByteOrder;

/// Protocol versions this crate is written against.
pub mod version {
    /// OpenFlow 1.0.
    pub const V1: u8 = 1;
    /// OpenFlow 1.2.
    pub const V3: u8 = 3;
    /// OpenFlow 1.3, the first version whose HELLO carries elements.
    pub const V4: u8 = 4;
}

/// The message type table: symbolic names for the wire type codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum MsgType {
    Hello = 0,
    Error = 1,
    EchoRequest = 2,
    EchoReply = 3,
    FeaturesRequest = 5,
    FeaturesReply = 6,
    GetConfigRequest = 7,
    GetConfigReply = 8,
    SetConfig = 9,
    PacketIn = 10,
    FlowRemoved = 11,
    PortStatus = 12,
    PacketOut = 13,
    FlowMod = 14,
    GroupMod = 15,
    PortMod = 16,
    TableMod = 17,
    MultipartRequest = 18,
    MultipartReply = 19,
    BarrierRequest = 20,
    BarrierReply = 21,
    QueueGetConfigRequest = 22,
    QueueGetConfigReply = 23,
    RoleRequest = 24,
    RoleReply = 25,
    GetAsyncRequest = 26,
    GetAsyncReply = 27,
    SetAsync = 28,
    MeterMod = 29,
}

impl MsgType {
    pub fn from_code(code: u8) -> Result<Self, Error> {
        use MsgType::*;
        let typ = match code {
            0 => Hello,
            1 => Error,
            2 => EchoRequest,
            3 => EchoReply,
            5 => FeaturesRequest,
            6 => FeaturesReply,
            7 => GetConfigRequest,
            8 => GetConfigReply,
            9 => SetConfig,
            10 => PacketIn,
            11 => FlowRemoved,
            12 => PortStatus,
            13 => PacketOut,
            14 => FlowMod,
            15 => GroupMod,
            16 => PortMod,
            17 => TableMod,
            18 => MultipartRequest,
            19 => MultipartReply,
            20 => BarrierRequest,
            21 => BarrierReply,
            22 => QueueGetConfigRequest,
            23 => QueueGetConfigReply,
            24 => RoleRequest,
            25 => RoleReply,
            26 => GetAsyncRequest,
            27 => GetAsyncReply,
            28 => SetAsync,
            29 => MeterMod,
            other => return Err(crate::Error::UnknownMessageType(other)),
        };
        Ok(typ)
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// True for the types the switch side may emit towards a controller.
    pub fn is_outbound(&self) -> bool {
        use MsgType::*;
        matches!(
            self,
            Hello
                | Error
                | EchoReply
                | FeaturesReply
                | GetConfigReply
                | PacketIn
                | FlowRemoved
                | PortStatus
                | MultipartReply
                | BarrierReply
                | QueueGetConfigReply
                | RoleReply
                | GetAsyncReply
        )
    }

    /// True for the inbound types that are delivered to the owner of a
    /// connection rather than handled or dropped by it.
    pub fn is_forwardable(&self) -> bool {
        use MsgType::*;
        matches!(
            self,
            EchoRequest
                | FeaturesRequest
                | GetConfigRequest
                | SetConfig
                | PacketOut
                | FlowMod
                | GroupMod
                | PortMod
                | TableMod
                | MultipartRequest
                | BarrierRequest
                | QueueGetConfigRequest
                | MeterMod
        )
    }

    /// True for requests that modify switch state and are therefore
    /// refused from a controller in the slave role.
    pub fn modifies_switch_state(&self) -> bool {
        use MsgType::*;
        matches!(self, FlowMod | GroupMod | PortMod | TableMod | MeterMod)
    }
}

const HELLO_ELEM_VERSIONBITMAP: u16 = 1;

/// The handshake message opening every connection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Hello {
    pub elements: Vec<HelloElement>,
}

/// A HELLO element. Only the version bitmap is recognized; unknown
/// elements are skipped during decoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HelloElement {
    /// The set of protocol versions the sender supports.
    VersionBitmap(Vec<u8>),
}

impl Hello {
    /// The HELLO a speaker supporting `versions` sends.
    ///
    /// Speakers whose highest version predates HELLO elements send an
    /// empty body; the rest advertise every supported version in a single
    /// bitmap element.
    pub fn with_versions(versions: &[u8]) -> Self {
        match versions.iter().copied().max() {
            Some(max) if max >= version::V4 => Self {
                elements: vec![HelloElement::VersionBitmap(versions.to_vec())],
            },
            _ => Self::default(),
        }
    }

    /// The versions advertised by the first bitmap element, if any.
    pub fn version_bitmap(&self) -> Option<&[u8]> {
        self.elements.iter().find_map(|element| match element {
            HelloElement::VersionBitmap(versions) => Some(versions.as_slice()),
        })
    }

    fn parse(body: &[u8]) -> Result<Self, Error> {
        let mut elements = Vec::new();
        let mut rest = body;
        while !rest.is_empty() {
            if rest.len() < 4 {
                return Err(Error::Truncated("hello element"));
            }
            let typ = BigEndian::read_u16(&rest[..2]);
            let length = BigEndian::read_u16(&rest[2..4]) as usize;
            if length < 4 {
                return Err(Error::BadLength {
                    what: "hello element",
                    length,
                });
            }
            if rest.len() < length {
                return Err(Error::Truncated("hello element"));
            }
            if typ == HELLO_ELEM_VERSIONBITMAP {
                elements.push(HelloElement::VersionBitmap(unpack_version_bitmap(
                    &rest[4..length],
                )?));
            }
            let padded = (length + 7) / 8 * 8;
            rest = &rest[padded.min(rest.len())..];
        }
        Ok(Self { elements })
    }

    fn marshal(&self, bytes: &mut Vec<u8>) {
        for element in &self.elements {
            match element {
                HelloElement::VersionBitmap(versions) => {
                    let bitmap = pack_version_bitmap(versions);
                    let length = 4 + bitmap.len();
                    bytes.extend_from_slice(&HELLO_ELEM_VERSIONBITMAP.to_be_bytes());
                    bytes.extend_from_slice(&(length as u16).to_be_bytes());
                    bytes.extend_from_slice(&bitmap);
                    let padded = (length + 7) / 8 * 8;
                    bytes.extend(std::iter::repeat(0).take(padded - length));
                }
            }
        }
    }
}

// A version bitmap is a sequence of 32-bit words; bit `v % 32` of word
// `v / 32` marks version `v` as supported.
fn unpack_version_bitmap(bitmap: &[u8]) -> Result<Vec<u8>, Error> {
    if bitmap.len() % 4 != 0 {
        return Err(Error::BadLength {
            what: "version bitmap",
            length: bitmap.len(),
        });
    }
    let mut versions = Vec::new();
    for (index, word) in bitmap.chunks_exact(4).enumerate() {
        let word = BigEndian::read_u32(word);
        for bit in 0..32 {
            let v = index * 32 + bit;
            if v <= 0x7f && word & (1 << bit) != 0 {
                versions.push(v as u8);
            }
        }
    }
    Ok(versions)
}

fn pack_version_bitmap(versions: &[u8]) -> Vec<u8> {
    let max = versions.iter().copied().max().unwrap_or(0);
    let mut words = vec![0u32; usize::from(max) / 32 + 1];
    for &v in versions {
        words[usize::from(v) / 32] |= 1 << (v % 32);
    }
    let mut bytes = Vec::with_capacity(words.len() * 4);
    for word in words {
        bytes.extend_from_slice(&word.to_be_bytes());
    }
    bytes
}

/// The error type table. Codes are scoped to their type; see the per-type
/// code enums below for the ones this crate names.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorType {
    HelloFailed = 0,
    BadRequest = 1,
    BadAction = 2,
    BadInstruction = 3,
    BadMatch = 4,
    FlowModFailed = 5,
    GroupModFailed = 6,
    PortModFailed = 7,
    TableModFailed = 8,
    QueueOpFailed = 9,
    SwitchConfigFailed = 10,
    RoleRequestFailed = 11,
    MeterModFailed = 12,
    TableFeaturesFailed = 13,
}

impl ErrorType {
    pub fn from_code(code: u16) -> Result<Self, Error> {
        use ErrorType::*;
        let typ = match code {
            0 => HelloFailed,
            1 => BadRequest,
            2 => BadAction,
            3 => BadInstruction,
            4 => BadMatch,
            5 => FlowModFailed,
            6 => GroupModFailed,
            7 => PortModFailed,
            8 => TableModFailed,
            9 => QueueOpFailed,
            10 => SwitchConfigFailed,
            11 => RoleRequestFailed,
            12 => MeterModFailed,
            13 => TableFeaturesFailed,
            other => {
                return Err(Error::UnknownValue {
                    what: "error type",
                    value: u32::from(other),
                })
            }
        };
        Ok(typ)
    }

    pub fn code(&self) -> u16 {
        *self as u16
    }
}

const ERROR_TYPE_EXPERIMENTER: u16 = 0xffff;

/// Codes scoped to [`ErrorType::HelloFailed`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u16)]
pub enum HelloFailedCode {
    /// No compatible version.
    Incompatible = 0,
    /// Permissions error.
    EPerm = 1,
}

/// Codes scoped to [`ErrorType::BadRequest`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u16)]
pub enum BadRequestCode {
    BadVersion = 0,
    BadType = 1,
    BadMultipart = 2,
    BadExperimenter = 3,
    BadExpType = 4,
    EPerm = 5,
    BadLen = 6,
    BufferEmpty = 7,
    BufferUnknown = 8,
    BadTableId = 9,
    /// The request came from a controller in the slave role.
    IsSlave = 10,
    BadPort = 11,
    BadPacket = 12,
    MultipartBufferOverflow = 13,
}

/// The typed portion of an error message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorPayload {
    Standard { err_type: ErrorType, code: u16 },
    Experimenter { exp_type: u16, experimenter: u32 },
}

/// An error notification.
///
/// Construction of these is the one place where the crate acts as a
/// capability for its callers: the connection endpoint builds error
/// replies through the constructors here and never assembles raw codes
/// itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorMsg {
    pub payload: ErrorPayload,
    /// Arbitrary trailing data, typically a prefix of the offending
    /// request.
    pub data: Vec<u8>,
}

impl ErrorMsg {
    pub fn bad_request(code: BadRequestCode) -> Self {
        Self {
            payload: ErrorPayload::Standard {
                err_type: ErrorType::BadRequest,
                code: code as u16,
            },
            data: Vec::new(),
        }
    }

    pub fn hello_failed(code: HelloFailedCode) -> Self {
        Self {
            payload: ErrorPayload::Standard {
                err_type: ErrorType::HelloFailed,
                code: code as u16,
            },
            data: Vec::new(),
        }
    }

    fn parse(body: &[u8]) -> Result<Self, Error> {
        if body.len() < 4 {
            return Err(Error::Truncated("error message"));
        }
        let raw_type = BigEndian::read_u16(&body[..2]);
        if raw_type == ERROR_TYPE_EXPERIMENTER {
            if body.len() < 8 {
                return Err(Error::Truncated("experimenter error message"));
            }
            Ok(Self {
                payload: ErrorPayload::Experimenter {
                    exp_type: BigEndian::read_u16(&body[2..4]),
                    experimenter: BigEndian::read_u32(&body[4..8]),
                },
                data: body[8..].to_vec(),
            })
        } else {
            Ok(Self {
                payload: ErrorPayload::Standard {
                    err_type: ErrorType::from_code(raw_type)?,
                    code: BigEndian::read_u16(&body[2..4]),
                },
                data: body[4..].to_vec(),
            })
        }
    }

    fn marshal(&self, bytes: &mut Vec<u8>) {
        match self.payload {
            ErrorPayload::Standard { err_type, code } => {
                bytes.extend_from_slice(&err_type.code().to_be_bytes());
                bytes.extend_from_slice(&code.to_be_bytes());
            }
            ErrorPayload::Experimenter {
                exp_type,
                experimenter,
            } => {
                bytes.extend_from_slice(&ERROR_TYPE_EXPERIMENTER.to_be_bytes());
                bytes.extend_from_slice(&exp_type.to_be_bytes());
                bytes.extend_from_slice(&experimenter.to_be_bytes());
            }
        }
        bytes.extend_from_slice(&self.data);
    }
}

/// Body of a features reply.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeaturesReply {
    /// MAC-address portion of the datapath id.
    pub datapath_mac: [u8; 6],
    /// Implementer-defined portion of the datapath id.
    pub datapath_id: u16,
    /// Number of packets the switch can buffer at once.
    pub n_buffers: u32,
    /// Number of flow tables.
    pub n_tables: u8,
    pub capabilities: Capabilities,
    pub ports: Vec<Port>,
}

const FEATURES_REPLY_FIXED: usize = 24;

impl FeaturesReply {
    fn parse(body: &[u8]) -> Result<Self, Error> {
        if body.len() < FEATURES_REPLY_FIXED {
            return Err(Error::Truncated("features reply"));
        }
        let mut datapath_mac = [0; 6];
        datapath_mac.copy_from_slice(&body[..6]);
        let ports_buf = &body[FEATURES_REPLY_FIXED..];
        if ports_buf.len() % PORT_SIZE != 0 {
            return Err(Error::BadLength {
                what: "features reply ports",
                length: ports_buf.len(),
            });
        }
        let ports = ports_buf
            .chunks_exact(PORT_SIZE)
            .map(Port::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            datapath_mac,
            datapath_id: BigEndian::read_u16(&body[6..8]),
            n_buffers: BigEndian::read_u32(&body[8..12]),
            n_tables: body[12],
            capabilities: Capabilities::from_bits_retain(BigEndian::read_u32(&body[16..20])),
            ports,
        })
    }

    fn marshal(&self, bytes: &mut Vec<u8>) {
        bytes.extend_from_slice(&self.datapath_mac);
        bytes.extend_from_slice(&self.datapath_id.to_be_bytes());
        bytes.extend_from_slice(&self.n_buffers.to_be_bytes());
        bytes.push(self.n_tables);
        bytes.extend_from_slice(&[0; 3]);
        bytes.extend_from_slice(&self.capabilities.bits().to_be_bytes());
        bytes.extend_from_slice(&[0; 4]);
        for port in &self.ports {
            port.marshal(bytes);
        }
    }
}

/// Body shared by get-config replies and set-config requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SwitchConfig {
    pub flags: ConfigFlags,
    /// Bytes of each packet to send to the controller on a table miss.
    pub miss_send_len: u16,
}

impl SwitchConfig {
    fn parse(body: &[u8]) -> Result<Self, Error> {
        if body.len() < 4 {
            return Err(Error::Truncated("switch configuration"));
        }
        if body.len() > 4 {
            return Err(Error::BadLength {
                what: "switch configuration",
                length: body.len(),
            });
        }
        Ok(Self {
            flags: ConfigFlags::from_bits_retain(BigEndian::read_u16(&body[..2])),
            miss_send_len: BigEndian::read_u16(&body[2..4]),
        })
    }

    fn marshal(&self, bytes: &mut Vec<u8>) {
        bytes.extend_from_slice(&self.flags.bits().to_be_bytes());
        bytes.extend_from_slice(&self.miss_send_len.to_be_bytes());
    }
}

/// Why a packet was sent to the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum PacketInReason {
    NoMatch = 0,
    Action = 1,
    InvalidTtl = 2,
}

impl PacketInReason {
    fn from_code(code: u8) -> Result<Self, Error> {
        match code {
            0 => Ok(Self::NoMatch),
            1 => Ok(Self::Action),
            2 => Ok(Self::InvalidTtl),
            other => Err(Error::UnknownValue {
                what: "packet-in reason",
                value: u32::from(other),
            }),
        }
    }
}

/// A packet handed up to the controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PacketIn {
    /// Id of the buffer holding the packet on the switch, or `!0` when the
    /// whole packet is included.
    pub buffer_id: u32,
    pub reason: PacketInReason,
    pub table_id: u8,
    pub match_field: Match,
    pub data: Vec<u8>,
}

impl PacketIn {
    fn parse(body: &[u8]) -> Result<Self, Error> {
        if body.len() < 8 {
            return Err(Error::Truncated("packet-in"));
        }
        let buffer_id = BigEndian::read_u32(&body[..4]);
        let total_len = BigEndian::read_u16(&body[4..6]) as usize;
        let reason = PacketInReason::from_code(body[6])?;
        let table_id = body[7];
        let (match_field, consumed) = Match::parse(&body[8..])?;
        let rest = &body[8 + consumed..];
        if rest.len() < 2 {
            return Err(Error::Truncated("packet-in"));
        }
        let data = &rest[2..];
        if data.len() != total_len {
            return Err(Error::BadLength {
                what: "packet-in data",
                length: data.len(),
            });
        }
        Ok(Self {
            buffer_id,
            reason,
            table_id,
            match_field,
            data: data.to_vec(),
        })
    }

    fn marshal(&self, bytes: &mut Vec<u8>) -> Result<(), Error> {
        if self.data.len() > usize::from(u16::MAX) {
            return Err(Error::Oversized("packet-in data"));
        }
        bytes.extend_from_slice(&self.buffer_id.to_be_bytes());
        bytes.extend_from_slice(&(self.data.len() as u16).to_be_bytes());
        bytes.push(self.reason as u8);
        bytes.push(self.table_id);
        self.match_field.marshal(bytes)?;
        bytes.extend_from_slice(&[0; 2]);
        bytes.extend_from_slice(&self.data);
        Ok(())
    }
}

/// Why a flow was removed from a table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum FlowRemovedReason {
    IdleTimeout = 0,
    HardTimeout = 1,
    Delete = 2,
    GroupDelete = 3,
}

impl FlowRemovedReason {
    fn from_code(code: u8) -> Result<Self, Error> {
        match code {
            0 => Ok(Self::IdleTimeout),
            1 => Ok(Self::HardTimeout),
            2 => Ok(Self::Delete),
            3 => Ok(Self::GroupDelete),
            other => Err(Error::UnknownValue {
                what: "flow-removed reason",
                value: u32::from(other),
            }),
        }
    }
}

/// Notification that a flow entry expired or was deleted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowRemoved {
    pub cookie: u64,
    pub priority: u16,
    pub reason: FlowRemovedReason,
    pub table_id: u8,
    pub duration_sec: u32,
    pub duration_nsec: u32,
    pub idle_timeout: u16,
    pub hard_timeout: u16,
    pub packet_count: u64,
    pub byte_count: u64,
    pub match_field: Match,
}

const FLOW_REMOVED_FIXED: usize = 40;

impl FlowRemoved {
    fn parse(body: &[u8]) -> Result<Self, Error> {
        if body.len() < FLOW_REMOVED_FIXED {
            return Err(Error::Truncated("flow-removed"));
        }
        let (match_field, consumed) = Match::parse(&body[FLOW_REMOVED_FIXED..])?;
        if FLOW_REMOVED_FIXED + consumed != body.len() {
            return Err(Error::BadLength {
                what: "flow-removed",
                length: body.len(),
            });
        }
        Ok(Self {
            cookie: BigEndian::read_u64(&body[..8]),
            priority: BigEndian::read_u16(&body[8..10]),
            reason: FlowRemovedReason::from_code(body[10])?,
            table_id: body[11],
            duration_sec: BigEndian::read_u32(&body[12..16]),
            duration_nsec: BigEndian::read_u32(&body[16..20]),
            idle_timeout: BigEndian::read_u16(&body[20..22]),
            hard_timeout: BigEndian::read_u16(&body[22..24]),
            packet_count: BigEndian::read_u64(&body[24..32]),
            byte_count: BigEndian::read_u64(&body[32..40]),
            match_field,
        })
    }

    fn marshal(&self, bytes: &mut Vec<u8>) -> Result<(), Error> {
        bytes.extend_from_slice(&self.cookie.to_be_bytes());
        bytes.extend_from_slice(&self.priority.to_be_bytes());
        bytes.push(self.reason as u8);
        bytes.push(self.table_id);
        bytes.extend_from_slice(&self.duration_sec.to_be_bytes());
        bytes.extend_from_slice(&self.duration_nsec.to_be_bytes());
        bytes.extend_from_slice(&self.idle_timeout.to_be_bytes());
        bytes.extend_from_slice(&self.hard_timeout.to_be_bytes());
        bytes.extend_from_slice(&self.packet_count.to_be_bytes());
        bytes.extend_from_slice(&self.byte_count.to_be_bytes());
        self.match_field.marshal(bytes)
    }
}

/// What happened to the port a port-status message describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum PortReason {
    Add = 0,
    Delete = 1,
    Modify = 2,
}

impl PortReason {
    fn from_code(code: u8) -> Result<Self, Error> {
        match code {
            0 => Ok(Self::Add),
            1 => Ok(Self::Delete),
            2 => Ok(Self::Modify),
            other => Err(Error::UnknownValue {
                what: "port-status reason",
                value: u32::from(other),
            }),
        }
    }
}

/// Notification that a port was added, removed or modified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortStatus {
    pub reason: PortReason,
    pub port: Port,
}

const PORT_STATUS_LEN: usize = 8 + PORT_SIZE;

impl PortStatus {
    fn parse(body: &[u8]) -> Result<Self, Error> {
        if body.len() < PORT_STATUS_LEN {
            return Err(Error::Truncated("port-status"));
        }
        if body.len() > PORT_STATUS_LEN {
            return Err(Error::BadLength {
                what: "port-status",
                length: body.len(),
            });
        }
        Ok(Self {
            reason: PortReason::from_code(body[0])?,
            port: Port::parse(&body[8..])?,
        })
    }

    fn marshal(&self, bytes: &mut Vec<u8>) {
        bytes.push(self.reason as u8);
        bytes.extend_from_slice(&[0; 7]);
        self.port.marshal(bytes);
    }
}

/// The typed body of a message.
///
/// Types without a fully-specified layout here carry their raw body bytes
/// and round-trip unchanged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessageBody {
    Hello(Hello),
    Error(ErrorMsg),
    EchoRequest(Vec<u8>),
    EchoReply(Vec<u8>),
    FeaturesRequest,
    FeaturesReply(FeaturesReply),
    GetConfigRequest(Vec<u8>),
    GetConfigReply(SwitchConfig),
    SetConfig(SwitchConfig),
    PacketIn(PacketIn),
    FlowRemoved(FlowRemoved),
    PortStatus(PortStatus),
    PacketOut(Vec<u8>),
    FlowMod(Vec<u8>),
    GroupMod(Vec<u8>),
    PortMod(Vec<u8>),
    TableMod(Vec<u8>),
    MultipartRequest(Vec<u8>),
    MultipartReply(Vec<u8>),
    BarrierRequest(Vec<u8>),
    BarrierReply(Vec<u8>),
    QueueGetConfigRequest(Vec<u8>),
    QueueGetConfigReply(Vec<u8>),
    RoleRequest(Vec<u8>),
    RoleReply(Vec<u8>),
    GetAsyncRequest(Vec<u8>),
    GetAsyncReply(Vec<u8>),
    SetAsync(Vec<u8>),
    MeterMod(Vec<u8>),
}

impl MessageBody {
    /// The type-table entry for this body.
    pub fn msg_type(&self) -> MsgType {
        use MessageBody::*;
        match self {
            Hello(_) => MsgType::Hello,
            Error(_) => MsgType::Error,
            EchoRequest(_) => MsgType::EchoRequest,
            EchoReply(_) => MsgType::EchoReply,
            FeaturesRequest => MsgType::FeaturesRequest,
            FeaturesReply(_) => MsgType::FeaturesReply,
            GetConfigRequest(_) => MsgType::GetConfigRequest,
            GetConfigReply(_) => MsgType::GetConfigReply,
            SetConfig(_) => MsgType::SetConfig,
            PacketIn(_) => MsgType::PacketIn,
            FlowRemoved(_) => MsgType::FlowRemoved,
            PortStatus(_) => MsgType::PortStatus,
            PacketOut(_) => MsgType::PacketOut,
            FlowMod(_) => MsgType::FlowMod,
            GroupMod(_) => MsgType::GroupMod,
            PortMod(_) => MsgType::PortMod,
            TableMod(_) => MsgType::TableMod,
            MultipartRequest(_) => MsgType::MultipartRequest,
            MultipartReply(_) => MsgType::MultipartReply,
            BarrierRequest(_) => MsgType::BarrierRequest,
            BarrierReply(_) => MsgType::BarrierReply,
            QueueGetConfigRequest(_) => MsgType::QueueGetConfigRequest,
            QueueGetConfigReply(_) => MsgType::QueueGetConfigReply,
            RoleRequest(_) => MsgType::RoleRequest,
            RoleReply(_) => MsgType::RoleReply,
            GetAsyncRequest(_) => MsgType::GetAsyncRequest,
            GetAsyncReply(_) => MsgType::GetAsyncReply,
            SetAsync(_) => MsgType::SetAsync,
            MeterMod(_) => MsgType::MeterMod,
        }
    }

    fn parse(typ: MsgType, body: &[u8]) -> Result<Self, Error> {
        let parsed = match typ {
            MsgType::Hello => Self::Hello(Hello::parse(body)?),
            MsgType::Error => Self::Error(ErrorMsg::parse(body)?),
            MsgType::EchoRequest => Self::EchoRequest(body.to_vec()),
            MsgType::EchoReply => Self::EchoReply(body.to_vec()),
            MsgType::FeaturesRequest => {
                if !body.is_empty() {
                    return Err(Error::BadLength {
                        what: "features request",
                        length: body.len(),
                    });
                }
                Self::FeaturesRequest
            }
            MsgType::FeaturesReply => Self::FeaturesReply(FeaturesReply::parse(body)?),
            MsgType::GetConfigRequest => Self::GetConfigRequest(body.to_vec()),
            MsgType::GetConfigReply => Self::GetConfigReply(SwitchConfig::parse(body)?),
            MsgType::SetConfig => Self::SetConfig(SwitchConfig::parse(body)?),
            MsgType::PacketIn => Self::PacketIn(PacketIn::parse(body)?),
            MsgType::FlowRemoved => Self::FlowRemoved(FlowRemoved::parse(body)?),
            MsgType::PortStatus => Self::PortStatus(PortStatus::parse(body)?),
            MsgType::PacketOut => Self::PacketOut(body.to_vec()),
            MsgType::FlowMod => Self::FlowMod(body.to_vec()),
            MsgType::GroupMod => Self::GroupMod(body.to_vec()),
            MsgType::PortMod => Self::PortMod(body.to_vec()),
            MsgType::TableMod => Self::TableMod(body.to_vec()),
            MsgType::MultipartRequest => Self::MultipartRequest(body.to_vec()),
            MsgType::MultipartReply => Self::MultipartReply(body.to_vec()),
            MsgType::BarrierRequest => Self::BarrierRequest(body.to_vec()),
            MsgType::BarrierReply => Self::BarrierReply(body.to_vec()),
            MsgType::QueueGetConfigRequest => Self::QueueGetConfigRequest(body.to_vec()),
            MsgType::QueueGetConfigReply => Self::QueueGetConfigReply(body.to_vec()),
            MsgType::RoleRequest => Self::RoleRequest(body.to_vec()),
            MsgType::RoleReply => Self::RoleReply(body.to_vec()),
            MsgType::GetAsyncRequest => Self::GetAsyncRequest(body.to_vec()),
            MsgType::GetAsyncReply => Self::GetAsyncReply(body.to_vec()),
            MsgType::SetAsync => Self::SetAsync(body.to_vec()),
            MsgType::MeterMod => Self::MeterMod(body.to_vec()),
        };
        Ok(parsed)
    }

    fn marshal(&self, bytes: &mut Vec<u8>) -> Result<(), Error> {
        use MessageBody::*;
        match self {
            Hello(hello) => hello.marshal(bytes),
            Error(error) => error.marshal(bytes),
            FeaturesRequest => {}
            FeaturesReply(reply) => reply.marshal(bytes),
            GetConfigReply(config) | SetConfig(config) => config.marshal(bytes),
            PacketIn(packet_in) => packet_in.marshal(bytes)?,
            FlowRemoved(flow_removed) => flow_removed.marshal(bytes)?,
            PortStatus(status) => status.marshal(bytes),
            EchoRequest(data) | EchoReply(data) | GetConfigRequest(data) | PacketOut(data)
            | FlowMod(data) | GroupMod(data) | PortMod(data) | TableMod(data)
            | MultipartRequest(data) | MultipartReply(data) | BarrierRequest(data)
            | BarrierReply(data) | QueueGetConfigRequest(data) | QueueGetConfigReply(data)
            | RoleRequest(data) | RoleReply(data) | GetAsyncRequest(data)
            | GetAsyncReply(data) | SetAsync(data) | MeterMod(data) => {
                bytes.extend_from_slice(data)
            }
        }
        Ok(())
    }
}

/// A single OpenFlow message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub header: Header,
    pub body: MessageBody,
}

impl Message {
    pub fn new(header: Header, body: MessageBody) -> Self {
        Self { header, body }
    }

    pub fn msg_type(&self) -> MsgType {
        self.body.msg_type()
    }

    /// Encode under the message's own header version.
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        self.encode_as(self.header.version)
    }

    /// Encode, stamping `version` into the header. The length field is
    /// computed from the encoded body, never taken on trust.
    pub fn encode_as(&self, version: u8) -> Result<Vec<u8>, Error> {
        let mut body = Vec::new();
        self.body.marshal(&mut body)?;
        let length = HEADER_SIZE + body.len();
        if length > usize::from(u16::MAX) {
            return Err(Error::Oversized("message"));
        }
        let mut bytes = Vec::with_capacity(length);
        RawHeader {
            version,
            type_code: self.msg_type().code(),
            length: length as u16,
            xid: self.header.xid,
        }
        .marshal(&mut bytes);
        bytes.extend_from_slice(&body);
        Ok(bytes)
    }
}

/// Decode the message at the front of `buf`, returning it along with the
/// bytes that follow it.
///
/// The buffer must contain the whole message: waiting for one to arrive is
/// the parser's job, and this function treats a buffer shorter than the
/// header's length field as a malformed message.
pub fn decode(buf: &[u8]) -> Result<(Message, &[u8]), Error> {
    let raw = RawHeader::parse(buf)?;
    let length = usize::from(raw.length);
    if length < HEADER_SIZE {
        return Err(Error::BadLength {
            what: "message",
            length,
        });
    }
    if buf.len() < length {
        return Err(Error::Truncated("message"));
    }
    let typ = MsgType::from_code(raw.type_code)?;
    let body = MessageBody::parse(typ, &buf[HEADER_SIZE..length])?;
    Ok((
        Message {
            header: Header {
                version: raw.version,
                xid: raw.xid,
            },
            body,
        },
        &buf[length..],
    ))
}
