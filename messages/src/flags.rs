// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Named bitfields appearing in message and port structures.
//!
//! These decode with [`from_bits_retain`](bitflags::Flags::from_bits_retain)
//! so that bits this crate does not name survive a decode/encode
//! round-trip unchanged.

bitflags::bitflags! {
    /// Administrative configuration of a switch port.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct PortConfig: u32 {
        /// The port is administratively down.
        const PORT_DOWN     = 1 << 0;
        /// Drop all packets received by the port.
        const NO_RECV       = 1 << 2;
        /// Drop packets forwarded to the port.
        const NO_FWD        = 1 << 5;
        /// Do not send packet-in messages for the port.
        const NO_PACKET_IN  = 1 << 6;
    }
}

bitflags::bitflags! {
    /// Observed state of a switch port.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct PortState: u32 {
        /// No physical link present.
        const LINK_DOWN = 1 << 0;
        /// The port is blocked, e.g. by spanning tree.
        const BLOCKED   = 1 << 1;
        /// A live connection exists for fast-failover purposes.
        const LIVE      = 1 << 2;
    }
}

bitflags::bitflags! {
    /// Link rates and media properties of a switch port.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct PortFeatures: u32 {
        const RATE_10MB_HD  = 1 << 0;
        const RATE_10MB_FD  = 1 << 1;
        const RATE_100MB_HD = 1 << 2;
        const RATE_100MB_FD = 1 << 3;
        const RATE_1GB_HD   = 1 << 4;
        const RATE_1GB_FD   = 1 << 5;
        const RATE_10GB_FD  = 1 << 6;
        const RATE_40GB_FD  = 1 << 7;
        const RATE_100GB_FD = 1 << 8;
        const RATE_1TB_FD   = 1 << 9;
        /// A rate other than the ones listed here.
        const OTHER         = 1 << 10;
        const COPPER        = 1 << 11;
        const FIBER         = 1 << 12;
        const AUTONEG       = 1 << 13;
        const PAUSE         = 1 << 14;
        const PAUSE_ASYM    = 1 << 15;
    }
}

bitflags::bitflags! {
    /// Capabilities a switch advertises in its features reply.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct Capabilities: u32 {
        const FLOW_STATS    = 1 << 0;
        const TABLE_STATS   = 1 << 1;
        const PORT_STATS    = 1 << 2;
        const GROUP_STATS   = 1 << 3;
        /// The switch can reassemble IP fragments.
        const IP_REASM      = 1 << 5;
        const QUEUE_STATS   = 1 << 6;
        /// The switch may block looping ports independently of the
        /// controller.
        const PORT_BLOCKED  = 1 << 8;
    }
}

bitflags::bitflags! {
    /// Fragment handling policy carried in switch configuration messages.
    ///
    /// No bit set means fragments pass through unchanged.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ConfigFlags: u16 {
        /// Drop IP fragments.
        const FRAG_DROP  = 1 << 0;
        /// Reassemble IP fragments.
        const FRAG_REASM = 1 << 1;
    }
}

#[cfg(test)]
mod tests {
    use super::Capabilities;
    use super::ConfigFlags;
    use super::PortConfig;

    #[test]
    fn test_bit_positions() {
        assert_eq!(PortConfig::NO_PACKET_IN.bits(), 0x40);
        assert_eq!(Capabilities::PORT_BLOCKED.bits(), 0x100);
        assert_eq!(ConfigFlags::FRAG_REASM.bits(), 0x2);
    }

    #[test]
    fn test_unknown_bits_survive() {
        let raw = 0x8000_0025;
        let config = PortConfig::from_bits_retain(raw);
        assert!(config.contains(PortConfig::PORT_DOWN));
        assert_eq!(config.bits(), raw);
    }
}
