// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Controller roles and the per-role asynchronous-event filter.

use ofagent_messages::message::MsgType;

/// The role of the controller on the far end of a connection.
///
/// A slave controller may observe the switch but not modify it; the
/// endpoint refuses its state-changing requests without involving the
/// controlling process.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Role {
    Master,
    #[default]
    Equal,
    Slave,
}

/// Which asynchronous notifications one role is sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AsyncMask {
    pub packet_in: bool,
    pub port_status: bool,
    pub flow_removed: bool,
}

/// The asynchronous-event filter: one mask for the master and equal
/// roles, one for the slave role.
///
/// By default a slave controller is sent packet-in messages but no
/// port-status or flow-removed notifications.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AsyncFilter {
    pub master_equal: AsyncMask,
    pub slave: AsyncMask,
}

impl Default for AsyncFilter {
    fn default() -> Self {
        Self {
            master_equal: AsyncMask {
                packet_in: true,
                port_status: true,
                flow_removed: true,
            },
            slave: AsyncMask {
                packet_in: true,
                port_status: false,
                flow_removed: false,
            },
        }
    }
}

impl AsyncFilter {
    /// Whether a message of type `typ` may be sent to a controller in
    /// role `role`. Types that are not asynchronous notifications always
    /// pass.
    pub fn allows(&self, role: Role, typ: MsgType) -> bool {
        let mask = match role {
            Role::Slave => &self.slave,
            Role::Master | Role::Equal => &self.master_equal,
        };
        match typ {
            MsgType::PacketIn => mask.packet_in,
            MsgType::PortStatus => mask.port_status,
            MsgType::FlowRemoved => mask.flow_removed,
            _ => true,
        }
    }
}
