// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Commands into, and upcalls out of, the I/O task.

use crate::role::AsyncFilter;
use crate::Error;
use ofagent_messages::message::Message;
use tokio::sync::mpsc;
use tokio::sync::oneshot;

/// A command from the [`crate::Client`] handle to the I/O task.
#[derive(Debug)]
pub(crate) enum Command {
    /// Send a message to the controller. The outcome is reported on the
    /// enclosed channel once the bytes are queued on the socket.
    Send {
        message: Message,
        response_tx: oneshot::Sender<Result<(), Error>>,
    },

    /// Rebind the upcall channel to a new controlling process.
    ControllingProcess(mpsc::Sender<Upcall>),

    /// Demote the role from master to slave. A no-op in any other role.
    MakeSlave,

    /// Replace the asynchronous-event filter.
    SetFilter(AsyncFilter),

    /// Tear the endpoint down. The socket is closed without an upcall.
    Stop { response_tx: oneshot::Sender<()> },
}

/// Why a connection was reset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CloseReason {
    /// The controller spoke a version this endpoint does not support.
    UnsupportedVersion(u8),

    /// No version is common to both sides' supported sets.
    NoCommonVersion { client: Vec<u8>, server: Vec<u8> },

    /// The first message on the connection was not a decodable HELLO.
    BadInitialMessage,

    /// The controller closed the connection.
    TcpClosed,

    /// The transport failed.
    TcpError(std::io::ErrorKind),

    /// The byte stream fell out of frame; the offending bytes are
    /// attached.
    BadData(Vec<u8>),
}

/// An event delivered to the controlling process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Upcall {
    /// The HELLO exchange completed at the given version.
    Connected { version: u8 },

    /// The controller sent a message that is the owner's to handle.
    MessageReceived(Message),

    /// The connection was reset; a reconnection attempt follows after
    /// the configured interval.
    ConnectionClosed(CloseReason),
}
