// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A switch-side client endpoint for the OpenFlow control channel.
//!
//! The [`Client`] owns one TCP connection to an OpenFlow controller and
//! drives it through the protocol handshake: it sends its HELLO on
//! connect, negotiates a common version against the controller's, and
//! only then starts exchanging messages. Lost connections are retried on
//! a fixed interval for as long as the client lives.
//!
//! The client itself implements no switching logic. Decoded messages the
//! controller is entitled to send are handed to the *controlling
//! process* -- whoever holds the receive half of the upcall channel
//! passed at construction -- as [`Upcall::MessageReceived`], and the
//! owner replies through [`Client::send`]. The two exceptions are
//! handled in place: a controller in the slave role asking to modify
//! switch state gets an error reply written straight back to the socket,
//! and outbound asynchronous notifications (packet-in, port-status,
//! flow-removed) are suppressed when the per-role filter says so.
//!
//! All connection state lives in a single I/O task; the `Client` handle
//! only queues commands to it. Dropping the handle aborts the task.

mod client;
mod config;
mod events;
mod ioloop;
mod negotiate;
mod role;
#[cfg(test)]
mod test_utils;

pub use client::Client;
pub use config::Config;
pub use config::ConfigBuilder;
pub use events::CloseReason;
pub use events::Upcall;
pub use role::AsyncFilter;
pub use role::AsyncMask;
pub use role::Role;

use ofagent_messages::message::Message;

// Depth of the command channel. Commands are answered synchronously, so
// this only needs to absorb short bursts.
const COMMAND_QUEUE_DEPTH: usize = 32;

/// Recommended depth for the upcall channel passed to [`Client::new`].
///
/// The I/O task stops reading the socket while the controlling process
/// lets upcalls pile up, so deeper buffering only delays backpressure.
pub const UPCALL_QUEUE_DEPTH: usize = 32;

/// An error operating the client endpoint.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The message type is not one the switch side sends.
    #[error("message type cannot be sent to the controller")]
    BadMessage(Box<Message>),

    /// No connection to the controller is open.
    #[error("not connected to the controller")]
    NotConnected,

    /// The asynchronous-event filter suppressed the message.
    #[error("message suppressed by the asynchronous-event filter")]
    Filtered,

    #[error("wire encoding failed")]
    Encode(#[from] ofagent_messages::Error),

    #[error("network I/O error")]
    Io(#[from] std::io::Error),

    /// A configured protocol version does not fit the wire's 7-bit field.
    #[error("protocol version {0} out of range")]
    BadVersion(u8),

    /// The I/O task is gone; the client was stopped or panicked.
    #[error("client task has terminated")]
    Terminated,
}
