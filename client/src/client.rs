// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The public handle to a client endpoint.

use crate::config::Config;
use crate::events::Command;
use crate::events::Upcall;
use crate::ioloop::IoLoop;
use crate::role::AsyncFilter;
use crate::Error;
use crate::COMMAND_QUEUE_DEPTH;
use ofagent_messages::message::Message;
use slog::debug;
use slog::Logger;
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A connection endpoint speaking the OpenFlow protocol to a controller.
///
/// Constructing one spawns the I/O task and immediately begins the first
/// connection attempt; the task keeps redialing for as long as the handle
/// lives. Upcalls are delivered on the channel given at construction
/// until it is rebound with [`controlling_process`][Self::controlling_process].
///
/// The handle holds no connection state itself. Every operation is a
/// command to the I/O task, and a sequence of [`send`][Self::send] calls
/// from one caller reaches the wire in call order.
#[derive(Debug)]
pub struct Client {
    log: Logger,
    command_tx: mpsc::Sender<Command>,
    io_task: JoinHandle<()>,
}

impl Drop for Client {
    fn drop(&mut self) {
        self.io_task.abort();
    }
}

impl Client {
    /// Spawn a client endpoint for the controller named by `config`.
    ///
    /// Must be called from within a Tokio runtime. `upcall_tx` identifies
    /// the controlling process: the holder of the other end receives
    /// [`Upcall`]s as the connection changes state and as forwardable
    /// messages arrive.
    pub fn new(config: Config, log: Logger, upcall_tx: mpsc::Sender<Upcall>) -> Self {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let io_log = log.new(slog::o!("task" => "io"));
        let io_loop = IoLoop::new(io_log, config, command_rx, upcall_tx);
        let io_task = tokio::spawn(io_loop.run());
        debug!(log, "spawned IO task");
        Self {
            log,
            command_tx,
            io_task,
        }
    }

    /// Send a message to the controller.
    ///
    /// The message must be of a type the switch side emits; it is then
    /// subject to the per-role asynchronous-event filter and encoded
    /// under the negotiated version. `Ok` means the bytes were queued on
    /// the socket, not that the controller received them.
    pub async fn send(&self, message: Message) -> Result<(), Error> {
        if !message.msg_type().is_outbound() {
            return Err(Error::BadMessage(Box::new(message)));
        }
        let (response_tx, response_rx) = oneshot::channel();
        self.command_tx
            .send(Command::Send {
                message,
                response_tx,
            })
            .await
            .map_err(|_| Error::Terminated)?;
        response_rx.await.map_err(|_| Error::Terminated)?
    }

    /// Rebind upcall delivery to a new controlling process.
    pub async fn controlling_process(
        &self,
        upcall_tx: mpsc::Sender<Upcall>,
    ) -> Result<(), Error> {
        self.command_tx
            .send(Command::ControllingProcess(upcall_tx))
            .await
            .map_err(|_| Error::Terminated)
    }

    /// Demote the controller role from master to slave. A no-op in any
    /// other role; there is deliberately no operation in the other
    /// direction.
    pub async fn make_slave(&self) -> Result<(), Error> {
        self.command_tx
            .send(Command::MakeSlave)
            .await
            .map_err(|_| Error::Terminated)
    }

    /// Replace the asynchronous-event filter.
    pub async fn set_filter(&self, filter: AsyncFilter) -> Result<(), Error> {
        self.command_tx
            .send(Command::SetFilter(filter))
            .await
            .map_err(|_| Error::Terminated)
    }

    /// Tear the endpoint down. Any open connection is closed without a
    /// closing upcall.
    pub async fn stop(self) -> Result<(), Error> {
        debug!(self.log, "stopping client");
        let (response_tx, response_rx) = oneshot::channel();
        self.command_tx
            .send(Command::Stop { response_tx })
            .await
            .map_err(|_| Error::Terminated)?;
        response_rx.await.map_err(|_| Error::Terminated)
    }
}
