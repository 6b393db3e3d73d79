// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Implementation of the main IO loop logic.
//!
//! One task owns the connection to the controller and every piece of
//! state attached to it. It cycles through three connection states:
//! disconnected (periodically retrying the controller address),
//! connecting (HELLO sent, awaiting the controller's), and open (parser
//! bound to the negotiated version, messages flowing). A reset from any
//! connected state reports `ConnectionClosed` exactly once and falls back
//! to disconnected; failed connect attempts are silent.

use crate::config::Config;
use crate::events::CloseReason;
use crate::events::Command;
use crate::events::Upcall;
use crate::negotiate::decide_on_version;
use crate::role::AsyncFilter;
use crate::role::Role;
use crate::Error;
use ofagent_messages::header::Header;
use ofagent_messages::header::HEADER_SIZE;
use ofagent_messages::message;
use ofagent_messages::message::BadRequestCode;
use ofagent_messages::message::ErrorMsg;
use ofagent_messages::message::Hello;
use ofagent_messages::message::Message;
use ofagent_messages::message::MessageBody;
use ofagent_messages::parser::frame_length;
use ofagent_messages::parser::Parser;
use slog::debug;
use slog::error;
use slog::trace;
use slog::Logger;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::sleep;

const READ_CHUNK: usize = 4096;

// What the loop does after leaving a connection.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    // Fall back to disconnected and re-arm the reconnect timer.
    Reconnect,
    // Tear the task down.
    Shutdown,
}

// Outcome of handling one command.
#[derive(Debug)]
enum CommandOutcome {
    Continue,
    Shutdown,
    // A send hit a transport error; the connection must be reset.
    ConnectionLost(CloseReason),
}

// An open connection: the socket together with the parser bound to the
// negotiated version. Both exist exactly as long as the other.
#[derive(Debug)]
struct Link {
    stream: TcpStream,
    parser: Parser,
}

/// The data needed for the main I/O loop. See `IoLoop::run` for details.
#[derive(Debug)]
pub(crate) struct IoLoop {
    log: Logger,
    config: Config,
    command_rx: mpsc::Receiver<Command>,
    upcall_tx: mpsc::Sender<Upcall>,
    role: Role,
    filter: AsyncFilter,
    // Advisory role generation, as last announced by a controller.
    generation_id: u64,
}

impl IoLoop {
    pub(crate) fn new(
        log: Logger,
        config: Config,
        command_rx: mpsc::Receiver<Command>,
        upcall_tx: mpsc::Sender<Upcall>,
    ) -> Self {
        let role = config.role;
        let filter = config.filter;
        Self {
            log,
            config,
            command_rx,
            upcall_tx,
            role,
            filter,
            generation_id: 0,
        }
    }

    // Main loop: connect, drive the connection until it dies, wait out
    // the reconnect interval, repeat. The first attempt happens
    // immediately.
    pub(crate) async fn run(mut self) {
        debug!(
            self.log,
            "starting OpenFlow client";
            "controller" => format!("{}:{}", self.config.host, self.config.port),
            "versions" => ?self.config.versions,
        );
        loop {
            let attempt = TcpStream::connect((self.config.host.as_str(), self.config.port)).await;
            match attempt {
                Ok(stream) => {
                    debug!(self.log, "connected to controller");
                    match self.drive(stream).await {
                        Flow::Shutdown => return,
                        Flow::Reconnect => {}
                    }
                }
                // Failed attempts are deliberately silent; the timer
                // below retries them.
                Err(e) => trace!(
                    self.log,
                    "connect attempt failed";
                    "reason" => ?e.kind(),
                ),
            }
            if self.wait_reconnect_interval().await == Flow::Shutdown {
                return;
            }
        }
    }

    // Disconnected: serve commands until the reconnect interval elapses.
    async fn wait_reconnect_interval(&mut self) -> Flow {
        let wait = sleep(self.config.reconnect_interval);
        tokio::pin!(wait);
        loop {
            tokio::select! {
                _ = &mut wait => return Flow::Reconnect,
                maybe_cmd = self.command_rx.recv() => {
                    let Some(cmd) = maybe_cmd else {
                        debug!(self.log, "command channel closed, exiting");
                        return Flow::Shutdown;
                    };
                    match self.handle_command(cmd, None).await {
                        CommandOutcome::Continue => {}
                        CommandOutcome::Shutdown => return Flow::Shutdown,
                        // Unreachable without an open connection.
                        CommandOutcome::ConnectionLost(_) => {}
                    }
                }
            }
        }
    }

    // Connecting then open: send our HELLO, wait for the controller's,
    // negotiate, and run the connection until it is lost.
    async fn drive(&mut self, mut stream: TcpStream) -> Flow {
        let hello = self.our_hello();
        let bytes = match hello.encode() {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(self.log, "failed to encode hello"; "reason" => %e);
                return Flow::Reconnect;
            }
        };
        if let Err(e) = stream.write_all(&bytes).await {
            return self.reset(CloseReason::TcpError(e.kind())).await;
        }
        debug!(self.log, "sent hello"; "version" => hello.header.version);

        // The controller's HELLO is decoded standalone: no version has
        // been negotiated yet, so no parser exists. Bytes are gathered in
        // a plain buffer until the first message is complete.
        let mut pending: Vec<u8> = Vec::new();
        let mut chunk = [0u8; READ_CHUNK];
        let (first, consumed) = loop {
            tokio::select! {
                maybe_cmd = self.command_rx.recv() => {
                    let Some(cmd) = maybe_cmd else {
                        debug!(self.log, "command channel closed, exiting");
                        return Flow::Shutdown;
                    };
                    match self.handle_command(cmd, None).await {
                        CommandOutcome::Continue => {}
                        CommandOutcome::Shutdown => return Flow::Shutdown,
                        CommandOutcome::ConnectionLost(_) => {}
                    }
                }
                result = stream.read(&mut chunk) => match result {
                    Ok(0) => return self.reset(CloseReason::TcpClosed).await,
                    Ok(n) => {
                        pending.extend_from_slice(&chunk[..n]);
                        let Some(length) = frame_length(&pending) else {
                            continue;
                        };
                        if length < HEADER_SIZE {
                            return self.reset(CloseReason::BadInitialMessage).await;
                        }
                        if pending.len() < length {
                            continue;
                        }
                        match message::decode(&pending[..length]) {
                            Ok((message, _)) => break (message, length),
                            Err(e) => {
                                debug!(
                                    self.log,
                                    "undecodable initial message";
                                    "reason" => %e,
                                );
                                return self.reset(CloseReason::BadInitialMessage).await;
                            }
                        }
                    }
                    Err(e) => return self.reset(CloseReason::TcpError(e.kind())).await,
                }
            }
        };

        let MessageBody::Hello(ref controller_hello) = first.body else {
            debug!(
                self.log,
                "first message was not a hello";
                "type" => ?first.msg_type(),
            );
            return self.reset(CloseReason::BadInitialMessage).await;
        };
        let version = match decide_on_version(
            &self.config.versions,
            controller_hello,
            first.header.version,
        ) {
            Ok(version) => version,
            Err(reason) => return self.reset(reason).await,
        };
        debug!(self.log, "version negotiated"; "version" => version);

        let mut link = Link {
            stream,
            parser: Parser::new(version),
        };
        if self
            .upcall_tx
            .send(Upcall::Connected { version })
            .await
            .is_err()
        {
            debug!(self.log, "controlling process is gone, exiting");
            return Flow::Shutdown;
        }

        // Anything that arrived on the heels of the controller's HELLO
        // belongs to the now-initialized parser.
        if consumed < pending.len() {
            match link.parser.feed(&pending[consumed..]) {
                Ok(messages) => {
                    for message in messages {
                        if let Err(flow) = self.dispatch(&mut link, message).await {
                            return flow;
                        }
                    }
                }
                Err(e) => return self.reset(CloseReason::BadData(e.bytes)).await,
            }
        }

        self.drive_open(link).await
    }

    // Open: route inbound messages and serve commands until the
    // connection is lost or the task is stopped.
    async fn drive_open(&mut self, mut link: Link) -> Flow {
        let mut chunk = [0u8; READ_CHUNK];
        loop {
            tokio::select! {
                maybe_cmd = self.command_rx.recv() => {
                    let Some(cmd) = maybe_cmd else {
                        debug!(self.log, "command channel closed, exiting");
                        return Flow::Shutdown;
                    };
                    match self.handle_command(cmd, Some(&mut link)).await {
                        CommandOutcome::Continue => {}
                        CommandOutcome::Shutdown => return Flow::Shutdown,
                        CommandOutcome::ConnectionLost(reason) => {
                            return self.reset(reason).await;
                        }
                    }
                }
                result = link.stream.read(&mut chunk) => match result {
                    Ok(0) => return self.reset(CloseReason::TcpClosed).await,
                    Ok(n) => match link.parser.feed(&chunk[..n]) {
                        Ok(messages) => {
                            for message in messages {
                                if let Err(flow) = self.dispatch(&mut link, message).await {
                                    return flow;
                                }
                            }
                        }
                        Err(e) => return self.reset(CloseReason::BadData(e.bytes)).await,
                    },
                    Err(e) => return self.reset(CloseReason::TcpError(e.kind())).await,
                }
            }
        }
    }

    // Route one decoded message. Requests that would modify switch state
    // are refused in place when the controller is a slave; forwardable
    // types go to the controlling process; the rest are dropped.
    async fn dispatch(&mut self, link: &mut Link, message: Message) -> Result<(), Flow> {
        let typ = message.msg_type();
        if self.role == Role::Slave && typ.modifies_switch_state() {
            debug!(
                self.log,
                "refusing request from slave controller";
                "type" => ?typ,
                "xid" => message.header.xid,
            );
            let reply = Message::new(
                Header {
                    version: link.parser.version(),
                    xid: message.header.xid,
                },
                MessageBody::Error(ErrorMsg::bad_request(BadRequestCode::IsSlave)),
            );
            match link.parser.encode(&reply) {
                Ok(bytes) => {
                    if let Err(e) = link.stream.write_all(&bytes).await {
                        let kind = e.kind();
                        return Err(self.reset(CloseReason::TcpError(kind)).await);
                    }
                }
                Err(e) => error!(self.log, "failed to encode error reply"; "reason" => %e),
            }
            return Ok(());
        }
        if typ.is_forwardable() {
            trace!(self.log, "message received"; "type" => ?typ, "xid" => message.header.xid);
            if self
                .upcall_tx
                .send(Upcall::MessageReceived(message))
                .await
                .is_err()
            {
                debug!(self.log, "controlling process is gone, exiting");
                return Err(Flow::Shutdown);
            }
        } else {
            // Reserved types (role and async-configuration requests) and
            // replies we never solicited.
            trace!(self.log, "dropping message"; "type" => ?typ);
        }
        Ok(())
    }

    // Handle one command. `link` is the open connection, if any.
    async fn handle_command(&mut self, cmd: Command, link: Option<&mut Link>) -> CommandOutcome {
        match cmd {
            Command::Send {
                message,
                response_tx,
            } => {
                let Some(link) = link else {
                    let _ = response_tx.send(Err(Error::NotConnected));
                    return CommandOutcome::Continue;
                };
                let typ = message.msg_type();
                if !self.filter.allows(self.role, typ) {
                    trace!(self.log, "message filtered"; "type" => ?typ);
                    let _ = response_tx.send(Err(Error::Filtered));
                    return CommandOutcome::Continue;
                }
                match link.parser.encode(&message) {
                    Err(e) => {
                        let _ = response_tx.send(Err(e.into()));
                        CommandOutcome::Continue
                    }
                    Ok(bytes) => match link.stream.write_all(&bytes).await {
                        Ok(()) => {
                            trace!(
                                self.log,
                                "message sent";
                                "type" => ?typ,
                                "n_bytes" => bytes.len(),
                            );
                            let _ = response_tx.send(Ok(()));
                            CommandOutcome::Continue
                        }
                        Err(e) => {
                            let kind = e.kind();
                            let _ = response_tx.send(Err(Error::Io(e)));
                            CommandOutcome::ConnectionLost(CloseReason::TcpError(kind))
                        }
                    },
                }
            }
            Command::ControllingProcess(upcall_tx) => {
                debug!(self.log, "controlling process rebound");
                self.upcall_tx = upcall_tx;
                CommandOutcome::Continue
            }
            Command::MakeSlave => {
                if self.role == Role::Master {
                    debug!(
                        self.log,
                        "role demoted to slave";
                        "generation_id" => self.generation_id,
                    );
                    self.role = Role::Slave;
                }
                CommandOutcome::Continue
            }
            Command::SetFilter(filter) => {
                self.filter = filter;
                CommandOutcome::Continue
            }
            Command::Stop { response_tx } => {
                debug!(self.log, "stopping");
                let _ = response_tx.send(());
                CommandOutcome::Shutdown
            }
        }
    }

    // Close out a failed connection: report it upward once and fall back
    // to disconnected. The socket and parser are dropped by the caller
    // returning out of the connection scope.
    async fn reset(&mut self, reason: CloseReason) -> Flow {
        debug!(self.log, "connection reset"; "reason" => ?reason);
        if self
            .upcall_tx
            .send(Upcall::ConnectionClosed(reason))
            .await
            .is_err()
        {
            debug!(self.log, "controlling process is gone, exiting");
            return Flow::Shutdown;
        }
        Flow::Reconnect
    }

    // The HELLO this endpoint opens every connection with: highest
    // configured version in the header, and a bitmap of all configured
    // versions once the highest version understands elements.
    fn our_hello(&self) -> Message {
        Message::new(
            Header {
                version: self.config.highest_version(),
                xid: 0,
            },
            MessageBody::Hello(Hello::with_versions(&self.config.versions)),
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::events::CloseReason;
    use crate::events::Upcall;
    use crate::role::Role;
    use crate::test_utils;
    use crate::test_utils::controller_hello;
    use crate::test_utils::read_message;
    use crate::Error;
    use ofagent_messages::header::Header;
    use ofagent_messages::message::BadRequestCode;
    use ofagent_messages::message::ErrorPayload;
    use ofagent_messages::message::ErrorType;
    use ofagent_messages::message::HelloElement;
    use ofagent_messages::message::Message;
    use ofagent_messages::message::MessageBody;
    use ofagent_messages::message::PacketIn;
    use ofagent_messages::message::PacketInReason;
    use ofagent_messages::oxm::Match;
    use tokio::io::AsyncWriteExt;

    fn flow_mod(xid: u32) -> Message {
        Message::new(
            Header { version: 4, xid },
            MessageBody::FlowMod(vec![0; 40]),
        )
    }

    fn echo_request(xid: u32) -> Message {
        Message::new(
            Header { version: 4, xid },
            MessageBody::EchoRequest(Vec::new()),
        )
    }

    fn packet_in(xid: u32) -> Message {
        Message::new(
            Header { version: 4, xid },
            MessageBody::PacketIn(PacketIn {
                buffer_id: !0,
                reason: PacketInReason::NoMatch,
                table_id: 0,
                match_field: Match::new(),
                data: vec![0xaa; 14],
            }),
        )
    }

    // The happy path: the controller speaks version 4 and the endpoint
    // reports it connected. Also checks the shape of the endpoint's own
    // HELLO along the way.
    #[tokio::test]
    async fn test_basic_negotiation() {
        let mut h = test_utils::harness(|b| b).await;
        let (_stream, client_hello) =
            test_utils::accept_with_hello(&h.listener, controller_hello(4, None)).await;

        assert_eq!(client_hello.header.version, 4);
        let MessageBody::Hello(hello) = client_hello.body else {
            panic!("expected a hello, got {client_hello:?}");
        };
        assert_eq!(hello.elements, vec![HelloElement::VersionBitmap(vec![4])]);

        assert_eq!(
            h.upcall_rx.recv().await.unwrap(),
            Upcall::Connected { version: 4 },
        );
    }

    // The endpoint's highest version disagrees with the controller's
    // header, so the bitmaps decide: 4 is the greatest common version.
    #[tokio::test]
    async fn test_bitmap_intersection() {
        let mut h = test_utils::harness(|b| b.version(4).versions([5])).await;
        let (_stream, client_hello) =
            test_utils::accept_with_hello(&h.listener, controller_hello(4, Some(&[3, 4]))).await;

        let MessageBody::Hello(hello) = client_hello.body else {
            panic!("expected a hello, got {client_hello:?}");
        };
        assert_eq!(client_hello.header.version, 5);
        assert_eq!(hello.version_bitmap(), Some(&[4, 5][..]));

        assert_eq!(
            h.upcall_rx.recv().await.unwrap(),
            Upcall::Connected { version: 4 },
        );
    }

    #[tokio::test]
    async fn test_no_common_version() {
        let mut h = test_utils::harness(|b| b).await;
        let _stream =
            test_utils::accept_with_hello(&h.listener, controller_hello(3, Some(&[1, 2, 3]))).await;

        assert_eq!(
            h.upcall_rx.recv().await.unwrap(),
            Upcall::ConnectionClosed(CloseReason::NoCommonVersion {
                client: vec![4],
                server: vec![1, 2, 3],
            }),
        );
    }

    // Below version 4 there are no HELLO elements: an endpoint configured
    // with version 1 only must refuse a version-3 controller outright.
    #[tokio::test]
    async fn test_unsupported_version_without_elements() {
        let mut h = test_utils::harness(|b| b.version(1)).await;
        let (_stream, client_hello) =
            test_utils::accept_with_hello(&h.listener, controller_hello(3, None)).await;

        assert_eq!(client_hello.header.version, 1);
        let MessageBody::Hello(hello) = client_hello.body else {
            panic!("expected a hello, got {client_hello:?}");
        };
        assert!(hello.elements.is_empty());

        assert_eq!(
            h.upcall_rx.recv().await.unwrap(),
            Upcall::ConnectionClosed(CloseReason::UnsupportedVersion(3)),
        );
    }

    #[tokio::test]
    async fn test_non_hello_first_message_resets() {
        let mut h = test_utils::harness(|b| b).await;
        let (mut stream, _) = h.listener.accept().await.unwrap();
        let _client_hello = read_message(&mut stream).await;
        stream
            .write_all(&echo_request(1).encode().unwrap())
            .await
            .unwrap();

        assert_eq!(
            h.upcall_rx.recv().await.unwrap(),
            Upcall::ConnectionClosed(CloseReason::BadInitialMessage),
        );
    }

    // A slave controller's flow-mod is answered with is-slave directly on
    // the socket and never reaches the controlling process.
    #[tokio::test]
    async fn test_slave_write_block() {
        let mut h = test_utils::harness(|b| b.role(Role::Slave)).await;
        let (mut stream, _) =
            test_utils::accept_with_hello(&h.listener, controller_hello(4, None)).await;
        assert_eq!(
            h.upcall_rx.recv().await.unwrap(),
            Upcall::Connected { version: 4 },
        );

        stream
            .write_all(&flow_mod(42).encode().unwrap())
            .await
            .unwrap();
        let reply = read_message(&mut stream).await;
        assert_eq!(reply.header.xid, 42);
        let MessageBody::Error(error) = reply.body else {
            panic!("expected an error, got {reply:?}");
        };
        assert_eq!(
            error.payload,
            ErrorPayload::Standard {
                err_type: ErrorType::BadRequest,
                code: BadRequestCode::IsSlave as u16,
            },
        );

        // An echo request sent afterwards must be the first thing the
        // controlling process sees: the flow-mod was not forwarded.
        stream
            .write_all(&echo_request(43).encode().unwrap())
            .await
            .unwrap();
        assert_eq!(
            h.upcall_rx.recv().await.unwrap(),
            Upcall::MessageReceived(echo_request(43)),
        );
    }

    #[tokio::test]
    async fn test_equal_role_forwards_flow_mod() {
        let mut h = test_utils::harness(|b| b).await;
        let (mut stream, _) =
            test_utils::accept_with_hello(&h.listener, controller_hello(4, None)).await;
        assert_eq!(
            h.upcall_rx.recv().await.unwrap(),
            Upcall::Connected { version: 4 },
        );

        stream
            .write_all(&flow_mod(7).encode().unwrap())
            .await
            .unwrap();
        assert_eq!(
            h.upcall_rx.recv().await.unwrap(),
            Upcall::MessageReceived(flow_mod(7)),
        );
    }

    #[tokio::test]
    async fn test_make_slave_demotes_master() {
        let mut h = test_utils::harness(|b| b.role(Role::Master)).await;
        let (mut stream, _) =
            test_utils::accept_with_hello(&h.listener, controller_hello(4, None)).await;
        assert_eq!(
            h.upcall_rx.recv().await.unwrap(),
            Upcall::Connected { version: 4 },
        );

        h.client.make_slave().await.unwrap();
        // A send round-trip synchronizes: the demotion is processed
        // before the controller's flow-mod below can race it.
        h.client
            .send(Message::new(
                Header { version: 4, xid: 1 },
                MessageBody::EchoReply(Vec::new()),
            ))
            .await
            .unwrap();
        let _echo = read_message(&mut stream).await;

        stream
            .write_all(&flow_mod(9).encode().unwrap())
            .await
            .unwrap();
        let reply = read_message(&mut stream).await;
        let MessageBody::Error(_) = reply.body else {
            panic!("expected an error, got {reply:?}");
        };
        assert_eq!(reply.header.xid, 9);
    }

    // make_slave only demotes a master; an equal-role endpoint keeps
    // forwarding modifications.
    #[tokio::test]
    async fn test_make_slave_is_noop_for_equal() {
        let mut h = test_utils::harness(|b| b).await;
        let (mut stream, _) =
            test_utils::accept_with_hello(&h.listener, controller_hello(4, None)).await;
        assert_eq!(
            h.upcall_rx.recv().await.unwrap(),
            Upcall::Connected { version: 4 },
        );

        h.client.make_slave().await.unwrap();
        stream
            .write_all(&flow_mod(11).encode().unwrap())
            .await
            .unwrap();
        assert_eq!(
            h.upcall_rx.recv().await.unwrap(),
            Upcall::MessageReceived(flow_mod(11)),
        );
    }

    #[tokio::test]
    async fn test_async_filter_suppresses_packet_in() {
        let mut h = test_utils::harness(|b| b).await;
        let (mut stream, _) =
            test_utils::accept_with_hello(&h.listener, controller_hello(4, None)).await;
        assert_eq!(
            h.upcall_rx.recv().await.unwrap(),
            Upcall::Connected { version: 4 },
        );

        h.client.send(packet_in(70)).await.unwrap();
        let received = read_message(&mut stream).await;
        assert_eq!(received, packet_in(70));

        let mut filter = crate::AsyncFilter::default();
        filter.master_equal.packet_in = false;
        h.client.set_filter(filter).await.unwrap();
        assert!(matches!(
            h.client.send(packet_in(71)).await.unwrap_err(),
            Error::Filtered,
        ));

        // Non-asynchronous types still pass.
        h.client
            .send(Message::new(
                Header { version: 4, xid: 72 },
                MessageBody::BarrierReply(Vec::new()),
            ))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_send_before_connection_is_rejected() {
        let h = test_utils::harness(|b| b).await;
        // The listener accepts nothing; the endpoint never leaves the
        // handshake.
        assert!(matches!(
            h.client.send(packet_in(1)).await.unwrap_err(),
            Error::NotConnected,
        ));
    }

    #[tokio::test]
    async fn test_send_inbound_type_is_rejected() {
        let h = test_utils::harness(|b| b).await;
        let Err(Error::BadMessage(rejected)) = h.client.send(flow_mod(1)).await else {
            panic!("expected a bad-message error");
        };
        assert_eq!(*rejected, flow_mod(1));
    }

    // Losing the connection reports one close upcall, and the endpoint
    // dials again after the reconnect interval.
    #[tokio::test]
    async fn test_reconnect_after_close() {
        let mut h = test_utils::harness(|b| b).await;
        let (stream, _) =
            test_utils::accept_with_hello(&h.listener, controller_hello(4, None)).await;
        assert_eq!(
            h.upcall_rx.recv().await.unwrap(),
            Upcall::Connected { version: 4 },
        );

        drop(stream);
        assert_eq!(
            h.upcall_rx.recv().await.unwrap(),
            Upcall::ConnectionClosed(CloseReason::TcpClosed),
        );

        let _second =
            test_utils::accept_with_hello(&h.listener, controller_hello(4, None)).await;
        assert_eq!(
            h.upcall_rx.recv().await.unwrap(),
            Upcall::Connected { version: 4 },
        );
    }

    // Garbage on an open connection resets it and hands back the bytes.
    #[tokio::test]
    async fn test_bad_data_resets() {
        let mut h = test_utils::harness(|b| b).await;
        let (mut stream, _) =
            test_utils::accept_with_hello(&h.listener, controller_hello(4, None)).await;
        assert_eq!(
            h.upcall_rx.recv().await.unwrap(),
            Upcall::Connected { version: 4 },
        );

        // A frame whose length field undercuts the fixed header.
        let bad = [4u8, 2, 0, 4, 0, 0, 0, 0];
        stream.write_all(&bad).await.unwrap();
        assert_eq!(
            h.upcall_rx.recv().await.unwrap(),
            Upcall::ConnectionClosed(CloseReason::BadData(bad.to_vec())),
        );
    }

    #[tokio::test]
    async fn test_stop_terminates_the_task() {
        let h = test_utils::harness(|b| b).await;
        let client = h.client;
        client.stop().await.unwrap();
    }
}
