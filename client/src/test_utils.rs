// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared helpers for the integration-style tests: a localhost listener
//! playing the controller, wired to a freshly spawned client.

use crate::client::Client;
use crate::config::ConfigBuilder;
use crate::events::Upcall;
use crate::UPCALL_QUEUE_DEPTH;
use ofagent_messages::header::Header;
use ofagent_messages::message;
use ofagent_messages::message::Hello;
use ofagent_messages::message::HelloElement;
use ofagent_messages::message::Message;
use ofagent_messages::message::MessageBody;
use slog::o;
use slog::Logger;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio::sync::mpsc;

pub(crate) fn test_logger() -> Logger {
    Logger::root(slog::Discard, o!())
}

pub(crate) struct Harness {
    pub listener: TcpListener,
    pub client: Client,
    pub upcall_rx: mpsc::Receiver<Upcall>,
}

/// Bind a controller-side listener and spawn a client dialing it, with a
/// short reconnect interval so tests do not wait out the default.
pub(crate) async fn harness(configure: impl FnOnce(ConfigBuilder) -> ConfigBuilder) -> Harness {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let builder = ConfigBuilder::new()
        .host("127.0.0.1")
        .port(port)
        .reconnect_interval(Duration::from_millis(100));
    let config = configure(builder).build().unwrap();
    let (upcall_tx, upcall_rx) = mpsc::channel(UPCALL_QUEUE_DEPTH);
    let client = Client::new(config, test_logger(), upcall_tx);
    Harness {
        listener,
        client,
        upcall_rx,
    }
}

/// The HELLO a test controller opens with.
pub(crate) fn controller_hello(version: u8, bitmap: Option<&[u8]>) -> Message {
    let hello = match bitmap {
        Some(versions) => Hello {
            elements: vec![HelloElement::VersionBitmap(versions.to_vec())],
        },
        None => Hello::default(),
    };
    Message::new(Header { version, xid: 0 }, MessageBody::Hello(hello))
}

/// Accept the client's connection, read its HELLO, and answer with
/// `hello`. Returns the stream and the client's HELLO.
pub(crate) async fn accept_with_hello(
    listener: &TcpListener,
    hello: Message,
) -> (TcpStream, Message) {
    let (mut stream, _) = listener.accept().await.unwrap();
    let client_hello = read_message(&mut stream).await;
    stream.write_all(&hello.encode().unwrap()).await.unwrap();
    (stream, client_hello)
}

/// Read exactly one message off the stream.
pub(crate) async fn read_message(stream: &mut TcpStream) -> Message {
    let mut fixed = [0u8; 8];
    stream.read_exact(&mut fixed).await.unwrap();
    let length = u16::from_be_bytes([fixed[2], fixed[3]]) as usize;
    let mut frame = fixed.to_vec();
    frame.resize(length, 0);
    stream.read_exact(&mut frame[8..]).await.unwrap();
    let (message, rest) = message::decode(&frame).unwrap();
    assert!(rest.is_empty());
    message
}
