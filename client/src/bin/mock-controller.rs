// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mock OpenFlow controller: completes the handshake, asks for the
//! switch's features, and prints every message it receives.

use ofagent_messages::header::Header;
use ofagent_messages::message::Hello;
use ofagent_messages::message::Message;
use ofagent_messages::message::MessageBody;
use ofagent_messages::parser::Parser;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;

const VERSION: u8 = 4;

#[tokio::main]
async fn main() {
    let listener = TcpListener::bind(("0.0.0.0", ofagent_messages::PORT))
        .await
        .unwrap();
    println!("listening on port {}", ofagent_messages::PORT);

    loop {
        let (mut stream, peer) = listener.accept().await.unwrap();
        println!("{peer}: connected");
        tokio::spawn(async move {
            let hello = Message::new(
                Header {
                    version: VERSION,
                    xid: 0,
                },
                MessageBody::Hello(Hello::with_versions(&[VERSION])),
            );
            stream.write_all(&hello.encode().unwrap()).await.unwrap();

            let mut parser = Parser::new(VERSION);
            let mut buf = [0u8; 4096];
            loop {
                let n_bytes = match stream.read(&mut buf).await {
                    Ok(0) | Err(_) => {
                        println!("{peer}: closed");
                        return;
                    }
                    Ok(n_bytes) => n_bytes,
                };
                let messages = match parser.feed(&buf[..n_bytes]) {
                    Ok(messages) => messages,
                    Err(e) => {
                        println!("{peer}: {e}");
                        return;
                    }
                };
                for message in messages {
                    println!("{peer}: => {message:?}");
                    if let MessageBody::Hello(_) = message.body {
                        let request = Message::new(
                            Header {
                                version: VERSION,
                                xid: 1,
                            },
                            MessageBody::FeaturesRequest,
                        );
                        stream
                            .write_all(&request.encode().unwrap())
                            .await
                            .unwrap();
                    }
                }
            }
        });
    }
}
