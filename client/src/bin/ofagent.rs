// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command-line endpoint that maintains a connection to an OpenFlow
//! controller, answers its echo requests, and logs everything else it is
//! handed.

use anyhow::Context;
use clap::Parser;
use ofagent_client::Client;
use ofagent_client::ConfigBuilder;
use ofagent_client::Upcall;
use ofagent_messages::header::Header;
use ofagent_messages::message::Message;
use ofagent_messages::message::MessageBody;
use slog::info;
use slog::warn;
use slog::Drain;
use slog::Level;
use std::time::Duration;
use tokio::sync::mpsc;

fn parse_log_level(s: &str) -> Result<Level, String> {
    s.parse().map_err(|_| String::from("invalid log level"))
}

/// Run a switch-side OpenFlow endpoint against a controller.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Controller host name or address.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Controller TCP port.
    #[arg(long, default_value_t = ofagent_messages::PORT)]
    port: u16,

    /// Comma-separated protocol versions to offer.
    #[arg(long, value_delimiter = ',', default_value = "4")]
    versions: Vec<u8>,

    /// Milliseconds between reconnection attempts.
    #[arg(long, default_value_t = 5000)]
    reconnect_ms: u64,

    /// The log level.
    #[arg(long, value_parser = parse_log_level, default_value_t = Level::Info)]
    log_level: Level,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = slog::LevelFilter::new(drain, args.log_level).fuse();
    let log = slog::Logger::root(drain, slog::o!());

    let preferred = args
        .versions
        .iter()
        .copied()
        .max()
        .context("at least one protocol version is required")?;
    let config = ConfigBuilder::new()
        .host(&args.host)
        .port(args.port)
        .version(preferred)
        .versions(args.versions.iter().copied())
        .reconnect_interval(Duration::from_millis(args.reconnect_ms))
        .build()?;

    let (upcall_tx, mut upcall_rx) = mpsc::channel(ofagent_client::UPCALL_QUEUE_DEPTH);
    let client = Client::new(config, log.clone(), upcall_tx);
    let mut negotiated = 0;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!(log, "interrupted, stopping");
                client.stop().await?;
                return Ok(());
            }
            maybe_upcall = upcall_rx.recv() => {
                let Some(upcall) = maybe_upcall else {
                    return Ok(());
                };
                match upcall {
                    Upcall::Connected { version } => {
                        negotiated = version;
                        info!(log, "connected"; "version" => version);
                    }
                    Upcall::ConnectionClosed(reason) => {
                        info!(log, "connection closed"; "reason" => ?reason);
                    }
                    Upcall::MessageReceived(message) => {
                        info!(
                            log,
                            "message received";
                            "type" => ?message.msg_type(),
                            "xid" => message.header.xid,
                        );
                        if let MessageBody::EchoRequest(data) = message.body {
                            let reply = Message::new(
                                Header {
                                    version: negotiated,
                                    xid: message.header.xid,
                                },
                                MessageBody::EchoReply(data),
                            );
                            if let Err(e) = client.send(reply).await {
                                warn!(log, "failed to send echo reply"; "reason" => %e);
                            }
                        }
                    }
                }
            }
        }
    }
}
