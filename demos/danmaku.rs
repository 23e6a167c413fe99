//! Print chat, gifts and popularity for one room.
//!
//! ```text
//! RUST_LOG=bililive_engine=debug cargo run --example danmaku -- <room_id> [key] [uid]
//! ```
//!
//! `room_id` must be the long numeric id; short ids are not resolved. Press
//! Ctrl-C to leave the room.

use bililive_engine::transport::{WsDialer, DEFAULT_HOST};
use bililive_engine::{CancellationToken, Envelope, LiveBuilder, Message};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let room_id: i64 = args
        .next()
        .ok_or("usage: danmaku <room_id> [key] [uid]")?
        .parse()?;
    let key = args.next().unwrap_or_default();
    let uid = args.next().map(|s| s.parse::<i64>()).transpose()?.unwrap_or(0);

    let (mut live, mut events) = LiveBuilder::new()
        .channel_capacity(256)
        .on_fault(|fault| eprintln!("fault: {fault}"))
        .build();
    live.dial(&WsDialer::new(), DEFAULT_HOST).await?;

    let cancel = CancellationToken::new();
    let stop = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.cancel();
        }
    });

    let printer = tokio::spawn(async move {
        while let Some(envelope) = events.recv().await {
            match envelope {
                Envelope::Message(message) => print_message(&message),
                Envelope::Error(e) => eprintln!("stream error: {e}"),
            }
        }
    });

    let result = live.enter(cancel, room_id, &key, uid).await;
    printer.await?;
    result?;
    Ok(())
}

fn print_message(message: &Message) {
    match message {
        Message::HeartbeatReply(reply) => println!("[popularity] {}", reply.hot()),
        Message::JoinReply(reply) => println!("[joined] accepted={}", reply.is_accepted()),
        Message::Danmaku(dm) => match dm.parse() {
            Ok(dm) => println!("[{}] {}", dm.uname, dm.content),
            Err(e) => eprintln!("bad danmaku: {e}"),
        },
        Message::SendGift(gift) => {
            if let Ok(gift) = gift.parse() {
                println!("[gift] {} {} x{}", gift.uname, gift.gift_name, gift.num);
            }
        }
        Message::SuperChat(sc) => {
            if let Ok(sc) = sc.parse() {
                println!("[super chat {}] {}: {}", sc.price, sc.user_info.uname, sc.message);
            }
        }
        Message::WatchedChange(watched) => {
            if let Ok(watched) = watched.parse() {
                println!("[watched] {}", watched.num);
            }
        }
        other => tracing::debug!(cmd = other.cmd(), "unhandled"),
    }
}
