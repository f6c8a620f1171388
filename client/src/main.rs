use clap::Parser;
use client::movement::RandomWalk;
use client::network::RelayClient;
use log::{error, info, warn};
use shared::{MessageType, Position};
use std::time::Duration;
use tokio::time::interval;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Relay address to send to
    #[arg(short = 's', long, default_value = "127.0.0.1:8081")]
    server: String,

    /// Player id written into every packet header
    #[arg(short = 'p', long, default_value = "1")]
    player_id: u32,

    /// Milliseconds between move packets
    #[arg(short = 'r', long, default_value = "100")]
    rate_ms: u64,

    /// Stop after this many moves (0 runs until Ctrl+C)
    #[arg(short = 'c', long, default_value = "0")]
    count: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let mut client = RelayClient::connect(&args.server, args.player_id).await?;
    let mut walk = RandomWalk::random_start();
    let mut ticker = interval(Duration::from_millis(args.rate_ms.max(1)));
    let mut sent = 0u64;

    info!("Publishing moves every {}ms", args.rate_ms);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if args.count > 0 && sent >= args.count {
                    break;
                }
                if let Err(e) = client.send_move(walk.step()).await {
                    error!("Error sending move: {}", e);
                }
                sent += 1;
            },

            result = client.recv_packet() => {
                match result {
                    Ok(packet) if packet.kind() == Ok(MessageType::Move) => {
                        match Position::from_payload(&packet.payload) {
                            Ok(position) => info!("Player {} moved to {}", packet.player_id, position),
                            Err(e) => warn!("Bad move from player {}: {}", packet.player_id, e),
                        }
                    }
                    Ok(packet) => warn!("Unexpected packet type {}", packet.message_type),
                    Err(e) => error!("Error receiving packet: {}", e),
                }
            },

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C");
                break;
            }
        }
    }

    client.disconnect().await?;
    Ok(())
}
