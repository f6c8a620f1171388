use clap::Parser;
use log::{error, info};
use server::config::{
    RelayConfig, DEFAULT_CLIENT_TIMEOUT, DEFAULT_PORT, DEFAULT_RECV_BUFFER_SIZE,
    DEFAULT_SWEEP_INTERVAL,
};
use server::network::RelayServer;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    host: String,

    /// UDP port to listen on
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Milliseconds of silence before a client is evicted
    #[arg(short, long, default_value_t = DEFAULT_CLIENT_TIMEOUT.as_millis() as u64)]
    timeout_ms: u64,

    /// Milliseconds between liveness sweeps
    #[arg(short, long, default_value_t = DEFAULT_SWEEP_INTERVAL.as_millis() as u64)]
    sweep_ms: u64,

    /// Receive buffer size in bytes, at least the largest packet (65535)
    #[arg(short, long, default_value_t = DEFAULT_RECV_BUFFER_SIZE)]
    buffer_size: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=debug for per-packet logging");
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = RelayConfig {
        client_timeout: Duration::from_millis(args.timeout_ms),
        sweep_interval: Duration::from_millis(args.sweep_ms),
        recv_buffer_size: args.buffer_size,
        ..RelayConfig::with_host_port(&args.host, args.port)?
    };

    let server = match RelayServer::bind(config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to start relay: {}", e);
            return Err(e);
        }
    };

    tokio::select! {
        _ = server.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
