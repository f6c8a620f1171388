//! # Relay Server Library
//!
//! This library provides the UDP relay for the multiplayer game. Clients send
//! small binary packets; the relay tracks who is connected and forwards every
//! movement update to all other connected clients, unchanged.
//!
//! ## Core Responsibilities
//!
//! ### Client Tracking
//! A client is identified by the address and port it sends from. Its session
//! is created by the first decodable packet and refreshed by every packet after
//! that. There is no dedicated keep-alive message; ordinary traffic is the
//! heartbeat.
//!
//! ### Movement Relay
//! Move packets are re-encoded with exactly the layout they arrived with and
//! sent to every other registered client. Delivery is fire-and-forget.
//!
//! ### Liveness
//! A background sweeper evicts clients that have been silent for longer than
//! the configured timeout. Send failures never evict anyone.
//!
//! ## Module Organization
//!
//! ### Registry (`registry`)
//! Concurrent map of connected clients. The only shared mutable state.
//!
//! ### Router (`router`)
//! Decodes each datagram, refreshes the sender and dispatches by message type.
//!
//! ### Broadcast (`broadcast`)
//! Fans a packet out to every client except the sender and reports the
//! outcome of each send.
//!
//! ### Sweeper (`sweeper`)
//! Periodic eviction task.
//!
//! ### Network (`network`)
//! Socket ownership and the receive loop.
//!
//! ## Error Policy
//! Malformed packets, unknown message types and failed sends are logged and
//! dropped; the receive loop always moves on to the next datagram. Only a
//! failure to bind the socket at startup is fatal.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::RelayConfig;
//! use server::network::RelayServer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = RelayServer::bind(RelayConfig::default()).await?;
//!     server.run().await;
//!     Ok(())
//! }
//! ```

pub mod broadcast;
pub mod config;
pub mod network;
pub mod registry;
pub mod router;
pub mod sweeper;
