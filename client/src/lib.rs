//! # Relay Client Library
//!
//! A headless client for the UDP relay. It publishes this player's position as
//! move packets and receives the moves the relay forwards from everyone else.
//!
//! ## Module Organization
//!
//! ### Network Module (`network`)
//! Socket handling and packet encoding:
//! - Move, action and disconnect packets stamped with this player's id
//! - Decoding of relayed packets
//!
//! ### Movement Module (`movement`)
//! A bounded random walk that stands in for real player input.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::movement::RandomWalk;
//! use client::network::RelayClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = RelayClient::connect("127.0.0.1:8081", 1).await?;
//!     let mut walk = RandomWalk::random_start();
//!
//!     client.send_move(walk.step()).await?;
//!     let relayed = client.recv_packet().await?;
//!     println!("player {} moved", relayed.player_id);
//!
//!     client.disconnect().await?;
//!     Ok(())
//! }
//! ```

pub mod movement;
pub mod network;
