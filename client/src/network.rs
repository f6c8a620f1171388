//! Client side of the relay protocol

use log::{debug, info};
use shared::{decode, encode, MessageType, Packet, Position, MAX_PACKET_LEN};
use std::net::SocketAddr;
use tokio::net::UdpSocket;

/// UDP endpoint for one player talking to the relay
///
/// Every send goes to the relay address; moves from other players arrive on
/// the same socket through `recv_packet`.
pub struct RelayClient {
    socket: UdpSocket,
    server_addr: SocketAddr,
    player_id: u32,
    buffer: Vec<u8>,
}

impl RelayClient {
    /// Binds an ephemeral local socket for talking to the relay at `server_addr`
    pub async fn connect(
        server_addr: &str,
        player_id: u32,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let server_addr: SocketAddr = server_addr.parse()?;
        let bind_addr = if server_addr.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };
        let socket = UdpSocket::bind(bind_addr).await?;
        info!(
            "Player {} bound to {}, relay at {}",
            player_id,
            socket.local_addr()?,
            server_addr
        );

        Ok(RelayClient {
            socket,
            server_addr,
            player_id,
            buffer: vec![0u8; MAX_PACKET_LEN],
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    async fn send_packet(&self, packet: &Packet) -> Result<(), Box<dyn std::error::Error>> {
        let data = encode(packet)?;
        self.socket.send_to(&data, self.server_addr).await?;
        Ok(())
    }

    pub async fn send_move(&self, position: Position) -> Result<(), Box<dyn std::error::Error>> {
        debug!("Sending move to {}", position);
        self.send_packet(&Packet::movement(self.player_id, position)?)
            .await
    }

    /// Sends an action packet. The relay treats these as heartbeats only.
    pub async fn send_action(&self, payload: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
        self.send_packet(&Packet::new(MessageType::Action, self.player_id, payload)?)
            .await
    }

    pub async fn disconnect(&self) -> Result<(), Box<dyn std::error::Error>> {
        info!("Player {} disconnecting", self.player_id);
        self.send_packet(&Packet::disconnect(self.player_id)).await
    }

    /// Waits for the next packet relayed to this client
    pub async fn recv_packet(&mut self) -> Result<Packet, Box<dyn std::error::Error>> {
        let (len, _) = self.socket.recv_from(&mut self.buffer).await?;
        Ok(decode(&self.buffer[..len])?)
    }
}
