//! Per-datagram dispatch by message type

use crate::broadcast::{BroadcastEngine, BroadcastReport, PacketSink};
use crate::registry::{ClientKey, ClientRegistry};
use log::{debug, info};
use shared::{decode, CodecError, MessageType, Position};
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;

/// Why a datagram was dropped
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("malformed packet: {0}")]
    Malformed(#[source] CodecError),
    #[error("unrecognized message type {0}")]
    UnknownMessageType(u8),
    #[error("invalid move: {0}")]
    InvalidMove(#[source] CodecError),
}

/// What the router did with a datagram
#[derive(Debug)]
pub enum RouteOutcome {
    Disconnected { removed: bool },
    Relayed { position: Position, report: BroadcastReport },
    Action { player_id: u32 },
}

/// Entry point for every inbound datagram
///
/// Decodes the bytes, refreshes the sender's session and dispatches on the
/// message type. Only datagrams that decode count as heartbeats.
pub struct Router<S> {
    registry: Arc<ClientRegistry>,
    broadcast: BroadcastEngine<S>,
}

impl<S: PacketSink> Router<S> {
    pub fn new(registry: Arc<ClientRegistry>, sink: Arc<S>) -> Self {
        let broadcast = BroadcastEngine::new(Arc::clone(&registry), sink);
        Self {
            registry,
            broadcast,
        }
    }

    /// Decodes one datagram from `from` and acts on it
    ///
    /// Any successfully decoded packet counts as a heartbeat, whatever its type,
    /// so the sender is touched before dispatch. Errors only describe this one
    /// datagram; the caller logs them and keeps receiving.
    pub async fn handle_datagram(
        &self,
        data: &[u8],
        from: SocketAddr,
    ) -> Result<RouteOutcome, RouteError> {
        let packet = decode(data).map_err(RouteError::Malformed)?;
        let sender = ClientKey::from(from);
        self.registry.touch(sender, from);

        match packet.kind() {
            Ok(MessageType::Disconnect) => {
                let removed = self.registry.remove(&sender);
                info!("Player {} disconnected: {}", packet.player_id, sender);
                Ok(RouteOutcome::Disconnected { removed })
            }
            Ok(MessageType::Move) => {
                let position =
                    Position::from_payload(&packet.payload).map_err(RouteError::InvalidMove)?;
                debug!(
                    "Player {} at {} moved to {}",
                    packet.player_id, sender, position
                );

                let report = self
                    .broadcast
                    .relay_move(&packet, &sender)
                    .await
                    .map_err(RouteError::Malformed)?;
                Ok(RouteOutcome::Relayed { position, report })
            }
            Ok(MessageType::Action) => {
                debug!("Processing action for player {}", packet.player_id);
                Ok(RouteOutcome::Action {
                    player_id: packet.player_id,
                })
            }
            Err(unknown) => Err(RouteError::UnknownMessageType(unknown)),
        }
    }
}
