//! Wire protocol shared by the relay server and its clients.
//!
//! Every datagram carries exactly one packet: a fixed 7-byte header followed by a
//! variable-length payload. All multi-byte fields are little-endian.
//!
//! ```text
//! byte 0       : message type   (0 = disconnect, 1 = move, 2 = action)
//! bytes 1-2    : packet length  (u16, header + payload)
//! bytes 3-6    : player id      (u32)
//! bytes 7..N-1 : payload
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const HEADER_LEN: usize = 7;
pub const MOVE_PAYLOAD_LEN: usize = 12;
pub const MAX_PACKET_LEN: usize = u16::MAX as usize;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("truncated header: got {len} bytes, need 7")]
    TruncatedHeader { len: usize },
    #[error("truncated payload: header declares {expected} payload bytes, only {available} present")]
    TruncatedPayload { expected: usize, available: usize },
    #[error("declared packet length {declared} is smaller than the header")]
    InvalidLength { declared: usize },
    #[error("payload of {len} bytes does not fit in a single packet")]
    PayloadTooLarge { len: usize },
    #[error("move payload has {len} bytes, need 12")]
    ShortMovePayload { len: usize },
    #[error("serialization failed: {0}")]
    Serialization(#[from] bincode::Error),
}

/// Recognised values of the first header byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    Disconnect = 0,
    Move = 1,
    Action = 2,
}

impl TryFrom<u8> for MessageType {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(MessageType::Disconnect),
            1 => Ok(MessageType::Move),
            2 => Ok(MessageType::Action),
            other => Err(other),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageType::Disconnect => write!(f, "disconnect"),
            MessageType::Move => write!(f, "move"),
            MessageType::Action => write!(f, "action"),
        }
    }
}

// Field order is the wire order; bincode's default options write fixed-width
// little-endian integers with no padding, giving exactly HEADER_LEN bytes.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
struct PacketHeader {
    message_type: u8,
    packet_length: u16,
    player_id: u32,
}

/// A decoded packet.
///
/// `message_type` is kept as the raw byte so that unknown types survive decoding
/// and can be rejected by whoever interprets them.
#[derive(Debug, Clone, PartialEq)]
pub struct Packet {
    pub message_type: u8,
    pub packet_length: u16,
    pub player_id: u32,
    pub payload: Vec<u8>,
}

impl Packet {
    /// Builds a packet with `packet_length` derived from the payload.
    pub fn new(kind: MessageType, player_id: u32, payload: Vec<u8>) -> Result<Self, CodecError> {
        let total = HEADER_LEN + payload.len();
        if total > MAX_PACKET_LEN {
            return Err(CodecError::PayloadTooLarge { len: payload.len() });
        }

        Ok(Self {
            message_type: kind as u8,
            packet_length: total as u16,
            player_id,
            payload,
        })
    }

    /// Builds a move packet carrying `position` as its 12-byte payload.
    pub fn movement(player_id: u32, position: Position) -> Result<Self, CodecError> {
        Self::new(MessageType::Move, player_id, position.to_payload()?)
    }

    /// Builds a header-only disconnect packet.
    pub fn disconnect(player_id: u32) -> Self {
        Self {
            message_type: MessageType::Disconnect as u8,
            packet_length: HEADER_LEN as u16,
            player_id,
            payload: Vec::new(),
        }
    }

    /// Interprets the raw type byte. Unknown types come back as `Err` with the byte.
    pub fn kind(&self) -> Result<MessageType, u8> {
        MessageType::try_from(self.message_type)
    }
}

/// Move payload: three little-endian f32 coordinates.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    /// Creates a position from its three coordinates
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Reads the first 12 payload bytes. Extra trailing bytes are ignored.
    pub fn from_payload(payload: &[u8]) -> Result<Self, CodecError> {
        if payload.len() < MOVE_PAYLOAD_LEN {
            return Err(CodecError::ShortMovePayload { len: payload.len() });
        }
        Ok(bincode::deserialize(&payload[..MOVE_PAYLOAD_LEN])?)
    }

    pub fn to_payload(&self) -> Result<Vec<u8>, CodecError> {
        Ok(bincode::serialize(self)?)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

/// Parses one datagram into a packet.
///
/// The payload is exactly `packet_length - 7` bytes; anything after that in the
/// buffer is ignored.
pub fn decode(bytes: &[u8]) -> Result<Packet, CodecError> {
    if bytes.len() < HEADER_LEN {
        return Err(CodecError::TruncatedHeader { len: bytes.len() });
    }

    let header: PacketHeader = bincode::deserialize(&bytes[..HEADER_LEN])?;
    let declared = header.packet_length as usize;
    if declared < HEADER_LEN {
        return Err(CodecError::InvalidLength { declared });
    }

    let expected = declared - HEADER_LEN;
    let available = bytes.len() - HEADER_LEN;
    if expected > available {
        return Err(CodecError::TruncatedPayload {
            expected,
            available,
        });
    }

    Ok(Packet {
        message_type: header.message_type,
        packet_length: header.packet_length,
        player_id: header.player_id,
        payload: bytes[HEADER_LEN..HEADER_LEN + expected].to_vec(),
    })
}

/// Writes the header followed by the payload.
///
/// `packet_length` is written as-is; relayed packets must keep the layout they
/// arrived with.
pub fn encode(packet: &Packet) -> Result<Vec<u8>, CodecError> {
    let header = PacketHeader {
        message_type: packet.message_type,
        packet_length: packet.packet_length,
        player_id: packet.player_id,
    };

    let mut bytes = Vec::with_capacity(HEADER_LEN + packet.payload.len());
    bytes.extend_from_slice(&bincode::serialize(&header)?);
    bytes.extend_from_slice(&packet.payload);
    Ok(bytes)
}
