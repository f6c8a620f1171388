//! Fan-out of relayed packets to every client but the sender

use crate::registry::{ClientKey, ClientRegistry};
use log::{debug, error};
use shared::{encode, CodecError, Packet};
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;

/// Destination for outgoing datagrams
///
/// Implemented by the relay's UDP socket; tests substitute a recording sink.
pub trait PacketSink: Send + Sync {
    fn send_to(
        &self,
        buf: &[u8],
        addr: SocketAddr,
    ) -> impl Future<Output = io::Result<usize>> + Send;
}

impl PacketSink for UdpSocket {
    async fn send_to(&self, buf: &[u8], addr: SocketAddr) -> io::Result<usize> {
        UdpSocket::send_to(self, buf, addr).await
    }
}

/// Result of a single delivery attempt
#[derive(Debug)]
pub struct SendOutcome {
    pub recipient: ClientKey,
    pub result: io::Result<usize>,
}

/// Per-recipient outcomes of one broadcast
#[derive(Debug, Default)]
pub struct BroadcastReport {
    pub outcomes: Vec<SendOutcome>,
}

impl BroadcastReport {
    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.attempted() - self.delivered()
    }
}

/// Fans a move packet out to every registered client except its sender
///
/// Recipients come from a registry snapshot taken once per packet. A failed
/// send is logged and counted but never evicts the recipient.
pub struct BroadcastEngine<S> {
    registry: Arc<ClientRegistry>,
    sink: Arc<S>,
}

impl<S: PacketSink> BroadcastEngine<S> {
    pub fn new(registry: Arc<ClientRegistry>, sink: Arc<S>) -> Self {
        Self { registry, sink }
    }

    /// Sends `packet`, re-encoded with its received layout, to every registered
    /// client except `sender`.
    ///
    /// A failed send is logged and recorded in the report. It never stops the
    /// remaining sends and never removes the recipient; eviction belongs to the
    /// sweeper.
    pub async fn relay_move(
        &self,
        packet: &Packet,
        sender: &ClientKey,
    ) -> Result<BroadcastReport, CodecError> {
        let bytes = encode(packet)?;
        let recipients = self.registry.snapshot_others(sender);

        let mut report = BroadcastReport::default();
        for (recipient, addr) in recipients {
            let result = self.sink.send_to(&bytes, addr).await;
            if let Err(e) = &result {
                error!("Failed to send packet to {}: {}", recipient, e);
            }
            report.outcomes.push(SendOutcome { recipient, result });
        }

        debug!(
            "Relayed move from {} to {}/{} clients",
            sender,
            report.delivered(),
            report.attempted()
        );
        Ok(report)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use shared::{decode, Position};
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Records every datagram instead of sending it
    #[derive(Default)]
    pub(crate) struct RecordingSink {
        pub sent: Mutex<Vec<(SocketAddr, Vec<u8>)>>,
        pub unreachable: HashSet<SocketAddr>,
    }

    impl RecordingSink {
        pub fn sent(&self) -> Vec<(SocketAddr, Vec<u8>)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl PacketSink for RecordingSink {
        async fn send_to(&self, buf: &[u8], addr: SocketAddr) -> io::Result<usize> {
            if self.unreachable.contains(&addr) {
                return Err(io::Error::new(io::ErrorKind::ConnectionRefused, "unreachable"));
            }
            self.sent.lock().unwrap().push((addr, buf.to_vec()));
            Ok(buf.len())
        }
    }

    fn addr(port: u16) -> SocketAddr {
        ([127, 0, 0, 1], port).into()
    }

    fn registry_with(ports: &[u16]) -> Arc<ClientRegistry> {
        let registry = Arc::new(ClientRegistry::new());
        for &port in ports {
            registry.touch(ClientKey::from(addr(port)), addr(port));
        }
        registry
    }

    #[test]
    fn test_relay_skips_sender() {
        let registry = registry_with(&[5000, 5001, 5002, 5003]);
        let sink = Arc::new(RecordingSink::default());
        let engine = BroadcastEngine::new(Arc::clone(&registry), Arc::clone(&sink));

        let packet = Packet::movement(1, Position::new(1.0, 2.0, 3.0)).unwrap();
        let sender = ClientKey::from(addr(5000));
        let report = tokio_test::block_on(engine.relay_move(&packet, &sender)).unwrap();

        assert_eq!(report.attempted(), 3);
        assert_eq!(report.delivered(), 3);

        let sent = sink.sent();
        assert_eq!(sent.len(), 3);
        assert!(sent.iter().all(|(a, _)| *a != addr(5000)));

        let expected = encode(&packet).unwrap();
        for (_, bytes) in sent {
            assert_eq!(bytes.len(), 19);
            assert_eq!(bytes, expected);
            assert_eq!(decode(&bytes).unwrap(), packet);
        }
    }

    #[test]
    fn test_relay_isolates_send_failures() {
        let registry = registry_with(&[5000, 5001, 5002, 5003]);
        let sink = Arc::new(RecordingSink {
            unreachable: [addr(5001)].into_iter().collect(),
            ..Default::default()
        });
        let engine = BroadcastEngine::new(Arc::clone(&registry), Arc::clone(&sink));

        let packet = Packet::movement(1, Position::default()).unwrap();
        let report =
            tokio_test::block_on(engine.relay_move(&packet, &ClientKey::from(addr(5000)))).unwrap();

        assert_eq!(report.attempted(), 3);
        assert_eq!(report.failed(), 1);
        assert_eq!(sink.sent().len(), 2);
        assert!(registry.contains(&ClientKey::from(addr(5001))));
    }

    #[test]
    fn test_relay_with_no_other_clients() {
        let registry = registry_with(&[5000]);
        let sink = Arc::new(RecordingSink::default());
        let engine = BroadcastEngine::new(registry, Arc::clone(&sink));

        let packet = Packet::movement(1, Position::default()).unwrap();
        let report =
            tokio_test::block_on(engine.relay_move(&packet, &ClientKey::from(addr(5000)))).unwrap();

        assert_eq!(report.attempted(), 0);
        assert!(sink.sent().is_empty());
    }

    #[test]
    fn test_relay_preserves_declared_length() {
        let registry = registry_with(&[5000, 5001]);
        let sink = Arc::new(RecordingSink::default());
        let engine = BroadcastEngine::new(registry, Arc::clone(&sink));

        let mut bytes = vec![1u8, 23, 0, 9, 0, 0, 0];
        bytes.extend_from_slice(&[0u8; 16]);
        let packet = decode(&bytes).unwrap();

        tokio_test::block_on(engine.relay_move(&packet, &ClientKey::from(addr(5000)))).unwrap();

        assert_eq!(sink.sent(), vec![(addr(5001), bytes)]);
    }
}
