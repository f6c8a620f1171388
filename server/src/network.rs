//! Server network layer: the UDP socket and its receive loop

use crate::config::RelayConfig;
use crate::registry::ClientRegistry;
use crate::router::{RouteOutcome, Router};
use crate::sweeper::spawn_sweeper;
use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;

/// The relay: one socket, one registry, one receive loop
pub struct RelayServer {
    socket: Arc<UdpSocket>,
    registry: Arc<ClientRegistry>,
    router: Router<UdpSocket>,
    config: RelayConfig,
}

impl RelayServer {
    /// Validates `config` and binds the listening socket
    ///
    /// Failing to bind is fatal: the relay cannot run without its socket.
    pub async fn bind(config: RelayConfig) -> Result<Self, Box<dyn std::error::Error>> {
        config.validate()?;

        let socket = Arc::new(UdpSocket::bind(config.bind_addr).await?);
        info!("Relay listening on {}", socket.local_addr()?);

        let registry = Arc::new(ClientRegistry::new());
        let router = Router::new(Arc::clone(&registry), Arc::clone(&socket));

        Ok(RelayServer {
            socket,
            registry,
            router,
            config,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn registry(&self) -> Arc<ClientRegistry> {
        Arc::clone(&self.registry)
    }

    /// Receives and routes datagrams until the process exits
    ///
    /// Also starts the heartbeat sweeper, which is stopped if this future is
    /// dropped.
    pub async fn run(&self) {
        let sweeper = spawn_sweeper(
            Arc::clone(&self.registry),
            self.config.sweep_interval,
            self.config.client_timeout,
        );
        let _sweeper_guard = AbortOnDrop(sweeper);

        let mut buffer = vec![0u8; self.config.recv_buffer_size];
        info!(
            "Relay started (timeout {:?}, sweep every {:?})",
            self.config.client_timeout, self.config.sweep_interval
        );

        loop {
            match self.socket.recv_from(&mut buffer).await {
                Ok((len, addr)) => self.handle_datagram(&buffer[..len], addr).await,
                Err(e) => {
                    error!("Error receiving packet: {}", e);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        }
    }

    async fn handle_datagram(&self, data: &[u8], addr: SocketAddr) {
        debug!("Received {} bytes from {}", data.len(), addr);

        match self.router.handle_datagram(data, addr).await {
            Ok(RouteOutcome::Relayed { report, .. }) if report.failed() > 0 => {
                warn!(
                    "Relay from {} reached {}/{} clients",
                    addr,
                    report.delivered(),
                    report.attempted()
                );
            }
            Ok(_) => {}
            Err(e) => warn!("Dropped datagram from {}: {}", addr, e),
        }
    }
}

struct AbortOnDrop(tokio::task::JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ClientKey;
    use shared::{encode, Packet, Position};

    fn local_config() -> RelayConfig {
        RelayConfig::with_host_port("127.0.0.1", 0).unwrap()
    }

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let server = RelayServer::bind(local_config()).await.unwrap();
        assert_ne!(server.local_addr().unwrap().port(), 0);
        assert!(server.registry().is_empty());
    }

    #[tokio::test]
    async fn test_bind_rejects_invalid_config() {
        let config = RelayConfig {
            sweep_interval: Duration::from_secs(60),
            ..local_config()
        };
        assert!(RelayServer::bind(config).await.is_err());
    }

    #[tokio::test]
    async fn test_bind_conflict_is_error() {
        let first = RelayServer::bind(local_config()).await.unwrap();
        let taken = first.local_addr().unwrap();

        let config = RelayConfig {
            bind_addr: taken,
            ..local_config()
        };
        assert!(RelayServer::bind(config).await.is_err());
    }

    #[tokio::test]
    async fn test_handle_datagram_survives_garbage() {
        let server = RelayServer::bind(local_config()).await.unwrap();
        let addr: SocketAddr = "127.0.0.1:6500".parse().unwrap();

        server.handle_datagram(&[0xFF; 3], addr).await;
        server.handle_datagram(&[7, 7, 0, 0, 0, 0, 0], addr).await;

        let bytes = encode(&Packet::movement(1, Position::default()).unwrap()).unwrap();
        server.handle_datagram(&bytes, addr).await;

        assert!(server.registry().contains(&ClientKey::from(addr)));
    }
}
