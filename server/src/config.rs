//! Relay server settings

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8081;
pub const DEFAULT_CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_RECV_BUFFER_SIZE: usize = shared::MAX_PACKET_LEN;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid bind address {0:?}")]
    InvalidAddress(String),
    #[error("client timeout must be greater than zero")]
    ZeroTimeout,
    #[error("sweep interval must be greater than zero")]
    ZeroSweepInterval,
    #[error("sweep interval {sweep:?} must be shorter than the client timeout {timeout:?}")]
    SweepNotShorterThanTimeout { sweep: Duration, timeout: Duration },
    #[error("receive buffer of {size} bytes cannot hold a {max}-byte packet")]
    BufferTooSmall { size: usize, max: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RelayConfig {
    pub bind_addr: SocketAddr,
    /// Idle time after which a client is evicted
    pub client_timeout: Duration,
    pub sweep_interval: Duration,
    /// Bytes read per datagram; must fit the largest legal packet, since one
    /// datagram is one packet and the socket truncates anything longer
    pub recv_buffer_size: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            client_timeout: DEFAULT_CLIENT_TIMEOUT,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            recv_buffer_size: DEFAULT_RECV_BUFFER_SIZE,
        }
    }
}

impl RelayConfig {
    pub fn with_host_port(host: &str, port: u16) -> Result<Self, ConfigError> {
        let ip: IpAddr = host
            .parse()
            .map_err(|_| ConfigError::InvalidAddress(host.to_string()))?;
        Ok(Self {
            bind_addr: SocketAddr::new(ip, port),
            ..Self::default()
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client_timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.sweep_interval.is_zero() {
            return Err(ConfigError::ZeroSweepInterval);
        }
        if self.sweep_interval >= self.client_timeout {
            return Err(ConfigError::SweepNotShorterThanTimeout {
                sweep: self.sweep_interval,
                timeout: self.client_timeout,
            });
        }
        if self.recv_buffer_size < shared::MAX_PACKET_LEN {
            return Err(ConfigError::BufferTooSmall {
                size: self.recv_buffer_size,
                max: shared::MAX_PACKET_LEN,
            });
        }
        Ok(())
    }
}
