//! Periodic eviction of clients that stopped sending

use crate::registry::ClientRegistry;
use log::{debug, info};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

/// Runs one sweep against the current time and returns the number of evicted
/// clients.
pub fn sweep_once(registry: &ClientRegistry, timeout: Duration) -> usize {
    let evicted = registry.sweep_expired(Instant::now(), timeout);
    if evicted > 0 {
        info!(
            "Evicted {} inactive clients, {} still connected",
            evicted,
            registry.len()
        );
    } else {
        debug!("Sweep found no inactive clients ({} connected)", registry.len());
    }
    evicted
}

/// Spawns the heartbeat sweeper
///
/// Every `period` the task evicts sessions idle for longer than `timeout`. It
/// never looks at packets, so a client vanishes from the broadcast set at most
/// `timeout + period` after its last packet.
pub fn spawn_sweeper(
    registry: Arc<ClientRegistry>,
    period: Duration,
    timeout: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // First tick fires immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            sweep_once(&registry, timeout);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ClientKey;
    use std::net::SocketAddr;

    fn addr(port: u16) -> SocketAddr {
        ([127, 0, 0, 1], port).into()
    }

    #[test]
    fn test_sweep_once_evicts_stale() {
        let registry = ClientRegistry::new();
        registry.touch(ClientKey::from(addr(7000)), addr(7000));
        std::thread::sleep(Duration::from_millis(100));
        registry.touch(ClientKey::from(addr(7001)), addr(7001));

        assert_eq!(sweep_once(&registry, Duration::from_millis(50)), 1);
        assert!(registry.contains(&ClientKey::from(addr(7001))));
    }

    #[test]
    fn test_sweep_once_on_empty_registry() {
        let registry = ClientRegistry::new();
        assert_eq!(sweep_once(&registry, Duration::from_secs(1)), 0);
    }

    #[tokio::test]
    async fn test_spawned_sweeper_evicts_idle_client() {
        let registry = Arc::new(ClientRegistry::new());
        let key = ClientKey::from(addr(7000));
        registry.touch(key, addr(7000));

        let handle = spawn_sweeper(
            Arc::clone(&registry),
            Duration::from_millis(10),
            Duration::from_millis(50),
        );

        tokio::time::sleep(Duration::from_millis(300)).await;
        handle.abort();

        assert!(!registry.contains(&key));
    }

    #[tokio::test]
    async fn test_spawned_sweeper_keeps_active_client() {
        let registry = Arc::new(ClientRegistry::new());
        let key = ClientKey::from(addr(7000));
        registry.touch(key, addr(7000));

        let handle = spawn_sweeper(
            Arc::clone(&registry),
            Duration::from_millis(10),
            Duration::from_millis(200),
        );

        for _ in 0..10 {
            tokio::time::sleep(Duration::from_millis(20)).await;
            registry.touch(key, addr(7000));
        }
        handle.abort();

        assert!(registry.contains(&key));
    }
}
