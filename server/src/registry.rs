//! Connected-client tracking for the relay
//!
//! This module owns the only copy of "who is currently connected":
//! - Session creation on the first packet from a new transport address
//! - Liveness refresh on every later packet from that address
//! - Explicit removal on disconnect and timed eviction by the sweeper
//! - Point-in-time snapshots for broadcasting
//!
//! The registry is shared between the receive loop and the sweeper task, so every
//! operation synchronises internally and takes `&self`.

use dashmap::DashMap;
use log::info;
use std::fmt;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// Transport-level identity of a client: the address and port it sends from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientKey(SocketAddr);

impl ClientKey {
    pub fn addr(&self) -> SocketAddr {
        self.0
    }
}

impl From<SocketAddr> for ClientKey {
    fn from(addr: SocketAddr) -> Self {
        Self(addr)
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Liveness state for one connected client
#[derive(Debug, Clone)]
pub struct ClientSession {
    /// Address that deliveries go to, fixed when the session is created
    pub address: SocketAddr,
    /// Last time any decodable packet arrived from this client
    pub last_seen: Instant,
}

impl ClientSession {
    pub fn new(address: SocketAddr, now: Instant) -> Self {
        Self {
            address,
            last_seen: now,
        }
    }

    /// Returns true if nothing has been heard from this client for longer than
    /// `timeout` as of `now`.
    pub fn is_expired(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_seen) > timeout
    }
}

/// Thread-safe map of connected clients
///
/// Backed by a sharded concurrent map. Per-key operations lock a single shard,
/// which makes insert-if-absent-then-refresh atomic without a registry-wide lock.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    sessions: DashMap<ClientKey, ClientSession>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records activity from `key` at the current time
    ///
    /// Returns true if this created a new session.
    pub fn touch(&self, key: ClientKey, address: SocketAddr) -> bool {
        self.touch_at(key, address, Instant::now())
    }

    /// Records activity from `key` at `now`
    ///
    /// A new key is bound to `address`. For a known key only the timestamp moves,
    /// and never backwards; the original address binding is kept.
    pub fn touch_at(&self, key: ClientKey, address: SocketAddr, now: Instant) -> bool {
        let mut created = false;
        self.sessions
            .entry(key)
            .and_modify(|session| session.last_seen = session.last_seen.max(now))
            .or_insert_with(|| {
                created = true;
                ClientSession::new(address, now)
            });

        if created {
            info!(
                "Client {} connected ({} connected)",
                key,
                self.sessions.len()
            );
        }
        created
    }

    /// Removes `key` if present. Returns true if a session was removed.
    pub fn remove(&self, key: &ClientKey) -> bool {
        self.sessions.remove(key).is_some()
    }

    /// Collects every registered client except `exclude`
    ///
    /// Shards are read one at a time, so the result may miss a client that joins
    /// mid-scan, but no entry is ever observed half-written.
    pub fn snapshot_others(&self, exclude: &ClientKey) -> Vec<(ClientKey, SocketAddr)> {
        self.sessions
            .iter()
            .filter(|entry| entry.key() != exclude)
            .map(|entry| (*entry.key(), entry.value().address))
            .collect()
    }

    /// Evicts every session not seen within `timeout` of `now` and returns how
    /// many were removed.
    pub fn sweep_expired(&self, now: Instant, timeout: Duration) -> usize {
        let mut evicted = 0;
        self.sessions.retain(|key, session| {
            if session.is_expired(now, timeout) {
                info!("Evicting inactive client {}", key);
                evicted += 1;
                false
            } else {
                true
            }
        });
        evicted
    }

    /// Returns a copy of the session, if the client is registered
    pub fn get(&self, key: &ClientKey) -> Option<ClientSession> {
        self.sessions.get(key).map(|entry| entry.value().clone())
    }

    /// Whether `key` currently has a session
    pub fn contains(&self, key: &ClientKey) -> bool {
        self.sessions.contains_key(key)
    }

    /// Returns the number of currently connected clients
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// True when no client is connected
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
