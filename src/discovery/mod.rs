//! CarrotLink - Telemetry source discovery.
//!
//! Locates a reachable telemetry source on the local network without a
//! known address. Candidates are tried most-likely-first: the last
//! successfully used address, conventional host suffixes on the local
//! `/24` subnet, a parallel sweep of that subnet, then a fixed list of
//! common private subnets. Tiers run sequentially; within a sweep,
//! probes race in parallel and the first success cancels the rest.

mod probe;

pub use probe::probe;

use std::net::IpAddr;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::core::{
    DiscoveryError, DEFAULT_PORT, DEFAULT_PROBE_TIMEOUT, FALLBACK_SUBNETS, PRIORITY_HOST_SUFFIXES,
};

/// Discovery parameters.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Port the telemetry source listens on.
    pub port: u16,
    /// Per-probe timeout (connect and first bytes, each).
    pub probe_timeout: Duration,
    /// Address of the last successful connection, tried first.
    pub last_address: Option<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            last_address: None,
        }
    }
}

/// Tiered scanner for telemetry sources.
#[derive(Debug, Clone)]
pub struct DiscoveryService {
    config: DiscoveryConfig,
}

impl DiscoveryService {
    /// Create a service with the given parameters.
    pub fn new(config: DiscoveryConfig) -> Self {
        Self { config }
    }

    /// Find a reachable telemetry source.
    ///
    /// Returns the first address that answers a probe, walking the
    /// priority tiers in order, or [`DiscoveryError::NotFound`] once
    /// every tier is exhausted. Individual probe failures are silent.
    pub async fn discover(&self) -> Result<String, DiscoveryError> {
        if let Some(last) = &self.config.last_address {
            debug!(address = %last, "probing last known address");
            if probe(last, self.config.port, self.config.probe_timeout).await {
                info!(address = %last, "telemetry source at last known address");
                return Ok(last.clone());
            }
        }

        let local_subnet = local_subnet();
        if let Some(subnet) = &local_subnet {
            debug!(subnet, "sweeping local subnet");
            if let Some(found) = self.sweep_subnet(subnet).await {
                info!(address = %found, "telemetry source in local subnet");
                return Ok(found);
            }
        }

        for subnet in FALLBACK_SUBNETS {
            if local_subnet.as_deref() == Some(subnet) {
                continue;
            }
            debug!(subnet, "sweeping fallback subnet");
            if let Some(found) = self.sweep_subnet(subnet).await {
                info!(address = %found, "telemetry source in fallback subnet");
                return Ok(found);
            }
        }

        warn!("no telemetry source found in any tier");
        Err(DiscoveryError::NotFound)
    }

    /// Sweep one `/24`: priority suffixes sequentially for a quick
    /// find, then the rest of the host range in parallel.
    async fn sweep_subnet(&self, subnet: &str) -> Option<String> {
        for suffix in PRIORITY_HOST_SUFFIXES {
            let address = format!("{subnet}.{suffix}");
            if probe(&address, self.config.port, self.config.probe_timeout).await {
                return Some(address);
            }
        }

        let targets: Vec<(String, u16)> = (1u8..=254)
            .filter(|host| !PRIORITY_HOST_SUFFIXES.contains(host))
            .map(|host| (format!("{subnet}.{host}"), self.config.port))
            .collect();
        self.race(targets).await.map(|(address, _)| address)
    }

    /// Probe all targets concurrently; the first success wins and the
    /// remaining in-flight probes are aborted, closing their sockets.
    async fn race(&self, targets: Vec<(String, u16)>) -> Option<(String, u16)> {
        let mut probes = JoinSet::new();
        for (address, port) in targets {
            let probe_timeout = self.config.probe_timeout;
            probes.spawn(async move {
                probe(&address, port, probe_timeout)
                    .await
                    .then_some((address, port))
            });
        }

        while let Some(joined) = probes.join_next().await {
            if let Ok(Some(winner)) = joined {
                probes.abort_all();
                return Some(winner);
            }
        }
        None
    }
}

/// Derive the `/24` prefix of the local interface address, if any.
fn local_subnet() -> Option<String> {
    match local_ip_address::local_ip() {
        Ok(IpAddr::V4(ip)) => {
            let octets = ip.octets();
            Some(format!("{}.{}.{}", octets[0], octets[1], octets[2]))
        }
        Ok(IpAddr::V6(_)) | Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    use super::*;

    const TEST_PROBE_TIMEOUT: Duration = Duration::from_millis(200);

    fn test_service(last_address: Option<String>) -> DiscoveryService {
        DiscoveryService::new(DiscoveryConfig {
            port: DEFAULT_PORT,
            probe_timeout: TEST_PROBE_TIMEOUT,
            last_address,
        })
    }

    /// Listener that immediately pushes a frame prefix, like the
    /// telemetry source announcing its auth challenge.
    async fn speaking_listener() -> (u16, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let task = tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let _ = stream.write_all(&64u32.to_be_bytes()).await;
                let _ = stream.flush().await;
            }
        });
        (port, task)
    }

    /// Listener that accepts but never speaks.
    async fn silent_listener() -> (u16, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let task = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });
        (port, task)
    }

    #[tokio::test]
    async fn test_race_returns_single_responder() {
        let (winner_port, winner) = speaking_listener().await;
        let (silent_port, silent) = silent_listener().await;

        // A refused port: bind then drop.
        let refused = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let refused_port = refused.local_addr().unwrap().port();
        drop(refused);

        let service = test_service(None);
        let targets = vec![
            ("127.0.0.1".to_string(), silent_port),
            ("127.0.0.1".to_string(), refused_port),
            ("127.0.0.1".to_string(), winner_port),
        ];

        let started = Instant::now();
        let found = service.race(targets).await;

        assert_eq!(found, Some(("127.0.0.1".to_string(), winner_port)));
        // Probes run in parallel: the sweep ends well before the
        // silent peer's timeout would have expired sequentially.
        assert!(started.elapsed() < TEST_PROBE_TIMEOUT * 3);

        winner.abort();
        silent.abort();
    }

    #[tokio::test]
    async fn test_race_exhausts_to_none() {
        let refused = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let refused_port = refused.local_addr().unwrap().port();
        drop(refused);

        let service = test_service(None);
        let targets = vec![
            ("127.0.0.1".to_string(), refused_port),
        ];
        assert_eq!(service.race(targets).await, None);
    }

    #[tokio::test]
    async fn test_discover_prefers_last_known_address() {
        let (port, server) = speaking_listener().await;

        let service = DiscoveryService::new(DiscoveryConfig {
            port,
            probe_timeout: TEST_PROBE_TIMEOUT,
            last_address: Some("127.0.0.1".to_string()),
        });

        // The last-known tier answers, so no subnet is ever swept.
        let found = service.discover().await.unwrap();
        assert_eq!(found, "127.0.0.1");

        server.abort();
    }
}
