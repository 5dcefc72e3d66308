//! Connection configuration, observable state, and counters.

use std::time::Duration;

use crate::core::{
    DEFAULT_AUTH_TOKEN, DEFAULT_CONNECT_TIMEOUT, DEFAULT_PORT, DEFAULT_READ_TIMEOUT,
    DEFAULT_RECONNECT_INTERVAL,
};

/// Immutable settings for one connection attempt chain.
///
/// Built per `connect()` call from the caller's address and the
/// manager's stored defaults; never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Telemetry source address (IP or hostname).
    pub address: String,
    /// Telemetry source port.
    pub port: u16,
    /// Shared auth token; the handshake sends `<token>_<challenge>`.
    pub auth_token: String,
    /// Whether the manager schedules reconnects after failures.
    pub auto_reconnect: bool,
    /// Delay between reconnect attempts past the fast-recovery tier.
    pub reconnect_interval: Duration,
    /// Socket connect timeout.
    pub connect_timeout: Duration,
    /// Per-read timeout in the receive loop.
    pub read_timeout: Duration,
}

impl ConnectionConfig {
    /// Config for `address` with the stock defaults.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            port: DEFAULT_PORT,
            auth_token: DEFAULT_AUTH_TOKEN.to_string(),
            auto_reconnect: true,
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Start building a config for `address`.
    pub fn builder(address: impl Into<String>) -> ConnectionConfigBuilder {
        ConnectionConfigBuilder {
            config: Self::new(address),
        }
    }
}

/// Builder for [`ConnectionConfig`].
#[derive(Debug)]
pub struct ConnectionConfigBuilder {
    config: ConnectionConfig,
}

impl ConnectionConfigBuilder {
    /// Set the port.
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the auth token.
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.config.auth_token = token.into();
        self
    }

    /// Enable or disable automatic reconnection.
    pub fn auto_reconnect(mut self, enabled: bool) -> Self {
        self.config.auto_reconnect = enabled;
        self
    }

    /// Set the reconnect interval.
    pub fn reconnect_interval(mut self, interval: Duration) -> Self {
        self.config.reconnect_interval = interval;
        self
    }

    /// Set the socket connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the per-read timeout.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = timeout;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ConnectionConfig {
        self.config
    }
}

/// Observable connection state, published on every transition.
///
/// Exactly one state is current at any time; transitions are the only
/// mutation path and arrive in the order they occur.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// No active session and none scheduled.
    Disconnected,
    /// A session is opening its socket or authenticating.
    Connecting,
    /// A session is receiving telemetry.
    Connected {
        /// Address of the connected source.
        address: String,
        /// Port of the connected source.
        port: u16,
    },
    /// A reconnect attempt is scheduled or starting.
    Reconnecting,
    /// The most recent session ended with an error.
    Error {
        /// Human-readable failure summary.
        message: String,
        /// Underlying cause, when one exists.
        cause: Option<String>,
    },
}

/// Accumulated counters for one manager lifetime.
///
/// Monotonically updated; reset only when a new manager is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionStats {
    /// Telemetry payloads accepted and published.
    pub messages_received: u64,
    /// Payload bytes across accepted messages.
    pub bytes_received: u64,
    /// Reconnect attempts scheduled since construction.
    pub reconnect_count: u32,
    /// Message of the most recent session error.
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ConnectionConfig::new("192.168.1.77");

        assert_eq!(config.address, "192.168.1.77");
        assert_eq!(config.port, 8090);
        assert_eq!(config.auth_token, "carrotview2024");
        assert!(config.auto_reconnect);
        assert_eq!(config.reconnect_interval, Duration::from_millis(2000));
        assert_eq!(config.connect_timeout, Duration::from_millis(3000));
        assert_eq!(config.read_timeout, Duration::from_millis(10000));
    }

    #[test]
    fn test_config_builder_overrides() {
        let config = ConnectionConfig::builder("10.0.0.5")
            .port(9000)
            .auth_token("pit-crew")
            .auto_reconnect(false)
            .reconnect_interval(Duration::from_secs(5))
            .connect_timeout(Duration::from_secs(1))
            .read_timeout(Duration::from_secs(4))
            .build();

        assert_eq!(config.port, 9000);
        assert_eq!(config.auth_token, "pit-crew");
        assert!(!config.auto_reconnect);
        assert_eq!(config.reconnect_interval, Duration::from_secs(5));
        assert_eq!(config.connect_timeout, Duration::from_secs(1));
        assert_eq!(config.read_timeout, Duration::from_secs(4));
    }

    #[test]
    fn test_stats_start_at_zero() {
        let stats = ConnectionStats::default();
        assert_eq!(stats.messages_received, 0);
        assert_eq!(stats.bytes_received, 0);
        assert_eq!(stats.reconnect_count, 0);
        assert!(stats.last_error.is_none());
    }
}
