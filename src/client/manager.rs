//! Telemetry manager - the root orchestrator.
//!
//! Owns at most one session chain at a time, publishes the
//! connection-state and telemetry streams, validates every payload
//! before publishing, and delegates reconnection and discovery.
//!
//! External collaborators subscribe via [`TelemetryManager::subscribe_state`]
//! and [`TelemetryManager::subscribe_telemetry`]; dropping a receiver
//! is the unsubscribe. Dropping the manager tears the active chain
//! down.

use std::error::Error as _;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::config::{ConnectionConfig, ConnectionState, ConnectionStats};
use crate::core::{
    ConnectError, DiscoveryError, NetworkMonitor, SystemNetworkMonitor, TelemetryError,
    DEFAULT_AUTH_TOKEN, DEFAULT_CONNECT_TIMEOUT, DEFAULT_PORT, DEFAULT_PROBE_TIMEOUT,
    DEFAULT_READ_TIMEOUT, DEFAULT_RECONNECT_INTERVAL, SESSION_EVENT_BUFFER,
};
use crate::discovery::{DiscoveryConfig, DiscoveryService};
use crate::telemetry::{self, TelemetrySnapshot};
use crate::transport::{wait_for_stop, ConnectionSession, ReconnectPolicy, SessionEvent};

/// Stored defaults for a manager - the explicit configuration store
/// supplied at construction. `connect` combines these with the
/// caller's address into a per-chain [`ConnectionConfig`].
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    /// Default telemetry source port.
    pub port: u16,
    /// Shared auth token.
    pub auth_token: String,
    /// Whether failed sessions schedule reconnects.
    pub auto_reconnect: bool,
    /// Reconnect delay past the fast-recovery tier.
    pub reconnect_interval: Duration,
    /// Socket connect timeout.
    pub connect_timeout: Duration,
    /// Per-read timeout in the receive loop.
    pub read_timeout: Duration,
    /// Per-probe timeout during discovery.
    pub probe_timeout: Duration,
    /// Last successfully used address, if one is known.
    pub last_address: Option<String>,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            auth_token: DEFAULT_AUTH_TOKEN.to_string(),
            auto_reconnect: true,
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            last_address: None,
        }
    }
}

/// Handle on a running session chain.
#[derive(Debug)]
struct ChainHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Root orchestrator for one telemetry connection.
///
/// At most one session chain is active per manager; `connect` while a
/// chain is active is a logged no-op. All published state flows
/// through the state/telemetry streams; the manager is their only
/// producer.
pub struct TelemetryManager {
    config: ManagerConfig,
    monitor: Arc<dyn NetworkMonitor>,
    policy: ReconnectPolicy,
    state_tx: watch::Sender<ConnectionState>,
    data_tx: watch::Sender<Option<TelemetrySnapshot>>,
    stats: Arc<RwLock<ConnectionStats>>,
    last_address: RwLock<Option<String>>,
    chain: Mutex<Option<ChainHandle>>,
}

impl TelemetryManager {
    /// Create a manager with the system network monitor.
    pub fn new(config: ManagerConfig) -> Self {
        Self::with_monitor(config, SystemNetworkMonitor)
    }

    /// Create a manager with a custom network monitor.
    pub fn with_monitor(config: ManagerConfig, monitor: impl NetworkMonitor) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        let (data_tx, _) = watch::channel(None);
        let last_address = config.last_address.clone();

        Self {
            config,
            monitor: Arc::new(monitor),
            policy: ReconnectPolicy::new(),
            state_tx,
            data_tx,
            stats: Arc::new(RwLock::new(ConnectionStats::default())),
            last_address: RwLock::new(last_address),
            chain: Mutex::new(None),
        }
    }

    /// Connect to `address` (on `port`, or the stored default port).
    ///
    /// Fails fast with [`ConnectError::NetworkUnavailable`] when no
    /// usable transport is present. A logged no-op if a session chain
    /// is already active. The address is recorded as last-known before
    /// the attempt starts.
    pub async fn connect(
        &self,
        address: impl Into<String>,
        port: Option<u16>,
    ) -> Result<(), ConnectError> {
        let address = address.into();
        let mut chain = self.chain.lock().await;

        if let Some(active) = chain.as_ref() {
            if !active.task.is_finished() {
                warn!("connect ignored: session chain already active");
                return Ok(());
            }
        }

        if !self.monitor.is_available() {
            warn!("connect refused: no usable network transport");
            self.state_tx.send_replace(ConnectionState::Error {
                message: "no usable network transport".to_string(),
                cause: None,
            });
            return Err(ConnectError::NetworkUnavailable);
        }

        let config = ConnectionConfig {
            address: address.clone(),
            port: port.unwrap_or(self.config.port),
            auth_token: self.config.auth_token.clone(),
            auto_reconnect: self.config.auto_reconnect,
            reconnect_interval: self.config.reconnect_interval,
            connect_timeout: self.config.connect_timeout,
            read_timeout: self.config.read_timeout,
        };
        *self.last_address.write().await = Some(address.clone());

        info!(%address, port = config.port, "starting session chain");
        let (stop_tx, stop_rx) = watch::channel(false);
        let ctx = ChainContext {
            config,
            policy: self.policy.clone(),
            state_tx: self.state_tx.clone(),
            data_tx: self.data_tx.clone(),
            stats: Arc::clone(&self.stats),
        };
        let task = tokio::spawn(run_chain(ctx, stop_rx));
        *chain = Some(ChainHandle {
            stop: stop_tx,
            task,
        });

        Ok(())
    }

    /// Run discovery and connect to the first source found.
    ///
    /// Returns whether a source was found - not whether the ensuing
    /// connect/auth ultimately succeeds.
    pub async fn discover_and_connect(&self) -> Result<bool, ConnectError> {
        let discovery = DiscoveryService::new(DiscoveryConfig {
            port: self.config.port,
            probe_timeout: self.config.probe_timeout,
            last_address: self.last_address.read().await.clone(),
        });

        match discovery.discover().await {
            Ok(address) => {
                *self.last_address.write().await = Some(address.clone());
                self.connect(address, None).await?;
                Ok(true)
            }
            Err(DiscoveryError::NotFound) => Ok(false),
        }
    }

    /// Stop the active session chain and publish `Disconnected`.
    ///
    /// Disables auto-reconnect for the current chain only; a later
    /// `connect` starts a fresh chain with the stored defaults.
    pub async fn disconnect(&self) {
        let mut chain = self.chain.lock().await;
        if let Some(active) = chain.take() {
            let _ = active.stop.send(true);
            let _ = active.task.await;
        }
        drop(chain);

        self.data_tx.send_replace(None);
        self.state_tx.send_replace(ConnectionState::Disconnected);
        info!("disconnected");
    }

    /// Tear down and reconnect to the same address and port.
    ///
    /// Only valid while `Connected`; otherwise a logged no-op.
    pub async fn reconnect(&self) -> Result<(), ConnectError> {
        match self.connection_state() {
            ConnectionState::Connected { address, port } => {
                info!(%address, port, "manual reconnect");
                self.disconnect().await;
                self.connect(address, Some(port)).await
            }
            _ => {
                warn!("reconnect ignored: not connected");
                Ok(())
            }
        }
    }

    /// Current connection state.
    pub fn connection_state(&self) -> ConnectionState {
        self.state_tx.borrow().clone()
    }

    /// Whether a session is currently receiving telemetry.
    pub fn is_connected(&self) -> bool {
        matches!(self.connection_state(), ConnectionState::Connected { .. })
    }

    /// Most recent validated snapshot, or `None` before the first one.
    pub fn snapshot(&self) -> Option<TelemetrySnapshot> {
        self.data_tx.borrow().clone()
    }

    /// Accumulated counters.
    pub async fn stats(&self) -> ConnectionStats {
        self.stats.read().await.clone()
    }

    /// Last successfully used address, for external persistence.
    pub async fn last_address(&self) -> Option<String> {
        self.last_address.read().await.clone()
    }

    /// Subscribe to connection-state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// Subscribe to validated telemetry snapshots.
    pub fn subscribe_telemetry(&self) -> watch::Receiver<Option<TelemetrySnapshot>> {
        self.data_tx.subscribe()
    }
}

/// Everything a chain task needs from its manager.
struct ChainContext {
    config: ConnectionConfig,
    policy: ReconnectPolicy,
    state_tx: watch::Sender<ConnectionState>,
    data_tx: watch::Sender<Option<TelemetrySnapshot>>,
    stats: Arc<RwLock<ConnectionStats>>,
}

/// Drive sessions until an explicit stop, a clean close, or a
/// non-recoverable end of the retry schedule.
async fn run_chain(ctx: ChainContext, mut stop: watch::Receiver<bool>) {
    let mut failed_attempts: u32 = 0;

    loop {
        if *stop.borrow() {
            return;
        }
        ctx.state_tx.send_replace(ConnectionState::Connecting);

        let (event_tx, mut event_rx) = mpsc::channel(SESSION_EVENT_BUFFER);
        let session = ConnectionSession::new(ctx.config.clone());
        let session_task = tokio::spawn(session.run(event_tx, stop.clone()));

        let mut session_error: Option<TelemetryError> = None;
        while let Some(event) = event_rx.recv().await {
            match event {
                SessionEvent::Connected { address, port } => {
                    failed_attempts = 0;
                    ctx.state_tx
                        .send_replace(ConnectionState::Connected { address, port });
                }
                SessionEvent::Frame(payload) => {
                    if *stop.borrow() {
                        continue;
                    }
                    handle_frame(&ctx, &payload).await;
                }
                SessionEvent::Closed => {
                    ctx.data_tx.send_replace(None);
                    ctx.state_tx.send_replace(ConnectionState::Disconnected);
                    return;
                }
                SessionEvent::Failed(err) => {
                    session_error = Some(err);
                }
            }
        }
        let _ = session_task.await;

        let Some(err) = session_error else {
            // Session vanished without a terminal event; nothing to retry.
            return;
        };

        let message = err.to_string();
        let cause = err.source().map(|cause| cause.to_string());
        ctx.stats.write().await.last_error = Some(message.clone());
        ctx.state_tx
            .send_replace(ConnectionState::Error { message, cause });

        if !ctx.config.auto_reconnect || *stop.borrow() {
            return;
        }

        let delay = ctx
            .policy
            .delay_for(failed_attempts, ctx.config.reconnect_interval);
        failed_attempts = failed_attempts.saturating_add(1);
        debug!(?delay, attempt = failed_attempts, "scheduling reconnect");

        tokio::select! {
            _ = wait_for_stop(&mut stop) => return,
            _ = tokio::time::sleep(delay) => {}
        }
        if *stop.borrow() {
            return;
        }

        ctx.stats.write().await.reconnect_count += 1;
        ctx.state_tx.send_replace(ConnectionState::Reconnecting);
    }
}

/// Decode, validate, and publish one frame. Bad frames are dropped
/// and logged; the session is never affected.
async fn handle_frame(ctx: &ChainContext, payload: &str) {
    let snapshot: TelemetrySnapshot = match serde_json::from_str(payload) {
        Ok(snapshot) => snapshot,
        Err(err) => {
            warn!(%err, "dropping undecodable telemetry frame");
            return;
        }
    };

    if let Err(err) = telemetry::validate(&snapshot) {
        warn!(%err, "dropping invalid telemetry payload");
        return;
    }

    {
        let mut stats = ctx.stats.write().await;
        stats.messages_received += 1;
        stats.bytes_received += payload.len() as u64;
    }
    ctx.data_tx.send_replace(Some(snapshot));
}
