//! Connection session state machine.
//!
//! One session owns one socket end-to-end: connect, handshake,
//! receive loop, teardown. A session is single-attempt - one connect,
//! an optional stream of payloads, then a terminal state. Reconnection
//! is the manager starting a *new* session, never resetting this one.

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

use super::auth;
use super::framing::FramedTransport;
use crate::client::ConnectionConfig;
use crate::core::TelemetryError;

/// Session lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Created, connect not yet started.
    Idle,
    /// Opening the socket.
    Connecting,
    /// Socket open, handshake in progress.
    Authenticating,
    /// Handshake done, streaming frames.
    Receiving,
    /// Stopped on request.
    Closed,
    /// Terminated by a connect, handshake, or read error.
    Failed,
}

/// Events a session reports to its owner, in emission order.
///
/// A session emits `Connected` at most once, then zero or more
/// `Frame`s in wire order, then exactly one of `Closed`/`Failed`.
/// Never `Connected` after a terminal event.
#[derive(Debug)]
pub enum SessionEvent {
    /// Socket connected and handshake succeeded.
    Connected {
        /// Address the session connected to.
        address: String,
        /// Port the session connected to.
        port: u16,
    },
    /// One raw frame payload.
    Frame(String),
    /// Session ended because the owner asked it to stop.
    Closed,
    /// Session ended on an error.
    Failed(TelemetryError),
}

/// A single connect-to-teardown lifecycle of one socket.
#[derive(Debug)]
pub struct ConnectionSession {
    config: ConnectionConfig,
    phase: SessionPhase,
}

impl ConnectionSession {
    /// Create an idle session for one connection attempt.
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            phase: SessionPhase::Idle,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Drive the session to a terminal state.
    ///
    /// The receive loop is the socket's only user; the socket is
    /// released on every exit path. Flipping `stop` to `true` (or
    /// dropping its sender) requests a graceful close.
    pub async fn run(mut self, events: mpsc::Sender<SessionEvent>, mut stop: watch::Receiver<bool>) {
        let established = tokio::select! {
            _ = wait_for_stop(&mut stop) => None,
            result = self.establish() => Some(result),
        };

        let mut transport = match established {
            None => {
                self.phase = SessionPhase::Closed;
                debug!("session stopped before establishing");
                let _ = events.send(SessionEvent::Closed).await;
                return;
            }
            Some(Err(err)) => {
                self.phase = SessionPhase::Failed;
                error!(%err, "session failed to establish");
                let _ = events.send(SessionEvent::Failed(err)).await;
                return;
            }
            Some(Ok(transport)) => transport,
        };

        info!(address = %self.config.address, port = self.config.port, "connected");
        let connected = SessionEvent::Connected {
            address: self.config.address.clone(),
            port: self.config.port,
        };
        if events.send(connected).await.is_err() {
            // Owner is gone; nothing left to report to.
            return;
        }

        loop {
            let step = tokio::select! {
                _ = wait_for_stop(&mut stop) => None,
                frame = transport.read_frame() => Some(frame),
            };

            match step {
                None => {
                    self.phase = SessionPhase::Closed;
                    transport.shutdown().await;
                    debug!("session stopped");
                    let _ = events.send(SessionEvent::Closed).await;
                    return;
                }
                Some(Ok(payload)) => {
                    if events.send(SessionEvent::Frame(payload)).await.is_err() {
                        return;
                    }
                }
                Some(Err(err)) => {
                    self.phase = SessionPhase::Failed;
                    error!(%err, "receive loop terminated");
                    let _ = events.send(SessionEvent::Failed(err.into())).await;
                    return;
                }
            }
        }
    }

    async fn establish(&mut self) -> Result<FramedTransport, TelemetryError> {
        self.phase = SessionPhase::Connecting;
        debug!(address = %self.config.address, port = self.config.port, "connecting");
        let mut transport = FramedTransport::connect(
            &self.config.address,
            self.config.port,
            self.config.connect_timeout,
            self.config.read_timeout,
        )
        .await
        .map_err(TelemetryError::from)?;

        self.phase = SessionPhase::Authenticating;
        auth::authenticate(&mut transport, &self.config.auth_token).await?;

        self.phase = SessionPhase::Receiving;
        Ok(transport)
    }
}

/// Resolve when `stop` flips to `true` or its sender goes away.
pub(crate) async fn wait_for_stop(stop: &mut watch::Receiver<bool>) {
    if *stop.borrow() {
        return;
    }
    loop {
        if stop.changed().await.is_err() {
            // Owner dropped the handle; treat as a stop request.
            return;
        }
        if *stop.borrow() {
            return;
        }
    }
}
