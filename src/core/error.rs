//! Error types for the CarrotLink client.
//!
//! Each layer has its own enum; [`TelemetryError`] aggregates them at
//! the top. Per-frame errors are recovered locally (logged, frame
//! dropped); connection-phase errors are terminal for their session
//! and drive the reconnect policy. Nothing here is fatal to the
//! owning process.

use thiserror::Error;

/// Errors raised by the framed TCP transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The socket connect did not complete within the configured timeout.
    #[error("connect timed out")]
    ConnectTimeout,

    /// The remote host actively refused the connection.
    #[error("connection refused")]
    ConnectRefused,

    /// A frame read did not complete within the configured timeout.
    #[error("read timed out")]
    ReadTimeout,

    /// The peer closed the stream between or inside frames.
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// The length prefix was outside `(0, 10 MiB]`. The connection
    /// must be abandoned; the framing layer does not resync.
    #[error("invalid frame length: {length}")]
    ProtocolViolation {
        /// The decoded length prefix.
        length: u32,
    },

    /// Frame payload was not valid UTF-8.
    #[error("frame payload is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// Other socket-level I/O failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the authentication handshake.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The server's opening message was not a well-formed challenge.
    #[error("auth protocol error: {0}")]
    Protocol(String),

    /// The server did not answer `auth_success`.
    #[error("authentication failed: {0}")]
    Failed(String),

    /// Transport failure during the handshake.
    #[error("transport error during handshake: {0}")]
    Transport(#[from] TransportError),
}

/// Errors that reject a single telemetry payload. The session
/// continues; only the payload is dropped.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// The frame was not a decodable telemetry object.
    #[error("payload decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The primary speed field was outside the plausible range.
    #[error("speed out of range: {v_ego} m/s")]
    SpeedOutOfRange {
        /// The rejected speed value.
        v_ego: f64,
    },
}

/// Errors raised by source discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Every candidate tier was exhausted without an answering probe.
    #[error("no telemetry source found")]
    NotFound,
}

/// Errors raised by manager-level connection operations.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// No usable network transport (Wi-Fi/Ethernet) is present.
    #[error("no usable network transport")]
    NetworkUnavailable,
}

/// Top-level CarrotLink errors.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Handshake error.
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Discovery error.
    #[error("discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Payload validation error.
    #[error("payload error: {0}")]
    Payload(#[from] PayloadError),

    /// Connection operation error.
    #[error("connect error: {0}")]
    Connect(#[from] ConnectError),
}
