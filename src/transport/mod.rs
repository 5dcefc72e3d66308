//! CarrotLink - Transport layer.
//!
//! Everything that touches the socket lives here:
//!
//! - **Framing**: [`FramedTransport`], length-prefixed frame I/O
//! - **Handshake**: [`authenticate`], the challenge/response exchange
//! - **Session**: [`ConnectionSession`], one socket's full lifecycle
//! - **Reconnect**: [`ReconnectPolicy`], the retry delay schedule
//!
//! # Architecture
//!
//! The transport layer sits between the telemetry manager and the TCP
//! socket. It frames, authenticates, and streams; it stays agnostic to
//! the payload contents.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         Telemetry Manager               │
//! ├─────────────────────────────────────────┤
//! │         Transport Layer                 │  ← This module
//! │   framing, handshake, session, retry    │
//! ├─────────────────────────────────────────┤
//! │              TCP                        │
//! └─────────────────────────────────────────┘
//! ```

mod auth;
mod framing;
mod reconnect;
mod session;

pub use auth::{authenticate, AuthChallenge, AuthResponse};
pub use framing::FramedTransport;
pub use reconnect::ReconnectPolicy;
pub use session::{ConnectionSession, SessionEvent, SessionPhase};

pub(crate) use session::wait_for_stop;
