//! # CarrotLink
//!
//! Telemetry transport client for CarrotPilot companion devices.
//!
//! CarrotLink speaks a length-prefixed TCP streaming protocol to a
//! driving-assistance device on the local network. It provides:
//!
//! - **Framing**: 4-byte big-endian length prefix + UTF-8 JSON payload
//! - **Handshake**: challenge/response token authentication
//! - **Resilience**: tiered automatic reconnection under flaky Wi-Fi
//! - **Discovery**: parallel LAN probing to locate the source
//! - **Validation**: structural and range checks before publishing
//!
//! ## Modules
//!
//! - [`core`]: constants, error taxonomy, and host seams
//! - [`transport`]: framed I/O, handshake, session state machine
//! - [`discovery`]: tiered candidate scanning with racing probes
//! - [`telemetry`]: typed payload model and validation policy
//! - [`client`]: configuration and the [`TelemetryManager`] orchestrator
//!
//! ## Example Usage
//!
//! ```no_run
//! use carrotlink::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = TelemetryManager::new(ManagerConfig::default());
//!     let mut telemetry = manager.subscribe_telemetry();
//!
//!     if manager.discover_and_connect().await? {
//!         while telemetry.changed().await.is_ok() {
//!             if let Some(snapshot) = telemetry.borrow().clone() {
//!                 println!("speed: {:.1} m/s", snapshot.car_state.v_ego);
//!             }
//!         }
//!     }
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod core;
pub mod discovery;
pub mod telemetry;
pub mod transport;

/// Prelude module for convenient imports.
pub mod prelude {
    // Constants, errors, and host seams
    pub use crate::core::*;

    // Client API
    pub use crate::client::{
        ConnectionConfig, ConnectionConfigBuilder, ConnectionState, ConnectionStats,
        ManagerConfig, TelemetryManager,
    };

    // Transport types
    pub use crate::transport::{
        authenticate, AuthChallenge, AuthResponse, ConnectionSession, FramedTransport,
        ReconnectPolicy, SessionEvent, SessionPhase,
    };

    // Discovery
    pub use crate::discovery::{probe, DiscoveryConfig, DiscoveryService};

    // Telemetry model and validation
    pub use crate::telemetry::{
        validate, validate_at, AlertSeverity, CarState, ControlsState, DeviceState, LiveTrack,
        TelemetrySnapshot, ThermalStatus,
    };
}

// Re-export commonly used items at crate root
pub use crate::client::{
    ConnectionConfig, ConnectionState, ConnectionStats, ManagerConfig, TelemetryManager,
};
pub use crate::core::{
    AuthError, ConnectError, DiscoveryError, PayloadError, TelemetryError, TransportError,
};
pub use crate::discovery::DiscoveryService;
pub use crate::telemetry::TelemetrySnapshot;
pub use crate::transport::{ConnectionSession, FramedTransport, ReconnectPolicy};
