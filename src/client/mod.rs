//! CarrotLink - High-level client API.
//!
//! Configuration, the observable connection state, and the
//! [`TelemetryManager`] orchestrator that external collaborators talk
//! to.

mod config;
mod manager;

pub use config::{ConnectionConfig, ConnectionConfigBuilder, ConnectionState, ConnectionStats};
pub use manager::{ManagerConfig, TelemetryManager};
