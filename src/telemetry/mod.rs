//! CarrotLink - Telemetry payload model and validation.
//!
//! Typed decode of the JSON payloads the source streams, plus the
//! validation policy applied before a payload is published.

mod model;
mod validate;

pub use model::{
    AlertSeverity, CarState, ControlsState, DeviceState, LiveTrack, TelemetrySnapshot,
    ThermalStatus,
};
pub use validate::{validate, validate_at};
