//! Typed telemetry payload model.
//!
//! Wire payloads are camelCase JSON objects pushed by the telemetry
//! source at its own cadence. Decoding is strict: required fields must
//! be present and well-typed; unknown fields are ignored.

use serde::{Deserialize, Serialize};

/// One decoded telemetry payload.
///
/// Each snapshot supersedes the previous one; snapshots are never
/// merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetrySnapshot {
    /// Source wall clock, Unix milliseconds.
    pub timestamp: i64,
    /// Vehicle kinematic state.
    pub car_state: CarState,
    /// Assist-system status and alert banner.
    pub controls_state: ControlsState,
    /// Nearby tracked objects.
    pub live_tracks: Vec<LiveTrack>,
    /// Source device health.
    pub device_state: DeviceState,
}

/// Vehicle kinematic state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarState {
    /// Current speed, m/s.
    pub v_ego: f64,
    /// Cruise set speed, m/s.
    pub v_cruise: f64,
    /// Gear selector position.
    pub gear_shifter: String,
    /// Any door open.
    pub door_open: bool,
    /// Driver seatbelt latched.
    pub seatbelt_latched: bool,
    /// Steering angle, degrees.
    pub steering_angle_deg: f64,
}

/// Assist-system enable/active flags and alert banner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlsState {
    /// Assist system engaged.
    pub enabled: bool,
    /// Cruise control active.
    pub active: bool,
    /// Alert banner text, empty when clear.
    pub alert_text: String,
    /// Alert banner severity.
    pub alert_status: AlertSeverity,
}

/// Alert banner severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    /// No alert or informational.
    Normal,
    /// Driver attention requested.
    Warning,
    /// Immediate action required.
    Critical,
}

/// One tracked nearby object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveTrack {
    /// Tracker-assigned object id.
    pub track_id: i32,
    /// Relative longitudinal distance, m.
    pub d_rel: f64,
    /// Relative lateral position, m.
    pub y_rel: f64,
    /// Relative speed, m/s.
    pub v_rel: f64,
}

/// Source device health.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceState {
    /// Battery charge, percent.
    pub battery_percent: i32,
    /// Device thermal zone.
    pub thermal_status: ThermalStatus,
}

/// Device thermal zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThermalStatus {
    /// Nominal.
    Green,
    /// Elevated.
    Yellow,
    /// Throttling imminent.
    Red,
}
