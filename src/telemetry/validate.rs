//! Payload validation policy.
//!
//! Applied to every decoded payload before it is published. The
//! timestamp freshness check is advisory: clock skew across devices is
//! expected, so a stale timestamp is logged and tolerated. The speed
//! range check is binding: an implausible speed rejects the payload -
//! and only the payload; the session is unaffected.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::warn;

use super::model::TelemetrySnapshot;
use crate::core::{PayloadError, SPEED_CEILING, SPEED_FLOOR, TIMESTAMP_TOLERANCE};

/// Validate a decoded snapshot against the local wall clock.
pub fn validate(snapshot: &TelemetrySnapshot) -> Result<(), PayloadError> {
    validate_at(snapshot, unix_time_millis())
}

/// Validate against an explicit reference clock (Unix milliseconds).
pub fn validate_at(snapshot: &TelemetrySnapshot, now_millis: i64) -> Result<(), PayloadError> {
    let skew = (snapshot.timestamp - now_millis).unsigned_abs();
    if skew > TIMESTAMP_TOLERANCE.as_millis() as u64 {
        warn!(skew_millis = skew, "telemetry timestamp outside tolerance");
    }

    let v_ego = snapshot.car_state.v_ego;
    if !(SPEED_FLOOR..=SPEED_CEILING).contains(&v_ego) {
        return Err(PayloadError::SpeedOutOfRange { v_ego });
    }

    Ok(())
}

/// Current wall-clock time in Unix milliseconds.
fn unix_time_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
