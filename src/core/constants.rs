//! Protocol constants for the CarrotLink wire format.
//!
//! The wire values are fixed by the telemetry source and MUST NOT be
//! changed; the defaults are the stock configuration and may be
//! overridden per connection.

use std::time::Duration;

// =============================================================================
// WIRE FORMAT
// =============================================================================

/// Size of the frame length prefix (unsigned big-endian).
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Maximum frame payload size. A length prefix outside `(0, 10 MiB]`
/// is a protocol violation that abandons the connection.
pub const MAX_FRAME_SIZE: usize = 10 * 1024 * 1024;

/// Message type the server sends to open the handshake.
pub const MSG_TYPE_AUTH_REQUIRED: &str = "auth_required";

/// Message type the server sends to accept the handshake.
pub const MSG_TYPE_AUTH_SUCCESS: &str = "auth_success";

// =============================================================================
// CONNECTION DEFAULTS
// =============================================================================

/// Port the telemetry source listens on.
pub const DEFAULT_PORT: u16 = 8090;

/// Stock shared auth token; the handshake sends `<token>_<challenge>`.
pub const DEFAULT_AUTH_TOKEN: &str = "carrotview2024";

/// Reconnect delay once the fast-recovery tier is exhausted.
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_millis(2000);

/// Socket connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(3000);

/// Per-read timeout in the receive loop.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(10000);

// =============================================================================
// RECONNECT POLICY
// =============================================================================

/// Delay used by the fast-recovery tier after a drop.
pub const FAST_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Number of consecutive failures retried at [`FAST_RETRY_DELAY`]
/// before falling back to the configured reconnect interval.
pub const FAST_RETRY_ATTEMPTS: u32 = 3;

// =============================================================================
// DISCOVERY
// =============================================================================

/// Per-probe timeout (socket connect and first bytes, each).
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(800);

/// Host suffixes probed first within a subnet, most likely first:
/// gateway/hotspot, common static, some routers, last address, second.
pub const PRIORITY_HOST_SUFFIXES: [u8; 5] = [1, 100, 10, 254, 2];

/// Common private subnets swept when the local subnet yields nothing.
/// Hotspot-style ranges first.
pub const FALLBACK_SUBNETS: [&str; 7] = [
    "192.168.43",
    "192.168.1",
    "192.168.0",
    "10.0.0",
    "10.0.1",
    "172.16.0",
    "192.168.100",
];

// =============================================================================
// PAYLOAD VALIDATION
// =============================================================================

/// Lowest plausible vehicle speed, m/s.
pub const SPEED_FLOOR: f64 = -1.0;

/// Highest plausible vehicle speed, m/s.
pub const SPEED_CEILING: f64 = 200.0;

/// Tolerated skew between a payload timestamp and the local wall
/// clock. Exceeding it is logged but does not reject the payload.
pub const TIMESTAMP_TOLERANCE: Duration = Duration::from_secs(300);

// =============================================================================
// INTERNAL SIZING
// =============================================================================

/// Capacity of the session event channel between a session's receive
/// loop and its owner.
pub const SESSION_EVENT_BUFFER: usize = 32;
