//! Host-capability seams.

/// Reports whether a usable network transport is present.
///
/// `connect` fails fast with `NetworkUnavailable` when the monitor
/// reports no transport, before any socket work is attempted. The
/// default implementation asks the host's interface table; tests
/// substitute fixed answers.
pub trait NetworkMonitor: Send + Sync + 'static {
    /// Whether a usable transport (Wi-Fi/Ethernet) is currently up.
    fn is_available(&self) -> bool;
}

/// Monitor backed by the host's interface table: the network is
/// considered available when the host holds a routable local address.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemNetworkMonitor;

impl NetworkMonitor for SystemNetworkMonitor {
    fn is_available(&self) -> bool {
        local_ip_address::local_ip().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedMonitor(bool);

    impl NetworkMonitor for FixedMonitor {
        fn is_available(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn test_monitor_object_safety() {
        let online: Box<dyn NetworkMonitor> = Box::new(FixedMonitor(true));
        let offline: Box<dyn NetworkMonitor> = Box::new(FixedMonitor(false));

        assert!(online.is_available());
        assert!(!offline.is_available());
    }
}
