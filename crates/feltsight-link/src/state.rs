//! Connection lifecycle states

use std::fmt;

/// Lifecycle phase of one link session.
///
/// `Degraded` and `Reconnecting` always have a path back to `Ready`; when a
/// reconnect-attempt cap is configured and exhausted the machine parks in
/// `Degraded` until a manual reconnect arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Waiting for the radio
    Idle,
    /// Scanning for a peripheral on the allow-list
    Scanning,
    /// Connection initiated, waiting for the connected callback
    Connecting,
    /// Connected, enumerating the command service/characteristics
    ServiceDiscovery,
    /// Write characteristic bound; periodic transmission running
    Ready,
    /// Link presumed lost (timeout + consecutive failures)
    Degraded,
    /// Reconnect sequence in progress
    Reconnecting,
}

impl LinkState {
    /// True while the periodic sender is allowed to run.
    pub fn can_transmit(&self) -> bool {
        *self == LinkState::Ready
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LinkState::Idle => "Not Connected",
            LinkState::Scanning => "Scanning Devices...",
            LinkState::Connecting => "Connecting...",
            LinkState::ServiceDiscovery => "Discovering Services...",
            LinkState::Ready => "Connected and Ready",
            LinkState::Degraded => "Connection Lost",
            LinkState::Reconnecting => "Reconnecting...",
        };
        f.write_str(label)
    }
}
