//! Transport abstraction for the short-range radio link
//!
//! The driver never talks to a BLE stack directly: it issues the few
//! imperative calls below and consumes [`TransportEvent`]s from a channel
//! the backend feeds. This keeps the state machine testable and the
//! platform backend swappable.

use tokio::sync::mpsc;
use uuid::{uuid, Uuid};

use crate::error::Result;

/// GATT service carrying the command and telemetry characteristics.
/// Must match the glove firmware exactly.
pub const COMMAND_SERVICE: Uuid = uuid!("6E400001-B5A3-F393-E0A9-E50E24DCCA9E");
/// Host-to-device command characteristic (write).
pub const WRITE_CHARACTERISTIC: Uuid = uuid!("6E400002-B5A3-F393-E0A9-E50E24DCCA9E");
/// Device-to-host telemetry characteristic (notify; payload not parsed here).
pub const NOTIFY_CHARACTERISTIC: Uuid = uuid!("6E400003-B5A3-F393-E0A9-E50E24DCCA9E");

/// A discovered peripheral.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peripheral {
    /// Backend-specific stable identifier (address or handle)
    pub id: String,
    /// Advertised name, empty if the advertisement carried none
    pub name: String,
}

/// GATT characteristic capability flags the driver cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacteristicProperty {
    Read,
    Write,
    WriteWithoutResponse,
    Notify,
}

/// Events emitted by a transport backend.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// The radio became usable
    PoweredOn,
    /// A peripheral advertisement was seen during a scan
    Discovered(Peripheral),
    /// A connection attempt completed
    Connected(Peripheral),
    /// A GATT service was enumerated on the connected peripheral
    ServiceDiscovered { service: Uuid },
    /// A characteristic was enumerated within a discovered service
    CharacteristicDiscovered {
        characteristic: Uuid,
        properties: Vec<CharacteristicProperty>,
    },
    /// Telemetry notification from the device
    Notification { characteristic: Uuid, payload: Vec<u8> },
}

/// Channel the backend emits events into.
pub type EventSender = mpsc::UnboundedSender<TransportEvent>;
/// Driver-side end of the event stream.
pub type EventReceiver = mpsc::UnboundedReceiver<TransportEvent>;

/// Create the event channel shared between a backend and the driver.
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Imperative side of a transport backend.
///
/// All calls are fire-and-forget: completion (or silence) arrives through
/// the event stream, and a failed periodic write is recoverable telemetry
/// accounted by the health counters, never a fatal condition.
pub trait Transport: Send + 'static {
    /// Begin scanning for peripherals.
    fn start_scan(&mut self) -> Result<()>;

    /// Stop an in-progress scan.
    fn stop_scan(&mut self) -> Result<()>;

    /// Initiate a connection; completion arrives as [`TransportEvent::Connected`].
    fn connect(&mut self, peripheral: &Peripheral) -> Result<()>;

    /// Enumerate services on the connected peripheral.
    fn discover_services(&mut self) -> Result<()>;

    /// Enumerate characteristics within a service.
    fn discover_characteristics(&mut self, service: Uuid) -> Result<()>;

    /// Arm notifications on a characteristic.
    fn subscribe(&mut self, characteristic: Uuid) -> Result<()>;

    /// Write a payload to a characteristic, without waiting for an ack.
    fn write(&mut self, characteristic: Uuid, payload: &[u8]) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addresses_match_firmware() {
        assert_eq!(
            COMMAND_SERVICE.to_string().to_uppercase(),
            "6E400001-B5A3-F393-E0A9-E50E24DCCA9E"
        );
        assert_eq!(
            WRITE_CHARACTERISTIC.to_string().to_uppercase(),
            "6E400002-B5A3-F393-E0A9-E50E24DCCA9E"
        );
        assert_eq!(
            NOTIFY_CHARACTERISTIC.to_string().to_uppercase(),
            "6E400003-B5A3-F393-E0A9-E50E24DCCA9E"
        );
    }
}
