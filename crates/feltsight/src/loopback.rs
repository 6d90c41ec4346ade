//! Loopback transport for bench runs without glove hardware
//!
//! Plays the discovery script a real radio backend would produce and
//! hex-logs every frame written to the command characteristic, so the full
//! link path can be exercised end to end on a desk.

use feltsight_core::frame;
use feltsight_link::{
    CharacteristicProperty, EventSender, Peripheral, Result, Transport, TransportEvent,
    COMMAND_SERVICE, NOTIFY_CHARACTERISTIC, WRITE_CHARACTERISTIC,
};
use tracing::{debug, info, warn};

/// Simulated glove peripheral.
fn sim_peripheral() -> Peripheral {
    Peripheral {
        id: "SIM:00:00:00:00:01".to_string(),
        name: "FeltSight BLE".to_string(),
    }
}

/// Transport backend that answers every step of the lifecycle locally.
pub struct LoopbackTransport {
    events: EventSender,
    frames_written: u64,
}

impl LoopbackTransport {
    /// Create the backend and report the radio as immediately usable.
    pub fn new(events: EventSender) -> Self {
        let _ = events.send(TransportEvent::PoweredOn);
        Self {
            events,
            frames_written: 0,
        }
    }

    fn emit(&self, event: TransportEvent) {
        let _ = self.events.send(event);
    }
}

impl Transport for LoopbackTransport {
    fn start_scan(&mut self) -> Result<()> {
        debug!("[loopback] scan started");
        self.emit(TransportEvent::Discovered(sim_peripheral()));
        Ok(())
    }

    fn stop_scan(&mut self) -> Result<()> {
        debug!("[loopback] scan stopped");
        Ok(())
    }

    fn connect(&mut self, peripheral: &Peripheral) -> Result<()> {
        debug!("[loopback] connecting to {}", peripheral.name);
        self.emit(TransportEvent::Connected(peripheral.clone()));
        Ok(())
    }

    fn discover_services(&mut self) -> Result<()> {
        self.emit(TransportEvent::ServiceDiscovered {
            service: COMMAND_SERVICE,
        });
        Ok(())
    }

    fn discover_characteristics(&mut self, _service: uuid::Uuid) -> Result<()> {
        self.emit(TransportEvent::CharacteristicDiscovered {
            characteristic: WRITE_CHARACTERISTIC,
            properties: vec![
                CharacteristicProperty::Write,
                CharacteristicProperty::WriteWithoutResponse,
            ],
        });
        self.emit(TransportEvent::CharacteristicDiscovered {
            characteristic: NOTIFY_CHARACTERISTIC,
            properties: vec![CharacteristicProperty::Notify],
        });
        Ok(())
    }

    fn subscribe(&mut self, characteristic: uuid::Uuid) -> Result<()> {
        debug!("[loopback] notifications armed on {}", characteristic);
        Ok(())
    }

    fn write(&mut self, _characteristic: uuid::Uuid, payload: &[u8]) -> Result<()> {
        self.frames_written += 1;
        info!("[loopback] frame {}: {}", self.frames_written, hex::encode_upper(payload));

        match frame::decode(payload) {
            Ok(channels) => {
                let lead = channels[0];
                info!(
                    "[loopback]   file {} volume {}% speed {:.1}x on {} channels",
                    lead.file_index,
                    lead.volume,
                    lead.speed as f32 / 10.0,
                    channels.len()
                );
            }
            Err(e) => warn!("[loopback] malformed frame: {}", e),
        }
        Ok(())
    }
}
