//! Control surface consumed by the UI/configuration layer

use tokio::sync::{mpsc, watch};

use crate::error::{LinkError, Result};

/// Commands accepted by the link driver.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkCommand {
    /// Set the velocity multiplier; triggers an out-of-band send when ready
    SetMultiplier(f32),
    /// Set the min/max velocity mapping thresholds
    SetVelocityThresholds { min: f32, max: f32 },
    /// Set the raw-magnitude mute threshold
    SetMuteThreshold(f32),
    /// Set the un-muted volume level (0-100)
    SetNormalVolume(u8),
    /// Enable/disable the vector filter stage
    SetVectorFilterEnabled(bool),
    /// Enable/disable the magnitude filter stage
    SetMagnitudeFilterEnabled(bool),
    /// Set both filter strengths; triggers an out-of-band send when ready
    SetFilterStrength(f32),
    /// Consecutive failures required before the link counts as lost
    SetFailureThreshold(u32),
    /// Enable/disable automatic reconnection
    SetAutoReconnect(bool),
    /// Clear held filter state
    ResetFilters,
    /// Force reconnect semantics immediately, from any state
    Reconnect,
    /// Single immediate send, guarded by the usual readiness checks
    SendNow,
    /// Halt the scheduler and any reconnect sequence, release the transport
    Stop,
}

/// Clonable handle to a running link driver.
#[derive(Debug, Clone)]
pub struct LinkHandle {
    commands: mpsc::UnboundedSender<LinkCommand>,
    status: watch::Receiver<String>,
}

impl LinkHandle {
    pub(crate) fn new(
        commands: mpsc::UnboundedSender<LinkCommand>,
        status: watch::Receiver<String>,
    ) -> Self {
        Self { commands, status }
    }

    /// Send a command to the driver task.
    pub fn send(&self, command: LinkCommand) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| LinkError::DriverStopped)
    }

    pub fn set_multiplier(&self, multiplier: f32) -> Result<()> {
        self.send(LinkCommand::SetMultiplier(multiplier))
    }

    pub fn set_velocity_thresholds(&self, min: f32, max: f32) -> Result<()> {
        self.send(LinkCommand::SetVelocityThresholds { min, max })
    }

    pub fn set_mute_threshold(&self, threshold: f32) -> Result<()> {
        self.send(LinkCommand::SetMuteThreshold(threshold))
    }

    pub fn set_normal_volume(&self, volume: u8) -> Result<()> {
        self.send(LinkCommand::SetNormalVolume(volume))
    }

    pub fn set_vector_filter_enabled(&self, enabled: bool) -> Result<()> {
        self.send(LinkCommand::SetVectorFilterEnabled(enabled))
    }

    pub fn set_magnitude_filter_enabled(&self, enabled: bool) -> Result<()> {
        self.send(LinkCommand::SetMagnitudeFilterEnabled(enabled))
    }

    pub fn set_filter_strength(&self, strength: f32) -> Result<()> {
        self.send(LinkCommand::SetFilterStrength(strength))
    }

    pub fn set_failure_threshold(&self, threshold: u32) -> Result<()> {
        self.send(LinkCommand::SetFailureThreshold(threshold))
    }

    pub fn set_auto_reconnect(&self, enabled: bool) -> Result<()> {
        self.send(LinkCommand::SetAutoReconnect(enabled))
    }

    pub fn reset_filters(&self) -> Result<()> {
        self.send(LinkCommand::ResetFilters)
    }

    /// Force a reconnect now, superseding any in-flight sequence.
    pub fn reconnect(&self) -> Result<()> {
        self.send(LinkCommand::Reconnect)
    }

    /// Trigger a single immediate send.
    pub fn send_now(&self) -> Result<()> {
        self.send(LinkCommand::SendNow)
    }

    /// Stop the driver.
    pub fn stop(&self) -> Result<()> {
        self.send(LinkCommand::Stop)
    }

    /// Current human-readable connection status.
    pub fn status(&self) -> String {
        self.status.borrow().clone()
    }

    /// Watch receiver for status changes (UI binding, tests).
    pub fn status_watch(&self) -> watch::Receiver<String> {
        self.status.clone()
    }
}
