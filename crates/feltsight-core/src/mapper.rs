//! Velocity-to-command mapping
//!
//! Turns one fingertip velocity sample into the speed/volume byte pair the
//! glove firmware understands. The mute decision is taken on the *raw*
//! magnitude so muting reacts instantly instead of trailing the filter lag.

use glam::Vec3;

use crate::filter::SignalConditioner;
use crate::frame::{MAX_SPEED_BYTE, MIN_SPEED_BYTE};
use crate::params::{ControlParameters, MIN_MULTIPLIER};

/// One mapped command: the byte pair carried by every frame channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandLevels {
    /// Playback speed, fixed-point x10 (10-40 = 1.0x-4.0x)
    pub speed_byte: u8,
    /// Playback volume (0-100, 0 = muted)
    pub volume_byte: u8,
}

impl CommandLevels {
    /// Effective playback rate encoded by the speed byte.
    pub fn playback_rate(&self) -> f32 {
        self.speed_byte as f32 / 10.0
    }

    /// True when the command mutes playback.
    pub fn is_muted(&self) -> bool {
        self.volume_byte == 0
    }
}

/// Maps conditioned velocity onto the device's speed/volume ranges.
///
/// Owns the [`SignalConditioner`] so callers hand in the raw sample and get
/// finished command bytes back.
#[derive(Debug, Default)]
pub struct CommandMapper {
    conditioner: SignalConditioner,
}

impl CommandMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map one raw velocity sample to command levels.
    pub fn map(&mut self, raw: Vec3, params: &ControlParameters) -> CommandLevels {
        let raw_magnitude = raw.length();

        let volume_byte = if raw_magnitude < params.mute_threshold {
            0
        } else {
            params.normal_volume
        };

        let filtered_magnitude = self.conditioner.condition(raw, params);

        let multiplier = params.multiplier.max(MIN_MULTIPLIER);
        let effective = filtered_magnitude * multiplier;

        let clamped = effective.clamp(
            params.min_velocity_threshold,
            params.max_velocity_threshold,
        );
        let t = inverse_lerp(
            params.min_velocity_threshold,
            params.max_velocity_threshold,
            clamped,
        );

        let speed = MIN_SPEED_BYTE as f32 + (MAX_SPEED_BYTE - MIN_SPEED_BYTE) as f32 * t;
        let speed_byte = speed.round() as u8;

        CommandLevels {
            speed_byte,
            volume_byte,
        }
    }

    /// Reset the held filter state.
    pub fn reset_filters(&mut self) {
        self.conditioner.reset();
    }

    /// Last filtered magnitude (diagnostics).
    pub fn filtered_magnitude(&self) -> f32 {
        self.conditioner.filtered_magnitude()
    }
}

/// Normalized position of `value` between `min` and `max`, clamped to [0, 1].
/// A degenerate range (min == max) maps to 0 rather than dividing by zero.
fn inverse_lerp(min: f32, max: f32, value: f32) -> f32 {
    if (max - min).abs() <= f32::EPSILON {
        return 0.0;
    }
    ((value - min) / (max - min)).clamp(0.0, 1.0)
}
