//! User-tunable control parameters for the velocity-to-command mapping

use serde::{Deserialize, Serialize};

use crate::filter::{MAX_FILTER_STRENGTH, MIN_FILTER_STRENGTH};

/// Multiplier clamp range
pub const MIN_MULTIPLIER: f32 = 0.1;
pub const MAX_MULTIPLIER: f32 = 10.0;

/// Parameters read by the command mapper every tick.
///
/// One instance per link. Mutation goes through the setters, which clamp to
/// the valid ranges; out-of-range values loaded from a config file are
/// clamped the same way by [`sanitize`](ControlParameters::sanitize).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlParameters {
    /// User velocity multiplier applied to the filtered magnitude
    pub multiplier: f32,
    /// Lower end of the velocity-to-speed mapping (m/s)
    pub min_velocity_threshold: f32,
    /// Upper end of the velocity-to-speed mapping (m/s)
    pub max_velocity_threshold: f32,
    /// Raw magnitude below this mutes the output (m/s)
    pub mute_threshold: f32,
    /// Volume byte sent while not muted (0-100)
    pub normal_volume: u8,
    /// Smooth the raw velocity vector before taking its magnitude
    pub vector_filter_enabled: bool,
    /// Smoothing coefficient for the vector stage
    pub vector_filter_strength: f32,
    /// Smooth the scalar magnitude after the vector stage
    pub magnitude_filter_enabled: bool,
    /// Smoothing coefficient for the magnitude stage
    pub magnitude_filter_strength: f32,
}

impl Default for ControlParameters {
    fn default() -> Self {
        Self {
            multiplier: 1.0,
            min_velocity_threshold: 0.0,
            max_velocity_threshold: 0.3,
            mute_threshold: 0.015,
            normal_volume: 75,
            vector_filter_enabled: true,
            vector_filter_strength: 0.1,
            magnitude_filter_enabled: true,
            magnitude_filter_strength: 0.15,
        }
    }
}

impl ControlParameters {
    /// Set the velocity multiplier, clamped to [0.1, 10.0].
    pub fn set_multiplier(&mut self, multiplier: f32) {
        self.multiplier = multiplier.clamp(MIN_MULTIPLIER, MAX_MULTIPLIER);
        tracing::debug!("Velocity multiplier set to {:.1}", self.multiplier);
    }

    /// Set the min/max velocity mapping thresholds. Values are ordered if
    /// given reversed; equality is tolerated here and guarded in the mapper.
    pub fn set_velocity_thresholds(&mut self, min: f32, max: f32) {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        self.min_velocity_threshold = min.max(0.0);
        self.max_velocity_threshold = max.max(0.0);
        tracing::debug!(
            "Velocity thresholds set to {:.3}..{:.3} m/s",
            self.min_velocity_threshold,
            self.max_velocity_threshold
        );
    }

    /// Set the mute threshold (m/s, non-negative).
    pub fn set_mute_threshold(&mut self, threshold: f32) {
        self.mute_threshold = threshold.max(0.0);
        tracing::debug!("Mute threshold set to {:.3} m/s", self.mute_threshold);
    }

    /// Set the un-muted volume level (0-100).
    pub fn set_normal_volume(&mut self, volume: u8) {
        self.normal_volume = volume.min(100);
        tracing::debug!("Normal volume set to {}%", self.normal_volume);
    }

    /// Set both filter strengths at once, clamped to [0.01, 1.0].
    ///
    /// The UI exposes a single strength slider; the two stages track it
    /// together.
    pub fn set_filter_strength(&mut self, strength: f32) {
        let strength = strength.clamp(MIN_FILTER_STRENGTH, MAX_FILTER_STRENGTH);
        self.vector_filter_strength = strength;
        self.magnitude_filter_strength = strength;
        tracing::debug!("Filter strength set to {:.2}", strength);
    }

    /// Enable or disable the vector filter stage.
    pub fn set_vector_filter_enabled(&mut self, enabled: bool) {
        self.vector_filter_enabled = enabled;
        tracing::debug!(
            "Velocity filter {}",
            if enabled { "enabled" } else { "disabled" }
        );
    }

    /// Enable or disable the magnitude filter stage.
    pub fn set_magnitude_filter_enabled(&mut self, enabled: bool) {
        self.magnitude_filter_enabled = enabled;
        tracing::debug!(
            "Magnitude filter {}",
            if enabled { "enabled" } else { "disabled" }
        );
    }

    /// Clamp every field into its valid range. Applied after deserializing
    /// externally supplied configuration.
    pub fn sanitize(&mut self) {
        self.set_multiplier(self.multiplier);
        self.set_velocity_thresholds(self.min_velocity_threshold, self.max_velocity_threshold);
        self.set_mute_threshold(self.mute_threshold);
        self.set_normal_volume(self.normal_volume);
        self.vector_filter_strength = self
            .vector_filter_strength
            .clamp(MIN_FILTER_STRENGTH, MAX_FILTER_STRENGTH);
        self.magnitude_filter_strength = self
            .magnitude_filter_strength
            .clamp(MIN_FILTER_STRENGTH, MAX_FILTER_STRENGTH);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = ControlParameters::default();
        assert_eq!(params.multiplier, 1.0);
        assert_eq!(params.max_velocity_threshold, 0.3);
        assert_eq!(params.mute_threshold, 0.015);
        assert_eq!(params.normal_volume, 75);
        assert!(params.vector_filter_enabled);
        assert!(params.magnitude_filter_enabled);
    }

    #[test]
    fn test_multiplier_clamped() {
        let mut params = ControlParameters::default();
        params.set_multiplier(0.0);
        assert_eq!(params.multiplier, MIN_MULTIPLIER);
        params.set_multiplier(50.0);
        assert_eq!(params.multiplier, MAX_MULTIPLIER);
    }

    #[test]
    fn test_reversed_thresholds_reordered() {
        let mut params = ControlParameters::default();
        params.set_velocity_thresholds(0.5, 0.1);
        assert_eq!(params.min_velocity_threshold, 0.1);
        assert_eq!(params.max_velocity_threshold, 0.5);
    }

    #[test]
    fn test_volume_clamped() {
        let mut params = ControlParameters::default();
        params.set_normal_volume(250);
        assert_eq!(params.normal_volume, 100);
    }

    #[test]
    fn test_filter_strength_syncs_both_stages() {
        let mut params = ControlParameters::default();
        params.set_filter_strength(0.5);
        assert_eq!(params.vector_filter_strength, 0.5);
        assert_eq!(params.magnitude_filter_strength, 0.5);
        params.set_filter_strength(0.001);
        assert_eq!(params.vector_filter_strength, MIN_FILTER_STRENGTH);
    }

    #[test]
    fn test_serde_round_trip() {
        let mut params = ControlParameters::default();
        params.set_multiplier(2.5);
        let json = serde_json::to_string(&params).expect("Failed to serialize parameters");
        let restored: ControlParameters =
            serde_json::from_str(&json).expect("Failed to deserialize parameters");
        assert_eq!(params, restored);
    }

    #[test]
    fn test_sanitize_clamps_loaded_values() {
        let json = r#"{"multiplier": 99.0, "normal_volume": 100, "vector_filter_strength": 5.0}"#;
        let mut params: ControlParameters = serde_json::from_str(json).unwrap();
        params.sanitize();
        assert_eq!(params.multiplier, MAX_MULTIPLIER);
        assert_eq!(params.vector_filter_strength, MAX_FILTER_STRENGTH);
    }
}
