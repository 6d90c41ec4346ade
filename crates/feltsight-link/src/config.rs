//! Link configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Connection/transmission settings for one link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Comma-separated advertised names accepted during a scan
    pub device_names: String,
    /// Seconds between periodic command frames
    pub send_interval_secs: f32,
    /// Seconds granted to each reconnect attempt phase
    pub reconnect_interval_secs: f32,
    /// Reconnect attempt cap; 0 = unlimited
    pub max_reconnect_attempts: u32,
    /// Start a reconnect sequence automatically when the link degrades
    pub auto_reconnect: bool,
    /// Consecutive send failures required before the link counts as lost
    pub failure_threshold: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            device_names: "ESP32-BLE, FeltSight BLE".to_string(),
            send_interval_secs: 0.5,
            reconnect_interval_secs: 3.0,
            max_reconnect_attempts: 0,
            auto_reconnect: true,
            failure_threshold: 3,
        }
    }
}

impl LinkConfig {
    /// Parse the allow-list into trimmed names, dropping empty entries.
    pub fn target_names(&self) -> Vec<String> {
        self.device_names
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// True when `name` matches an allow-list entry exactly.
    pub fn matches_device(&self, name: &str) -> bool {
        self.device_names
            .split(',')
            .map(str::trim)
            .any(|target| !target.is_empty() && target == name)
    }

    /// Periodic send interval.
    pub fn send_interval(&self) -> Duration {
        Duration::from_secs_f32(self.send_interval_secs.max(0.01))
    }

    /// Bounded wait used by each reconnect phase.
    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_secs_f32(self.reconnect_interval_secs.max(0.1))
    }

    /// Failure threshold, at least 1.
    pub fn failure_threshold(&self) -> u32 {
        self.failure_threshold.max(1)
    }
}
