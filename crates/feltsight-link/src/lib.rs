//! FeltSight Link - Glove Telemetry Connection
//!
//! Connection lifecycle and periodic transmission for the haptic glove:
//! - [`transport`] - narrow transport trait + event stream
//! - [`state`] - connection lifecycle states
//! - [`driver`] - state machine and transmission scheduler task
//! - [`health`] - link-lost inference from failure counters
//! - [`command`] - control surface for the UI/config layer
//! - [`velocity`] - latest-value velocity handoff
//! - [`config`] - link settings
//!
//! The signal path itself (filtering, mapping, frame codec) lives in
//! `feltsight-core`.

/// Control surface
pub mod command;
/// Link settings
pub mod config;
/// Driver task
pub mod driver;
/// Error types
pub mod error;
/// Health accounting
pub mod health;
/// Lifecycle states
pub mod state;
/// Transport abstraction
pub mod transport;
/// Velocity handoff
pub mod velocity;

// Re-exports
pub use command::{LinkCommand, LinkHandle};
pub use config::LinkConfig;
pub use driver::LinkDriver;
pub use error::{LinkError, Result};
pub use health::HealthCounters;
pub use state::LinkState;
pub use transport::{
    event_channel, CharacteristicProperty, EventReceiver, EventSender, Peripheral, Transport,
    TransportEvent, COMMAND_SERVICE, NOTIFY_CHARACTERISTIC, WRITE_CHARACTERISTIC,
};
pub use velocity::{shared_velocity, SharedVelocity, VelocityPublisher, VelocitySource};
