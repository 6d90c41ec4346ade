//! FeltSight Core - Velocity Signal Path
//!
//! Pure signal and codec logic for the haptic glove telemetry link:
//! - [`filter`] - cascaded low-pass conditioning of the velocity sample
//! - [`mapper`] - velocity to speed/volume command mapping
//! - [`frame`] - the fixed 32-byte command frame codec
//! - [`params`] - user-tunable control parameters
//!
//! Everything here is synchronous and I/O-free; the connection lifecycle
//! lives in `feltsight-link`.

/// Low-pass velocity filtering
pub mod filter;
/// Command frame encoding/decoding
pub mod frame;
/// Velocity to command mapping
pub mod mapper;
/// Control parameters
pub mod params;

// Re-exports
pub use filter::{ScalarFilter, SignalConditioner, VectorFilter};
pub use frame::{Channel, FrameError, FRAME_LEN, MAX_SPEED_BYTE, MIN_SPEED_BYTE};
pub use mapper::{CommandLevels, CommandMapper};
pub use params::ControlParameters;
