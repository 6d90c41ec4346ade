//! Latest-value velocity source
//!
//! The hand-tracking provider runs on its own cadence; the link only ever
//! wants the most recent sample at each send tick, so the handoff is a
//! watch channel rather than a queue.

use glam::Vec3;
use tokio::sync::watch;

/// Pull-style source of the most recent fingertip velocity.
pub trait VelocitySource: Send + 'static {
    /// Latest sample, or `None` while hand tracking has no pose.
    fn latest(&self) -> Option<Vec3>;
}

/// Reader half of a shared velocity slot.
#[derive(Debug, Clone)]
pub struct SharedVelocity {
    rx: watch::Receiver<Option<Vec3>>,
}

impl VelocitySource for SharedVelocity {
    fn latest(&self) -> Option<Vec3> {
        *self.rx.borrow()
    }
}

/// Writer half owned by the hand-tracking integration.
#[derive(Debug, Clone)]
pub struct VelocityPublisher {
    tx: watch::Sender<Option<Vec3>>,
}

impl VelocityPublisher {
    /// Publish a new sample, replacing whatever was there.
    pub fn publish(&self, velocity: Vec3) {
        let _ = self.tx.send(Some(velocity));
    }

    /// Mark the pose as lost; readers see `None` until the next publish.
    pub fn clear(&self) {
        let _ = self.tx.send(None);
    }
}

/// Create a connected publisher/reader pair, initially empty.
pub fn shared_velocity() -> (VelocityPublisher, SharedVelocity) {
    let (tx, rx) = watch::channel(None);
    (VelocityPublisher { tx }, SharedVelocity { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_empty() {
        let (_publisher, source) = shared_velocity();
        assert_eq!(source.latest(), None);
    }

    #[test]
    fn test_reader_sees_latest_publish() {
        let (publisher, source) = shared_velocity();
        publisher.publish(Vec3::new(0.1, 0.0, 0.0));
        publisher.publish(Vec3::new(0.2, 0.0, 0.0));
        assert_eq!(source.latest(), Some(Vec3::new(0.2, 0.0, 0.0)));
    }

    #[test]
    fn test_clear_drops_sample() {
        let (publisher, source) = shared_velocity();
        publisher.publish(Vec3::ONE);
        publisher.clear();
        assert_eq!(source.latest(), None);
    }
}
