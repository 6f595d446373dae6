//! Published snapshot store.
//!
//! Exactly one [`SnapshotPublisher`] exists, owned by the sensor poller.
//! Any number of [`SnapshotReader`]s can be handed to connection handlers.
//! A publish swaps in a whole new `Arc<SensorSnapshot>`, so a reader sees
//! either the old or the new snapshot and never anything in between.

use std::sync::Arc;

use radarscope_core::SensorSnapshot;
use tokio::sync::watch;

#[derive(Debug, Clone)]
struct Published {
    generation: u64,
    snapshot: Arc<SensorSnapshot>,
}

/// Create a store holding an empty snapshot.
pub fn snapshot_store() -> (SnapshotPublisher, SnapshotReader) {
    let (tx, rx) = watch::channel(Published {
        generation: 0,
        snapshot: Arc::new(SensorSnapshot::empty()),
    });
    (SnapshotPublisher { tx }, SnapshotReader { rx })
}

/// The single writer. Deliberately not `Clone`.
#[derive(Debug)]
pub struct SnapshotPublisher {
    tx: watch::Sender<Published>,
}

impl SnapshotPublisher {
    /// Replace the visible snapshot.
    pub fn publish(&self, snapshot: SensorSnapshot) {
        let snapshot = Arc::new(snapshot);
        // send_modify also succeeds while no reader is attached
        self.tx.send_modify(|published| {
            published.generation += 1;
            published.snapshot = snapshot;
        });
    }

    /// Create another reader.
    pub fn subscribe(&self) -> SnapshotReader {
        SnapshotReader {
            rx: self.tx.subscribe(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SnapshotReader {
    rx: watch::Receiver<Published>,
}

impl SnapshotReader {
    /// The most recently published snapshot (empty if nothing was published yet).
    pub fn read(&self) -> Arc<SensorSnapshot> {
        self.rx.borrow().snapshot.clone()
    }

    /// Number of publishes so far.
    pub fn generation(&self) -> u64 {
        self.rx.borrow().generation
    }

    /// Treat the current snapshot as seen by [`SnapshotReader::next`].
    pub fn mark_seen(&mut self) {
        self.rx.borrow_and_update();
    }

    /// Wait for a snapshot this reader has not seen yet.
    ///
    /// Returns `None` once the publisher is gone.
    pub async fn next(&mut self) -> Option<Arc<SensorSnapshot>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().snapshot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radarscope_core::TargetReading;

    fn one_target() -> SensorSnapshot {
        SensorSnapshot::from_readings(&[TargetReading::new(4000, 12.34, 250)])
    }

    #[test]
    fn test_read_before_publish() {
        let (_publisher, reader) = snapshot_store();
        assert!(reader.read().is_empty());
        assert_eq!(reader.generation(), 0);
    }

    #[test]
    fn test_publish_replaces() {
        let (publisher, reader) = snapshot_store();
        let other = reader.clone();

        publisher.publish(one_target());
        assert_eq!(reader.read().len(), 1);
        assert_eq!(other.read().len(), 1);
        assert_eq!(reader.generation(), 1);

        publisher.publish(SensorSnapshot::empty());
        assert!(reader.read().is_empty());
        assert_eq!(publisher.subscribe().generation(), 2);
    }

    #[test]
    fn test_reader_keeps_old_snapshot() {
        let (publisher, reader) = snapshot_store();
        publisher.publish(one_target());
        let held = reader.read();
        publisher.publish(SensorSnapshot::empty());
        assert_eq!(held.len(), 1);
        assert!(reader.read().is_empty());
    }

    #[tokio::test]
    async fn test_next_waits_for_unseen() {
        let (publisher, mut reader) = snapshot_store();
        publisher.publish(one_target());
        reader.mark_seen();

        publisher.publish(SensorSnapshot::empty());
        let snapshot = reader.next().await.unwrap();
        assert!(snapshot.is_empty());

        drop(publisher);
        assert!(reader.next().await.is_none());
    }
}
