//! Per-room sequencer
//!
//! Held across persist and broadcast so every subscriber observes a room's
//! events in the order they were accepted. Separate from the directory's
//! membership locks, which are taken inside service calls.

use std::sync::Arc;

use dashmap::DashMap;
use room_core::Snowflake;
use tokio::sync::{Mutex, OwnedMutexGuard};

type SequencerLocks = DashMap<Snowflake, Arc<Mutex<()>>>;

#[derive(Default)]
pub struct RoomSequencer {
    locks: SequencerLocks,
}

impl RoomSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for the room's turn; the turn ends when the guard drops
    pub async fn acquire(&self, room_id: Snowflake) -> RoomTurn<'_> {
        let lock = self.locks.entry(room_id).or_default().clone();
        RoomTurn {
            locks: &self.locks,
            room_id,
            guard: Some(lock.lock_owned().await),
        }
    }

    /// Rooms with a turn held or awaited
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// One room's turn; the last turn to end removes the room's entry
pub struct RoomTurn<'a> {
    locks: &'a SequencerLocks,
    room_id: Snowflake,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for RoomTurn<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.locks
            .remove_if(&self.room_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}

impl std::fmt::Debug for RoomSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomSequencer")
            .field("rooms", &self.locks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_same_room_is_serialized() {
        let sequencer = Arc::new(RoomSequencer::new());
        let order = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let room = Snowflake::new(1);

        let first = sequencer.acquire(room).await;

        let task = {
            let sequencer = sequencer.clone();
            let order = order.clone();
            tokio::spawn(async move {
                let _guard = sequencer.acquire(room).await;
                order.lock().push("second");
            })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        order.lock().push("first");
        drop(first);
        task.await.unwrap();

        assert_eq!(*order.lock(), vec!["first", "second"]);
        assert!(sequencer.is_empty());
    }

    #[tokio::test]
    async fn test_rooms_do_not_contend() {
        let sequencer = RoomSequencer::new();
        let a = sequencer.acquire(Snowflake::new(1)).await;
        let b = sequencer.acquire(Snowflake::new(2)).await;
        assert_eq!(sequencer.len(), 2);

        drop(a);
        assert_eq!(sequencer.len(), 1);
        drop(b);
        assert!(sequencer.is_empty());
    }
}
