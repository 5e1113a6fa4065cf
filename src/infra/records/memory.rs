//! In-memory room record store.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::core::{RecordStore, RoomRecord};
use crate::util::serde::RoomId;

/// Room records held in a map, for development and tests.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: RwLock<HashMap<RoomId, RoomRecord>>,
}

impl InMemoryRecordStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed rooms `1..=room_count` in their registered, powered-off default state.
    #[must_use]
    pub fn with_rooms(room_count: RoomId) -> Self {
        let store = Self::new();
        {
            let mut records = store.records.write();
            for room in 1..=room_count {
                records.insert(room, RoomRecord::default());
            }
        }
        store
    }

    /// Forget a room, e.g. on checkout.
    pub fn remove(&self, room: RoomId) -> Option<RoomRecord> {
        self.records.write().remove(&room)
    }

    /// Number of known rooms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether no room is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl RecordStore for InMemoryRecordStore {
    fn current(&self, room: RoomId) -> Option<RoomRecord> {
        self.records.read().get(&room).cloned()
    }

    fn store(&self, room: RoomId, record: RoomRecord) {
        self.records.write().insert(room, record);
    }
}
