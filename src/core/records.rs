//! Read-through access to each room's last recorded controller state.

use serde::{Deserialize, Serialize};

use crate::util::serde::{RoomId, RoomStatus};

/// Last known controller state of a room.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoomRecord {
    /// Declared power status.
    pub status: RoomStatus,
    /// Requested target temperature.
    pub target_temperature: f64,
    /// Requested fan speed.
    pub target_speed: u8,
}

impl RoomRecord {
    /// Build a record.
    #[must_use]
    pub const fn new(status: RoomStatus, target_temperature: f64, target_speed: u8) -> Self {
        Self {
            status,
            target_temperature,
            target_speed,
        }
    }

    /// Whether the target values differ from another record's.
    #[must_use]
    pub fn targets_differ(&self, other: &Self) -> bool {
        self.target_speed != other.target_speed
            || self.target_temperature.to_bits() != other.target_temperature.to_bits()
    }
}

/// Store of room records, owned by the persistence layer.
///
/// Lookups must not block on I/O; implementations cache or serve from memory.
pub trait RecordStore: Send + Sync {
    /// Current record of a room; `None` for a room never seen.
    fn current(&self, room: RoomId) -> Option<RoomRecord>;
    /// Replace a room's record.
    fn store(&self, room: RoomId, record: RoomRecord);
}
