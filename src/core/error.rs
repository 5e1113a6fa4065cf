//! Error types for scheduler operations.

use thiserror::Error;

use crate::util::serde::RoomId;

/// Errors produced by scheduler components.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    /// Target speed does not map to a tier.
    #[error("invalid priority: target speed {0} is not one of 1, 2, 3")]
    InvalidPriority(u8),
    /// Room is neither queued nor served.
    #[error("room {0} not found")]
    NotFound(RoomId),
    /// Declared status string is not recognized.
    #[error("invalid status: {0}")]
    InvalidStatus(String),
    /// Room number outside the configured range.
    #[error("invalid room number: {0}")]
    InvalidRoom(RoomId),
    /// No free serving slot.
    #[error("capacity exceeded")]
    CapacityExceeded,
    /// Slot expected to hold a request is empty.
    #[error("slot {0} is vacant")]
    SlotVacant(usize),
    /// Scheduler no longer accepts events.
    #[error("scheduler shut down")]
    ShutDown,
    /// Waiting on the scheduler exceeded its deadline.
    #[error("timed out waiting for scheduler")]
    Timeout,
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Backend-specific failure with context.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
