//! API-facing request/response models.
//!
//! The HTTP layer lives elsewhere; these types fix the boundary it talks to
//! and the legacy status codes it reports.

use serde::{Deserialize, Serialize};

use crate::core::SchedulerError;
use crate::runtime::SchedulerService;
use crate::util::serde::{RoomId, RoomStatus};

/// Success.
pub const STATUS_OK: u16 = 200;
/// Service not running.
pub const STATUS_UNAVAILABLE: u16 = 400;
/// Malformed arguments (status or speed).
pub const STATUS_INVALID_ARGUMENTS: u16 = 410;
/// Room number out of range.
pub const STATUS_INVALID_ROOM: u16 = 411;

/// Controller update as received from a room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSubmission {
    /// Room number.
    pub room: RoomId,
    /// Declared status: `on`, `off` or `hibernate`.
    pub status: String,
    /// Requested target temperature.
    pub target_temperature: f64,
    /// Requested fan speed.
    pub target_speed: u8,
}

/// Reply to an update: status code, text, and the room's current airflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResponse {
    /// Legacy status code.
    pub status: u16,
    /// Human-readable status.
    pub info: String,
    /// Fan speed the room currently receives.
    pub speed: u8,
}

/// Health response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Health {
    /// Healthy flag.
    pub ok: bool,
    /// Occupied slots.
    pub serving: usize,
    /// Waiting requests.
    pub queued: usize,
}

/// Map an error to its legacy status code.
#[must_use]
pub const fn status_code(err: &SchedulerError) -> u16 {
    match err {
        SchedulerError::InvalidRoom(_) | SchedulerError::NotFound(_) => STATUS_INVALID_ROOM,
        SchedulerError::InvalidPriority(_) | SchedulerError::InvalidStatus(_) => {
            STATUS_INVALID_ARGUMENTS
        }
        SchedulerError::ShutDown
        | SchedulerError::Timeout
        | SchedulerError::CapacityExceeded
        | SchedulerError::SlotVacant(_)
        | SchedulerError::InvalidConfig(_)
        | SchedulerError::Backend(_) => STATUS_UNAVAILABLE,
    }
}

/// Submit an update and build the reply.
///
/// The reported speed is what the room receives right now; the update takes
/// effect on the scheduler's next pass.
pub fn submit(service: &SchedulerService, req: &EventSubmission) -> UpdateResponse {
    let result = req
        .status
        .parse::<RoomStatus>()
        .and_then(|status| {
            service.submit_event(req.room, status, req.target_temperature, req.target_speed)
        });
    match result {
        Ok(()) => UpdateResponse {
            status: STATUS_OK,
            info: "OK".into(),
            speed: service.current_speed(req.room),
        },
        Err(e) => UpdateResponse {
            status: status_code(&e),
            info: e.to_string(),
            speed: 0,
        },
    }
}

/// Return a health payload.
#[must_use]
pub fn health(service: &SchedulerService) -> Health {
    let snapshot = service.snapshot();
    Health {
        ok: service.is_running(),
        serving: snapshot.served_rooms().len(),
        queued: snapshot.queued(),
    }
}
