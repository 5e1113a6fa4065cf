//! Air requests and their wait-time bookkeeping.

use std::time::{Duration, Instant};

use crate::util::serde::{RoomId, Tier};

/// One room's desired service plus wait-time bookkeeping.
///
/// Wait time is cumulative across every interval the request spends queued.
/// `waiting_since` is `Some` exactly while the request sits in a tier queue.
#[derive(Debug, Clone, PartialEq)]
pub struct AirRequest {
    room: RoomId,
    target_temperature: f64,
    tier: Tier,
    waited: Duration,
    waiting_since: Option<Instant>,
}

impl AirRequest {
    /// Create a request that has not waited yet.
    #[must_use]
    pub const fn new(room: RoomId, target_temperature: f64, tier: Tier) -> Self {
        Self {
            room,
            target_temperature,
            tier,
            waited: Duration::ZERO,
            waiting_since: None,
        }
    }

    /// Requesting room.
    #[must_use]
    pub const fn room(&self) -> RoomId {
        self.room
    }

    /// Requested target temperature.
    #[must_use]
    pub const fn target_temperature(&self) -> f64 {
        self.target_temperature
    }

    /// Priority tier.
    #[must_use]
    pub const fn tier(&self) -> Tier {
        self.tier
    }

    /// Fan speed delivered while served.
    #[must_use]
    pub const fn speed(&self) -> u8 {
        self.tier.speed()
    }

    /// Start of the current queued interval, if queued.
    #[must_use]
    pub const fn waiting_since(&self) -> Option<Instant> {
        self.waiting_since
    }

    /// Whether the wait clock is running.
    #[must_use]
    pub const fn is_waiting(&self) -> bool {
        self.waiting_since.is_some()
    }

    /// Wait folded in from completed queued intervals.
    #[must_use]
    pub const fn accumulated_wait(&self) -> Duration {
        self.waited
    }

    /// Total wait including the interval in progress.
    #[must_use]
    pub fn wait_time(&self, now: Instant) -> Duration {
        self.waited
            + self
                .waiting_since
                .map_or(Duration::ZERO, |since| now.saturating_duration_since(since))
    }

    /// Start the wait clock unless it is already running.
    pub fn start_waiting(&mut self, now: Instant) {
        if self.waiting_since.is_none() {
            self.waiting_since = Some(now);
        }
    }

    /// Stop the wait clock and fold the running interval into the total.
    pub fn stop_waiting(&mut self, now: Instant) {
        if let Some(since) = self.waiting_since.take() {
            self.waited += now.saturating_duration_since(since);
        }
    }

    /// Update the target values in place, keeping wait accounting.
    pub fn retarget(&mut self, target_temperature: f64, tier: Tier) {
        self.target_temperature = target_temperature;
        self.tier = tier;
    }

    /// Adopt another request's wait accounting, running clock included.
    pub(crate) fn carry_wait_from(&mut self, previous: &Self) {
        self.waited = previous.waited;
        self.waiting_since = previous.waiting_since;
    }
}
