//! Serving cluster: a fixed set of physical air-handling slots.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::core::{AirRequest, SchedulerError, ServiceObserver};
use crate::util::serde::RoomId;

/// One physical unit slot.
#[derive(Debug)]
pub struct ServingInstance {
    index: usize,
    request: Option<AirRequest>,
    serving_since: Option<Instant>,
}

impl ServingInstance {
    const fn new(index: usize) -> Self {
        Self {
            index,
            request: None,
            serving_since: None,
        }
    }

    /// Slot index.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Request currently served, if any.
    #[must_use]
    pub const fn request(&self) -> Option<&AirRequest> {
        self.request.as_ref()
    }

    /// When the current request started being served.
    #[must_use]
    pub const fn serving_since(&self) -> Option<Instant> {
        self.serving_since
    }

    fn serve(&mut self, request: AirRequest, now: Instant) {
        self.request = Some(request);
        self.serving_since = Some(now);
    }

    fn vacate(&mut self) -> Option<AirRequest> {
        self.serving_since = None;
        self.request.take()
    }
}

/// Consistent read of cluster occupancy, indexed by slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSnapshot {
    /// Tier rank per slot; 0 for an empty slot.
    pub tier_per_slot: Vec<u8>,
    /// How long each slot has served its current request.
    pub elapsed: Vec<Option<Duration>>,
}

impl ClusterSnapshot {
    /// Lowest served tier and the first slot holding it.
    ///
    /// Returns `None` when every slot is empty.
    #[must_use]
    pub fn min_served(&self) -> Option<(usize, u8)> {
        self.tier_per_slot
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, tier)| tier > 0)
            // min_by_key keeps the first of equal keys
            .min_by_key(|&(_, tier)| tier)
    }
}

/// Fixed-size collection of serving slots.
///
/// `occupied` always equals the number of slots holding a request.
pub struct ServingCluster {
    instances: Vec<ServingInstance>,
    occupied: usize,
    observer: Arc<dyn ServiceObserver>,
}

impl ServingCluster {
    /// Create a cluster with `capacity` empty slots.
    #[must_use]
    pub fn new(capacity: usize, observer: Arc<dyn ServiceObserver>) -> Self {
        Self {
            instances: (0..capacity).map(ServingInstance::new).collect(),
            occupied: 0,
            observer,
        }
    }

    /// Number of slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.instances.len()
    }

    /// Number of occupied slots.
    #[must_use]
    pub const fn occupied(&self) -> usize {
        self.occupied
    }

    /// Whether a slot is free.
    #[must_use]
    pub fn can_admit(&self) -> bool {
        self.occupied < self.instances.len()
    }

    /// Slots in index order.
    pub fn instances(&self) -> impl Iterator<Item = &ServingInstance> {
        self.instances.iter()
    }

    /// Slot currently serving `room`.
    #[must_use]
    pub fn slot_of(&self, room: RoomId) -> Option<usize> {
        self.instances
            .iter()
            .position(|i| i.request.as_ref().is_some_and(|r| r.room() == room))
    }

    /// Request served in `slot`.
    #[must_use]
    pub fn request_at(&self, slot: usize) -> Option<&AirRequest> {
        self.instances.get(slot).and_then(ServingInstance::request)
    }

    /// Start serving a request in the first free slot.
    ///
    /// Stops the request's wait clock and notifies the observer.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::CapacityExceeded`] when every slot is occupied.
    pub fn assign(&mut self, mut request: AirRequest, now: Instant) -> Result<usize, SchedulerError> {
        let instance = self
            .instances
            .iter_mut()
            .find(|i| i.request.is_none())
            .ok_or(SchedulerError::CapacityExceeded)?;

        request.stop_waiting(now);
        let (room, speed) = (request.room(), request.speed());
        instance.serve(request, now);
        self.occupied += 1;

        tracing::debug!(room, speed, slot = instance.index, "assigned");
        self.observer.on_service_started(room, speed);
        Ok(instance.index)
    }

    /// Take a request out of its slot so it can wait again.
    ///
    /// The wait clock restarts at `now`; previously accumulated wait is kept.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::SlotVacant`] when the slot is empty or out of range.
    pub fn evict(&mut self, slot: usize, now: Instant) -> Result<AirRequest, SchedulerError> {
        let mut request = self
            .instances
            .get_mut(slot)
            .and_then(ServingInstance::vacate)
            .ok_or(SchedulerError::SlotVacant(slot))?;
        self.occupied -= 1;
        request.start_waiting(now);

        tracing::debug!(room = request.room(), slot, "evicted");
        self.observer.on_service_stopped(request.room());
        Ok(request)
    }

    /// Remove a served request for good; its wait accounting is untouched.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::NotFound`] when no slot serves `room`.
    pub fn finish_serving(&mut self, room: RoomId) -> Result<AirRequest, SchedulerError> {
        let slot = self.slot_of(room).ok_or(SchedulerError::NotFound(room))?;
        let request = self.instances[slot]
            .vacate()
            .ok_or(SchedulerError::SlotVacant(slot))?;
        self.occupied -= 1;

        tracing::debug!(room, slot, "finished serving");
        self.observer.on_service_stopped(room);
        Ok(request)
    }

    /// Swap the served request for `room` without interrupting airflow.
    ///
    /// The replacement inherits the wait accounting and service start time.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::NotFound`] when no slot serves `room`.
    pub fn replace_in_place(
        &mut self,
        room: RoomId,
        mut request: AirRequest,
    ) -> Result<AirRequest, SchedulerError> {
        let slot = self.slot_of(room).ok_or(SchedulerError::NotFound(room))?;
        let current = self.instances[slot]
            .request
            .as_mut()
            .ok_or(SchedulerError::SlotVacant(slot))?;
        request.carry_wait_from(current);
        Ok(std::mem::replace(current, request))
    }

    /// Per-slot tiers and service durations.
    #[must_use]
    pub fn snapshot(&self, now: Instant) -> ClusterSnapshot {
        let (tier_per_slot, elapsed): (Vec<u8>, Vec<Option<Duration>>) = self
            .instances
            .iter()
            .map(|i| match (&i.request, i.serving_since) {
                (Some(r), since) => (
                    r.tier().rank(),
                    since.map(|s| now.saturating_duration_since(s)),
                ),
                (None, _) => (0, None),
            })
            .unzip();
        ClusterSnapshot {
            tier_per_slot,
            elapsed,
        }
    }

    /// Rooms currently served.
    #[must_use]
    pub fn rooms_being_served(&self) -> BTreeSet<RoomId> {
        self.instances
            .iter()
            .filter_map(|i| i.request.as_ref().map(AirRequest::room))
            .collect()
    }
}
