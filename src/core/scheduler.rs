//! Priority scheduler: event classification and the admission/preemption pass.
//!
//! The [`Scheduler`] owns the tier queues and the serving cluster and is only
//! ever driven from one thread, so none of its state is locked. Inbound events
//! are applied one at a time with [`Scheduler::apply`]; after a batch,
//! [`Scheduler::reconcile`] runs the greedy exchange to a fixed point:
//!
//! 1. While a slot is free, admit the oldest request of the highest waiting tier.
//! 2. Once full, if the highest waiting tier outranks the lowest served tier,
//!    evict the first slot holding that lowest tier and admit the best waiter.
//! 3. Otherwise stop: no waiting request outranks every served request.
//!
//! Each exchange strictly raises the minimum served tier and each admission
//! fills a slot, so a pass ends after at most `N + 2` steps.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{
    AirRequest, PriorityQueueSet, RecordStore, RoomRecord, SchedulerError, ServiceObserver,
    ServingCluster,
};
use crate::util::clock::Clock;
use crate::util::serde::{RoomId, RoomStatus, Tier};

/// One room update submitted by the API layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Room the update concerns.
    pub room: RoomId,
    /// Declared power status.
    pub status: RoomStatus,
    /// Requested target temperature.
    pub target_temperature: f64,
    /// Requested fan speed.
    pub target_speed: u8,
}

impl InboundEvent {
    /// Build an event.
    #[must_use]
    pub const fn new(
        room: RoomId,
        status: RoomStatus,
        target_temperature: f64,
        target_speed: u8,
    ) -> Self {
        Self {
            room,
            status,
            target_temperature,
            target_speed,
        }
    }

    fn as_record(&self) -> RoomRecord {
        RoomRecord::new(self.status, self.target_temperature, self.target_speed)
    }
}

/// How an inbound event relates to the room's recorded state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventClass {
    /// Room turned off or went to hibernate.
    Cancel,
    /// Room turned on.
    Activate,
    /// Room stays on with new targets.
    Reclassify,
    /// Nothing the scheduler cares about changed.
    NoOp,
}

/// Phase of the scheduling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    /// Waiting for inbound events.
    #[default]
    Idle,
    /// Applying the current backlog.
    Draining,
    /// Running the admission/preemption pass.
    Reconciling,
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// Requests placed into free slots.
    pub admitted: usize,
    /// Served requests exchanged for higher-tier waiters.
    pub preempted: usize,
}

/// A served slot as published to observers of scheduler state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServedRoom {
    /// Served room.
    pub room: RoomId,
    /// Delivered fan speed.
    pub speed: u8,
    /// Time since service started.
    pub served_for: Duration,
}

/// Point-in-time view of queues and slots.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SchedulerSnapshot {
    /// Loop phase.
    pub state: SchedulerState,
    /// One entry per slot, `None` when empty.
    pub slots: Vec<Option<ServedRoom>>,
    /// Rooms waiting at low tier, head first.
    pub low: Vec<RoomId>,
    /// Rooms waiting at mid tier, head first.
    pub mid: Vec<RoomId>,
    /// Rooms waiting at high tier, head first.
    pub high: Vec<RoomId>,
    /// Completed reconciliation passes.
    pub passes: u64,
    /// Inbound events fully processed.
    pub processed_events: u64,
}

impl SchedulerSnapshot {
    /// Rooms occupying slots, in slot order.
    #[must_use]
    pub fn served_rooms(&self) -> Vec<RoomId> {
        self.slots.iter().flatten().map(|s| s.room).collect()
    }

    /// Fan speed the room receives; 0 when not served.
    #[must_use]
    pub fn speed_of(&self, room: RoomId) -> u8 {
        self.slots
            .iter()
            .flatten()
            .find(|s| s.room == room)
            .map_or(0, |s| s.speed)
    }

    /// Total requests queued across tiers.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.low.len() + self.mid.len() + self.high.len()
    }
}

/// Owns all mutable scheduling state.
pub struct Scheduler {
    queues: PriorityQueueSet,
    cluster: ServingCluster,
    records: Arc<dyn RecordStore>,
    observer: Arc<dyn ServiceObserver>,
    clock: Arc<dyn Clock>,
    passes: u64,
}

impl Scheduler {
    /// Create a scheduler over `instance_count` serving slots.
    #[must_use]
    pub fn new(
        instance_count: usize,
        records: Arc<dyn RecordStore>,
        observer: Arc<dyn ServiceObserver>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            queues: PriorityQueueSet::new(),
            cluster: ServingCluster::new(instance_count, Arc::clone(&observer)),
            records,
            observer,
            clock,
            passes: 0,
        }
    }

    /// Waiting requests.
    #[must_use]
    pub const fn queues(&self) -> &PriorityQueueSet {
        &self.queues
    }

    /// Serving slots.
    #[must_use]
    pub const fn cluster(&self) -> &ServingCluster {
        &self.cluster
    }

    /// Requests currently admitted: served plus queued.
    #[must_use]
    pub fn population(&self) -> usize {
        self.cluster.occupied() + self.queues.len()
    }

    /// Recorded status of a room; rooms never seen count as off.
    #[must_use]
    pub fn recorded_status(&self, room: RoomId) -> RoomStatus {
        self.records.current(room).unwrap_or_default().status
    }

    /// Classify an event against the room's recorded state.
    #[must_use]
    pub fn classify(&self, event: &InboundEvent) -> EventClass {
        let stored = self.records.current(event.room).unwrap_or_default();
        if event.status != stored.status {
            if event.status.is_active() {
                EventClass::Activate
            } else {
                EventClass::Cancel
            }
        } else if event.status.is_active() && stored.targets_differ(&event.as_record()) {
            EventClass::Reclassify
        } else {
            EventClass::NoOp
        }
    }

    /// Classify an event and apply it to queues and slots.
    ///
    /// The room's record is updated once the event has been applied. Does not
    /// run a reconciliation pass.
    ///
    /// # Errors
    ///
    /// - [`SchedulerError::InvalidPriority`] for an activation with a speed
    ///   outside `1..=3`; nothing is changed.
    /// - [`SchedulerError::NotFound`] for a cancel of a room that is neither
    ///   queued nor served; only the record is updated.
    pub fn apply(&mut self, event: &InboundEvent) -> Result<EventClass, SchedulerError> {
        let class = self.classify(event);
        match class {
            EventClass::NoOp => {
                let record = event.as_record();
                if self.records.current(event.room).as_ref() != Some(&record) {
                    self.records.store(event.room, record);
                }
            }
            EventClass::Cancel => {
                self.records.store(event.room, event.as_record());
                self.cancel(event.room)?;
            }
            EventClass::Activate | EventClass::Reclassify => {
                let tier = Tier::from_speed(event.target_speed)?;
                self.upsert(event.room, event.target_temperature, tier)?;
                self.records.store(event.room, event.as_record());
            }
        }
        tracing::debug!(room = event.room, ?class, "event applied");
        Ok(class)
    }

    /// Remove a room's request wherever it is and finalize its wait time.
    ///
    /// Only reached through [`apply`](Self::apply), which stores the inactive
    /// record first; otherwise the room would stay `On` with no request.
    fn cancel(&mut self, room: RoomId) -> Result<Duration, SchedulerError> {
        let now = self.clock.now();
        let mut request = match self.queues.remove_in_place(room) {
            Some(request) => request,
            None => self.cluster.finish_serving(room)?,
        };
        request.stop_waiting(now);
        let waited = request.accumulated_wait();
        tracing::info!(room, waited_ms = waited.as_millis(), "request cancelled");
        self.observer.on_wait_time_finalized(room, waited);
        Ok(waited)
    }

    /// Create or update a room's request at `tier`.
    fn upsert(&mut self, room: RoomId, target_temperature: f64, tier: Tier) -> Result<(), SchedulerError> {
        let now = self.clock.now();
        let fresh = AirRequest::new(room, target_temperature, tier);

        if let Some(slot) = self.cluster.slot_of(room) {
            let served_tier = self
                .cluster
                .request_at(slot)
                .map(AirRequest::tier)
                .ok_or(SchedulerError::SlotVacant(slot))?;
            if served_tier == tier {
                self.cluster.replace_in_place(room, fresh)?;
            } else {
                let mut evicted = self.cluster.evict(slot, now)?;
                evicted.retarget(target_temperature, tier);
                tracing::info!(room, from = %served_tier, to = %tier, "served request changed tier");
                self.queues.enqueue(evicted, now);
            }
            return Ok(());
        }

        if let Some((_, queued_tier)) = self.queues.locate(room) {
            if queued_tier == tier {
                // Same tier: keeps its place in line.
                if let Err(fresh) = self.queues.replace_in_place(room, fresh) {
                    self.queues.enqueue(fresh, now);
                }
            } else if let Some(previous) = self.queues.remove_in_place(room) {
                let mut moved = fresh;
                moved.carry_wait_from(&previous);
                tracing::debug!(room, from = %queued_tier, to = %tier, "queued request changed tier");
                self.queues.enqueue(moved, now);
            }
            return Ok(());
        }

        tracing::debug!(room, %tier, "new request");
        self.queues.enqueue(fresh, now);
        Ok(())
    }

    /// Run the admission/preemption loop until no exchange improves the
    /// minimum served tier.
    ///
    /// # Errors
    ///
    /// Only on a broken cluster invariant ([`SchedulerError::CapacityExceeded`]
    /// or [`SchedulerError::SlotVacant`]); the state stays consistent.
    pub fn reconcile(&mut self) -> Result<ReconcileReport, SchedulerError> {
        let mut report = ReconcileReport::default();
        loop {
            let now = self.clock.now();
            if self.cluster.can_admit() {
                let Some(request) = self.queues.dequeue_highest_tier() else {
                    break;
                };
                self.cluster.assign(request, now)?;
                report.admitted += 1;
                continue;
            }

            let Some((victim, min_served)) = self.cluster.snapshot(now).min_served() else {
                break;
            };
            let max_waiting = self.queues.highest_waiting_tier().map_or(0, Tier::rank);
            if max_waiting <= min_served {
                break;
            }

            let evicted = self.cluster.evict(victim, now)?;
            tracing::info!(room = evicted.room(), slot = victim, "preempted");
            self.queues.enqueue(evicted, now);
            let promoted = self
                .queues
                .dequeue_highest_tier()
                .ok_or(SchedulerError::CapacityExceeded)?;
            self.cluster.assign(promoted, now)?;
            report.preempted += 1;
        }
        self.passes += 1;
        Ok(report)
    }

    /// Current view of slots and queues.
    #[must_use]
    pub fn snapshot(&self) -> SchedulerSnapshot {
        let now = self.clock.now();
        SchedulerSnapshot {
            state: SchedulerState::Idle,
            slots: self
                .cluster
                .instances()
                .map(|i| {
                    i.request().map(|r| ServedRoom {
                        room: r.room(),
                        speed: r.speed(),
                        served_for: i
                            .serving_since()
                            .map_or(Duration::ZERO, |s| now.saturating_duration_since(s)),
                    })
                })
                .collect(),
            low: self.queues.rooms_at(Tier::Low),
            mid: self.queues.rooms_at(Tier::Mid),
            high: self.queues.rooms_at(Tier::High),
            passes: self.passes,
            processed_events: 0,
        }
    }
}
