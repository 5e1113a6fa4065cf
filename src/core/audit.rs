//! Service observers and audit sinks.
//!
//! The scheduler reports state changes through [`ServiceObserver`]. Every
//! implementation here is in-memory or non-blocking so a slow consumer can
//! never stall an admission pass; persistence belongs to whoever drains them.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Sender, TrySendError};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::util::clock::now_ms;
use crate::util::serde::RoomId;

/// Callbacks fired by the serving cluster and the scheduler.
pub trait ServiceObserver: Send + Sync {
    /// A room started receiving airflow at `speed`.
    fn on_service_started(&self, room: RoomId, speed: u8);
    /// A room stopped receiving airflow (speed falls back to 0).
    fn on_service_stopped(&self, room: RoomId);
    /// A request left the system with its total wait.
    fn on_wait_time_finalized(&self, room: RoomId, waited: Duration);
}

/// What happened to a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "action")]
pub enum ServiceAction {
    /// Airflow started at the given speed.
    Started {
        /// Delivered fan speed.
        speed: u8,
    },
    /// Airflow stopped.
    Stopped,
    /// Request finished with this much total wait.
    WaitFinalized {
        /// Total queued time in milliseconds.
        waited_ms: u128,
    },
}

/// Audit event structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Event identifier.
    pub event_id: String,
    /// Room the event concerns.
    pub room: RoomId,
    /// Action taken.
    pub action: ServiceAction,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
}

/// Helper to build an audit event stamped with a fresh id and the current time.
pub fn build_audit_event(room: RoomId, action: ServiceAction) -> AuditEvent {
    AuditEvent {
        event_id: uuid::Uuid::new_v4().to_string(),
        room,
        action,
        created_at_ms: now_ms(),
    }
}

/// In-memory audit sink for testing and dev.
pub struct InMemoryAuditSink {
    events: Mutex<VecDeque<AuditEvent>>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    #[must_use]
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Mutex::new(VecDeque::with_capacity(max_events.min(1024))),
            max_events,
        }
    }

    /// Record an audit event, dropping the oldest when full.
    pub fn record(&self, event: AuditEvent) {
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// Retrieve a snapshot of stored events.
    #[must_use]
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Events concerning one room, oldest first.
    #[must_use]
    pub fn events_for(&self, room: RoomId) -> Vec<ServiceAction> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.room == room)
            .map(|e| e.action.clone())
            .collect()
    }

    /// Drop all stored events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl fmt::Debug for InMemoryAuditSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryAuditSink")
            .field("len", &self.events.lock().len())
            .field("max_events", &self.max_events)
            .finish()
    }
}

impl ServiceObserver for InMemoryAuditSink {
    fn on_service_started(&self, room: RoomId, speed: u8) {
        self.record(build_audit_event(room, ServiceAction::Started { speed }));
    }

    fn on_service_stopped(&self, room: RoomId) {
        self.record(build_audit_event(room, ServiceAction::Stopped));
    }

    fn on_wait_time_finalized(&self, room: RoomId, waited: Duration) {
        self.record(build_audit_event(
            room,
            ServiceAction::WaitFinalized {
                waited_ms: waited.as_millis(),
            },
        ));
    }
}

/// Observer that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ServiceObserver for TracingObserver {
    fn on_service_started(&self, room: RoomId, speed: u8) {
        tracing::info!(room, speed, "service started");
    }

    fn on_service_stopped(&self, room: RoomId) {
        tracing::info!(room, "service stopped");
    }

    fn on_wait_time_finalized(&self, room: RoomId, waited: Duration) {
        tracing::info!(room, waited_ms = waited.as_millis(), "wait time finalized");
    }
}

/// Forwards audit events over a bounded channel without blocking.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: Sender<AuditEvent>,
}

impl ChannelObserver {
    /// Wrap the sending half of a channel.
    #[must_use]
    pub const fn new(tx: Sender<AuditEvent>) -> Self {
        Self { tx }
    }

    fn forward(&self, event: AuditEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                tracing::warn!(room = event.room, "audit channel full, dropping event");
            }
            Err(TrySendError::Disconnected(event)) => {
                tracing::warn!(room = event.room, "audit channel closed, dropping event");
            }
        }
    }
}

impl ServiceObserver for ChannelObserver {
    fn on_service_started(&self, room: RoomId, speed: u8) {
        self.forward(build_audit_event(room, ServiceAction::Started { speed }));
    }

    fn on_service_stopped(&self, room: RoomId) {
        self.forward(build_audit_event(room, ServiceAction::Stopped));
    }

    fn on_wait_time_finalized(&self, room: RoomId, waited: Duration) {
        self.forward(build_audit_event(
            room,
            ServiceAction::WaitFinalized {
                waited_ms: waited.as_millis(),
            },
        ));
    }
}

/// One airflow change of a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Room whose airflow changed.
    pub room: RoomId,
    /// Speed before the change.
    pub old_speed: u8,
    /// Speed after the change.
    pub new_speed: u8,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
}

impl UsageRecord {
    /// Render as a single `room old new timestamp` line.
    #[must_use]
    pub fn to_line(&self) -> String {
        format!(
            "{} {} {} {}",
            self.room, self.old_speed, self.new_speed, self.created_at_ms
        )
    }
}

const DEFAULT_USAGE_RECORDS: usize = 4096;

#[derive(Default)]
struct UsageState {
    speeds: HashMap<RoomId, u8>,
    records: VecDeque<UsageRecord>,
    waited: HashMap<RoomId, Duration>,
}

/// Per-room usage log of airflow changes and finalized waits.
///
/// Change records are kept in a bounded buffer; the oldest are dropped once
/// it is full, so export rooms with [`drain_room`](Self::drain_room) or
/// [`export_room`](Self::export_room) before that matters. Current speeds
/// and wait totals hold one entry per room that has ever been served.
pub struct UsageLog {
    state: Mutex<UsageState>,
    max_records: usize,
}

impl UsageLog {
    /// Create an empty log with the default record buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_USAGE_RECORDS)
    }

    /// Create an empty log keeping at most `max_records` change records.
    #[must_use]
    pub fn with_capacity(max_records: usize) -> Self {
        Self {
            state: Mutex::new(UsageState::default()),
            max_records: max_records.max(1),
        }
    }

    /// Airflow speed the room currently receives.
    #[must_use]
    pub fn current_speed(&self, room: RoomId) -> u8 {
        self.state.lock().speeds.get(&room).copied().unwrap_or(0)
    }

    /// Sum of finalized waits for a room.
    #[must_use]
    pub fn total_wait(&self, room: RoomId) -> Duration {
        self.state
            .lock()
            .waited
            .get(&room)
            .copied()
            .unwrap_or_default()
    }

    /// Records for a room without removing them.
    #[must_use]
    pub fn records_for(&self, room: RoomId) -> Vec<UsageRecord> {
        self.state
            .lock()
            .records
            .iter()
            .filter(|r| r.room == room)
            .cloned()
            .collect()
    }

    /// Remove and return a room's records, e.g. when its occupant checks out.
    pub fn drain_room(&self, room: RoomId) -> Vec<UsageRecord> {
        let mut state = self.state.lock();
        let (drained, kept): (Vec<UsageRecord>, Vec<UsageRecord>) =
            std::mem::take(&mut state.records)
                .into_iter()
                .partition(|r| r.room == room);
        state.records = VecDeque::from(kept);
        state.waited.remove(&room);
        drained
    }

    /// Drain a room's records into a writer, one line each.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from the writer.
    pub fn export_room<W: Write>(&self, room: RoomId, mut out: W) -> io::Result<usize> {
        let records = self.drain_room(room);
        for record in &records {
            writeln!(out, "{}", record.to_line())?;
        }
        Ok(records.len())
    }

    fn change_speed(&self, room: RoomId, new_speed: u8) {
        let mut state = self.state.lock();
        let old_speed = state.speeds.insert(room, new_speed).unwrap_or(0);
        if state.records.len() >= self.max_records {
            state.records.pop_front();
        }
        state.records.push_back(UsageRecord {
            room,
            old_speed,
            new_speed,
            created_at_ms: now_ms(),
        });
    }
}

impl Default for UsageLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceObserver for UsageLog {
    fn on_service_started(&self, room: RoomId, speed: u8) {
        self.change_speed(room, speed);
    }

    fn on_service_stopped(&self, room: RoomId) {
        self.change_speed(room, 0);
    }

    fn on_wait_time_finalized(&self, room: RoomId, waited: Duration) {
        *self.state.lock().waited.entry(room).or_default() += waited;
    }
}

/// Fans every callback out to several observers in order.
#[derive(Default, Clone)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn ServiceObserver>>,
}

impl CompositeObserver {
    /// Create an empty fan-out.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer.
    #[must_use]
    pub fn with(mut self, observer: Arc<dyn ServiceObserver>) -> Self {
        self.observers.push(observer);
        self
    }
}

impl ServiceObserver for CompositeObserver {
    fn on_service_started(&self, room: RoomId, speed: u8) {
        for o in &self.observers {
            o.on_service_started(room, speed);
        }
    }

    fn on_service_stopped(&self, room: RoomId) {
        for o in &self.observers {
            o.on_service_stopped(room);
        }
    }

    fn on_wait_time_finalized(&self, room: RoomId, waited: Duration) {
        for o in &self.observers {
            o.on_wait_time_finalized(room, waited);
        }
    }
}
