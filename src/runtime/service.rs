//! Scheduler service: one dedicated thread owning the [`Scheduler`].
//!
//! API producers submit through the shared [`InboundMailbox`]; the scheduling
//! thread drains the whole backlog, applies it, runs one reconciliation pass
//! and publishes a [`SchedulerSnapshot`]. Shutdown closes the mailbox, lets
//! the thread finish every event already submitted, and joins it.
//!
//! # Design Principles
//!
//! - **No polling**: the thread sleeps on the mailbox Condvar; waiters on
//!   progress sleep on the snapshot Condvar
//! - **Nothing lost on shutdown**: closing only stops new submissions

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, error, info, warn};

use crate::config::SchedulerConfig;
use crate::core::{InboundEvent, Scheduler, SchedulerError, SchedulerSnapshot, SchedulerState};
use crate::infra::InboundMailbox;
use crate::util::serde::{RoomId, RoomStatus, Tier};

/// Latest published snapshot plus a Condvar to wait for progress.
struct Published {
    snapshot: Mutex<SchedulerSnapshot>,
    progressed: Condvar,
}

impl Published {
    fn new(initial: SchedulerSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(initial),
            progressed: Condvar::new(),
        }
    }

    fn set_state(&self, state: SchedulerState) {
        self.snapshot.lock().state = state;
    }

    fn publish(&self, mut next: SchedulerSnapshot, processed: u64) {
        let mut current = self.snapshot.lock();
        next.state = SchedulerState::Idle;
        next.processed_events = current.processed_events + processed;
        *current = next;
        drop(current);
        self.progressed.notify_all();
    }

    fn read(&self) -> SchedulerSnapshot {
        self.snapshot.lock().clone()
    }

    fn wait_processed(&self, target: u64, timeout: Duration) -> Result<SchedulerSnapshot, SchedulerError> {
        let deadline = Instant::now() + timeout;
        let mut current = self.snapshot.lock();
        while current.processed_events < target {
            if self.progressed.wait_until(&mut current, deadline).timed_out()
                && current.processed_events < target
            {
                return Err(SchedulerError::Timeout);
            }
        }
        Ok(current.clone())
    }
}

/// Running scheduler with its inbound mailbox.
///
/// This is the explicit context object handed to the API layer; create one
/// at startup and call [`shutdown`](Self::shutdown) at teardown.
pub struct SchedulerService {
    config: SchedulerConfig,
    mailbox: Arc<InboundMailbox>,
    published: Arc<Published>,
    submitted: AtomicU64,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl SchedulerService {
    /// Start the scheduling thread.
    ///
    /// # Errors
    ///
    /// - [`SchedulerError::InvalidConfig`] if the configuration is invalid
    /// - [`SchedulerError::Backend`] if the thread cannot be spawned
    pub fn start(config: SchedulerConfig, scheduler: Scheduler) -> Result<Self, SchedulerError> {
        config.validate().map_err(SchedulerError::InvalidConfig)?;

        let mailbox = Arc::new(InboundMailbox::new());
        let published = Arc::new(Published::new(scheduler.snapshot()));

        let worker = {
            let mailbox = Arc::clone(&mailbox);
            let published = Arc::clone(&published);
            thread::Builder::new()
                .name(config.thread_name.clone())
                .spawn(move || run_loop(scheduler, &mailbox, &published))
                .map_err(|e| SchedulerError::Backend(format!("spawn scheduler thread: {e}")))?
        };

        info!(
            instances = config.instance_count,
            rooms = config.room_count,
            "scheduler service started"
        );

        Ok(Self {
            config,
            mailbox,
            published,
            submitted: AtomicU64::new(0),
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Service configuration.
    #[must_use]
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Submit a room update. This is the sole entry point into the scheduler.
    ///
    /// # Errors
    ///
    /// - [`SchedulerError::InvalidRoom`] for a room outside `1..=room_count`
    /// - [`SchedulerError::InvalidPriority`] for an `on` update whose speed
    ///   is not 1, 2 or 3
    /// - [`SchedulerError::ShutDown`] after shutdown
    pub fn submit_event(
        &self,
        room: RoomId,
        status: RoomStatus,
        target_temperature: f64,
        target_speed: u8,
    ) -> Result<(), SchedulerError> {
        if room == 0 || room > self.config.room_count {
            return Err(SchedulerError::InvalidRoom(room));
        }
        if status.is_active() {
            Tier::from_speed(target_speed)?;
        }
        self.mailbox.submit(InboundEvent::new(
            room,
            status,
            target_temperature,
            target_speed,
        ))?;
        self.submitted.fetch_add(1, Ordering::AcqRel);
        debug!(room, %status, target_speed, "event submitted");
        Ok(())
    }

    /// Latest published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> SchedulerSnapshot {
        self.published.read()
    }

    /// Fan speed the room currently receives; 0 when not served.
    #[must_use]
    pub fn current_speed(&self, room: RoomId) -> u8 {
        self.published.read().speed_of(room)
    }

    /// Events accepted so far.
    #[must_use]
    pub fn submitted_events(&self) -> u64 {
        self.submitted.load(Ordering::Acquire)
    }

    /// Block until every event submitted before this call has been applied
    /// and reconciled.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::Timeout`] if that does not happen within `timeout`.
    pub fn settle(&self, timeout: Duration) -> Result<SchedulerSnapshot, SchedulerError> {
        self.published
            .wait_processed(self.submitted_events(), timeout)
    }

    /// Async variant of [`settle`](Self::settle); waits on tokio's blocking pool.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::Timeout`] on timeout, [`SchedulerError::Backend`] if
    /// the blocking task fails.
    #[cfg(feature = "tokio-runtime")]
    pub async fn settle_async(&self, timeout: Duration) -> Result<SchedulerSnapshot, SchedulerError> {
        let published = Arc::clone(&self.published);
        let target = self.submitted_events();
        tokio::task::spawn_blocking(move || published.wait_processed(target, timeout))
            .await
            .map_err(|e| SchedulerError::Backend(format!("settle task failed: {e}")))?
    }

    /// Whether the service still accepts events.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.mailbox.is_closed()
    }

    /// Stop accepting events, process everything already submitted, and
    /// join the scheduling thread. Returns the final snapshot.
    ///
    /// Safe to call more than once.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::Backend`] if the scheduling thread panicked.
    pub fn shutdown(&self) -> Result<SchedulerSnapshot, SchedulerError> {
        self.mailbox.close();
        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            info!("shutting down scheduler service");
            worker
                .join()
                .map_err(|_| SchedulerError::Backend("scheduler thread panicked".into()))?;
            info!("scheduler service stopped");
        }
        Ok(self.published.read())
    }
}

impl Drop for SchedulerService {
    fn drop(&mut self) {
        // Close but don't join; explicit shutdown() is the graceful path.
        if !self.mailbox.is_closed() {
            self.mailbox.close();
            debug!("SchedulerService dropped without explicit shutdown");
        }
    }
}

/// A cancel finds nothing to remove when the room was already off or
/// hibernating; only a cancel of an active room points at lost state.
const fn is_expected_cancel_miss(err: &SchedulerError, was_active: bool) -> bool {
    matches!(err, SchedulerError::NotFound(_)) && !was_active
}

/// Idle → Draining → Reconciling → Idle until the mailbox closes and empties.
fn run_loop(mut scheduler: Scheduler, mailbox: &InboundMailbox, published: &Published) {
    debug!("scheduler loop started");
    while let Some(batch) = mailbox.drain_blocking() {
        published.set_state(SchedulerState::Draining);
        let processed = batch.len() as u64;
        for event in &batch {
            let was_active = scheduler.recorded_status(event.room).is_active();
            match scheduler.apply(event) {
                Ok(_) => {}
                Err(e) if is_expected_cancel_miss(&e, was_active) => {
                    debug!(room = event.room, status = %event.status, "inactive room changed status");
                }
                Err(SchedulerError::NotFound(room)) => {
                    warn!(room, "cancel for a room that is neither queued nor served");
                }
                Err(e) => warn!(room = event.room, error = %e, "event dropped"),
            }
        }

        published.set_state(SchedulerState::Reconciling);
        match scheduler.reconcile() {
            Ok(report) => debug!(
                events = processed,
                admitted = report.admitted,
                preempted = report.preempted,
                "reconciled"
            ),
            Err(e) => error!(error = %e, "reconciliation stopped on a broken invariant"),
        }
        published.publish(scheduler.snapshot(), processed);
    }
    debug!("scheduler loop exiting");
}
