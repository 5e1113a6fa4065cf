//! In-memory inbound mailbox shared by API producers and the scheduler.

use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};

use crate::core::{InboundEvent, SchedulerError};

struct MailboxState {
    events: VecDeque<InboundEvent>,
    closed: bool,
}

/// Multi-producer, single-consumer event mailbox.
///
/// Producers append under the lock and raise the not-empty signal when the
/// mailbox goes from empty to non-empty. The consumer sleeps only while the
/// mailbox is empty and takes the whole backlog at once.
pub struct InboundMailbox {
    state: Mutex<MailboxState>,
    not_empty: Condvar,
}

impl InboundMailbox {
    /// Create an open, empty mailbox.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MailboxState {
                events: VecDeque::new(),
                closed: false,
            }),
            not_empty: Condvar::new(),
        }
    }

    /// Append an event.
    ///
    /// # Errors
    ///
    /// [`SchedulerError::ShutDown`] once the mailbox is closed.
    pub fn submit(&self, event: InboundEvent) -> Result<(), SchedulerError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(SchedulerError::ShutDown);
        }
        let was_empty = state.events.is_empty();
        state.events.push_back(event);
        if was_empty {
            self.not_empty.notify_one();
        }
        Ok(())
    }

    /// Block until events are available, then take all of them.
    ///
    /// Returns `None` once the mailbox is closed and fully drained.
    pub fn drain_blocking(&self) -> Option<Vec<InboundEvent>> {
        let mut state = self.state.lock();
        while state.events.is_empty() && !state.closed {
            self.not_empty.wait(&mut state);
        }
        if state.events.is_empty() {
            return None;
        }
        Some(state.events.drain(..).collect())
    }

    /// Take whatever is queued without waiting.
    pub fn try_drain(&self) -> Vec<InboundEvent> {
        self.state.lock().events.drain(..).collect()
    }

    /// Stop accepting events and wake the consumer. Queued events stay
    /// available to [`drain_blocking`](Self::drain_blocking).
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        drop(state);
        self.not_empty.notify_all();
    }

    /// Whether [`close`](Self::close) was called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Events waiting to be drained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().events.len()
    }

    /// Whether no events are waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InboundMailbox {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::serde::RoomStatus;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn event(room: u32) -> InboundEvent {
        InboundEvent::new(room, RoomStatus::On, 24.0, 1)
    }

    #[test]
    fn test_drain_takes_whole_backlog() {
        let mb = InboundMailbox::new();
        mb.submit(event(1)).unwrap();
        mb.submit(event(2)).unwrap();
        let batch = mb.drain_blocking().unwrap();
        assert_eq!(batch.iter().map(|e| e.room).collect::<Vec<_>>(), vec![1, 2]);
        assert!(mb.is_empty());
    }

    #[test]
    fn test_consumer_wakes_on_submit() {
        let mb = Arc::new(InboundMailbox::new());
        let consumer = {
            let mb = Arc::clone(&mb);
            thread::spawn(move || mb.drain_blocking())
        };
        thread::sleep(Duration::from_millis(20));
        mb.submit(event(7)).unwrap();
        let batch = consumer.join().unwrap().unwrap();
        assert_eq!(batch[0].room, 7);
    }

    #[test]
    fn test_close_keeps_backlog_then_ends() {
        let mb = InboundMailbox::new();
        mb.submit(event(1)).unwrap();
        mb.close();
        assert!(matches!(mb.submit(event(2)), Err(SchedulerError::ShutDown)));
        assert_eq!(mb.drain_blocking().map(|b| b.len()), Some(1));
        assert!(mb.drain_blocking().is_none());
    }

    #[test]
    fn test_close_wakes_idle_consumer() {
        let mb = Arc::new(InboundMailbox::new());
        let consumer = {
            let mb = Arc::clone(&mb);
            thread::spawn(move || mb.drain_blocking())
        };
        thread::sleep(Duration::from_millis(20));
        mb.close();
        assert!(consumer.join().unwrap().is_none());
    }
}
