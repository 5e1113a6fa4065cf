//! Tests for the inbound mailbox

use std::sync::Arc;
use std::thread;

use hvac_parking_lot::core::{InboundEvent, SchedulerError};
use hvac_parking_lot::infra::mailbox::memory::InboundMailbox;
use hvac_parking_lot::util::serde::RoomStatus;

fn event(room: u32) -> InboundEvent {
    InboundEvent::new(room, RoomStatus::On, 25.0, 2)
}

#[test]
fn test_submit_and_try_drain() {
    let mailbox = InboundMailbox::new();
    mailbox.submit(event(1)).unwrap();
    mailbox.submit(event(2)).unwrap();
    assert_eq!(mailbox.len(), 2);

    let drained = mailbox.try_drain();
    assert_eq!(drained.iter().map(|e| e.room).collect::<Vec<_>>(), vec![1, 2]);
    assert!(mailbox.is_empty());
}

#[test]
fn test_submit_after_close_is_rejected() {
    let mailbox = InboundMailbox::new();
    mailbox.close();
    assert_eq!(mailbox.submit(event(1)), Err(SchedulerError::ShutDown));
    assert!(mailbox.is_closed());
}

#[test]
fn test_producers_lose_nothing() {
    let mailbox = Arc::new(InboundMailbox::new());
    let producers: Vec<_> = (0..4u32)
        .map(|p| {
            let mailbox = Arc::clone(&mailbox);
            thread::spawn(move || {
                for i in 0..50 {
                    mailbox.submit(event(p * 100 + i)).unwrap();
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }
    mailbox.close();

    let mut total = 0;
    while let Some(batch) = mailbox.drain_blocking() {
        total += batch.len();
    }
    assert_eq!(total, 200);
}
