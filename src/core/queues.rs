//! Three FIFO queues, one per priority tier.

use std::collections::VecDeque;
use std::time::Instant;

use crate::core::AirRequest;
use crate::util::serde::{RoomId, Tier};

/// Requests waiting for a serving slot.
///
/// FIFO within a tier; tiers drain from high to low. Every queued request
/// has its wait clock running.
#[derive(Debug, Default)]
pub struct PriorityQueueSet {
    queues: [VecDeque<AirRequest>; 3],
}

impl PriorityQueueSet {
    /// Create empty queues.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the tail of the request's tier, starting its wait clock.
    pub fn enqueue(&mut self, mut request: AirRequest, now: Instant) {
        request.start_waiting(now);
        tracing::trace!(room = request.room(), tier = %request.tier(), "enqueued");
        self.queues[request.tier().index()].push_back(request);
    }

    /// Pop the oldest request of the highest nonempty tier.
    pub fn dequeue_highest_tier(&mut self) -> Option<AirRequest> {
        Tier::DESCENDING
            .iter()
            .find_map(|tier| self.queues[tier.index()].pop_front())
    }

    /// Highest tier with a waiting request.
    #[must_use]
    pub fn highest_waiting_tier(&self) -> Option<Tier> {
        Tier::DESCENDING
            .into_iter()
            .find(|tier| !self.queues[tier.index()].is_empty())
    }

    /// Find a queued request and its tier.
    #[must_use]
    pub fn locate(&self, room: RoomId) -> Option<(&AirRequest, Tier)> {
        Tier::DESCENDING.into_iter().find_map(|tier| {
            self.queues[tier.index()]
                .iter()
                .find(|r| r.room() == room)
                .map(|r| (r, tier))
        })
    }

    /// Remove a request wherever it is queued.
    pub fn remove_in_place(&mut self, room: RoomId) -> Option<AirRequest> {
        self.queues.iter_mut().find_map(|queue| {
            let pos = queue.iter().position(|r| r.room() == room)?;
            queue.remove(pos)
        })
    }

    /// Swap a queued request for `request` at the same queue position.
    ///
    /// Only applies when the room is queued at the replacement's tier; the
    /// replacement inherits the running wait clock. Returns the old request,
    /// or hands `request` back when there is nothing to replace.
    ///
    /// # Errors
    ///
    /// Returns the unused replacement when the room is not queued at its tier.
    pub fn replace_in_place(
        &mut self,
        room: RoomId,
        mut request: AirRequest,
    ) -> Result<AirRequest, AirRequest> {
        let queue = &mut self.queues[request.tier().index()];
        let Some(slot) = queue.iter_mut().find(|r| r.room() == room) else {
            return Err(request);
        };
        request.carry_wait_from(slot);
        Ok(std::mem::replace(slot, request))
    }

    /// Number of requests queued at `tier`.
    #[must_use]
    pub fn len_of(&self, tier: Tier) -> usize {
        self.queues[tier.index()].len()
    }

    /// Total queued requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queues.iter().map(VecDeque::len).sum()
    }

    /// Whether nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queues.iter().all(VecDeque::is_empty)
    }

    /// Requests queued at `tier`, head first.
    pub fn iter_tier(&self, tier: Tier) -> impl Iterator<Item = &AirRequest> {
        self.queues[tier.index()].iter()
    }

    /// Rooms queued at `tier`, head first.
    #[must_use]
    pub fn rooms_at(&self, tier: Tier) -> Vec<RoomId> {
        self.iter_tier(tier).map(AirRequest::room).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn req(room: RoomId, tier: Tier) -> AirRequest {
        AirRequest::new(room, 25.0, tier)
    }

    #[test]
    fn test_priority_ordering() {
        let now = Instant::now();
        let mut q = PriorityQueueSet::new();
        q.enqueue(req(1, Tier::Low), now);
        q.enqueue(req(2, Tier::High), now);
        q.enqueue(req(3, Tier::Mid), now);

        assert_eq!(q.highest_waiting_tier(), Some(Tier::High));
        assert_eq!(q.dequeue_highest_tier().unwrap().room(), 2);
        assert_eq!(q.dequeue_highest_tier().unwrap().room(), 3);
        assert_eq!(q.dequeue_highest_tier().unwrap().room(), 1);
        assert!(q.dequeue_highest_tier().is_none());
        assert_eq!(q.highest_waiting_tier(), None);
    }

    #[test]
    fn test_fifo_within_tier() {
        let now = Instant::now();
        let mut q = PriorityQueueSet::new();
        for room in [5, 3, 9] {
            q.enqueue(req(room, Tier::Mid), now);
        }
        assert_eq!(q.rooms_at(Tier::Mid), vec![5, 3, 9]);
        assert_eq!(q.dequeue_highest_tier().unwrap().room(), 5);
    }

    #[test]
    fn test_enqueue_starts_wait_clock() {
        let now = Instant::now();
        let mut q = PriorityQueueSet::new();
        q.enqueue(req(1, Tier::Low), now);
        let (found, tier) = q.locate(1).unwrap();
        assert_eq!(tier, Tier::Low);
        assert_eq!(found.waiting_since(), Some(now));
    }

    #[test]
    fn test_locate_and_remove() {
        let now = Instant::now();
        let mut q = PriorityQueueSet::new();
        q.enqueue(req(1, Tier::Low), now);
        q.enqueue(req(2, Tier::Mid), now);
        q.enqueue(req(3, Tier::Mid), now);

        assert!(q.locate(4).is_none());
        assert_eq!(q.remove_in_place(2).unwrap().room(), 2);
        assert!(q.remove_in_place(2).is_none());
        assert_eq!(q.len(), 2);
        assert_eq!(q.len_of(Tier::Mid), 1);
    }

    #[test]
    fn test_replace_in_place_preserves_position_and_clock() {
        let t0 = Instant::now();
        let mut q = PriorityQueueSet::new();
        q.enqueue(req(1, Tier::Low), t0);
        q.enqueue(req(2, Tier::Low), t0 + Duration::from_secs(1));
        q.enqueue(req(3, Tier::Low), t0 + Duration::from_secs(2));

        let old = q
            .replace_in_place(2, AirRequest::new(2, 18.0, Tier::Low))
            .unwrap();
        assert!((old.target_temperature() - 25.0).abs() < f64::EPSILON);
        assert_eq!(q.rooms_at(Tier::Low), vec![1, 2, 3]);

        let (updated, _) = q.locate(2).unwrap();
        assert!((updated.target_temperature() - 18.0).abs() < f64::EPSILON);
        assert_eq!(updated.waiting_since(), Some(t0 + Duration::from_secs(1)));
    }

    #[test]
    fn test_replace_in_place_rejects_other_tier() {
        let now = Instant::now();
        let mut q = PriorityQueueSet::new();
        q.enqueue(req(1, Tier::Low), now);
        let back = q
            .replace_in_place(1, AirRequest::new(1, 18.0, Tier::High))
            .unwrap_err();
        assert_eq!(back.tier(), Tier::High);
        assert_eq!(q.rooms_at(Tier::Low), vec![1]);
    }
}
