// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-subscription delivery queue.
//!
//! ```text
//! push (any publisher thread)          drain (owning subscriber)
//!        |                                      |
//!        v                                      v
//!   [P0][P1][P2][P3] ... [Pn]   <- Mutex<VecDeque>, len <= capacity
//!    ^ oldest            ^ newest
//! ```
//!
//! Each queue has its own lock; there is no lock shared across queues.
//! A full queue never blocks the publisher: the configured
//! [`OverflowPolicy`] decides which payload is discarded.

use crate::config::UNBOUNDED;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Opaque message payload, shared between all subscribers of one publish.
pub type Payload = Arc<[u8]>;

/// Upper bound on the up-front allocation for large or unbounded queues.
const PREALLOC_LIMIT: usize = 1024;

/// What a full queue does with an incoming payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Evict the oldest pending payload to make room (default).
    #[default]
    DropOldest,
    /// Discard the incoming payload, keep what is already queued.
    DropNewest,
}

/// Snapshot of a queue's monotonically increasing counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueueStats {
    /// Payloads accepted into the queue.
    pub enqueued: u64,
    /// Payloads handed out by `drain`.
    pub drained: u64,
    /// Payloads lost to the overflow policy (evicted or rejected).
    pub dropped: u64,
}

/// Bounded FIFO of pending payloads for one subscription.
pub struct DeliveryQueue {
    buffer: Mutex<VecDeque<Payload>>,
    capacity: usize,
    policy: OverflowPolicy,
    enqueued: AtomicU64,
    drained: AtomicU64,
    dropped: AtomicU64,
}

impl DeliveryQueue {
    /// Create a queue holding at most `capacity` payloads (`0` = unbounded).
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        let prealloc = if capacity == UNBOUNDED {
            16
        } else {
            capacity.min(PREALLOC_LIMIT)
        };
        Self {
            buffer: Mutex::new(VecDeque::with_capacity(prealloc)),
            capacity,
            policy,
            enqueued: AtomicU64::new(0),
            drained: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    /// Create a queue without capacity limit.
    pub fn unbounded() -> Self {
        Self::new(UNBOUNDED, OverflowPolicy::default())
    }

    /// Enqueue a payload, applying the overflow policy when full.
    ///
    /// Returns `true` when `payload` itself ended up in the queue.
    pub fn push(&self, payload: Payload) -> bool {
        let mut buffer = self.buffer.lock();

        if self.is_bounded() && buffer.len() >= self.capacity {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            match self.policy {
                OverflowPolicy::DropOldest => {
                    buffer.pop_front();
                    log::trace!("[queue] full ({}), evicted oldest", self.capacity);
                }
                OverflowPolicy::DropNewest => {
                    log::trace!("[queue] full ({}), rejected newest", self.capacity);
                    return false;
                }
            }
        }

        buffer.push_back(payload);
        self.enqueued.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Remove up to `max_count` oldest payloads, in insertion order.
    ///
    /// An empty queue yields an empty vector.
    pub fn drain(&self, max_count: usize) -> Vec<Payload> {
        let mut buffer = self.buffer.lock();
        let take = max_count.min(buffer.len());
        let out: Vec<Payload> = buffer.drain(..take).collect();
        self.drained.fetch_add(out.len() as u64, Ordering::Relaxed);
        out
    }

    /// Number of pending payloads.
    pub fn len(&self) -> usize {
        self.buffer.lock().len()
    }

    /// True when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }

    /// Configured capacity (`0` = unbounded).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True when a capacity limit applies.
    pub fn is_bounded(&self) -> bool {
        self.capacity != UNBOUNDED
    }

    /// Configured overflow policy.
    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Counter snapshot.
    pub fn stats(&self) -> QueueStats {
        QueueStats {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            drained: self.drained.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for DeliveryQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryQueue")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .field("policy", &self.policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(n: u8) -> Payload {
        Arc::from(vec![n])
    }

    fn bytes(drained: &[Payload]) -> Vec<u8> {
        drained.iter().map(|p| p[0]).collect()
    }

    #[test]
    fn test_drain_preserves_order() {
        let queue = DeliveryQueue::unbounded();
        for n in 0..5 {
            assert!(queue.push(payload(n)));
        }
        assert_eq!(bytes(&queue.drain(3)), vec![0, 1, 2]);
        assert_eq!(bytes(&queue.drain(10)), vec![3, 4]);
        assert!(queue.drain(10).is_empty());
    }

    #[test]
    fn test_drop_oldest_evicts_front() {
        let queue = DeliveryQueue::new(3, OverflowPolicy::DropOldest);
        for n in 1..=4 {
            assert!(queue.push(payload(n)));
        }
        assert_eq!(queue.len(), 3);
        assert_eq!(bytes(&queue.drain(3)), vec![2, 3, 4]);
        assert_eq!(queue.stats().dropped, 1);
    }

    #[test]
    fn test_drop_newest_rejects_incoming() {
        let queue = DeliveryQueue::new(2, OverflowPolicy::DropNewest);
        assert!(queue.push(payload(1)));
        assert!(queue.push(payload(2)));
        assert!(!queue.push(payload(3)));
        assert_eq!(bytes(&queue.drain(5)), vec![1, 2]);

        let stats = queue.stats();
        assert_eq!(stats.enqueued, 2);
        assert_eq!(stats.drained, 2);
        assert_eq!(stats.dropped, 1);
    }

    #[test]
    fn test_drain_zero_is_noop() {
        let queue = DeliveryQueue::new(4, OverflowPolicy::DropOldest);
        queue.push(payload(9));
        assert!(queue.drain(0).is_empty());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_capacity_one() {
        let queue = DeliveryQueue::new(1, OverflowPolicy::DropOldest);
        for n in 0..10 {
            queue.push(payload(n));
            assert!(queue.len() <= 1);
        }
        assert_eq!(bytes(&queue.drain(1)), vec![9]);
        assert!(queue.is_bounded());
        assert!(!DeliveryQueue::unbounded().is_bounded());
    }
}
