//! Matchmaking queue and pairing policy.
//!
//! The queue is strictly FIFO: insertion order determines match priority,
//! so no waiting client is starved while newer arrivals are matched first.
//! Whether the head of the queue is paired with a new requester is a
//! pluggable [`PairingPolicy`]; queue mechanics never change with the
//! policy.

use std::collections::VecDeque;

use rand::Rng;
use tracing::trace;

use crate::registry::ConnectionId;

/// Decision rule for whether a newly arrived requester immediately
/// matches the head of the waiting queue.
pub trait PairingPolicy: Send + Sync {
    /// Decide whether `waiting` (the earliest-enqueued id) should be
    /// paired with `requester` now. Returning false re-queues the
    /// requester at the tail instead.
    fn should_pair(&self, waiting: ConnectionId, requester: ConnectionId) -> bool;
}

/// Deterministic FIFO pairing: always match. The default.
#[derive(Debug, Clone, Copy, Default)]
pub struct FifoPairing;

impl PairingPolicy for FifoPairing {
    fn should_pair(&self, _waiting: ConnectionId, _requester: ConnectionId) -> bool {
        true
    }
}

/// Randomized pairing: match with the configured probability, otherwise
/// re-queue the requester behind the current waiter.
#[derive(Debug, Clone, Copy)]
pub struct CoinFlipPairing {
    pair_chance: f64,
}

impl CoinFlipPairing {
    /// Create a coin-flip policy; `pair_chance` is clamped to `[0, 1]`
    pub fn new(pair_chance: f64) -> Self {
        Self {
            pair_chance: pair_chance.clamp(0.0, 1.0),
        }
    }
}

impl PairingPolicy for CoinFlipPairing {
    fn should_pair(&self, _waiting: ConnectionId, _requester: ConnectionId) -> bool {
        rand::thread_rng().gen_bool(self.pair_chance)
    }
}

/// Outcome of an enqueue attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueOutcome {
    /// Appended to the tail of the waiting queue
    Queued,
    /// Paired with the earliest waiter, which has been popped
    Matched {
        /// The waiter this requester was paired with
        partner: ConnectionId,
    },
    /// Already waiting; duplicate join requests are no-ops
    AlreadyWaiting,
}

/// Owns the waiting queue and converts two waiting connections into a pair.
///
/// The matchmaker knows nothing about sessions; the caller turns a
/// [`EnqueueOutcome::Matched`] result into a session and notifies both
/// sides.
pub struct Matchmaker {
    queue: VecDeque<ConnectionId>,
    policy: Box<dyn PairingPolicy>,
}

impl Matchmaker {
    /// Create a matchmaker with the given pairing policy
    pub fn new(policy: Box<dyn PairingPolicy>) -> Self {
        Self {
            queue: VecDeque::new(),
            policy,
        }
    }

    /// Create a matchmaker with the default deterministic FIFO policy
    pub fn fifo() -> Self {
        Self::new(Box::new(FifoPairing))
    }

    /// Try to pair `id` with the earliest waiter, or append it to the
    /// queue. Idempotent for ids already waiting.
    ///
    /// The caller must ensure `id` is not a participant of a live session;
    /// the queue and the session table are disjoint by construction.
    pub fn enqueue(&mut self, id: ConnectionId) -> EnqueueOutcome {
        if self.queue.contains(&id) {
            trace!(connection_id = %id, "duplicate join request ignored");
            return EnqueueOutcome::AlreadyWaiting;
        }

        if let Some(&waiting) = self.queue.front() {
            if self.policy.should_pair(waiting, id) {
                self.queue.pop_front();
                return EnqueueOutcome::Matched { partner: waiting };
            }
            trace!(connection_id = %id, "pairing declined by policy, re-queuing");
        }

        self.queue.push_back(id);
        EnqueueOutcome::Queued
    }

    /// Remove `id` from the queue; returns false if it was not waiting
    pub fn dequeue(&mut self, id: ConnectionId) -> bool {
        match self.queue.iter().position(|&queued| queued == id) {
            Some(index) => {
                let _ = self.queue.remove(index);
                true
            }
            None => false,
        }
    }

    /// Whether `id` is currently waiting
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.queue.contains(&id)
    }

    /// Number of waiting connections
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
