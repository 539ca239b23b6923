//! Time-ordered event queue shared by the event-driven engines.

use std::{
    cmp::{Ordering, Reverse},
    collections::BinaryHeap,
};

use crate::network::NodeId;

/// What happens to the event's node when the event fires.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EventKind {
    /// Exposed node becomes infectious.
    InfectiousOnset,
    /// Infectious node recovers.
    Recovery,
    /// Resistant node becomes susceptible again.
    ImmunityLoss,
    /// Infectious node contacts a random neighbour.
    ContactAttempt,
    /// Chain-binomial transmission to the event's node.
    InfectionAttempt,
}

/// A scheduled state transition.
///
/// Events are ordered by time, then by scheduling order, so simultaneous
/// events fire first-in first-out.
#[derive(Clone, Copy, Debug)]
pub struct Event {
    /// When the event fires.
    pub time: f64,
    /// Node the event applies to.
    pub node: NodeId,
    /// Transition to apply.
    pub kind: EventKind,
    sequence: u64,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .total_cmp(&other.time)
            .then(self.sequence.cmp(&other.sequence))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Event {}

/// Min-queue of [`Event`]s. Each event is returned by [`Self::pop`] at most
/// once.
#[derive(Clone, Debug, Default)]
pub(crate) struct EventQueue {
    heap: BinaryHeap<Reverse<Event>>,
    next_sequence: u64,
}

impl EventQueue {
    pub(crate) fn schedule(&mut self, time: f64, node: NodeId, kind: EventKind) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.heap.push(Reverse(Event {
            time,
            node,
            kind,
            sequence,
        }));
    }

    pub(crate) fn pop(&mut self) -> Option<Event> {
        self.heap.pop().map(|Reverse(event)| event)
    }

    /// Pops the earliest event if it fires no later than `limit`.
    pub(crate) fn pop_until(&mut self, limit: f64) -> Option<Event> {
        if self.peek_time()? <= limit {
            self.pop()
        } else {
            None
        }
    }

    pub(crate) fn peek_time(&self) -> Option<f64> {
        self.heap.peek().map(|Reverse(event)| event.time)
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.heap.clear();
        self.next_sequence = 0;
    }
}
