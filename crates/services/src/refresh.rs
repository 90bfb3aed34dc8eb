//! Last-trigger-wins bookkeeping for reads that can be re-triggered while a
//! previous one is still in flight.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use tracing::debug;

/// Handed out when a refresh starts; identifies its generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket {
    generation: u64,
}

impl RefreshTicket {
    #[must_use]
    pub fn generation(self) -> u64 {
        self.generation
    }
}

/// Monotonic generation counter.
#[derive(Debug, Default)]
pub struct RefreshGate {
    issued: AtomicU64,
}

impl RefreshGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> RefreshTicket {
        let generation = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        RefreshTicket { generation }
    }

    /// True while no later refresh has been started.
    #[must_use]
    pub fn is_current(&self, ticket: RefreshTicket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.generation
    }
}

#[derive(Debug)]
struct Slot<T> {
    generation: u64,
    value: Option<T>,
}

/// Holds the result of the newest refresh that has completed.
///
/// A result is dropped when a refresh started later has already published.
#[derive(Debug)]
pub struct Latest<T> {
    gate: RefreshGate,
    slot: Mutex<Slot<T>>,
}

impl<T> Default for Latest<T> {
    fn default() -> Self {
        Self {
            gate: RefreshGate::new(),
            slot: Mutex::new(Slot {
                generation: 0,
                value: None,
            }),
        }
    }
}

impl<T: Clone> Latest<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> RefreshTicket {
        self.gate.begin()
    }

    #[must_use]
    pub fn is_current(&self, ticket: RefreshTicket) -> bool {
        self.gate.is_current(ticket)
    }

    /// Store `value` unless a newer ticket already published. Returns whether
    /// the value was kept.
    pub fn publish(&self, ticket: RefreshTicket, value: T) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if ticket.generation < slot.generation {
            debug!(
                stale = ticket.generation,
                published = slot.generation,
                "dropping superseded refresh result"
            );
            return false;
        }
        slot.generation = ticket.generation;
        slot.value = Some(value);
        true
    }

    #[must_use]
    pub fn get(&self) -> Option<T> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .value
            .clone()
    }
}
