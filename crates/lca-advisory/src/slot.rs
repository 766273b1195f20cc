//! Last-request-wins slot for advisory responses
//!
//! Each call takes a [`Ticket`] before it starts. A completion is only
//! published when its ticket is still the newest one issued; anything older
//! is discarded.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Sequence number handed out by [`AdvisorySlot::begin`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    /// Raw sequence number
    #[inline]
    #[must_use]
    pub fn sequence(self) -> u64 {
        self.0
    }
}

/// Outcome of [`AdvisorySlot::complete`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Value is now current
    Accepted,
    /// A newer request was issued; value dropped
    Stale,
}

#[derive(Debug)]
struct SlotState<T> {
    published: u64,
    value: Option<T>,
}

/// Holds the most recent advisory outcome for one subject
#[derive(Debug)]
pub struct AdvisorySlot<T> {
    issued: AtomicU64,
    state: Mutex<SlotState<T>>,
}

impl<T> Default for AdvisorySlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> AdvisorySlot<T> {
    /// Empty slot
    #[must_use]
    pub fn new() -> Self {
        Self {
            issued: AtomicU64::new(0),
            state: Mutex::new(SlotState {
                published: 0,
                value: None,
            }),
        }
    }

    /// Register a new request
    pub fn begin(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Publish `value` if `ticket` is the newest issued
    pub fn complete(&self, ticket: Ticket, value: T) -> Completion {
        let mut state = self.state.lock();
        let newest = self.issued.load(Ordering::Acquire);
        if ticket.0 != newest || ticket.0 <= state.published {
            tracing::warn!(
                ticket = ticket.0,
                newest,
                "Discarding stale advisory response"
            );
            return Completion::Stale;
        }
        state.published = ticket.0;
        state.value = Some(value);
        Completion::Accepted
    }

    /// Whether a request is outstanding
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.issued.load(Ordering::Acquire) > self.state.lock().published
    }

    /// Drop the published value
    pub fn clear(&self) {
        self.state.lock().value = None;
    }
}

impl<T: Clone> AdvisorySlot<T> {
    /// Most recent accepted value
    #[must_use]
    pub fn current(&self) -> Option<T> {
        self.state.lock().value.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_ticket_wins() {
        let slot = AdvisorySlot::new();
        let first = slot.begin();
        let second = slot.begin();
        assert!(slot.is_pending());

        assert_eq!(slot.complete(second, "second"), Completion::Accepted);
        assert_eq!(slot.complete(first, "first"), Completion::Stale);
        assert_eq!(slot.current(), Some("second"));
        assert!(!slot.is_pending());
    }

    #[test]
    fn older_completion_is_dropped_even_when_first() {
        let slot = AdvisorySlot::new();
        let first = slot.begin();
        let second = slot.begin();

        assert_eq!(slot.complete(first, 1), Completion::Stale);
        assert_eq!(slot.current(), None);
        assert!(slot.is_pending());
        assert_eq!(slot.complete(second, 2), Completion::Accepted);
        assert_eq!(slot.current(), Some(2));
    }

    #[test]
    fn ticket_cannot_complete_twice() {
        let slot = AdvisorySlot::new();
        let t = slot.begin();
        assert_eq!(slot.complete(t, 'a'), Completion::Accepted);
        assert_eq!(slot.complete(t, 'b'), Completion::Stale);
        assert_eq!(slot.current(), Some('a'));
        slot.clear();
        assert_eq!(slot.current(), None);
    }
}
