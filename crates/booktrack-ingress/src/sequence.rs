//! Per-book sequence validation.
//!
//! The venue stamps every book event with a per-book sequence number that
//! increases by exactly one. The validator makes ordering violations
//! detectable instead of letting them silently corrupt book state: it never
//! reorders, buffers, or retries.
//!
//! Checking and advancing are separate steps. The engine calls
//! [`SequenceValidator::check`] before touching the book and
//! [`SequenceValidator::advance`] only once the event has been fully
//! applied, so an event that fails later validation is treated as never
//! having been applied.

use booktrack_types::{BookError, BookEvent, MarketId, Result, Sequence};

/// Tracks the next sequence number a book will accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceValidator {
    market: MarketId,
    next_sequence: Sequence,
}

impl SequenceValidator {
    /// Create a validator expecting `origin` as the first sequence number.
    #[must_use]
    pub fn new(market: MarketId, origin: Sequence) -> Self {
        Self {
            market,
            next_sequence: origin,
        }
    }

    /// The market this validator guards.
    #[must_use]
    pub fn market(&self) -> MarketId {
        self.market
    }

    /// The sequence number the next event must carry.
    #[must_use]
    pub fn next_sequence(&self) -> Sequence {
        self.next_sequence
    }

    /// Check that `event` may be applied next. Never mutates.
    ///
    /// The market is checked before the sequence number: an event meant for
    /// another book says nothing about this book's stream.
    ///
    /// # Errors
    /// - `MarketMismatch` if the event targets a different market
    /// - `Sequence` if the event is a duplicate or leaves a gap
    pub fn check(&self, event: &BookEvent) -> Result<()> {
        if event.market != self.market {
            return Err(BookError::MarketMismatch {
                expected: self.market,
                actual: event.market,
            });
        }
        if event.sequence != self.next_sequence {
            return Err(BookError::Sequence {
                expected: self.next_sequence,
                actual: event.sequence,
            });
        }
        Ok(())
    }

    /// Record that the checked event was applied.
    pub fn advance(&mut self) {
        self.next_sequence += 1;
    }

    /// `true` if `event` was already applied (a duplicate) rather than
    /// skipping ahead of the stream.
    #[must_use]
    pub fn is_stale(&self, event: &BookEvent) -> bool {
        event.sequence < self.next_sequence
    }

    /// Jump to `next_sequence` after the upstream collaborator resynchronized
    /// the book from a snapshot.
    pub fn resync(&mut self, next_sequence: Sequence) {
        tracing::warn!(
            market = %self.market,
            from = self.next_sequence,
            to = next_sequence,
            "Sequence resynchronized"
        );
        self.next_sequence = next_sequence;
    }
}
