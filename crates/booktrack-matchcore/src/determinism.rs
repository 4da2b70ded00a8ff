//! State digests for replica comparison.
//!
//! Two trackers fed the same event stream must hold the same book and
//! report the same fills. Comparing full payloads is expensive, so both are
//! reduced to SHA-256 digests over a canonical encoding: fixed-width
//! little-endian integers, resting orders in priority order.

use booktrack_types::{BookKey, Fill, Order, Sequence, Side};
use sha2::{Digest, Sha256};

use crate::OrderBook;

/// Compute the root hash over a list of fills.
///
/// The same fills in the same order always produce the same root.
#[must_use]
pub fn compute_fill_root(fills: &[Fill]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"booktrack:fill_root:v1:");
    hasher.update((fills.len() as u64).to_le_bytes());

    for fill in fills {
        hasher.update(fill.maker_order_id.0.to_le_bytes());
        hasher.update(fill.maker_owner.0.to_le_bytes());
        hasher.update(fill.taker_order_id.0.to_le_bytes());
        hasher.update(fill.taker_owner.0.to_le_bytes());
        hasher.update([side_byte(fill.taker_side)]);
        hasher.update(fill.price.0.to_le_bytes());
        hasher.update(fill.quantity.to_le_bytes());
    }

    hasher.finalize().into()
}

/// Recompute the root and compare with `expected_root`.
#[must_use]
pub fn verify_fill_root(fills: &[Fill], expected_root: &[u8; 32]) -> bool {
    compute_fill_root(fills) == *expected_root
}

/// Hash the resting state of a book.
///
/// Covers the book key, the next expected sequence number, and every
/// resting order (bids best first, then asks best first). Running totals are
/// not included: two books with equal digests accept the same future
/// stream identically.
#[must_use]
pub fn compute_book_digest(key: BookKey, next_sequence: Sequence, book: &OrderBook) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"booktrack:book:v1:");
    hasher.update(key.owner.0.to_le_bytes());
    hasher.update(key.market.0.to_le_bytes());
    hasher.update(next_sequence.to_le_bytes());

    for side in [Side::Buy, Side::Sell] {
        hasher.update([side_byte(side)]);
        hasher.update((book.orders(side).count() as u64).to_le_bytes());
        for order in book.orders(side) {
            hash_order(&mut hasher, order);
        }
    }

    hasher.finalize().into()
}

fn hash_order(hasher: &mut Sha256, order: &Order) {
    hasher.update(order.id.0.to_le_bytes());
    hasher.update(order.owner.0.to_le_bytes());
    hasher.update(order.price.0.to_le_bytes());
    hasher.update(order.quantity.to_le_bytes());
    hasher.update(order.remaining.to_le_bytes());
    hasher.update(order.timestamp.to_le_bytes());
    hasher.update(order.arrival.to_le_bytes());
}

fn side_byte(side: Side) -> u8 {
    match side {
        Side::Buy => 0,
        Side::Sell => 1,
    }
}
