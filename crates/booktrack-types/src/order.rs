//! Order types for the booktrack order book.
//!
//! Prices are integer ticks so that price comparison and level aggregation
//! never depend on floating point rounding.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{MarketId, OrderId, OwnerId};

/// Number of contracts.
pub type Quantity = u64;

/// Venue timestamp carried on the event (microseconds, venue clock).
pub type Timestamp = i64;

/// Per-book event sequence number.
pub type Sequence = u64;

/// Which side of the book an order rests on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The side an incoming order on `self` trades against.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// A price in integer ticks.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(pub u64);

impl Price {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub fn ticks(self) -> u64 {
        self.0
    }

    /// `self + n` ticks, or `None` on overflow.
    #[must_use]
    pub fn checked_up(self, n: u64) -> Option<Self> {
        self.0.checked_add(n).map(Self)
    }

    /// `self - n` ticks, or `None` below zero.
    #[must_use]
    pub fn checked_down(self, n: u64) -> Option<Self> {
        self.0.checked_sub(n).map(Self)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Price {
    fn from(ticks: u64) -> Self {
        Self(ticks)
    }
}

/// A resting order as tracked by a book.
///
/// Identity fields never change once the order is accepted; only
/// `remaining` is reduced, and only by the matcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub market: MarketId,
    pub owner: OwnerId,
    pub side: Side,
    pub price: Price,
    /// Size on the add event.
    pub quantity: Quantity,
    /// Size still resting. Always `> 0` while the order is in a book.
    pub remaining: Quantity,
    /// Venue submission timestamp.
    pub timestamp: Timestamp,
    /// Sequence number of the event that added the order (time priority key).
    pub arrival: Sequence,
}

impl Order {
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.remaining == 0
    }

    #[must_use]
    pub fn filled_qty(&self) -> Quantity {
        self.quantity - self.remaining
    }

    /// Whether this order would trade against a resting order at `price`.
    #[must_use]
    pub fn crosses(&self, price: Price) -> bool {
        match self.side {
            Side::Buy => self.price >= price,
            Side::Sell => self.price <= price,
        }
    }
}
