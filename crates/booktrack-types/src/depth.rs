//! Aggregated, display-oriented views of a book.
//!
//! Nothing here is book state: views are rebuilt from the price levels on
//! every request and can be thrown away freely.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Price, Quantity};

/// Resting size aggregated at one price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthLevel {
    pub price: Price,
    pub quantity: Quantity,
    /// Number of orders resting at this price.
    pub orders: usize,
}

/// The populated price levels nearest the touch on each side.
///
/// Both vectors are ordered best first: bids descending, asks ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthView {
    pub bids: Vec<DepthLevel>,
    pub asks: Vec<DepthLevel>,
}

impl DepthView {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// Total size over the bid levels in view.
    #[must_use]
    pub fn bid_quantity(&self) -> u128 {
        self.bids.iter().map(|l| u128::from(l.quantity)).sum()
    }

    #[must_use]
    pub fn ask_quantity(&self) -> u128 {
        self.asks.iter().map(|l| u128::from(l.quantity)).sum()
    }

    /// Resting size at `price` on either side, `0` if the tick is empty.
    #[must_use]
    pub fn quantity_at(&self, price: Price) -> Quantity {
        self.bids
            .iter()
            .chain(self.asks.iter())
            .filter(|l| l.price == price)
            .map(|l| l.quantity)
            .sum()
    }
}

/// One row of a [`Ladder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LadderRow {
    pub price: Price,
    /// `0` when nothing rests at this tick.
    pub quantity: Quantity,
}

/// A tick-by-tick ladder around the touch, empty ticks included.
///
/// `asks` runs upward from the best ask, `bids` downward from the best bid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ladder {
    pub bids: Vec<LadderRow>,
    pub asks: Vec<LadderRow>,
}

impl Ladder {
    /// Builds a ladder of `ticks` rows per side.
    ///
    /// `depth` must hold at least `ticks` populated levels per side for
    /// every populated tick in range to show up; `depth(ticks)` always does.
    #[must_use]
    pub fn from_depth(depth: &DepthView, ticks: usize) -> Self {
        let mut ladder = Self::default();

        if let Some(best_ask) = depth.asks.first().map(|l| l.price) {
            for offset in 0..ticks as u64 {
                let Some(price) = best_ask.checked_up(offset) else {
                    break;
                };
                ladder.asks.push(LadderRow {
                    price,
                    quantity: depth.quantity_at(price),
                });
            }
        }

        if let Some(best_bid) = depth.bids.first().map(|l| l.price) {
            for offset in 0..ticks as u64 {
                let Some(price) = best_bid.checked_down(offset) else {
                    break;
                };
                ladder.bids.push(LadderRow {
                    price,
                    quantity: depth.quantity_at(price),
                });
            }
        }

        ladder
    }
}

impl fmt::Display for Ladder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "bids | price| asks")?;
        for row in self.asks.iter().rev() {
            if row.quantity == 0 {
                writeln!(f, "     | {:4} |", row.price.0)?;
            } else {
                writeln!(f, "     | {:4} | {:4}", row.price.0, row.quantity)?;
            }
        }
        writeln!(f, "-----+------+-----")?;
        for row in &self.bids {
            if row.quantity == 0 {
                writeln!(f, "     | {:4} |", row.price.0)?;
            } else {
                writeln!(f, "{:4} | {:4} |", row.quantity, row.price.0)?;
            }
        }
        Ok(())
    }
}
