//! Match output: fills, per-event reports, and running book statistics.
//!
//! A [`Fill`] is the immutable record of one execution between a resting
//! (maker) order and the order that crossed it (taker). Execution always
//! happens at the maker's price.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Order, OrderId, OwnerId, Price, Quantity, Sequence, Side};

/// A single execution produced by the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    /// The resting (earlier) order.
    pub maker_order_id: OrderId,
    pub maker_owner: OwnerId,
    /// The crossing (later) order.
    pub taker_order_id: OrderId,
    pub taker_owner: OwnerId,
    /// Which side the taker was on.
    pub taker_side: Side,
    /// Execution price: the maker's limit.
    pub price: Price,
    pub quantity: Quantity,
    /// The maker has no size left after this fill.
    pub maker_filled: bool,
    /// The taker has no size left after this fill.
    pub taker_filled: bool,
}

impl Fill {
    /// `price * quantity` in tick-contracts.
    #[must_use]
    pub fn notional(&self) -> u128 {
        u128::from(self.price.0) * u128::from(self.quantity)
    }

    /// `(buy order, sell order)` for the two participants.
    #[must_use]
    pub fn buy_sell_ids(&self) -> (OrderId, OrderId) {
        match self.taker_side {
            Side::Buy => (self.taker_order_id, self.maker_order_id),
            Side::Sell => (self.maker_order_id, self.taker_order_id),
        }
    }
}

impl fmt::Display for Fill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Fill[{} x {}] {} {} @ {}",
            self.taker_order_id, self.maker_order_id, self.taker_side, self.quantity, self.price,
        )
    }
}

/// Best prices and the resting size at each.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopOfBook {
    pub best_bid: Option<Price>,
    pub bid_size: Quantity,
    pub best_ask: Option<Price>,
    pub ask_size: Quantity,
}

impl TopOfBook {
    /// A book is crossed when the best bid is at or above the best ask.
    #[must_use]
    pub fn is_crossed(&self) -> bool {
        matches!((self.best_bid, self.best_ask), (Some(b), Some(a)) if b >= a)
    }
}

/// Result of one successfully applied event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchReport {
    /// Sequence number of the applied event.
    pub sequence: Sequence,
    /// Executions in the order they happened.
    pub fills: Vec<Fill>,
    /// What is left of an added order once matching stopped, if any.
    pub resting: Option<Order>,
    /// The order taken out by a remove event, with its remaining size.
    pub removed: Option<Order>,
    /// Top of book after the event.
    pub top: TopOfBook,
}

impl MatchReport {
    /// Total size executed by this event.
    #[must_use]
    pub fn executed_quantity(&self) -> Quantity {
        self.fills.iter().map(|f| f.quantity).sum()
    }
}

/// Running totals kept by a book since it was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookStats {
    /// Sum of sizes of all accepted add events.
    pub added_quantity: u128,
    /// Sum of remaining sizes taken out by remove events.
    pub removed_quantity: u128,
    /// Sum of fill quantities (each fill counted once).
    pub executed_quantity: u128,
    pub fill_count: u64,
    /// Sum of `price * quantity` over all fills.
    pub volume: u128,
    pub last_trade_price: Option<Price>,
    pub events_applied: u64,
}

impl BookStats {
    pub fn record_fill(&mut self, fill: &Fill) {
        self.executed_quantity += u128::from(fill.quantity);
        self.fill_count += 1;
        self.volume += fill.notional();
        self.last_trade_price = Some(fill.price);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_fill(taker_side: Side) -> Fill {
        Fill {
            maker_order_id: OrderId(1),
            maker_owner: OwnerId(10),
            taker_order_id: OrderId(2),
            taker_owner: OwnerId(20),
            taker_side,
            price: Price(10),
            quantity: 5,
            maker_filled: true,
            taker_filled: false,
        }
    }

    #[test]
    fn fill_notional() {
        assert_eq!(make_fill(Side::Sell).notional(), 50);
    }

    #[test]
    fn buy_sell_ids_follow_taker_side() {
        assert_eq!(
            make_fill(Side::Sell).buy_sell_ids(),
            (OrderId(1), OrderId(2))
        );
        assert_eq!(
            make_fill(Side::Buy).buy_sell_ids(),
            (OrderId(2), OrderId(1))
        );
    }

    #[test]
    fn fill_display() {
        let s = make_fill(Side::Sell).to_string();
        assert!(s.contains("SELL"));
        assert!(s.contains("@ 10"));
    }

    #[test]
    fn crossed_top_detection() {
        let mut top = TopOfBook {
            best_bid: Some(Price(10)),
            best_ask: Some(Price(11)),
            ..TopOfBook::default()
        };
        assert!(!top.is_crossed());
        top.best_ask = Some(Price(10));
        assert!(top.is_crossed());
        top.best_bid = None;
        assert!(!top.is_crossed());
    }

    #[test]
    fn stats_record_fill() {
        let mut stats = BookStats::default();
        stats.record_fill(&make_fill(Side::Sell));
        stats.record_fill(&make_fill(Side::Buy));
        assert_eq!(stats.fill_count, 2);
        assert_eq!(stats.executed_quantity, 10);
        assert_eq!(stats.volume, 100);
        assert_eq!(stats.last_trade_price, Some(Price(10)));
    }
}
