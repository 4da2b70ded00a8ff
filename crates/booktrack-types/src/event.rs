//! Book events as broadcast by the venue.
//!
//! The venue feed is loosely typed JSON; `booktrack-ingress` decodes it into
//! the closed [`BookEvent`] form below. Anything that does not fit one of the
//! two actions is rejected at that boundary, so the engine only ever sees
//! well-formed adds and removes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{MarketId, OrderId, OwnerId, Price, Quantity, Sequence, Side, Timestamp};

/// One sequenced mutation of a single market's book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookEvent {
    /// The market this event belongs to.
    pub market: MarketId,
    /// Per-book sequence number. Increases by one for every event.
    pub sequence: Sequence,
    /// What happened.
    #[serde(flatten)]
    pub action: EventAction,
}

/// The mutation carried by a [`BookEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EventAction {
    /// A new order was accepted by the venue.
    Add(AddOrder),
    /// A resting order was cancelled.
    Remove { order_id: OrderId },
}

/// Payload of an add event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOrder {
    pub order_id: OrderId,
    pub owner: OwnerId,
    pub timestamp: Timestamp,
    pub side: Side,
    pub size: Quantity,
    pub price: Price,
}

impl AddOrder {
    #[must_use]
    pub fn buy(order_id: u64, owner: u64, size: Quantity, price: u64) -> Self {
        Self::new(Side::Buy, order_id, owner, size, price)
    }

    #[must_use]
    pub fn sell(order_id: u64, owner: u64, size: Quantity, price: u64) -> Self {
        Self::new(Side::Sell, order_id, owner, size, price)
    }

    fn new(side: Side, order_id: u64, owner: u64, size: Quantity, price: u64) -> Self {
        Self {
            order_id: OrderId(order_id),
            owner: OwnerId(owner),
            timestamp: 0,
            side,
            size,
            price: Price(price),
        }
    }

    /// Sets the venue submission timestamp.
    #[must_use]
    pub fn at(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }
}

impl EventAction {
    /// Wire name of the action.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Add(_) => "add",
            Self::Remove { .. } => "remove",
        }
    }

    /// The order the action refers to.
    #[must_use]
    pub fn order_id(&self) -> OrderId {
        match self {
            Self::Add(add) => add.order_id,
            Self::Remove { order_id } => *order_id,
        }
    }
}

impl BookEvent {
    #[must_use]
    pub fn add(market: MarketId, sequence: Sequence, order: AddOrder) -> Self {
        Self {
            market,
            sequence,
            action: EventAction::Add(order),
        }
    }

    #[must_use]
    pub fn remove(market: MarketId, sequence: Sequence, order_id: OrderId) -> Self {
        Self {
            market,
            sequence,
            action: EventAction::Remove { order_id },
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.action.kind()
    }
}

impl fmt::Display for BookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.action {
            EventAction::Add(add) => write!(
                f,
                "#{} {} add {} {} {} @ {}",
                self.sequence, self.market, add.order_id, add.side, add.size, add.price
            ),
            EventAction::Remove { order_id } => {
                write!(f, "#{} {} remove {}", self.sequence, self.market, order_id)
            }
        }
    }
}

/// Builds a gap-free event stream for one market.
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Debug, Clone)]
pub struct EventScript {
    market: MarketId,
    next: Sequence,
    clock: Timestamp,
}

#[cfg(any(test, feature = "test-helpers"))]
impl EventScript {
    #[must_use]
    pub fn new(market: MarketId) -> Self {
        Self::starting_at(market, 0)
    }

    #[must_use]
    pub fn starting_at(market: MarketId, sequence: Sequence) -> Self {
        Self {
            market,
            next: sequence,
            clock: 0,
        }
    }

    /// The sequence number the next scripted event will carry.
    #[must_use]
    pub fn next_sequence(&self) -> Sequence {
        self.next
    }

    pub fn buy(&mut self, order_id: u64, size: Quantity, price: u64) -> BookEvent {
        let add = AddOrder::buy(order_id, 1, size, price);
        self.push_add(add)
    }

    pub fn sell(&mut self, order_id: u64, size: Quantity, price: u64) -> BookEvent {
        let add = AddOrder::sell(order_id, 1, size, price);
        self.push_add(add)
    }

    pub fn push_add(&mut self, add: AddOrder) -> BookEvent {
        self.clock += 1;
        let event = BookEvent::add(self.market, self.next, add.at(self.clock));
        self.next += 1;
        event
    }

    pub fn remove(&mut self, order_id: u64) -> BookEvent {
        let event = BookEvent::remove(self.market, self.next, OrderId(order_id));
        self.next += 1;
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names() {
        let add = BookEvent::add(MarketId(1), 0, AddOrder::buy(1, 1, 5, 10));
        let rm = BookEvent::remove(MarketId(1), 1, OrderId(1));
        assert_eq!(add.kind(), "add");
        assert_eq!(rm.kind(), "remove");
        assert_eq!(rm.action.order_id(), OrderId(1));
    }

    #[test]
    fn display_is_readable() {
        let add = BookEvent::add(MarketId(2), 4, AddOrder::sell(9, 1, 3, 12));
        assert_eq!(add.to_string(), "#4 market:2 add order:9 SELL 3 @ 12");
    }

    #[test]
    fn tagged_json_shape() {
        let event = BookEvent::remove(MarketId(1), 3, OrderId(8));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "remove");
        assert_eq!(json["order_id"], 8);
        assert_eq!(json["sequence"], 3);
    }

    #[test]
    fn script_stamps_consecutive_sequences() {
        let mut script = EventScript::new(MarketId(1));
        let a = script.buy(1, 5, 10);
        let b = script.sell(2, 7, 10);
        let c = script.remove(2);
        assert_eq!((a.sequence, b.sequence, c.sequence), (0, 1, 2));
        assert_eq!(script.next_sequence(), 3);
        match (&a.action, &b.action) {
            (EventAction::Add(x), EventAction::Add(y)) => assert!(x.timestamp < y.timestamp),
            _ => panic!("expected adds"),
        }
    }
}
