//! The resting-order state of a single market.
//!
//! Uses `BTreeMap` for price-level ordering:
//! - **Bids** (buys): `BTreeMap<Reverse<Price>, PriceLevel>` -- highest price first
//! - **Asks** (sells): `BTreeMap<Price, PriceLevel>` -- lowest price first
//!
//! An auxiliary `HashMap<OrderId, (Side, Price)>` finds an order's level
//! without scanning either side.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use booktrack_types::{
    BookError, DepthLevel, DepthView, MarketId, Order, OrderId, Price, Quantity, Result, Side,
    TopOfBook,
};

use crate::price_level::PriceLevel;

/// The order book for a single market.
#[derive(Debug, Clone)]
pub struct OrderBook {
    /// The market this book serves.
    pub market: MarketId,
    /// Buy side: highest price first (`Reverse` key).
    bids: BTreeMap<Reverse<Price>, PriceLevel>,
    /// Sell side: lowest price first.
    asks: BTreeMap<Price, PriceLevel>,
    /// Fast lookup: `OrderId -> (side, price)`.
    index: HashMap<OrderId, (Side, Price)>,
}

impl OrderBook {
    /// Create a new empty order book for the given market.
    #[must_use]
    pub fn new(market: MarketId) -> Self {
        Self {
            market,
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            index: HashMap::new(),
        }
    }

    // =================================================================
    // Insertion
    // =================================================================

    /// Append an order to the back of its price level.
    ///
    /// Both checks run before anything is touched, so a rejected order
    /// leaves the book unchanged.
    pub fn insert_order(&mut self, order: Order) -> Result<()> {
        if self.index.contains_key(&order.id) {
            return Err(BookError::DuplicateOrder(order.id));
        }

        let price = order.price;
        let level = match order.side {
            Side::Buy => self.bids.get(&Reverse(price)),
            Side::Sell => self.asks.get(&price),
        };
        if level.is_some_and(|l| !l.can_accept(order.remaining)) {
            return Err(BookError::LevelOverflow {
                order_id: order.id,
                price,
            });
        }

        self.index.insert(order.id, (order.side, price));

        match order.side {
            Side::Buy => {
                self.bids
                    .entry(Reverse(price))
                    .or_insert_with(|| PriceLevel::new(price))
                    .push_back(order);
            }
            Side::Sell => {
                self.asks
                    .entry(price)
                    .or_insert_with(|| PriceLevel::new(price))
                    .push_back(order);
            }
        }
        Ok(())
    }

    // =================================================================
    // Cancellation
    // =================================================================

    /// Remove an order by ID. Returns the removed order with whatever size
    /// it still had.
    pub fn cancel_order(&mut self, order_id: OrderId) -> Result<Order> {
        let (side, price) = *self
            .index
            .get(&order_id)
            .ok_or(BookError::OrderNotFound(order_id))?;

        let order = match side {
            Side::Buy => {
                let level = self
                    .bids
                    .get_mut(&Reverse(price))
                    .ok_or(BookError::OrderNotFound(order_id))?;
                let order = level
                    .remove_order(order_id)
                    .ok_or(BookError::OrderNotFound(order_id))?;
                if level.is_empty() {
                    self.bids.remove(&Reverse(price));
                }
                order
            }
            Side::Sell => {
                let level = self
                    .asks
                    .get_mut(&price)
                    .ok_or(BookError::OrderNotFound(order_id))?;
                let order = level
                    .remove_order(order_id)
                    .ok_or(BookError::OrderNotFound(order_id))?;
                if level.is_empty() {
                    self.asks.remove(&price);
                }
                order
            }
        };

        self.index.remove(&order_id);
        Ok(order)
    }

    // =================================================================
    // Matching primitives
    // =================================================================

    /// The highest-priority order on `side`: front of the best level.
    #[must_use]
    pub fn best_order(&self, side: Side) -> Option<&Order> {
        match side {
            Side::Buy => self.bids.values().next()?.front(),
            Side::Sell => self.asks.values().next()?.front(),
        }
    }

    /// Execute `qty` against the highest-priority order on `side`.
    ///
    /// A fully filled order leaves the book (and the index) immediately, and
    /// an emptied level is dropped. Returns the order's remaining size.
    pub fn fill_best(&mut self, side: Side, qty: Quantity) -> Option<Quantity> {
        let (left, id, emptied) = match side {
            Side::Buy => {
                let mut entry = self.bids.first_entry()?;
                let id = entry.get().front()?.id;
                let left = entry.get_mut().fill_front(qty)?;
                let emptied = entry.get().is_empty();
                if emptied {
                    entry.remove();
                }
                (left, id, emptied)
            }
            Side::Sell => {
                let mut entry = self.asks.first_entry()?;
                let id = entry.get().front()?.id;
                let left = entry.get_mut().fill_front(qty)?;
                let emptied = entry.get().is_empty();
                if emptied {
                    entry.remove();
                }
                (left, id, emptied)
            }
        };
        if left == 0 {
            self.index.remove(&id);
        }
        debug_assert!(!emptied || left == 0);
        Some(left)
    }

    // =================================================================
    // Queries
    // =================================================================

    /// Best (highest) bid price, or `None` if no bids.
    #[must_use]
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.keys().next().map(|r| r.0)
    }

    /// Best (lowest) ask price, or `None` if no asks.
    #[must_use]
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.keys().next().copied()
    }

    /// Spread = best_ask - best_bid. `None` if either side is empty or the
    /// book is crossed.
    #[must_use]
    pub fn spread(&self) -> Option<u64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => ask.0.checked_sub(bid.0),
            _ => None,
        }
    }

    /// Best prices with the resting size at each.
    #[must_use]
    pub fn top_of_book(&self) -> TopOfBook {
        let bid = self.bids.values().next();
        let ask = self.asks.values().next();
        TopOfBook {
            best_bid: bid.map(|l| l.price),
            bid_size: bid.map_or(0, PriceLevel::total_quantity),
            best_ask: ask.map(|l| l.price),
            ask_size: ask.map_or(0, PriceLevel::total_quantity),
        }
    }

    /// Aggregated size for the `levels` populated prices nearest the touch
    /// on each side.
    #[must_use]
    pub fn depth(&self, levels: usize) -> DepthView {
        let aggregate = |level: &PriceLevel| DepthLevel {
            price: level.price,
            quantity: level.total_quantity(),
            orders: level.len(),
        };
        DepthView {
            bids: self.bids.values().take(levels).map(aggregate).collect(),
            asks: self.asks.values().take(levels).map(aggregate).collect(),
        }
    }

    /// Total number of orders currently in the book.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.index.len()
    }

    /// Number of distinct bid price levels.
    #[must_use]
    pub fn bid_depth(&self) -> usize {
        self.bids.len()
    }

    /// Number of distinct ask price levels.
    #[must_use]
    pub fn ask_depth(&self) -> usize {
        self.asks.len()
    }

    /// Returns `true` if the book has no orders on either side.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Check if an order exists in the book.
    #[must_use]
    pub fn contains_order(&self, order_id: OrderId) -> bool {
        self.index.contains_key(&order_id)
    }

    /// Look up a resting order.
    #[must_use]
    pub fn get_order(&self, order_id: OrderId) -> Option<&Order> {
        let (side, price) = self.index.get(&order_id)?;
        match side {
            Side::Buy => self.bids.get(&Reverse(*price))?.get(order_id),
            Side::Sell => self.asks.get(price)?.get(order_id),
        }
    }

    /// Sum of remaining size over every resting order.
    #[must_use]
    pub fn resting_quantity(&self) -> u128 {
        self.bids
            .values()
            .chain(self.asks.values())
            .map(|l| u128::from(l.total_quantity()))
            .sum()
    }

    // =================================================================
    // Iteration
    // =================================================================

    /// Iterate bid levels from best (highest) to worst.
    pub fn bid_levels(&self) -> impl Iterator<Item = &PriceLevel> {
        self.bids.values()
    }

    /// Iterate ask levels from best (lowest) to worst.
    pub fn ask_levels(&self) -> impl Iterator<Item = &PriceLevel> {
        self.asks.values()
    }

    /// Every resting order on `side` in priority order.
    pub fn orders(&self, side: Side) -> Box<dyn Iterator<Item = &Order> + '_> {
        match side {
            Side::Buy => Box::new(self.bids.values().flat_map(PriceLevel::iter)),
            Side::Sell => Box::new(self.asks.values().flat_map(PriceLevel::iter)),
        }
    }
}
