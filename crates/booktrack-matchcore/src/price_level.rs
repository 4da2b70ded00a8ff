//! A single price level in the order book.
//!
//! Orders at the same price are stored in FIFO order (time priority)
//! using a [`VecDeque`].

use std::collections::VecDeque;

use booktrack_types::{Order, OrderId, Price, Quantity};

/// A single price level containing all orders at that price.
///
/// Orders are stored in arrival order (FIFO) -- the front of the deque
/// has the highest time priority and will be filled first.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    /// The price at this level.
    pub price: Price,
    /// Orders in time-priority order (front = oldest = highest priority).
    orders: VecDeque<Order>,
    /// Sum of `remaining` over `orders`, kept in step with every mutation.
    total: Quantity,
}

impl PriceLevel {
    /// Create a new empty price level.
    #[must_use]
    pub fn new(price: Price) -> Self {
        Self {
            price,
            orders: VecDeque::new(),
            total: 0,
        }
    }

    /// Whether `qty` more would still fit in the level total.
    #[must_use]
    pub fn can_accept(&self, qty: Quantity) -> bool {
        self.total.checked_add(qty).is_some()
    }

    /// Add an order to the back of this level (lowest time priority).
    ///
    /// Callers check [`PriceLevel::can_accept`] first.
    pub fn push_back(&mut self, order: Order) {
        debug_assert_eq!(order.price, self.price);
        self.total += order.remaining;
        self.orders.push_back(order);
    }

    /// Peek at the front order without removing it.
    #[must_use]
    pub fn front(&self) -> Option<&Order> {
        self.orders.front()
    }

    /// Reduce the front order by `qty`, popping it once nothing remains.
    ///
    /// Returns the front order's remaining size after the reduction.
    /// `qty` must not exceed the front order's remaining size.
    pub fn fill_front(&mut self, qty: Quantity) -> Option<Quantity> {
        let front = self.orders.front_mut()?;
        debug_assert!(qty <= front.remaining);
        front.remaining -= qty;
        self.total -= qty;
        let left = front.remaining;
        if left == 0 {
            self.orders.pop_front();
        }
        Some(left)
    }

    /// Total remaining quantity across all orders at this level.
    #[must_use]
    pub fn total_quantity(&self) -> Quantity {
        self.total
    }

    /// Remove a specific order by ID. Returns the removed order, or `None`.
    pub fn remove_order(&mut self, order_id: OrderId) -> Option<Order> {
        let pos = self.orders.iter().position(|o| o.id == order_id)?;
        let order = self.orders.remove(pos)?;
        self.total -= order.remaining;
        Some(order)
    }

    /// Look up an order resting at this level.
    #[must_use]
    pub fn get(&self, order_id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == order_id)
    }

    /// Orders from highest to lowest time priority.
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    /// Returns `true` if there are no orders at this level.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Number of orders at this level.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }
}
