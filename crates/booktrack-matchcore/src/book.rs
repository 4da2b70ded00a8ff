//! The per-market book engine.
//!
//! A [`Book`] couples a [`SequenceValidator`] with an [`OrderBook`] and
//! applies venue events one at a time. Every check runs before the first
//! mutation, so an event is either applied completely (book mutated,
//! sequence advanced) or rejected with the book exactly as it was.

use std::fmt;

use booktrack_ingress::SequenceValidator;
use booktrack_types::{
    AddOrder, BookConfig, BookError, BookEvent, BookKey, BookStats, DepthView, EventAction,
    Ladder, MarketId, MatchReport, Order, OrderId, Price, Result, Sequence, TopOfBook, constants,
};

use crate::{OrderBook, PriceLevel, determinism, matcher};

/// One market's limit order book, rebuilt from its event stream.
#[derive(Debug, Clone)]
pub struct Book {
    key: BookKey,
    sequencer: SequenceValidator,
    orders: OrderBook,
    stats: BookStats,
}

impl Book {
    /// An empty book expecting sequence number 0 first.
    #[must_use]
    pub fn new(key: BookKey) -> Self {
        Self::starting_at(key, constants::DEFAULT_SEQUENCE_ORIGIN)
    }

    /// An empty book configured from `config`.
    #[must_use]
    pub fn with_config(config: &BookConfig) -> Self {
        Self::starting_at(config.key(), config.sequence_origin)
    }

    fn starting_at(key: BookKey, origin: Sequence) -> Self {
        Self {
            key,
            sequencer: SequenceValidator::new(key.market, origin),
            orders: OrderBook::new(key.market),
            stats: BookStats::default(),
        }
    }

    // =================================================================
    // Event application
    // =================================================================

    /// Apply the next event of the stream.
    ///
    /// Adds are matched against the opposite side until the book is no
    /// longer crossed. Removes take the order out with whatever size it
    /// still has and never match.
    ///
    /// # Errors
    /// - `MarketMismatch` / `Sequence` from the validator
    /// - `InvalidSize` for an add of size zero
    /// - `DuplicateOrder` for an add whose id is already resting
    /// - `LevelOverflow` for an add whose price level total would overflow
    /// - `OrderNotFound` for a remove of an order that is not resting
    ///
    /// On error nothing changes, including the expected sequence number.
    pub fn apply(&mut self, event: &BookEvent) -> Result<MatchReport> {
        self.sequencer.check(event)?;

        let report = match &event.action {
            EventAction::Add(add) => self.apply_add(event.sequence, add)?,
            EventAction::Remove { order_id } => self.apply_remove(event.sequence, *order_id)?,
        };

        self.sequencer.advance();
        self.stats.events_applied += 1;

        tracing::debug!(
            market = %self.key.market,
            sequence = event.sequence,
            kind = event.kind(),
            order = %event.action.order_id(),
            fills = report.fills.len(),
            "Event applied"
        );
        Ok(report)
    }

    fn apply_add(&mut self, sequence: Sequence, add: &AddOrder) -> Result<MatchReport> {
        if add.size == 0 {
            return Err(BookError::InvalidSize {
                order_id: add.order_id,
            });
        }
        if self.orders.contains_order(add.order_id) {
            return Err(BookError::DuplicateOrder(add.order_id));
        }

        self.orders.insert_order(Order {
            id: add.order_id,
            market: self.key.market,
            owner: add.owner,
            side: add.side,
            price: add.price,
            quantity: add.size,
            remaining: add.size,
            timestamp: add.timestamp,
            arrival: sequence,
        })?;
        self.stats.added_quantity += u128::from(add.size);

        let fills = matcher::match_crossed(&mut self.orders, add.order_id);
        for fill in &fills {
            self.stats.record_fill(fill);
        }

        Ok(MatchReport {
            sequence,
            fills,
            resting: self.orders.get_order(add.order_id).cloned(),
            removed: None,
            top: self.orders.top_of_book(),
        })
    }

    fn apply_remove(&mut self, sequence: Sequence, order_id: OrderId) -> Result<MatchReport> {
        let removed = self.orders.cancel_order(order_id)?;
        self.stats.removed_quantity += u128::from(removed.remaining);

        Ok(MatchReport {
            sequence,
            fills: Vec::new(),
            resting: None,
            removed: Some(removed),
            top: self.orders.top_of_book(),
        })
    }

    /// Jump the expected sequence number after the upstream collaborator
    /// rebuilt the book from a snapshot.
    pub fn resync(&mut self, next_sequence: Sequence) {
        self.sequencer.resync(next_sequence);
    }

    // =================================================================
    // Queries
    // =================================================================

    #[must_use]
    pub fn key(&self) -> BookKey {
        self.key
    }

    #[must_use]
    pub fn market(&self) -> MarketId {
        self.key.market
    }

    /// The sequence number the next event must carry.
    #[must_use]
    pub fn next_sequence(&self) -> Sequence {
        self.sequencer.next_sequence()
    }

    /// `true` if `event` was already applied to this book.
    #[must_use]
    pub fn is_stale(&self, event: &BookEvent) -> bool {
        self.sequencer.is_stale(event)
    }

    #[must_use]
    pub fn best_bid(&self) -> Option<Price> {
        self.orders.best_bid()
    }

    #[must_use]
    pub fn best_ask(&self) -> Option<Price> {
        self.orders.best_ask()
    }

    /// Ask minus bid in ticks; `None` unless both sides are populated.
    #[must_use]
    pub fn spread(&self) -> Option<u64> {
        self.orders.spread()
    }

    /// Midpoint of the touch in ticks.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mid_price(&self) -> Option<f64> {
        let bid = self.best_bid()?;
        let ask = self.best_ask()?;
        Some((bid.0 as f64 + ask.0 as f64) / 2.0)
    }

    #[must_use]
    pub fn top_of_book(&self) -> TopOfBook {
        self.orders.top_of_book()
    }

    /// Aggregated size of the `levels` populated prices nearest the touch.
    #[must_use]
    pub fn depth(&self, levels: usize) -> DepthView {
        self.orders.depth(levels)
    }

    /// Tick-contiguous ladder of `ticks` rows per side.
    #[must_use]
    pub fn ladder(&self, ticks: usize) -> Ladder {
        // At most `ticks` populated levels fit in `ticks` ticks.
        Ladder::from_depth(&self.orders.depth(ticks), ticks)
    }

    #[must_use]
    pub fn stats(&self) -> BookStats {
        self.stats
    }

    #[must_use]
    pub fn order_count(&self) -> usize {
        self.orders.order_count()
    }

    #[must_use]
    pub fn get_order(&self, order_id: OrderId) -> Option<&Order> {
        self.orders.get_order(order_id)
    }

    #[must_use]
    pub fn contains_order(&self, order_id: OrderId) -> bool {
        self.orders.contains_order(order_id)
    }

    pub fn bid_levels(&self) -> impl Iterator<Item = &PriceLevel> {
        self.orders.bid_levels()
    }

    pub fn ask_levels(&self) -> impl Iterator<Item = &PriceLevel> {
        self.orders.ask_levels()
    }

    /// Read access to the underlying queues.
    #[must_use]
    pub fn order_book(&self) -> &OrderBook {
        &self.orders
    }

    /// SHA-256 over the key, the expected sequence, and every resting order.
    #[must_use]
    pub fn digest(&self) -> [u8; 32] {
        determinism::compute_book_digest(self.key, self.next_sequence(), &self.orders)
    }

    /// [`Book::digest`] as lowercase hex.
    #[must_use]
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest())
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} next={}", self.key, self.next_sequence())?;
        write!(f, "{}", self.ladder(constants::DEFAULT_DEPTH_LEVELS))
    }
}

#[cfg(test)]
mod tests {
    use booktrack_types::{EventScript, OwnerId, Side};

    use super::*;

    const MARKET: MarketId = MarketId(1);

    fn new_book() -> Book {
        Book::new(BookKey::new(OwnerId(1), MARKET))
    }

    #[test]
    fn add_rests_without_cross() {
        let mut book = new_book();
        let mut script = EventScript::new(MARKET);
        let report = book.apply(&script.buy(1, 5, 10)).unwrap();

        assert!(report.fills.is_empty());
        assert_eq!(report.resting.as_ref().unwrap().remaining, 5);
        assert_eq!(report.top.best_bid, Some(Price(10)));
        assert_eq!(book.next_sequence(), 1);
        assert_eq!(book.stats().events_applied, 1);
    }

    #[test]
    fn zero_size_rejected_without_advancing() {
        let mut book = new_book();
        let event = BookEvent::add(MARKET, 0, AddOrder::buy(1, 1, 0, 10));
        let err = book.apply(&event).unwrap_err();
        assert!(matches!(err, BookError::InvalidSize { order_id } if order_id == OrderId(1)));
        assert_eq!(book.next_sequence(), 0);
        assert_eq!(book.order_count(), 0);
    }

    #[test]
    fn duplicate_resting_id_rejected() {
        let mut book = new_book();
        let mut script = EventScript::new(MARKET);
        book.apply(&script.buy(1, 5, 10)).unwrap();
        let digest = book.digest();

        let err = book.apply(&script.sell(1, 5, 20)).unwrap_err();
        assert!(matches!(err, BookError::DuplicateOrder(OrderId(1))));
        assert_eq!(book.digest(), digest);
        assert_eq!(book.next_sequence(), 1);
    }

    #[test]
    fn remove_reports_remaining_size() {
        let mut book = new_book();
        let mut script = EventScript::new(MARKET);
        book.apply(&script.sell(1, 5, 10)).unwrap();
        book.apply(&script.buy(2, 2, 10)).unwrap();

        let report = book.apply(&script.remove(1)).unwrap();
        let removed = report.removed.unwrap();
        assert_eq!(removed.remaining, 3);
        assert_eq!(removed.filled_qty(), 2);
        assert_eq!(book.stats().removed_quantity, 3);
        assert!(book.best_ask().is_none());
    }

    #[test]
    fn stats_track_volume_and_last_price() {
        let mut book = new_book();
        let mut script = EventScript::new(MARKET);
        book.apply(&script.sell(1, 2, 10)).unwrap();
        book.apply(&script.sell(2, 2, 11)).unwrap();
        book.apply(&script.buy(3, 3, 12)).unwrap();

        let stats = book.stats();
        assert_eq!(stats.added_quantity, 7);
        assert_eq!(stats.executed_quantity, 3);
        assert_eq!(stats.fill_count, 2);
        assert_eq!(stats.volume, 2 * 10 + 11);
        assert_eq!(stats.last_trade_price, Some(Price(11)));
    }

    #[test]
    fn with_config_uses_origin() {
        let mut config = BookConfig::new(OwnerId(4), MARKET);
        config.sequence_origin = 50;
        let mut book = Book::with_config(&config);
        assert_eq!(book.next_sequence(), 50);

        let mut script = EventScript::starting_at(MARKET, 50);
        book.apply(&script.buy(1, 1, 1)).unwrap();
        assert_eq!(book.next_sequence(), 51);
    }

    #[test]
    fn spread_and_mid() {
        let mut book = new_book();
        let mut script = EventScript::new(MARKET);
        assert!(book.mid_price().is_none());
        book.apply(&script.buy(1, 1, 10)).unwrap();
        book.apply(&script.sell(2, 1, 13)).unwrap();
        assert_eq!(book.spread(), Some(3));
        assert_eq!(book.mid_price(), Some(11.5));
    }

    #[test]
    fn resync_accepts_new_cursor() {
        let mut book = new_book();
        book.resync(10);
        let event = BookEvent::add(MARKET, 10, AddOrder::sell(1, 1, 1, 5));
        book.apply(&event).unwrap();
        assert!(book.is_stale(&event));
    }

    #[test]
    fn level_overflow_rejected_without_advancing() {
        let mut book = new_book();
        let big = i64::MAX.unsigned_abs();
        for (seq, id) in [(0, 1), (1, 2)] {
            let event = BookEvent::add(MARKET, seq, AddOrder::buy(id, 1, big, 10));
            book.apply(&event).unwrap();
        }
        let digest = book.digest();

        let event = BookEvent::add(MARKET, 2, AddOrder::buy(3, 1, big, 10));
        let err = book.apply(&event).unwrap_err();
        assert!(matches!(err, BookError::LevelOverflow { order_id: OrderId(3), price: Price(10) }));
        assert_eq!(book.next_sequence(), 2);
        assert_eq!(book.digest(), digest);
        assert!(!book.contains_order(OrderId(3)));
        assert_eq!(book.stats().added_quantity, 2 * u128::from(big));
    }

    #[test]
    fn maker_is_resting_order_after_resync_rewind() {
        let mut book = new_book();
        book.resync(5);
        book.apply(&BookEvent::add(MARKET, 5, AddOrder::sell(1, 1, 2, 10)))
            .unwrap();
        book.resync(0);

        let report = book
            .apply(&BookEvent::add(MARKET, 0, AddOrder::buy(2, 2, 2, 15)))
            .unwrap();
        assert_eq!(report.fills.len(), 1);
        let fill = &report.fills[0];
        assert_eq!(fill.price, Price(10));
        assert_eq!(fill.maker_order_id, OrderId(1));
        assert_eq!(fill.taker_order_id, OrderId(2));
        assert_eq!(fill.taker_side, Side::Buy);
        assert!(book.order_book().is_empty());
    }

    #[test]
    fn display_renders_ladder() {
        let mut book = new_book();
        let mut script = EventScript::new(MARKET);
        book.apply(&script.buy(1, 5, 10)).unwrap();
        let text = book.to_string();
        assert!(text.starts_with("market:1@owner:1 next=1\nbids | price| asks\n"));
        assert!(text.contains("   5 |   10 |"));
    }

    #[test]
    fn report_top_matches_queries() {
        let mut book = new_book();
        let mut script = EventScript::new(MARKET);
        let report = book.apply(&script.sell(1, 4, 20)).unwrap();
        assert_eq!(report.top, book.top_of_book());
        assert_eq!(report.top.ask_size, 4);
        assert!(book.get_order(OrderId(1)).is_some_and(|o| o.side == Side::Sell));
    }
}
