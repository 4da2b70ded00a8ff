//! Integration test: reference book scenarios
//!
//! A single market driven through the canonical add / cross / remove
//! sequence, plus the rejection paths and the matching edge cases.

use booktrack_matchcore::Book;
use booktrack_types::*;

const MARKET: MarketId = MarketId(1);

fn new_book() -> Book {
    Book::new(BookKey::new(OwnerId(1), MARKET))
}

fn add(seq: Sequence, side: Side, id: u64, size: Quantity, price: u64) -> BookEvent {
    let order = match side {
        Side::Buy => AddOrder::buy(id, 100 + id, size, price),
        Side::Sell => AddOrder::sell(id, 100 + id, size, price),
    };
    BookEvent::add(MARKET, seq, order.at(i64::try_from(seq).unwrap()))
}

fn remove(seq: Sequence, id: u64) -> BookEvent {
    BookEvent::remove(MARKET, seq, OrderId(id))
}

#[test]
fn add_cross_remove_walkthrough() {
    let mut book = new_book();

    // Resting buy on an empty book.
    let report = book.apply(&add(0, Side::Buy, 1, 5, 10)).unwrap();
    assert!(report.fills.is_empty());
    assert_eq!(book.best_bid(), Some(Price(10)));
    assert_eq!(book.best_ask(), None);

    // A larger sell at the same price takes the whole bid and rests the rest.
    let report = book.apply(&add(1, Side::Sell, 2, 7, 10)).unwrap();
    assert_eq!(report.fills.len(), 1);
    let fill = report.fills[0];
    assert_eq!(fill.maker_order_id, OrderId(1));
    assert_eq!(fill.taker_order_id, OrderId(2));
    assert_eq!(fill.quantity, 5);
    assert_eq!(fill.price, Price(10));
    assert!(fill.maker_filled);
    assert!(!book.contains_order(OrderId(1)));
    assert_eq!(book.get_order(OrderId(2)).unwrap().remaining, 2);
    assert_eq!(report.resting.unwrap().remaining, 2);
    assert_eq!(book.best_bid(), None);
    assert_eq!(book.best_ask(), Some(Price(10)));

    // Removing the remainder empties the book.
    let report = book.apply(&remove(2, 2)).unwrap();
    assert_eq!(report.removed.unwrap().remaining, 2);
    assert_eq!(book.best_bid(), None);
    assert_eq!(book.best_ask(), None);
    assert_eq!(book.order_count(), 0);
    assert_eq!(book.next_sequence(), 3);

    // Removing an id that never existed fails and does not advance.
    let err = book.apply(&remove(3, 99)).unwrap_err();
    assert!(matches!(err, BookError::OrderNotFound(OrderId(99))));
    assert_eq!(book.next_sequence(), 3);
    assert_eq!(book.order_count(), 0);

    // The same sequence number is still accepted afterwards.
    book.apply(&add(3, Side::Buy, 3, 1, 9)).unwrap();
    assert_eq!(book.next_sequence(), 4);
}

#[test]
fn sequence_gap_rejected() {
    let mut book = new_book();
    let err = book.apply(&add(5, Side::Buy, 1, 5, 10)).unwrap_err();
    assert!(matches!(
        err,
        BookError::Sequence {
            expected: 0,
            actual: 5
        }
    ));
    assert!(err.requires_resync());
    assert_eq!(book.next_sequence(), 0);
    assert_eq!(book.order_count(), 0);
    assert_eq!(book.best_bid(), None);
}

#[test]
fn fifo_priority_within_price() {
    let mut book = new_book();
    book.apply(&add(0, Side::Buy, 1, 3, 10)).unwrap();
    book.apply(&add(1, Side::Buy, 2, 4, 10)).unwrap();

    let report = book.apply(&add(2, Side::Sell, 3, 5, 10)).unwrap();
    let trace: Vec<(OrderId, Quantity)> = report
        .fills
        .iter()
        .map(|f| (f.maker_order_id, f.quantity))
        .collect();
    assert_eq!(trace, vec![(OrderId(1), 3), (OrderId(2), 2)]);
    assert!(!book.contains_order(OrderId(1)));
    assert!(!book.contains_order(OrderId(3)));
    assert_eq!(book.get_order(OrderId(2)).unwrap().remaining, 2);
    assert_eq!(book.best_bid(), Some(Price(10)));
    assert_eq!(book.best_ask(), None);
}

#[test]
fn duplicate_sequence_rejected() {
    let mut book = new_book();
    book.apply(&add(0, Side::Buy, 1, 5, 10)).unwrap();
    let err = book.apply(&add(0, Side::Buy, 2, 5, 10)).unwrap_err();
    assert!(matches!(
        err,
        BookError::Sequence {
            expected: 1,
            actual: 0
        }
    ));
    assert_eq!(book.order_count(), 1);
}

#[test]
fn wrong_market_rejected() {
    let mut book = new_book();
    let event = BookEvent::add(MarketId(2), 0, AddOrder::buy(1, 1, 5, 10));
    let err = book.apply(&event).unwrap_err();
    assert!(matches!(err, BookError::MarketMismatch { .. }));
    assert_eq!(book.next_sequence(), 0);
}

#[test]
fn fully_matched_order_never_rests() {
    let mut book = new_book();
    book.apply(&add(0, Side::Sell, 1, 5, 10)).unwrap();
    let report = book.apply(&add(1, Side::Buy, 2, 5, 11)).unwrap();

    assert!(report.resting.is_none());
    assert!(report.fills[0].taker_filled);
    assert!(book.get_order(OrderId(2)).is_none());
    assert!(book.bid_levels().next().is_none());
    assert!(book.ask_levels().next().is_none());
}

#[test]
fn zero_size_rejected() {
    let mut book = new_book();
    let err = book.apply(&add(0, Side::Sell, 1, 0, 10)).unwrap_err();
    assert!(matches!(err, BookError::InvalidSize { .. }));
    assert_eq!(book.next_sequence(), 0);
}

#[test]
fn price_tie_executes_at_resting_price() {
    let mut book = new_book();
    book.apply(&add(0, Side::Sell, 1, 2, 10)).unwrap();
    let report = book.apply(&add(1, Side::Buy, 2, 2, 10)).unwrap();
    assert_eq!(report.fills[0].price, Price(10));

    // An aggressive buy pays the resting ask, not its own limit.
    book.apply(&add(2, Side::Sell, 3, 2, 10)).unwrap();
    let report = book.apply(&add(3, Side::Buy, 4, 2, 15)).unwrap();
    assert_eq!(report.fills[0].price, Price(10));
}

#[test]
fn remove_after_partial_fill_takes_remainder_only() {
    let mut book = new_book();
    book.apply(&add(0, Side::Buy, 1, 10, 10)).unwrap();
    book.apply(&add(1, Side::Sell, 2, 4, 9)).unwrap();

    let report = book.apply(&remove(2, 1)).unwrap();
    let removed = report.removed.unwrap();
    assert_eq!(removed.remaining, 6);
    assert_eq!(removed.quantity, 10);

    let stats = book.stats();
    assert_eq!(stats.added_quantity, 14);
    assert_eq!(stats.executed_quantity, 4);
    assert_eq!(stats.removed_quantity, 6);
}

#[test]
fn depth_and_ladder_views() {
    let mut book = new_book();
    book.apply(&add(0, Side::Buy, 1, 5, 10)).unwrap();
    book.apply(&add(1, Side::Buy, 2, 3, 8)).unwrap();
    book.apply(&add(2, Side::Sell, 3, 7, 12)).unwrap();

    let depth = book.depth(5);
    assert_eq!(depth.bid_quantity(), 8);
    assert_eq!(depth.ask_quantity(), 7);

    let ladder = book.ladder(3);
    let bids: Vec<(u64, Quantity)> = ladder.bids.iter().map(|r| (r.price.0, r.quantity)).collect();
    assert_eq!(bids, vec![(10, 5), (9, 0), (8, 3)]);
    let asks: Vec<(u64, Quantity)> = ladder.asks.iter().map(|r| (r.price.0, r.quantity)).collect();
    assert_eq!(asks, vec![(12, 7), (13, 0), (14, 0)]);

    // Queries do not change anything.
    assert_eq!(book.depth(5), depth);
    assert_eq!(book.next_sequence(), 3);
}
