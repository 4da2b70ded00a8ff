//! Shared books keyed by market.
//!
//! Each book sits behind its own `parking_lot::RwLock`. An apply holds the
//! write lock for the whole event, so readers on other threads see the book
//! either before or after it, never in between. Books do not share locks.

use std::collections::BTreeMap;
use std::sync::Arc;

use booktrack_matchcore::Book;
use booktrack_types::{
    BookError, BookEvent, BookStats, DepthView, Ladder, MarketId, MatchReport, Price, Result,
    TopOfBook, TrackerConfig,
};
use parking_lot::{RwLock, RwLockReadGuard};

/// Cloneable, thread-safe handle to one book.
#[derive(Debug, Clone)]
pub struct BookHandle {
    market: MarketId,
    inner: Arc<RwLock<Book>>,
}

impl BookHandle {
    fn new(book: Book) -> Self {
        Self {
            market: book.market(),
            inner: Arc::new(RwLock::new(book)),
        }
    }

    #[must_use]
    pub fn market(&self) -> MarketId {
        self.market
    }

    /// Apply one event under the write lock.
    pub fn apply(&self, event: &BookEvent) -> Result<MatchReport> {
        self.inner.write().apply(event)
    }

    /// Read lock for queries that need several consistent reads.
    pub fn read(&self) -> RwLockReadGuard<'_, Book> {
        self.inner.read()
    }

    #[must_use]
    pub fn best_bid(&self) -> Option<Price> {
        self.inner.read().best_bid()
    }

    #[must_use]
    pub fn best_ask(&self) -> Option<Price> {
        self.inner.read().best_ask()
    }

    #[must_use]
    pub fn top_of_book(&self) -> TopOfBook {
        self.inner.read().top_of_book()
    }

    #[must_use]
    pub fn depth(&self, levels: usize) -> DepthView {
        self.inner.read().depth(levels)
    }

    #[must_use]
    pub fn ladder(&self, ticks: usize) -> Ladder {
        self.inner.read().ladder(ticks)
    }

    #[must_use]
    pub fn stats(&self) -> BookStats {
        self.inner.read().stats()
    }
}

/// All books tracked by one process, iterated in market order.
#[derive(Debug, Default)]
pub struct BookRegistry {
    books: BTreeMap<MarketId, BookHandle>,
}

impl BookRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// One empty book per configured market.
    pub fn from_config(config: &TrackerConfig) -> Result<Self> {
        config.validate()?;
        let mut registry = Self::new();
        for book in &config.markets {
            registry.register(Book::with_config(book))?;
        }
        Ok(registry)
    }

    /// Start tracking `book`.
    pub fn register(&mut self, book: Book) -> Result<BookHandle> {
        let market = book.market();
        if self.books.contains_key(&market) {
            return Err(BookError::DuplicateBook(market));
        }
        let handle = BookHandle::new(book);
        self.books.insert(market, handle.clone());
        tracing::info!(market = %market, "Book registered");
        Ok(handle)
    }

    /// Stop tracking a market. Outstanding handles stay usable.
    pub fn deregister(&mut self, market: MarketId) -> Result<BookHandle> {
        self.books
            .remove(&market)
            .ok_or(BookError::BookNotFound(market))
    }

    pub fn get(&self, market: MarketId) -> Result<&BookHandle> {
        self.books
            .get(&market)
            .ok_or(BookError::BookNotFound(market))
    }

    /// Route `event` to its market's book.
    pub fn apply(&self, event: &BookEvent) -> Result<MatchReport> {
        self.get(event.market)?.apply(event)
    }

    #[must_use]
    pub fn contains(&self, market: MarketId) -> bool {
        self.books.contains_key(&market)
    }

    pub fn markets(&self) -> impl Iterator<Item = MarketId> + '_ {
        self.books.keys().copied()
    }

    pub fn handles(&self) -> impl Iterator<Item = &BookHandle> {
        self.books.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.books.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use booktrack_types::{BookKey, EventScript, OwnerId};

    use super::*;

    fn book(market: u64) -> Book {
        Book::new(BookKey::new(OwnerId(1), MarketId(market)))
    }

    #[test]
    fn register_and_route() {
        let mut registry = BookRegistry::new();
        registry.register(book(1)).unwrap();
        registry.register(book(2)).unwrap();

        let mut script = EventScript::new(MarketId(2));
        registry.apply(&script.buy(1, 5, 10)).unwrap();

        assert_eq!(registry.get(MarketId(2)).unwrap().best_bid(), Some(Price(10)));
        assert_eq!(registry.get(MarketId(1)).unwrap().best_bid(), None);
        assert_eq!(registry.markets().collect::<Vec<_>>(), vec![MarketId(1), MarketId(2)]);
    }

    #[test]
    fn duplicate_book_rejected() {
        let mut registry = BookRegistry::new();
        registry.register(book(1)).unwrap();
        let err = registry.register(book(1)).unwrap_err();
        assert!(matches!(err, BookError::DuplicateBook(MarketId(1))));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unknown_market_rejected() {
        let registry = BookRegistry::new();
        let mut script = EventScript::new(MarketId(3));
        let err = registry.apply(&script.buy(1, 5, 10)).unwrap_err();
        assert!(matches!(err, BookError::BookNotFound(MarketId(3))));
    }

    #[test]
    fn deregister_keeps_handle_alive() {
        let mut registry = BookRegistry::new();
        let handle = registry.register(book(1)).unwrap();
        registry.deregister(MarketId(1)).unwrap();
        assert!(registry.is_empty());

        let mut script = EventScript::new(MarketId(1));
        handle.apply(&script.sell(1, 1, 10)).unwrap();
        assert_eq!(handle.best_ask(), Some(Price(10)));
        assert!(matches!(
            registry.deregister(MarketId(1)),
            Err(BookError::BookNotFound(_))
        ));
    }

    #[test]
    fn from_config_uses_origins() {
        let mut config = TrackerConfig::for_markets(OwnerId(1), [MarketId(1), MarketId(2)]);
        config.markets[1].sequence_origin = 10;
        let registry = BookRegistry::from_config(&config).unwrap();
        assert_eq!(registry.get(MarketId(2)).unwrap().read().next_sequence(), 10);
    }

    #[test]
    fn books_apply_in_parallel() {
        let mut registry = BookRegistry::new();
        let handles: Vec<BookHandle> = (1..=4)
            .map(|m| registry.register(book(m)).unwrap())
            .collect();

        thread::scope(|s| {
            for handle in &handles {
                s.spawn(move || {
                    let mut script = EventScript::new(handle.market());
                    for id in 0..100 {
                        handle.apply(&script.buy(id, 1, 10 + id % 5)).unwrap();
                    }
                });
            }
        });

        for handle in registry.handles() {
            assert_eq!(handle.read().order_count(), 100);
            assert_eq!(handle.read().next_sequence(), 100);
        }
    }
}
