//! # booktrack-matchcore
//!
//! **Pure deterministic order book engine.**
//!
//! MatchCore rebuilds one market's book from the venue's sequenced event
//! stream. It has:
//!
//! - **Zero side effects**: no I/O, no clocks, no locks
//! - **Deterministic output**: same event stream -> same fills, same state
//! - **Strict price-time priority**: best price first, FIFO within a price
//! - **Validate-then-apply**: a rejected event leaves the book untouched
//!
//! ```text
//! Book::apply(BookEvent)
//!   -> SequenceValidator::check()     (booktrack-ingress)
//!   -> OrderBook::insert / remove
//!   -> matcher::match_crossed()       (adds only)
//!   -> MatchReport
//! ```

pub mod book;
pub mod determinism;
pub mod matcher;
pub mod orderbook;
pub mod price_level;

pub use book::Book;
pub use determinism::{compute_book_digest, compute_fill_root, verify_fill_root};
pub use matcher::match_crossed;
pub use orderbook::OrderBook;
pub use price_level::PriceLevel;
