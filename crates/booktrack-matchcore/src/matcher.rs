//! Continuous price-time matcher.
//!
//! ```text
//! match_crossed(&mut OrderBook, taker) -> Vec<Fill>
//! ```
//!
//! The taker is the order that was just inserted. While it is the front of
//! its side and its limit crosses the best opposite price, it trades with
//! the front order of the opposite best level. The quantity is the smaller
//! remaining size and the price is the maker's limit. The maker is always
//! the resting order, whatever sequence number it arrived with. Orders that
//! reach zero leave the book immediately, so a fully matched order is never
//! observable as resting.

use booktrack_types::{Fill, OrderId};

use crate::OrderBook;

/// Match `taker` against the opposite side until it is filled or no longer
/// crosses. Returns fills in execution order; an uncrossed book yields an
/// empty list and is left untouched.
pub fn match_crossed(book: &mut OrderBook, taker: OrderId) -> Vec<Fill> {
    let mut fills = Vec::new();
    let Some(side) = book.get_order(taker).map(|o| o.side) else {
        return fills;
    };

    loop {
        let (Some(incoming), Some(resting)) =
            (book.best_order(side), book.best_order(side.opposite()))
        else {
            break;
        };
        if incoming.id != taker || !incoming.crosses(resting.price) {
            break;
        }

        let quantity = incoming.remaining.min(resting.remaining);
        let fill = Fill {
            maker_order_id: resting.id,
            maker_owner: resting.owner,
            taker_order_id: incoming.id,
            taker_owner: incoming.owner,
            taker_side: side,
            price: resting.price,
            quantity,
            maker_filled: resting.remaining == quantity,
            taker_filled: incoming.remaining == quantity,
        };

        // Both fronts exist, so neither call can miss.
        book.fill_best(side, quantity);
        book.fill_best(side.opposite(), quantity);

        tracing::debug!(
            market = %book.market,
            maker = %fill.maker_order_id,
            taker = %fill.taker_order_id,
            price = %fill.price,
            quantity = fill.quantity,
            "Fill"
        );
        fills.push(fill);
    }

    fills
}
