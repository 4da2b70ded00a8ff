//! Wire decoding of venue book events.
//!
//! The venue broadcasts one JSON object per event:
//!
//! ```json
//! {"type":"add","market":1,"sequence":0,"timestamp":1,"user_id":7,"id":1,"side":"buy","size":5,"price":10}
//! {"type":"remove","market":1,"sequence":2,"id":1}
//! ```
//!
//! Field names vary between feed versions, so common aliases are accepted
//! (`kind`, `market_id`/`book_id`/`book`, `tick`, `time`, `order_id`/`oid`,
//! `owner_id`/`user`, `quantity`). Older feeds carry the side as a boolean:
//!
//! ```json
//! {"type":"add","book":1,"tick":0,"time":1,"user":7,"id":1,"is_buy":true,"quantity":5,"price":10}
//! ```
//!
//! The payload is validated into a [`BookEvent`] here; nothing loosely typed
//! travels further.

use booktrack_types::{
    AddOrder, BookError, BookEvent, MarketId, OrderId, OwnerId, Price, Quantity, Result, Side,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The event exactly as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireEvent {
    #[serde(rename = "type", alias = "kind")]
    pub kind: String,
    #[serde(alias = "market_id", alias = "book_id", alias = "book")]
    pub market: u64,
    #[serde(alias = "tick")]
    pub sequence: u64,
    #[serde(default, alias = "order_id", alias = "oid")]
    pub id: Option<u64>,
    #[serde(default, alias = "owner_id", alias = "user")]
    pub user_id: Option<u64>,
    #[serde(default, alias = "time")]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub side: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_buy: Option<bool>,
    #[serde(default, alias = "quantity")]
    pub size: Option<i128>,
    #[serde(default)]
    pub price: Option<i128>,
}

/// Decode one JSON line into a typed event.
///
/// # Errors
/// - `Serialization` if the line is not JSON
/// - `UnknownEventKind` if the `type` is neither `add` nor `remove`
/// - `MalformedEvent` if a field is missing or has the wrong shape
/// - `InvalidSize` if an add carries a size of zero or less
pub fn decode_event(line: &str) -> Result<BookEvent> {
    let value: Value = serde_json::from_str(line)?;
    decode_value(value)
}

/// Decode an already-parsed JSON value into a typed event.
pub fn decode_value(value: Value) -> Result<BookEvent> {
    // Reject unknown kinds before field validation so that e.g. a
    // `resolve` event is reported as what it is.
    if let Some(kind) = value.get("type").or_else(|| value.get("kind")) {
        match kind.as_str() {
            Some("add" | "remove") => {}
            Some(other) => return Err(BookError::UnknownEventKind(other.to_string())),
            None => return Err(malformed("`type` must be a string")),
        }
    }

    let wire: WireEvent =
        serde_json::from_value(value).map_err(|e| malformed(e.to_string()))?;
    BookEvent::try_from(wire)
}

impl TryFrom<WireEvent> for BookEvent {
    type Error = BookError;

    fn try_from(wire: WireEvent) -> Result<Self> {
        let market = MarketId(wire.market);
        let order_id = OrderId(wire.id.ok_or_else(|| malformed("missing `id`"))?);

        match wire.kind.as_str() {
            "add" => {
                let side = parse_side(wire.side.as_deref(), wire.is_buy)?;
                let owner = wire.user_id.ok_or_else(|| malformed("missing `user_id`"))?;
                let timestamp = wire
                    .timestamp
                    .ok_or_else(|| malformed("missing `timestamp`"))?;
                let size = wire.size.ok_or_else(|| malformed("missing `size`"))?;
                let size = Quantity::try_from(size)
                    .ok()
                    .filter(|s| *s > 0)
                    .ok_or(BookError::InvalidSize { order_id })?;
                let price = wire.price.ok_or_else(|| malformed("missing `price`"))?;
                let price = u64::try_from(price)
                    .map_err(|_| malformed(format!("price {price} out of range")))?;

                Ok(BookEvent::add(
                    market,
                    wire.sequence,
                    AddOrder {
                        order_id,
                        owner: OwnerId(owner),
                        timestamp,
                        side,
                        size,
                        price: Price(price),
                    },
                ))
            }
            "remove" => Ok(BookEvent::remove(market, wire.sequence, order_id)),
            other => Err(BookError::UnknownEventKind(other.to_string())),
        }
    }
}

/// `side` wins when both it and `is_buy` are present.
fn parse_side(side: Option<&str>, is_buy: Option<bool>) -> Result<Side> {
    match (side, is_buy) {
        (Some(s), _) if s.eq_ignore_ascii_case("buy") => Ok(Side::Buy),
        (Some(s), _) if s.eq_ignore_ascii_case("sell") => Ok(Side::Sell),
        (Some(s), _) => Err(malformed(format!("unknown side `{s}`"))),
        (None, Some(true)) => Ok(Side::Buy),
        (None, Some(false)) => Ok(Side::Sell),
        (None, None) => Err(malformed("missing `side`")),
    }
}

fn malformed(reason: impl Into<String>) -> BookError {
    BookError::MalformedEvent {
        reason: reason.into(),
    }
}
