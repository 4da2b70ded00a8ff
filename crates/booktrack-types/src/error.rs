//! Error types for booktrack.
//!
//! All errors use the `BT_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Event stream errors (sequencing, routing, decoding)
//! - 2xx: Order errors
//! - 3xx: Registry / lane errors
//! - 9xx: General / internal errors
//!
//! Every error is raised before the target book is touched, so a failed
//! call never leaves a book half-updated.

use thiserror::Error;

use crate::{MarketId, OrderId, Price, Sequence};

/// Central error enum for all booktrack operations.
#[derive(Debug, Error)]
pub enum BookError {
    // =================================================================
    // Event Stream Errors (1xx)
    // =================================================================
    /// The event is out of order: a gap or a duplicate.
    #[error("BT_ERR_100: Sequence error: expected {expected}, got {actual}")]
    Sequence { expected: Sequence, actual: Sequence },

    /// The event was routed to the book of another market.
    #[error("BT_ERR_101: Market mismatch: book tracks {expected}, event is for {actual}")]
    MarketMismatch { expected: MarketId, actual: MarketId },

    /// The event kind is neither `add` nor `remove`.
    #[error("BT_ERR_102: Unknown event kind: {0}")]
    UnknownEventKind(String),

    /// The event is missing a field or carries a value of the wrong shape.
    #[error("BT_ERR_103: Malformed event: {reason}")]
    MalformedEvent { reason: String },

    // =================================================================
    // Order Errors (2xx)
    // =================================================================
    /// The order is not resting on either side of the book.
    #[error("BT_ERR_200: Order not found: {0}")]
    OrderNotFound(OrderId),

    /// An add event carried a non-positive size.
    #[error("BT_ERR_201: Invalid size for {order_id}: size must be positive")]
    InvalidSize { order_id: OrderId },

    /// An add event reused the id of an order already resting in the book.
    #[error("BT_ERR_202: Order already exists: {0}")]
    DuplicateOrder(OrderId),

    /// Resting size at one price would no longer fit in a `Quantity`.
    #[error("BT_ERR_203: Level overflow: adding {order_id} at {price} exceeds the level size limit")]
    LevelOverflow { order_id: OrderId, price: Price },

    // =================================================================
    // Registry / Lane Errors (3xx)
    // =================================================================
    /// No book is registered for the market.
    #[error("BT_ERR_300: Book not found for {0}")]
    BookNotFound(MarketId),

    /// A book for the market is already registered.
    #[error("BT_ERR_301: Book already registered for {0}")]
    DuplicateBook(MarketId),

    /// The book's processing lane has shut down.
    #[error("BT_ERR_302: Lane closed for {0}")]
    LaneClosed(MarketId),

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Serialization / deserialization error.
    #[error("BT_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("BT_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// I/O error while reading a feed.
    #[error("BT_ERR_903: I/O error: {0}")]
    Io(String),
}

impl BookError {
    /// Whether the error means the upstream stream must be resynchronized
    /// (snapshot + resubscribe) before the book can make progress again.
    #[must_use]
    pub fn requires_resync(&self) -> bool {
        matches!(self, Self::Sequence { .. })
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, BookError>;

impl From<std::io::Error> for BookError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BookError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
