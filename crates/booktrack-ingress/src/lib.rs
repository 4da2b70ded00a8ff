//! # booktrack-ingress
//!
//! **Event ingress**: everything an event passes through before it may
//! touch a book.
//!
//! 1. **Decoding**: loosely typed venue JSON is parsed into the closed
//!    [`BookEvent`](booktrack_types::BookEvent) enum; unknown kinds and
//!    malformed payloads are rejected here.
//! 2. **SequenceValidator**: confirms the event targets this book's market
//!    and carries exactly the next expected sequence number.
//!
//! ```text
//! venue JSON → decode_event() → SequenceValidator::check() → Book::apply()
//! ```

pub mod decode;
pub mod sequence;

pub use decode::{WireEvent, decode_event, decode_value};
pub use sequence::SequenceValidator;
