//! # booktrack-feed
//!
//! Runtime plumbing around the pure book engine.
//!
//! - [`BookRegistry`]: shared books behind one `RwLock` each, routed by market
//! - [`BookLane`]: a tokio task that owns one book and serves it by message
//! - [`replay`]: drive a registry from a JSON-lines event log
//! - [`telemetry`]: `tracing-subscriber` setup for binaries
//!
//! ```text
//! JSON line -> decode_event() -> BookRegistry::apply() -> Book::apply()
//!                                 LaneHandle::apply()  ->   (lane task)
//! ```

pub mod lane;
pub mod registry;
pub mod replay;
pub mod telemetry;

pub use lane::{BookLane, BookUpdate, LaneHandle};
pub use registry::{BookHandle, BookRegistry};
pub use replay::{ReplaySummary, replay};
