//! System-wide constants for booktrack.

/// Sequence number of the first event of a fresh book.
pub const DEFAULT_SEQUENCE_ORIGIN: u64 = 0;

/// Price levels per side shown by default in depth views and ladders.
pub const DEFAULT_DEPTH_LEVELS: usize = 5;

/// Largest number of levels per side a ladder may be asked to render.
pub const MAX_DEPTH_LEVELS: usize = 1_000;

/// Bounded mailbox size of a book lane.
pub const DEFAULT_LANE_MAILBOX: usize = 1024;

/// Capacity of a lane's update broadcast channel. Slow subscribers that
/// fall further behind than this miss updates.
pub const DEFAULT_UPDATE_CAPACITY: usize = 256;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "booktrack";
