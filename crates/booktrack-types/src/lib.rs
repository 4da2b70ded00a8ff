//! # booktrack-types
//!
//! Shared types, errors, and configuration for **booktrack**, a tracker
//! that rebuilds a venue's limit order books from its sequenced event feed.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`MarketId`], [`OrderId`], [`OwnerId`], [`BookKey`]
//! - **Order model**: [`Order`], [`Side`], [`Price`], [`Quantity`]
//! - **Event model**: [`BookEvent`], [`EventAction`], [`AddOrder`]
//! - **Match output**: [`Fill`], [`MatchReport`], [`TopOfBook`], [`BookStats`]
//! - **Views**: [`DepthView`], [`DepthLevel`], [`Ladder`]
//! - **Configuration**: [`TrackerConfig`], [`BookConfig`], [`LaneConfig`]
//! - **Errors**: [`BookError`] with `BT_ERR_` prefix codes

pub mod config;
pub mod constants;
pub mod depth;
pub mod error;
pub mod event;
pub mod fill;
pub mod ids;
pub mod order;

pub use config::*;
pub use depth::*;
pub use error::*;
pub use event::*;
pub use fill::*;
pub use ids::*;
pub use order::*;

// Constants are accessed via `booktrack_types::constants::FOO`.
