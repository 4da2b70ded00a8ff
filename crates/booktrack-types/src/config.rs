//! Configuration types for trackers, books, and lanes.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{BookError, BookKey, MarketId, OwnerId, Result, Sequence, constants};

/// What a feed consumer does when an event is rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorPolicy {
    /// Stop at the first rejected event.
    #[default]
    Halt,
    /// Log the rejection and keep going.
    Skip,
}

/// Configuration for a single tracked book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookConfig {
    /// Operator running the tracker.
    pub owner: OwnerId,
    /// Market the book follows.
    pub market: MarketId,
    /// Sequence number of the first event the book accepts.
    #[serde(default)]
    pub sequence_origin: Sequence,
}

impl BookConfig {
    #[must_use]
    pub fn new(owner: OwnerId, market: MarketId) -> Self {
        Self {
            owner,
            market,
            sequence_origin: constants::DEFAULT_SEQUENCE_ORIGIN,
        }
    }

    #[must_use]
    pub fn key(&self) -> BookKey {
        BookKey::new(self.owner, self.market)
    }
}

/// Sizing of a book lane's channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneConfig {
    /// Commands queued before senders wait.
    pub mailbox_capacity: usize,
    /// Updates buffered per subscriber.
    pub update_capacity: usize,
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: constants::DEFAULT_LANE_MAILBOX,
            update_capacity: constants::DEFAULT_UPDATE_CAPACITY,
        }
    }
}

/// Top-level tracker configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Operator running the tracker.
    pub owner: OwnerId,
    /// Books to track.
    pub markets: Vec<BookConfig>,
    /// Levels per side in printed views.
    #[serde(default = "default_depth_levels")]
    pub depth_levels: usize,
    #[serde(default)]
    pub error_policy: ErrorPolicy,
    #[serde(default)]
    pub lane: LaneConfig,
}

fn default_depth_levels() -> usize {
    constants::DEFAULT_DEPTH_LEVELS
}

impl TrackerConfig {
    /// A config tracking the given markets with default settings.
    #[must_use]
    pub fn for_markets(owner: OwnerId, markets: impl IntoIterator<Item = MarketId>) -> Self {
        Self {
            owner,
            markets: markets
                .into_iter()
                .map(|m| BookConfig::new(owner, m))
                .collect(),
            depth_levels: constants::DEFAULT_DEPTH_LEVELS,
            error_policy: ErrorPolicy::default(),
            lane: LaneConfig::default(),
        }
    }

    /// Parses and validates a JSON config.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| BookError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configs that track nothing or track a market twice.
    pub fn validate(&self) -> Result<()> {
        if self.markets.is_empty() {
            return Err(BookError::Configuration(
                "at least one market must be configured".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for book in &self.markets {
            if !seen.insert(book.market) {
                return Err(BookError::Configuration(format!(
                    "{} is configured more than once",
                    book.market
                )));
            }
        }
        if !(1..=constants::MAX_DEPTH_LEVELS).contains(&self.depth_levels) {
            return Err(BookError::Configuration(format!(
                "depth_levels must be between 1 and {}, got {}",
                constants::MAX_DEPTH_LEVELS,
                self.depth_levels
            )));
        }
        if self.lane.mailbox_capacity == 0 || self.lane.update_capacity == 0 {
            return Err(BookError::Configuration(
                "lane capacities must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
