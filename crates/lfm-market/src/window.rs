//! Market window policy: trading happens only within configured hours.

use chrono::{DateTime, Timelike, Utc};
use lfm_types::{EpochWindow, MarketConfig};

/// Configured trading hours, both bounds inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarketWindow {
    pub open_hour: u32,
    pub close_hour: u32,
}

impl MarketWindow {
    #[must_use]
    pub fn new(open_hour: u32, close_hour: u32) -> Self {
        Self {
            open_hour,
            close_hour,
        }
    }

    #[must_use]
    pub fn from_config(config: &MarketConfig) -> Self {
        Self::new(config.open_hour, config.close_hour)
    }

    /// Whether an epoch starting at `epoch_start` may trade.
    ///
    /// Only the start hour counts; an epoch that starts at the closing hour
    /// is still open even though it ends after it.
    #[must_use]
    pub fn is_open(&self, epoch_start: DateTime<Utc>) -> bool {
        is_open(epoch_start, self.open_hour, self.close_hour)
    }

    #[must_use]
    pub fn admits(&self, window: &EpochWindow) -> bool {
        self.is_open(window.start)
    }
}

#[must_use]
pub fn is_open(epoch_start: DateTime<Utc>, open_hour: u32, close_hour: u32) -> bool {
    let hour = epoch_start.hour();
    hour >= open_hour && hour <= close_hour
}
