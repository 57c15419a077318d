//! Epoch lifecycle types.
//!
//! The simulation clock announces each epoch with an [`EpochTick`]. Within
//! one epoch the coordinator moves through:
//! **NOT_STARTED → WINDOW_CHECK → AWAITING → OFFERING_SENT → DONE**
//!
//! A closed market jumps from WINDOW_CHECK straight to DONE, and an epoch
//! can complete from either AWAITING or OFFERING_SENT.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{EpochNumber, MessageId};

/// Start and end of an epoch in simulation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Announcement of a new epoch from the simulation clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochTick {
    pub number: EpochNumber,
    pub window: EpochWindow,
    /// Id of the epoch message; it seeds the epoch's triggering ids.
    pub message_id: MessageId,
}

/// Per-epoch controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EpochPhase {
    /// Epoch announced; current market results not yet published.
    NotStarted,
    /// Results published; market window not yet evaluated.
    WaitingForWindowCheck,
    /// Market open; waiting for producer reports and procurer readiness.
    AwaitingParticipants,
    /// Offerings forwarded to procurers; waiting for their selection.
    OfferingSent,
    /// Epoch complete; further invocations are no-ops.
    Done,
}

impl fmt::Display for EpochPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "NOT_STARTED"),
            Self::WaitingForWindowCheck => write!(f, "WINDOW_CHECK"),
            Self::AwaitingParticipants => write!(f, "AWAITING"),
            Self::OfferingSent => write!(f, "OFFERING_SENT"),
            Self::Done => write!(f, "DONE"),
        }
    }
}

/// What the controller reports back to the epoch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpochProgress {
    /// The epoch still waits on participants.
    Pending,
    /// Every participant has reported, or the market is closed.
    Complete,
}

impl EpochProgress {
    #[must_use]
    pub fn is_complete(self) -> bool {
        self == Self::Complete
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl EpochTick {
    /// An hour-long epoch on 2020-06-25 starting at `start_hour` UTC.
    pub fn dummy(number: u64, start_hour: u32) -> Self {
        use chrono::{Duration, TimeZone};

        let start = Utc
            .with_ymd_and_hms(2020, 6, 25, start_hour, 0, 0)
            .single()
            .unwrap_or_default();
        Self {
            number: EpochNumber(number),
            window: EpochWindow {
                start,
                end: start + Duration::hours(1),
            },
            message_id: MessageId::new(format!("epoch-msg-{number}")),
        }
    }
}
