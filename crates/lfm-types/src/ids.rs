//! Identifiers used throughout the LFM coordinator.
//!
//! Participant, congestion, offer, and message ids are opaque strings
//! assigned by other simulation components; the coordinator never mints
//! them. `EpochNumber` is the simulation's epoch counter.

use std::{borrow::Borrow, fmt};

use serde::{Deserialize, Serialize};

/// Declares a transparent string newtype with the usual conversions.
macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the id is empty or whitespace only.
            #[must_use]
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

// ---------------------------------------------------------------------------
// String identifiers
// ---------------------------------------------------------------------------

string_id!(
    /// Process id of a simulation participant (procurer or producer).
    ParticipantId
);

string_id!(
    /// Correlates a flexibility need with the offers and results answering it.
    CongestionId
);

string_id!(
    /// Unique id of a single bid.
    OfferId
);

string_id!(
    /// Id of a bus message; outbound events list these as triggering ids.
    MessageId
);

// ---------------------------------------------------------------------------
// EpochNumber
// ---------------------------------------------------------------------------

/// Sequence number of a simulation epoch.
///
/// Epoch 0 is the initialization epoch; the market never trades in it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EpochNumber(pub u64);

impl EpochNumber {
    #[must_use]
    pub fn is_initialization(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for EpochNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "epoch:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
