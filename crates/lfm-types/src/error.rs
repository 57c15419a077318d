//! Error types for the LFM coordinator.
//!
//! All errors use the `LFM_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Inbound event validation
//! - 2xx: Participant / correlation errors
//! - 4xx: Epoch errors
//! - 7xx: Transport errors
//! - 9xx: General / internal errors
//!
//! Only transport, internal and I/O errors end a run (see [`LfmError::is_fatal`]).
//! Everything else describes an inbound event that is dropped.

use thiserror::Error;

use crate::{CongestionId, EpochNumber, OfferId, ParticipantId};

/// Central error enum for all LFM operations.
#[derive(Debug, Error)]
pub enum LfmError {
    // =================================================================
    // Validation Errors (1xx)
    // =================================================================
    /// The event failed structural validation.
    #[error("LFM_ERR_100: Malformed event: {reason}")]
    MalformedEvent { reason: String },

    /// A need with this congestion id is already open in the epoch.
    #[error("LFM_ERR_101: Congestion already open: {0}")]
    DuplicateCongestion(CongestionId),

    /// An offer with this id is already open in the epoch.
    #[error("LFM_ERR_102: Offer already open: {0}")]
    DuplicateOffer(OfferId),

    /// A selection event carried no offer ids.
    #[error("LFM_ERR_103: Selection contains no offer ids")]
    EmptySelection,

    // =================================================================
    // Participant Errors (2xx)
    // =================================================================
    /// The producer is not in the participant registry.
    #[error("LFM_ERR_200: Unknown producer: {0}")]
    UnknownProducer(ParticipantId),

    /// The participant is neither a configured procurer nor a producer.
    #[error("LFM_ERR_201: Unknown participant: {0}")]
    UnknownParticipant(ParticipantId),

    /// The offer answers a congestion id with no open need.
    #[error("LFM_ERR_202: No open need for congestion {0}")]
    UnknownCongestion(CongestionId),

    /// The producer sent more offers than it announced.
    #[error("LFM_ERR_203: Producer {producer} exceeded its offer count {expected} for {congestion}")]
    OfferCountExceeded {
        producer: ParticipantId,
        congestion: CongestionId,
        expected: u32,
    },

    // =================================================================
    // Epoch Errors (4xx)
    // =================================================================
    /// No epoch is running, or it has already completed.
    #[error("LFM_ERR_400: Epoch not active: {0}")]
    EpochNotActive(EpochNumber),

    // =================================================================
    // Transport Errors (7xx)
    // =================================================================
    /// The outbound bus refused a publication.
    #[error("LFM_ERR_700: Publish to {topic} failed: {reason}")]
    PublishFailed { topic: String, reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("LFM_ERR_900: Internal error: {0}")]
    Internal(String),

    /// Serialization / deserialization error.
    #[error("LFM_ERR_901: Serialization error: {0}")]
    Serialization(String),

    /// Configuration error (bad environment value, out-of-range hour, etc.).
    #[error("LFM_ERR_902: Configuration error: {0}")]
    Configuration(String),

    /// I/O error.
    #[error("LFM_ERR_903: I/O error: {0}")]
    Io(String),
}

impl LfmError {
    /// Whether the error must end the component run.
    ///
    /// Non-fatal errors describe a single rejected inbound event; state is
    /// untouched and processing continues with the next event.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::PublishFailed { .. } | Self::Internal(_) | Self::Io(_)
        )
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, LfmError>;

impl From<std::io::Error> for LfmError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LfmError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
