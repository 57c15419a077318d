//! Market records: flexibility needs raised by procurers and offers
//! submitted by producers.
//!
//! Both are immutable once received. An accepted offer is kept as-is in the
//! epoch's results, so there is no separate result record.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{CongestionId, LfmError, MessageId, OfferId, ParticipantId, Result};

/// Direction of the requested or offered power change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Upregulation,
    Downregulation,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Upregulation => write!(f, "upregulation"),
            Self::Downregulation => write!(f, "downregulation"),
        }
    }
}

/// A procurer's request for flexibility at one congestion point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlexibilityNeed {
    /// Unique among the open needs of an epoch.
    pub congestion_id: CongestionId,
    pub procurer_id: ParticipantId,
    pub activation_time: DateTime<Utc>,
    /// Activation length in minutes.
    pub duration: Decimal,
    pub direction: Direction,
    /// Smallest acceptable power, kW.
    pub power_min: Decimal,
    /// Requested power, kW.
    pub power_request: Decimal,
    pub customer_ids: Vec<String>,
    /// Granularity of bids, kW.
    pub bid_resolution: Decimal,
    pub message_id: MessageId,
}

impl FlexibilityNeed {
    /// Structural checks that do not depend on epoch state.
    pub fn validate(&self) -> Result<()> {
        if self.congestion_id.is_blank() {
            return Err(malformed("need has an empty congestion id"));
        }
        if self.procurer_id.is_blank() {
            return Err(malformed("need has an empty procurer id"));
        }
        if self.power_min > self.power_request {
            return Err(malformed(format!(
                "need {} has power_min {} above power_request {}",
                self.congestion_id, self.power_min, self.power_request
            )));
        }
        Ok(())
    }
}

/// A producer's bid against an open need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub offer_id: OfferId,
    pub congestion_id: CongestionId,
    pub producer_id: ParticipantId,
    pub activation_time: DateTime<Utc>,
    /// Activation length in minutes.
    pub duration: Decimal,
    pub direction: Direction,
    /// Offered power, kW.
    pub power: Decimal,
    /// Price for the whole activation, EUR.
    pub price: Decimal,
    pub customer_ids: Vec<String>,
    /// Total number of offers this producer submits for the congestion.
    /// Zero means "nothing to offer".
    pub offer_count: u32,
    pub message_id: MessageId,
}

impl Offer {
    /// Whether this is a real bid rather than a "nothing to offer" report.
    #[must_use]
    pub fn is_bid(&self) -> bool {
        self.offer_count != 0
    }

    /// Structural checks that do not depend on epoch state.
    pub fn validate(&self) -> Result<()> {
        if self.congestion_id.is_blank() {
            return Err(malformed("offer has an empty congestion id"));
        }
        if self.producer_id.is_blank() {
            return Err(malformed("offer has an empty producer id"));
        }
        if self.is_bid() && self.offer_id.is_blank() {
            return Err(malformed(format!(
                "bid from {} has an empty offer id",
                self.producer_id
            )));
        }
        Ok(())
    }
}

fn malformed(reason: impl Into<String>) -> LfmError {
    LfmError::MalformedEvent {
        reason: reason.into(),
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl FlexibilityNeed {
    pub fn dummy(congestion_id: &str, procurer_id: &str) -> Self {
        Self {
            congestion_id: CongestionId::new(congestion_id),
            procurer_id: ParticipantId::new(procurer_id),
            activation_time: DateTime::parse_from_rfc3339("2020-06-25T12:00:00Z")
                .map(|t| t.with_timezone(&Utc))
                .unwrap_or_default(),
            duration: Decimal::new(60, 0),
            direction: Direction::Upregulation,
            power_min: Decimal::new(100, 0),
            power_request: Decimal::new(200, 0),
            customer_ids: vec!["customer-1".to_string()],
            bid_resolution: Decimal::new(10, 0),
            message_id: MessageId::new(format!("need-{congestion_id}")),
        }
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Offer {
    pub fn dummy(offer_id: &str, congestion_id: &str, producer_id: &str, offer_count: u32) -> Self {
        Self {
            offer_id: OfferId::new(offer_id),
            congestion_id: CongestionId::new(congestion_id),
            producer_id: ParticipantId::new(producer_id),
            activation_time: DateTime::parse_from_rfc3339("2020-06-25T12:00:00Z")
                .map(|t| t.with_timezone(&Utc))
                .unwrap_or_default(),
            duration: Decimal::new(60, 0),
            direction: Direction::Upregulation,
            power: Decimal::new(150, 0),
            price: Decimal::new(4250, 2),
            customer_ids: vec!["customer-1".to_string()],
            offer_count,
            message_id: MessageId::new(format!("offer-msg-{producer_id}-{offer_id}")),
        }
    }

    /// A "nothing to offer" report from `producer_id`.
    pub fn dummy_none(congestion_id: &str, producer_id: &str) -> Self {
        Self::dummy("", congestion_id, producer_id, 0)
    }
}
