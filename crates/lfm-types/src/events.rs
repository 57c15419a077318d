//! Domain events exchanged with the simulation bus.
//!
//! Inbound events arrive already decoded as [`InboundEvent`]; outbound events
//! are handed to a publisher as [`OutboundEvent`]. The wire codec lives
//! outside this crate.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    CongestionId, Direction, EpochNumber, FlexibilityNeed, MessageId, Offer, OfferId,
    ParticipantId,
};

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// A procurer's choice among the forwarded offerings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionEvent {
    /// Accepted offers, in the procurer's order.
    pub offer_ids: Vec<OfferId>,
    pub message_id: MessageId,
}

/// A participant's ready status for the current epoch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub participant_id: ParticipantId,
    pub message_id: MessageId,
}

/// Every event kind the coordinator consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    Need(FlexibilityNeed),
    Offer(Offer),
    Selection(SelectionEvent),
    Status(StatusEvent),
}

impl InboundEvent {
    #[must_use]
    pub fn message_id(&self) -> &MessageId {
        match self {
            Self::Need(need) => &need.message_id,
            Self::Offer(offer) => &offer.message_id,
            Self::Selection(selection) => &selection.message_id,
            Self::Status(status) => &status.message_id,
        }
    }

    /// Short name used in log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Need(_) => "need",
            Self::Offer(_) => "offer",
            Self::Selection(_) => "selection",
            Self::Status(_) => "status",
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// Call for bids, derived 1:1 from an open need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEvent {
    pub epoch_number: EpochNumber,
    pub triggering_ids: Vec<MessageId>,
    pub activation_time: DateTime<Utc>,
    pub duration: Decimal,
    pub direction: Direction,
    pub power_min: Decimal,
    pub power_request: Decimal,
    pub congestion_id: CongestionId,
    pub customer_ids: Vec<String>,
    pub bid_resolution: Decimal,
}

impl RequestEvent {
    #[must_use]
    pub fn from_need(
        epoch_number: EpochNumber,
        triggering_ids: Vec<MessageId>,
        need: &FlexibilityNeed,
    ) -> Self {
        Self {
            epoch_number,
            triggering_ids,
            activation_time: need.activation_time,
            duration: need.duration,
            direction: need.direction,
            power_min: need.power_min,
            power_request: need.power_request,
            congestion_id: need.congestion_id.clone(),
            customer_ids: need.customer_ids.clone(),
            bid_resolution: need.bid_resolution,
        }
    }
}

/// An open offer forwarded to the procurer that raised the need.
///
/// A need without offers gets a single record where every value field is
/// null and `offer_count` is zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferingEvent {
    pub epoch_number: EpochNumber,
    pub triggering_ids: Vec<MessageId>,
    pub activation_time: Option<DateTime<Utc>>,
    pub duration: Option<Decimal>,
    pub direction: Option<Direction>,
    pub power: Option<Decimal>,
    pub price: Option<Decimal>,
    pub congestion_id: CongestionId,
    pub offer_id: Option<OfferId>,
    /// Number of offerings sent for this congestion id.
    pub offer_count: u32,
    pub customer_ids: Option<Vec<String>>,
}

impl OfferingEvent {
    #[must_use]
    pub fn for_offer(
        epoch_number: EpochNumber,
        triggering_ids: Vec<MessageId>,
        offer: &Offer,
        offer_count: u32,
    ) -> Self {
        Self {
            epoch_number,
            triggering_ids,
            activation_time: Some(offer.activation_time),
            duration: Some(offer.duration),
            direction: Some(offer.direction),
            power: Some(offer.power),
            price: Some(offer.price),
            congestion_id: offer.congestion_id.clone(),
            offer_id: Some(offer.offer_id.clone()),
            offer_count,
            customer_ids: Some(offer.customer_ids.clone()),
        }
    }

    #[must_use]
    pub fn empty(
        epoch_number: EpochNumber,
        triggering_ids: Vec<MessageId>,
        congestion_id: CongestionId,
    ) -> Self {
        Self {
            epoch_number,
            triggering_ids,
            activation_time: None,
            duration: None,
            direction: None,
            power: None,
            price: None,
            congestion_id,
            offer_id: None,
            offer_count: 0,
            customer_ids: None,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offer_id.is_none()
    }
}

/// An accepted offer, or a single null record when nothing was accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketResultEvent {
    pub epoch_number: EpochNumber,
    pub triggering_ids: Vec<MessageId>,
    pub activation_time: Option<DateTime<Utc>>,
    pub duration: Option<Decimal>,
    pub direction: Option<Direction>,
    pub power: Option<Decimal>,
    pub price: Option<Decimal>,
    pub congestion_id: Option<CongestionId>,
    pub offer_id: Option<OfferId>,
    /// Number of accepted results sharing this congestion id.
    pub result_count: u32,
    pub customer_ids: Option<Vec<String>>,
}

impl MarketResultEvent {
    #[must_use]
    pub fn for_result(
        epoch_number: EpochNumber,
        triggering_ids: Vec<MessageId>,
        result: &Offer,
        result_count: u32,
    ) -> Self {
        Self {
            epoch_number,
            triggering_ids,
            activation_time: Some(result.activation_time),
            duration: Some(result.duration),
            direction: Some(result.direction),
            power: Some(result.power),
            price: Some(result.price),
            congestion_id: Some(result.congestion_id.clone()),
            offer_id: Some(result.offer_id.clone()),
            result_count,
            customer_ids: Some(result.customer_ids.clone()),
        }
    }

    #[must_use]
    pub fn empty(epoch_number: EpochNumber, triggering_ids: Vec<MessageId>) -> Self {
        Self {
            epoch_number,
            triggering_ids,
            activation_time: None,
            duration: None,
            direction: None,
            power: None,
            price: None,
            congestion_id: None,
            offer_id: None,
            result_count: 0,
            customer_ids: None,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offer_id.is_none()
    }
}

/// Every event kind the coordinator publishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundEvent {
    Request(RequestEvent),
    Offering(OfferingEvent),
    MarketResult(MarketResultEvent),
}

impl OutboundEvent {
    #[must_use]
    pub fn epoch_number(&self) -> EpochNumber {
        match self {
            Self::Request(e) => e.epoch_number,
            Self::Offering(e) => e.epoch_number,
            Self::MarketResult(e) => e.epoch_number,
        }
    }

    #[must_use]
    pub fn triggering_ids(&self) -> &[MessageId] {
        match self {
            Self::Request(e) => &e.triggering_ids,
            Self::Offering(e) => &e.triggering_ids,
            Self::MarketResult(e) => &e.triggering_ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_copies_need_fields() {
        let need = FlexibilityNeed::dummy("c-1", "pgo-1");
        let req = RequestEvent::from_need(EpochNumber(3), vec![need.message_id.clone()], &need);
        assert_eq!(req.congestion_id, need.congestion_id);
        assert_eq!(req.power_min, need.power_min);
        assert_eq!(req.power_request, need.power_request);
        assert_eq!(req.bid_resolution, need.bid_resolution);
        assert_eq!(req.triggering_ids, vec![MessageId::new("need-c-1")]);
    }

    #[test]
    fn empty_offering_is_null_valued() {
        let ev = OfferingEvent::empty(EpochNumber(1), vec![], CongestionId::new("c-1"));
        assert!(ev.is_empty());
        let json = serde_json::to_value(&ev).unwrap();
        assert!(json["price"].is_null());
        assert!(json["offer_id"].is_null());
        assert_eq!(json["offer_count"], 0);
        assert_eq!(json["congestion_id"], "c-1");
    }

    #[test]
    fn empty_market_result_has_no_congestion() {
        let ev = MarketResultEvent::empty(EpochNumber(1), vec![]);
        assert!(ev.is_empty());
        assert_eq!(ev.result_count, 0);
        assert!(ev.congestion_id.is_none());
    }

    #[test]
    fn market_result_carries_offer_values() {
        let offer = Offer::dummy("o-1", "c-1", "der-1", 2);
        let ev = MarketResultEvent::for_result(EpochNumber(2), vec![], &offer, 1);
        assert_eq!(ev.offer_id, Some(OfferId::new("o-1")));
        assert_eq!(ev.price, Some(offer.price));
        assert_eq!(ev.result_count, 1);
    }

    #[test]
    fn inbound_event_is_tagged_by_type() {
        let ev = InboundEvent::Status(StatusEvent {
            participant_id: ParticipantId::new("pgo-1"),
            message_id: MessageId::new("m-9"),
        });
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"], "status");
        let back: InboundEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, ev);
        assert_eq!(back.message_id(), &MessageId::new("m-9"));
    }

    #[test]
    fn inbound_selection_from_json() {
        let ev: InboundEvent = serde_json::from_str(
            r#"{"type":"selection","offer_ids":["o-1","o-2"],"message_id":"m-3"}"#,
        )
        .unwrap();
        let InboundEvent::Selection(sel) = ev else {
            panic!("expected selection");
        };
        assert_eq!(sel.offer_ids, vec![OfferId::new("o-1"), OfferId::new("o-2")]);
    }

    #[test]
    fn unknown_inbound_kind_fails_to_decode() {
        let res: std::result::Result<InboundEvent, _> =
            serde_json::from_str(r#"{"type":"weather","message_id":"m-1"}"#);
        assert!(res.is_err());
    }
}
