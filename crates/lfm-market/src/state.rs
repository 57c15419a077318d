//! Per-epoch state store.
//!
//! Holds everything that lives for exactly one epoch: open needs, open
//! offers, accepted results, per-(congestion, producer) offer counters,
//! procurer readiness flags, and the triggering message ids. All of it is
//! discarded by [`EpochState::reset_for_epoch`]; nothing carries over.

use std::collections::BTreeMap;

use lfm_types::{
    CongestionId, FlexibilityNeed, LfmError, MessageId, Offer, ParticipantId, Result,
};

use crate::ParticipantRegistry;

/// Offers received from one producer for one congestion id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OfferCounter {
    /// Bids stored so far (zero-count reports are not bids).
    pub received: u32,
    /// Announced total; `None` until the producer's first report.
    pub expected: Option<u32>,
}

impl OfferCounter {
    /// The producer has reported everything it announced.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.expected == Some(self.received)
    }
}

/// Two-level map: congestion id → producer id → counter.
///
/// Keys are only added by [`EpochState::record_need`] (one row of producer
/// counters per need) and only removed by [`ReadinessCounters::clear`] at
/// the epoch reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadinessCounters {
    by_congestion: BTreeMap<CongestionId, BTreeMap<ParticipantId, OfferCounter>>,
}

impl ReadinessCounters {
    fn open(&mut self, congestion: CongestionId, producers: &[ParticipantId]) {
        let row = producers
            .iter()
            .map(|p| (p.clone(), OfferCounter::default()))
            .collect();
        self.by_congestion.insert(congestion, row);
    }

    #[must_use]
    pub fn get(&self, congestion: &CongestionId, producer: &ParticipantId) -> Option<&OfferCounter> {
        self.by_congestion.get(congestion)?.get(producer)
    }

    fn get_mut(
        &mut self,
        congestion: &CongestionId,
        producer: &ParticipantId,
    ) -> Option<&mut OfferCounter> {
        self.by_congestion.get_mut(congestion)?.get_mut(producer)
    }

    /// Counter rows for one congestion id.
    #[must_use]
    pub fn row(&self, congestion: &CongestionId) -> Option<&BTreeMap<ParticipantId, OfferCounter>> {
        self.by_congestion.get(congestion)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_congestion.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_congestion.is_empty()
    }

    pub fn clear(&mut self) {
        self.by_congestion.clear();
    }
}

/// How an offer event was absorbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferAdmission {
    /// A bid: stored as an open offer and counted.
    Counted,
    /// A "nothing to offer" report: only resolved the expected count.
    NothingToOffer,
}

/// Everything the coordinator knows about the current epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpochState {
    registry: ParticipantRegistry,
    /// Needs in arrival order.
    needs: Vec<FlexibilityNeed>,
    /// Open offers in arrival order.
    pub(crate) offers: Vec<Offer>,
    /// Accepted offers in acceptance order.
    pub(crate) results: Vec<Offer>,
    counters: ReadinessCounters,
    procurer_ready: BTreeMap<ParticipantId, bool>,
    triggering_ids: Vec<MessageId>,
}

impl EpochState {
    /// Empty state with every configured procurer marked not ready.
    #[must_use]
    pub fn new(registry: ParticipantRegistry) -> Self {
        let procurer_ready = registry
            .procurers()
            .iter()
            .map(|p| (p.clone(), false))
            .collect();
        Self {
            registry,
            needs: Vec::new(),
            offers: Vec::new(),
            results: Vec::new(),
            counters: ReadinessCounters::default(),
            procurer_ready,
            triggering_ids: Vec::new(),
        }
    }

    /// Discard the previous epoch entirely.
    ///
    /// The triggering ids restart from `epoch_message_id`.
    pub fn reset_for_epoch(&mut self, epoch_message_id: MessageId) {
        self.needs.clear();
        self.offers.clear();
        self.results.clear();
        self.counters.clear();
        for ready in self.procurer_ready.values_mut() {
            *ready = false;
        }
        self.triggering_ids.clear();
        self.triggering_ids.push(epoch_message_id);
    }

    /// Store a need and open a counter row for every producer.
    ///
    /// # Errors
    /// - `MalformedEvent` if the need fails structural validation
    /// - `DuplicateCongestion` if a need with the same congestion id is open
    pub fn record_need(&mut self, need: FlexibilityNeed) -> Result<()> {
        need.validate()?;
        if self.need(&need.congestion_id).is_some() {
            return Err(LfmError::DuplicateCongestion(need.congestion_id));
        }
        self.counters
            .open(need.congestion_id.clone(), self.registry.producers());
        self.needs.push(need);
        Ok(())
    }

    /// Absorb an offer event.
    ///
    /// The first event from a producer for a congestion id fixes its expected
    /// count. Bids are stored and counted; zero-count reports are not.
    /// Nothing is mutated when an error is returned.
    ///
    /// # Errors
    /// - `MalformedEvent` if the offer fails structural validation
    /// - `UnknownProducer` if the producer is not registered
    /// - `UnknownCongestion` if no need with that congestion id is open
    /// - `DuplicateOffer` if a bid with the same offer id is open or already
    ///   accepted into the results
    /// - `OfferCountExceeded` if the bid would exceed the expected count
    pub fn record_offer(&mut self, offer: Offer) -> Result<OfferAdmission> {
        offer.validate()?;
        if !self.registry.is_producer(&offer.producer_id) {
            return Err(LfmError::UnknownProducer(offer.producer_id));
        }
        let Some(counter) = self.counters.get(&offer.congestion_id, &offer.producer_id) else {
            return Err(LfmError::UnknownCongestion(offer.congestion_id));
        };

        let expected = counter.expected.unwrap_or(offer.offer_count);
        if offer.is_bid() {
            if self
                .offers
                .iter()
                .chain(&self.results)
                .any(|o| o.offer_id == offer.offer_id)
            {
                return Err(LfmError::DuplicateOffer(offer.offer_id));
            }
            if counter.received >= expected {
                return Err(LfmError::OfferCountExceeded {
                    producer: offer.producer_id,
                    congestion: offer.congestion_id,
                    expected,
                });
            }
        }

        let Some(counter) = self.counters.get_mut(&offer.congestion_id, &offer.producer_id) else {
            return Err(LfmError::Internal(format!(
                "counter for {} vanished during admission",
                offer.congestion_id
            )));
        };
        counter.expected = Some(expected);
        if offer.is_bid() {
            counter.received += 1;
            self.offers.push(offer);
            Ok(OfferAdmission::Counted)
        } else {
            Ok(OfferAdmission::NothingToOffer)
        }
    }

    /// Mark a configured procurer as ready for this epoch.
    ///
    /// # Errors
    /// Returns `UnknownParticipant` if `procurer` is not configured.
    pub fn record_procurer_ready(&mut self, procurer: &ParticipantId) -> Result<()> {
        match self.procurer_ready.get_mut(procurer) {
            Some(ready) => {
                *ready = true;
                Ok(())
            }
            None => Err(LfmError::UnknownParticipant(procurer.clone())),
        }
    }

    pub fn push_trigger(&mut self, message_id: MessageId) {
        self.triggering_ids.push(message_id);
    }

    #[must_use]
    pub fn registry(&self) -> &ParticipantRegistry {
        &self.registry
    }

    #[must_use]
    pub fn needs(&self) -> &[FlexibilityNeed] {
        &self.needs
    }

    #[must_use]
    pub fn need(&self, congestion: &CongestionId) -> Option<&FlexibilityNeed> {
        self.needs.iter().find(|n| &n.congestion_id == congestion)
    }

    #[must_use]
    pub fn offers(&self) -> &[Offer] {
        &self.offers
    }

    /// Open offers answering `congestion`, in arrival order.
    pub fn offers_for<'a>(&'a self, congestion: &'a CongestionId) -> impl Iterator<Item = &'a Offer> {
        self.offers
            .iter()
            .filter(move |o| &o.congestion_id == congestion)
    }

    #[must_use]
    pub fn results(&self) -> &[Offer] {
        &self.results
    }

    #[must_use]
    pub fn counters(&self) -> &ReadinessCounters {
        &self.counters
    }

    #[must_use]
    pub fn is_procurer_ready(&self, procurer: &ParticipantId) -> bool {
        self.procurer_ready.get(procurer).copied().unwrap_or(false)
    }

    pub(crate) fn procurer_flags(&self) -> impl Iterator<Item = (&ParticipantId, bool)> {
        self.procurer_ready.iter().map(|(p, ready)| (p, *ready))
    }

    #[must_use]
    pub fn triggering_ids(&self) -> &[MessageId] {
        &self.triggering_ids
    }
}
