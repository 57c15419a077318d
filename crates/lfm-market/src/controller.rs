//! Epoch controller: the per-epoch state machine.
//!
//! ```text
//! NOT_STARTED ──publish results──▶ WINDOW_CHECK ──closed──▶ DONE
//!                                       │ open: publish requests
//!                                       ▼
//!                               AWAITING ──producers ready──▶ OFFERING_SENT
//!                                  │  (publish offerings)          │
//!                                  └──────── all ready ────────────┴──▶ DONE
//! ```
//!
//! On every invocation while awaiting, the checks run in this order:
//! 1. producers and procurers ready → complete
//! 2. procurers ready and no open needs → complete
//! 3. producers ready, offerings not sent → publish offerings
//! 4. producers ready, offerings sent → wait for selection
//! 5. otherwise → wait for producer reports
//!
//! Invoking the controller again without new events publishes nothing and
//! changes nothing.

use lfm_types::{
    EpochNumber, EpochPhase, EpochProgress, EpochTick, FlexibilityNeed, LfmError,
    MarketConfig, MarketResultEvent, OfferingEvent, OutboundEvent, RequestEvent, Result, Topics,
};

use crate::{
    EpochState, MarketWindow, ParticipantRegistry, Publisher, pending_producers,
    procurers_ready, producers_ready,
};

/// Drives one coordinator instance through the simulation's epochs.
#[derive(Debug, Clone)]
pub struct EpochController {
    window: MarketWindow,
    topics: Topics,
    state: EpochState,
    /// The epoch being processed, once the clock has announced one.
    epoch: Option<EpochTick>,
    phase: EpochPhase,
    /// Window decision, cached for the epoch.
    market_open: bool,
    completed_epoch: Option<EpochNumber>,
}

impl EpochController {
    /// Build a controller for `config`. No epoch is active until
    /// [`begin_epoch`](Self::begin_epoch) is called.
    pub fn new(config: &MarketConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            window: MarketWindow::from_config(config),
            topics: Topics::new(config),
            state: EpochState::new(ParticipantRegistry::from_config(config)),
            epoch: None,
            phase: EpochPhase::NotStarted,
            market_open: false,
            completed_epoch: None,
        })
    }

    /// Enter a new epoch: reset all epoch state, then run the first
    /// controller invocation.
    ///
    /// Epoch 0 is the initialization epoch and completes immediately
    /// without publishing anything.
    pub fn begin_epoch<P: Publisher>(
        &mut self,
        tick: EpochTick,
        publisher: &mut P,
    ) -> Result<EpochProgress> {
        if let Some(previous) = &self.epoch {
            if self.completed_epoch != Some(previous.number) {
                tracing::warn!(
                    previous = previous.number.0,
                    next = tick.number.0,
                    phase = %self.phase,
                    "Epoch superseded before completing"
                );
            }
        }

        self.state.reset_for_epoch(tick.message_id.clone());
        self.market_open = false;
        let number = tick.number;
        self.epoch = Some(tick);

        if number.is_initialization() {
            tracing::info!(epoch = number.0, "Initialization epoch, nothing to do");
            return Ok(self.finish());
        }

        tracing::info!(epoch = number.0, "Epoch started");
        self.phase = EpochPhase::NotStarted;
        self.process_epoch(publisher)
    }

    /// Advance the state machine as far as the current state allows.
    ///
    /// # Errors
    /// - `EpochNotActive` if no epoch has been announced yet
    /// - any publish failure, unchanged
    pub fn process_epoch<P: Publisher>(&mut self, publisher: &mut P) -> Result<EpochProgress> {
        let epoch = self.epoch_number()?;
        tracing::debug!(
            epoch = epoch.0,
            phase = %self.phase,
            needs = self.state.needs().len(),
            offers = self.state.offers().len(),
            results = self.state.results().len(),
            "Processing epoch"
        );

        loop {
            match self.phase {
                EpochPhase::NotStarted => {
                    self.publish_market_results(publisher)?;
                    self.phase = EpochPhase::WaitingForWindowCheck;
                }
                EpochPhase::WaitingForWindowCheck => {
                    self.market_open = self
                        .epoch
                        .as_ref()
                        .is_some_and(|tick| self.window.admits(&tick.window));
                    if !self.market_open {
                        tracing::info!(epoch = epoch.0, "Market closed, epoch complete");
                        return Ok(self.finish());
                    }
                    self.publish_open_requests(publisher)?;
                    self.phase = EpochPhase::AwaitingParticipants;
                }
                EpochPhase::AwaitingParticipants | EpochPhase::OfferingSent => {
                    return self.evaluate(publisher);
                }
                EpochPhase::Done => return Ok(EpochProgress::Complete),
            }
        }
    }

    fn evaluate<P: Publisher>(&mut self, publisher: &mut P) -> Result<EpochProgress> {
        let epoch = self.epoch_number()?;
        let producers = producers_ready(&self.state);
        let procurers = procurers_ready(&self.state);

        if producers && procurers {
            tracing::info!(epoch = epoch.0, "Everyone is ready, epoch complete");
            return Ok(self.finish());
        }
        if procurers && self.state.needs().is_empty() {
            tracing::info!(
                epoch = epoch.0,
                "Procurers ready and no open needs, epoch complete"
            );
            return Ok(self.finish());
        }
        if producers && self.phase == EpochPhase::AwaitingParticipants {
            tracing::info!(
                epoch = epoch.0,
                offers = self.state.offers().len(),
                "Producers ready, sending offerings"
            );
            self.publish_offerings(publisher)?;
            self.phase = EpochPhase::OfferingSent;
            return Ok(EpochProgress::Pending);
        }
        if producers {
            tracing::debug!(epoch = epoch.0, "Offerings sent, waiting for procurers");
            return Ok(EpochProgress::Pending);
        }

        for (congestion, producer, counter) in pending_producers(&self.state) {
            tracing::debug!(
                epoch = epoch.0,
                congestion_id = %congestion,
                producer = %producer,
                received = counter.received,
                expected = ?counter.expected,
                "Producer not ready"
            );
        }
        Ok(EpochProgress::Pending)
    }

    fn finish(&mut self) -> EpochProgress {
        self.phase = EpochPhase::Done;
        self.completed_epoch = self.epoch.as_ref().map(|tick| tick.number);
        EpochProgress::Complete
    }

    fn epoch_number(&self) -> Result<EpochNumber> {
        self.epoch
            .as_ref()
            .map(|tick| tick.number)
            .ok_or(LfmError::EpochNotActive(EpochNumber::default()))
    }

    // -----------------------------------------------------------------
    // Publication
    // -----------------------------------------------------------------

    /// Publish a request for bids on `need`.
    pub fn publish_request<P: Publisher>(
        &self,
        need: &FlexibilityNeed,
        publisher: &mut P,
    ) -> Result<()> {
        let event = RequestEvent::from_need(
            self.epoch_number()?,
            self.state.triggering_ids().to_vec(),
            need,
        );
        tracing::debug!(congestion_id = %need.congestion_id, "Publishing request");
        publisher.publish(&self.topics.request(), OutboundEvent::Request(event))
    }

    fn publish_open_requests<P: Publisher>(&self, publisher: &mut P) -> Result<()> {
        for need in self.state.needs() {
            self.publish_request(need, publisher)?;
        }
        Ok(())
    }

    /// Forward open offers to the procurers that raised the needs.
    ///
    /// Procurers are visited in registry order, their needs in arrival
    /// order. A need without offers gets one empty offering.
    fn publish_offerings<P: Publisher>(&self, publisher: &mut P) -> Result<()> {
        let epoch = self.epoch_number()?;
        let triggers = self.state.triggering_ids();

        for procurer in self.state.registry().procurers() {
            let topic = self.topics.offering(procurer);
            for need in self
                .state
                .needs()
                .iter()
                .filter(|need| &need.procurer_id == procurer)
            {
                let offers: Vec<_> = self.state.offers_for(&need.congestion_id).collect();
                if offers.is_empty() {
                    tracing::debug!(
                        procurer = %procurer,
                        congestion_id = %need.congestion_id,
                        "No offers, publishing empty offering"
                    );
                    let event =
                        OfferingEvent::empty(epoch, triggers.to_vec(), need.congestion_id.clone());
                    publisher.publish(&topic, OutboundEvent::Offering(event))?;
                    continue;
                }

                let offer_count = u32::try_from(offers.len()).unwrap_or(u32::MAX);
                for offer in offers {
                    tracing::debug!(
                        procurer = %procurer,
                        offer_id = %offer.offer_id,
                        "Publishing offering"
                    );
                    let event = OfferingEvent::for_offer(epoch, triggers.to_vec(), offer, offer_count);
                    publisher.publish(&topic, OutboundEvent::Offering(event))?;
                }
            }
        }
        Ok(())
    }

    /// Publish every accepted result, or one empty result if there are none.
    pub fn publish_market_results<P: Publisher>(&self, publisher: &mut P) -> Result<()> {
        let epoch = self.epoch_number()?;
        let topic = self.topics.market_result();
        let triggers = self.state.triggering_ids();
        let results = self.state.results();

        if results.is_empty() {
            tracing::debug!(epoch = epoch.0, "Publishing empty market result");
            let event = MarketResultEvent::empty(epoch, triggers.to_vec());
            return publisher.publish(&topic, OutboundEvent::MarketResult(event));
        }

        for result in results {
            let same_congestion = results
                .iter()
                .filter(|r| r.congestion_id == result.congestion_id)
                .count();
            let result_count = u32::try_from(same_congestion).unwrap_or(u32::MAX);
            let event = MarketResultEvent::for_result(epoch, triggers.to_vec(), result, result_count);
            publisher.publish(&topic, OutboundEvent::MarketResult(event))?;
        }
        tracing::info!(epoch = epoch.0, results = results.len(), "Market results published");
        Ok(())
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    #[must_use]
    pub fn state(&self) -> &EpochState {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut EpochState {
        &mut self.state
    }

    #[must_use]
    pub fn phase(&self) -> EpochPhase {
        self.phase
    }

    #[must_use]
    pub fn current_epoch(&self) -> Option<EpochNumber> {
        self.epoch.as_ref().map(|tick| tick.number)
    }

    #[must_use]
    pub fn completed_epoch(&self) -> Option<EpochNumber> {
        self.completed_epoch
    }

    /// An epoch other than epoch 0 is running and has not completed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        match self.current_epoch() {
            Some(epoch) => !epoch.is_initialization() && self.completed_epoch != Some(epoch),
            None => false,
        }
    }

    /// Window decision for the current epoch; false before it is evaluated.
    #[must_use]
    pub fn market_open(&self) -> bool {
        self.market_open
    }

    #[must_use]
    pub fn topics(&self) -> &Topics {
        &self.topics
    }
}

#[cfg(test)]
mod tests {
    use lfm_types::{Offer, ParticipantId};

    use super::*;
    use crate::RecordingPublisher;

    fn config(procurers: &[&str], producers: &[&str]) -> MarketConfig {
        MarketConfig {
            component_name: "LFM1".to_string(),
            open_hour: 8,
            close_hour: 20,
            procurers: procurers.iter().map(|p| ParticipantId::new(*p)).collect(),
            producers: producers.iter().map(|p| ParticipantId::new(*p)).collect(),
        }
    }

    fn controller() -> EpochController {
        EpochController::new(&config(&["pgo-1"], &["der-1"])).unwrap()
    }

    #[test]
    fn process_before_any_epoch_is_rejected() {
        let mut ctl = controller();
        let err = ctl
            .process_epoch(&mut RecordingPublisher::new())
            .unwrap_err();
        assert!(matches!(err, LfmError::EpochNotActive(_)));
        assert!(!ctl.is_active());
    }

    #[test]
    fn initialization_epoch_completes_silently() {
        let mut ctl = controller();
        let mut publisher = RecordingPublisher::new();
        let progress = ctl.begin_epoch(EpochTick::dummy(0, 12), &mut publisher).unwrap();
        assert_eq!(progress, EpochProgress::Complete);
        assert!(publisher.is_empty());
        assert!(!ctl.is_active());
    }

    #[test]
    fn closed_market_completes_after_initial_results() {
        let mut ctl = controller();
        let mut publisher = RecordingPublisher::new();
        let progress = ctl.begin_epoch(EpochTick::dummy(1, 5), &mut publisher).unwrap();
        assert_eq!(progress, EpochProgress::Complete);
        assert_eq!(ctl.phase(), EpochPhase::Done);
        assert!(!ctl.market_open());
        assert_eq!(publisher.len(), 1);
        let (topic, event) = &publisher.published()[0];
        assert_eq!(topic, "LFMMarketResult.LFM1");
        assert!(matches!(event, OutboundEvent::MarketResult(r) if r.is_empty()));
    }

    #[test]
    fn open_market_waits_for_participants() {
        let mut ctl = controller();
        let mut publisher = RecordingPublisher::new();
        let progress = ctl.begin_epoch(EpochTick::dummy(1, 9), &mut publisher).unwrap();
        assert_eq!(progress, EpochProgress::Pending);
        assert_eq!(ctl.phase(), EpochPhase::AwaitingParticipants);
        assert!(ctl.market_open());
        assert!(ctl.is_active());
        // Only the initial market result; no needs yet, so no requests.
        assert_eq!(publisher.len(), 1);
    }

    #[test]
    fn repeated_invocation_is_idempotent() {
        let mut ctl = controller();
        let mut publisher = RecordingPublisher::new();
        ctl.begin_epoch(EpochTick::dummy(1, 9), &mut publisher).unwrap();
        ctl.state_mut()
            .record_need(FlexibilityNeed::dummy("c-1", "pgo-1"))
            .unwrap();
        ctl.state_mut()
            .record_offer(Offer::dummy("o-1", "c-1", "der-1", 1))
            .unwrap();

        ctl.process_epoch(&mut publisher).unwrap();
        assert_eq!(ctl.phase(), EpochPhase::OfferingSent);
        let after_first = publisher.len();
        let state_before = ctl.state().clone();

        let progress = ctl.process_epoch(&mut publisher).unwrap();
        assert_eq!(progress, EpochProgress::Pending);
        assert_eq!(publisher.len(), after_first);
        assert_eq!(ctl.phase(), EpochPhase::OfferingSent);
        assert_eq!(ctl.state(), &state_before);
    }

    #[test]
    fn offerings_group_by_procurer_and_count_offers() {
        let mut ctl = EpochController::new(&config(&["pgo-1", "pgo-2"], &["der-1"])).unwrap();
        let mut publisher = RecordingPublisher::new();
        ctl.begin_epoch(EpochTick::dummy(3, 10), &mut publisher).unwrap();
        publisher.drain();

        let state = ctl.state_mut();
        state
            .record_need(FlexibilityNeed::dummy("c-2", "pgo-2"))
            .unwrap();
        state
            .record_need(FlexibilityNeed::dummy("c-1", "pgo-1"))
            .unwrap();
        state
            .record_offer(Offer::dummy("o-1", "c-1", "der-1", 2))
            .unwrap();
        state
            .record_offer(Offer::dummy("o-2", "c-1", "der-1", 2))
            .unwrap();
        state
            .record_offer(Offer::dummy_none("c-2", "der-1"))
            .unwrap();

        ctl.process_epoch(&mut publisher).unwrap();

        let published = publisher.published();
        assert_eq!(published.len(), 3);
        // pgo-1 first: registry order, not need order.
        assert_eq!(published[0].0, "LFMOffering.pgo-1");
        assert_eq!(published[1].0, "LFMOffering.pgo-1");
        assert_eq!(published[2].0, "LFMOffering.pgo-2");
        for (_, event) in &published[..2] {
            let OutboundEvent::Offering(offering) = event else {
                panic!("expected offering");
            };
            assert_eq!(offering.offer_count, 2);
            assert_eq!(offering.epoch_number, EpochNumber(3));
        }
        let OutboundEvent::Offering(empty) = &published[2].1 else {
            panic!("expected offering");
        };
        assert!(empty.is_empty());
        assert_eq!(empty.offer_count, 0);
        assert_eq!(empty.congestion_id.as_str(), "c-2");
    }

    #[test]
    fn result_count_is_per_congestion() {
        let mut ctl = controller();
        let mut publisher = RecordingPublisher::new();
        ctl.begin_epoch(EpochTick::dummy(1, 9), &mut publisher).unwrap();
        publisher.drain();
        let state = ctl.state_mut();
        state.results.push(Offer::dummy("o-1", "c-1", "der-1", 2));
        state.results.push(Offer::dummy("o-2", "c-1", "der-1", 2));
        state.results.push(Offer::dummy("o-3", "c-2", "der-1", 1));

        ctl.publish_market_results(&mut publisher).unwrap();
        let counts: Vec<u32> = publisher
            .published()
            .iter()
            .map(|(_, e)| match e {
                OutboundEvent::MarketResult(r) => r.result_count,
                _ => panic!("expected market result"),
            })
            .collect();
        assert_eq!(counts, vec![2, 2, 1]);
    }

    #[test]
    fn publish_failure_propagates_and_keeps_phase() {
        let mut ctl = controller();
        let mut publisher = RecordingPublisher::failing_after(0);
        let err = ctl
            .begin_epoch(EpochTick::dummy(1, 9), &mut publisher)
            .unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(ctl.phase(), EpochPhase::NotStarted);
    }

    #[test]
    fn new_epoch_resets_previous_state() {
        let mut ctl = controller();
        let mut publisher = RecordingPublisher::new();
        ctl.begin_epoch(EpochTick::dummy(1, 9), &mut publisher).unwrap();
        ctl.state_mut()
            .record_need(FlexibilityNeed::dummy("c-1", "pgo-1"))
            .unwrap();

        ctl.begin_epoch(EpochTick::dummy(2, 10), &mut publisher).unwrap();
        assert!(ctl.state().needs().is_empty());
        assert_eq!(ctl.current_epoch(), Some(EpochNumber(2)));
        assert_eq!(ctl.phase(), EpochPhase::AwaitingParticipants);
    }

    #[test]
    fn rejects_invalid_config() {
        let mut cfg = config(&[], &[]);
        cfg.close_hour = 30;
        assert!(EpochController::new(&cfg).is_err());
    }
}
