//! Event router: applies each inbound event to the epoch state and
//! re-invokes the controller.
//!
//! Events are only admitted while an epoch other than epoch 0 is running
//! and has not completed. Rejected events (malformed, unknown participant,
//! orphan offer, ...) are logged and dropped with state untouched; only
//! publish failures escape as errors.

use lfm_types::{
    EpochProgress, EpochTick, FlexibilityNeed, InboundEvent, LfmError, MarketConfig, Offer,
    Result, SelectionEvent, StatusEvent,
};

use crate::{EpochController, OfferAdmission, Publisher, apply_selection};

/// What happened to one inbound event.
#[derive(Debug)]
pub enum RouteOutcome {
    /// Applied; carries the controller's verdict afterwards.
    Handled(EpochProgress),
    /// No epoch accepting events; nothing was touched.
    Ignored,
    /// Rejected by validation; nothing was touched.
    Dropped(LfmError),
}

impl RouteOutcome {
    /// The event completed the epoch.
    #[must_use]
    pub fn completed_epoch(&self) -> bool {
        matches!(self, Self::Handled(EpochProgress::Complete))
    }
}

/// Owns the controller and feeds it inbound events one at a time.
#[derive(Debug, Clone)]
pub struct EventRouter {
    controller: EpochController,
}

impl EventRouter {
    pub fn new(config: &MarketConfig) -> Result<Self> {
        Ok(Self {
            controller: EpochController::new(config)?,
        })
    }

    #[must_use]
    pub fn controller(&self) -> &EpochController {
        &self.controller
    }

    /// Start a new epoch. See [`EpochController::begin_epoch`].
    pub fn begin_epoch<P: Publisher>(
        &mut self,
        tick: EpochTick,
        publisher: &mut P,
    ) -> Result<EpochProgress> {
        self.controller.begin_epoch(tick, publisher)
    }

    /// Route one inbound event.
    ///
    /// # Errors
    /// Only fatal errors (publish failures) are returned. The event's state
    /// change may already be applied when one is: a need is recorded before
    /// its request is published.
    pub fn route<P: Publisher>(
        &mut self,
        event: InboundEvent,
        publisher: &mut P,
    ) -> Result<RouteOutcome> {
        if !self.controller.is_active() {
            tracing::debug!(
                kind = event.kind(),
                message_id = %event.message_id(),
                epoch = ?self.controller.current_epoch(),
                "No active epoch, ignoring event"
            );
            return Ok(RouteOutcome::Ignored);
        }

        let kind = event.kind();
        let message_id = event.message_id().clone();
        match self.dispatch(event, publisher) {
            Ok(progress) => Ok(RouteOutcome::Handled(progress)),
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                tracing::warn!(kind, message_id = %message_id, error = %err, "Dropping event");
                Ok(RouteOutcome::Dropped(err))
            }
        }
    }

    fn dispatch<P: Publisher>(
        &mut self,
        event: InboundEvent,
        publisher: &mut P,
    ) -> Result<EpochProgress> {
        match event {
            InboundEvent::Need(need) => self.on_need(need, publisher),
            InboundEvent::Offer(offer) => self.on_offer(offer, publisher),
            InboundEvent::Selection(selection) => self.on_selection(selection, publisher),
            InboundEvent::Status(status) => self.on_status(&status, publisher),
        }
    }

    fn on_need<P: Publisher>(
        &mut self,
        need: FlexibilityNeed,
        publisher: &mut P,
    ) -> Result<EpochProgress> {
        tracing::debug!(
            congestion_id = %need.congestion_id,
            procurer = %need.procurer_id,
            "Handling flexibility need"
        );
        let request_source = need.clone();
        let state = self.controller.state_mut();
        state.record_need(need)?;
        state.push_trigger(request_source.message_id.clone());

        self.controller.publish_request(&request_source, publisher)?;
        self.controller.process_epoch(publisher)
    }

    fn on_offer<P: Publisher>(&mut self, offer: Offer, publisher: &mut P) -> Result<EpochProgress> {
        tracing::debug!(
            offer_id = %offer.offer_id,
            congestion_id = %offer.congestion_id,
            producer = %offer.producer_id,
            offer_count = offer.offer_count,
            "Handling offer"
        );
        let message_id = offer.message_id.clone();
        let state = self.controller.state_mut();
        if state.record_offer(offer)? == OfferAdmission::Counted {
            state.push_trigger(message_id);
        }
        self.controller.process_epoch(publisher)
    }

    fn on_selection<P: Publisher>(
        &mut self,
        selection: SelectionEvent,
        publisher: &mut P,
    ) -> Result<EpochProgress> {
        if selection.offer_ids.is_empty() {
            return Err(LfmError::EmptySelection);
        }
        let state = self.controller.state_mut();
        let accepted = apply_selection(state, &selection.offer_ids);
        tracing::info!(
            selected = selection.offer_ids.len(),
            accepted,
            "Selection applied"
        );
        state.push_trigger(selection.message_id);

        self.controller.publish_market_results(publisher)?;
        self.controller.process_epoch(publisher)
    }

    /// Procurer status marks readiness; a producer's status only re-runs
    /// the controller.
    fn on_status<P: Publisher>(
        &mut self,
        status: &StatusEvent,
        publisher: &mut P,
    ) -> Result<EpochProgress> {
        let participant = &status.participant_id;
        let registry = self.controller.state().registry();
        if registry.is_procurer(participant) {
            tracing::info!(procurer = %participant, "Procurer reported ready");
            self.controller
                .state_mut()
                .record_procurer_ready(participant)?;
        } else if !registry.is_known(participant) {
            return Err(LfmError::UnknownParticipant(participant.clone()));
        }
        self.controller.process_epoch(publisher)
    }
}
