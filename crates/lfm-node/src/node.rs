//! The coordinator's epoch loop.
//!
//! The node is the only owner of the epoch state. Inputs are handled to
//! completion, including every resulting publication, before the next one is
//! read, so the controller never runs concurrently with itself.

use lfm_market::{EventRouter, RouteOutcome};
use lfm_types::{
    EpochNumber, EpochProgress, EpochTick, InboundEvent, MarketConfig, OutboundEvent, Result,
};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::ChannelPublisher;

/// One record from the simulation bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeInput {
    /// The clock announced a new epoch.
    Epoch(EpochTick),
    /// A domain event for the current epoch.
    Event(InboundEvent),
}

/// One record for the simulation bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeOutput {
    Published { topic: String, event: OutboundEvent },
    /// The component's ready status for `epoch`.
    EpochCompleted { epoch: EpochNumber },
}

/// A coordinator instance wired to its output channel.
#[derive(Debug)]
pub struct MarketNode {
    router: EventRouter,
    publisher: ChannelPublisher,
}

impl MarketNode {
    pub fn new(config: &MarketConfig, outputs: mpsc::UnboundedSender<NodeOutput>) -> Result<Self> {
        Ok(Self {
            router: EventRouter::new(config)?,
            publisher: ChannelPublisher::new(outputs),
        })
    }

    #[must_use]
    pub fn router(&self) -> &EventRouter {
        &self.router
    }

    /// Handle one input and report the epoch if it completed.
    ///
    /// # Errors
    /// Only fatal errors; dropped events are logged by the router.
    pub fn handle(&mut self, input: NodeInput) -> Result<EpochProgress> {
        let progress = match input {
            NodeInput::Epoch(tick) => self.router.begin_epoch(tick, &mut self.publisher)?,
            NodeInput::Event(event) => match self.router.route(event, &mut self.publisher)? {
                RouteOutcome::Handled(progress) => progress,
                RouteOutcome::Ignored | RouteOutcome::Dropped(_) => EpochProgress::Pending,
            },
        };

        if progress.is_complete() {
            if let Some(epoch) = self.router.controller().completed_epoch() {
                tracing::info!(epoch = epoch.0, "Reporting epoch complete");
                self.publisher.report_completed(epoch)?;
            }
        }
        Ok(progress)
    }

    /// Consume inputs until the channel closes or a fatal error occurs.
    pub async fn run(mut self, mut inputs: mpsc::Receiver<NodeInput>) -> Result<()> {
        tracing::info!("Market node running");
        let mut handled: u64 = 0;
        while let Some(input) = inputs.recv().await {
            if let Err(err) = self.handle(input) {
                tracing::error!(error = %err, handled, "Fatal error, stopping market node");
                return Err(err);
            }
            handled += 1;
        }
        tracing::info!(handled, "Input channel closed, market node stopped");
        Ok(())
    }
}
