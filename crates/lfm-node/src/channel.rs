//! Publisher that forwards publications to an unbounded mpsc channel.

use lfm_market::Publisher;
use lfm_types::{EpochNumber, LfmError, OutboundEvent, Result};
use tokio::sync::mpsc::UnboundedSender;

use crate::NodeOutput;

/// Forwards every publication as a [`NodeOutput`].
///
/// A dropped receiver turns every publish into `PublishFailed`.
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    outputs: UnboundedSender<NodeOutput>,
}

impl ChannelPublisher {
    pub fn new(outputs: UnboundedSender<NodeOutput>) -> Self {
        Self { outputs }
    }

    /// Tell the simulation loop that `epoch` is complete.
    pub fn report_completed(&self, epoch: EpochNumber) -> Result<()> {
        self.outputs
            .send(NodeOutput::EpochCompleted { epoch })
            .map_err(|_| LfmError::PublishFailed {
                topic: "epoch-completed".to_string(),
                reason: "output channel closed".to_string(),
            })
    }
}

impl Publisher for ChannelPublisher {
    fn publish(&mut self, topic: &str, event: OutboundEvent) -> Result<()> {
        self.outputs
            .send(NodeOutput::Published {
                topic: topic.to_string(),
                event,
            })
            .map_err(|_| LfmError::PublishFailed {
                topic: topic.to_string(),
                reason: "output channel closed".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use lfm_types::MarketResultEvent;
    use tokio::sync::mpsc;

    use super::*;

    #[test]
    fn forwards_publications() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut publisher = ChannelPublisher::new(tx);
        let event = OutboundEvent::MarketResult(MarketResultEvent::empty(EpochNumber(1), vec![]));
        publisher.publish("LFMMarketResult.lfm", event.clone()).unwrap();
        assert_eq!(
            rx.try_recv().unwrap(),
            NodeOutput::Published {
                topic: "LFMMarketResult.lfm".to_string(),
                event,
            }
        );
    }

    #[test]
    fn closed_channel_is_publish_failure() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let mut publisher = ChannelPublisher::new(tx);
        let event = OutboundEvent::MarketResult(MarketResultEvent::empty(EpochNumber(1), vec![]));
        let err = publisher.publish("t", event).unwrap_err();
        assert!(matches!(err, LfmError::PublishFailed { ref topic, .. } if topic == "t"));
        assert!(publisher.report_completed(EpochNumber(1)).is_err());
    }
}
