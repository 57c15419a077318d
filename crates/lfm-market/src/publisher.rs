//! Outbound publication seam.
//!
//! The coordinator hands typed events to a [`Publisher`]; encoding and bus
//! delivery are the implementor's business. A publish error is fatal for
//! the run and is never retried here.

use lfm_types::{LfmError, OutboundEvent, Result};

/// Sink for outbound domain events.
pub trait Publisher {
    /// Publish `event` on `topic`; returns once the bus has accepted it.
    fn publish(&mut self, topic: &str, event: OutboundEvent) -> Result<()>;
}

impl<P: Publisher + ?Sized> Publisher for &mut P {
    fn publish(&mut self, topic: &str, event: OutboundEvent) -> Result<()> {
        (**self).publish(topic, event)
    }
}

/// Captures publications in memory.
///
/// Used by tests and by embedders that drain publications themselves. Can be
/// primed to fail after a number of successful publishes.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    published: Vec<(String, OutboundEvent)>,
    fail_after: Option<usize>,
}

impl RecordingPublisher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A publisher that accepts `successes` events and then fails.
    #[must_use]
    pub fn failing_after(successes: usize) -> Self {
        Self {
            published: Vec::new(),
            fail_after: Some(successes),
        }
    }

    #[must_use]
    pub fn published(&self) -> &[(String, OutboundEvent)] {
        &self.published
    }

    /// Events published on `topic`, in order.
    pub fn on_topic<'a>(&'a self, topic: &'a str) -> impl Iterator<Item = &'a OutboundEvent> {
        self.published
            .iter()
            .filter(move |(t, _)| t == topic)
            .map(|(_, e)| e)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.published.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.published.is_empty()
    }

    /// Take everything published so far.
    pub fn drain(&mut self) -> Vec<(String, OutboundEvent)> {
        std::mem::take(&mut self.published)
    }
}

impl Publisher for RecordingPublisher {
    fn publish(&mut self, topic: &str, event: OutboundEvent) -> Result<()> {
        if self.fail_after.is_some_and(|limit| self.published.len() >= limit) {
            return Err(LfmError::PublishFailed {
                topic: topic.to_string(),
                reason: "recording publisher primed to fail".to_string(),
            });
        }
        self.published.push((topic.to_string(), event));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use lfm_types::{EpochNumber, MarketResultEvent};

    use super::*;

    fn event() -> OutboundEvent {
        OutboundEvent::MarketResult(MarketResultEvent::empty(EpochNumber(1), vec![]))
    }

    #[test]
    fn records_in_order() {
        let mut publisher = RecordingPublisher::new();
        publisher.publish("a", event()).unwrap();
        publisher.publish("b", event()).unwrap();
        assert_eq!(publisher.len(), 2);
        assert_eq!(publisher.published()[1].0, "b");
        assert_eq!(publisher.on_topic("a").count(), 1);
    }

    #[test]
    fn fails_after_limit() {
        let mut publisher = RecordingPublisher::failing_after(1);
        publisher.publish("a", event()).unwrap();
        let err = publisher.publish("a", event()).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(publisher.len(), 1);
    }

    #[test]
    fn works_through_mut_reference() {
        fn publish_twice(mut p: impl Publisher) {
            p.publish("x", event()).unwrap();
            p.publish("x", event()).unwrap();
        }
        let mut publisher = RecordingPublisher::new();
        publish_twice(&mut publisher);
        assert_eq!(publisher.drain().len(), 2);
        assert!(publisher.is_empty());
    }
}
