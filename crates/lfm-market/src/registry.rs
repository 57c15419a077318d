//! Static participant registry for one simulation run.

use lfm_types::{MarketConfig, ParticipantId};

/// Configured procurers and producers, in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParticipantRegistry {
    procurers: Vec<ParticipantId>,
    producers: Vec<ParticipantId>,
}

impl ParticipantRegistry {
    #[must_use]
    pub fn new(procurers: Vec<ParticipantId>, producers: Vec<ParticipantId>) -> Self {
        Self {
            procurers,
            producers,
        }
    }

    #[must_use]
    pub fn from_config(config: &MarketConfig) -> Self {
        Self::new(config.procurers.clone(), config.producers.clone())
    }

    #[must_use]
    pub fn procurers(&self) -> &[ParticipantId] {
        &self.procurers
    }

    #[must_use]
    pub fn producers(&self) -> &[ParticipantId] {
        &self.producers
    }

    #[must_use]
    pub fn is_procurer(&self, id: &ParticipantId) -> bool {
        self.procurers.contains(id)
    }

    #[must_use]
    pub fn is_producer(&self, id: &ParticipantId) -> bool {
        self.producers.contains(id)
    }

    #[must_use]
    pub fn is_known(&self, id: &ParticipantId) -> bool {
        self.is_procurer(id) || self.is_producer(id)
    }
}
