//! Bus topic names derived from the component and participant ids.

use serde::{Deserialize, Serialize};

use crate::{MarketConfig, ParticipantId, constants};

/// Topic names for one coordinator instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topics {
    component_name: String,
    procurers: Vec<ParticipantId>,
}

impl Topics {
    #[must_use]
    pub fn new(config: &MarketConfig) -> Self {
        Self {
            component_name: config.component_name.clone(),
            procurers: config.procurers.clone(),
        }
    }

    /// Where requests for bids are published.
    #[must_use]
    pub fn request(&self) -> String {
        format!("{}{}", constants::REQUEST_TOPIC_PREFIX, self.component_name)
    }

    /// Where market results are published.
    #[must_use]
    pub fn market_result(&self) -> String {
        format!("{}{}", constants::MARKET_RESULT_TOPIC_PREFIX, self.component_name)
    }

    /// Where offerings for `procurer` are published.
    #[must_use]
    pub fn offering(&self, procurer: &ParticipantId) -> String {
        format!("{}{procurer}", constants::OFFERING_TOPIC_PREFIX)
    }

    /// Every topic the transport adapter must subscribe this component to.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<String> {
        let mut topics = vec![
            format!("{}{}", constants::FLEXNEED_TOPIC_PREFIX, self.component_name),
            format!("{}{}", constants::OFFER_TOPIC_PREFIX, self.component_name),
            format!("{}{}", constants::SELECTED_OFFER_TOPIC_PREFIX, self.component_name),
        ];
        topics.extend(
            self.procurers
                .iter()
                .map(|p| format!("{}{p}", constants::PROCURER_READY_TOPIC_PREFIX)),
        );
        topics
    }
}
