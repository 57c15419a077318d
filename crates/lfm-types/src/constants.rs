//! System-wide constants for the LFM coordinator.

/// Environment variable: hour of day (0-23) at which the market opens.
pub const ENV_MARKET_OPENING_TIME: &str = "MarketOpeningTime";

/// Environment variable: hour of day (0-23) at which the market closes.
pub const ENV_MARKET_CLOSING_TIME: &str = "MarketClosingTime";

/// Environment variable: comma-separated producer (flexibility provider) ids.
pub const ENV_FLEXIBILITY_PROVIDER_LIST: &str = "FlexibilityProviderList";

/// Environment variable: comma-separated procurer ids.
pub const ENV_FLEXIBILITY_PROCURER_LIST: &str = "FlexibilityProcurerList";

/// Environment variable: this component's name on the simulation bus.
pub const ENV_COMPONENT_NAME: &str = "SIMULATION_COMPONENT_NAME";

/// Component name used when none is configured.
pub const DEFAULT_COMPONENT_NAME: &str = "lfm";

/// Latest valid hour of day for the market window.
pub const MAX_HOUR_OF_DAY: u32 = 23;

// Topics the coordinator listens to.
pub const FLEXNEED_TOPIC_PREFIX: &str = "FlexibilityNeed.";
pub const OFFER_TOPIC_PREFIX: &str = "Offer.";
pub const SELECTED_OFFER_TOPIC_PREFIX: &str = "SelectedOffer.";
/// Procurers publish a copy of their ready status here, one topic per procurer.
pub const PROCURER_READY_TOPIC_PREFIX: &str = "PgoReady.";

// Topics the coordinator publishes to.
pub const REQUEST_TOPIC_PREFIX: &str = "Request.";
pub const OFFERING_TOPIC_PREFIX: &str = "LFMOffering.";
pub const MARKET_RESULT_TOPIC_PREFIX: &str = "LFMMarketResult.";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
