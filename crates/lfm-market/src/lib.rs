//! # lfm-market
//!
//! **Epoch-synchronized matching and readiness state machine** for the
//! local flexibility market.
//!
//! ## Architecture
//!
//! 1. **ParticipantRegistry**: configured procurers and producers
//! 2. **EpochState**: open needs, open offers, results, readiness counters
//! 3. **MarketWindow**: whether an epoch falls within trading hours
//! 4. **readiness**: have all producers and procurers reported?
//! 5. **matcher**: folds a procurer's selection into the results
//! 6. **EpochController**: per-epoch state machine and publication
//! 7. **EventRouter**: dispatches inbound events and re-invokes the controller
//!
//! ## Event Flow
//!
//! ```text
//! EpochTick → EventRouter.begin_epoch() → EpochController (reset, results, requests)
//! InboundEvent → EventRouter.route() → EpochState mutation → EpochController.process_epoch()
//!     → Publisher.publish(Request | Offering | MarketResult)
//! ```
//!
//! Everything here is synchronous and single-owner: one event is fully
//! processed, publications included, before the next is admitted.

pub mod controller;
pub mod matcher;
pub mod publisher;
pub mod readiness;
pub mod registry;
pub mod router;
pub mod state;
pub mod window;

pub use controller::EpochController;
pub use matcher::apply_selection;
pub use publisher::{Publisher, RecordingPublisher};
pub use readiness::{pending_producers, procurers_ready, producers_ready};
pub use registry::ParticipantRegistry;
pub use router::{EventRouter, RouteOutcome};
pub use state::{EpochState, OfferAdmission, OfferCounter, ReadinessCounters};
pub use window::MarketWindow;
