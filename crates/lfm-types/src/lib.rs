//! # lfm-types
//!
//! Shared types, errors, and configuration for the **LFM** (local
//! flexibility market) coordinator.
//!
//! This crate is the leaf dependency of the workspace. It defines:
//!
//! - **Identifiers**: [`ParticipantId`], [`CongestionId`], [`OfferId`], [`MessageId`], [`EpochNumber`]
//! - **Market model**: [`FlexibilityNeed`], [`Offer`], [`Direction`]
//! - **Epoch model**: [`EpochTick`], [`EpochWindow`], [`EpochPhase`], [`EpochProgress`]
//! - **Events**: [`InboundEvent`] (consumed) and [`OutboundEvent`] (published)
//! - **Configuration**: [`MarketConfig`], [`Topics`]
//! - **Errors**: [`LfmError`] with `LFM_ERR_` prefix codes
//! - **Constants**: environment variable names, topic prefixes, defaults

pub mod config;
pub mod constants;
pub mod epoch;
pub mod error;
pub mod events;
pub mod ids;
pub mod market;
pub mod topics;

pub use config::*;
pub use epoch::*;
pub use error::*;
pub use events::*;
pub use ids::*;
pub use market::*;
pub use topics::*;

// Constants are accessed via `lfm_types::constants::FOO`.
