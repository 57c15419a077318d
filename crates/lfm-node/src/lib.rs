//! # lfm-node
//!
//! Runtime for one LFM coordinator instance.
//!
//! - [`MarketNode`]: single task owning the [`EventRouter`](lfm_market::EventRouter);
//!   consumes [`NodeInput`] strictly one at a time
//! - [`ChannelPublisher`]: [`Publisher`](lfm_market::Publisher) backed by an mpsc channel
//! - [`stdio`]: newline-delimited JSON adapter used by the `lfm-node` binary
//! - [`logging`]: `tracing-subscriber` setup
//!
//! ```text
//! stdin ─NDJSON─▶ read_inputs ─mpsc─▶ MarketNode.run ─mpsc─▶ write_outputs ─NDJSON─▶ stdout
//! ```

pub mod channel;
pub mod logging;
pub mod node;
pub mod stdio;

pub use channel::ChannelPublisher;
pub use logging::{LogFormat, init_logging};
pub use node::{MarketNode, NodeInput, NodeOutput};
