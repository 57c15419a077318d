//! Subscriber setup for the node binary.
//!
//! `RUST_LOG` overrides the default filter. `LFM_LOG_FORMAT=json` switches
//! to one JSON object per line.

use lfm_types::{LfmError, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable selecting the output format.
pub const ENV_LOG_FORMAT: &str = "LFM_LOG_FORMAT";

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "warn,lfm_types=info,lfm_market=info,lfm_node=info";

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// Read [`ENV_LOG_FORMAT`]; anything but `json` means text.
    pub fn from_env() -> Self {
        Self::parse(std::env::var(ENV_LOG_FORMAT).ok().as_deref())
    }

    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// Install the global subscriber. Logs go to stderr; stdout carries data.
///
/// # Errors
/// `Configuration` if the filter does not parse or a subscriber is
/// already installed.
pub fn init_logging(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))
        .map_err(|e| LfmError::Configuration(format!("invalid log filter: {e}")))?;

    let registry = tracing_subscriber::registry().with(filter);
    let installed = match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true).with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .try_init(),
    };
    installed.map_err(|e| LfmError::Configuration(format!("logging already initialized: {e}")))
}
