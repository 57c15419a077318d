//! Configuration for one LFM coordinator instance.
//!
//! Read once at startup from the environment. `from_lookup` takes any
//! key → value function so tests never touch the process environment.

use serde::{Deserialize, Serialize};

use crate::{LfmError, ParticipantId, Result, constants};

/// Coordinator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketConfig {
    /// This component's name; used in request and result topics.
    pub component_name: String,
    /// First hour of day (inclusive) in which epochs may trade.
    pub open_hour: u32,
    /// Last hour of day (inclusive) in which epochs may trade.
    pub close_hour: u32,
    /// Procurer ids, in the order offerings are published.
    pub procurers: Vec<ParticipantId>,
    /// Producer ids expected to report on every open need.
    pub producers: Vec<ParticipantId>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            component_name: constants::DEFAULT_COMPONENT_NAME.to_string(),
            open_hour: 0,
            close_hour: 0,
            procurers: Vec::new(),
            producers: Vec::new(),
        }
    }
}

impl MarketConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variable names.
    ///
    /// Missing variables fall back to the defaults: hours 0, empty lists,
    /// component name `lfm`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let component_name = lookup(constants::ENV_COMPONENT_NAME)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| constants::DEFAULT_COMPONENT_NAME.to_string());

        let open_hour = parse_hour(
            constants::ENV_MARKET_OPENING_TIME,
            lookup(constants::ENV_MARKET_OPENING_TIME),
        )?;
        let close_hour = parse_hour(
            constants::ENV_MARKET_CLOSING_TIME,
            lookup(constants::ENV_MARKET_CLOSING_TIME),
        )?;

        let config = Self {
            component_name,
            open_hour,
            close_hour,
            procurers: parse_id_list(lookup(constants::ENV_FLEXIBILITY_PROCURER_LIST)),
            producers: parse_id_list(lookup(constants::ENV_FLEXIBILITY_PROVIDER_LIST)),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check hour ranges and duplicate participant ids.
    pub fn validate(&self) -> Result<()> {
        for (name, hour) in [("open_hour", self.open_hour), ("close_hour", self.close_hour)] {
            if hour > constants::MAX_HOUR_OF_DAY {
                return Err(LfmError::Configuration(format!(
                    "{name} must be within 0..={}, got {hour}",
                    constants::MAX_HOUR_OF_DAY
                )));
            }
        }
        for (kind, ids) in [("procurer", &self.procurers), ("producer", &self.producers)] {
            for (i, id) in ids.iter().enumerate() {
                if ids[..i].contains(id) {
                    return Err(LfmError::Configuration(format!("duplicate {kind} id {id}")));
                }
            }
        }
        Ok(())
    }
}

/// Hours may be written as integers or integral floats ("8", "8.0").
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_hour(key: &str, raw: Option<String>) -> Result<u32> {
    let Some(raw) = raw else {
        return Ok(0);
    };
    let raw = raw.trim();
    if let Ok(hour) = raw.parse::<u32>() {
        return Ok(hour);
    }
    match raw.parse::<f64>() {
        Ok(hour) if hour.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&hour) => {
            Ok(hour as u32)
        }
        _ => Err(LfmError::Configuration(format!(
            "{key} must be a whole hour of day, got {raw:?}"
        ))),
    }
}

fn parse_id_list(raw: Option<String>) -> Vec<ParticipantId> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(ParticipantId::from)
        .collect()
}
