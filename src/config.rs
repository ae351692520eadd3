//! Game tunables.
//!
//! Defaults reproduce the arcade rules: 8 slots, 5 s to cook, burnt 2 s
//! later, 60 s on the clock, 30 good takoyaki to win. Tests and the
//! `?config=` query parameter override individual fields.

use serde::Deserialize;
use thiserror::Error;

use crate::takoyaki::actions::SLOT_LIMIT;
use crate::time::Millis;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse config JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("slot_count {count} exceeds the maximum of {max}")]
    TooManySlots { count: usize, max: usize },
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of cooking slots on the plate.
    pub slot_count: usize,
    /// Time from filling until a slot is collectible.
    pub cook_time_ms: Millis,
    /// Extra time after cooking until the slot burns.
    pub burn_delay_ms: Millis,
    /// Session length in countdown ticks (seconds at the default interval).
    pub countdown_secs: u32,
    /// Good takoyaki needed to win.
    pub win_threshold: u32,
    /// Period of both the countdown timer and the slot timer.
    pub tick_interval_ms: Millis,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            slot_count: 8,
            cook_time_ms: 5_000,
            burn_delay_ms: 2_000,
            countdown_secs: 60,
            win_threshold: 30,
            tick_interval_ms: 1_000,
        }
    }
}

impl GameConfig {
    /// Parse a JSON override. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("slot_count", self.slot_count as u64),
            ("cook_time_ms", self.cook_time_ms),
            ("burn_delay_ms", self.burn_delay_ms),
            ("countdown_secs", self.countdown_secs as u64),
            ("tick_interval_ms", self.tick_interval_ms),
        ];
        if let Some(&(field, _)) = checks.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::Zero { field });
        }
        // Every slot needs its own click target id.
        let max = SLOT_LIMIT as usize;
        if self.slot_count > max {
            return Err(ConfigError::TooManySlots {
                count: self.slot_count,
                max,
            });
        }
        Ok(())
    }

    /// Elapsed time at which a raw slot becomes burnt.
    pub fn burn_at_ms(&self) -> Millis {
        self.cook_time_ms + self.burn_delay_ms
    }
}

/// Read `?config=<json>` from the page URL. Falls back to the defaults (and
/// logs why) when the parameter is missing or invalid.
#[cfg(target_arch = "wasm32")]
pub fn load_from_query() -> GameConfig {
    let search = web_sys::window().and_then(|w| w.location().search().ok());
    let raw = search
        .and_then(|s| web_sys::UrlSearchParams::new_with_str(&s).ok())
        .and_then(|params| params.get("config"));
    let Some(raw) = raw else {
        return GameConfig::default();
    };
    match GameConfig::from_json(&raw) {
        Ok(config) => {
            tracing::info!(?config, "using config override");
            config
        }
        Err(e) => {
            tracing::warn!(error = %e, "ignoring config override");
            GameConfig::default()
        }
    }
}
