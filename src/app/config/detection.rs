//! Detection thresholds and stake sizing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::application::LifecycleConfig;
use crate::domain::StakeConfig;

/// `[detection]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Minimum edge in percent for a quote to be value.
    pub min_edge_threshold: Decimal,
    /// Fraction of full Kelly to stake.
    pub kelly_multiplier: Decimal,
    /// Hard cap on the recommended bankroll fraction.
    pub kelly_cap_fraction: Decimal,
    /// Relative price change that replaces a still-qualifying record with a
    /// new one. Unset means refresh in place.
    pub odds_move_tolerance: Option<Decimal>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        let stake = StakeConfig::default();
        Self {
            min_edge_threshold: Decimal::from(3),
            kelly_multiplier: stake.kelly_multiplier,
            kelly_cap_fraction: stake.kelly_cap_fraction,
            odds_move_tolerance: None,
        }
    }
}

impl DetectionConfig {
    pub fn stake(&self) -> StakeConfig {
        StakeConfig {
            kelly_multiplier: self.kelly_multiplier,
            kelly_cap_fraction: self.kelly_cap_fraction,
        }
    }

    pub fn lifecycle(&self) -> LifecycleConfig {
        LifecycleConfig {
            min_edge_threshold: self.min_edge_threshold,
            odds_move_tolerance: self.odds_move_tolerance,
        }
    }
}
