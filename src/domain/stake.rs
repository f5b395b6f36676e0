//! Fractional-Kelly stake sizing.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::edge::{ensure_valid, out_of_range, EdgeEstimate};
use super::error::{DomainError, OddsSide};

/// Kelly scaling and hard cap, both as fractions of bankroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeConfig {
    /// Multiplier applied to full Kelly (0.25 = quarter Kelly).
    #[serde(default = "default_kelly_multiplier")]
    pub kelly_multiplier: Decimal,
    /// Absolute ceiling on the recommended fraction.
    #[serde(default = "default_kelly_cap_fraction")]
    pub kelly_cap_fraction: Decimal,
}

fn default_kelly_multiplier() -> Decimal {
    Decimal::new(25, 2) // 0.25
}

fn default_kelly_cap_fraction() -> Decimal {
    Decimal::new(5, 2) // 0.05
}

impl Default for StakeConfig {
    fn default() -> Self {
        Self {
            kelly_multiplier: default_kelly_multiplier(),
            kelly_cap_fraction: default_kelly_cap_fraction(),
        }
    }
}

impl StakeConfig {
    /// Size a stake for an already-validated edge estimate.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::OddsOutOfRange`] if the Kelly fraction overflows.
    pub fn size(&self, estimate: &EdgeEstimate) -> Result<Decimal, DomainError> {
        self.fraction(estimate.sharp_odds(), estimate.soft_odds())
    }

    fn fraction(&self, sharp_odds: Decimal, soft_odds: Decimal) -> Result<Decimal, DomainError> {
        // probability * soft_odds with probability = 1 / sharp_odds
        let kelly = soft_odds
            .checked_div(sharp_odds)
            .and_then(|expected_return| expected_return.checked_sub(Decimal::ONE))
            .and_then(|gain| gain.checked_div(soft_odds - Decimal::ONE))
            .and_then(|kelly| kelly.checked_mul(self.kelly_multiplier))
            .ok_or_else(|| out_of_range(sharp_odds, soft_odds))?;
        Ok(kelly
            .max(Decimal::ZERO)
            .min(self.kelly_cap_fraction)
            .normalize())
    }
}

/// Recommended stake as a fraction of bankroll, in `[0, kelly_cap_fraction]`.
///
/// `kelly = (p * soft - 1) / (soft - 1)` with `p = 1 / sharp`, scaled by the
/// multiplier and clamped. Negative-edge prices size to zero.
///
/// # Errors
///
/// Returns [`DomainError::InvalidOdds`] if either price is not greater than 1,
/// and [`DomainError::OddsOutOfRange`] if the fraction overflows `Decimal`.
pub fn compute_kelly(
    sharp_odds: Decimal,
    soft_odds: Decimal,
    config: &StakeConfig,
) -> Result<Decimal, DomainError> {
    ensure_valid(OddsSide::Sharp, sharp_odds)?;
    ensure_valid(OddsSide::Soft, soft_odds)?;
    config.fraction(sharp_odds, soft_odds)
}
