//! Sharp-vs-soft edge calculation.

use rust_decimal::Decimal;
use serde::Serialize;

use super::error::{DomainError, OddsSide};

/// Result of comparing a soft price against a sharp reference.
///
/// Only constructed by [`compute_edge`], so both odds are known to be
/// greater than 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EdgeEstimate {
    sharp_odds: Decimal,
    soft_odds: Decimal,
    true_probability: Decimal,
    implied_probability: Decimal,
    edge_percent: Decimal,
}

impl EdgeEstimate {
    pub fn sharp_odds(&self) -> Decimal {
        self.sharp_odds
    }

    pub fn soft_odds(&self) -> Decimal {
        self.soft_odds
    }

    /// `1 / sharp_odds`, the sharp price used as-is as the fair probability.
    pub fn true_probability(&self) -> Decimal {
        self.true_probability
    }

    /// `1 / soft_odds`.
    pub fn implied_probability(&self) -> Decimal {
        self.implied_probability
    }

    /// Signed edge in percent; positive means the soft book pays more than fair.
    pub fn edge_percent(&self) -> Decimal {
        self.edge_percent
    }

    /// Whether the edge reaches `threshold` (percent).
    pub fn clears(&self, threshold: Decimal) -> bool {
        self.edge_percent >= threshold
    }
}

/// Compute the percentage edge of `soft_odds` over the sharp reference.
///
/// `edge = (1/sharp - 1/soft) / (1/soft) * 100`, evaluated in the equivalent
/// form `(soft / sharp - 1) * 100` so that Decimal division happens once.
/// The sharp price is not de-vigged.
///
/// # Errors
///
/// Returns [`DomainError::InvalidOdds`] if either price is not greater than 1,
/// and [`DomainError::OddsOutOfRange`] if the edge overflows `Decimal`.
///
/// ```
/// use vantedge::domain::compute_edge;
/// use rust_decimal_macros::dec;
///
/// let estimate = compute_edge(dec!(2.00), dec!(2.30)).unwrap();
/// assert_eq!(estimate.edge_percent(), dec!(15));
/// ```
pub fn compute_edge(sharp_odds: Decimal, soft_odds: Decimal) -> Result<EdgeEstimate, DomainError> {
    ensure_valid(OddsSide::Sharp, sharp_odds)?;
    ensure_valid(OddsSide::Soft, soft_odds)?;

    let edge_percent = soft_odds
        .checked_div(sharp_odds)
        .and_then(|ratio| ratio.checked_sub(Decimal::ONE))
        .and_then(|excess| excess.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or_else(|| out_of_range(sharp_odds, soft_odds))?
        .normalize();

    Ok(EdgeEstimate {
        sharp_odds,
        soft_odds,
        true_probability: Decimal::ONE / sharp_odds,
        implied_probability: Decimal::ONE / soft_odds,
        edge_percent,
    })
}

pub(crate) fn out_of_range(sharp_odds: Decimal, soft_odds: Decimal) -> DomainError {
    DomainError::OddsOutOfRange {
        sharp_odds,
        soft_odds,
    }
}

pub(crate) fn ensure_valid(side: OddsSide, odds: Decimal) -> Result<(), DomainError> {
    if odds <= Decimal::ONE {
        return Err(DomainError::InvalidOdds { side, odds });
    }
    Ok(())
}
