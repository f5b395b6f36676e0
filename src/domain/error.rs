//! Domain validation errors.
//!
//! These errors are returned when a domain invariant is violated: odds that
//! cannot be priced, observations missing identity fields, and lifecycle
//! transitions that are not legal from the current status.
//!
//! # Examples
//!
//! ```
//! use vantedge::domain::{compute_edge, DomainError};
//! use rust_decimal_macros::dec;
//!
//! let result = compute_edge(dec!(0.80), dec!(2.10));
//! assert!(matches!(result, Err(DomainError::InvalidOdds { .. })));
//! ```

use rust_decimal::Decimal;
use thiserror::Error;

use super::opportunity::OpportunityStatus;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Decimal odds must be strictly greater than 1.
    #[error("invalid {side} odds {odds}: decimal odds must be greater than 1")]
    InvalidOdds {
        /// Which side of the comparison carried the bad price.
        side: OddsSide,
        /// The rejected odds value.
        odds: Decimal,
    },

    /// Both prices are valid but their ratio cannot be represented.
    #[error("odds out of range: sharp {sharp_odds}, soft {soft_odds}")]
    OddsOutOfRange {
        sharp_odds: Decimal,
        soft_odds: Decimal,
    },

    /// A required identity field was empty.
    #[error("malformed observation from '{bookmaker}': missing {field}")]
    MalformedObservation {
        /// Bookmaker that produced the record (may itself be empty).
        bookmaker: String,
        /// Name of the missing field.
        field: &'static str,
    },

    /// The requested lifecycle transition is not legal from the current status.
    #[error("cannot transition {key} from {} to {to}", status_label(.from))]
    InvalidStateTransition {
        /// Display form of the opportunity tuple.
        key: String,
        /// Current status, or `None` when no record exists.
        from: Option<OpportunityStatus>,
        /// Requested status.
        to: OpportunityStatus,
    },
}

fn status_label(status: &Option<OpportunityStatus>) -> &'static str {
    status.map_or("none", OpportunityStatus::as_str)
}

/// Which price in a sharp/soft comparison an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OddsSide {
    Sharp,
    Soft,
    Quote,
}

impl std::fmt::Display for OddsSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Sharp => "sharp",
            Self::Soft => "soft",
            Self::Quote => "quoted",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn invalid_odds_message_names_side() {
        let err = DomainError::InvalidOdds {
            side: OddsSide::Soft,
            odds: dec!(0.8),
        };
        assert_eq!(
            err.to_string(),
            "invalid soft odds 0.8: decimal odds must be greater than 1"
        );
    }

    #[test]
    fn out_of_range_message_names_both_prices() {
        let err = DomainError::OddsOutOfRange {
            sharp_odds: dec!(1.01),
            soft_odds: dec!(5000),
        };
        assert_eq!(err.to_string(), "odds out of range: sharp 1.01, soft 5000");
    }

    #[test]
    fn transition_message_without_record() {
        let err = DomainError::InvalidStateTransition {
            key: "a_vs_b_2026-03-01/1X2/Home@bet9ja".into(),
            from: None,
            to: OpportunityStatus::Won,
        };
        assert_eq!(
            err.to_string(),
            "cannot transition a_vs_b_2026-03-01/1X2/Home@bet9ja from none to won"
        );
    }
}
