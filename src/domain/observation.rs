//! Bookmaker odds observations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::{DomainError, OddsSide};
use super::id::MatchKey;

/// A single bookmaker's quoted decimal price for one outcome.
///
/// Observations are immutable once created; a newer observation for the same
/// (bookmaker, match, market, selection) supersedes an older one rather than
/// mutating it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsObservation {
    pub match_key: MatchKey,
    pub match_name: String,
    pub sport: String,
    pub league: String,
    pub kickoff_time: DateTime<Utc>,
    pub bookmaker: String,
    /// Whether this source is treated as an efficient reference market.
    pub is_sharp: bool,
    pub market: String,
    pub selection: String,
    /// Decimal (European) odds.
    pub odds: Decimal,
    pub observed_at: DateTime<Utc>,
    #[serde(default)]
    pub bet_link: Option<String>,
}

impl OddsObservation {
    /// Check identity fields and the price.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::MalformedObservation`] for an empty match key,
    /// bookmaker, market or selection, and [`DomainError::InvalidOdds`] when
    /// the price is not greater than 1.
    pub fn validate(&self) -> Result<(), DomainError> {
        let required = [
            ("match_key", self.match_key.as_str()),
            ("bookmaker", self.bookmaker.as_str()),
            ("market", self.market.as_str()),
            ("selection", self.selection.as_str()),
        ];
        if let Some(&(field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(DomainError::MalformedObservation {
                bookmaker: self.bookmaker.clone(),
                field,
            });
        }
        if self.odds <= Decimal::ONE {
            return Err(DomainError::InvalidOdds {
                side: OddsSide::Quote,
                odds: self.odds,
            });
        }
        Ok(())
    }

    /// The (market, selection) pair this quote prices.
    pub fn selection_key(&self) -> SelectionKey {
        SelectionKey {
            market: self.market.clone(),
            selection: self.selection.clone(),
        }
    }
}

/// A (market, selection) pair within one fixture, e.g. ("1X2", "Home").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SelectionKey {
    pub market: String,
    pub selection: String,
}
