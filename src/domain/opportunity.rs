//! Value opportunities and their status machine.
//!
//! ```text
//! none ──detect──▶ active ──refresh──▶ active
//!                    │
//!                    ├──▶ odds_moved   (edge fell below threshold / price moved)
//!                    ├──▶ expired      (kickoff passed, no settlement)
//!                    └──▶ won | lost   (external settlement only)
//! ```
//!
//! Every status other than `active` is terminal for its record.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::evaluate::PriceEvaluation;
use super::id::{MatchKey, OpportunityId, OpportunityKey};

/// Lifecycle status of a value opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityStatus {
    Active,
    OddsMoved,
    Expired,
    Won,
    Lost,
}

impl OpportunityStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::OddsMoved => "odds_moved",
            Self::Expired => "expired",
            Self::Won => "won",
            Self::Lost => "lost",
        }
    }

    /// Whether `self -> next` is a legal status change.
    ///
    /// Only `active` records move, and never back to `active`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (
                Self::Active,
                Self::OddsMoved | Self::Expired | Self::Won | Self::Lost
            )
        )
    }
}

impl fmt::Display for OpportunityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OpportunityStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "odds_moved" => Ok(Self::OddsMoved),
            "expired" => Ok(Self::Expired),
            "won" => Ok(Self::Won),
            "lost" => Ok(Self::Lost),
            other => Err(format!("unknown opportunity status '{other}'")),
        }
    }
}

/// Outcome reported by the settlement collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Settlement {
    Won,
    Lost,
}

impl Settlement {
    pub const fn status(self) -> OpportunityStatus {
        match self {
            Self::Won => OpportunityStatus::Won,
            Self::Lost => OpportunityStatus::Lost,
        }
    }
}

impl FromStr for Settlement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "won" => Ok(Self::Won),
            "lost" => Ok(Self::Lost),
            other => Err(format!("settlement must be 'won' or 'lost', got '{other}'")),
        }
    }
}

/// A detected mispricing between a sharp reference and a soft book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueOpportunity {
    pub id: OpportunityId,
    pub match_key: MatchKey,
    pub match_name: String,
    pub sport: String,
    pub league: String,
    pub kickoff_time: DateTime<Utc>,
    pub market: String,
    pub selection: String,
    pub sharp_bookmaker: Option<String>,
    pub sharp_odds: Option<Decimal>,
    pub soft_bookmaker: String,
    pub soft_odds: Decimal,
    pub edge_percent: Decimal,
    pub kelly_fraction: Decimal,
    pub status: OpportunityStatus,
    /// First seen; a refresh never moves it.
    pub detected_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set when the record leaves `active` through `odds_moved` or `expired`.
    pub expired_at: Option<DateTime<Utc>>,
    pub bet_link: Option<String>,
}

impl ValueOpportunity {
    /// Open a new `active` record from a qualifying evaluation.
    #[must_use]
    pub fn detect(evaluation: &PriceEvaluation, now: DateTime<Utc>) -> Self {
        Self {
            id: OpportunityId::generate(),
            match_key: evaluation.key.match_key.clone(),
            match_name: evaluation.match_name.clone(),
            sport: evaluation.sport.clone(),
            league: evaluation.league.clone(),
            kickoff_time: evaluation.kickoff_time,
            market: evaluation.key.market.clone(),
            selection: evaluation.key.selection.clone(),
            sharp_bookmaker: Some(evaluation.sharp_bookmaker.clone()),
            sharp_odds: Some(evaluation.sharp_odds()),
            soft_bookmaker: evaluation.key.soft_bookmaker.clone(),
            soft_odds: evaluation.soft_odds(),
            edge_percent: evaluation.edge_percent(),
            kelly_fraction: evaluation.kelly_fraction,
            status: OpportunityStatus::Active,
            detected_at: now,
            updated_at: now,
            expired_at: None,
            bet_link: evaluation.bet_link.clone(),
        }
    }

    /// The tuple this record is tracked under.
    pub fn key(&self) -> OpportunityKey {
        OpportunityKey::new(
            self.match_key.clone(),
            self.market.clone(),
            self.selection.clone(),
            self.soft_bookmaker.clone(),
        )
    }

    pub fn is_active(&self) -> bool {
        self.status == OpportunityStatus::Active
    }

    /// Update prices from a fresh qualifying evaluation, keeping `detected_at`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidStateTransition`] if the record is not active.
    pub fn refresh(
        &mut self,
        evaluation: &PriceEvaluation,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if !self.is_active() {
            return Err(DomainError::InvalidStateTransition {
                key: self.key().to_string(),
                from: Some(self.status),
                to: OpportunityStatus::Active,
            });
        }
        self.sharp_bookmaker = Some(evaluation.sharp_bookmaker.clone());
        self.sharp_odds = Some(evaluation.sharp_odds());
        self.soft_odds = evaluation.soft_odds();
        self.edge_percent = evaluation.edge_percent();
        self.kelly_fraction = evaluation.kelly_fraction;
        self.updated_at = now;
        if evaluation.bet_link.is_some() {
            self.bet_link = evaluation.bet_link.clone();
        }
        Ok(())
    }

    /// Move to `next`, failing loudly on an illegal change.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidStateTransition`] unless the record is
    /// active and `next` is a terminal status.
    pub fn transition(
        &mut self,
        next: OpportunityStatus,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidStateTransition {
                key: self.key().to_string(),
                from: Some(self.status),
                to: next,
            });
        }
        self.status = next;
        self.updated_at = at;
        if matches!(next, OpportunityStatus::OddsMoved | OpportunityStatus::Expired) {
            self.expired_at = Some(at);
        }
        Ok(())
    }
}

/// Whether an active opportunity's fixture has kicked off.
#[must_use]
pub fn is_expired(opportunity: &ValueOpportunity, now: DateTime<Utc>) -> bool {
    opportunity.is_active() && now >= opportunity.kickoff_time
}
