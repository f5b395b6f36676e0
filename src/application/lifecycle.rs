//! Opportunity lifecycle manager.
//!
//! Owns every status change of a [`ValueOpportunity`]. Work on one
//! [`OpportunityKey`] is serialized by an in-process async mutex, and every
//! write goes through [`OpportunityStore::update_if_status`], so two writers in
//! different processes still cannot both act on the same `active` record.
//! Unrelated tuples never contend.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::{
    is_expired, DomainError, OpportunityKey, OpportunityStatus, PriceEvaluation, Settlement,
    ValueOpportunity,
};
use crate::error::{Error, Result};
use crate::port::OpportunityStore;

/// Thresholds the manager applies to fresh evaluations.
#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleConfig {
    /// Minimum edge in percent for an evaluation to count as value.
    pub min_edge_threshold: Decimal,
    /// Relative price change that closes a still-qualifying record and opens
    /// a new one. `None` refreshes the record in place instead.
    pub odds_move_tolerance: Option<Decimal>,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            min_edge_threshold: Decimal::from(3),
            odds_move_tolerance: None,
        }
    }
}

/// What [`LifecycleManager::apply`] did to a tuple.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transition {
    /// No active record and nothing worth opening.
    Ignored,
    Created { opportunity: ValueOpportunity },
    Refreshed { opportunity: ValueOpportunity },
    /// The price moved past the tolerance while still qualifying.
    Superseded {
        previous: ValueOpportunity,
        current: ValueOpportunity,
    },
    OddsMoved { opportunity: ValueOpportunity },
    Expired { opportunity: ValueOpportunity },
}

impl Transition {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Ignored => "ignored",
            Self::Created { .. } => "created",
            Self::Refreshed { .. } => "refreshed",
            Self::Superseded { .. } => "superseded",
            Self::OddsMoved { .. } => "odds_moved",
            Self::Expired { .. } => "expired",
        }
    }

    /// The record left active or closed by this transition, if any.
    pub fn opportunity(&self) -> Option<&ValueOpportunity> {
        match self {
            Self::Ignored => None,
            Self::Created { opportunity }
            | Self::Refreshed { opportunity }
            | Self::OddsMoved { opportunity }
            | Self::Expired { opportunity } => Some(opportunity),
            Self::Superseded { current, .. } => Some(current),
        }
    }
}

/// Outcome of [`LifecycleManager::sweep_expired`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Sweep {
    pub expired: Vec<ValueOpportunity>,
    /// Tuples whose expiry write failed; they stay for the next sweep.
    pub failed: usize,
}

/// Serialized state machine over a shared [`OpportunityStore`].
pub struct LifecycleManager<S> {
    store: Arc<S>,
    config: LifecycleConfig,
    locks: DashMap<OpportunityKey, Arc<Mutex<()>>>,
}

impl<S: OpportunityStore> LifecycleManager<S> {
    pub fn new(store: Arc<S>, config: LifecycleConfig) -> Self {
        Self {
            store,
            config,
            locks: DashMap::new(),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    fn lock_for(&self, key: &OpportunityKey) -> Arc<Mutex<()>> {
        self.locks.entry(key.clone()).or_default().clone()
    }

    /// Drop tuple locks nobody is holding or waiting on.
    pub fn prune_locks(&self) {
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    /// Number of tuples with a lock entry.
    pub fn tracked_tuples(&self) -> usize {
        self.locks.len()
    }

    /// Fold one fresh evaluation into the tuple's state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Conflict`] if another writer changed the tuple between
    /// the read and the conditional write, and any store error.
    pub async fn apply(
        &self,
        evaluation: &PriceEvaluation,
        now: DateTime<Utc>,
    ) -> Result<Transition> {
        let key = &evaluation.key;
        let lock = self.lock_for(key);
        let _guard = lock.lock().await;

        let active = self.store.find_active(key).await?;

        if now >= evaluation.kickoff_time {
            return match active {
                Some(current) => self.close(current, OpportunityStatus::Expired, now).await,
                None => {
                    debug!(tuple = %key, "Ignoring evaluation for started match");
                    Ok(Transition::Ignored)
                }
            };
        }

        let qualifies = evaluation.qualifies(self.config.min_edge_threshold);
        match (active, qualifies) {
            (None, false) => Ok(Transition::Ignored),
            (None, true) => {
                let opportunity = ValueOpportunity::detect(evaluation, now);
                self.store.insert(&opportunity).await?;
                info!(
                    tuple = %key,
                    id = %opportunity.id,
                    edge = %opportunity.edge_percent,
                    kelly = %opportunity.kelly_fraction,
                    soft_odds = %opportunity.soft_odds,
                    "Value opportunity detected"
                );
                Ok(Transition::Created { opportunity })
            }
            (Some(current), false) => self.close(current, OpportunityStatus::OddsMoved, now).await,
            (Some(current), true) if self.moved_past_tolerance(&current, evaluation) => {
                let previous = match self.close(current, OpportunityStatus::OddsMoved, now).await? {
                    Transition::OddsMoved { opportunity } => opportunity,
                    other => return Ok(other),
                };
                let current = ValueOpportunity::detect(evaluation, now);
                self.store.insert(&current).await?;
                info!(
                    tuple = %key,
                    previous = %previous.id,
                    id = %current.id,
                    edge = %current.edge_percent,
                    "Value opportunity superseded after price move"
                );
                Ok(Transition::Superseded { previous, current })
            }
            (Some(mut current), true) => {
                current.refresh(evaluation, now)?;
                self.write(&current, OpportunityStatus::Active).await?;
                debug!(
                    tuple = %key,
                    id = %current.id,
                    edge = %current.edge_percent,
                    "Value opportunity refreshed"
                );
                Ok(Transition::Refreshed { opportunity: current })
            }
        }
    }

    /// Apply an external settlement to the tuple's active record.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidStateTransition`] when the tuple has no
    /// active record; the stored records are left untouched.
    pub async fn settle(
        &self,
        key: &OpportunityKey,
        outcome: Settlement,
        now: DateTime<Utc>,
    ) -> Result<ValueOpportunity> {
        let lock = self.lock_for(key);
        let _guard = lock.lock().await;

        let target = outcome.status();
        let Some(mut current) = self.store.find_active(key).await? else {
            let from = self.store.latest(key).await?.map(|record| record.status);
            warn!(tuple = %key, from = ?from, to = %target, "Rejected settlement");
            return Err(DomainError::InvalidStateTransition {
                key: key.to_string(),
                from,
                to: target,
            }
            .into());
        };

        current.transition(target, now)?;
        if !self.store.update_if_status(&current, OpportunityStatus::Active).await? {
            let from = self.store.get(&current.id).await?.map(|record| record.status);
            return Err(DomainError::InvalidStateTransition {
                key: key.to_string(),
                from,
                to: target,
            }
            .into());
        }
        info!(tuple = %key, id = %current.id, status = %target, "Value opportunity settled");
        Ok(current)
    }

    /// Expire every active record whose kickoff has passed.
    ///
    /// A failure on one tuple is logged and counted in [`Sweep::failed`]; the
    /// rest of the sweep continues.
    ///
    /// # Errors
    ///
    /// Returns a store error only if the active records cannot be listed.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<Sweep> {
        let candidates: Vec<_> = self
            .store
            .list_active()
            .await?
            .into_iter()
            .filter(|record| is_expired(record, now))
            .collect();

        let mut sweep = Sweep::default();
        for candidate in candidates {
            let key = candidate.key();
            match self.expire(&key, now).await {
                Ok(Some(opportunity)) => sweep.expired.push(opportunity),
                Ok(None) => {}
                Err(error) => {
                    sweep.failed += 1;
                    warn!(tuple = %key, error = %error, "Expiry failed");
                }
            }
        }

        self.prune_locks();
        if !sweep.expired.is_empty() {
            info!(count = sweep.expired.len(), "Expired opportunities past kickoff");
        }
        Ok(sweep)
    }

    async fn expire(
        &self,
        key: &OpportunityKey,
        now: DateTime<Utc>,
    ) -> Result<Option<ValueOpportunity>> {
        let lock = self.lock_for(key);
        let _guard = lock.lock().await;

        // Re-read under the lock; a settlement may have won the race.
        let Some(current) = self.store.find_active(key).await? else {
            return Ok(None);
        };
        if !is_expired(&current, now) {
            return Ok(None);
        }
        match self.close(current, OpportunityStatus::Expired, now).await? {
            Transition::Expired { opportunity } => Ok(Some(opportunity)),
            _ => Ok(None),
        }
    }

    fn moved_past_tolerance(
        &self,
        current: &ValueOpportunity,
        evaluation: &PriceEvaluation,
    ) -> bool {
        let Some(tolerance) = self.config.odds_move_tolerance else {
            return false;
        };
        let soft_moved = relative_change(current.soft_odds, evaluation.soft_odds()) > tolerance;
        let sharp_moved = current
            .sharp_odds
            .is_some_and(|sharp| relative_change(sharp, evaluation.sharp_odds()) > tolerance);
        soft_moved || sharp_moved
    }

    async fn close(
        &self,
        mut current: ValueOpportunity,
        status: OpportunityStatus,
        now: DateTime<Utc>,
    ) -> Result<Transition> {
        current.transition(status, now)?;
        self.write(&current, OpportunityStatus::Active).await?;
        info!(
            tuple = %current.key(),
            id = %current.id,
            status = %status,
            "Value opportunity closed"
        );
        Ok(match status {
            OpportunityStatus::Expired => Transition::Expired { opportunity: current },
            _ => Transition::OddsMoved { opportunity: current },
        })
    }

    async fn write(&self, record: &ValueOpportunity, expected: OpportunityStatus) -> Result<()> {
        if self.store.update_if_status(record, expected).await? {
            Ok(())
        } else {
            Err(Error::Conflict(format!(
                "{} is no longer {expected}",
                record.key()
            )))
        }
    }
}

/// `|new - old| / old`; zero when `old` is zero, saturating on overflow.
fn relative_change(old: Decimal, new: Decimal) -> Decimal {
    if old.is_zero() {
        return Decimal::ZERO;
    }
    new.checked_sub(old)
        .and_then(|delta| delta.checked_div(old))
        .map_or(Decimal::MAX, |change| change.abs())
}
