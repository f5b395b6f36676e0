//! One detection cycle, end to end.
//!
//! ```text
//! observations ─▶ snapshots ─▶ aggregate ─▶ evaluate ─▶ lifecycle (per tuple) ─▶ sweep ─▶ prune
//! ```
//!
//! Evaluations for different tuples are applied concurrently. A failure on one
//! tuple is logged and counted; it never aborts the rest of the batch.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use futures_util::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use super::lifecycle::{LifecycleConfig, LifecycleManager, Transition};
use crate::domain::{aggregate, evaluate, OddsObservation, StakeConfig, ValueOpportunity};
use crate::error::Result;
use crate::port::{OddsSource, OpportunityStore, SnapshotStore};

/// Default retention window for raw odds snapshots.
pub const DEFAULT_SNAPSHOT_RETENTION_HOURS: i64 = 1;

/// Counts from one [`DetectionPipeline::run_cycle`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CycleReport {
    pub observations: usize,
    pub retained: usize,
    /// Observations replaced by a newer quote from the same bookmaker.
    pub superseded: usize,
    pub malformed: usize,
    pub invalid_odds: usize,
    /// Soft quotes with no sharp reference.
    pub unreferenced: usize,
    pub evaluated: usize,
    pub created: usize,
    pub refreshed: usize,
    pub superseded_opportunities: usize,
    pub odds_moved: usize,
    pub expired: usize,
    /// Tuples whose lifecycle update failed.
    pub failed: usize,
    pub snapshots_pruned: usize,
    pub duration_ms: u64,
    /// Records opened or refreshed this cycle, highest edge first.
    pub opportunities: Vec<ValueOpportunity>,
}

impl CycleReport {
    fn count(&mut self, transition: Transition) {
        match transition {
            Transition::Ignored => {}
            Transition::Created { opportunity } => {
                self.created += 1;
                self.opportunities.push(opportunity);
            }
            Transition::Refreshed { opportunity } => {
                self.refreshed += 1;
                self.opportunities.push(opportunity);
            }
            Transition::Superseded { current, .. } => {
                self.superseded_opportunities += 1;
                self.opportunities.push(current);
            }
            Transition::OddsMoved { .. } => self.odds_moved += 1,
            Transition::Expired { .. } => self.expired += 1,
        }
    }
}

/// Ties the pure detection core to a store.
pub struct DetectionPipeline<S> {
    lifecycle: LifecycleManager<S>,
    stake: StakeConfig,
    snapshot_retention: Duration,
}

impl<S: OpportunityStore + SnapshotStore> DetectionPipeline<S> {
    pub fn new(store: Arc<S>, lifecycle: LifecycleConfig, stake: StakeConfig) -> Self {
        Self {
            lifecycle: LifecycleManager::new(store, lifecycle),
            stake,
            snapshot_retention: Duration::hours(DEFAULT_SNAPSHOT_RETENTION_HOURS),
        }
    }

    #[must_use]
    pub fn with_snapshot_retention(mut self, retention: Duration) -> Self {
        self.snapshot_retention = retention;
        self
    }

    pub fn lifecycle(&self) -> &LifecycleManager<S> {
        &self.lifecycle
    }

    /// Fetch one batch from `source` and run it.
    ///
    /// Records the source rejected are reported as malformed observations.
    ///
    /// # Errors
    ///
    /// Returns the source's error if the fetch fails, otherwise as
    /// [`run_cycle`](Self::run_cycle).
    pub async fn run_source<O: OddsSource>(
        &self,
        source: &O,
        now: DateTime<Utc>,
    ) -> Result<CycleReport> {
        let batch = source.fetch().await?;
        info!(
            source = source.name(),
            count = batch.observations.len(),
            rejected = batch.rejected,
            "Fetched odds"
        );
        let mut report = self.run_cycle(&batch.observations, now).await?;
        report.observations += batch.rejected;
        report.malformed += batch.rejected;
        Ok(report)
    }

    /// Process one batch of observations.
    ///
    /// # Errors
    ///
    /// Returns an error only when the store fails outside a single tuple's
    /// update: snapshot writes, listing sweep candidates, or pruning.
    pub async fn run_cycle(
        &self,
        observations: &[OddsObservation],
        now: DateTime<Utc>,
    ) -> Result<CycleReport> {
        let started = Instant::now();
        let store = self.lifecycle.store();

        store.record(observations).await?;

        let aggregation = aggregate(observations);
        let evaluation = evaluate(&aggregation, &self.stake);

        let mut report = CycleReport {
            observations: aggregation.stats.total,
            retained: aggregation.stats.retained,
            superseded: aggregation.stats.superseded,
            malformed: aggregation.stats.malformed,
            invalid_odds: aggregation.stats.invalid_odds + evaluation.invalid_odds,
            unreferenced: evaluation.unreferenced,
            evaluated: evaluation.evaluations.len(),
            ..CycleReport::default()
        };

        let outcomes = join_all(
            evaluation
                .evaluations
                .iter()
                .map(|priced| self.lifecycle.apply(priced, now)),
        )
        .await;
        for (priced, outcome) in evaluation.evaluations.iter().zip(outcomes) {
            match outcome {
                Ok(transition) => report.count(transition),
                Err(error) => {
                    report.failed += 1;
                    warn!(tuple = %priced.key, error = %error, "Lifecycle update failed");
                }
            }
        }

        let sweep = self.lifecycle.sweep_expired(now).await?;
        report.expired += sweep.expired.len();
        report.failed += sweep.failed;
        report.snapshots_pruned = store.prune_older_than(now - self.snapshot_retention).await?;

        report.opportunities.sort_by(|a, b| b.edge_percent.cmp(&a.edge_percent));
        report.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        info!(
            observations = report.observations,
            evaluated = report.evaluated,
            created = report.created,
            refreshed = report.refreshed,
            odds_moved = report.odds_moved,
            expired = report.expired,
            failed = report.failed,
            duration_ms = report.duration_ms,
            "Detection cycle complete"
        );
        Ok(report)
    }
}
