//! Persistence ports for value opportunities and odds snapshots.

use std::future::Future;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::{
    OddsObservation, OpportunityId, OpportunityKey, OpportunityStatus, ValueOpportunity,
};
use crate::error::Result;

/// Largest page an active-opportunity query may return.
pub const MAX_QUERY_LIMIT: usize = 50;

/// Filter for the active-opportunity listing used by alerting and display.
#[derive(Debug, Clone, PartialEq)]
pub struct OpportunityQuery {
    /// Minimum edge in percent.
    pub min_edge: Decimal,
    pub sport: Option<String>,
    pub soft_bookmaker: Option<String>,
    /// Only fixtures kicking off strictly after this instant.
    pub kickoff_after: Option<DateTime<Utc>>,
    /// Requested page size, capped at [`MAX_QUERY_LIMIT`].
    pub limit: usize,
}

impl Default for OpportunityQuery {
    fn default() -> Self {
        Self {
            min_edge: Decimal::from(2),
            sport: None,
            soft_bookmaker: None,
            kickoff_after: None,
            limit: 20,
        }
    }
}

impl OpportunityQuery {
    pub fn effective_limit(&self) -> usize {
        self.limit.min(MAX_QUERY_LIMIT)
    }

    /// Whether a record satisfies every filter.
    pub fn matches(&self, opportunity: &ValueOpportunity) -> bool {
        opportunity.is_active()
            && opportunity.edge_percent >= self.min_edge
            && self
                .sport
                .as_deref()
                .map_or(true, |sport| opportunity.sport == sport)
            && self
                .soft_bookmaker
                .as_deref()
                .map_or(true, |bookmaker| opportunity.soft_bookmaker == bookmaker)
            && self
                .kickoff_after
                .map_or(true, |after| opportunity.kickoff_time > after)
    }

    /// Filter, order by edge descending and truncate to the effective limit.
    pub fn apply(
        &self,
        opportunities: impl IntoIterator<Item = ValueOpportunity>,
    ) -> Vec<ValueOpportunity> {
        let mut matched: Vec<_> = opportunities
            .into_iter()
            .filter(|opportunity| self.matches(opportunity))
            .collect();
        matched.sort_by(|a, b| {
            b.edge_percent
                .cmp(&a.edge_percent)
                .then_with(|| a.detected_at.cmp(&b.detected_at))
        });
        matched.truncate(self.effective_limit());
        matched
    }
}

/// Storage operations for value opportunities.
///
/// # Implementation Notes
///
/// - At most one `active` record may exist per [`OpportunityKey`]; `insert`
///   must fail with [`Error::Conflict`](crate::error::Error::Conflict) rather
///   than create a second one.
/// - `update_if_status` is the atomic "write if current status is X"
///   primitive: it must compare and write in one step.
pub trait OpportunityStore: Send + Sync {
    /// Insert a new record.
    fn insert(&self, opportunity: &ValueOpportunity) -> impl Future<Output = Result<()>> + Send;

    /// Overwrite the mutable fields of `opportunity` (status, prices,
    /// timestamps) if the stored status is still `expected`.
    ///
    /// Returns false when the stored status differs or the record is missing.
    fn update_if_status(
        &self,
        opportunity: &ValueOpportunity,
        expected: OpportunityStatus,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// Get a record by ID.
    fn get(
        &self,
        id: &OpportunityId,
    ) -> impl Future<Output = Result<Option<ValueOpportunity>>> + Send;

    /// The active record for a tuple, if any.
    fn find_active(
        &self,
        key: &OpportunityKey,
    ) -> impl Future<Output = Result<Option<ValueOpportunity>>> + Send;

    /// The most recently updated record for a tuple, whatever its status.
    fn latest(
        &self,
        key: &OpportunityKey,
    ) -> impl Future<Output = Result<Option<ValueOpportunity>>> + Send;

    /// Every record ever stored for a tuple, oldest detection first.
    fn history(
        &self,
        key: &OpportunityKey,
    ) -> impl Future<Output = Result<Vec<ValueOpportunity>>> + Send;

    /// All active records.
    fn list_active(&self) -> impl Future<Output = Result<Vec<ValueOpportunity>>> + Send;

    /// Active records matching `query`, highest edge first.
    fn query_active(
        &self,
        query: &OpportunityQuery,
    ) -> impl Future<Output = Result<Vec<ValueOpportunity>>> + Send;
}

/// Retention of raw odds observations.
pub trait SnapshotStore: Send + Sync {
    /// Append observations. Returns how many were stored.
    fn record(
        &self,
        observations: &[OddsObservation],
    ) -> impl Future<Output = Result<usize>> + Send;

    /// Delete observations seen before `cutoff`. Returns count deleted.
    fn prune_older_than(&self, cutoff: DateTime<Utc>) -> impl Future<Output = Result<usize>> + Send;

    /// Number of stored observations.
    fn snapshot_count(&self) -> impl Future<Output = Result<usize>> + Send;
}
