//! In-memory store.
//!
//! Implements both store ports behind `parking_lot` locks. Each operation
//! takes the write lock for its whole compare-and-write, which gives the same
//! atomicity the SQLite store gets from conditional `UPDATE`s. Used for tests
//! and for one-shot scans that do not need persistence.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::domain::{
    OddsObservation, OpportunityId, OpportunityKey, OpportunityStatus, ValueOpportunity,
};
use crate::error::{Error, Result};
use crate::port::{OpportunityQuery, OpportunityStore, SnapshotStore};

/// Process-local opportunity and snapshot store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    opportunities: RwLock<Vec<ValueOpportunity>>,
    snapshots: RwLock<Vec<OddsObservation>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn records_for(&self, key: &OpportunityKey) -> Vec<ValueOpportunity> {
        self.opportunities
            .read()
            .iter()
            .filter(|record| record.key() == *key)
            .cloned()
            .collect()
    }
}

impl OpportunityStore for InMemoryStore {
    async fn insert(&self, opportunity: &ValueOpportunity) -> Result<()> {
        let mut records = self.opportunities.write();
        if records.iter().any(|record| record.id == opportunity.id) {
            return Err(Error::Conflict(format!("opportunity {} already exists", opportunity.id)));
        }
        if opportunity.is_active() {
            let key = opportunity.key();
            if records.iter().any(|record| record.is_active() && record.key() == key) {
                return Err(Error::Conflict(format!("{key} already has an active opportunity")));
            }
        }
        records.push(opportunity.clone());
        Ok(())
    }

    async fn update_if_status(
        &self,
        opportunity: &ValueOpportunity,
        expected: OpportunityStatus,
    ) -> Result<bool> {
        let mut records = self.opportunities.write();
        match records
            .iter_mut()
            .find(|record| record.id == opportunity.id && record.status == expected)
        {
            Some(record) => {
                *record = opportunity.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get(&self, id: &OpportunityId) -> Result<Option<ValueOpportunity>> {
        Ok(self
            .opportunities
            .read()
            .iter()
            .find(|record| record.id == *id)
            .cloned())
    }

    async fn find_active(&self, key: &OpportunityKey) -> Result<Option<ValueOpportunity>> {
        Ok(self
            .records_for(key)
            .into_iter()
            .find(ValueOpportunity::is_active))
    }

    async fn latest(&self, key: &OpportunityKey) -> Result<Option<ValueOpportunity>> {
        // Later pushes win ties so a superseding record beats the one it replaced.
        Ok(self
            .records_for(key)
            .into_iter()
            .enumerate()
            .max_by(|(ia, a), (ib, b)| a.updated_at.cmp(&b.updated_at).then(ia.cmp(ib)))
            .map(|(_, record)| record))
    }

    async fn history(&self, key: &OpportunityKey) -> Result<Vec<ValueOpportunity>> {
        let mut records = self.records_for(key);
        records.sort_by_key(|record| record.detected_at);
        Ok(records)
    }

    async fn list_active(&self) -> Result<Vec<ValueOpportunity>> {
        Ok(self
            .opportunities
            .read()
            .iter()
            .filter(|record| record.is_active())
            .cloned()
            .collect())
    }

    async fn query_active(&self, query: &OpportunityQuery) -> Result<Vec<ValueOpportunity>> {
        let records = self.opportunities.read().clone();
        Ok(query.apply(records))
    }
}

impl SnapshotStore for InMemoryStore {
    async fn record(&self, observations: &[OddsObservation]) -> Result<usize> {
        self.snapshots.write().extend_from_slice(observations);
        Ok(observations.len())
    }

    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut snapshots = self.snapshots.write();
        let before = snapshots.len();
        snapshots.retain(|observation| observation.observed_at >= cutoff);
        Ok(before - snapshots.len())
    }

    async fn snapshot_count(&self) -> Result<usize> {
        Ok(self.snapshots.read().len())
    }
}
