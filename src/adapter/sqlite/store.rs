//! SQLite opportunity and snapshot store.
//!
//! The one-active-per-tuple rule is enforced twice: by a partial unique index
//! on `value_opportunities` and by the conditional `UPDATE ... WHERE status =`
//! used for every transition.

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use rust_decimal::Decimal;

use super::connection::DbPool;
use super::model::{NewSnapshotRow, OpportunityRow};
use super::schema::{odds_snapshots, value_opportunities};
use crate::domain::{
    MatchKey, OddsObservation, OpportunityId, OpportunityKey, OpportunityStatus, ValueOpportunity,
};
use crate::error::{Error, Result};
use crate::port::{OpportunityQuery, OpportunityStore, SnapshotStore};

/// Rows per multi-value `INSERT`, well under SQLite's bound-parameter limit.
const SNAPSHOT_CHUNK: usize = 500;

/// SQLite-backed store for both persistence ports.
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    /// Create a store over an already migrated pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(
        &self,
    ) -> Result<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<SqliteConnection>>> {
        self.pool.get().map_err(|e| Error::Connection(e.to_string()))
    }

    fn to_row(opportunity: &ValueOpportunity) -> OpportunityRow {
        OpportunityRow {
            id: opportunity.id.to_string(),
            match_key: opportunity.match_key.to_string(),
            match_name: opportunity.match_name.clone(),
            sport: opportunity.sport.clone(),
            league: opportunity.league.clone(),
            kickoff_time: timestamp(opportunity.kickoff_time),
            market: opportunity.market.clone(),
            selection: opportunity.selection.clone(),
            sharp_bookmaker: opportunity.sharp_bookmaker.clone(),
            sharp_odds: opportunity.sharp_odds.map(|odds| odds.to_string()),
            soft_bookmaker: opportunity.soft_bookmaker.clone(),
            soft_odds: opportunity.soft_odds.to_string(),
            edge_percent: opportunity.edge_percent.to_string(),
            kelly_fraction: opportunity.kelly_fraction.to_string(),
            status: opportunity.status.as_str().to_string(),
            detected_at: timestamp(opportunity.detected_at),
            updated_at: timestamp(opportunity.updated_at),
            expired_at: opportunity.expired_at.map(timestamp),
            bet_link: opportunity.bet_link.clone(),
        }
    }

    fn from_row(row: OpportunityRow) -> Result<ValueOpportunity> {
        Ok(ValueOpportunity {
            id: OpportunityId::from(row.id),
            match_key: MatchKey::from_raw(row.match_key),
            match_name: row.match_name,
            sport: row.sport,
            league: row.league,
            kickoff_time: parse_timestamp(&row.kickoff_time)?,
            market: row.market,
            selection: row.selection,
            sharp_bookmaker: row.sharp_bookmaker,
            sharp_odds: row.sharp_odds.as_deref().map(parse_decimal).transpose()?,
            soft_bookmaker: row.soft_bookmaker,
            soft_odds: parse_decimal(&row.soft_odds)?,
            edge_percent: parse_decimal(&row.edge_percent)?,
            kelly_fraction: parse_decimal(&row.kelly_fraction)?,
            status: row.status.parse().map_err(Error::Parse)?,
            detected_at: parse_timestamp(&row.detected_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
            expired_at: row.expired_at.as_deref().map(parse_timestamp).transpose()?,
            bet_link: row.bet_link,
        })
    }

    fn load_for(&self, key: &OpportunityKey) -> Result<Vec<ValueOpportunity>> {
        use value_opportunities::dsl;

        let mut conn = self.conn()?;
        let rows: Vec<OpportunityRow> = dsl::value_opportunities
            .filter(dsl::match_key.eq(key.match_key.as_str()))
            .filter(dsl::market.eq(&key.market))
            .filter(dsl::selection.eq(&key.selection))
            .filter(dsl::soft_bookmaker.eq(&key.soft_bookmaker))
            .order((dsl::detected_at.asc(), dsl::updated_at.asc()))
            .select(OpportunityRow::as_select())
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        rows.into_iter().map(Self::from_row).collect()
    }

    fn snapshot_row(observation: &OddsObservation) -> NewSnapshotRow {
        NewSnapshotRow {
            match_key: observation.match_key.to_string(),
            match_name: observation.match_name.clone(),
            sport: observation.sport.clone(),
            league: observation.league.clone(),
            kickoff_time: timestamp(observation.kickoff_time),
            bookmaker: observation.bookmaker.clone(),
            is_sharp: i32::from(observation.is_sharp),
            market: observation.market.clone(),
            selection: observation.selection.clone(),
            odds: observation.odds.to_string(),
            observed_at: timestamp(observation.observed_at),
        }
    }
}

/// Fixed-width UTC timestamp, so lexical order equals time order.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| Error::Parse(format!("invalid timestamp '{value}': {e}")))
}

fn parse_decimal(value: &str) -> Result<Decimal> {
    value
        .parse()
        .map_err(|e| Error::Parse(format!("invalid decimal '{value}': {e}")))
}

impl OpportunityStore for SqliteStore {
    async fn insert(&self, opportunity: &ValueOpportunity) -> Result<()> {
        let row = Self::to_row(opportunity);
        let mut conn = self.conn()?;

        diesel::insert_into(value_opportunities::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| match e {
                diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                    Error::Conflict(format!("{}: {}", opportunity.key(), info.message()))
                }
                other => Error::Database(other.to_string()),
            })?;

        Ok(())
    }

    async fn update_if_status(
        &self,
        opportunity: &ValueOpportunity,
        expected: OpportunityStatus,
    ) -> Result<bool> {
        use value_opportunities::dsl;

        let row = Self::to_row(opportunity);
        let mut conn = self.conn()?;

        let updated = diesel::update(
            dsl::value_opportunities
                .filter(dsl::id.eq(&row.id))
                .filter(dsl::status.eq(expected.as_str())),
        )
        .set(&row)
        .execute(&mut conn)
        .map_err(|e| Error::Database(e.to_string()))?;

        Ok(updated > 0)
    }

    async fn get(&self, id: &OpportunityId) -> Result<Option<ValueOpportunity>> {
        let mut conn = self.conn()?;

        let row: Option<OpportunityRow> = value_opportunities::table
            .find(id.as_str())
            .select(OpportunityRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;

        row.map(Self::from_row).transpose()
    }

    async fn find_active(&self, key: &OpportunityKey) -> Result<Option<ValueOpportunity>> {
        Ok(self
            .load_for(key)?
            .into_iter()
            .find(ValueOpportunity::is_active))
    }

    async fn latest(&self, key: &OpportunityKey) -> Result<Option<ValueOpportunity>> {
        // Rows come oldest detection first, so a superseding record wins an
        // updated_at tie against the one it replaced.
        Ok(self
            .load_for(key)?
            .into_iter()
            .enumerate()
            .max_by(|(ia, a), (ib, b)| a.updated_at.cmp(&b.updated_at).then(ia.cmp(ib)))
            .map(|(_, record)| record))
    }

    async fn history(&self, key: &OpportunityKey) -> Result<Vec<ValueOpportunity>> {
        self.load_for(key)
    }

    async fn list_active(&self) -> Result<Vec<ValueOpportunity>> {
        use value_opportunities::dsl;

        let mut conn = self.conn()?;
        let rows: Vec<OpportunityRow> = dsl::value_opportunities
            .filter(dsl::status.eq(OpportunityStatus::Active.as_str()))
            .order(dsl::kickoff_time.asc())
            .select(OpportunityRow::as_select())
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        rows.into_iter().map(Self::from_row).collect()
    }

    async fn query_active(&self, query: &OpportunityQuery) -> Result<Vec<ValueOpportunity>> {
        use value_opportunities::dsl;

        let mut conn = self.conn()?;
        let mut sql = dsl::value_opportunities
            .filter(dsl::status.eq(OpportunityStatus::Active.as_str()))
            .select(OpportunityRow::as_select())
            .into_boxed();
        if let Some(sport) = &query.sport {
            sql = sql.filter(dsl::sport.eq(sport.clone()));
        }
        if let Some(bookmaker) = &query.soft_bookmaker {
            sql = sql.filter(dsl::soft_bookmaker.eq(bookmaker.clone()));
        }
        if let Some(after) = query.kickoff_after {
            sql = sql.filter(dsl::kickoff_time.gt(timestamp(after)));
        }

        let rows: Vec<OpportunityRow> = sql
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        // Edge is stored as text, so the numeric filter and ordering run here.
        let records = rows
            .into_iter()
            .map(Self::from_row)
            .collect::<Result<Vec<_>>>()?;
        Ok(query.apply(records))
    }
}

impl SnapshotStore for SqliteStore {
    async fn record(&self, observations: &[OddsObservation]) -> Result<usize> {
        let rows: Vec<NewSnapshotRow> = observations.iter().map(Self::snapshot_row).collect();
        let mut conn = self.conn()?;

        conn.transaction(|conn| {
            let mut inserted = 0;
            for chunk in rows.chunks(SNAPSHOT_CHUNK) {
                inserted += diesel::insert_into(odds_snapshots::table)
                    .values(chunk)
                    .execute(conn)?;
            }
            Ok::<_, diesel::result::Error>(inserted)
        })
        .map_err(|e| Error::Database(e.to_string()))
    }

    async fn prune_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut conn = self.conn()?;

        let stale = odds_snapshots::table.filter(odds_snapshots::observed_at.lt(timestamp(cutoff)));
        diesel::delete(stale)
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))
    }

    async fn snapshot_count(&self) -> Result<usize> {
        let mut conn = self.conn()?;

        let count: i64 = odds_snapshots::table
            .count()
            .get_result(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        usize::try_from(count).map_err(|e| Error::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::sqlite::connection::{create_pool, run_migrations};
    use crate::domain::{aggregate, evaluate, StakeConfig};
    use crate::testkit::{before_kickoff, kickoff, observation, observation_at};
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn setup_store() -> SqliteStore {
        let pool = create_pool(":memory:").unwrap();
        run_migrations(&pool).unwrap();
        SqliteStore::new(pool)
    }

    fn active(bookmaker: &str, soft_odds: Decimal) -> ValueOpportunity {
        let batch = [
            observation("pinnacle", true, "Home", dec!(2.00)),
            observation(bookmaker, false, "Home", soft_odds),
        ];
        let evaluation = evaluate(&aggregate(&batch), &StakeConfig::default());
        ValueOpportunity::detect(&evaluation.evaluations[0], before_kickoff())
    }

    #[test]
    fn insert_and_get_preserves_every_field() {
        tokio_test::block_on(async {
            let store = setup_store();
            let mut opportunity = active("bet9ja", dec!(2.30));
            opportunity.bet_link = Some("https://example.com/bet".into());
            store.insert(&opportunity).await.unwrap();

            let loaded = store.get(&opportunity.id).await.unwrap().unwrap();
            assert_eq!(loaded, opportunity);
            assert_eq!(loaded.edge_percent, dec!(15));
            assert_eq!(loaded.kickoff_time, kickoff());
        });
    }

    #[test]
    fn get_missing_returns_none() {
        tokio_test::block_on(async {
            let store = setup_store();
            let missing = store.get(&OpportunityId::from("nope")).await.unwrap();
            assert!(missing.is_none());
        });
    }

    #[test]
    fn second_active_for_tuple_is_a_conflict() {
        tokio_test::block_on(async {
            let store = setup_store();
            store.insert(&active("bet9ja", dec!(2.30))).await.unwrap();

            let result = store.insert(&active("bet9ja", dec!(2.40))).await;
            assert!(matches!(result, Err(Error::Conflict(_))));

            // A different soft bookmaker is a different tuple.
            store.insert(&active("betking", dec!(2.40))).await.unwrap();
            assert_eq!(store.list_active().await.unwrap().len(), 2);
        });
    }

    #[test]
    fn terminal_record_does_not_block_a_new_active_one() {
        tokio_test::block_on(async {
            let store = setup_store();
            let mut first = active("bet9ja", dec!(2.30));
            store.insert(&first).await.unwrap();
            first
                .transition(OpportunityStatus::OddsMoved, before_kickoff())
                .unwrap();
            assert!(store
                .update_if_status(&first, OpportunityStatus::Active)
                .await
                .unwrap());

            let second = active("bet9ja", dec!(2.40));
            store.insert(&second).await.unwrap();

            let history = store.history(&second.key()).await.unwrap();
            assert_eq!(history.len(), 2);
            let found = store.find_active(&second.key()).await.unwrap().unwrap();
            assert_eq!(found.id, second.id);
        });
    }

    #[test]
    fn update_if_status_only_applies_to_expected_status() {
        tokio_test::block_on(async {
            let store = setup_store();
            let original = active("bet9ja", dec!(2.30));
            store.insert(&original).await.unwrap();

            let mut won = original.clone();
            won.transition(OpportunityStatus::Won, before_kickoff()).unwrap();
            assert!(store
                .update_if_status(&won, OpportunityStatus::Active)
                .await
                .unwrap());

            let mut lost = original.clone();
            lost.transition(OpportunityStatus::Lost, before_kickoff()).unwrap();
            assert!(!store
                .update_if_status(&lost, OpportunityStatus::Active)
                .await
                .unwrap());

            let stored = store.get(&original.id).await.unwrap().unwrap();
            assert_eq!(stored.status, OpportunityStatus::Won);
            let latest = store.latest(&original.key()).await.unwrap().unwrap();
            assert_eq!(latest.status, OpportunityStatus::Won);
        });
    }

    #[test]
    fn query_active_filters_in_sql_and_orders_by_edge() {
        tokio_test::block_on(async {
            let store = setup_store();
            store.insert(&active("bet9ja", dec!(2.10))).await.unwrap();
            store.insert(&active("betking", dec!(2.40))).await.unwrap();
            store.insert(&active("sportybet", dec!(2.02))).await.unwrap();

            let query = OpportunityQuery {
                min_edge: dec!(3),
                sport: Some("football".into()),
                kickoff_after: Some(before_kickoff()),
                ..OpportunityQuery::default()
            };
            let found = store.query_active(&query).await.unwrap();
            let books: Vec<_> = found.iter().map(|o| o.soft_bookmaker.as_str()).collect();
            assert_eq!(books, vec!["betking", "bet9ja"]);

            let past = OpportunityQuery {
                kickoff_after: Some(kickoff()),
                ..OpportunityQuery::default()
            };
            assert!(store.query_active(&past).await.unwrap().is_empty());
        });
    }

    #[test]
    fn snapshots_record_prune_and_count() {
        tokio_test::block_on(async {
            let store = setup_store();
            let batch = vec![
                observation_at("bet9ja", false, "Home", dec!(2.10), Duration::hours(-3)),
                observation_at("bet9ja", false, "Away", dec!(3.10), Duration::hours(-2)),
                observation("bet9ja", false, "Home", dec!(2.20)),
            ];
            assert_eq!(store.record(&batch).await.unwrap(), 3);
            assert_eq!(store.snapshot_count().await.unwrap(), 3);

            let pruned = store
                .prune_older_than(before_kickoff() - Duration::hours(1))
                .await
                .unwrap();
            assert_eq!(pruned, 2);
            assert_eq!(store.snapshot_count().await.unwrap(), 1);
        });
    }

    #[test]
    fn corrupt_decimal_is_a_parse_error() {
        let mut row = SqliteStore::to_row(&active("bet9ja", dec!(2.30)));
        row.soft_odds = "two".into();
        assert!(matches!(SqliteStore::from_row(row), Err(Error::Parse(_))));
    }
}
