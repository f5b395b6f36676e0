//! Database model types for Diesel ORM.

use diesel::prelude::*;

use super::schema::{odds_snapshots, value_opportunities};

/// Database row for a value opportunity.
///
/// Decimals are stored as text to keep their exact scale; timestamps as
/// fixed-width RFC 3339 so string comparison orders them.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = value_opportunities)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct OpportunityRow {
    pub id: String,
    pub match_key: String,
    pub match_name: String,
    pub sport: String,
    pub league: String,
    pub kickoff_time: String,
    pub market: String,
    pub selection: String,
    pub sharp_bookmaker: Option<String>,
    pub sharp_odds: Option<String>,
    pub soft_bookmaker: String,
    pub soft_odds: String,
    pub edge_percent: String,
    pub kelly_fraction: String,
    pub status: String,
    pub detected_at: String,
    pub updated_at: String,
    pub expired_at: Option<String>,
    pub bet_link: Option<String>,
}

/// Database row for an odds snapshot (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = odds_snapshots)]
pub struct NewSnapshotRow {
    pub match_key: String,
    pub match_name: String,
    pub sport: String,
    pub league: String,
    pub kickoff_time: String,
    pub bookmaker: String,
    pub is_sharp: i32,
    pub market: String,
    pub selection: String,
    pub odds: String,
    pub observed_at: String,
}
