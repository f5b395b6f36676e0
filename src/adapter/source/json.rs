//! File-backed odds source.
//!
//! Reads a JSON array of scraped quotes, the shape a scraper or an upstream
//! job drops on disk. Team names and kickoff are turned into a match key here
//! so every bookmaker's rows for one fixture line up. A record that cannot be
//! read is skipped and counted; only a file that is not a JSON array fails.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::{match_key, OddsObservation};
use crate::error::{Error, Result};
use crate::port::{OddsSource, SourceBatch};

/// One quote as it appears in the input file.
///
/// Text fields default to empty so a record missing, say, `market` still
/// parses and is rejected later as malformed instead of failing the file.
#[derive(Debug, Clone, Deserialize)]
pub struct RawObservation {
    #[serde(default)]
    pub home_team: String,
    #[serde(default)]
    pub away_team: String,
    #[serde(default)]
    pub match_name: Option<String>,
    #[serde(default)]
    pub sport: String,
    #[serde(default)]
    pub league: String,
    pub kickoff_time: String,
    #[serde(default)]
    pub bookmaker: String,
    #[serde(default)]
    pub is_sharp: bool,
    #[serde(default)]
    pub market: String,
    #[serde(default)]
    pub selection: String,
    pub odds: Decimal,
    #[serde(default)]
    pub observed_at: Option<String>,
    #[serde(default)]
    pub bet_link: Option<String>,
}

impl RawObservation {
    /// Build the domain observation, stamping `fetched_at` when the record
    /// carries no observation time.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if a timestamp is not valid RFC 3339.
    pub fn into_observation(self, fetched_at: DateTime<Utc>) -> Result<OddsObservation> {
        let kickoff_time = parse_time("kickoff_time", &self.kickoff_time)?;
        let observed_at = match self.observed_at.as_deref() {
            Some(value) => parse_time("observed_at", value)?,
            None => fetched_at,
        };
        let match_name = self
            .match_name
            .unwrap_or_else(|| format!("{} vs {}", self.home_team.trim(), self.away_team.trim()));

        Ok(OddsObservation {
            match_key: match_key(&self.home_team, &self.away_team, &kickoff_time),
            match_name,
            sport: self.sport,
            league: self.league,
            kickoff_time,
            bookmaker: self.bookmaker,
            is_sharp: self.is_sharp,
            market: self.market,
            selection: self.selection,
            odds: self.odds,
            observed_at,
            bet_link: self.bet_link,
        })
    }
}

fn parse_time(field: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| Error::Parse(format!("{field} '{value}': {e}")))
}

/// Reads observations from a JSON file on every fetch.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    name: String,
    path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "json".to_string());
        Self { name, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse a JSON document already in memory.
    ///
    /// Records with a bad shape or an unparseable timestamp are skipped and
    /// counted in [`SourceBatch::rejected`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the document is not a JSON array.
    pub fn parse(content: &str, fetched_at: DateTime<Utc>) -> Result<SourceBatch> {
        let records: Vec<serde_json::Value> = serde_json::from_str(content)?;
        let mut batch = SourceBatch::default();
        for (index, record) in records.into_iter().enumerate() {
            let parsed = serde_json::from_value::<RawObservation>(record)
                .map_err(Error::from)
                .and_then(|raw| raw.into_observation(fetched_at));
            match parsed {
                Ok(observation) => batch.observations.push(observation),
                Err(error) => {
                    batch.rejected += 1;
                    warn!(record = index, error = %error, "Skipping unreadable odds record");
                }
            }
        }
        Ok(batch)
    }
}

impl OddsSource for JsonFileSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<SourceBatch> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let batch = Self::parse(&content, Utc::now())?;
        debug!(
            source = %self.name,
            path = %self.path.display(),
            count = batch.observations.len(),
            rejected = batch.rejected,
            "Loaded odds observations"
        );
        Ok(batch)
    }
}
