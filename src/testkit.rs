//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::domain::{match_key, OddsObservation};

/// Kickoff of the canonical test fixture (Arsenal v Chelsea).
pub fn kickoff() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 19, 45, 0)
        .single()
        .unwrap_or_default()
}

/// A moment well before kickoff, used as "now" and as the observation time.
pub fn before_kickoff() -> DateTime<Utc> {
    kickoff() - Duration::hours(6)
}

/// A moment after kickoff.
pub fn after_kickoff() -> DateTime<Utc> {
    kickoff() + Duration::hours(3)
}

/// A 1X2 quote for the canonical fixture observed at [`before_kickoff`].
pub fn observation(
    bookmaker: &str,
    is_sharp: bool,
    selection: &str,
    odds: Decimal,
) -> OddsObservation {
    observation_at(bookmaker, is_sharp, selection, odds, Duration::zero())
}

/// Like [`observation`], observed `offset` after [`before_kickoff`].
pub fn observation_at(
    bookmaker: &str,
    is_sharp: bool,
    selection: &str,
    odds: Decimal,
    offset: Duration,
) -> OddsObservation {
    OddsObservation {
        match_key: match_key("Arsenal FC", "Chelsea", &kickoff()),
        match_name: "Arsenal vs Chelsea".to_string(),
        sport: "football".to_string(),
        league: "Premier League".to_string(),
        kickoff_time: kickoff(),
        bookmaker: bookmaker.to_string(),
        is_sharp,
        market: "1X2".to_string(),
        selection: selection.to_string(),
        odds,
        observed_at: before_kickoff() + offset,
        bet_link: None,
    }
}
