//! Team-name normalization and cross-bookmaker match identity.
//!
//! Bookmakers render the same fixture differently ("Arsenal FC" vs "arsenal",
//! kickoff in local time vs UTC). The key built here is a pure function of the
//! team names and the UTC calendar date of kickoff, so identical fixtures from
//! different sources collide deterministically.
//!
//! Two distinct fixtures between the same teams on the same UTC date share a
//! key. This is a known limitation and is not special-cased.

use chrono::{DateTime, TimeZone, Utc};

use super::id::MatchKey;
use crate::error::{Error, Result};

/// Club-suffix tokens dropped when they appear as whole words.
const CLUB_SUFFIXES: &[&str] = &["fc", "afc"];

/// Canonicalize a team name.
///
/// Lower-cases, trims, collapses internal whitespace and drops whole-word
/// `fc` / `afc` tokens. Substrings inside a name ("Afc" in "Afcon", "fc" in
/// "Bfc-ish") are left alone.
///
/// ```
/// use vantedge::domain::normalize;
///
/// assert_eq!(normalize("  Arsenal   FC "), "arsenal");
/// assert_eq!(normalize("AFC Bournemouth"), "bournemouth");
/// ```
#[must_use]
pub fn normalize(name: &str) -> String {
    let lowered = name.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split_whitespace()
        .filter(|token| !CLUB_SUFFIXES.contains(token))
        .collect();
    tokens.join(" ")
}

/// Derive the match key for a fixture.
///
/// `normalize(home) + "_vs_" + normalize(away) + "_" + YYYY-MM-DD`, where the
/// date is the UTC calendar date of kickoff and spaces inside team names become
/// underscores.
pub fn match_key<Tz: TimeZone>(home: &str, away: &str, kickoff: &DateTime<Tz>) -> MatchKey {
    let date = kickoff.with_timezone(&Utc).date_naive();
    let key = format!(
        "{}_vs_{}_{}",
        normalize(home),
        normalize(away),
        date.format("%Y-%m-%d")
    );
    MatchKey::from_raw(key.replace(' ', "_"))
}

/// Like [`match_key`], but parses an RFC 3339 kickoff timestamp.
///
/// # Errors
///
/// Returns [`Error::Parse`] if the timestamp is not valid RFC 3339.
pub fn match_key_from_str(home: &str, away: &str, kickoff: &str) -> Result<MatchKey> {
    let kickoff = DateTime::parse_from_rfc3339(kickoff)
        .map_err(|e| Error::Parse(format!("kickoff '{kickoff}': {e}")))?;
    Ok(match_key(home, away, &kickoff))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases_and_collapses_whitespace() {
        assert_eq!(normalize("  Manchester\t  United  "), "manchester united");
    }

    #[test]
    fn normalize_strips_suffix_tokens_only() {
        assert_eq!(normalize("Arsenal FC"), "arsenal");
        assert_eq!(normalize("FC Barcelona"), "barcelona");
        assert_eq!(normalize("AFC Wimbledon"), "wimbledon");
        assert_eq!(normalize("Afcon Stars"), "afcon stars");
        assert_eq!(normalize("Fcsb"), "fcsb");
    }

    #[test]
    fn normalize_is_idempotent() {
        let inputs = [
            "Arsenal FC",
            "  fc  ",
            "FC fc AFC",
            "Borussia  Mönchengladbach",
            "",
            "Real   Madrid CF",
            "ÉTOILE du Sahel",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn match_key_is_stable_across_suffix_case_and_offset() {
        let a = match_key_from_str("Arsenal FC", "Chelsea", "2026-03-01T19:45:00Z").unwrap();
        let b =
            match_key_from_str("arsenal", "Chelsea FC", "2026-03-01T23:45:00+04:00").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "arsenal_vs_chelsea_2026-03-01");
    }

    #[test]
    fn match_key_uses_utc_calendar_date() {
        let key = match_key_from_str("Enyimba", "Rangers", "2026-03-02T01:30:00+03:00").unwrap();
        assert_eq!(key.as_str(), "enyimba_vs_rangers_2026-03-01");
    }

    #[test]
    fn match_key_joins_multiword_names_with_underscores() {
        let key = match_key(
            "Manchester United",
            "Nottingham Forest FC",
            &Utc.with_ymd_and_hms(2026, 4, 12, 15, 0, 0).unwrap(),
        );
        assert_eq!(
            key.as_str(),
            "manchester_united_vs_nottingham_forest_2026-04-12"
        );
    }

    #[test]
    fn match_key_rejects_bad_timestamp() {
        let result = match_key_from_str("a", "b", "next tuesday");
        assert!(matches!(result, Err(Error::Parse(_))));
    }
}
