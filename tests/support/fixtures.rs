use std::path::{Path, PathBuf};

use serde_json::{json, Value};

pub const KICKOFF: &str = "2026-03-01T19:45:00Z";

/// One raw bookmaker record in the JSON source format.
pub fn record(bookmaker: &str, is_sharp: bool, selection: &str, odds: f64) -> Value {
    json!({
        "home_team": "Arsenal FC",
        "away_team": "Chelsea",
        "sport": "football",
        "league": "Premier League",
        "kickoff_time": KICKOFF,
        "bookmaker": bookmaker,
        "is_sharp": is_sharp,
        "market": "1X2",
        "selection": selection,
        "odds": odds,
        "observed_at": "2026-03-01T13:45:00Z",
    })
}

/// Same as [`record`] for a fixture kicking off at `kickoff`.
pub fn record_at(kickoff: &str, bookmaker: &str, is_sharp: bool, odds: f64) -> Value {
    let mut value = record(bookmaker, is_sharp, "Home", odds);
    value["kickoff_time"] = json!(kickoff);
    if let Some(map) = value.as_object_mut() {
        map.remove("observed_at");
    }
    value
}

/// Write `records` as a JSON array into `dir`.
pub fn write_odds(dir: &Path, name: &str, records: &[Value]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, Value::Array(records.to_vec()).to_string()).expect("write odds file");
    path
}
