//! Domain identifier types.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cross-bookmaker fixture identity, e.g. `arsenal_vs_chelsea_2026-03-01`.
///
/// Built by [`match_key`](super::match_key); the inner String is private so
/// callers cannot bypass normalization except through [`MatchKey::from_raw`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchKey(String);

impl MatchKey {
    /// Wrap an already-derived key (e.g. one read back from storage).
    pub fn from_raw(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Get the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the key is empty (never assigned).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The tuple a value opportunity is tracked under.
///
/// At most one `active` opportunity exists per key at any time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OpportunityKey {
    pub match_key: MatchKey,
    pub market: String,
    pub selection: String,
    pub soft_bookmaker: String,
}

impl OpportunityKey {
    pub fn new(
        match_key: MatchKey,
        market: impl Into<String>,
        selection: impl Into<String>,
        soft_bookmaker: impl Into<String>,
    ) -> Self {
        Self {
            match_key,
            market: market.into(),
            selection: selection.into(),
            soft_bookmaker: soft_bookmaker.into(),
        }
    }
}

impl fmt::Display for OpportunityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}@{}",
            self.match_key, self.market, self.selection, self.soft_bookmaker
        )
    }
}

/// Opaque identity of a persisted opportunity record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpportunityId(String);

impl OpportunityId {
    /// Generate a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OpportunityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for OpportunityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OpportunityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
