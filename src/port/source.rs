//! Ingestion port.

use std::future::Future;

use crate::domain::OddsObservation;
use crate::error::Result;

/// One fetched batch of observations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceBatch {
    pub observations: Vec<OddsObservation>,
    /// Records the source dropped because they could not be read at all.
    pub rejected: usize,
}

/// Supplies odds observations to the detection core.
///
/// Implementations own network calls, retries and any browser or scraping
/// state. The core only sees the resulting observations; it validates them
/// again and skips records with bad odds or missing identity fields.
pub trait OddsSource: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Fetch one batch of observations.
    ///
    /// A bad record is counted in [`SourceBatch::rejected`]; only a failure
    /// of the whole source is an error.
    fn fetch(&self) -> impl Future<Output = Result<SourceBatch>> + Send;
}
