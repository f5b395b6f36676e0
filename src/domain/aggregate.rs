//! Grouping of odds observations by fixture and selection.
//!
//! A single pass keeps only the most recent observation per
//! (bookmaker, match, market, selection), drops records that fail validation,
//! and partitions what remains into sharp and soft quotes per
//! (match, market, selection).

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use tracing::warn;

use super::error::DomainError;
use super::id::MatchKey;
use super::observation::{OddsObservation, SelectionKey};

/// Sharp and soft quotes for one selection of one fixture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionBook {
    pub sharp: Vec<OddsObservation>,
    pub soft: Vec<OddsObservation>,
}

impl SelectionBook {
    /// The best sharp reference: the lowest (most confident) sharp price.
    ///
    /// Ties keep the quote that was grouped first.
    pub fn best_sharp(&self) -> Option<&OddsObservation> {
        self.sharp.iter().reduce(|best, current| {
            if current.odds < best.odds {
                current
            } else {
                best
            }
        })
    }
}

/// Counters describing what aggregation kept and dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregationStats {
    /// Observations handed to the aggregator.
    pub total: usize,
    /// Observations grouped into books.
    pub retained: usize,
    /// Older duplicates replaced by a newer observation of the same tuple.
    pub superseded: usize,
    /// Observations missing a required identity field.
    pub malformed: usize,
    /// Observations quoting odds not greater than 1.
    pub invalid_odds: usize,
}

/// Observations grouped by match key, then by (market, selection).
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    pub books: BTreeMap<MatchKey, BTreeMap<SelectionKey, SelectionBook>>,
    pub stats: AggregationStats,
}

impl Aggregation {
    /// Iterate over every selection book with its fixture key.
    pub fn selections(&self) -> impl Iterator<Item = (&MatchKey, &SelectionKey, &SelectionBook)> {
        self.books.iter().flat_map(|(match_key, selections)| {
            selections
                .iter()
                .map(move |(selection, book)| (match_key, selection, book))
        })
    }

    /// Number of distinct fixtures.
    pub fn match_count(&self) -> usize {
        self.books.len()
    }
}

type QuoteKey<'a> = (&'a str, &'a MatchKey, &'a str, &'a str);

/// Group a batch of observations for comparison.
///
/// Invalid records are skipped and counted; they never abort the batch.
pub fn aggregate(observations: &[OddsObservation]) -> Aggregation {
    let mut stats = AggregationStats {
        total: observations.len(),
        ..AggregationStats::default()
    };

    // Latest observation per (bookmaker, match, market, selection), remembering
    // first-seen order so grouping stays deterministic.
    let mut latest: HashMap<QuoteKey<'_>, usize> = HashMap::new();
    let mut order: Vec<QuoteKey<'_>> = Vec::new();

    for (index, observation) in observations.iter().enumerate() {
        if let Err(error) = observation.validate() {
            match error {
                DomainError::InvalidOdds { .. } => stats.invalid_odds += 1,
                _ => stats.malformed += 1,
            }
            warn!(
                bookmaker = %observation.bookmaker,
                match_key = %observation.match_key,
                market = %observation.market,
                selection = %observation.selection,
                error = %error,
                "Skipping observation"
            );
            continue;
        }

        let key: QuoteKey<'_> = (
            observation.bookmaker.as_str(),
            &observation.match_key,
            observation.market.as_str(),
            observation.selection.as_str(),
        );
        match latest.get_mut(&key) {
            Some(kept) => {
                stats.superseded += 1;
                if observation.observed_at >= observations[*kept].observed_at {
                    *kept = index;
                }
            }
            None => {
                latest.insert(key, index);
                order.push(key);
            }
        }
    }

    let mut books: BTreeMap<MatchKey, BTreeMap<SelectionKey, SelectionBook>> = BTreeMap::new();
    for key in order {
        let observation = &observations[latest[&key]];
        let book = books
            .entry(observation.match_key.clone())
            .or_default()
            .entry(observation.selection_key())
            .or_default();
        if observation.is_sharp {
            book.sharp.push(observation.clone());
        } else {
            book.soft.push(observation.clone());
        }
        stats.retained += 1;
    }

    Aggregation { books, stats }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{observation, observation_at};
    use chrono::Duration;
    use rust_decimal_macros::dec;

    #[test]
    fn partitions_sharp_and_soft_per_selection() {
        let batch = vec![
            observation("pinnacle", true, "Home", dec!(2.00)),
            observation("bet9ja", false, "Home", dec!(2.30)),
            observation("sportybet", false, "Home", dec!(2.10)),
            observation("pinnacle", true, "Away", dec!(3.60)),
        ];

        let aggregation = aggregate(&batch);
        assert_eq!(aggregation.match_count(), 1);
        assert_eq!(aggregation.stats.retained, 4);

        let selections: Vec<_> = aggregation.selections().collect();
        assert_eq!(selections.len(), 2);

        let (_, _, home) = selections
            .iter()
            .find(|(_, key, _)| key.selection == "Home")
            .copied()
            .unwrap();
        assert_eq!(home.sharp.len(), 1);
        assert_eq!(home.soft.len(), 2);
    }

    #[test]
    fn keeps_only_latest_observation_per_tuple() {
        let older = observation_at("bet9ja", false, "Home", dec!(2.50), Duration::minutes(-10));
        let newer = observation_at("bet9ja", false, "Home", dec!(2.20), Duration::zero());

        // Newer first in input order, older after: the older must still lose.
        let aggregation = aggregate(&[newer, older]);
        let (_, _, book) = aggregation.selections().next().unwrap();

        assert_eq!(book.soft.len(), 1);
        assert_eq!(book.soft[0].odds, dec!(2.20));
        assert_eq!(aggregation.stats.superseded, 1);
        assert_eq!(aggregation.stats.retained, 1);
    }

    #[test]
    fn best_sharp_is_lowest_price() {
        let batch = vec![
            observation("pinnacle", true, "Home", dec!(2.04)),
            observation("betfair", true, "Home", dec!(1.98)),
            observation("circa", true, "Home", dec!(2.01)),
        ];
        let aggregation = aggregate(&batch);
        let (_, _, book) = aggregation.selections().next().unwrap();
        let best = book.best_sharp().unwrap();
        assert_eq!(best.bookmaker, "betfair");
        assert_eq!(best.odds, dec!(1.98));
    }

    #[test]
    fn skips_invalid_and_malformed_without_aborting() {
        let mut missing_selection = observation("bet9ja", false, "Home", dec!(2.10));
        missing_selection.selection = String::new();

        let batch = vec![
            observation("pinnacle", true, "Home", dec!(2.00)),
            observation("betking", false, "Home", dec!(0.8)),
            missing_selection,
            observation("sportybet", false, "Home", dec!(2.30)),
        ];
        let aggregation = aggregate(&batch);

        assert_eq!(aggregation.stats.total, 4);
        assert_eq!(aggregation.stats.invalid_odds, 1);
        assert_eq!(aggregation.stats.malformed, 1);
        assert_eq!(aggregation.stats.retained, 2);

        let (_, _, book) = aggregation.selections().next().unwrap();
        assert_eq!(book.soft.len(), 1);
        assert_eq!(book.soft[0].bookmaker, "sportybet");
    }

    #[test]
    fn invalid_sharp_never_becomes_reference() {
        let batch = vec![
            observation("pinnacle", true, "Home", dec!(1.00)),
            observation("betfair", true, "Home", dec!(2.00)),
        ];
        let aggregation = aggregate(&batch);
        let (_, _, book) = aggregation.selections().next().unwrap();
        assert_eq!(book.best_sharp().unwrap().bookmaker, "betfair");
    }

    #[test]
    fn is_deterministic() {
        let batch = vec![
            observation("pinnacle", true, "Home", dec!(2.00)),
            observation("bet9ja", false, "Home", dec!(2.30)),
            observation("sportybet", false, "Draw", dec!(3.30)),
            observation("pinnacle", true, "Draw", dec!(3.10)),
        ];
        let first = aggregate(&batch);
        let second = aggregate(&batch);
        assert_eq!(first.books, second.books);
        assert_eq!(first.stats, second.stats);
    }
}
