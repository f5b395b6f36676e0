//! Soft-vs-sharp price evaluation.
//!
//! Every soft quote is compared independently against the best sharp quote
//! for the same selection. No averaging or market-making is done.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::aggregate::Aggregation;
use super::edge::{compute_edge, EdgeEstimate};
use super::id::OpportunityKey;
use super::observation::OddsObservation;
use super::stake::StakeConfig;

/// One soft quote priced against its sharp reference.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceEvaluation {
    pub key: OpportunityKey,
    pub match_name: String,
    pub sport: String,
    pub league: String,
    pub kickoff_time: DateTime<Utc>,
    pub sharp_bookmaker: String,
    pub edge: EdgeEstimate,
    pub kelly_fraction: Decimal,
    pub observed_at: DateTime<Utc>,
    pub bet_link: Option<String>,
}

impl PriceEvaluation {
    fn new(
        sharp: &OddsObservation,
        soft: &OddsObservation,
        edge: EdgeEstimate,
        kelly_fraction: Decimal,
    ) -> Self {
        Self {
            key: OpportunityKey::new(
                soft.match_key.clone(),
                soft.market.clone(),
                soft.selection.clone(),
                soft.bookmaker.clone(),
            ),
            match_name: soft.match_name.clone(),
            sport: soft.sport.clone(),
            league: soft.league.clone(),
            kickoff_time: soft.kickoff_time,
            sharp_bookmaker: sharp.bookmaker.clone(),
            edge,
            kelly_fraction,
            observed_at: soft.observed_at,
            bet_link: soft.bet_link.clone(),
        }
    }

    pub fn edge_percent(&self) -> Decimal {
        self.edge.edge_percent()
    }

    pub fn soft_odds(&self) -> Decimal {
        self.edge.soft_odds()
    }

    pub fn sharp_odds(&self) -> Decimal {
        self.edge.sharp_odds()
    }

    /// Whether this quote qualifies as a value opportunity.
    pub fn qualifies(&self, min_edge_threshold: Decimal) -> bool {
        self.edge.clears(min_edge_threshold)
    }
}

/// All priced soft quotes from one aggregation.
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    /// Ordered by edge, highest first.
    pub evaluations: Vec<PriceEvaluation>,
    /// Soft quotes with no sharp reference for their selection.
    pub unreferenced: usize,
    /// Comparisons rejected by the edge calculator.
    pub invalid_odds: usize,
}

impl Evaluation {
    /// Evaluations that clear `min_edge_threshold`, highest edge first.
    pub fn value_bets(
        &self,
        min_edge_threshold: Decimal,
    ) -> impl Iterator<Item = &PriceEvaluation> {
        self.evaluations
            .iter()
            .filter(move |evaluation| evaluation.qualifies(min_edge_threshold))
    }
}

/// Price every soft quote against the best sharp quote for its selection.
pub fn evaluate(aggregation: &Aggregation, stake: &StakeConfig) -> Evaluation {
    let mut result = Evaluation::default();

    for (match_key, selection, book) in aggregation.selections() {
        let Some(sharp) = book.best_sharp() else {
            result.unreferenced += book.soft.len();
            continue;
        };

        for soft in &book.soft {
            let priced = compute_edge(sharp.odds, soft.odds)
                .and_then(|edge| stake.size(&edge).map(|kelly| (edge, kelly)));
            match priced {
                Ok((edge, kelly)) => {
                    debug!(
                        match_key = %match_key,
                        market = %selection.market,
                        selection = %selection.selection,
                        sharp = %sharp.bookmaker,
                        soft = %soft.bookmaker,
                        edge = %edge.edge_percent(),
                        "Priced soft quote"
                    );
                    result
                        .evaluations
                        .push(PriceEvaluation::new(sharp, soft, edge, kelly));
                }
                Err(error) => {
                    result.invalid_odds += 1;
                    warn!(
                        match_key = %match_key,
                        soft = %soft.bookmaker,
                        error = %error,
                        "Skipping comparison"
                    );
                }
            }
        }
    }

    result.evaluations.sort_by(|a, b| {
        b.edge_percent()
            .cmp(&a.edge_percent())
            .then_with(|| a.key.cmp(&b.key))
    });
    result
}
