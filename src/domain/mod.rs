//! Bookmaker-agnostic domain logic.
//!
//! Everything here is pure and synchronous: normalization, aggregation, edge
//! and stake calculation, and the opportunity status machine. I/O lives
//! behind the [`port`](crate::port) traits.

mod aggregate;
mod edge;
mod error;
mod evaluate;
mod id;
mod normalize;
mod observation;
mod opportunity;
mod stake;

pub use aggregate::{aggregate, Aggregation, AggregationStats, SelectionBook};
pub use edge::{compute_edge, EdgeEstimate};
pub use error::{DomainError, OddsSide};
pub use evaluate::{evaluate, Evaluation, PriceEvaluation};
pub use id::{MatchKey, OpportunityId, OpportunityKey};
pub use normalize::{match_key, match_key_from_str, normalize};
pub use observation::{OddsObservation, SelectionKey};
pub use opportunity::{is_expired, OpportunityStatus, Settlement, ValueOpportunity};
pub use stake::{compute_kelly, StakeConfig};
