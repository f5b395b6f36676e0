//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!   ┌─────────────┐      ┌───────────────────────┐      ┌─────────────┐
//!   │ OddsSource  │ ───▶ │ Domain + Application  │ ───▶ │   Stores    │
//!   │  (adapter)  │      │                       │      │  (adapter)  │
//!   └─────────────┘      └───────────────────────┘      └─────────────┘
//! ```
//!
//! - [`OddsSource`] - Ingestion of bookmaker odds
//! - [`OpportunityStore`] - Persistence of value opportunities
//! - [`SnapshotStore`] - Retention of raw odds snapshots

mod source;
mod store;

pub use source::{OddsSource, SourceBatch};
pub use store::{OpportunityQuery, OpportunityStore, SnapshotStore, MAX_QUERY_LIMIT};
