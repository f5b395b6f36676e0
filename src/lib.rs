//! Vantedge - sharp-vs-soft odds comparison and value-bet detection.
//!
//! Bookmaker quotes are normalized onto a shared match identity, grouped per
//! selection and priced against the most efficient ("sharp") book. Quotes
//! where a soft book pays more than the sharp-implied fair price become value
//! opportunities with a capped fractional-Kelly stake, tracked through a small
//! status machine until they move, expire or settle.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── domain/        Pure types and calculations
//! ├── port/          Trait seams (sources, stores)
//! ├── adapter/       JSON source, in-memory and SQLite stores, CLI
//! ├── application/   Lifecycle manager and detection pipeline
//! └── app/           Configuration and wiring
//! ```
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use vantedge::domain::{compute_edge, compute_kelly, StakeConfig};
//!
//! let edge = compute_edge(dec!(2.00), dec!(2.30)).unwrap();
//! assert_eq!(edge.edge_percent(), dec!(15));
//!
//! let stake = compute_kelly(dec!(2.00), dec!(2.30), &StakeConfig::default()).unwrap();
//! assert!(stake > dec!(0.028) && stake < dec!(0.029));
//! ```

pub mod adapter;
pub mod app;
pub mod application;
pub mod domain;
pub mod error;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
