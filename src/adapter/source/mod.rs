//! Odds source adapters.

mod json;

pub use json::{JsonFileSource, RawObservation};
