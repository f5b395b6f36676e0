//! Application services built on the domain and ports.
//!
//! - [`LifecycleManager`] - Serialized opportunity state machine
//! - [`DetectionPipeline`] - One ingestion cycle, end to end

mod lifecycle;
mod pipeline;

pub use lifecycle::{LifecycleConfig, LifecycleManager, Sweep, Transition};
pub use pipeline::{CycleReport, DetectionPipeline, DEFAULT_SNAPSHOT_RETENTION_HOURS};
