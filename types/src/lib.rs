//! Shared plain-data types for the artemis pipeline.
//!
//! Kept dependency-light (serde only) so both the core pipeline and any
//! app shell can depend on it without pulling in the parsing stack.

pub mod formatting;
pub mod tuning;

pub use tuning::PipelineTuning;
