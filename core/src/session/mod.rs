pub mod tracker;

pub use tracker::{IngestOutcome, KillReport, SessionStats, SessionTracker};

#[cfg(test)]
mod tracker_tests;
