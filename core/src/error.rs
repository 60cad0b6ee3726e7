//! Error types for the pipeline.
//!
//! Unparseable lines are not errors (the classifier returns `None`);
//! these types cover caller contract violations and reference-store
//! failures, which must be distinguishable by the caller.

use thiserror::Error;

/// Contract violations in kill-window analysis.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// `analyze_kill` was handed a non-kill event as the window boundary.
    #[error("expected a MOB_KILLED event, got {0}")]
    NotAKillEvent(&'static str),
}

/// Anything that can stop a session tracker from producing kill
/// reports. Ingestion itself is infallible; only the analysis and
/// identification stages behind it can fail.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error(transparent)]
    Reference(#[from] ReferenceError),
}

/// Failures surfaced by the read-only reference-data store.
///
/// The pipeline never retries these internally; they propagate to the
/// caller, and identification degrades to low confidence instead of
/// blocking the event stream.
#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("reference store unavailable: {0}")]
    Unavailable(String),

    #[error("malformed reference data: {0}")]
    Malformed(#[from] serde_json::Error),
}
