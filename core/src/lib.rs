//! artemis-core: log-to-event interpretation and mob identification.
//!
//! Turns the append-only stream of loosely structured chat.log lines into
//! a canonical typed event stream, then infers the identity of killed
//! creatures from indirect evidence (damage dealt, location, loot).
//!
//! The pipeline is synchronous end-to-end:
//! raw lines -> classifier -> raw events -> aggregator -> finalized events
//! -> kill window analysis -> spawn matching + profile scoring ->
//! identification result.
//!
//! File tailing, persistence and UI are collaborators outside this crate.

pub mod analysis;
pub mod chat_log;
pub mod error;
pub mod events;
pub mod identify;
pub mod reference;
pub mod session;

// Re-exports for convenience
pub use analysis::{KillAnalysis, analyze_kill};
pub use chat_log::{RawLine, classify, parse_chat_file};
pub use error::{AnalysisError, ReferenceError, SessionError};
pub use events::{EventAggregator, EventKind, Location, ParsedEvent};
pub use identify::{Confidence, IdentificationResult, Identifier};
pub use reference::{InMemoryReference, MobProfile, ReferenceStore, SpawnRegion};
pub use session::{IngestOutcome, KillReport, SessionStats, SessionTracker};
