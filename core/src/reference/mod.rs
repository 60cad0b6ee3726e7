//! Read-only reference data: mob profiles and spawn regions.
//!
//! The pipeline never mutates reference data and never owns its source;
//! a `ReferenceStore` implementation is dependency-injected so the
//! identification stages stay pure and testable.

pub mod model;
pub mod store;

pub use model::{MobProfile, SpawnNameParts, SpawnRegion, SpawnZone, maturity_rank};
pub use store::{InMemoryReference, ReferenceStore};
