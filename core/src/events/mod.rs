pub mod aggregator;
pub mod model;


pub use aggregator::EventAggregator;
pub use model::{EventKind, Location, LootItem, ParsedEvent, UNKNOWN_CREATURE};
