//! Adapter over a partitioned key/value table service.
//!
//! - `store`: the [`TableStore`] port and its row model.
//! - `memory`: an in-process store used by tests and tooling.
//! - `codec`: row mapping for every itinerary table.
//! - `repository`: the itinerary ports implemented on top of a store.

pub mod codec;
pub mod memory;
mod repository;
pub mod store;

pub use memory::MemoryTableStore;
pub use repository::TableItineraryRepository;
pub use store::{PropertyValue, TableEntity, TableQuery, TableStore, TableStoreError};
