//! `stockline-store`
//!
//! **Responsibility:** persistence and the application service that drives it.
//!
//! The [`Store`] trait is the storage seam: items, the quantity ledger, the
//! audit trail and user accounts behind one interface, with the in-memory
//! implementation used for tests and dev. The single hard rule it enforces is
//! unit-of-work commits: an item's new state and its ledger row land together
//! or not at all, and the row must chain onto the stored quantity.
//!
//! [`InventoryService`] is the only write path the outer layers see. It owns
//! the domain orchestration (validation, status pinning, audit snapshots) and
//! the async decision endpoints that go through the fallback coordinator.

pub mod advisor;
pub mod memory;
pub mod service;
pub mod store;

#[cfg(test)]
mod integration_tests;

pub use advisor::OpenAiAdvisor;
pub use memory::MemoryStore;
pub use service::{DashboardSummary, InventoryService, ItemPatch};
pub use store::{Store, StoreError};
