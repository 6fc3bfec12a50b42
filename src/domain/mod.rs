//! Business entities and the store they live in
//!
//! The engine reads and writes through the `DomainStore` trait only.

pub mod memory;
pub mod model;
pub mod store;

pub use memory::MemoryStore;
pub use store::{DomainStore, StoreError, StoreResult};
