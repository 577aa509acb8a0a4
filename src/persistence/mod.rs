//! Save/load persistence
//!
//! Storage is abstracted behind [`KeyValueStore`] so the same code runs against
//! browser LocalStorage, an in-memory map natively, and in tests. Saved player
//! progress is decoded leniently: missing or malformed fields fall back to
//! defaults individually, and old array-style inventories are migrated.

pub mod save;
pub mod store;

#[cfg(target_arch = "wasm32")]
pub use store::LocalStore;
pub use store::{KeyValueStore, MemoryStore, StoreError};
