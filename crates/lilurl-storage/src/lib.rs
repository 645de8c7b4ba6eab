//! Concurrent in-memory storage for the lilurl registry.
//!
//! [`InMemoryEntryStore`] maps short codes to entries and is the single
//! source of truth for which links exist. [`UserRegistry`] tracks which
//! codes each owner created.

pub mod memory;
pub mod store;
pub mod users;

pub use memory::InMemoryEntryStore;
pub use store::EntryStore;
pub use users::{User, UserRegistry};
