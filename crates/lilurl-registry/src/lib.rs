//! Access control for the lilurl short-code registry.
//!
//! [`AccessController`] ties an [`EntryStore`], a [`UserRegistry`] and a
//! [`Generator`] together and enforces ownership, expiry and access limits
//! on every operation. Expired entries are evicted lazily when someone
//! tries to use them; [`spawn_sweeper`] adds an optional periodic purge.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use lilurl_core::{AccessError, RegistrySettings};
//! use lilurl_generator::HashGenerator;
//! use lilurl_registry::AccessController;
//! use lilurl_storage::{InMemoryEntryStore, UserRegistry};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let controller = AccessController::new(
//!     Arc::new(InMemoryEntryStore::new()),
//!     Arc::new(UserRegistry::new()),
//!     HashGenerator::new(),
//!     RegistrySettings::default(),
//! )?;
//!
//! let created = controller.create("https://example.com", None);
//! let url = controller.access(&created.code, &created.owner)?;
//! assert_eq!(url, "https://example.com");
//!
//! controller.delete(&created.code, &created.owner)?;
//! assert!(matches!(
//!     controller.access(&created.code, &created.owner),
//!     Err(AccessError::NotFound(_))
//! ));
//! # Ok(())
//! # }
//! ```
//!
//! [`EntryStore`]: lilurl_storage::EntryStore
//! [`UserRegistry`]: lilurl_storage::UserRegistry
//! [`Generator`]: lilurl_generator::Generator

pub mod controller;
pub mod error;
pub mod sweeper;

pub use controller::{AccessController, Created};
pub use error::Result;
pub use sweeper::{spawn_sweeper, SweeperHandle};
