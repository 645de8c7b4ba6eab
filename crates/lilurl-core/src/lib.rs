//! Core types and traits for the lilurl short-code registry.
//!
//! This crate provides the types shared by the generator, the storage
//! engine and the access controller: short codes, owner identifiers,
//! entries with their access counters, the clock abstraction and the
//! registry settings.

pub mod clock;
pub mod entry;
pub mod error;
pub mod owner;
pub mod settings;
pub mod shortcode;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{Entry, EntrySnapshot, Expiry, LinkState};
pub use error::{AccessError, CoreError};
pub use owner::{OwnerId, OwnerIdSource, RandomOwnerIds};
pub use settings::RegistrySettings;
pub use shortcode::ShortCode;
