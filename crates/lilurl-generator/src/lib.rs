pub mod hash;

pub use hash::HashGenerator;

use lilurl_core::{OwnerId, ShortCode};

/// Trait for deriving short codes.
///
/// Implementations are pure functions of their inputs and don't interact
/// with storage: the same URL and owner always yield the same code, and
/// nothing guards against two different inputs landing on the same code.
pub trait Generator: Send + Sync + 'static {
    fn generate(&self, original_url: &str, owner: &OwnerId) -> ShortCode;
}
