use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use uuid::Uuid;

/// Identifies the user who created an entry.
///
/// Ownership is decided by plain string equality between two `OwnerId`s;
/// there is no proof of identity behind it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Parses caller input, rejecting anything that is not a UUID.
    ///
    /// The input is kept verbatim (after trimming) so that comparisons stay
    /// exact string comparisons.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        Uuid::parse_str(input)
            .map_err(|e| CoreError::InvalidOwnerId(format!("'{}': {}", input, e)))?;
        Ok(Self(input.to_owned()))
    }

    /// Creates an `OwnerId` without checking its format.
    pub fn new_unchecked(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Uuid> for OwnerId {
    fn from(value: Uuid) -> Self {
        Self(value.hyphenated().to_string())
    }
}

impl Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of fresh owner identifiers for callers that did not bring one.
pub trait OwnerIdSource: Send + Sync {
    fn next_owner_id(&self) -> OwnerId;
}

/// Hands out random (v4) UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomOwnerIds;

impl OwnerIdSource for RandomOwnerIds {
    fn next_owner_id(&self) -> OwnerId {
        OwnerId::from(Uuid::new_v4())
    }
}
