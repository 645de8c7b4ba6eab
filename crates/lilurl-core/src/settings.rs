use crate::entry::Expiry;
use crate::error::{CoreError, Result};
use jiff::SignedDuration;
use typed_builder::TypedBuilder;

pub const DEFAULT_BASE_URL: &str = "http://lil.url/";
pub const DEFAULT_ACCESS_LIMIT: u32 = 10;

/// Values the registry takes from its environment.
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct RegistrySettings {
    /// Lifetime of a new entry. Zero means entries never expire.
    #[builder(default = SignedDuration::from_hours(24))]
    pub expiry: SignedDuration,
    /// Prefix that turns a short code into a short URL.
    #[builder(default = DEFAULT_BASE_URL.to_string(), setter(into))]
    pub base_url: String,
    /// Access count every new entry starts with.
    #[builder(default = DEFAULT_ACCESS_LIMIT)]
    pub default_access_limit: u32,
}

impl RegistrySettings {
    pub fn validate(&self) -> Result<()> {
        if self.expiry.is_negative() {
            return Err(CoreError::InvalidSettings(format!(
                "expiry must not be negative, got {}",
                self.expiry
            )));
        }

        if self.base_url.trim().is_empty() {
            return Err(CoreError::InvalidSettings(
                "base url cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn expiry_policy(&self) -> Expiry {
        Expiry::from_duration(self.expiry)
    }
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self::builder().build()
    }
}
