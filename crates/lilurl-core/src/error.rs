use crate::shortcode::ShortCode;
use thiserror::Error;

/// Result type for input validation in the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid short code: {0}")]
    InvalidShortCode(String),
    #[error("invalid owner id: {0}")]
    InvalidOwnerId(String),
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

/// A refused registry operation.
///
/// Every variant is an expected answer to a single request and carries
/// the short code it was about. None of them is fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("short code not found: {0}")]
    NotFound(ShortCode),
    #[error("link is no longer active: {0}")]
    Expired(ShortCode),
    #[error("caller does not own link: {0}")]
    Unauthorized(ShortCode),
    #[error("access limit reached for link: {0}")]
    LimitExhausted(ShortCode),
}

impl AccessError {
    /// Returns the short code the refused operation targeted.
    pub fn code(&self) -> &ShortCode {
        match self {
            AccessError::NotFound(code)
            | AccessError::Expired(code)
            | AccessError::Unauthorized(code)
            | AccessError::LimitExhausted(code) => code,
        }
    }
}
