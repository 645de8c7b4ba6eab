pub use lilurl_core::AccessError;

/// Result type for access-controller operations.
pub type Result<T> = std::result::Result<T, AccessError>;
