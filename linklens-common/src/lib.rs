//! Shared types used across the LinkLens crates.
//!
//! This crate holds the error taxonomy every layer maps into and the tracing
//! initialiser used by binaries and integration tests. It stays small so that
//! every crate can depend on it.
//!
//! # Overview
//!
//! - [`LinklensError`] and [`Result`]: shared error handling
//! - [`observability`]: centralised tracing/logging initialisation
//!
//! # Examples
//!
//! ```rust
//! use linklens_common::LinklensError;
//!
//! let err = LinklensError::NotFound("durov".into());
//! assert_eq!(err.kind(), "not_found");
//! assert!(err.to_string().contains("durov"));
//! ```

pub mod observability;

/// Errors surfaced by the profile pipeline and its collaborators.
#[derive(thiserror::Error, Debug)]
pub enum LinklensError {
    /// The supplied profile link could not be parsed into an account reference.
    #[error("invalid profile link: {0}")]
    InvalidInput(String),

    /// The handle does not resolve to any upstream account.
    #[error("account not found: {0}")]
    NotFound(String),

    /// Transport, decode or API failure reported by the upstream service.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// Required configuration (usually the access token) is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl LinklensError {
    /// Stable machine-readable name of the variant, used in logs and error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            LinklensError::InvalidInput(_) => "invalid_input",
            LinklensError::NotFound(_) => "not_found",
            LinklensError::Upstream(_) => "upstream",
            LinklensError::Config(_) => "config",
        }
    }
}

/// Convenient alias for results that use [`LinklensError`].
pub type Result<T> = std::result::Result<T, LinklensError>;
