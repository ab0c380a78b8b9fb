//! Error types for kiosk-rotator
//!
//! Only startup can fail with these. Once running, fetch failures
//! ([`crate::catalog::FetchError`]) are retried and media failures
//! ([`crate::surface::MediaLoadError`]) are skipped.

use thiserror::Error;

/// Main error type for kiosk-rotator
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid state for operation
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// Errors from the shared library
    #[error(transparent)]
    Common(#[from] kiosk_common::Error),
}

/// Convenience Result type using kiosk-rotator Error
pub type Result<T> = std::result::Result<T, Error>;
