//! Error types for context capture operations.
//!
//! This module defines [`CaptureError`], which covers everything that can go
//! wrong *inside* the extraction pipeline. The public entry points in
//! [`crate::readability`] and [`crate::chat`] never surface these errors to
//! their callers; they degrade to a lower-fidelity result instead.
//!
//! # Example
//!
//! ```rust
//! use contextprompt_core::{CaptureError, Result};
//!
//! fn require_content(markdown: &str) -> Result<&str> {
//!     if markdown.is_empty() {
//!         return Err(CaptureError::NoContent);
//!     }
//!     Ok(markdown)
//! }
//! ```

use thiserror::Error;

/// Main error type for capture operations.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// HTML parsing errors.
    ///
    /// Returned when a CSS selector is invalid or markup cannot be walked.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// No content could be extracted from the document.
    ///
    /// Returned by individual pipeline stages when their output is below the
    /// acceptance threshold; the orchestrator treats it as "try the next stage".
    #[error("No content could be extracted from the document")]
    NoContent,

    /// Platform table or other configuration errors.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// JSON (de)serialization errors for platform tables and capture messages.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O errors when loading override tables.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for CaptureError.
pub type Result<T> = std::result::Result<T, CaptureError>;
