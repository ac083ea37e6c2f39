//! Error types for region OCR.
//!
//! This module defines all error types that can occur while driving the OCR
//! engine and reconciling region trees. Recoverable per-region conditions
//! (empty geometry, unattributable lines, clamped settings) are logged and
//! counted instead of being raised.

use std::path::PathBuf;

/// Result type alias for region OCR operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during region OCR.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The engine could not load its trained model.
    ///
    /// Fatal for the current image; the host process and any existing layout
    /// stay untouched.
    #[error("Failed to initialize OCR engine ({language} in {model_dir:?}): {reason}")]
    Initialization {
        /// Directory that was expected to contain the trained model
        model_dir: PathBuf,
        /// Requested language code
        language: String,
        /// Why loading failed
        reason: String,
    },

    /// An engine operation was called in a state that does not allow it.
    #[error("Invalid engine state: cannot {operation} while {state}")]
    InvalidState {
        /// Operation that was attempted
        operation: &'static str,
        /// Session state at the time of the call
        state: &'static str,
    },

    /// The engine reported a failed recognition pass.
    #[error("Recognition failed: {0}")]
    Recognition(String),

    /// Any other failure signalled by the engine backend.
    #[error("OCR backend error: {0}")]
    Backend(String),

    /// Raster buffer does not match its declared geometry.
    #[error("Image error: {0}")]
    Image(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error aborts the OCR operation for the whole image.
    ///
    /// Per-region failures are recovered by the caller; only session-level
    /// failures are fatal.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Initialization { .. } | Error::InvalidState { .. })
    }
}
