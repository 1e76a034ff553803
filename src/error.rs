//! Error types for the silica predictor.
//!
//! Two component-level error kinds cover the request/response cycle:
//!
//! - [`LoadError`]: the model artifact could not be loaded (missing,
//!   unreadable, or incompatible with this build).
//! - [`PredictError`]: a prediction call failed (bad input, malformed
//!   model internals).
//!
//! Both are recovered at the presentation boundary: they become a
//! user-visible message and leave the session usable. [`SilicaError`]
//! unifies them with configuration and IO errors for the app boundary,
//! with a [`Result`] alias.
//!
//! # Example
//!
//! ```rust
//! use silica::error::{LoadError, SilicaError};
//!
//! fn describe(err: &SilicaError) -> String {
//!     format!("{}", err)
//! }
//!
//! let err = SilicaError::from(LoadError::NotFound("modelo.bin".into()));
//! assert!(describe(&err).contains("modelo.bin"));
//! ```

use std::io;
use thiserror::Error;

/// Errors from loading the model artifact.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("model artifact not found: {0}")]
    NotFound(String),

    #[error("model artifact is corrupt: {0}")]
    Corrupt(String),

    #[error("incompatible model artifact format: {0}")]
    IncompatibleFormat(String),

    #[error("model schema mismatch: {0}")]
    SchemaMismatch(String),
}

impl LoadError {
    /// Check whether the artifact was simply absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::NotFound(_))
    }
}

/// Errors from a single prediction call.
#[derive(Error, Debug)]
pub enum PredictError {
    #[error("non-finite input: {field} = {value}")]
    NonFiniteInput { field: &'static str, value: f64 },

    #[error("feature row does not match the model schema: {0}")]
    SchemaMismatch(String),

    #[error("inference failed: {0}")]
    Inference(String),
}

/// Unified error type for silica operations.
#[derive(Error, Debug)]
pub enum SilicaError {
    #[error("model load failed: {0}")]
    Load(#[from] LoadError),

    #[error("prediction failed: {0}")]
    Predict(#[from] PredictError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for SilicaError {
    fn from(e: serde_json::Error) -> Self {
        SilicaError::Config(e.to_string())
    }
}

/// Result type alias for silica operations.
pub type Result<T> = std::result::Result<T, SilicaError>;
