// SPDX-FileCopyrightText: 2026 Shirokuma Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Shirokuma diagnosis service.

use thiserror::Error;

/// The primary error type used across all Shirokuma adapter traits and pipeline stages.
#[derive(Debug, Error)]
pub enum ShirokumaError {
    /// Configuration errors (missing secrets, invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// A required local asset (lookup table, template) is missing or malformed.
    #[error("asset error ({path}): {message}")]
    Asset { path: String, message: String },

    /// The inbound text did not contain the required birth data.
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// The birth date could not be resolved through the lookup tables.
    #[error("classification unresolved for {0}")]
    Classification(String),

    /// LLM provider errors (API failure, malformed response).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The provider kept answering 429/5xx until retries ran out.
    #[error("provider unavailable after {attempts} attempts")]
    RateLimited { attempts: u32 },

    /// The provider declined to answer, including after the safer retry.
    #[error("provider refused the request")]
    Refused,

    /// Messaging platform errors (reply, push, profile lookup).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// PDF rendering failed.
    #[error("report rendering failed: {0}")]
    Report(String),

    /// Report upload to object storage failed.
    #[error("report upload failed: {message}")]
    Upload {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ShirokumaError {
    /// Returns true for failures caused by the user's input rather than the system.
    ///
    /// These are answered with guidance text and are not logged as faults.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            ShirokumaError::Extraction(_) | ShirokumaError::Classification(_)
        )
    }
}
