//! Error types for the claim_core library.
//!
//! Data problems inside an analysis never surface here: ambiguous records are
//! dropped and missing evidence is reported as gaps. These errors cover the
//! file-backed collaborators, configuration and registry lookups.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for claim_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// No criteria table is registered for the diagnostic code
    #[error("Unknown diagnostic code: {0}")]
    UnknownCondition(String),

    /// A criteria table failed validation
    #[error("Criteria defect in DC {code}: {detail}")]
    CriteriaDefect { code: String, detail: String },

    /// Profile store error
    #[error("Profile error: {0}")]
    Profile(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
