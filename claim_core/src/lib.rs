#![forbid(unsafe_code)]

//! Core domain model and rating logic for the vclaim evidence analyzer.
//!
//! This crate provides:
//! - Domain types (symptom logs, measurements, condition profiles, outcomes)
//! - The declarative criteria registry for 38 CFR Part 4 diagnostic codes
//! - Window filtering, metric aggregation, rating selection and rationale
//! - Persistence (JSONL record store, profile book)
//! - Summaries, CSV export and memoization keys

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod window;
pub mod metrics;
pub mod criteria;
pub mod selector;
pub mod rationale;
pub mod analysis;
pub mod summary;
pub mod profile;
pub mod store;
pub mod memo;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use window::EvaluationWindow;
pub use criteria::ConditionCriteria;
pub use analysis::{
    analyze, analyze_all, analyze_condition, Analysis, AnalysisOptions, AnalysisResult,
    DEFAULT_EVALUATION_DAYS,
};
pub use summary::{summarize_by_body_system, BodySystemSummary};
pub use profile::{ProfileBook, ProfileProvider};
pub use store::{ImportSummary, JsonlStore, LogRepository, RecordSink};
pub use memo::MemoKey;
pub use export::export_csv;
