//! # Mindscreen
//!
//! Student mental-health screening against a pre-trained hybrid classifier.
//!
//! This crate provides:
//! - A 7-field demographic profile and a 26-item questionnaire (0-3 scale)
//! - A native evaluator for the exported forest + boosting ensemble
//! - Per-condition (Anxiety, Stress, Depression) severity buckets and advice
//! - Terminal UI and headless assessment for local-only use
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (profile, questionnaire, feature row, severity, report)
//! - `ports`: Trait definitions for external operations (the classifier)
//! - `adapters`: Concrete implementations (tree ensemble, log redaction)
//! - `application`: Use cases orchestrating domain and ports
//! - `config`: Environment-driven settings
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{Assessment, Condition, Severity, StudentProfile};

/// Result type for Mindscreen operations
pub type Result<T> = std::result::Result<T, MindscreenError>;

/// Main error type for Mindscreen
#[derive(Debug, thiserror::Error)]
pub enum MindscreenError {
    #[error(transparent)]
    Model(#[from] domain::ModelError),

    #[error("Invalid profile: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
