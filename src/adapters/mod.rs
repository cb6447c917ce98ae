//! Adapters layer: Concrete implementations of ports.
//!
//! - `ensemble`: native evaluator for the exported hybrid tree ensemble
//! - `sanitize`: redaction for log output

pub mod ensemble;
pub mod sanitize;

pub use ensemble::{EnsembleClassifier, IntegrityPolicy};
