//! Errors raised around the classifier artifact.

use super::features::SchemaError;

/// Error type for model loading and prediction.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Failed to read model artifact: {0}")]
    Io(String),

    #[error("Invalid model artifact: {0}")]
    Format(String),

    #[error("Model signature verification failed: {0}")]
    Signature(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Prediction failed: {0}")]
    Prediction(String),

    #[error("Unknown class index {index} for {condition} ({classes} classes)")]
    UnknownClass {
        condition: String,
        index: usize,
        classes: usize,
    },
}
