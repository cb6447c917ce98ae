//! Classifier port: Trait for the externally produced severity model.
//!
//! This trait abstracts the artifact format from the application logic.

use serde::{Deserialize, Serialize};

use crate::domain::{ClassDistribution, Condition, FeatureRow, FeatureSchema, ModelError};

/// Maps a predicted class index back to its severity label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelDecoder {
    condition: Condition,
    classes: Vec<String>,
}

impl LabelDecoder {
    #[must_use]
    pub fn new(condition: Condition, classes: Vec<String>) -> Self {
        Self { condition, classes }
    }

    #[must_use]
    pub fn condition(&self) -> Condition {
        self.condition
    }

    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Decode a class index.
    ///
    /// # Errors
    /// Returns `ModelError::UnknownClass` if the index is out of range.
    pub fn inverse_transform(&self, index: usize) -> Result<&str, ModelError> {
        self.classes
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| ModelError::UnknownClass {
                condition: self.condition.to_string(),
                index,
                classes: self.classes.len(),
            })
    }
}

/// Trait for probability-producing severity classifiers.
///
/// Implementations provide:
/// - The feature schema the model was trained on
/// - One probability distribution per condition
/// - A label decoder per condition
pub trait Classifier: Send + Sync {
    /// Columns the model expects, already resolved to fields.
    fn schema(&self) -> &FeatureSchema;

    /// Predict class probabilities for a single row.
    ///
    /// Returns one distribution per condition, in [`Condition::ALL`] order.
    ///
    /// # Errors
    /// Returns `ModelError::Prediction` if the row does not fit the model.
    fn predict_proba(&self, row: &FeatureRow) -> Result<Vec<(Condition, ClassDistribution)>, ModelError>;

    /// Label decoder for a condition.
    fn decoder(&self, condition: Condition) -> Option<&LabelDecoder>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_transform() {
        let decoder = LabelDecoder::new(
            Condition::Stress,
            vec!["Low Stress".into(), "Moderate Stress".into()],
        );
        assert_eq!(decoder.inverse_transform(1).expect("in range"), "Moderate Stress");

        let err = decoder.inverse_transform(2).expect_err("out of range");
        assert!(err.to_string().contains("Stress"));
    }
}
