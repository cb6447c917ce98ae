//! Assessment service: Orchestrates one screening submission.
//!
//! This service coordinates:
//! - Profile validation
//! - Feature row construction in the model's column order
//! - Probability prediction
//! - Label decoding and severity bucketing
//! - Report export

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::{
    Answers, Assessment, ClassDistribution, Condition, ConditionResult, FeatureRow, MinimalPolicy,
    ModelError, Report, StudentProfile,
};
use crate::ports::Classifier;
use crate::{MindscreenError, Result};

/// Service for running screenings against a loaded classifier.
///
/// The classifier is immutable after load and shared by reference; the
/// feature row lives only for the duration of one call.
pub struct AssessmentService<C>
where
    C: Classifier,
{
    classifier: Arc<C>,
    policy: MinimalPolicy,
}

impl<C> AssessmentService<C>
where
    C: Classifier,
{
    /// Create a new assessment service.
    pub fn new(classifier: Arc<C>, policy: MinimalPolicy) -> Self {
        Self { classifier, policy }
    }

    #[must_use]
    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    #[must_use]
    pub fn policy(&self) -> MinimalPolicy {
        self.policy
    }

    /// Step 1: validate the profile and shape the submission.
    ///
    /// # Errors
    /// Returns `MindscreenError::Validation` listing every profile problem.
    pub fn build_row(
        &self,
        profile: &StudentProfile,
        answers: &Answers,
    ) -> Result<FeatureRow> {
        profile.validate().map_err(MindscreenError::Validation)?;
        Ok(FeatureRow::build(self.classifier.schema(), profile, answers))
    }

    /// Step 2: run the classifier.
    ///
    /// # Errors
    /// Returns `MindscreenError::Model` if prediction fails.
    pub fn predict(
        &self,
        row: &FeatureRow,
    ) -> Result<Vec<(Condition, ClassDistribution)>> {
        Ok(self.classifier.predict_proba(row)?)
    }

    /// Step 3: decode the most probable class per condition and bucket it,
    /// then attach the raw questionnaire totals.
    ///
    /// # Errors
    /// Returns `MindscreenError::Model` if a condition is missing, has no
    /// decoder, or predicts a class the decoder does not know.
    pub fn interpret(
        &self,
        predictions: Vec<(Condition, ClassDistribution)>,
        answers: &Answers,
    ) -> Result<Assessment> {
        let mut results = Vec::with_capacity(Condition::ALL.len());

        for condition in Condition::ALL {
            let dist = predictions
                .iter()
                .find(|(c, _)| *c == condition)
                .map(|(_, d)| d)
                .ok_or_else(|| {
                    ModelError::Prediction(format!("Model returned no prediction for {condition}"))
                })?;
            let decoder = self.classifier.decoder(condition).ok_or_else(|| {
                ModelError::Prediction(format!("Model has no label decoder for {condition}"))
            })?;
            let index = dist.argmax().ok_or_else(|| {
                ModelError::Prediction(format!("Empty distribution for {condition}"))
            })?;
            let label = decoder.inverse_transform(index)?;

            results.push(ConditionResult::new(condition, label, dist, self.policy));
        }

        Ok(Assessment::new(results).with_scale_scores(answers))
    }

    /// Run the full pipeline for one submission.
    ///
    /// # Errors
    /// Returns error if any step fails.
    pub fn assess(
        &self,
        profile: &StudentProfile,
        answers: &Answers,
    ) -> Result<Assessment> {
        tracing::debug!("Step 1: Building feature row...");
        let row = self.build_row(profile, answers)?;

        tracing::debug!("Step 2: Predicting...");
        let predictions = self.predict(&row)?;
        drop(row);

        tracing::debug!("Step 3: Interpreting labels...");
        let assessment = self.interpret(predictions, answers)?;

        log_summary(&assessment);
        Ok(assessment)
    }

    /// Write the plain-text report into `dir` (created if missing).
    ///
    /// # Errors
    /// Returns `MindscreenError::Io` if the directory or file cannot be written.
    pub fn export_report(
        &self,
        assessment: &Assessment,
        profile: &StudentProfile,
        dir: &Path,
    ) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(Report::file_name(assessment.created_at));
        std::fs::write(&path, Report::render(assessment, profile))?;
        tracing::info!("Report saved to {:?}", path);
        Ok(path)
    }
}

/// Severities only. The reference id and raw answers stay out of the logs.
fn log_summary(assessment: &Assessment) {
    let severity = |c: Condition| {
        assessment
            .result(c)
            .map_or_else(|| "-".to_string(), |r| r.severity.to_string())
    };
    tracing::info!(
        "Assessment complete: anxiety={}, stress={}, depression={}, concern={}",
        severity(Condition::Anxiety),
        severity(Condition::Stress),
        severity(Condition::Depression),
        assessment
            .primary_concern
            .map_or("none", |c| c.name())
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{EnsembleClassifier, IntegrityPolicy};
    use crate::domain::{FeatureSchema, Likert, Severity, QUESTION_COUNT};
    use crate::ports::LabelDecoder;
    use tempfile::tempdir;

    fn demo_service(policy: MinimalPolicy) -> AssessmentService<EnsembleClassifier> {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("models");
        let model = EnsembleClassifier::load(&dir, &IntegrityPolicy::default())
            .expect("Demo model should load");
        AssessmentService::new(Arc::new(model), policy)
    }

    fn uniform(v: Likert) -> Answers {
        Answers::new([v; QUESTION_COUNT])
    }

    #[test]
    fn test_all_zero_is_low_risk_everywhere() {
        let service = demo_service(MinimalPolicy::Healthy);
        let assessment = service
            .assess(&StudentProfile::default(), &Answers::default())
            .expect("Should assess");

        assert_eq!(assessment.results.len(), 3);
        assert!(assessment.all_healthy());
        assert_eq!(assessment.primary_concern, None);
        for r in &assessment.results {
            assert_eq!(r.severity, Severity::Low);
            assert_eq!(r.display_label, format!("No {} / Healthy", r.condition));
        }
    }

    #[test]
    fn test_maximal_answers_are_high_risk() {
        let service = demo_service(MinimalPolicy::Healthy);
        let assessment = service
            .assess(&StudentProfile::default(), &uniform(Likert::VeryOften))
            .expect("Should assess");

        let labels: Vec<&str> = assessment.results.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(
            labels,
            ["Severe Anxiety", "High Perceived Stress", "Severe Depression"]
        );
        assert!(assessment.results.iter().all(|r| r.severity == Severity::Severe));
        assert_eq!(assessment.healthy_count(), 0);
        // Stress has the highest confidence of the three.
        assert_eq!(assessment.primary_concern, Some(Condition::Stress));
    }

    #[test]
    fn test_mixed_answers_flag_one_condition() {
        let service = demo_service(MinimalPolicy::Healthy);
        let assessment = service
            .assess(&StudentProfile::default(), &uniform(Likert::Sometimes))
            .expect("Should assess");

        let anxiety = assessment.result(Condition::Anxiety).expect("anxiety");
        assert_eq!(anxiety.label, "Mild Anxiety");
        assert_eq!(anxiety.severity, Severity::Mild);
        assert_eq!(assessment.healthy_count(), 2);
        assert_eq!(assessment.primary_concern, Some(Condition::Anxiety));
    }

    #[test]
    fn test_minimal_policy_is_configurable() {
        let service = demo_service(MinimalPolicy::AtRisk);
        let assessment = service
            .assess(&StudentProfile::default(), &Answers::default())
            .expect("Should assess");

        let anxiety = assessment.result(Condition::Anxiety).expect("anxiety");
        assert_eq!(anxiety.label, "Minimal Anxiety");
        assert_eq!(anxiety.severity, Severity::Mild);
        assert_eq!(assessment.primary_concern, Some(Condition::Anxiety));
    }

    #[test]
    fn test_identical_inputs_give_identical_results() {
        let service = demo_service(MinimalPolicy::Healthy);
        let answers = uniform(Likert::Often);
        let a = service
            .assess(&StudentProfile::default(), &answers)
            .expect("Should assess");
        let b = service
            .assess(&StudentProfile::default(), &answers)
            .expect("Should assess");
        assert_eq!(a.results, b.results);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_invalid_profile_is_rejected() {
        let service = demo_service(MinimalPolicy::Healthy);
        let profile = StudentProfile {
            department: "  ".into(),
            cgpa: 4.5,
            ..StudentProfile::default()
        };
        match service.assess(&profile, &Answers::default()) {
            Err(MindscreenError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_export_report() {
        let service = demo_service(MinimalPolicy::Healthy);
        let profile = StudentProfile::default();
        let assessment = service
            .assess(&profile, &uniform(Likert::VeryOften))
            .expect("Should assess");

        let temp = tempdir().expect("tempdir");
        let dir = temp.path().join("nested").join("reports");
        let path = service
            .export_report(&assessment, &profile, &dir)
            .expect("Should export");

        assert_eq!(
            path.file_name().and_then(|n| n.to_str()),
            Some(Report::file_name(assessment.created_at).as_str())
        );
        let text = std::fs::read_to_string(&path).expect("read report");
        assert!(text.contains("Stress: High Perceived Stress"));
        assert!(text.contains("Stress (PSS): 30/30"));
        assert!(text.contains("[Primary Concern]: Stress"));
    }

    /// Classifier double whose decoder knows fewer classes than it predicts.
    struct ShortDecoder {
        schema: FeatureSchema,
        decoders: Vec<LabelDecoder>,
    }

    impl Classifier for ShortDecoder {
        fn schema(&self) -> &FeatureSchema {
            &self.schema
        }

        fn predict_proba(
            &self,
            _row: &FeatureRow,
        ) -> std::result::Result<Vec<(Condition, ClassDistribution)>, ModelError> {
            Ok(Condition::ALL
                .iter()
                .map(|c| (*c, ClassDistribution::new(vec![0.1, 0.9])))
                .collect())
        }

        fn decoder(&self, condition: Condition) -> Option<&LabelDecoder> {
            self.decoders.iter().find(|d| d.condition() == condition)
        }
    }

    #[test]
    fn test_undecodable_class_is_an_error() {
        let stub = ShortDecoder {
            schema: FeatureSchema::default(),
            decoders: Condition::ALL
                .iter()
                .map(|c| LabelDecoder::new(*c, vec![format!("No {c}")]))
                .collect(),
        };
        let service = AssessmentService::new(Arc::new(stub), MinimalPolicy::Healthy);
        let err = service
            .assess(&StudentProfile::default(), &Answers::default())
            .expect_err("index 1 is unknown");
        assert!(matches!(
            err,
            MindscreenError::Model(ModelError::UnknownClass { index: 1, .. })
        ));
    }
}
