//! Domain layer: Core business types and logic.
//!
//! Profile, questionnaire, feature row, severity buckets and the interpreted
//! assessment. Nothing in here touches the filesystem or the model artifact.

pub mod advice;
mod assessment;
mod error;
pub mod extract;
mod features;
mod profile;
mod questionnaire;
mod report;
mod severity;

pub use assessment::{Assessment, ClassDistribution, ConditionResult, ScaleScore};
pub use error::ModelError;
pub use extract::{extract_number, extract_number_opt};
pub use features::{FeatureField, FeatureRow, FeatureSchema, FeatureValue, SchemaError, FEATURE_COUNT};
pub use profile::{AcademicYear, AgeGroup, Gender, StudentProfile, UniversityType, CGPA_MAX};
pub use questionnaire::{
    Answers, Likert, Question, QuestionnairePart, Subscale, QUESTIONS, QUESTION_COUNT,
};
pub use report::{Report, DISCLAIMER};
pub use severity::{classify_label, display_label, Condition, MinimalPolicy, Severity};
