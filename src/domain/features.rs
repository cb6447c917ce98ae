//! Feature schema and the single-row model input.
//!
//! The classifier artifact declares the column names it was trained on. Rather
//! than trusting column positions, every declared name is resolved to a
//! [`FeatureField`] when the artifact is loaded; unknown, duplicated or missing
//! fields abort the load. Rows are then emitted in the artifact's own order.

use serde::Serialize;

use super::profile::StudentProfile;
use super::questionnaire::{Answers, QUESTIONS, QUESTION_COUNT};

/// Demographic fields + questionnaire items.
pub const FEATURE_COUNT: usize = 7 + QUESTION_COUNT;

/// Logical input a column carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureField {
    Age,
    Gender,
    University,
    Department,
    AcademicYear,
    Cgpa,
    Scholarship,
    /// 1-based questionnaire item
    Question(usize),
}

impl FeatureField {
    /// Canonical column name used by the built-in schema.
    #[must_use]
    pub fn canonical_name(&self) -> String {
        match self {
            Self::Age => "Age".to_string(),
            Self::Gender => "Gender".to_string(),
            Self::University => "University".to_string(),
            Self::Department => "Department".to_string(),
            Self::AcademicYear => "Academic Year".to_string(),
            Self::Cgpa => "Current CGPA".to_string(),
            Self::Scholarship => "Scholarship".to_string(),
            Self::Question(n) => format!("Q{n}"),
        }
    }

    /// Whether the model receives this field as a category string.
    #[must_use]
    pub fn is_categorical(&self) -> bool {
        matches!(
            self,
            Self::Gender | Self::University | Self::Department | Self::AcademicYear | Self::Scholarship
        )
    }

    /// All fields in canonical order.
    #[must_use]
    pub fn all() -> Vec<Self> {
        let mut fields = vec![
            Self::Age,
            Self::Gender,
            Self::University,
            Self::Department,
            Self::AcademicYear,
            Self::Cgpa,
            Self::Scholarship,
        ];
        fields.extend((1..=QUESTION_COUNT).map(Self::Question));
        fields
    }

    /// Resolve a declared column name.
    #[must_use]
    pub fn from_column_name(name: &str) -> Option<Self> {
        let norm = normalize(name);

        match norm.as_str() {
            "age" | "age group" => return Some(Self::Age),
            "gender" | "sex" => return Some(Self::Gender),
            "university" | "university type" | "uni" => return Some(Self::University),
            "department" | "dept" => return Some(Self::Department),
            "academic year" | "year" => return Some(Self::AcademicYear),
            "current cgpa" | "cgpa" => return Some(Self::Cgpa),
            "scholarship"
            | "waiver"
            | "scholarship waiver"
            | "did you receive a waiver or scholarship at your university" => {
                return Some(Self::Scholarship)
            }
            _ => {}
        }

        if let Some(n) = question_number(&norm) {
            return Some(Self::Question(n));
        }

        QUESTIONS
            .iter()
            .find(|q| normalize(q.text) == norm)
            .map(|q| Self::Question(q.number))
    }
}

/// Lowercase, punctuation to spaces, collapse whitespace, drop a leading
/// "N." enumeration prefix.
fn normalize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect();
    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
    if tokens.len() > 1 && tokens[0].chars().all(|c| c.is_ascii_digit()) {
        tokens.remove(0);
    }
    tokens.join(" ")
}

/// "q7", "q 7", "question 7" → 7 (only 1..=26).
fn question_number(norm: &str) -> Option<usize> {
    let rest = norm
        .strip_prefix("question")
        .or_else(|| norm.strip_prefix('q'))?
        .trim();
    let n: usize = rest.parse().ok()?;
    (1..=QUESTION_COUNT).contains(&n).then_some(n)
}

/// Declared columns did not line up with the fields this application collects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "Feature schema mismatch (expected {expected} columns, got {got}){}",
    describe_problems(.unknown, .duplicates, .missing)
)]
pub struct SchemaError {
    pub expected: usize,
    pub got: usize,
    pub unknown: Vec<String>,
    pub duplicates: Vec<String>,
    pub missing: Vec<String>,
}

fn describe_problems(unknown: &[String], duplicates: &[String], missing: &[String]) -> String {
    let mut out = String::new();
    if !unknown.is_empty() {
        out.push_str(&format!("; unknown: {}", unknown.join(", ")));
    }
    if !duplicates.is_empty() {
        out.push_str(&format!("; duplicated: {}", duplicates.join(", ")));
    }
    if !missing.is_empty() {
        out.push_str(&format!("; missing: {}", missing.join(", ")));
    }
    out
}

/// Ordered, validated column list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    columns: Vec<String>,
    fields: Vec<FeatureField>,
}

impl Default for FeatureSchema {
    fn default() -> Self {
        let fields = FeatureField::all();
        Self {
            columns: fields.iter().map(FeatureField::canonical_name).collect(),
            fields,
        }
    }
}

impl FeatureSchema {
    /// Resolve declared column names to fields.
    ///
    /// # Errors
    /// Returns [`SchemaError`] listing every unknown, duplicated and missing
    /// column when the declaration does not cover exactly the 33 fields.
    pub fn resolve<S: AsRef<str>>(columns: &[S]) -> Result<Self, SchemaError> {
        let mut unknown = Vec::new();
        let mut duplicates = Vec::new();
        let mut fields = Vec::with_capacity(columns.len());

        for col in columns {
            let name = col.as_ref();
            match FeatureField::from_column_name(name) {
                Some(field) if fields.contains(&field) => duplicates.push(name.to_string()),
                Some(field) => fields.push(field),
                None => unknown.push(name.to_string()),
            }
        }

        let missing: Vec<String> = FeatureField::all()
            .into_iter()
            .filter(|f| !fields.contains(f))
            .map(|f| f.canonical_name())
            .collect();

        if columns.len() != FEATURE_COUNT
            || !unknown.is_empty()
            || !duplicates.is_empty()
            || !missing.is_empty()
        {
            return Err(SchemaError {
                expected: FEATURE_COUNT,
                got: columns.len(),
                unknown,
                duplicates,
                missing,
            });
        }

        Ok(Self {
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            fields,
        })
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn fields(&self) -> &[FeatureField] {
        &self.fields
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a declared column.
    #[must_use]
    pub fn index_of(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }
}

/// A single cell of the feature row.
#[derive(Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Number(f64),
    Category(String),
}

/// One submission, shaped for the classifier.
///
/// `Debug` is redacted: answers are sensitive and must not reach the logs.
#[derive(Clone, PartialEq)]
pub struct FeatureRow {
    columns: Vec<String>,
    values: Vec<FeatureValue>,
}

impl FeatureRow {
    /// Build a row in the schema's column order.
    #[must_use]
    pub fn build(schema: &FeatureSchema, profile: &StudentProfile, answers: &Answers) -> Self {
        let values = schema
            .fields()
            .iter()
            .map(|field| match field {
                FeatureField::Age => FeatureValue::Number(profile.age_group.numeric()),
                FeatureField::Gender => FeatureValue::Category(profile.gender.label().to_string()),
                FeatureField::University => {
                    FeatureValue::Category(profile.university.label().to_string())
                }
                FeatureField::Department => {
                    FeatureValue::Category(profile.department.trim().to_string())
                }
                FeatureField::AcademicYear => {
                    FeatureValue::Category(profile.academic_year.label().to_string())
                }
                FeatureField::Cgpa => FeatureValue::Number(profile.cgpa),
                FeatureField::Scholarship => {
                    FeatureValue::Category(profile.scholarship_label().to_string())
                }
                FeatureField::Question(n) => FeatureValue::Number(
                    answers
                        .get(n - 1)
                        .map(|r| f64::from(r.value()))
                        .unwrap_or(0.0),
                ),
            })
            .collect();

        Self {
            columns: schema.columns().to_vec(),
            values,
        }
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn values(&self) -> &[FeatureValue] {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl std::fmt::Debug for FeatureRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureRow")
            .field("columns", &self.columns.len())
            .field("values", &"<redacted>")
            .finish()
    }
}

impl std::fmt::Debug for FeatureValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(_) => write!(f, "Number(<redacted>)"),
            Self::Category(_) => write!(f, "Category(<redacted>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::questionnaire::Likert;

    fn raw_dataset_columns() -> Vec<String> {
        let mut cols = vec![
            "1. Age".to_string(),
            "2. Gender".to_string(),
            "3. University".to_string(),
            "4. Department".to_string(),
            "5. Academic Year".to_string(),
            "6. Current CGPA".to_string(),
            "7. Did you receive a waiver or scholarship at your university?".to_string(),
        ];
        cols.extend((1..=QUESTION_COUNT).map(|n| format!("q_{n}")));
        cols
    }

    #[test]
    fn test_default_schema_has_33_columns() {
        let schema = FeatureSchema::default();
        assert_eq!(schema.len(), FEATURE_COUNT);
        assert_eq!(schema.columns()[0], "Age");
        assert_eq!(schema.columns()[7], "Q1");
        assert_eq!(schema.columns()[32], "Q26");
    }

    #[test]
    fn test_resolve_accepts_aliases() {
        let schema = FeatureSchema::resolve(&raw_dataset_columns()).expect("should resolve");
        assert_eq!(schema.fields()[6], FeatureField::Scholarship);
        assert_eq!(schema.fields()[7], FeatureField::Question(1));
    }

    #[test]
    fn test_resolve_accepts_question_text() {
        let mut cols = raw_dataset_columns();
        cols[7 + 10] = QUESTIONS[10].text.to_string();
        let schema = FeatureSchema::resolve(&cols).expect("should resolve");
        assert_eq!(schema.fields()[17], FeatureField::Question(11));
    }

    #[test]
    fn test_resolve_reports_unknown_and_missing() {
        let mut cols = raw_dataset_columns();
        cols[3] = "Hometown".to_string();
        let err = FeatureSchema::resolve(&cols).expect_err("should fail");
        assert_eq!(err.unknown, vec!["Hometown".to_string()]);
        assert_eq!(err.missing, vec!["Department".to_string()]);
        assert!(err.to_string().contains("Hometown"));
    }

    #[test]
    fn test_resolve_reports_duplicates() {
        let mut cols = raw_dataset_columns();
        cols[8] = "Q1".to_string();
        let err = FeatureSchema::resolve(&cols).expect_err("should fail");
        assert_eq!(err.duplicates, vec!["Q1".to_string()]);
        assert_eq!(err.missing, vec!["Q2".to_string()]);
    }

    #[test]
    fn test_resolve_rejects_wrong_length() {
        let cols = &raw_dataset_columns()[..32];
        let err = FeatureSchema::resolve(cols).expect_err("should fail");
        assert_eq!(err.got, 32);
        assert_eq!(err.missing, vec!["Q26".to_string()]);
    }

    #[test]
    fn test_row_follows_declared_order() {
        // Shuffle: questions first, demographics last.
        let mut cols: Vec<String> = (1..=QUESTION_COUNT).map(|n| format!("Q{n}")).collect();
        cols.extend(
            ["CGPA", "Age", "Gender", "University", "Department", "Academic Year", "Scholarship"]
                .iter()
                .map(|s| s.to_string()),
        );
        let schema = FeatureSchema::resolve(&cols).expect("should resolve");

        let mut answers = Answers::default();
        answers.set(0, Likert::Often);
        let profile = StudentProfile {
            cgpa: 3.25,
            ..Default::default()
        };

        let row = FeatureRow::build(&schema, &profile, &answers);
        assert_eq!(row.len(), FEATURE_COUNT);
        assert_eq!(row.values()[0], FeatureValue::Number(2.0));
        assert_eq!(row.values()[26], FeatureValue::Number(3.25));
        assert_eq!(row.columns()[27], "Age");
        assert_eq!(row.values()[27], FeatureValue::Number(18.0));
        assert_eq!(row.columns()[32], "Scholarship");
        assert_eq!(row.values()[32], FeatureValue::Category("No".to_string()));
    }

    #[test]
    fn test_row_debug_is_redacted() {
        let row = FeatureRow::build(
            &FeatureSchema::default(),
            &StudentProfile::default(),
            &Answers::default(),
        );
        let dbg = format!("{row:?}");
        assert!(dbg.contains("redacted"));
        assert!(!dbg.contains("CSE"));
    }
}
