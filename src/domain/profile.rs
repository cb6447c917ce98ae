//! Student demographic profile.
//!
//! Seven fields that precede the questionnaire in the feature row.

use serde::{Deserialize, Serialize};

use super::extract::extract_number;

/// Maximum accepted department length (characters).
const MAX_DEPARTMENT_LEN: usize = 64;

/// Upper bound of the grading scale.
pub const CGPA_MAX: f64 = 4.0;

/// Age bracket as offered by the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AgeGroup {
    #[default]
    #[serde(rename = "18-22")]
    From18To22,
    #[serde(rename = "23-26")]
    From23To26,
    #[serde(rename = "27-30")]
    From27To30,
    #[serde(rename = "Above 30")]
    Above30,
}

impl AgeGroup {
    pub const ALL: [Self; 4] = [
        Self::From18To22,
        Self::From23To26,
        Self::From27To30,
        Self::Above30,
    ];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::From18To22 => "18-22",
            Self::From23To26 => "23-26",
            Self::From27To30 => "27-30",
            Self::Above30 => "Above 30",
        }
    }

    /// Numeric value fed to the model (lower bound of the bracket).
    #[must_use]
    pub fn numeric(&self) -> f64 {
        extract_number(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Self; 2] = [Self::Male, Self::Female];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Male => "Male",
            Self::Female => "Female",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum UniversityType {
    #[default]
    Public,
    Private,
}

impl UniversityType {
    pub const ALL: [Self; 2] = [Self::Public, Self::Private];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Public => "Public",
            Self::Private => "Private",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AcademicYear {
    #[default]
    #[serde(rename = "First Year")]
    First,
    #[serde(rename = "Second Year")]
    Second,
    #[serde(rename = "Third Year")]
    Third,
    #[serde(rename = "Fourth Year")]
    Fourth,
    Master,
}

impl AcademicYear {
    pub const ALL: [Self; 5] = [
        Self::First,
        Self::Second,
        Self::Third,
        Self::Fourth,
        Self::Master,
    ];

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::First => "First Year",
            Self::Second => "Second Year",
            Self::Third => "Third Year",
            Self::Fourth => "Fourth Year",
            Self::Master => "Master",
        }
    }
}

/// Demographic part of a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub age_group: AgeGroup,
    pub gender: Gender,
    pub university: UniversityType,
    pub department: String,
    pub academic_year: AcademicYear,
    pub cgpa: f64,
    pub scholarship: bool,
}

impl Default for StudentProfile {
    fn default() -> Self {
        Self {
            age_group: AgeGroup::default(),
            gender: Gender::default(),
            university: UniversityType::default(),
            department: "CSE".to_string(),
            academic_year: AcademicYear::default(),
            cgpa: 3.5,
            scholarship: false,
        }
    }
}

impl StudentProfile {
    /// Parse a CGPA typed as free text ("3.50", "CGPA 3.2").
    ///
    /// Returns `None` when the text holds no digit at all (".", "N/A").
    #[must_use]
    pub fn parse_cgpa(text: &str) -> Option<f64> {
        text.chars()
            .any(|c| c.is_ascii_digit())
            .then(|| extract_number(text))
    }

    #[must_use]
    pub fn scholarship_label(&self) -> &'static str {
        if self.scholarship {
            "Yes"
        } else {
            "No"
        }
    }

    /// Validate every field, collecting all violations.
    ///
    /// # Errors
    /// Returns the list of human-readable problems.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let dept = self.department.trim();
        if dept.is_empty() {
            errors.push("Department must not be empty".to_string());
        } else if dept.chars().count() > MAX_DEPARTMENT_LEN {
            errors.push(format!(
                "Department must be at most {MAX_DEPARTMENT_LEN} characters"
            ));
        }

        if !self.cgpa.is_finite() || !(0.0..=CGPA_MAX).contains(&self.cgpa) {
            errors.push(format!(
                "CGPA {} out of range [0.00, {CGPA_MAX:.2}]",
                self.cgpa
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
