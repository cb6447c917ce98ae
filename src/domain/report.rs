//! Plain-text assessment report.

use chrono::{DateTime, Utc};

use super::advice::{condition_tips, HELPLINES};
use super::assessment::Assessment;
use super::profile::StudentProfile;

const RULE: &str = "---------------------------------------";

pub const DISCLAIMER: &str =
    "DISCLAIMER: This is an AI-generated screening result, not a medical diagnosis.";

/// Report renderer.
pub struct Report;

impl Report {
    /// Render the downloadable report.
    #[must_use]
    pub fn render(assessment: &Assessment, profile: &StudentProfile) -> String {
        let mut out = String::new();

        out.push_str("--- MENTAL HEALTH ASSESSMENT REPORT ---\n");
        out.push_str(&format!(
            "Date: {}\n",
            assessment.created_at.format("%Y-%m-%d %H:%M:%S")
        ));
        out.push_str(&format!("Reference: {} (anonymous)\n", assessment.id));
        out.push_str(&format!(
            "Profile: {}, {}, {}, Year: {}\n",
            profile.age_group.label(),
            profile.gender.label(),
            profile.department.trim(),
            profile.academic_year.label()
        ));
        out.push_str(RULE);
        out.push_str("\n\n");

        for r in &assessment.results {
            out.push_str(&format!(
                "{}: {} (Confidence: {:.1}%)\n",
                r.condition,
                r.display_label,
                r.confidence * 100.0
            ));
        }

        if !assessment.scale_scores.is_empty() {
            out.push_str("\n[Questionnaire Totals]:\n");
            for score in &assessment.scale_scores {
                out.push_str(&format!(
                    "- {}: {}/{}\n",
                    score.subscale.name(),
                    score.total,
                    score.max
                ));
            }
        }

        match assessment.primary_concern {
            None => {
                out.push_str("\n[Recommendation]: Maintain current healthy lifestyle.\n");
            }
            Some(concern) => {
                out.push_str(&format!("\n[Primary Concern]: {concern}\n"));
                if let Some(r) = assessment.result(concern) {
                    out.push_str(&format!("[Severity]: {}\n", r.severity.advice()));
                }
                out.push_str("[Suggested Actions]:\n");
                for tip in condition_tips(Some(concern)) {
                    out.push_str(&format!("- {tip}\n"));
                }
            }
        }

        out.push_str("\n[Helplines]:\n");
        for h in &HELPLINES {
            out.push_str(&format!("- {}: {}\n", h.name, h.number));
        }

        out.push('\n');
        out.push_str(RULE);
        out.push('\n');
        out.push_str(DISCLAIMER);
        out.push('\n');
        out
    }

    /// File name for a report created at `date`.
    #[must_use]
    pub fn file_name(date: DateTime<Utc>) -> String {
        format!("Mental_Health_Report_{}.txt", date.format("%Y%m%d"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::assessment::{ClassDistribution, ConditionResult};
    use crate::domain::severity::{Condition, MinimalPolicy};
    use chrono::TimeZone;

    fn assessment(labels: [&str; 3]) -> Assessment {
        let results = Condition::ALL
            .iter()
            .zip(labels)
            .map(|(c, l)| {
                ConditionResult::new(
                    *c,
                    l,
                    &ClassDistribution::new(vec![0.25, 0.75]),
                    MinimalPolicy::Healthy,
                )
            })
            .collect();
        Assessment::new(results)
    }

    #[test]
    fn test_render_with_concern() {
        let a = assessment(["Moderate Anxiety", "Low Stress", "No Depression"]);
        let text = Report::render(&a, &StudentProfile::default());

        assert!(text.contains("Anxiety: Moderate Anxiety (Confidence: 75.0%)"));
        assert!(text.contains("Stress: No Stress / Healthy"));
        assert!(text.contains("[Primary Concern]: Anxiety"));
        assert!(text.contains("Deep Breathing"));
        assert!(text.contains("Profile: 18-22, Male, CSE, Year: First Year"));
        assert!(text.ends_with(&format!("{DISCLAIMER}\n")));
    }

    #[test]
    fn test_render_all_healthy() {
        let a = assessment(["Minimal Anxiety", "Low Stress", "No Depression"]);
        let text = Report::render(&a, &StudentProfile::default());
        assert!(text.contains("Maintain current healthy lifestyle"));
        assert!(!text.contains("[Primary Concern]"));
        assert!(text.contains("Kaan Pete Roi"));
    }

    #[test]
    fn test_render_scale_totals() {
        let mut answers = crate::domain::Answers::default();
        answers.set(10, crate::domain::Likert::Often);
        let a = assessment(["Mild Anxiety", "Low Stress", "No Depression"]).with_scale_scores(&answers);
        let text = Report::render(&a, &StudentProfile::default());

        assert!(text.contains("[Questionnaire Totals]:"));
        assert!(text.contains("- Stress (PSS): 0/30"));
        assert!(text.contains("- Anxiety (GAD): 2/21"));
        assert!(text.contains("- Depression (PHQ): 0/27"));

        let bare = Report::render(&assessment(["Mild Anxiety", "Low Stress", "No Depression"]), &StudentProfile::default());
        assert!(!bare.contains("[Questionnaire Totals]"));
    }

    #[test]
    fn test_file_name() {
        let date = Utc.with_ymd_and_hms(2026, 3, 9, 12, 0, 0).single().expect("valid date");
        assert_eq!(Report::file_name(date), "Mental_Health_Report_20260309.txt");
    }
}
