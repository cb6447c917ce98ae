//! Assessment result types.
//!
//! Represents the interpreted output of the hybrid model for one submission.

use serde::{Deserialize, Serialize};

use super::questionnaire::{Answers, Subscale};
use super::severity::{classify_label, display_label, Condition, MinimalPolicy, Severity};

/// Probability distribution over one condition's severity classes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDistribution(Vec<f64>);

impl ClassDistribution {
    #[must_use]
    pub fn new(probabilities: Vec<f64>) -> Self {
        Self(probabilities)
    }

    #[must_use]
    pub fn probabilities(&self) -> &[f64] {
        &self.0
    }

    /// Index of the most probable class (first one on ties).
    #[must_use]
    pub fn argmax(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &p) in self.0.iter().enumerate() {
            match best {
                Some((_, bp)) if p <= bp => {}
                _ => best = Some((i, p)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// Probability of the most probable class.
    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.argmax().map(|i| self.0[i]).unwrap_or(0.0)
    }
}

/// Interpreted prediction for one condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionResult {
    pub condition: Condition,

    /// Label as decoded from the model
    pub label: String,

    /// Label shown to the student
    pub display_label: String,

    pub severity: Severity,

    /// Probability of the predicted class (0.0 to 1.0)
    pub confidence: f64,

    pub probabilities: Vec<f64>,
}

impl ConditionResult {
    /// Interpret a decoded label.
    #[must_use]
    pub fn new(
        condition: Condition,
        label: impl Into<String>,
        distribution: &ClassDistribution,
        policy: MinimalPolicy,
    ) -> Self {
        let label = label.into();
        let severity = classify_label(&label, policy);
        Self {
            condition,
            display_label: display_label(condition, &label, severity),
            label,
            severity,
            confidence: distribution.confidence(),
            probabilities: distribution.probabilities().to_vec(),
        }
    }

    #[must_use]
    pub fn is_healthy(&self) -> bool {
        !self.severity.is_at_risk()
    }

    /// Score used to rank concerns: confidence for at-risk results, zero when healthy.
    #[must_use]
    pub fn risk_score(&self) -> f64 {
        if self.is_healthy() {
            0.0
        } else {
            self.confidence
        }
    }
}

/// Complete assessment record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    /// Anonymous reference
    pub id: String,

    /// One entry per condition, in [`Condition::ALL`] order
    pub results: Vec<ConditionResult>,

    /// At-risk condition with the highest confidence
    pub primary_concern: Option<Condition>,

    /// Raw questionnaire totals per instrument, shown next to the model output
    #[serde(default)]
    pub scale_scores: Vec<ScaleScore>,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Sum of one instrument's answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleScore {
    pub subscale: Subscale,
    pub total: u32,
    pub max: u32,
}

impl ScaleScore {
    /// Totals for every instrument, in [`Subscale::ALL`] order.
    #[must_use]
    pub fn all(answers: &Answers) -> Vec<Self> {
        Subscale::ALL
            .into_iter()
            .map(|subscale| Self {
                subscale,
                total: answers.subscale_total(subscale),
                max: subscale.max_total(),
            })
            .collect()
    }
}

impl Assessment {
    #[must_use]
    pub fn new(results: Vec<ConditionResult>) -> Self {
        let primary_concern = primary_concern(&results);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            results,
            primary_concern,
            scale_scores: Vec::new(),
            created_at: chrono::Utc::now(),
        }
    }

    /// Attach the questionnaire totals for `answers`.
    #[must_use]
    pub fn with_scale_scores(mut self, answers: &Answers) -> Self {
        self.scale_scores = ScaleScore::all(answers);
        self
    }

    #[must_use]
    pub fn result(&self, condition: Condition) -> Option<&ConditionResult> {
        self.results.iter().find(|r| r.condition == condition)
    }

    #[must_use]
    pub fn healthy_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_healthy()).count()
    }

    #[must_use]
    pub fn all_healthy(&self) -> bool {
        self.healthy_count() == self.results.len()
    }
}

fn primary_concern(results: &[ConditionResult]) -> Option<Condition> {
    let mut best: Option<&ConditionResult> = None;
    for r in results.iter().filter(|r| !r.is_healthy()) {
        match best {
            Some(b) if r.risk_score() <= b.risk_score() => {}
            _ => best = Some(r),
        }
    }
    best.map(|r| r.condition)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(condition: Condition, label: &str, probs: Vec<f64>) -> ConditionResult {
        ConditionResult::new(
            condition,
            label,
            &ClassDistribution::new(probs),
            MinimalPolicy::Healthy,
        )
    }

    #[test]
    fn test_argmax_first_on_ties() {
        let d = ClassDistribution::new(vec![0.4, 0.4, 0.2]);
        assert_eq!(d.argmax(), Some(0));
        assert!((d.confidence() - 0.4).abs() < f64::EPSILON);
        assert_eq!(ClassDistribution::new(vec![]).argmax(), None);
    }

    #[test]
    fn test_condition_result_interpretation() {
        let r = result(Condition::Anxiety, "Minimal Anxiety", vec![0.8, 0.2]);
        assert!(r.is_healthy());
        assert_eq!(r.display_label, "No Anxiety / Healthy");
        assert_eq!(r.risk_score(), 0.0);
    }

    #[test]
    fn test_primary_concern_picks_most_confident_at_risk() {
        let assessment = Assessment::new(vec![
            result(Condition::Anxiety, "Moderate Anxiety", vec![0.3, 0.6, 0.1]),
            result(Condition::Stress, "Low Stress", vec![0.9, 0.1]),
            result(Condition::Depression, "Severe Depression", vec![0.2, 0.8]),
        ]);
        assert_eq!(assessment.primary_concern, Some(Condition::Depression));
        assert_eq!(assessment.healthy_count(), 1);
        assert!(!assessment.all_healthy());
    }

    #[test]
    fn test_primary_concern_tie_keeps_first() {
        let assessment = Assessment::new(vec![
            result(Condition::Anxiety, "Mild Anxiety", vec![0.5, 0.5]),
            result(Condition::Stress, "Moderate Stress", vec![0.5, 0.5]),
            result(Condition::Depression, "No Depression", vec![1.0]),
        ]);
        assert_eq!(assessment.primary_concern, Some(Condition::Anxiety));
    }

    #[test]
    fn test_all_healthy_has_no_concern() {
        let assessment = Assessment::new(vec![
            result(Condition::Anxiety, "Minimal Anxiety", vec![0.9, 0.1]),
            result(Condition::Stress, "Low Stress", vec![0.9, 0.1]),
            result(Condition::Depression, "No Depression", vec![0.9, 0.1]),
        ]);
        assert!(assessment.primary_concern.is_none());
        assert!(assessment.all_healthy());
        assert!(assessment.result(Condition::Stress).is_some());
    }

    #[test]
    fn test_assessment_ids_are_v4() {
        let a = Assessment::new(Vec::new());
        let b = Assessment::new(Vec::new());
        assert_ne!(a.id, b.id);
        let parsed = uuid::Uuid::parse_str(&a.id).expect("valid uuid");
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[test]
    fn test_scale_scores() {
        let mut answers = Answers::default();
        answers.set(0, crate::domain::Likert::VeryOften);
        answers.set(17, crate::domain::Likert::Often);
        let assessment = Assessment::new(Vec::new()).with_scale_scores(&answers);

        assert_eq!(
            assessment.scale_scores,
            vec![
                ScaleScore { subscale: Subscale::Stress, total: 3, max: 30 },
                ScaleScore { subscale: Subscale::Anxiety, total: 0, max: 21 },
                ScaleScore { subscale: Subscale::Depression, total: 2, max: 27 },
            ]
        );
    }
}
