//! Conditions screened for and the severity buckets labels fall into.

use serde::{Deserialize, Serialize};

/// Condition predicted by one head of the hybrid model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    Anxiety,
    Stress,
    Depression,
}

impl Condition {
    /// Order of the model's output heads.
    pub const ALL: [Self; 3] = [Self::Anxiety, Self::Stress, Self::Depression];

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Anxiety => "Anxiety",
            Self::Stress => "Stress",
            Self::Depression => "Depression",
        }
    }

    /// Key of this condition's label decoder in exported artifacts.
    #[must_use]
    pub fn decoder_key(&self) -> String {
        format!("{} Label", self.name())
    }

    #[must_use]
    pub fn from_name(s: &str) -> Option<Self> {
        let s = s.trim();
        let s = s.strip_suffix(" Label").unwrap_or(s);
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Severity bucket of a decoded label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Healthy / minimal symptoms
    Low,
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    /// Anything above `Low` is flagged.
    #[must_use]
    pub fn is_at_risk(&self) -> bool {
        *self > Self::Low
    }

    /// Canned advice for the bucket.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Low => "No significant indicators. Keep up your current routines.",
            Self::Mild => "Mild symptoms. Self-care and monitoring over the next weeks is recommended.",
            Self::Moderate => "Moderate symptoms. Talking to a counselor or your university wellness center is advised.",
            Self::Severe => "Severe symptoms. Please reach out to a mental health professional or a helpline as soon as possible.",
        }
    }

    /// Get the associated color for TUI display (RGB).
    #[must_use]
    pub fn color(&self) -> (u8, u8, u8) {
        match self {
            Self::Low => (16, 185, 129),      // Emerald
            Self::Mild => (56, 189, 248),     // Sky
            Self::Moderate => (251, 191, 36), // Amber
            Self::Severe => (244, 63, 94),    // Rose
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Mild => write!(f, "MILD"),
            Self::Moderate => write!(f, "MODERATE"),
            Self::Severe => write!(f, "SEVERE"),
        }
    }
}

/// How "Minimal ..." labels are bucketed.
///
/// Versions of the exported label sets disagree on whether "Minimal
/// Depression" is healthy, so this is a deployment setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MinimalPolicy {
    #[default]
    Healthy,
    AtRisk,
}

impl MinimalPolicy {
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "healthy" | "low" => Some(Self::Healthy),
            "at-risk" | "at_risk" | "atrisk" | "mild" => Some(Self::AtRisk),
            _ => None,
        }
    }
}

/// Bucket a decoded label by substring matching.
///
/// Total: labels matching no known keyword land in `Moderate` so that they
/// are never silently reported as healthy.
#[must_use]
pub fn classify_label(label: &str, policy: MinimalPolicy) -> Severity {
    let l = label.to_lowercase();
    let has = |k: &str| l.contains(k);

    if has("severe") || has("high") || has("extreme") {
        Severity::Severe
    } else if has("moderate") {
        Severity::Moderate
    } else if has("mild") {
        Severity::Mild
    } else if has("minimal") {
        match policy {
            MinimalPolicy::Healthy => Severity::Low,
            MinimalPolicy::AtRisk => Severity::Mild,
        }
    } else if has("low")
        || has("none")
        || has("no ")
        || has("normal")
        || has("healthy")
    {
        Severity::Low
    } else {
        tracing::warn!("Unrecognized severity label {:?}, treating as moderate", label);
        Severity::Moderate
    }
}

/// Label shown to the student.
#[must_use]
pub fn display_label(condition: Condition, label: &str, severity: Severity) -> String {
    if severity == Severity::Low {
        format!("No {} / Healthy", condition.name())
    } else {
        label.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_and_severe_labels() {
        for label in ["Severe Anxiety", "High Perceived Stress", "Moderately Severe Depression", "Extremely Severe Stress"] {
            assert_eq!(classify_label(label, MinimalPolicy::Healthy), Severity::Severe, "{label}");
        }
    }

    #[test]
    fn test_moderate_labels() {
        assert_eq!(classify_label("Moderate Stress", MinimalPolicy::Healthy), Severity::Moderate);
        assert_eq!(classify_label("Moderate Depression", MinimalPolicy::AtRisk), Severity::Moderate);
    }

    #[test]
    fn test_low_labels() {
        for label in ["Low Stress", "No Depression", "None", "Normal"] {
            assert_eq!(classify_label(label, MinimalPolicy::Healthy), Severity::Low, "{label}");
        }
    }

    #[test]
    fn test_no_keyword_matches_anywhere() {
        assert_eq!(classify_label("Level: No Anxiety", MinimalPolicy::Healthy), Severity::Low);
        assert_eq!(classify_label("Student shows no stress", MinimalPolicy::Healthy), Severity::Low);
    }

    #[test]
    fn test_minimal_follows_policy() {
        assert_eq!(classify_label("Minimal Depression", MinimalPolicy::Healthy), Severity::Low);
        assert_eq!(classify_label("Minimal Depression", MinimalPolicy::AtRisk), Severity::Mild);
        assert_eq!(classify_label("Minimal Anxiety", MinimalPolicy::Healthy), Severity::Low);
    }

    #[test]
    fn test_unknown_label_is_bucketed() {
        assert_eq!(classify_label("Borderline", MinimalPolicy::Healthy), Severity::Moderate);
        assert_eq!(classify_label("", MinimalPolicy::Healthy), Severity::Moderate);
    }

    #[test]
    fn test_display_label() {
        assert_eq!(
            display_label(Condition::Anxiety, "Minimal Anxiety", Severity::Low),
            "No Anxiety / Healthy"
        );
        assert_eq!(
            display_label(Condition::Stress, "Moderate Stress", Severity::Moderate),
            "Moderate Stress"
        );
    }

    #[test]
    fn test_condition_names() {
        assert_eq!(Condition::from_name("Depression Label"), Some(Condition::Depression));
        assert_eq!(Condition::from_name("anxiety"), Some(Condition::Anxiety));
        assert_eq!(Condition::Stress.decoder_key(), "Stress Label");
        assert_eq!(Condition::from_name("Insomnia"), None);
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!(MinimalPolicy::parse("at-risk"), Some(MinimalPolicy::AtRisk));
        assert_eq!(MinimalPolicy::parse("Healthy"), Some(MinimalPolicy::Healthy));
        assert_eq!(MinimalPolicy::parse("maybe"), None);
    }

    #[test]
    fn test_risk_ordering() {
        assert!(Severity::Severe > Severity::Moderate);
        assert!(!Severity::Low.is_at_risk());
        assert!(Severity::Mild.is_at_risk());
    }
}
