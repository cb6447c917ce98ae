//! The 26-item self-assessment questionnaire.
//!
//! Items 1-10 come from the Perceived Stress Scale, 11-17 from GAD-7 and
//! 18-26 from PHQ-9. Every item is answered on a 0-3 scale.

use serde::{Deserialize, Serialize};

/// Number of questionnaire items.
pub const QUESTION_COUNT: usize = 26;

/// Instrument a question belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Subscale {
    /// Perceived Stress Scale
    Stress,
    /// Generalized Anxiety Disorder scale
    Anxiety,
    /// Patient Health Questionnaire
    Depression,
}

impl Subscale {
    pub const ALL: [Self; 3] = [Self::Stress, Self::Anxiety, Self::Depression];

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Stress => "Stress (PSS)",
            Self::Anxiety => "Anxiety (GAD)",
            Self::Depression => "Depression (PHQ)",
        }
    }

    /// Number of items on this instrument.
    #[must_use]
    pub fn item_count(&self) -> usize {
        QUESTIONS.iter().filter(|q| q.subscale == *self).count()
    }

    /// Highest possible total.
    #[must_use]
    pub fn max_total(&self) -> u32 {
        u32::try_from(self.item_count()).unwrap_or(u32::MAX) * u32::from(Likert::VeryOften.value())
    }
}

/// A single questionnaire item.
#[derive(Debug, Clone, Copy)]
pub struct Question {
    /// 1-based item number
    pub number: usize,
    pub text: &'static str,
    pub subscale: Subscale,
}

pub const QUESTIONS: [Question; QUESTION_COUNT] = [
    Question { number: 1, text: "Felt upset due to something in your academic affairs?", subscale: Subscale::Stress },
    Question { number: 2, text: "Felt unable to control important things in your academic affairs?", subscale: Subscale::Stress },
    Question { number: 3, text: "Felt nervous and stressed because of academic pressure?", subscale: Subscale::Stress },
    Question { number: 4, text: "Felt you could not cope with all mandatory academic activities?", subscale: Subscale::Stress },
    Question { number: 5, text: "Felt confident about handling your academic problems?", subscale: Subscale::Stress },
    Question { number: 6, text: "Felt things in your academic life were going your way?", subscale: Subscale::Stress },
    Question { number: 7, text: "Been able to control irritations in your academic affairs?", subscale: Subscale::Stress },
    Question { number: 8, text: "Felt your academic performance was on top?", subscale: Subscale::Stress },
    Question { number: 9, text: "Got angered due to bad academic performance?", subscale: Subscale::Stress },
    Question { number: 10, text: "Felt academic difficulties were piling up too high?", subscale: Subscale::Stress },
    Question { number: 11, text: "Felt nervous, anxious or on edge?", subscale: Subscale::Anxiety },
    Question { number: 12, text: "Been unable to stop or control worrying?", subscale: Subscale::Anxiety },
    Question { number: 13, text: "Had trouble relaxing?", subscale: Subscale::Anxiety },
    Question { number: 14, text: "Been so restless that it is hard to sit still?", subscale: Subscale::Anxiety },
    Question { number: 15, text: "Become easily annoyed or irritable?", subscale: Subscale::Anxiety },
    Question { number: 16, text: "Felt afraid as if something awful might happen?", subscale: Subscale::Anxiety },
    Question { number: 17, text: "Worried too much about different things?", subscale: Subscale::Anxiety },
    Question { number: 18, text: "Had little interest or pleasure in doing things?", subscale: Subscale::Depression },
    Question { number: 19, text: "Felt down, depressed or hopeless?", subscale: Subscale::Depression },
    Question { number: 20, text: "Had trouble falling or staying asleep, or slept too much?", subscale: Subscale::Depression },
    Question { number: 21, text: "Felt tired or had little energy?", subscale: Subscale::Depression },
    Question { number: 22, text: "Had poor appetite or overeaten?", subscale: Subscale::Depression },
    Question { number: 23, text: "Felt bad about yourself, or that you are a failure?", subscale: Subscale::Depression },
    Question { number: 24, text: "Had trouble concentrating on things?", subscale: Subscale::Depression },
    Question { number: 25, text: "Moved or spoken noticeably slowly, or been unusually restless?", subscale: Subscale::Depression },
    Question { number: 26, text: "Had thoughts that you would be better off dead or of hurting yourself?", subscale: Subscale::Depression },
];

/// Sections the questionnaire is presented in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionnairePart {
    AcademicLife,
    AnxietyStress,
    MoodPhysical,
}

impl QuestionnairePart {
    pub const ALL: [Self; 3] = [Self::AcademicLife, Self::AnxietyStress, Self::MoodPhysical];

    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::AcademicLife => "Part 1: Academic & Life",
            Self::AnxietyStress => "Part 2: Anxiety & Stress",
            Self::MoodPhysical => "Part 3: Mood & Physical",
        }
    }

    /// 0-based index range of the questions in this part.
    #[must_use]
    pub fn range(&self) -> std::ops::Range<usize> {
        match self {
            Self::AcademicLife => 0..10,
            Self::AnxietyStress => 10..17,
            Self::MoodPhysical => 17..QUESTION_COUNT,
        }
    }

    #[must_use]
    pub fn next(&self) -> Self {
        match self {
            Self::AcademicLife => Self::AnxietyStress,
            Self::AnxietyStress => Self::MoodPhysical,
            Self::MoodPhysical => Self::AcademicLife,
        }
    }

    /// Part containing the 0-based question index.
    #[must_use]
    pub fn of(index: usize) -> Self {
        Self::ALL
            .into_iter()
            .find(|p| p.range().contains(&index))
            .unwrap_or(Self::MoodPhysical)
    }
}

/// Four-point response scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Likert {
    #[default]
    NotAtAll = 0,
    Sometimes = 1,
    Often = 2,
    VeryOften = 3,
}

impl Likert {
    pub const ALL: [Self; 4] = [Self::NotAtAll, Self::Sometimes, Self::Often, Self::VeryOften];

    #[must_use]
    pub fn value(&self) -> u8 {
        *self as u8
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotAtAll => "Not at all",
            Self::Sometimes => "Sometimes",
            Self::Often => "Often",
            Self::VeryOften => "Very Often",
        }
    }

    #[must_use]
    pub fn from_value(v: u8) -> Option<Self> {
        Self::ALL.get(usize::from(v)).copied()
    }

    /// Parse a short label, a long-form label, or a digit.
    #[must_use]
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim() {
            "Not at all" | "Not at all / Never" | "0" => Some(Self::NotAtAll),
            "Sometimes" | "Several days / Sometimes" | "1" => Some(Self::Sometimes),
            "Often" | "More than half the days / Often" | "2" => Some(Self::Often),
            "Very Often" | "Nearly every day / Very Often" | "3" => Some(Self::VeryOften),
            _ => None,
        }
    }

    #[must_use]
    pub fn increment(&self) -> Self {
        Self::from_value(self.value().saturating_add(1)).unwrap_or(Self::VeryOften)
    }

    #[must_use]
    pub fn decrement(&self) -> Self {
        Self::from_value(self.value().saturating_sub(1)).unwrap_or(Self::NotAtAll)
    }
}

impl Serialize for Likert {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.value())
    }
}

/// Accepts either the numeric value (`2`) or any label [`Likert::from_label`]
/// knows (`"Often"`, `"More than half the days / Often"`).
impl<'de> Deserialize<'de> for Likert {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LikertVisitor;

        impl serde::de::Visitor<'_> for LikertVisitor {
            type Value = Likert;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str("a response 0-3 or its label")
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Likert, E> {
                u8::try_from(v)
                    .ok()
                    .and_then(Likert::from_value)
                    .ok_or_else(|| E::custom(format!("response {v} out of range 0-3")))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Likert, E> {
                u64::try_from(v)
                    .map_err(|_| E::custom(format!("response {v} out of range 0-3")))
                    .and_then(|v| self.visit_u64(v))
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Likert, E> {
                Likert::from_label(v).ok_or_else(|| E::custom(format!("unknown response {v:?}")))
            }
        }

        deserializer.deserialize_any(LikertVisitor)
    }
}

/// Responses to all questions, in item order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Answers([Likert; QUESTION_COUNT]);

impl Answers {
    #[must_use]
    pub fn new(responses: [Likert; QUESTION_COUNT]) -> Self {
        Self(responses)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<Likert> {
        self.0.get(index).copied()
    }

    pub fn set(&mut self, index: usize, response: Likert) {
        if let Some(slot) = self.0.get_mut(index) {
            *slot = response;
        }
    }

    /// Sum of raw responses for one instrument.
    #[must_use]
    pub fn subscale_total(&self, subscale: Subscale) -> u32 {
        QUESTIONS
            .iter()
            .zip(self.0.iter())
            .filter(|(q, _)| q.subscale == subscale)
            .map(|(_, r)| u32::from(r.value()))
            .sum()
    }

    pub fn reset(&mut self) {
        self.0 = [Likert::NotAtAll; QUESTION_COUNT];
    }
}

impl Serialize for Answers {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.as_slice().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Answers {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Vec::<Likert>::deserialize(deserializer)?;
        let responses: [Likert; QUESTION_COUNT] = raw.try_into().map_err(|raw: Vec<Likert>| {
            serde::de::Error::custom(format!(
                "Expected {QUESTION_COUNT} answers, got {}",
                raw.len()
            ))
        })?;
        Ok(Self(responses))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_numbering_and_subscales() {
        for (i, q) in QUESTIONS.iter().enumerate() {
            assert_eq!(q.number, i + 1);
        }
        assert_eq!(QUESTIONS.iter().filter(|q| q.subscale == Subscale::Stress).count(), 10);
        assert_eq!(QUESTIONS.iter().filter(|q| q.subscale == Subscale::Anxiety).count(), 7);
        assert_eq!(QUESTIONS.iter().filter(|q| q.subscale == Subscale::Depression).count(), 9);
    }

    #[test]
    fn test_parts_cover_all_questions_once() {
        let total: usize = QuestionnairePart::ALL.iter().map(|p| p.range().len()).sum();
        assert_eq!(total, QUESTION_COUNT);
        assert_eq!(QuestionnairePart::of(0), QuestionnairePart::AcademicLife);
        assert_eq!(QuestionnairePart::of(10), QuestionnairePart::AnxietyStress);
        assert_eq!(QuestionnairePart::of(25), QuestionnairePart::MoodPhysical);
    }

    #[test]
    fn test_likert_labels() {
        assert_eq!(Likert::from_label("Several days / Sometimes"), Some(Likert::Sometimes));
        assert_eq!(Likert::from_label("Very Often"), Some(Likert::VeryOften));
        assert_eq!(Likert::from_label("2"), Some(Likert::Often));
        assert_eq!(Likert::from_label("Always"), None);
    }

    #[test]
    fn test_likert_saturates() {
        assert_eq!(Likert::VeryOften.increment(), Likert::VeryOften);
        assert_eq!(Likert::NotAtAll.decrement(), Likert::NotAtAll);
        assert_eq!(Likert::Sometimes.increment(), Likert::Often);
    }

    #[test]
    fn test_answers_reject_bad_input() {
        let short = serde_json::to_string(&[0u8; 25]).expect("serialize");
        assert!(serde_json::from_str::<Answers>(&short).is_err());

        let mut values = [0i64; QUESTION_COUNT];
        values[3] = 4;
        let err = serde_json::from_str::<Answers>(&serde_json::to_string(&values).expect("serialize"))
            .expect_err("out of range");
        assert!(err.to_string().contains("out of range"));

        values[3] = -1;
        assert!(serde_json::from_str::<Answers>(&serde_json::to_string(&values).expect("serialize")).is_err());
    }

    #[test]
    fn test_answers_accept_labels() {
        let mut raw: Vec<serde_json::Value> = vec![serde_json::json!(0); QUESTION_COUNT];
        raw[0] = serde_json::json!("Nearly every day / Very Often");
        raw[1] = serde_json::json!("Often");
        raw[2] = serde_json::json!("1");
        let answers: Answers = serde_json::from_value(serde_json::Value::Array(raw)).expect("deserialize");

        assert_eq!(answers.get(0), Some(Likert::VeryOften));
        assert_eq!(answers.get(1), Some(Likert::Often));
        assert_eq!(answers.get(2), Some(Likert::Sometimes));
        assert_eq!(answers.subscale_total(Subscale::Stress), 6);

        raw = vec![serde_json::json!("Always"); QUESTION_COUNT];
        assert!(serde_json::from_value::<Answers>(serde_json::Value::Array(raw)).is_err());
    }

    #[test]
    fn test_subscale_maxima() {
        assert_eq!(Subscale::Stress.max_total(), 30);
        assert_eq!(Subscale::Anxiety.max_total(), 21);
        assert_eq!(Subscale::Depression.max_total(), 27);
    }

    #[test]
    fn test_subscale_totals() {
        let mut answers = Answers::default();
        answers.set(0, Likert::VeryOften);
        answers.set(11, Likert::Often);
        answers.set(25, Likert::Sometimes);
        assert_eq!(answers.subscale_total(Subscale::Stress), 3);
        assert_eq!(answers.subscale_total(Subscale::Anxiety), 2);
        assert_eq!(answers.subscale_total(Subscale::Depression), 1);
    }

    #[test]
    fn test_answers_serde() {
        let answers: Answers = serde_json::from_str(&format!("{:?}", [1u8; QUESTION_COUNT]))
            .expect("deserialize");
        assert_eq!(answers.get(5), Some(Likert::Sometimes));
        assert!(serde_json::from_str::<Answers>("[1, 2]").is_err());
    }
}
