//! Static recommendation text.

use super::severity::Condition;

/// A support line shown alongside results.
#[derive(Debug, Clone, Copy)]
pub struct Helpline {
    pub name: &'static str,
    pub number: &'static str,
}

pub const HELPLINES: [Helpline; 3] = [
    Helpline { name: "Kaan Pete Roi", number: "01779554391" },
    Helpline { name: "Moner Bondhu", number: "01779632588" },
    Helpline { name: "National Emergency", number: "999" },
];

const ANXIETY_TIPS: [&str; 3] = [
    "Deep Breathing: try the 4-7-8 technique (inhale 4s, hold 7s, exhale 8s).",
    "Grounding: name 5 things you see, 4 you feel, 3 you hear.",
    "Limit Caffeine: reduce coffee and tea intake.",
];

const STRESS_TIPS: [&str; 3] = [
    "Prioritize: make a to-do list and break tasks into small steps.",
    "Move: a 10-minute walk can lower cortisol levels.",
    "Sleep: aim for 7-8 hours of quality sleep.",
];

const DEPRESSION_TIPS: [&str; 3] = [
    "Connect: talk to a friend or family member today.",
    "Sunlight: spend 15 minutes outside in morning light.",
    "Routine: stick to a small, manageable daily routine.",
];

const HEALTHY_TIPS: [&str; 3] = [
    "Keep going! Your mental resilience is strong.",
    "Stay Hydrated: drink enough water.",
    "Journal: write down 3 good things that happened today.",
];

/// Tips for the primary concern, or general well-being tips when there is none.
#[must_use]
pub fn condition_tips(concern: Option<Condition>) -> &'static [&'static str] {
    match concern {
        Some(Condition::Anxiety) => &ANXIETY_TIPS,
        Some(Condition::Stress) => &STRESS_TIPS,
        Some(Condition::Depression) => &DEPRESSION_TIPS,
        None => &HEALTHY_TIPS,
    }
}
