//! Color palette and preset styles.
//!
//! Soft indigo on slate: low-arousal colors for a screening tool, with the
//! severity scale reserved for results.

use ratatui::style::{Color, Modifier, Style};

use crate::domain::Severity;

/// Calm theme color palette.
pub struct CalmTheme;

impl CalmTheme {
    // === Primary ===

    /// Indigo
    pub const PRIMARY: Color = Color::Rgb(99, 102, 241); // #6366F1

    /// Lavender for highlights
    pub const PRIMARY_LIGHT: Color = Color::Rgb(165, 180, 252); // #A5B4FC

    pub const PRIMARY_DARK: Color = Color::Rgb(67, 56, 202); // #4338CA

    /// Slate for borders
    pub const BORDER: Color = Color::Rgb(100, 116, 139); // #64748B

    // === Semantic ===

    pub const SUCCESS: Color = Color::Rgb(16, 185, 129); // #10B981
    pub const WARNING: Color = Color::Rgb(251, 191, 36); // #FBBF24
    pub const DANGER: Color = Color::Rgb(244, 63, 94); // #F43F5E
    pub const INFO: Color = Color::Rgb(56, 189, 248); // #38BDF8

    pub const BG_DARK: Color = Color::Rgb(15, 23, 42); // #0F172A

    // === Text ===

    pub const TEXT_PRIMARY: Color = Color::Rgb(241, 245, 249); // #F1F5F9
    pub const TEXT_SECONDARY: Color = Color::Rgb(148, 163, 184); // #94A3B8
    pub const TEXT_MUTED: Color = Color::Rgb(100, 116, 139); // #64748B

    #[must_use]
    pub fn title() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn subtitle() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn text() -> Style {
        Style::default().fg(Self::TEXT_PRIMARY)
    }

    #[must_use]
    pub fn text_secondary() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    #[must_use]
    pub fn text_muted() -> Style {
        Style::default().fg(Self::TEXT_MUTED)
    }

    #[must_use]
    pub fn success() -> Style {
        Style::default().fg(Self::SUCCESS)
    }

    #[must_use]
    pub fn warning() -> Style {
        Style::default().fg(Self::WARNING)
    }

    #[must_use]
    pub fn danger() -> Style {
        Style::default().fg(Self::DANGER)
    }

    #[must_use]
    pub fn info() -> Style {
        Style::default().fg(Self::INFO)
    }

    /// Highlighted option in a selector or answer row
    #[must_use]
    pub fn selected() -> Style {
        Style::default()
            .fg(Self::BG_DARK)
            .bg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn focused() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn cursor() -> Style {
        Style::default().fg(Self::PRIMARY_LIGHT)
    }

    #[must_use]
    pub fn border() -> Style {
        Style::default().fg(Self::BORDER)
    }

    #[must_use]
    pub fn border_focused() -> Style {
        Style::default().fg(Self::PRIMARY)
    }

    /// Active tab in the questionnaire header
    #[must_use]
    pub fn tab_active() -> Style {
        Style::default()
            .fg(Self::TEXT_PRIMARY)
            .bg(Self::PRIMARY_DARK)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Self::PRIMARY_LIGHT)
            .add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn key_desc() -> Style {
        Style::default().fg(Self::TEXT_SECONDARY)
    }

    /// Severity bucket color.
    #[must_use]
    pub fn severity(severity: Severity) -> Style {
        let (r, g, b) = severity.color();
        Style::default().fg(Color::Rgb(r, g, b))
    }

    /// Confidence gauge color: stronger predictions read brighter.
    #[must_use]
    pub fn confidence(severity: Severity, confidence: f64) -> Style {
        let style = Self::severity(severity);
        if confidence >= 0.5 {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }
}

/// Home screen banner
pub const LOGO: &str = r"
╔╦╗╦╔╗╔╔╦╗╔═╗╔═╗╦═╗╔═╗╔═╗╔╗╔
║║║║║║║ ║║╚═╗║  ╠╦╝║╣ ║╣ ║║║
╩ ╩╩╝╚╝═╩╝╚═╝╚═╝╩╚═╚═╝╚═╝╝╚╝
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_colors_are_distinct() {
        let colors: Vec<Option<Color>> = [
            Severity::Low,
            Severity::Mild,
            Severity::Moderate,
            Severity::Severe,
        ]
        .into_iter()
        .map(|s| CalmTheme::severity(s).fg)
        .collect();

        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(CalmTheme::severity(Severity::Low).fg, Some(CalmTheme::SUCCESS));
    }

    #[test]
    fn test_confident_predictions_are_bold() {
        let strong = CalmTheme::confidence(Severity::Severe, 0.9);
        let weak = CalmTheme::confidence(Severity::Severe, 0.3);
        assert!(strong.add_modifier.contains(Modifier::BOLD));
        assert!(!weak.add_modifier.contains(Modifier::BOLD));
    }
}
