//! UI module: View components for the TUI.

pub mod analysis;
pub mod home;
pub mod profile;
pub mod questionnaire;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::domain::DISCLAIMER;
use crate::tui::styles::CalmTheme;

pub fn render_disclaimer(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(Span::styled(DISCLAIMER, CalmTheme::text_muted())),
        Line::from(Span::styled(
            "If you are in crisis, contact a helpline or emergency services now.",
            CalmTheme::text_muted(),
        )),
    ];

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(CalmTheme::border());

    let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });

    f.render_widget(p, area);
}
