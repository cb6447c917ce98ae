//! Home view: model status and the way in.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::domain::{advice, MinimalPolicy};
use crate::tui::styles::{CalmTheme, LOGO};

/// Model facts shown on the home screen, captured once at startup.
#[derive(Debug, Clone)]
pub struct HomeState {
    pub model_source: String,
    pub feature_count: usize,
    pub conditions: Vec<&'static str>,
    /// Serial of the verified manifest, `None` for unsigned artifacts
    pub manifest_serial: Option<u64>,
    pub policy: MinimalPolicy,
    /// Assessments completed in this session
    pub completed: usize,
}

/// Render the home view.
pub fn render_home(f: &mut Frame, area: Rect, state: &HomeState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Banner
            Constraint::Min(0),    // Main content
        ])
        .split(area);

    let banner = Paragraph::new(
        LOGO.lines()
            .filter(|l| !l.is_empty())
            .map(|l| Line::from(Span::styled(l, CalmTheme::subtitle())))
            .chain(std::iter::once(Line::from(Span::styled(
                "Student mental health screening",
                CalmTheme::text_secondary(),
            ))))
            .collect::<Vec<_>>(),
    )
    .alignment(Alignment::Center);
    f.render_widget(banner, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);

    render_status_panels(f, columns[0], state);
    render_about(f, columns[1]);
}

fn render_status_panels(f: &mut Frame, area: Rect, state: &HomeState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8), // Model status
            Constraint::Min(0),    // Quick actions
        ])
        .margin(1)
        .split(area);

    let (sig_icon, sig_style, sig_text) = match state.manifest_serial {
        Some(serial) => ("OK", CalmTheme::success(), format!("verified (serial {serial})")),
        None => ("--", CalmTheme::warning(), "unsigned".to_string()),
    };
    let policy = match state.policy {
        MinimalPolicy::Healthy => "healthy",
        MinimalPolicy::AtRisk => "at risk",
    };

    let status_items = vec![
        Line::from(vec![
            Span::styled("  OK ", CalmTheme::success()),
            Span::styled("Model loaded", CalmTheme::text()),
        ]),
        Line::from(vec![
            Span::styled(format!("  {sig_icon} "), sig_style),
            Span::styled(format!("Signature {sig_text}"), CalmTheme::text()),
        ]),
        Line::from(vec![
            Span::styled("  Source: ", CalmTheme::text_secondary()),
            Span::styled(state.model_source.clone(), CalmTheme::text_muted()),
        ]),
        Line::from(vec![
            Span::styled("  Features: ", CalmTheme::text_secondary()),
            Span::styled(state.feature_count.to_string(), CalmTheme::text()),
            Span::styled("  Targets: ", CalmTheme::text_secondary()),
            Span::styled(state.conditions.join(", "), CalmTheme::text()),
        ]),
        Line::from(vec![
            Span::styled("  \"Minimal\" counts as ", CalmTheme::text_secondary()),
            Span::styled(policy, CalmTheme::text()),
        ]),
        Line::from(vec![
            Span::styled("  Completed: ", CalmTheme::text_secondary()),
            Span::styled(state.completed.to_string(), CalmTheme::text()),
        ]),
    ];

    let status = Paragraph::new(status_items).block(
        Block::default()
            .title(Span::styled(" Model Status ", CalmTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(CalmTheme::border()),
    );
    f.render_widget(status, chunks[0]);

    let actions = vec![
        Line::from(vec![
            Span::styled("[P] ", CalmTheme::key_hint()),
            Span::styled("Profile", CalmTheme::key_desc()),
        ]),
        Line::from(vec![
            Span::styled("[A] ", CalmTheme::key_hint()),
            Span::styled("Questionnaire", CalmTheme::key_desc()),
        ]),
        Line::from(vec![
            Span::styled("[V] ", CalmTheme::key_hint()),
            Span::styled("Last Result", CalmTheme::key_desc()),
        ]),
        Line::from(vec![
            Span::styled("[R] ", CalmTheme::key_hint()),
            Span::styled("Reset Session", CalmTheme::key_desc()),
        ]),
        Line::from(vec![
            Span::styled("[Q] ", CalmTheme::key_hint()),
            Span::styled("Quit", CalmTheme::key_desc()),
        ]),
    ];

    let actions_list = Paragraph::new(actions).block(
        Block::default()
            .title(Span::styled(" Quick Actions ", CalmTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(CalmTheme::border()),
    );
    f.render_widget(actions_list, chunks[1]);
}

fn render_about(f: &mut Frame, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled("How it works", CalmTheme::subtitle())),
        Line::from(vec![
            Span::styled("1. ", CalmTheme::key_hint()),
            Span::styled("Fill in and lock your profile.", CalmTheme::text()),
        ]),
        Line::from(vec![
            Span::styled("2. ", CalmTheme::key_hint()),
            Span::styled(
                "Answer 26 questions about the last two weeks.",
                CalmTheme::text(),
            ),
        ]),
        Line::from(vec![
            Span::styled("3. ", CalmTheme::key_hint()),
            Span::styled(
                "A trained model estimates anxiety, stress and depression levels.",
                CalmTheme::text(),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "Everything runs locally. Answers are discarded after each analysis.",
            CalmTheme::text_muted(),
        )),
        Line::from(""),
        Line::from(Span::styled("Need to talk now?", CalmTheme::subtitle())),
    ];
    for line in advice::HELPLINES {
        lines.push(Line::from(vec![
            Span::styled(format!("  {}: ", line.name), CalmTheme::text_secondary()),
            Span::styled(line.number, CalmTheme::text()),
        ]));
    }

    let p = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(CalmTheme::border()),
    );
    f.render_widget(p, area);
}
