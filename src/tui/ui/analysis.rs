//! Analysis view: progress while the worker runs, then the result.

use std::path::PathBuf;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::domain::{advice, Assessment, ConditionResult};
use crate::tui::styles::CalmTheme;

#[derive(Debug, Clone, Default)]
pub enum AnalysisState {
    #[default]
    Idle,
    Running {
        stage: &'static str,
        progress: f64,
    },
    Complete {
        assessment: Assessment,
        /// Where the report was written, once saved
        saved_to: Option<PathBuf>,
        save_error: Option<String>,
    },
    Error {
        message: String,
    },
}

/// Render the analysis screen
pub fn render_analysis(f: &mut Frame, area: Rect, state: &AnalysisState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_header(f, chunks[0]);
    match state {
        AnalysisState::Idle => render_idle(f, chunks[1]),
        AnalysisState::Running { stage, progress } => {
            render_progress(f, chunks[1], stage, *progress);
        }
        AnalysisState::Complete { assessment, .. } => render_result(f, chunks[1], assessment),
        AnalysisState::Error { message } => render_error(f, chunks[1], message),
    }
    render_footer(f, chunks[2], state);
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", CalmTheme::text()),
        Span::styled("Analysis", CalmTheme::title()),
        Span::styled(
            " │ Anxiety · Stress · Depression",
            CalmTheme::text_secondary(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(CalmTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_idle(f: &mut Frame, area: Rect) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "No analysis yet",
            CalmTheme::text_secondary(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Lock your profile and answer the questionnaire to begin",
            CalmTheme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(CalmTheme::border()),
    );

    f.render_widget(content, area);
}

fn render_progress(f: &mut Frame, area: Rect, stage: &str, progress: f64) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .margin(2)
        .split(area);

    let stage_text = Paragraph::new(Line::from(vec![
        Span::styled("Stage: ", CalmTheme::text_secondary()),
        Span::styled(stage, CalmTheme::focused()),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(stage_text, chunks[0]);

    let progress = progress.clamp(0.0, 1.0);
    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(CalmTheme::border()),
        )
        .gauge_style(CalmTheme::info())
        .ratio(progress)
        .label(format!("{:.0}%", progress * 100.0));
    f.render_widget(gauge, chunks[1]);
}

fn render_result(f: &mut Frame, area: Rect, assessment: &Assessment) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            assessment
                .results
                .iter()
                .map(|_| Constraint::Length(6))
                .chain(std::iter::once(Constraint::Min(0)))
                .collect::<Vec<_>>(),
        )
        .split(columns[0]);

    for (i, result) in assessment.results.iter().enumerate() {
        render_condition(f, rows[i], result);
    }

    render_guidance(f, columns[1], assessment);
}

fn render_condition(f: &mut Frame, area: Rect, result: &ConditionResult) {
    let severity_style = CalmTheme::severity(result.severity);
    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", result.condition),
            CalmTheme::subtitle(),
        ))
        .borders(Borders::ALL)
        .border_style(if result.is_healthy() {
            CalmTheme::border()
        } else {
            severity_style
        });
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Label
            Constraint::Length(1), // Confidence
            Constraint::Min(0),    // Advice
        ])
        .split(inner);

    let label = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" {} ", result.severity),
            severity_style.add_modifier(Modifier::BOLD),
        ),
        Span::styled(result.display_label.clone(), CalmTheme::text()),
    ]));
    f.render_widget(label, chunks[0]);

    let confidence = result.confidence.clamp(0.0, 1.0);
    let gauge = Gauge::default()
        .gauge_style(CalmTheme::confidence(result.severity, confidence))
        .ratio(confidence)
        .label(format!("confidence {:.1}%", confidence * 100.0));
    f.render_widget(gauge, chunks[1]);

    let advice = Paragraph::new(Span::styled(
        result.severity.advice(),
        CalmTheme::text_secondary(),
    ))
    .wrap(Wrap { trim: true });
    f.render_widget(advice, chunks[2]);
}

fn render_guidance(f: &mut Frame, area: Rect, assessment: &Assessment) {
    let title = match assessment.primary_concern {
        Some(c) => format!(" Focus: {c} "),
        None => " Keep It Up ".to_string(),
    };

    let mut lines: Vec<Line> = advice::condition_tips(assessment.primary_concern)
        .iter()
        .map(|tip| {
            Line::from(vec![
                Span::styled("• ", CalmTheme::key_hint()),
                Span::styled(*tip, CalmTheme::text()),
            ])
        })
        .collect();

    if !assessment.scale_scores.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Your answers", CalmTheme::subtitle())));
        for score in &assessment.scale_scores {
            lines.push(Line::from(vec![
                Span::styled(format!("  {}: ", score.subscale.name()), CalmTheme::text_secondary()),
                Span::styled(format!("{}/{}", score.total, score.max), CalmTheme::text()),
            ]));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Helplines", CalmTheme::subtitle())));
    for line in advice::HELPLINES {
        lines.push(Line::from(vec![
            Span::styled(format!("  {}: ", line.name), CalmTheme::text_secondary()),
            Span::styled(line.number, CalmTheme::text()),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(
            "{} of {} conditions in the healthy range",
            assessment.healthy_count(),
            assessment.results.len()
        ),
        CalmTheme::text_muted(),
    )));

    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(Span::styled(title, CalmTheme::subtitle()))
                .borders(Borders::ALL)
                .border_style(CalmTheme::border()),
        );
    f.render_widget(p, area);
}

fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("! Analysis failed", CalmTheme::danger())),
        Line::from(""),
        Line::from(Span::styled(message, CalmTheme::text())),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(CalmTheme::danger()),
    );

    f.render_widget(content, area);
}

fn render_footer(f: &mut Frame, area: Rect, state: &AnalysisState) {
    let content = match state {
        AnalysisState::Complete {
            saved_to,
            save_error,
            ..
        } => {
            let mut spans = vec![
                Span::styled("[S] ", CalmTheme::key_hint()),
                Span::styled("Save Report ", CalmTheme::key_desc()),
                Span::styled("[R] ", CalmTheme::key_hint()),
                Span::styled("New Session ", CalmTheme::key_desc()),
                Span::styled("[Esc] ", CalmTheme::key_hint()),
                Span::styled("Home ", CalmTheme::key_desc()),
            ];
            if let Some(path) = saved_to {
                spans.push(Span::styled(
                    format!("Saved to {}", path.display()),
                    CalmTheme::success(),
                ));
            } else if let Some(err) = save_error {
                spans.push(Span::styled(err.clone(), CalmTheme::danger()));
            }
            Line::from(spans)
        }
        AnalysisState::Error { .. } => Line::from(vec![
            Span::styled("[Enter] ", CalmTheme::key_hint()),
            Span::styled("Back to Questionnaire ", CalmTheme::key_desc()),
            Span::styled("[Esc] ", CalmTheme::key_hint()),
            Span::styled("Home", CalmTheme::key_desc()),
        ]),
        AnalysisState::Running { .. } => {
            Line::from(Span::styled("Analyzing...", CalmTheme::text_muted()))
        }
        AnalysisState::Idle => Line::from(vec![
            Span::styled("[Esc] ", CalmTheme::key_hint()),
            Span::styled("Home", CalmTheme::key_desc()),
        ]),
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(CalmTheme::border()),
    );

    f.render_widget(footer, area);
}
